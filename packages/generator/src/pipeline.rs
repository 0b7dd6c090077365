use crate::resolver::TypeResolver;
use declgen_model::{Class, Enum, HostType, Module, Property, TypeKind, TypeRef};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Computes the unqualified display name of a type node
pub type TypeFormatter = Box<dyn Fn(&TypeResolver<'_>, &TypeRef) -> String + Send + Sync>;

/// Replaces the rendered name of a host type outright
pub type TypeConvertor = Box<dyn Fn(&TypeRef) -> String + Send + Sync>;

pub type MemberIdentifierFormatter = Box<dyn Fn(&Property) -> String + Send + Sync>;

/// Receives the member and its qualified type name, returns the final type text
pub type MemberTypeFormatter =
    Box<dyn Fn(&TypeResolver<'_>, &Property, &str) -> String + Send + Sync>;

/// Decides whether a declaration gets the `export` keyword
pub type VisibilityFormatter = Box<dyn Fn(Declaration<'_>, &str) -> bool + Send + Sync>;

pub type ModuleNameFormatter = Box<dyn Fn(&Module) -> String + Send + Sync>;

/// A top-level declaration handed to visibility and documentation hooks
#[derive(Debug, Clone, Copy)]
pub enum Declaration<'a> {
    Class(&'a Class),
    Enum(&'a Enum),
}

impl Declaration<'_> {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Class(class) => &class.name,
            Declaration::Enum(enumeration) => &enumeration.name,
        }
    }
}

/// Ordered, overridable mapping from type nodes to text
///
/// Convertors are keyed by host type identity and win over everything else.
/// Formatters are keyed by node kind. Registering twice for the same key
/// replaces the earlier entry.
pub struct FormatterPipeline {
    formatters: BTreeMap<TypeKind, TypeFormatter>,
    convertors: HashMap<HostType, TypeConvertor>,
    member_identifier: MemberIdentifierFormatter,
    member_type: MemberTypeFormatter,
    visibility: VisibilityFormatter,
    module_name: ModuleNameFormatter,
}

impl FormatterPipeline {
    pub fn new() -> Self {
        let mut formatters: BTreeMap<TypeKind, TypeFormatter> = BTreeMap::new();
        for kind in [
            TypeKind::Class,
            TypeKind::Enum,
            TypeKind::Collection,
            TypeKind::System,
            TypeKind::GenericParameter,
        ] {
            formatters.insert(kind, Box::new(default_type_name));
        }

        Self {
            formatters,
            convertors: HashMap::new(),
            member_identifier: Box::new(|property: &Property| property.name.clone()),
            member_type: Box::new(default_member_type),
            visibility: Box::new(|_: Declaration<'_>, _: &str| true),
            module_name: Box::new(|module: &Module| module.name.clone()),
        }
    }

    pub fn register_formatter<F>(&mut self, kind: TypeKind, formatter: F)
    where
        F: Fn(&TypeResolver<'_>, &TypeRef) -> String + Send + Sync + 'static,
    {
        self.formatters.insert(kind, Box::new(formatter));
    }

    pub fn register_convertor<F>(&mut self, host: impl Into<HostType>, convertor: F)
    where
        F: Fn(&TypeRef) -> String + Send + Sync + 'static,
    {
        self.convertors.insert(host.into(), Box::new(convertor));
    }

    pub fn is_convertor_registered(&self, host: &HostType) -> bool {
        self.convertors.contains_key(host)
    }

    pub fn set_member_identifier_formatter<F>(&mut self, formatter: F)
    where
        F: Fn(&Property) -> String + Send + Sync + 'static,
    {
        self.member_identifier = Box::new(formatter);
    }

    pub fn set_member_type_formatter<F>(&mut self, formatter: F)
    where
        F: Fn(&TypeResolver<'_>, &Property, &str) -> String + Send + Sync + 'static,
    {
        self.member_type = Box::new(formatter);
    }

    pub fn set_visibility_formatter<F>(&mut self, formatter: F)
    where
        F: Fn(Declaration<'_>, &str) -> bool + Send + Sync + 'static,
    {
        self.visibility = Box::new(formatter);
    }

    pub fn set_module_name_formatter<F>(&mut self, formatter: F)
    where
        F: Fn(&Module) -> String + Send + Sync + 'static,
    {
        self.module_name = Box::new(formatter);
    }

    pub(crate) fn formatter(&self, kind: TypeKind) -> Option<&TypeFormatter> {
        self.formatters.get(&kind)
    }

    pub(crate) fn convertor(&self, host: &HostType) -> Option<&TypeConvertor> {
        self.convertors.get(host)
    }

    pub(crate) fn member_identifier(&self) -> &MemberIdentifierFormatter {
        &self.member_identifier
    }

    pub(crate) fn member_type(&self) -> &MemberTypeFormatter {
        &self.member_type
    }

    pub(crate) fn visibility(&self) -> &VisibilityFormatter {
        &self.visibility
    }

    pub(crate) fn module_name(&self) -> &ModuleNameFormatter {
        &self.module_name
    }
}

impl Default for FormatterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FormatterPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut convertors: Vec<&str> = self.convertors.keys().map(HostType::as_str).collect();
        convertors.sort_unstable();
        f.debug_struct("FormatterPipeline")
            .field("formatters", &self.formatters.keys().collect::<Vec<_>>())
            .field("convertors", &convertors)
            .finish_non_exhaustive()
    }
}

/// Built-in formatter for every node kind
///
/// Classes render with their generic arguments fully qualified. Collections
/// render as their item type; the array suffix belongs to the member type
/// formatter so it is never applied twice.
pub fn default_type_name(resolver: &TypeResolver<'_>, ty: &TypeRef) -> String {
    match ty {
        TypeRef::Class(id) => {
            let class = resolver.model().class(*id);
            if class.generic_arguments.is_empty() {
                return class.name.clone();
            }
            let arguments: Vec<String> = class
                .generic_arguments
                .iter()
                .map(|argument| {
                    format!(
                        "{}{}",
                        resolver.qualified_type_name(argument),
                        resolver.array_suffix(argument)
                    )
                })
                .collect();
            format!("{}<{}>", class.name, arguments.join(", "))
        }
        TypeRef::Enum(id) => resolver.model().enumeration(*id).name.clone(),
        TypeRef::Collection(collection) => resolver.type_name(&collection.items),
        TypeRef::System(system) => system.kind.keyword().to_string(),
        TypeRef::GenericParameter(parameter) => parameter.name.clone(),
    }
}

/// Built-in member type formatter: appends one `[]` per collection rank
pub fn default_member_type(resolver: &TypeResolver<'_>, property: &Property, type_name: &str) -> String {
    format!("{}{}", type_name, resolver.array_suffix(&property.ty))
}
