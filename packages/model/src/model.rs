use crate::error::{ModelError, ModelResult};
use crate::types::{ConstantValue, EnumLiteral, HostType, TypeRef};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

entity_id!(
    /// Index of a [`Module`] inside a [`TypeModel`]
    ModuleId
);
entity_id!(
    /// Index of a [`Class`] inside a [`TypeModel`]
    ClassId
);
entity_id!(
    /// Index of an [`Enum`] inside a [`TypeModel`]
    EnumId
);

/// Namespace-like grouping of classes and enums
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    /// Empty name means members are emitted at the top level
    pub name: String,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub classes: Vec<ClassId>,
    #[serde(default)]
    pub enums: Vec<EnumId>,
    /// External declaration files this module depends on
    #[serde(default)]
    pub references: BTreeSet<String>,
    #[serde(default)]
    pub is_ignored: bool,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sort_order: 0,
            classes: Vec::new(),
            enums: Vec::new(),
            references: BTreeSet::new(),
            is_ignored: false,
        }
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.references.insert(reference.into());
        self
    }

    pub fn ignored(mut self) -> Self {
        self.is_ignored = true;
        self
    }
}

/// Class or contract (interface-like class)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<HostType>,
    #[serde(default)]
    pub module: Option<ModuleId>,
    #[serde(default)]
    pub base: Option<ClassId>,
    #[serde(default)]
    pub interfaces: Vec<ClassId>,
    #[serde(default)]
    pub members: Vec<Property>,
    #[serde(default)]
    pub generic_arguments: Vec<TypeRef>,
    #[serde(default)]
    pub is_interface: bool,
    #[serde(default)]
    pub is_ignored: bool,
}

impl Class {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: None,
            module: None,
            base: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            generic_arguments: Vec::new(),
            is_interface: false,
            is_ignored: false,
        }
    }

    pub fn in_module(mut self, module: ModuleId) -> Self {
        self.module = Some(module);
        self
    }

    pub fn with_host(mut self, host: impl Into<HostType>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_base(mut self, base: ClassId) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_interface(mut self, interface: ClassId) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn with_member(mut self, member: Property) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_generic_argument(mut self, argument: TypeRef) -> Self {
        self.generic_arguments.push(argument);
        self
    }

    pub fn as_interface(mut self) -> Self {
        self.is_interface = true;
        self
    }

    pub fn ignored(mut self) -> Self {
        self.is_ignored = true;
        self
    }

    /// Members of the given kind, in declaration order
    pub fn members_of(&self, kind: MemberKind) -> impl Iterator<Item = &Property> {
        self.members.iter().filter(move |member| member.kind == kind)
    }

    /// True if the class declares at least one non-ignored property or field
    pub fn has_data_members(&self) -> bool {
        self.members
            .iter()
            .any(|member| !member.is_ignored && !member.is_constant())
    }

    pub fn has_constants(&self) -> bool {
        self.members
            .iter()
            .any(|member| !member.is_ignored && member.is_constant())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum MemberKind {
    #[default]
    Property,
    Field,
    Constant,
}

/// Property, field or constant of a class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub name: String,
    #[serde(default)]
    pub kind: MemberKind,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub is_optional: bool,
    #[serde(default)]
    pub is_ignored: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant_value: Option<ConstantValue>,
}

impl Property {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Property,
            ty,
            is_optional: false,
            is_ignored: false,
            constant_value: None,
        }
    }

    pub fn field(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            kind: MemberKind::Field,
            ..Self::new(name, ty)
        }
    }

    pub fn constant(name: impl Into<String>, ty: TypeRef, value: ConstantValue) -> Self {
        Self {
            kind: MemberKind::Constant,
            constant_value: Some(value),
            ..Self::new(name, ty)
        }
    }

    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    pub fn ignored(mut self) -> Self {
        self.is_ignored = true;
        self
    }

    pub fn is_constant(&self) -> bool {
        self.kind == MemberKind::Constant
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enum {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<HostType>,
    pub module: ModuleId,
    #[serde(default)]
    pub values: Vec<EnumValue>,
    #[serde(default)]
    pub emit_as_const: bool,
    #[serde(default)]
    pub is_ignored: bool,
}

impl Enum {
    pub fn new(name: impl Into<String>, module: ModuleId) -> Self {
        Self {
            name: name.into(),
            host: None,
            module,
            values: Vec::new(),
            emit_as_const: false,
            is_ignored: false,
        }
    }

    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<EnumLiteral>) -> Self {
        self.values.push(EnumValue {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_host(mut self, host: impl Into<HostType>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn as_const(mut self) -> Self {
        self.emit_as_const = true;
        self
    }

    pub fn ignored(mut self) -> Self {
        self.is_ignored = true;
        self
    }

    /// True when any numeric value falls outside the 32-bit signed range
    pub fn has_wide_values(&self) -> bool {
        self.values.iter().any(|value| value.value.is_wide())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,
    pub value: EnumLiteral,
}

impl From<i64> for EnumLiteral {
    fn from(n: i64) -> Self {
        EnumLiteral::Number(n)
    }
}

impl From<i32> for EnumLiteral {
    fn from(n: i32) -> Self {
        EnumLiteral::Number(n.into())
    }
}

impl From<&str> for EnumLiteral {
    fn from(s: &str) -> Self {
        EnumLiteral::String(s.to_string())
    }
}

/// Immutable-after-build graph of modules, classes and enums
///
/// Entities live in arenas and refer to each other by id. The renderer only
/// reads this structure; builders populate it once through the `add_*`
/// methods (or by deserializing a persisted model) and then call
/// [`TypeModel::validate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeModel {
    #[serde(default)]
    modules: Vec<Module>,
    #[serde(default)]
    classes: Vec<Class>,
    #[serde(default)]
    enums: Vec<Enum>,
}

impl TypeModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_module(&mut self, module: Module) -> ModuleId {
        let id = ModuleId(self.modules.len() as u32);
        self.modules.push(module);
        id
    }

    /// Register a class and append it to its module's member list
    pub fn add_class(&mut self, class: Class) -> ClassId {
        let id = ClassId(self.classes.len() as u32);
        if let Some(module) = class.module.and_then(|m| self.modules.get_mut(m.index())) {
            module.classes.push(id);
        }
        self.classes.push(class);
        id
    }

    /// Register an enum and append it to its module's member list
    pub fn add_enum(&mut self, enumeration: Enum) -> EnumId {
        let id = EnumId(self.enums.len() as u32);
        if let Some(module) = self.modules.get_mut(enumeration.module.index()) {
            module.enums.push(id);
        }
        self.enums.push(enumeration);
        id
    }

    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.index()]
    }

    pub fn module_mut(&mut self, id: ModuleId) -> &mut Module {
        &mut self.modules[id.index()]
    }

    pub fn class(&self, id: ClassId) -> &Class {
        &self.classes[id.index()]
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut Class {
        &mut self.classes[id.index()]
    }

    pub fn enumeration(&self, id: EnumId) -> &Enum {
        &self.enums[id.index()]
    }

    pub fn enumeration_mut(&mut self, id: EnumId) -> &mut Enum {
        &mut self.enums[id.index()]
    }

    pub fn modules(&self) -> impl Iterator<Item = (ModuleId, &Module)> {
        self.modules
            .iter()
            .enumerate()
            .map(|(i, module)| (ModuleId(i as u32), module))
    }

    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &Class)> {
        self.classes
            .iter()
            .enumerate()
            .map(|(i, class)| (ClassId(i as u32), class))
    }

    pub fn enums(&self) -> impl Iterator<Item = (EnumId, &Enum)> {
        self.enums
            .iter()
            .enumerate()
            .map(|(i, enumeration)| (EnumId(i as u32), enumeration))
    }

    pub fn find_module(&self, name: &str) -> Option<ModuleId> {
        self.modules()
            .find(|(_, module)| module.name == name)
            .map(|(id, _)| id)
    }

    /// First class with the given short name
    pub fn find_class(&self, name: &str) -> Option<ClassId> {
        self.classes()
            .find(|(_, class)| class.name == name)
            .map(|(id, _)| id)
    }

    pub fn find_enum(&self, name: &str) -> Option<EnumId> {
        self.enums()
            .find(|(_, enumeration)| enumeration.name == name)
            .map(|(id, _)| id)
    }

    /// Host identity of a type node, if it has one
    pub fn host_of<'t>(&'t self, ty: &'t TypeRef) -> Option<&'t HostType> {
        match ty {
            TypeRef::Class(id) => self.class(*id).host.as_ref(),
            TypeRef::Enum(id) => self.enumeration(*id).host.as_ref(),
            TypeRef::Collection(collection) => collection.host.as_ref(),
            TypeRef::System(system) => system.host.as_ref(),
            TypeRef::GenericParameter(_) => None,
        }
    }

    /// Check the structural invariants the renderer relies on
    pub fn validate(&self) -> ModelResult<()> {
        let mut names = HashSet::new();
        let mut listed_classes = HashSet::new();
        let mut listed_enums = HashSet::new();
        for (module_id, module) in self.modules() {
            if !names.insert(module.name.as_str()) {
                return Err(ModelError::DuplicateModule(module.name.clone()));
            }
            let owner = format!("module '{}'", module.name);
            for id in &module.classes {
                self.check_class_id(&owner, *id)?;
                let class = self.class(*id);
                if class.module != Some(module_id) {
                    return Err(foreign_member(module, "class", &class.name));
                }
                if !listed_classes.insert(*id) {
                    return Err(ModelError::DuplicateListing {
                        kind: "class",
                        name: class.name.clone(),
                    });
                }
            }
            for id in &module.enums {
                self.check_enum_id(&owner, *id)?;
                let enumeration = self.enumeration(*id);
                if enumeration.module != module_id {
                    return Err(foreign_member(module, "enum", &enumeration.name));
                }
                if !listed_enums.insert(*id) {
                    return Err(ModelError::DuplicateListing {
                        kind: "enum",
                        name: enumeration.name.clone(),
                    });
                }
            }
        }

        for class in &self.classes {
            let owner = format!("class '{}'", class.name);
            if let Some(module) = class.module {
                self.check_module_id(&owner, module)?;
            }
            if let Some(base) = class.base {
                self.check_class_id(&owner, base)?;
            }
            let mut seen = HashSet::new();
            for interface in &class.interfaces {
                self.check_class_id(&owner, *interface)?;
                if !seen.insert(*interface) {
                    return Err(ModelError::DuplicateInterface {
                        class: class.name.clone(),
                        interface: self.class(*interface).name.clone(),
                    });
                }
            }
            for member in &class.members {
                self.check_type(&owner, &member.ty)?;
            }
            for argument in &class.generic_arguments {
                self.check_type(&owner, argument)?;
            }
        }

        for enumeration in &self.enums {
            let owner = format!("enum '{}'", enumeration.name);
            self.check_module_id(&owner, enumeration.module)?;
            let mut seen = HashSet::new();
            for value in &enumeration.values {
                if !seen.insert(value.name.as_str()) {
                    return Err(ModelError::DuplicateEnumValue {
                        enum_name: enumeration.name.clone(),
                        value: value.name.clone(),
                    });
                }
            }
        }

        self.check_acyclic()
    }

    fn check_module_id(&self, owner: &str, id: ModuleId) -> ModelResult<()> {
        if id.index() < self.modules.len() {
            Ok(())
        } else {
            Err(dangling(owner, "module", id.0))
        }
    }

    fn check_class_id(&self, owner: &str, id: ClassId) -> ModelResult<()> {
        if id.index() < self.classes.len() {
            Ok(())
        } else {
            Err(dangling(owner, "class", id.0))
        }
    }

    fn check_enum_id(&self, owner: &str, id: EnumId) -> ModelResult<()> {
        if id.index() < self.enums.len() {
            Ok(())
        } else {
            Err(dangling(owner, "enum", id.0))
        }
    }

    fn check_type(&self, owner: &str, ty: &TypeRef) -> ModelResult<()> {
        match ty {
            TypeRef::Class(id) => self.check_class_id(owner, *id),
            TypeRef::Enum(id) => self.check_enum_id(owner, *id),
            TypeRef::Collection(collection) => {
                if collection.dimension == 0 {
                    return Err(ModelError::EmptyCollectionRank {
                        owner: owner.to_string(),
                    });
                }
                self.check_type(owner, &collection.items)
            }
            TypeRef::System(_) | TypeRef::GenericParameter(_) => Ok(()),
        }
    }

    /// Depth-first search over base and interface edges
    fn check_acyclic(&self) -> ModelResult<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        fn visit(
            model: &TypeModel,
            id: ClassId,
            marks: &mut [Mark],
            stack: &mut Vec<ClassId>,
        ) -> ModelResult<()> {
            match marks[id.index()] {
                Mark::Done => return Ok(()),
                Mark::InProgress => {
                    let start = stack.iter().position(|c| *c == id).unwrap_or(0);
                    let mut chain: Vec<String> = stack[start..]
                        .iter()
                        .map(|c| model.class(*c).name.clone())
                        .collect();
                    chain.push(model.class(id).name.clone());
                    return Err(ModelError::InheritanceCycle { chain });
                }
                Mark::Unvisited => {}
            }

            marks[id.index()] = Mark::InProgress;
            stack.push(id);
            let class = model.class(id);
            for parent in class.base.iter().chain(class.interfaces.iter()) {
                visit(model, *parent, marks, stack)?;
            }
            stack.pop();
            marks[id.index()] = Mark::Done;
            Ok(())
        }

        let mut marks = vec![Mark::Unvisited; self.classes.len()];
        let mut stack = Vec::new();
        for (id, _) in self.classes() {
            visit(self, id, &mut marks, &mut stack)?;
        }
        self.check_generic_arguments_acyclic()
    }

    /// A class may not appear, directly or through collections, in its own
    /// generic argument closure
    fn check_generic_arguments_acyclic(&self) -> ModelResult<()> {
        fn argument_classes(ty: &TypeRef, found: &mut Vec<ClassId>) {
            match ty {
                TypeRef::Class(id) => found.push(*id),
                TypeRef::Collection(collection) => argument_classes(&collection.items, found),
                TypeRef::Enum(_) | TypeRef::System(_) | TypeRef::GenericParameter(_) => {}
            }
        }

        fn visit(
            model: &TypeModel,
            id: ClassId,
            done: &mut HashSet<ClassId>,
            stack: &mut Vec<ClassId>,
        ) -> ModelResult<()> {
            if done.contains(&id) {
                return Ok(());
            }
            if let Some(start) = stack.iter().position(|c| *c == id) {
                let mut chain: Vec<String> = stack[start..]
                    .iter()
                    .map(|c| model.class(*c).name.clone())
                    .collect();
                chain.push(model.class(id).name.clone());
                return Err(ModelError::GenericArgumentCycle { chain });
            }

            stack.push(id);
            let mut arguments = Vec::new();
            for argument in &model.class(id).generic_arguments {
                argument_classes(argument, &mut arguments);
            }
            for argument in arguments {
                visit(model, argument, done, stack)?;
            }
            stack.pop();
            done.insert(id);
            Ok(())
        }

        let mut done = HashSet::new();
        let mut stack = Vec::new();
        for (id, _) in self.classes() {
            visit(self, id, &mut done, &mut stack)?;
        }
        Ok(())
    }
}

fn foreign_member(module: &Module, kind: &'static str, name: &str) -> ModelError {
    ModelError::ForeignMember {
        module: module.name.clone(),
        kind,
        name: name.to_string(),
    }
}

fn dangling(owner: &str, kind: &'static str, id: u32) -> ModelError {
    ModelError::DanglingReference {
        owner: owner.to_string(),
        kind,
        id,
    }
}
