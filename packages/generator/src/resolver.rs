use crate::pipeline::{default_type_name, Declaration, FormatterPipeline};
use declgen_model::{Module, Property, TypeModel, TypeRef};

/// Short and fully-qualified naming of type nodes
///
/// A resolver is a cheap borrow of the model and the pipeline. Formatters
/// receive it so they can resolve nested types (generic arguments, collection
/// items) through the same rules.
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'a> {
    model: &'a TypeModel,
    pipeline: &'a FormatterPipeline,
}

impl<'a> TypeResolver<'a> {
    pub fn new(model: &'a TypeModel, pipeline: &'a FormatterPipeline) -> Self {
        Self { model, pipeline }
    }

    pub fn model(&self) -> &'a TypeModel {
        self.model
    }

    /// True if a convertor is registered for this node's host type
    pub fn is_converted(&self, ty: &TypeRef) -> bool {
        self.model
            .host_of(ty)
            .is_some_and(|host| self.pipeline.is_convertor_registered(host))
    }

    /// Bare declaration name, with generic arguments where applicable
    pub fn type_name(&self, ty: &TypeRef) -> String {
        if let Some(convertor) = self
            .model
            .host_of(ty)
            .and_then(|host| self.pipeline.convertor(host))
        {
            return convertor(ty);
        }

        match self.pipeline.formatter(ty.kind()) {
            Some(formatter) => formatter(self, ty),
            None => default_type_name(self, ty),
        }
    }

    /// Short name prefixed with the owning module, when there is one
    ///
    /// Generic parameters and converted types are never qualified.
    /// Collections take the module of their innermost item type.
    pub fn qualified_type_name(&self, ty: &TypeRef) -> String {
        let name = self.type_name(ty);
        if matches!(ty, TypeRef::GenericParameter(_)) || self.is_converted(ty) {
            return name;
        }

        match self.owning_module(ty) {
            Some(module) => {
                let module_name = self.module_name(module);
                if module_name.is_empty() {
                    name
                } else {
                    format!("{}.{}", module_name, name)
                }
            }
            None => name,
        }
    }

    /// Module that qualifies this type, piercing any collection nesting
    pub fn owning_module(&self, ty: &TypeRef) -> Option<&'a Module> {
        if self.is_converted(ty) {
            return None;
        }

        match ty {
            TypeRef::Collection(collection) => self.owning_module(&collection.items),
            TypeRef::Class(id) => self
                .model
                .class(*id)
                .module
                .map(|module| self.model.module(module)),
            TypeRef::Enum(id) => Some(self.model.module(self.model.enumeration(*id).module)),
            TypeRef::System(_) | TypeRef::GenericParameter(_) => None,
        }
    }

    pub fn module_name(&self, module: &Module) -> String {
        (self.pipeline.module_name())(module)
    }

    /// One `[]` per array rank, stopping at the first converted node
    pub fn array_suffix(&self, ty: &TypeRef) -> String {
        let mut rank = 0;
        let mut current = ty;
        while let TypeRef::Collection(collection) = current {
            if self.is_converted(current) {
                break;
            }
            rank += collection.dimension as usize;
            current = &collection.items;
        }
        "[]".repeat(rank)
    }

    /// Display name of a member
    pub fn member_name(&self, property: &Property) -> String {
        (self.pipeline.member_identifier())(property)
    }

    /// Final type text of a member, including array suffixes
    pub fn member_type_name(&self, property: &Property) -> String {
        let type_name = self.qualified_type_name(&property.ty);
        (self.pipeline.member_type())(self, property, &type_name)
    }

    pub fn is_visible(&self, declaration: Declaration<'_>, type_name: &str) -> bool {
        (self.pipeline.visibility())(declaration, type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declgen_model::{Class, Enum, Module, ModuleId, SystemKind, TypeKind};

    struct Fixture {
        model: TypeModel,
        models: ModuleId,
        foo: TypeRef,
        status: TypeRef,
        guid: TypeRef,
    }

    fn fixture() -> Fixture {
        let mut model = TypeModel::new();
        let models = model.add_module(Module::new("App.Models"));
        let system = model.add_module(Module::new("System"));
        let foo = model.add_class(Class::new("Foo").in_module(models));
        let status = model.add_enum(Enum::new("Status", models).with_value("Active", 0));
        let guid = model.add_class(Class::new("Guid").in_module(system).with_host("System.Guid"));

        Fixture {
            model,
            models,
            foo: TypeRef::Class(foo),
            status: TypeRef::Enum(status),
            guid: TypeRef::Class(guid),
        }
    }

    #[test]
    fn test_qualifies_with_owning_module() {
        let f = fixture();
        let pipeline = FormatterPipeline::new();
        let resolver = TypeResolver::new(&f.model, &pipeline);

        assert_eq!(resolver.type_name(&f.foo), "Foo");
        assert_eq!(resolver.qualified_type_name(&f.foo), "App.Models.Foo");
        assert_eq!(resolver.qualified_type_name(&f.status), "App.Models.Status");
        assert_eq!(resolver.qualified_type_name(&TypeRef::string()), "string");
    }

    #[test]
    fn test_collection_qualification_pierces_nesting() {
        let f = fixture();
        let pipeline = FormatterPipeline::new();
        let resolver = TypeResolver::new(&f.model, &pipeline);

        let nested = TypeRef::collection(
            TypeRef::collection(TypeRef::collection(f.foo.clone(), 1), 1),
            1,
        );
        assert_eq!(resolver.qualified_type_name(&nested), "App.Models.Foo");
        assert_eq!(resolver.array_suffix(&nested), "[][][]");
        assert_eq!(
            resolver.owning_module(&nested).map(|m| m.name.as_str()),
            Some("App.Models")
        );
    }

    #[test]
    fn test_generic_parameter_never_qualified() {
        let mut f = fixture();
        let boxed = f.model.add_class(
            Class::new("Box")
                .in_module(f.models)
                .with_generic_argument(TypeRef::generic_parameter("T")),
        );
        let pipeline = FormatterPipeline::new();
        let resolver = TypeResolver::new(&f.model, &pipeline);

        assert_eq!(resolver.qualified_type_name(&TypeRef::generic_parameter("T")), "T");
        assert_eq!(resolver.type_name(&TypeRef::Class(boxed)), "Box<T>");
    }

    #[test]
    fn test_generic_arguments_qualified_with_array_suffix() {
        let mut f = fixture();
        let pair = f.model.add_class(
            Class::new("Pair")
                .in_module(f.models)
                .with_generic_argument(f.foo.clone())
                .with_generic_argument(TypeRef::collection(f.status.clone(), 2)),
        );
        let pipeline = FormatterPipeline::new();
        let resolver = TypeResolver::new(&f.model, &pipeline);

        assert_eq!(
            resolver.qualified_type_name(&TypeRef::Class(pair)),
            "App.Models.Pair<App.Models.Foo, App.Models.Status[][]>"
        );
    }

    #[test]
    fn test_convertor_bypasses_qualification() {
        let f = fixture();
        let mut pipeline = FormatterPipeline::new();
        pipeline.register_convertor("System.Guid", |_| "string".to_string());
        let resolver = TypeResolver::new(&f.model, &pipeline);

        assert_eq!(resolver.qualified_type_name(&f.guid), "string");
        assert!(resolver.owning_module(&f.guid).is_none());

        let guids = TypeRef::collection(f.guid.clone(), 1);
        assert_eq!(resolver.qualified_type_name(&guids), "string");
        assert_eq!(resolver.array_suffix(&guids), "[]");
    }

    #[test]
    fn test_converted_collection_drops_suffix() {
        let f = fixture();
        let mut pipeline = FormatterPipeline::new();
        pipeline.register_convertor("System.Byte[]", |_| "string".to_string());
        let resolver = TypeResolver::new(&f.model, &pipeline);

        let bytes = TypeRef::collection(TypeRef::number(), 1).with_host("System.Byte[]");
        let property = Property::new("payload", bytes);
        assert_eq!(resolver.member_type_name(&property), "string");

        let chunks = Property::new(
            "chunks",
            TypeRef::collection(property.ty.clone(), 1),
        );
        assert_eq!(resolver.member_type_name(&chunks), "string[]");
    }

    #[test]
    fn test_empty_module_name_leaves_type_unqualified() {
        let mut model = TypeModel::new();
        let root = model.add_module(Module::new(""));
        let thing = model.add_class(Class::new("Thing").in_module(root));
        let loose = model.add_class(Class::new("Loose"));
        let pipeline = FormatterPipeline::new();
        let resolver = TypeResolver::new(&model, &pipeline);

        assert_eq!(resolver.qualified_type_name(&TypeRef::Class(thing)), "Thing");
        assert_eq!(resolver.qualified_type_name(&TypeRef::Class(loose)), "Loose");
    }

    #[test]
    fn test_module_name_formatter_applies_to_qualification() {
        let f = fixture();
        let mut pipeline = FormatterPipeline::new();
        pipeline.set_module_name_formatter(|module| module.name.replace("App.", ""));
        let resolver = TypeResolver::new(&f.model, &pipeline);

        assert_eq!(resolver.qualified_type_name(&f.foo), "Models.Foo");
    }

    #[test]
    fn test_last_registered_formatter_wins() {
        let f = fixture();
        let mut pipeline = FormatterPipeline::new();
        pipeline.register_formatter(TypeKind::System, |_, _| "first".to_string());
        pipeline.register_formatter(TypeKind::System, |_, ty| match ty {
            TypeRef::System(system) if system.kind == SystemKind::Date => "string".to_string(),
            _ => "second".to_string(),
        });
        let resolver = TypeResolver::new(&f.model, &pipeline);

        assert_eq!(resolver.type_name(&TypeRef::system(SystemKind::Date)), "string");
        assert_eq!(resolver.type_name(&TypeRef::number()), "second");
    }

    #[test]
    fn test_same_short_name_in_different_modules_stays_distinct() {
        let mut model = TypeModel::new();
        let billing = model.add_module(Module::new("Billing"));
        let shipping = model.add_module(Module::new("Shipping"));
        let a = model.add_class(Class::new("Address").in_module(billing));
        let b = model.add_class(Class::new("Address").in_module(shipping));
        let pipeline = FormatterPipeline::new();
        let resolver = TypeResolver::new(&model, &pipeline);

        assert_eq!(resolver.qualified_type_name(&TypeRef::Class(a)), "Billing.Address");
        assert_eq!(resolver.qualified_type_name(&TypeRef::Class(b)), "Shipping.Address");
    }

    #[test]
    fn test_member_formatters() {
        let f = fixture();
        let mut pipeline = FormatterPipeline::new();
        pipeline.set_member_identifier_formatter(|property| {
            let mut chars = property.name.chars();
            match chars.next() {
                Some(first) => first.to_lowercase().chain(chars).collect(),
                None => String::new(),
            }
        });
        let resolver = TypeResolver::new(&f.model, &pipeline);

        let property = Property::new("Items", TypeRef::collection(f.foo.clone(), 1));
        assert_eq!(resolver.member_name(&property), "items");
        assert_eq!(resolver.member_type_name(&property), "App.Models.Foo[]");
    }
}
