/// Determinism tests - rendering the same model must be reproducible
///
/// These tests validate that:
/// - Same model produces identical output across repeated renders
/// - No HashMap iteration order leaks into module, class or member order
/// - Declaration order does not depend on registration order
/// - A model that survives a JSON round trip renders byte-for-byte the same

use declgen_generator::{GeneratorOptions, OutputMode, TypeScriptGenerator};
use declgen_model::{
    Class, ConstantValue, Enum, Module, Property, SystemKind, TypeModel, TypeRef,
};

fn catalog_model() -> TypeModel {
    let mut model = TypeModel::new();
    let core = model.add_module(Module::new("Shop.Core").with_sort_order(-1));
    let orders = model.add_module(Module::new("Shop.Orders").with_reference("core.d.ts"));
    let system = model.add_module(Module::new("System"));

    let guid = model.add_class(Class::new("Guid").in_module(system).with_host("System.Guid"));
    let currency = model.add_enum(
        Enum::new("Currency", core)
            .with_value("Eur", 978)
            .with_value("Usd", 840),
    );
    let state = model.add_enum(
        Enum::new("OrderState", orders)
            .with_value("Open", 0)
            .with_value("Shipped", 1)
            .with_value("Closed", 2),
    );
    let named = model.add_class(
        Class::new("INamed")
            .in_module(core)
            .as_interface()
            .with_member(Property::new("displayName", TypeRef::string())),
    );
    let entity = model.add_class(
        Class::new("Entity")
            .in_module(core)
            .with_member(Property::new("id", TypeRef::Class(guid)))
            .with_member(Property::new("created", TypeRef::system(SystemKind::Date))),
    );
    let money = model.add_class(
        Class::new("Money")
            .in_module(core)
            .with_member(Property::new("amount", TypeRef::number()))
            .with_member(Property::new("currency", TypeRef::Enum(currency)))
            .with_member(Property::constant(
                "Precision",
                TypeRef::number(),
                ConstantValue::Integer(2),
            )),
    );
    let line = model.add_class(
        Class::new("OrderLine")
            .in_module(orders)
            .with_base(entity)
            .with_member(Property::new("sku", TypeRef::string()))
            .with_member(Property::new("price", TypeRef::Class(money)))
            .with_member(Property::new("quantity", TypeRef::number())),
    );
    model.add_class(
        Class::new("Order")
            .in_module(orders)
            .with_base(entity)
            .with_interface(named)
            .with_member(Property::new("lines", TypeRef::collection(TypeRef::Class(line), 1)))
            .with_member(Property::new("history", TypeRef::collection(TypeRef::Enum(state), 1)))
            .with_member(Property::new("note", TypeRef::string()).optional())
            .with_member(Property::field("revision", TypeRef::number())),
    );
    model
}

fn generator(options: GeneratorOptions) -> TypeScriptGenerator {
    let mut generator = TypeScriptGenerator::with_options(options);
    generator.register_convertor("System.Guid", |_| "string".to_string());
    generator.add_reference("lib.d.ts");
    generator
}

#[test]
fn test_render_determinism_declarations() {
    let model = catalog_model();
    let generator = generator(GeneratorOptions::declarations());

    // Render 10 times
    let results: Vec<String> = (0..10)
        .map(|_| generator.render(&model).expect("Render failed"))
        .collect();

    for i in 1..results.len() {
        assert_eq!(
            results[0], results[i],
            "Render {} differs from render 0",
            i
        );
    }
}

#[test]
fn test_render_determinism_all_modes() {
    let model = catalog_model();
    let generator = generator(GeneratorOptions::classes());

    for mode in [
        OutputMode::ENUMS,
        OutputMode::CONSTANTS,
        OutputMode::PROPERTIES | OutputMode::FIELDS,
        OutputMode::PROPERTIES | OutputMode::ENUMS | OutputMode::CONSTANTS,
    ] {
        let first = generator.render_mode(&model, mode).expect("Render failed");
        for _ in 0..10 {
            let again = generator.render_mode(&model, mode).expect("Render failed");
            assert_eq!(first, again, "Render differs for mode {:?}", mode);
        }
    }
}

#[test]
fn test_render_is_independent_of_registration_order() {
    let mut forward = TypeModel::new();
    let a = forward.add_module(Module::new("Pets"));
    for name in ["Cat", "Dog", "Eel"] {
        forward.add_class(
            Class::new(name)
                .in_module(a)
                .with_member(Property::new("legs", TypeRef::number()))
                .with_member(Property::new("age", TypeRef::number())),
        );
    }

    let mut reversed = TypeModel::new();
    let b = reversed.add_module(Module::new("Pets"));
    for name in ["Eel", "Dog", "Cat"] {
        reversed.add_class(
            Class::new(name)
                .in_module(b)
                .with_member(Property::new("age", TypeRef::number()))
                .with_member(Property::new("legs", TypeRef::number())),
        );
    }

    let generator = TypeScriptGenerator::new();
    assert_eq!(
        generator.render(&forward).expect("Render failed"),
        generator.render(&reversed).expect("Render failed")
    );
}

#[test]
fn test_json_round_trip_renders_identically() {
    let model = catalog_model();
    let json = serde_json::to_string_pretty(&model).expect("Failed to serialize");
    let restored: TypeModel = serde_json::from_str(&json).expect("Failed to deserialize");
    restored.validate().expect("Restored model is invalid");

    let generator = generator(GeneratorOptions::declarations());
    assert_eq!(
        generator.render(&model).expect("Render failed"),
        generator.render(&restored).expect("Render failed")
    );
}

#[test]
fn test_catalog_output_shape() {
    let model = catalog_model();
    let output = generator(GeneratorOptions::declarations())
        .render(&model)
        .expect("Render failed");

    println!("Generated declarations:\n{}", output);

    assert!(output.starts_with(
        "/// <reference path=\"lib.d.ts\" />\n/// <reference path=\"core.d.ts\" />\n\n"
    ));

    let core = output.find("declare namespace Shop.Core {").expect("core module");
    let orders = output.find("declare namespace Shop.Orders {").expect("orders module");
    assert!(core < orders);
    assert!(!output.contains("namespace System"));

    assert!(output.contains("\t\tid: string;\n"));
    assert!(output.contains("\t\tcreated: Date;\n"));
    assert!(output.contains("\t\tcurrency: Shop.Core.Currency;\n"));
    assert!(output.contains("\t\tlines: Shop.Orders.OrderLine[];\n"));
    assert!(output.contains("\t\thistory: Shop.Orders.OrderState[];\n"));
    assert!(output.contains("\t\tnote?: string;\n"));
    assert!(!output.contains("revision"));
    assert!(!output.contains("Precision"));
    assert!(output
        .contains("\texport interface Order extends Shop.Core.Entity, Shop.Core.INamed {\n"));
}
