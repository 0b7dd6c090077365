use criterion::{black_box, criterion_group, criterion_main, Criterion};
use declgen_generator::{GeneratorOptions, OutputMode, TypeScriptGenerator};
use declgen_model::{Class, Enum, Module, Property, TypeModel, TypeRef};

fn build_model(modules: usize, classes_per_module: usize) -> TypeModel {
    let mut model = TypeModel::new();
    for m in 0..modules {
        let module = model.add_module(Module::new(format!("App.Module{}", m)));
        let state = model.add_enum(
            Enum::new(format!("State{}", m), module)
                .with_value("Idle", 0)
                .with_value("Busy", 1)
                .with_value("Done", 2),
        );

        let mut previous = None;
        for c in 0..classes_per_module {
            let mut class = Class::new(format!("Entity{}", c))
                .in_module(module)
                .with_member(Property::new("id", TypeRef::number()))
                .with_member(Property::new("name", TypeRef::string()))
                .with_member(Property::new("state", TypeRef::Enum(state)))
                .with_member(Property::new(
                    "tags",
                    TypeRef::collection(TypeRef::string(), 1),
                ));
            if let Some(base) = previous {
                class = class
                    .with_base(base)
                    .with_member(Property::new("parent", TypeRef::Class(base)).optional());
            }
            previous = Some(model.add_class(class));
        }
    }
    model
}

fn render_small_model(c: &mut Criterion) {
    let model = build_model(1, 10);
    let generator = TypeScriptGenerator::new();

    c.bench_function("render_small_model", |b| {
        b.iter(|| generator.render(black_box(&model)))
    });
}

fn render_large_model(c: &mut Criterion) {
    let model = build_model(20, 50);
    let generator = TypeScriptGenerator::new();

    c.bench_function("render_large_model", |b| {
        b.iter(|| generator.render(black_box(&model)))
    });
}

fn render_classes_variant(c: &mut Criterion) {
    let model = build_model(10, 20);
    let generator = TypeScriptGenerator::with_options(GeneratorOptions::classes());

    c.bench_function("render_classes_variant", |b| {
        b.iter(|| generator.render_mode(black_box(&model), OutputMode::all()))
    });
}

criterion_group!(
    benches,
    render_small_model,
    render_large_model,
    render_classes_variant
);
criterion_main!(benches);
