use criterion::{Criterion, criterion_group, criterion_main};
use pg_expr::{
    ast::{BinaryKind, Expression as E, ParameterExpression, SourceType, Value},
    methods::KnownMethod,
    options::ProviderOptions,
    translate::{ColumnInfo, TranslationContext, postgres::Translator},
};

fn lookup(_source: Option<&str>, property: &str) -> Option<ColumnInfo> {
    match property {
        "Name" => Some(ColumnInfo::new("name", SourceType::String)),
        "Ids" => Some(ColumnInfo::new("ids", SourceType::Array(Box::new(SourceType::Int)))),
        _ => None,
    }
}

fn samples() -> Vec<E> {
    let name = || E::property(Some("e"), "Name", SourceType::String);
    let ids = E::property(Some("e"), "Ids", SourceType::Array(Box::new(SourceType::Int)));
    let x = ParameterExpression::new("x", SourceType::Int);
    vec![
        E::call_on(
            name(),
            KnownMethod::StringStartsWith.method(),
            vec![E::constant(Value::String("abc%".into()))],
        ),
        E::call(
            KnownMethod::EnumerableAnyWithPredicate.instantiate(vec![SourceType::Int]),
            vec![
                ids,
                E::lambda(
                    vec![x.clone()],
                    E::binary(BinaryKind::Equal, E::Parameter(x), E::constant(Value::Int(3))),
                ),
            ],
        ),
        E::binary(
            BinaryKind::AndAlso,
            E::binary(BinaryKind::NotEqual, name(), E::constant(Value::Null)),
            E::call_on(name(), KnownMethod::StringContains.method(), vec![E::constant(Value::String("x".into()))]),
        ),
    ]
}

fn criterion_benchmark(c: &mut Criterion) {
    let translator = Translator::new(lookup, &ProviderOptions::default()).unwrap();
    let samples = samples();
    c.bench_function("translate", |b| {
        b.iter(|| {
            for sample in &samples {
                _ = std::hint::black_box(translator.translate(sample));
            }
        })
    });
    c.bench_function("build translator", |b| {
        b.iter(|| std::hint::black_box(Translator::new(lookup, &ProviderOptions::default())))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
