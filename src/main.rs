use std::{env, fs, process::ExitCode};

use pg_expr::{
    ast::{BinaryKind, Expression as E, ParameterExpression, SourceType, Value},
    methods::{DATE_TIME_YMD, KnownMethod},
    options::ProviderOptions,
    translate::{ColumnInfo, TranslationContext, postgres::Translator},
};

fn lookup(source: Option<&str>, property: &str) -> Option<ColumnInfo> {
    let column = match property {
        "Name" => ColumnInfo::new("name", SourceType::String),
        "Tags" => ColumnInfo::new("tags", SourceType::Array(Box::new(SourceType::String))),
        "Year" => ColumnInfo::new("year", SourceType::Int).not_null(),
        "Data" => ColumnInfo::new("data", SourceType::byte_array()),
        "Born" => ColumnInfo::new("born", SourceType::LocalDate).not_null(),
        "Died" => ColumnInfo::new("died", SourceType::LocalDate).not_null(),
        _ => return None,
    };
    Some(match source {
        Some(alias) => column.with_table(alias),
        None => column,
    })
}

/// Usage: `pg_expr [options.toml]`
fn main() -> ExitCode {
    env_logger::init();

    let options = match env::args().nth(1) {
        Some(path) => match fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|text| ProviderOptions::from_toml_str(&text).map_err(|e| e.to_string()))
        {
            Ok(options) => options,
            Err(e) => {
                eprintln!("{path}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => ProviderOptions::default(),
    };
    let translator = match Translator::new(lookup, &options) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let strings = SourceType::Array(Box::new(SourceType::String));
    let tags = E::property(Some("e"), "Tags", strings.clone());
    let t = ParameterExpression::new("t", SourceType::String);
    let p = ParameterExpression::new("p", SourceType::String);

    let samples = [
        (
            "e.Tags.Any(t => wanted.Contains(t))",
            E::call(
                KnownMethod::EnumerableAnyWithPredicate.instantiate(vec![SourceType::String]),
                vec![
                    tags,
                    E::lambda(
                        vec![t.clone()],
                        E::call(
                            KnownMethod::EnumerableContains.instantiate(vec![SourceType::String]),
                            vec![E::query_parameter("wanted", strings.clone()), E::Parameter(t.clone())],
                        ),
                    ),
                ],
            ),
        ),
        (
            "patterns.Any(p => EF.Functions.Like(e.Name, p))",
            E::call(
                KnownMethod::EnumerableAnyWithPredicate.instantiate(vec![SourceType::String]),
                vec![
                    E::query_parameter("patterns", strings.clone()),
                    E::lambda(
                        vec![p.clone()],
                        E::call(
                            KnownMethod::Like.method(),
                            vec![
                                E::db_functions(),
                                E::property(Some("e"), "Name", SourceType::String),
                                E::Parameter(p.clone()),
                            ],
                        ),
                    ),
                ],
            ),
        ),
        (
            "new DateTime(e.Year, 1, 1)",
            E::new_object(
                DATE_TIME_YMD.clone(),
                vec![
                    E::property(Some("e"), "Year", SourceType::Int),
                    E::constant(Value::Int(1)),
                    E::constant(Value::Int(1)),
                ],
            ),
        ),
        (
            "e.Data.Contains(b)",
            E::call(
                KnownMethod::EnumerableContains.instantiate(vec![SourceType::Byte]),
                vec![
                    E::property(Some("e"), "Data", SourceType::byte_array()),
                    E::query_parameter("b", SourceType::Byte),
                ],
            ),
        ),
        (
            "e.Died - e.Born",
            E::binary(
                BinaryKind::Subtract,
                E::property(Some("e"), "Died", SourceType::LocalDate),
                E::property(Some("e"), "Born", SourceType::LocalDate),
            ),
        ),
    ];

    for (source, tree) in &samples {
        println!("{source}");
        match translator.translate(tree) {
            Some(sql) => println!("{sql:#?}\n"),
            None => println!("  (not translatable)\n"),
        }
    }
    ExitCode::SUCCESS
}
