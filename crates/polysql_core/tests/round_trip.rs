use polysql_core::config::ValidatorConfig;
use polysql_core::reduce::testutil::parse_expr;
use polysql_core::registry::OperatorTable;
use polysql_core::types::DataType;
use polysql_core::unparse::unparse;
use polysql_core::validate::{Clause, Scope, Validator};

fn table() -> &'static OperatorTable {
    OperatorTable::standard()
}

#[test]
fn between_stops_lower_bound_at_and() {
    let node = parse_expr(table(), "a BETWEEN b OR c AND d OR e AND f").unwrap();
    let expected = parse_expr(table(), "((a BETWEEN (b OR c) AND d) OR (e AND f))").unwrap();
    assert!(node.same_shape(&expected));

    let rendered = unparse(table(), &node);
    assert_eq!("a BETWEEN b OR c AND d OR e AND f", rendered);
    assert!(parse_expr(table(), &rendered).unwrap().same_shape(&node));
}

#[test]
fn between_lower_bound_with_and_is_parenthesized() {
    let node = parse_expr(table(), "a BETWEEN (b OR c AND d) AND e").unwrap();
    let rendered = unparse(table(), &node);
    assert_eq!("a BETWEEN (b OR c AND d) AND e", rendered);
    assert!(parse_expr(table(), &rendered).unwrap().same_shape(&node));

    let node = parse_expr(table(), "x NOT BETWEEN SYMMETRIC (p AND q) AND r").unwrap();
    let rendered = unparse(table(), &node);
    assert_eq!("x NOT BETWEEN SYMMETRIC (p AND q) AND r", rendered);
}

/// Validate, render the typed tree, and validate the rendered text again.
#[test]
fn validated_trees_render_back() {
    let config = ValidatorConfig::default();
    let validator = Validator::new(table(), &config);
    let scope = Scope::new(Clause::Select)
        .with_column("i", DataType::integer())
        .with_column("n", DataType::integer().with_nullable(true))
        .with_column("s", DataType::varchar(Some(10)))
        .with_column("c", DataType::char(3))
        .with_column("flag", DataType::boolean());

    let cases = [
        "i + 2 * (n - 1) > 3 AND s LIKE 'x%'",
        "cast(i as bigint) between 1 and 10",
        "case when flag then s else c end",
        "coalesce(n, i) in (1, 2, 3)",
        "NOT flag OR n IS NULL",
        "-(i - n) * 2",
        "-(-i)",
        "n - (-i) * 2",
        "s || 'it''s'",
        "upper(s) = c",
    ];

    for text in cases {
        let first = validator
            .validate(&parse_expr(table(), text).unwrap(), &scope)
            .unwrap();
        let rendered = unparse(table(), &first.to_node());
        assert!(!rendered.contains("--"), "{text} rendered as {rendered}");
        let second = validator
            .validate(&parse_expr(table(), &rendered).unwrap(), &scope)
            .unwrap_or_else(|e| panic!("{text} rendered as {rendered}: {e}"));

        assert_eq!(first.datatype, second.datatype, "{text} rendered as {rendered}");
        assert!(first.to_node().same_shape(&second.to_node()), "{text} rendered as {rendered}");
    }
}

#[test]
fn double_dash_starts_a_comment() {
    let node = parse_expr(table(), "i -- minus\n - 1").unwrap();
    assert!(node.same_shape(&parse_expr(table(), "i - 1").unwrap()));
}

#[test]
fn translate3_renders_back_as_translate() {
    let config = ValidatorConfig {
        enable_oracle_functions: true,
        ..Default::default()
    };
    let validator = Validator::for_config(&config);
    let table = validator.table();
    let scope = Scope::new(Clause::Select).with_column("s", DataType::varchar(Some(10)));

    let first = validator
        .validate(&parse_expr(table, "translate3(s, 'a', 'b')").unwrap(), &scope)
        .unwrap();
    let rendered = unparse(table, &first.to_node());
    assert_eq!("TRANSLATE(S, 'a', 'b')", rendered);

    let second = validator.validate(&parse_expr(table, &rendered).unwrap(), &scope).unwrap();
    assert_eq!("TRANSLATE3", second.operator().unwrap().name);
    assert_eq!(first.datatype, second.datatype);
    assert!(first.to_node().same_shape(&second.to_node()));
}
