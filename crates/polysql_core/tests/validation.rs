use polysql_core::config::ValidatorConfig;
use polysql_core::expr::{Monotonicity, Node, TypedExpr};
use polysql_core::functions::OperatorKind;
use polysql_core::reduce::testutil::parse_expr;
use polysql_core::registry::OperatorTable;
use polysql_core::types::{DataType, TypeName};
use polysql_core::unparse::unparse;
use polysql_core::validate::{Clause, Scope, Validator};
use polysql_error::{ErrorKind, ParserPos, Result};
use proptest::prelude::*;

fn columns(clause: Clause) -> Scope {
    Scope::new(clause)
        .with_column("i", DataType::integer())
        .with_column("n", DataType::integer().with_nullable(true))
        .with_column("s", DataType::varchar(Some(10)))
        .with_column("c", DataType::char(3))
        .with_column("d", DataType::date())
        .with_column("x", DataType::integer())
        .with_column("y", DataType::integer())
}

fn validate_with(config: &ValidatorConfig, text: &str, scope: &Scope) -> Result<TypedExpr> {
    let validator = Validator::for_config(config);
    let node = parse_expr(validator.table(), text)?;
    validator.validate(&node, scope)
}

fn validate(text: &str, scope: &Scope) -> Result<TypedExpr> {
    validate_with(&ValidatorConfig::default(), text, scope)
}

#[test]
fn grouping_outside_aggregate_query() {
    logutil::init_test();

    // SELECT GROUPING(x) FROM t
    let scope = columns(Clause::Select);
    let err = validate("grouping(x)", &scope).unwrap_err();
    assert_eq!(ErrorKind::GroupingInNonAggregateQuery, err.kind());
    assert_eq!("GROUPING operator may only occur in an aggregate query", err.message());
}

#[test]
fn grouping_argument_must_be_grouped() {
    // SELECT x, GROUPING(y) FROM t GROUP BY x
    let scope = columns(Clause::Select).with_group_by(vec![Node::identifier("x", ParserPos::new(1, 40))]);
    assert!(validate("x", &scope).is_ok());

    let err = validate("grouping(y)", &scope).unwrap_err();
    assert_eq!(ErrorKind::GroupingArgumentNotGrouped, err.kind());
    assert_eq!("Argument to GROUPING operator must be a grouped expression", err.message());

    let typed = validate("grouping(x)", &scope).unwrap();
    assert_eq!(DataType::bigint(), typed.datatype);
}

#[test]
fn date_part_rewrite_is_idempotent() {
    let scope = columns(Clause::Select);
    let first = validate("year(d)", &scope).unwrap();
    assert_eq!("EXTRACT", first.operator().unwrap().name);

    let rewritten = first.to_node();
    assert!(unparse(OperatorTable::standard(), &rewritten).starts_with("EXTRACT("));

    let second = Validator::for_config(&ValidatorConfig::default())
        .validate(&rewritten, &scope)
        .unwrap();
    assert_eq!(first.datatype, second.datatype);
    assert_eq!(first.operator().unwrap().name, second.operator().unwrap().name);
    assert_eq!(first.pos, second.pos);
}

#[test]
fn dynamic_functions_are_not_cacheable() {
    let table = OperatorTable::standard();
    for op in table.operators() {
        if op.kind == OperatorKind::ContextVariable {
            assert!(op.flags.dynamic, "{op} should be dynamic");
        }
    }

    let scope = columns(Clause::Select);
    for text in ["rand()", "current_date", "user", "i + rand()", "upper(user) = s"] {
        let typed = validate(text, &scope).unwrap();
        assert!(!typed.is_cacheable(), "{text} should not be cacheable");
        assert_ne!(Monotonicity::Constant, typed.monotonicity, "{text}");
    }

    for text in ["i + 1", "upper(s)", "abs(-3)"] {
        assert!(validate(text, &scope).unwrap().is_cacheable(), "{text}");
    }
}

#[test]
fn literal_chain_lines() {
    let scope = columns(Clause::Select);

    let typed = validate("'ab'\n'cde'", &scope).unwrap();
    assert_eq!(DataType::char(5), typed.datatype);

    let err = validate("'ab' 'cde'", &scope).unwrap_err();
    assert_eq!(ErrorKind::StringFragmentsOnSameLine, err.kind());
    assert_eq!(1, err.pos().unwrap().line);

    let config = ValidatorConfig {
        literal_chain_same_line_allowed: true,
        ..Default::default()
    };
    let typed = validate_with(&config, "'ab' 'cde'", &scope).unwrap();
    assert_eq!(DataType::char(5), typed.datatype);
}

#[test]
fn decode_default_controls_nullability() {
    let config = ValidatorConfig {
        enable_oracle_functions: true,
        ..Default::default()
    };
    let scope = columns(Clause::Select);

    // No default, a miss gives NULL.
    let typed = validate_with(&config, "decode(i, 1, 'a', 2, 'bb')", &scope).unwrap();
    assert_eq!(DataType::varchar(Some(2)).with_nullable(true), typed.datatype);

    let typed = validate_with(&config, "decode(i, 1, 'a', 2, 'bb', 'ccc')", &scope).unwrap();
    assert_eq!(DataType::varchar(Some(3)), typed.datatype);

    let typed = validate_with(&config, "decode(i, 1, 'a')", &scope).unwrap();
    assert_eq!(DataType::char(1).with_nullable(true), typed.datatype);

    let err = validate("decode(i, 1, 'a')", &scope).unwrap_err();
    assert_eq!(ErrorKind::NoSuchFunction, err.kind());
}

#[test]
fn errors_carry_positions() {
    let scope = columns(Clause::Select);

    let err = validate("i +\n  upper(i)", &scope).unwrap_err();
    assert_eq!(ErrorKind::CanNotApplyOp, err.kind());
    let pos = err.pos().unwrap();
    assert_eq!((2, 3), (pos.line, pos.column));

    let err = validate("i between 1 or 2", &scope).unwrap_err();
    assert_eq!(ErrorKind::BetweenWithoutAnd, err.kind());
}

#[test]
fn typed_tree_serializes() {
    let scope = columns(Clause::Select);
    let typed = validate("upper(s)", &scope).unwrap();
    let json = serde_json::to_value(&typed).unwrap();
    assert_eq!("UPPER", json["kind"]["Call"]["operator"]);
}

fn numeric_type() -> impl Strategy<Value = DataType> {
    let name = prop_oneof![
        Just(DataType::smallint()),
        Just(DataType::integer()),
        Just(DataType::bigint()),
        Just(DataType::double()),
        (1u32..=9, 0u32..=4).prop_map(|(p, s)| DataType::decimal(p.max(s), s)),
    ];
    (name, any::<bool>()).prop_map(|(t, nullable)| t.with_nullable(nullable))
}

proptest! {
    #[test]
    fn coalesce_type_ignores_operand_order(a in numeric_type(), b in numeric_type(), c in numeric_type()) {
        let scope = Scope::new(Clause::Select)
            .with_column("a", a)
            .with_column("b", b)
            .with_column("c", c);

        let forward = validate("coalesce(a, b, c)", &scope).unwrap().datatype;
        let backward = validate("coalesce(c, b, a)", &scope).unwrap().datatype;
        let rotated = validate("coalesce(b, c, a)", &scope).unwrap().datatype;
        prop_assert_eq!(&forward, &backward);
        prop_assert_eq!(&forward, &rotated);
        prop_assert!(TypeName::Double == forward.name() || forward.name().is_exact_numeric());
    }
}
