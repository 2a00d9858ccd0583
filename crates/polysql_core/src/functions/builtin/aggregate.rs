//! Aggregate and window-only functions.
//!
//! Aggregates keep their argument's type, only nullability varies. SUM-like
//! aggregates are nullable when there may be no rows to aggregate: a query
//! without GROUP BY over an empty input, or a FILTER dropping every row.
use polysql_error::Result;

use crate::functions::OperatorKind;
use crate::functions::binding::CallBinding;
use crate::functions::checker::{
    ANY,
    COMPARABLE_ORDERED,
    INTEGER,
    MULTISET as MULTISET_CHECKER,
    NILADIC,
    NUMERIC,
    NUMERIC_NUMERIC,
    OperandCountRange,
    OperandTypeChecker,
    POSITIVE_INTEGER_LITERAL,
    VARIADIC,
};
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::inference::{
    ARG0,
    ARG0_FORCE_NULLABLE,
    BIGINT,
    DOUBLE,
    MULTISET,
    ReturnTypeInference,
    TypeTransform,
};
use crate::functions::operator::Operator;
use crate::types::{DataType, TypeFamily};

pub static OPERATORS: &[&Operator] = &[
    &COUNT,
    &SUM,
    &SUM0,
    &AVG,
    &MIN,
    &MAX,
    &ANY_VALUE,
    &STDDEV_POP,
    &STDDEV_SAMP,
    &VAR_POP,
    &VAR_SAMP,
    &COVAR_POP,
    &COVAR_SAMP,
    &REGR_COUNT,
    &REGR_SXX,
    &REGR_SYY,
    &BIT_AND,
    &BIT_OR,
    &SINGLE_VALUE,
    &COLLECT,
    &FUSION,
    &FIRST_VALUE,
    &LAST_VALUE,
    &NTH_VALUE,
    &LEAD,
    &LAG,
    &NTILE,
    &RANK,
    &DENSE_RANK,
    &PERCENT_RANK,
    &CUME_DIST,
    &ROW_NUMBER,
];

const fn aggregate(
    name: &'static str,
    checker: OperandTypeChecker,
    return_type: ReturnTypeInference,
    category: Category,
) -> Operator {
    Operator::function(name, OperatorKind::Aggregate)
        .with_checker(checker)
        .with_return_type(return_type)
        .with_category(category)
        .aggregate()
}

const fn window_only(
    name: &'static str,
    checker: OperandTypeChecker,
    return_type: ReturnTypeInference,
) -> Operator {
    Operator::function(name, OperatorKind::WindowFunction)
        .with_checker(checker)
        .with_return_type(return_type)
        .with_category(Category::RANKING_AGGREGATE)
        .window()
}

const BIGINT_NOT_NULL: ReturnTypeInference =
    ReturnTypeInference::Cascade(&BIGINT, &[TypeTransform::ToNotNullable]);
const DOUBLE_NOT_NULL: ReturnTypeInference =
    ReturnTypeInference::Cascade(&DOUBLE, &[TypeTransform::ToNotNullable]);

/// Argument type, nullable if the aggregate may see no rows.
const NULLABLE_IF_EMPTY: ReturnTypeInference = ReturnTypeInference::Custom(nullable_if_empty);

fn nullable_if_empty(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    let datatype = binding.operand_type(0)?;
    let nullable = datatype.is_nullable() || binding.group_count == 0 || binding.has_filter;
    Ok(Some(datatype.clone().with_nullable(nullable)))
}

/// `COUNT(*)`, `COUNT(x)` or `COUNT(x, y, ...)`.
pub static COUNT: Operator = Operator::function_star("COUNT", OperatorKind::Aggregate)
    .with_checker(VARIADIC)
    .with_return_type(BIGINT_NOT_NULL)
    .with_category(Category::GENERAL_PURPOSE_AGGREGATE)
    .aggregate()
    .with_doc(&Documentation {
        category: Category::GENERAL_PURPOSE_AGGREGATE,
        description: "Count the rows, or the rows where all arguments are not NULL.",
        arguments: &["value"],
        example: None,
    });

pub static SUM: Operator = aggregate(
    "SUM",
    NUMERIC,
    NULLABLE_IF_EMPTY,
    Category::GENERAL_PURPOSE_AGGREGATE,
)
.with_doc(&Documentation {
    category: Category::GENERAL_PURPOSE_AGGREGATE,
    description: "Sum of all non-NULL values.",
    arguments: &["value"],
    example: Some(Example {
        example: "SUM(x)",
        output: "6",
    }),
});

/// SUM returning zero instead of NULL for no rows.
pub static SUM0: Operator = aggregate(
    "$SUM0",
    NUMERIC,
    ReturnTypeInference::Cascade(&ARG0, &[TypeTransform::ToNotNullable]),
    Category::GENERAL_PURPOSE_AGGREGATE,
);

pub static AVG: Operator = aggregate(
    "AVG",
    NUMERIC,
    NULLABLE_IF_EMPTY,
    Category::STATISTICAL_AGGREGATE,
)
.with_doc(&Documentation {
    category: Category::STATISTICAL_AGGREGATE,
    description: "Average of all non-NULL values. Keeps the argument type.",
    arguments: &["value"],
    example: None,
});

pub static MIN: Operator = aggregate(
    "MIN",
    COMPARABLE_ORDERED,
    ARG0,
    Category::GENERAL_PURPOSE_AGGREGATE,
);
pub static MAX: Operator = aggregate(
    "MAX",
    COMPARABLE_ORDERED,
    ARG0,
    Category::GENERAL_PURPOSE_AGGREGATE,
);
pub static ANY_VALUE: Operator = aggregate(
    "ANY_VALUE",
    ANY,
    ARG0,
    Category::GENERAL_PURPOSE_AGGREGATE,
);

pub static STDDEV_POP: Operator = aggregate(
    "STDDEV_POP",
    NUMERIC,
    ARG0_FORCE_NULLABLE,
    Category::STATISTICAL_AGGREGATE,
);
pub static STDDEV_SAMP: Operator = aggregate(
    "STDDEV_SAMP",
    NUMERIC,
    ARG0_FORCE_NULLABLE,
    Category::STATISTICAL_AGGREGATE,
);
pub static VAR_POP: Operator = aggregate(
    "VAR_POP",
    NUMERIC,
    ARG0_FORCE_NULLABLE,
    Category::STATISTICAL_AGGREGATE,
);
pub static VAR_SAMP: Operator = aggregate(
    "VAR_SAMP",
    NUMERIC,
    ARG0_FORCE_NULLABLE,
    Category::STATISTICAL_AGGREGATE,
);

pub static COVAR_POP: Operator = aggregate(
    "COVAR_POP",
    NUMERIC_NUMERIC,
    NULLABLE_IF_EMPTY,
    Category::STATISTICAL_AGGREGATE,
);
pub static COVAR_SAMP: Operator = aggregate(
    "COVAR_SAMP",
    NUMERIC_NUMERIC,
    NULLABLE_IF_EMPTY,
    Category::STATISTICAL_AGGREGATE,
);
pub static REGR_COUNT: Operator = aggregate(
    "REGR_COUNT",
    NUMERIC_NUMERIC,
    BIGINT_NOT_NULL,
    Category::STATISTICAL_AGGREGATE,
);
pub static REGR_SXX: Operator = aggregate(
    "REGR_SXX",
    NUMERIC_NUMERIC,
    NULLABLE_IF_EMPTY,
    Category::STATISTICAL_AGGREGATE,
);
pub static REGR_SYY: Operator = aggregate(
    "REGR_SYY",
    NUMERIC_NUMERIC,
    NULLABLE_IF_EMPTY,
    Category::STATISTICAL_AGGREGATE,
);

pub static BIT_AND: Operator = aggregate(
    "BIT_AND",
    INTEGER,
    ARG0,
    Category::GENERAL_PURPOSE_AGGREGATE,
);
pub static BIT_OR: Operator = aggregate(
    "BIT_OR",
    INTEGER,
    ARG0,
    Category::GENERAL_PURPOSE_AGGREGATE,
);

/// Fails at execution if the group has more than one row.
pub static SINGLE_VALUE: Operator = aggregate(
    "SINGLE_VALUE",
    ANY,
    ARG0,
    Category::GENERAL_PURPOSE_AGGREGATE,
);

pub static COLLECT: Operator = aggregate(
    "COLLECT",
    ANY,
    MULTISET,
    Category::GENERAL_PURPOSE_AGGREGATE,
);
pub static FUSION: Operator = aggregate(
    "FUSION",
    MULTISET_CHECKER,
    ARG0,
    Category::GENERAL_PURPOSE_AGGREGATE,
);

pub static FIRST_VALUE: Operator = window_only("FIRST_VALUE", ANY, ARG0);
pub static LAST_VALUE: Operator = window_only("LAST_VALUE", ANY, ARG0);

pub static NTH_VALUE: Operator = window_only(
    "NTH_VALUE",
    OperandTypeChecker::Sequence {
        allowed: "$OP(<ANY>, <INTEGER>)",
        checkers: &[ANY, POSITIVE_INTEGER_LITERAL],
    },
    ARG0_FORCE_NULLABLE,
);

/// `LEAD(value [, offset [, default]])`, the default must match the value.
const LEAD_LAG: OperandTypeChecker = OperandTypeChecker::Or(&[
    ANY,
    OperandTypeChecker::family(&[TypeFamily::Any, TypeFamily::Numeric]),
    OperandTypeChecker::And(&[
        OperandTypeChecker::family(&[TypeFamily::Any, TypeFamily::Numeric, TypeFamily::Any]),
        OperandTypeChecker::SameSame {
            positions: Some(&[0, 2]),
            range: OperandCountRange::exact(3),
        },
    ]),
]);

pub static LEAD: Operator = window_only("LEAD", LEAD_LAG, ARG0_FORCE_NULLABLE).with_doc(&Documentation {
    category: Category::RANKING_AGGREGATE,
    description: "Value of the row `offset` rows after the current one within the partition.",
    arguments: &["value", "offset", "default"],
    example: None,
});
pub static LAG: Operator = window_only("LAG", LEAD_LAG, ARG0_FORCE_NULLABLE);

pub static NTILE: Operator = window_only("NTILE", POSITIVE_INTEGER_LITERAL, BIGINT_NOT_NULL);
pub static RANK: Operator = window_only("RANK", NILADIC, BIGINT_NOT_NULL);
pub static DENSE_RANK: Operator = window_only("DENSE_RANK", NILADIC, BIGINT_NOT_NULL);
pub static ROW_NUMBER: Operator = window_only("ROW_NUMBER", NILADIC, BIGINT_NOT_NULL);
pub static PERCENT_RANK: Operator = window_only("PERCENT_RANK", NILADIC, DOUBLE_NOT_NULL);
pub static CUME_DIST: Operator = window_only("CUME_DIST", NILADIC, DOUBLE_NOT_NULL);

#[cfg(test)]
mod tests {
    use polysql_error::{ErrorKind, ParserPos};

    use super::*;
    use crate::expr::{Literal, Node};
    use crate::functions::binding::{column_operands, with_test_binding};

    fn infer(op: &'static Operator, types: &[DataType], group_count: usize) -> Option<DataType> {
        with_test_binding(op, column_operands(types.len()), types, |b| {
            let b = b.with_group_count(group_count);
            assert!(op.checker.check(&b, true).unwrap(), "{op}");
            op.return_type.infer(&b).unwrap()
        })
    }

    #[test]
    fn sum_keeps_type() {
        assert_eq!(Some(DataType::decimal(7, 2)), infer(&SUM, &[DataType::decimal(7, 2)], 1));
        assert_eq!(Some(DataType::integer()), infer(&AVG, &[DataType::integer()], 1));
    }

    #[test]
    fn sum_nullable_without_group_by() {
        assert_eq!(
            Some(DataType::integer().with_nullable(true)),
            infer(&SUM, &[DataType::integer()], 0)
        );
        assert_eq!(Some(DataType::integer()), infer(&SUM0, &[DataType::integer()], 0));
        assert_eq!(
            Some(DataType::double().with_nullable(true)),
            infer(&COVAR_POP, &[DataType::double(), DataType::integer()], 0)
        );
    }

    #[test]
    fn counts_are_bigint_not_null() {
        assert_eq!(Some(DataType::bigint()), infer(&COUNT, &[], 0));
        assert_eq!(
            Some(DataType::bigint()),
            infer(&COUNT, &[DataType::varchar(None).with_nullable(true)], 1)
        );
        assert_eq!(Some(DataType::bigint()), infer(&ROW_NUMBER, &[], 1));
        assert_eq!(Some(DataType::double()), infer(&CUME_DIST, &[], 1));
    }

    #[test]
    fn statistics_forced_nullable() {
        assert_eq!(
            Some(DataType::double().with_nullable(true)),
            infer(&STDDEV_SAMP, &[DataType::double()], 1)
        );
    }

    #[test]
    fn collect_builds_multiset() {
        assert_eq!(
            Some(DataType::multiset(DataType::date())),
            infer(&COLLECT, &[DataType::date()], 1)
        );
    }

    #[test]
    fn lead_default_must_match_value() {
        assert_eq!(
            Some(DataType::integer().with_nullable(true)),
            infer(&LEAD, &[DataType::integer(), DataType::integer(), DataType::bigint()], 1)
        );
        let types = [DataType::integer(), DataType::integer(), DataType::boolean()];
        with_test_binding(&LAG, column_operands(3), &types, |b| {
            assert!(!LAG.checker.check(b, false).unwrap());
        });
    }

    #[test]
    fn ntile_needs_positive_literal() {
        let operands = vec![Node::Literal(Literal::integer(0, ParserPos::new(1, 7)))];
        let err = with_test_binding(&NTILE, operands, &[DataType::integer()], |b| {
            NTILE.checker.check(b, true).unwrap_err()
        });
        assert_eq!(ErrorKind::ArgumentMustBePositiveInteger, err.kind());
        assert_eq!(Some(ParserPos::new(1, 7)), err.pos());
    }

    #[test]
    fn window_functions_require_over() {
        for op in [&RANK, &LEAD, &NTH_VALUE, &FIRST_VALUE] {
            assert!(op.flags.requires_over, "{op}");
            assert!(!op.flags.allows_filter, "{op}");
        }
        assert!(SUM.flags.allows_filter);
    }
}
