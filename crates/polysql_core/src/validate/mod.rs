//! Call validation.
//!
//! Validation resolves every call against the operator table, types its
//! operands bottom up, picks the first overload whose checker accepts the
//! operand types, infers the return type and finally applies the rules that
//! depend on where the call appears in the query.
pub mod scope;

use polysql_error::{DbError, ErrorKind, Result, messages};
use tracing::trace;

use crate::config::ValidatorConfig;
use crate::expr::{
    Call,
    Identifier,
    Literal,
    LiteralValue,
    Monotonicity,
    Node,
    TypedCall,
    TypedExpr,
    TypedExprKind,
};
use crate::functions::binding::CallBinding;
use crate::functions::operator::Operator;
use crate::registry::OperatorTable;
use crate::types::{DataType, TypeName};
pub use scope::{Clause, ColumnInfo, Scope};

/// State carried down while validating operands.
#[derive(Debug, Clone, Copy, Default)]
struct RecursionContext {
    /// Set when below an aggregate call or its filter.
    inside_aggregate: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    table: &'a OperatorTable,
    config: &'a ValidatorConfig,
}

impl<'a> Validator<'a> {
    pub fn new(table: &'a OperatorTable, config: &'a ValidatorConfig) -> Self {
        Validator { table, config }
    }

    /// Validator using the standard table, with the Oracle functions if
    /// enabled in the config.
    pub fn for_config(config: &'a ValidatorConfig) -> Self {
        Self::new(OperatorTable::for_config(config), config)
    }

    pub fn table(&self) -> &'a OperatorTable {
        self.table
    }

    /// Validate an expression appearing in `scope`.
    pub fn validate(&self, node: &Node, scope: &Scope) -> Result<TypedExpr> {
        self.validate_node(node, scope, RecursionContext::default())
    }

    fn validate_node(&self, node: &Node, scope: &Scope, ctx: RecursionContext) -> Result<TypedExpr> {
        match node {
            Node::Call(call) => self.validate_call(call, scope, ctx),
            Node::Literal(lit) => Ok(TypedExpr {
                kind: TypedExprKind::Literal(lit.value.clone()),
                datatype: self.literal_type(lit)?,
                monotonicity: Monotonicity::Constant,
                pos: lit.pos,
            }),
            Node::Identifier(ident) => self.validate_identifier(ident, scope),
            Node::DynamicParam(param) => {
                if !self.config.allow_unknown_parameter_types {
                    return Err(messages::illegal_dynamic_param().with_pos(param.pos));
                }
                Ok(TypedExpr {
                    kind: TypedExprKind::Parameter { index: param.index },
                    datatype: DataType::any().with_nullable(true),
                    monotonicity: Monotonicity::Constant,
                    pos: param.pos,
                })
            }
            Node::TypeSpec(spec) => Ok(TypedExpr {
                kind: TypedExprKind::TypeSpec,
                datatype: spec.datatype.clone(),
                monotonicity: Monotonicity::Constant,
                pos: spec.pos,
            }),
        }
    }

    fn validate_identifier(&self, ident: &Identifier, scope: &Scope) -> Result<TypedExpr> {
        let column = scope
            .column(ident)
            .ok_or_else(|| messages::unknown_identifier(&ident.to_string()).with_pos(ident.pos))?;
        let names = ident
            .names
            .iter()
            .map(|name| self.config.identifier_case.apply(name))
            .collect();

        Ok(TypedExpr {
            kind: TypedExprKind::Column(Identifier {
                names,
                pos: ident.pos,
            }),
            datatype: column.datatype.clone(),
            monotonicity: column.monotonicity,
            pos: ident.pos,
        })
    }

    /// Operands whose type comes from the call (dynamic parameters and
    /// untyped NULLs) are left as `None`.
    fn validate_operand(
        &self,
        node: &Node,
        scope: &Scope,
        ctx: RecursionContext,
    ) -> Result<Option<TypedExpr>> {
        match node {
            Node::DynamicParam(_) => Ok(None),
            node if node.is_null_literal() => Ok(None),
            node => Ok(Some(self.validate_node(node, scope, ctx)?)),
        }
    }

    /// Exact literals must fit the configured DECIMAL limits.
    fn literal_type(&self, lit: &Literal) -> Result<DataType> {
        let datatype = lit.datatype();
        if datatype.name() == TypeName::Decimal {
            let ts = self.config.type_system();
            let precision = datatype.precision().unwrap_or(0);
            let scale = datatype.scale().unwrap_or(0);
            if precision > ts.max_numeric_precision || scale > ts.max_numeric_scale {
                return Err(messages::numeric_literal_out_of_range(&lit.value.to_string()).with_pos(lit.pos));
            }
        }
        Ok(datatype)
    }

    fn validate_call(&self, call: &Call, scope: &Scope, ctx: RecursionContext) -> Result<TypedExpr> {
        let candidates = self.table.lookup(&call.name, call.syntax);
        if candidates.is_empty() {
            let suggestion = self.table.suggest(&call.name);
            return Err(messages::no_such_function(&call.name, suggestion).with_pos(call.pos));
        }

        if let Some(rewritten) = candidates
            .iter()
            .find_map(|op| op.hooks.rewrite.and_then(|rewrite| rewrite(call)))
        {
            trace!(from = %call.name, "rewrote call before validation");
            return self.validate_node(&rewritten, scope, ctx);
        }

        let count = call.operands.len();
        let by_arity: Vec<_> = candidates
            .iter()
            .copied()
            .filter(|op| op.operand_count_range().contains(count))
            .collect();
        if by_arity.is_empty() {
            let err = match candidates {
                [op] => match op.operand_count_range().is_exact() {
                    Some(expected) => messages::invalid_arg_count(op.name, expected),
                    None => messages::wrong_number_of_arguments(op.name),
                },
                _ => messages::wrong_number_of_arguments(candidates[0].name),
            };
            return Err(err.with_pos(call.pos));
        }

        let aggregate = by_arity.iter().any(|op| op.is_aggregate());
        let operand_ctx = RecursionContext {
            inside_aggregate: ctx.inside_aggregate || aggregate,
        };
        let typed: Vec<Option<TypedExpr>> = call
            .operands
            .iter()
            .map(|operand| self.validate_operand(operand, scope, operand_ctx))
            .collect::<Result<_>>()?;

        let (op, operand_types) = self.resolve_overload(call, &by_arity, &typed, scope)?;
        let binding = CallBinding::new(op, call, &operand_types, self.config)
            .with_group_count(scope.group_count());

        let datatype = op
            .return_type
            .infer(&binding)?
            .ok_or_else(|| messages::cannot_infer_return_type(op.name).with_pos(call.pos))?;

        if let Some(validate) = op.hooks.validate {
            validate(&binding)?;
        }
        self.validate_context(&binding, scope, ctx)?;

        let filter = match &call.filter {
            Some(filter) => Some(Box::new(self.validate_filter(op, filter, scope, operand_ctx)?)),
            None => None,
        };

        let operands: Vec<TypedExpr> = typed
            .into_iter()
            .zip(&call.operands)
            .zip(&operand_types)
            .map(|((typed, node), datatype)| {
                typed.unwrap_or_else(|| inferred_operand(node, datatype.clone()))
            })
            .collect();
        let monotonicity = call_monotonicity(&binding, &operands);

        Ok(TypedExpr {
            kind: TypedExprKind::Call(TypedCall {
                operator: op,
                operands,
                quantifier: call.quantifier,
                filter,
            }),
            datatype,
            monotonicity,
            pos: call.pos,
        })
    }

    /// Find the first overload accepting the operand types.
    ///
    /// Count and type failures move on to the next candidate, the error of
    /// the first candidate is reported if none accept. Other failures are
    /// returned immediately.
    fn resolve_overload(
        &self,
        call: &Call,
        candidates: &[&'static Operator],
        typed: &[Option<TypedExpr>],
        scope: &Scope,
    ) -> Result<(&'static Operator, Vec<DataType>)> {
        let known: Vec<Option<DataType>> = typed
            .iter()
            .map(|t| t.as_ref().map(|t| t.datatype.clone()))
            .collect();

        let mut first_err: Option<DbError> = None;
        for &op in candidates {
            trace!(operator = op.name, operands = typed.len(), "trying overload");
            let operand_types = self.operand_types(op, call, &known)?;
            let binding = CallBinding::new(op, call, &operand_types, self.config)
                .with_group_count(scope.group_count());

            let err = match op.checker.check(&binding, true) {
                Ok(true) => return Ok((op, operand_types)),
                Ok(false) => binding.new_validation_signature_error(),
                Err(err) if err.kind().is_overload_retryable() => err,
                Err(err) => return Err(err),
            };
            first_err.get_or_insert(binding.new_error(err));
        }

        Err(first_err.unwrap_or_else(|| {
            DbError::internal(format!("no overload candidates for {}", call.name))
        }))
    }

    /// Types of the operands for one candidate, inferring the ones not known
    /// from the operand itself.
    fn operand_types(
        &self,
        op: &'static Operator,
        call: &Call,
        known: &[Option<DataType>],
    ) -> Result<Vec<DataType>> {
        known
            .iter()
            .zip(&call.operands)
            .map(|(datatype, node)| match datatype {
                Some(datatype) => Ok(datatype.clone()),
                None => self.infer_unknown_operand(op, known, node),
            })
            .collect()
    }

    fn infer_unknown_operand(
        &self,
        op: &'static Operator,
        known: &[Option<DataType>],
        node: &Node,
    ) -> Result<DataType> {
        if let Some(datatype) = op.operand_inference.and_then(|inference| inference.infer(known)) {
            return Ok(datatype);
        }
        if node.is_null_literal() {
            return Ok(DataType::null());
        }
        if self.config.allow_unknown_parameter_types {
            return Ok(DataType::any().with_nullable(true));
        }
        Err(messages::illegal_dynamic_param().with_pos(node.pos()))
    }

    /// Rules that depend on where the call appears rather than on its
    /// operand types.
    fn validate_context(
        &self,
        binding: &CallBinding<'_>,
        scope: &Scope,
        ctx: RecursionContext,
    ) -> Result<()> {
        let op = binding.operator;
        let call = binding.call;

        if op.is_aggregate() {
            if ctx.inside_aggregate {
                return Err(messages::nested_aggregate().with_pos(call.pos));
            }
            if !scope.clause.allows_aggregates() {
                return Err(
                    messages::aggregate_illegal_in_clause(scope.clause.as_str()).with_pos(call.pos)
                );
            }
        }

        if op.flags.grouping {
            if !scope.aggregate {
                return Err(messages::grouping_in_non_aggregate_query(op.name).with_pos(call.pos));
            }
            if !scope.clause.allows_grouping_functions() {
                return Err(messages::grouping_in_wrong_clause(op.name).with_pos(call.pos));
            }
            if let Some(operand) = call.operands.iter().find(|operand| !scope.is_grouped(operand)) {
                return Err(messages::grouping_argument_not_grouped(op.name).with_pos(operand.pos()));
            }
        }

        Ok(())
    }

    fn validate_filter(
        &self,
        op: &'static Operator,
        filter: &Node,
        scope: &Scope,
        ctx: RecursionContext,
    ) -> Result<TypedExpr> {
        if !op.flags.allows_filter {
            return Err(DbError::new(
                ErrorKind::CanNotApplyOp,
                format!("FILTER is not allowed for {}", op.name),
            )
            .with_pos(filter.pos()));
        }
        let typed = self.validate_node(filter, scope, ctx)?;
        if !matches!(typed.datatype.name(), TypeName::Boolean | TypeName::Null) {
            return Err(DbError::new(
                ErrorKind::CanNotApplyOp,
                format!("FILTER expression must be BOOLEAN, got {}", typed.datatype),
            )
            .with_pos(typed.pos));
        }
        Ok(typed)
    }
}

/// Typed form of an operand whose type was inferred from its call.
fn inferred_operand(node: &Node, datatype: DataType) -> TypedExpr {
    let kind = match node {
        Node::DynamicParam(param) => TypedExprKind::Parameter { index: param.index },
        _ => TypedExprKind::Literal(LiteralValue::Null),
    };
    TypedExpr {
        kind,
        datatype,
        monotonicity: Monotonicity::Constant,
        pos: node.pos(),
    }
}

/// Dynamic and non-deterministic calls are never constant. Without a hook a
/// call is constant if all its operands are, and not monotonic otherwise.
fn call_monotonicity(binding: &CallBinding<'_>, operands: &[TypedExpr]) -> Monotonicity {
    let op = binding.operator;
    let operand_monotonicity: Vec<_> = operands.iter().map(|e| e.monotonicity).collect();
    let volatile = op.flags.dynamic || !op.flags.deterministic;

    let monotonicity = match op.hooks.monotonicity {
        Some(hook) => hook(binding, &operand_monotonicity),
        None if op.is_aggregate() => Monotonicity::NotMonotonic,
        None if operand_monotonicity.iter().all(|m| m.is_constant()) => Monotonicity::Constant,
        None => Monotonicity::NotMonotonic,
    };

    if volatile && monotonicity.is_constant() {
        Monotonicity::NotMonotonic
    } else {
        monotonicity
    }
}

#[cfg(test)]
mod tests {
    use polysql_error::ParserPos;

    use super::*;
    use crate::reduce::testutil::parse_expr;
    use crate::types::{IntervalQualifier, TimeUnit};

    fn scope() -> Scope {
        Scope::new(Clause::Select)
            .with_column("i", DataType::integer())
            .with_column("n", DataType::integer().with_nullable(true))
            .with_column("b", DataType::bigint())
            .with_column("d", DataType::decimal(5, 2))
            .with_column("s", DataType::varchar(Some(10)))
            .with_column("c", DataType::char(3))
            .with_column("dt", DataType::date())
            .with_column("flag", DataType::boolean())
    }

    fn validate_in(text: &str, scope: &Scope) -> Result<TypedExpr> {
        let config = ValidatorConfig::default();
        let table = OperatorTable::standard();
        let node = parse_expr(table, text)?;
        Validator::new(table, &config).validate(&node, scope)
    }

    fn validate(text: &str) -> Result<TypedExpr> {
        validate_in(text, &scope())
    }

    fn datatype(text: &str) -> DataType {
        validate(text).unwrap().datatype
    }

    #[test]
    fn arithmetic_types() {
        assert_eq!(DataType::bigint(), datatype("i + b"));
        assert_eq!(DataType::integer().with_nullable(true), datatype("i * n"));
        assert_eq!(DataType::decimal(13, 2), datatype("d + i"));
        assert_eq!(DataType::boolean(), datatype("i < b AND flag"));
    }

    #[test]
    fn string_types() {
        assert_eq!(DataType::varchar(Some(13)), datatype("s || c"));
        assert_eq!(DataType::char(3), datatype("upper(c)"));
    }

    #[test]
    fn unknown_function_suggests_a_name() {
        let err = validate("substrng(s, 1)").unwrap_err();
        assert_eq!(ErrorKind::NoSuchFunction, err.kind());
        assert_eq!(Some("SUBSTRING"), err.get_field("did you mean"));
    }

    #[test]
    fn unknown_column() {
        let err = validate("i + missing").unwrap_err();
        assert_eq!(ErrorKind::UnknownIdentifier, err.kind());
        let pos = err.pos().unwrap();
        assert_eq!((1, 5), (pos.line, pos.column));
    }

    #[test]
    fn arity_errors() {
        let err = validate("upper(s, s)").unwrap_err();
        assert_eq!(ErrorKind::InvalidArgCount, err.kind());

        let err = validate("substring(s)").unwrap_err();
        assert_eq!(ErrorKind::WrongNumberOfArguments, err.kind());
    }

    #[test]
    fn overloads_by_arity() {
        assert_eq!(DataType::varchar(Some(10)), datatype("substring(s, 2)"));
        assert_eq!(DataType::varchar(Some(10)), datatype("substring(s, 2, 3)"));
    }

    #[test]
    fn type_error_lists_signatures() {
        let err = validate("upper(i)").unwrap_err();
        assert_eq!(ErrorKind::CanNotApplyOp, err.kind());
        assert!(err.message().contains("UPPER(<INTEGER>)"), "{}", err.message());
    }

    #[test]
    fn parameters_take_type_from_call() {
        let typed = validate("i = ?").unwrap();
        let call = typed.as_call().unwrap();
        assert_eq!(DataType::integer().with_nullable(true), call.operands[1].datatype);
        assert_eq!(TypedExprKind::Parameter { index: 0 }, call.operands[1].kind);

        let typed = validate("cast(? as varchar(5))").unwrap();
        assert_eq!(DataType::varchar(Some(5)).with_nullable(true), typed.datatype);
    }

    #[test]
    fn parameter_without_inference_is_illegal() {
        let err = validate("upper(?)").unwrap_err();
        assert_eq!(ErrorKind::IllegalDynamicParam, err.kind());

        let config = ValidatorConfig {
            allow_unknown_parameter_types: true,
            ..Default::default()
        };
        let table = OperatorTable::standard();
        let node = parse_expr(table, "?").unwrap();
        let typed = Validator::new(table, &config).validate(&node, &scope()).unwrap();
        assert_eq!(TypeName::Any, typed.datatype.name());
    }

    #[test]
    fn null_operand_takes_type_from_call() {
        let typed = validate("i + NULL").unwrap();
        assert!(typed.datatype.is_nullable());
        let call = typed.as_call().unwrap();
        assert_eq!(TypedExprKind::Literal(LiteralValue::Null), call.operands[1].kind);
    }

    #[test]
    fn exact_literal_limited_by_max_precision() {
        assert_eq!(DataType::decimal(19, 9), datatype("1234567890.123456789"));

        let err = validate("i + 123456789012345678901234567").unwrap_err();
        assert_eq!(ErrorKind::NumericLiteralOutOfRange, err.kind());
        assert_eq!("Numeric literal '123456789012345678901234567' out of range", err.message());
        assert_eq!(5, err.pos().unwrap().column);

        let config = ValidatorConfig {
            max_numeric_precision: 30,
            ..Default::default()
        };
        let table = OperatorTable::standard();
        let node = parse_expr(table, "123456789012345678901234567").unwrap();
        let typed = Validator::new(table, &config).validate(&node, &scope()).unwrap();
        assert_eq!(DataType::decimal(27, 0), typed.datatype);
    }

    #[test]
    fn date_part_rewrites_to_extract() {
        let typed = validate("year(dt)").unwrap();
        assert_eq!("EXTRACT", typed.operator().unwrap().name);
        assert_eq!(DataType::integer(), typed.datatype);
    }

    #[test]
    fn aggregate_placement() {
        let grouped = scope().aggregating();
        assert_eq!(DataType::bigint(), validate_in("count(*)", &grouped).unwrap().datatype);

        let err = validate_in("sum(i) > 1", &grouped.clone().in_clause(Clause::Where)).unwrap_err();
        assert_eq!(ErrorKind::AggregateIllegalInClause, err.kind());
        assert!(err.message().contains("WHERE"));

        let err = validate_in("sum(max(i))", &grouped).unwrap_err();
        assert_eq!(ErrorKind::NestedAggregate, err.kind());
        let pos = err.pos().unwrap();
        assert_eq!((1, 5), (pos.line, pos.column));
    }

    #[test]
    fn aggregate_filter() {
        let grouped = scope().aggregating();
        let typed = validate_in("sum(i) filter (where flag)", &grouped).unwrap();
        assert!(typed.as_call().unwrap().filter.is_some());

        let err = validate_in("sum(i) filter (where i)", &grouped).unwrap_err();
        assert_eq!(ErrorKind::CanNotApplyOp, err.kind());
    }

    #[test]
    fn grouping_rules() {
        let ungrouped = scope();
        let err = validate_in("grouping(i)", &ungrouped).unwrap_err();
        assert_eq!(ErrorKind::GroupingInNonAggregateQuery, err.kind());

        let pos = ParserPos::new(1, 1);
        let grouped = scope().with_group_by(vec![Node::identifier("i", pos)]);
        assert_eq!(DataType::bigint(), validate_in("grouping(i)", &grouped).unwrap().datatype);

        let err = validate_in("grouping(s)", &grouped).unwrap_err();
        assert_eq!(ErrorKind::GroupingArgumentNotGrouped, err.kind());

        let err = validate_in("grouping(i) = 1", &grouped.in_clause(Clause::Where)).unwrap_err();
        assert_eq!(ErrorKind::GroupingInWrongClause, err.kind());
    }

    #[test]
    fn monotonicity() {
        let sorted = scope().with_sorted_column("t", DataType::integer(), Monotonicity::StrictlyIncreasing);
        let mono = |text: &str| validate_in(text, &sorted).unwrap().monotonicity;

        assert_eq!(Monotonicity::Constant, mono("1 + 2"));
        assert_eq!(Monotonicity::StrictlyIncreasing, mono("t + 1"));
        assert_eq!(Monotonicity::StrictlyDecreasing, mono("-t"));
        assert_eq!(Monotonicity::StrictlyDecreasing, mono("t * -2"));
        assert_eq!(Monotonicity::NotMonotonic, mono("t * i"));
        assert_eq!(Monotonicity::NotMonotonic, mono("upper(s)"));
        assert_ne!(Monotonicity::Constant, mono("rand()"));
    }

    #[test]
    fn interval_arithmetic() {
        let interval = DataType::interval(IntervalQualifier::single(TimeUnit::Day));
        let scope = scope().with_column("iv", interval.clone());
        assert_eq!(interval, validate_in("iv * 2", &scope).unwrap().datatype);
    }

    #[test]
    fn identifier_case_is_applied() {
        let TypedExprKind::Column(ident) = validate("i").unwrap().kind else {
            panic!("expected a column");
        };
        assert_eq!(vec!["I".to_string()], ident.names);
    }

    #[test]
    fn oracle_functions_follow_config() {
        let table = OperatorTable::standard();
        let node = parse_expr(OperatorTable::standard_with_oracle(), "nvl(n, i)").unwrap();

        let config = ValidatorConfig::default();
        let err = Validator::for_config(&config).validate(&node, &scope()).unwrap_err();
        assert_eq!(ErrorKind::NoSuchFunction, err.kind());
        assert!(table.lookup("NVL", crate::functions::Syntax::Function).is_empty());

        let config = ValidatorConfig {
            enable_oracle_functions: true,
            ..Default::default()
        };
        let typed = Validator::for_config(&config).validate(&node, &scope()).unwrap();
        assert_eq!(DataType::integer(), typed.datatype);
    }
}
