//! Row, collection and map constructors and operators.
use polysql_error::{ParserPos, Result, messages};

use crate::expr::{Call, Literal, LiteralValue, Node};
use crate::functions::OperatorKind;
use crate::functions::binding::CallBinding;
use crate::functions::checker::{
    COLLECTION,
    COLLECTION_OR_MAP,
    CustomChecker,
    ITEM as ITEM_CHECKER,
    MEMBER_OF as MEMBER_OF_CHECKER,
    MULTISET_MULTISET,
    MULTISET_ONLY,
    ONE_OR_MORE,
    OperandCountRange,
    OperandTypeChecker,
};
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::inference::{
    BOOLEAN,
    BOOLEAN_NULLABLE,
    COLLECTION_COMPONENT_NULLABLE,
    INTEGER_NULLABLE,
    LEAST_RESTRICTIVE_NULLABLE,
    OperandTypeInference,
    ReturnTypeInference,
};
use crate::functions::operator::{FUNCTION_PRECEDENCE, Operator};
use crate::reduce::Reducer;
use crate::types::{DataType, TypeName};
use crate::unparse::SqlWriter;

pub static OPERATORS: &[&Operator] = &[
    &ROW,
    &ARRAY_VALUE_CONSTRUCTOR,
    &MULTISET_VALUE_CONSTRUCTOR,
    &MAP_VALUE_CONSTRUCTOR,
    &ITEM,
    &DOT,
    &CARDINALITY,
    &ELEMENT,
    &MEMBER_OF,
    &SUBMULTISET_OF,
    &NOT_SUBMULTISET_OF,
    &IS_A_SET,
    &IS_NOT_A_SET,
    &IS_EMPTY,
    &IS_NOT_EMPTY,
    &MULTISET_UNION,
    &MULTISET_UNION_ALL,
    &MULTISET_INTERSECT,
    &MULTISET_INTERSECT_ALL,
    &MULTISET_EXCEPT,
    &MULTISET_EXCEPT_ALL,
];

/// `ROW(a, b, ...)`, also produced for a parenthesized list `(a, b)`.
pub static ROW: Operator = Operator::special("ROW", OperatorKind::Row, FUNCTION_PRECEDENCE, true)
    .with_checker(ONE_OR_MORE)
    .with_return_type(ReturnTypeInference::Custom(row_type))
    .with_category(Category::STRUCTURAL_OPERATOR)
    .with_unparse(unparse_row);

fn row_type(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    Ok(Some(DataType::row_from_types(binding.operand_types.iter().cloned())))
}

fn unparse_row(w: &mut SqlWriter<'_>, call: &Call, op: &'static Operator, _left: u32, _right: u32) {
    w.open_call(op.name);
    w.write_list(&call.operands);
    w.close_paren();
}

const fn value_constructor(
    name: &'static str,
    kind: OperatorKind,
    checker: &'static CustomChecker,
    return_type: ReturnTypeInference,
) -> Operator {
    Operator::special(name, kind, FUNCTION_PRECEDENCE, true)
        .with_checker(OperandTypeChecker::Custom(checker))
        .with_return_type(return_type)
        .with_operand_inference(OperandTypeInference::FirstKnown)
        .with_category(Category::Collection)
        .with_unparse(unparse_bracketed)
}

pub static ARRAY_VALUE_CONSTRUCTOR: Operator = value_constructor(
    "ARRAY",
    OperatorKind::ArrayConstructor,
    &CustomChecker {
        check: check_elements,
        range: OperandCountRange::from(1),
        allowed: "$OP[<EQUIVALENT_TYPE>, ...]",
    },
    ReturnTypeInference::Custom(array_type),
)
.with_doc(&Documentation {
    category: Category::Collection,
    description: "Build an array from a list of values.",
    arguments: &["value", "..."],
    example: Some(Example {
        example: "ARRAY[1, 2, 3]",
        output: "[1, 2, 3]",
    }),
});

pub static MULTISET_VALUE_CONSTRUCTOR: Operator = value_constructor(
    "MULTISET",
    OperatorKind::MultisetConstructor,
    &CustomChecker {
        check: check_elements,
        range: OperandCountRange::from(1),
        allowed: "$OP[<EQUIVALENT_TYPE>, ...]",
    },
    ReturnTypeInference::Custom(multiset_type),
);

/// `MAP[k1, v1, k2, v2, ...]`
pub static MAP_VALUE_CONSTRUCTOR: Operator = value_constructor(
    "MAP",
    OperatorKind::MapConstructor,
    &CustomChecker {
        check: check_map_entries,
        range: OperandCountRange::from(2),
        allowed: "$OP[<KEY>, <VALUE>, ...]",
    },
    ReturnTypeInference::Custom(map_type),
);

fn element_type(binding: &CallBinding<'_>, types: &[DataType]) -> Option<DataType> {
    binding.type_system().least_restrictive(types)
}

fn incompatible(binding: &CallBinding<'_>, throw: bool) -> Result<bool> {
    if throw {
        return Err(binding.new_error(messages::incompatible_value_types(binding.operator.name)));
    }
    Ok(false)
}

fn check_elements(binding: &CallBinding<'_>, throw: bool) -> Result<bool> {
    if element_type(binding, binding.operand_types).is_none() {
        return incompatible(binding, throw);
    }
    Ok(true)
}

/// Keys at even positions, values at odd positions.
fn split_entries(types: &[DataType]) -> (Vec<DataType>, Vec<DataType>) {
    let keys = types.iter().step_by(2).cloned().collect();
    let values = types.iter().skip(1).step_by(2).cloned().collect();
    (keys, values)
}

fn check_map_entries(binding: &CallBinding<'_>, throw: bool) -> Result<bool> {
    if binding.operand_count() % 2 != 0 {
        if throw {
            return Err(messages::wrong_number_of_arguments(binding.operator.name).with_pos(binding.call.pos));
        }
        return Ok(false);
    }
    let (keys, values) = split_entries(binding.operand_types);
    if element_type(binding, &keys).is_none() || element_type(binding, &values).is_none() {
        return incompatible(binding, throw);
    }
    Ok(true)
}

fn array_type(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    Ok(element_type(binding, binding.operand_types).map(DataType::array))
}

fn multiset_type(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    Ok(element_type(binding, binding.operand_types).map(DataType::multiset))
}

fn map_type(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    let (keys, values) = split_entries(binding.operand_types);
    Ok(element_type(binding, &keys)
        .zip(element_type(binding, &values))
        .map(|(k, v)| DataType::map(k, v)))
}

fn unparse_bracketed(w: &mut SqlWriter<'_>, call: &Call, op: &'static Operator, _left: u32, _right: u32) {
    w.keyword(op.name);
    w.open_bracket();
    w.write_list(&call.operands);
    w.close_bracket();
}

/// `container[index]`
pub static ITEM: Operator = Operator::special("ITEM", OperatorKind::Item, 100, true)
    .with_checker(ITEM_CHECKER)
    .with_return_type(ReturnTypeInference::Custom(item_type))
    .with_category(Category::STRUCTURAL_OPERATOR)
    .with_reduce(reduce_item)
    .with_unparse(unparse_item)
    .with_doc(&Documentation {
        category: Category::STRUCTURAL_OPERATOR,
        description: "Access an array element (1-based), a map value or a row field.",
        arguments: &["container", "index"],
        example: Some(Example {
            example: "ARRAY[10, 20][2]",
            output: "20",
        }),
    });

fn reduce_item(
    reducer: &mut Reducer<'_>,
    container: Node,
    op: &'static Operator,
    pos: ParserPos,
) -> Result<Node> {
    let index = reducer.next_operand()?;
    let pos = ParserPos::sum([container.pos(), pos, index.pos()]);
    Ok(Call::new(op.name, op.syntax, vec![container, index], pos).into())
}

fn item_type(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    let container = binding.operand_type(0)?;
    let datatype = match container.name() {
        TypeName::Array => container.component().cloned(),
        TypeName::Map => container.value_type().cloned(),
        TypeName::Row => match binding.operand_literal(1) {
            Some(LiteralValue::CharString { value, .. }) => {
                container.field(&value).map(|f| f.datatype.clone())
            }
            Some(lit) => lit
                .as_i64()
                .and_then(|idx| usize::try_from(idx).ok()?.checked_sub(1))
                .and_then(|idx| container.fields().get(idx))
                .map(|f| f.datatype.clone()),
            None => None,
        },
        TypeName::Any | TypeName::Null => Some(DataType::any()),
        _ => None,
    };
    Ok(datatype.map(|t| t.with_nullable(true)))
}

fn unparse_item(w: &mut SqlWriter<'_>, call: &Call, op: &'static Operator, left: u32, _right: u32) {
    let [container, index] = call.operands.as_slice() else {
        w.write_function(op.name, call);
        return;
    };
    w.write_node(container, left, op.left_prec);
    w.open_bracket();
    w.write_node(index, 0, 0);
    w.close_bracket();
}

/// `record.field`, the field name is kept as a string literal.
pub static DOT: Operator = Operator::special("DOT", OperatorKind::Dot, 100, true)
    .with_checker(OperandTypeChecker::Custom(&CustomChecker {
        check: check_dot,
        range: OperandCountRange::exact(2),
        allowed: "<ROW>.<FIELD>",
    }))
    .with_return_type(ReturnTypeInference::Custom(dot_type))
    .with_category(Category::STRUCTURAL_OPERATOR)
    .with_reduce(reduce_dot)
    .with_unparse(unparse_dot);

fn reduce_dot(
    reducer: &mut Reducer<'_>,
    record: Node,
    op: &'static Operator,
    pos: ParserPos,
) -> Result<Node> {
    let field = match reducer.next_operand()? {
        Node::Identifier(ident) if ident.names.len() == 1 => {
            Node::Literal(Literal::string(ident.last(), ident.pos))
        }
        other => {
            return Err(messages::malformed_expression("expected a field name after '.'")
                .with_pos(other.pos()));
        }
    };
    let pos = ParserPos::sum([record.pos(), pos, field.pos()]);
    Ok(Call::new(op.name, op.syntax, vec![record, field], pos).into())
}

fn field_name(binding: &CallBinding<'_>) -> Option<String> {
    match binding.operand_literal(1)? {
        LiteralValue::CharString { value, .. } => Some(value),
        _ => None,
    }
}

fn check_dot(binding: &CallBinding<'_>, throw: bool) -> Result<bool> {
    let record = binding.operand_type(0)?;
    let Some(name) = field_name(binding) else {
        return if throw { Err(binding.new_validation_signature_error()) } else { Ok(false) };
    };
    match record.name() {
        TypeName::Any | TypeName::Null => Ok(true),
        TypeName::Row if record.field(&name).is_some() => Ok(true),
        TypeName::Row => {
            if throw {
                return Err(binding.new_operand_error(1, messages::unknown_identifier(&name)));
            }
            Ok(false)
        }
        _ => {
            if throw {
                return Err(binding.new_validation_signature_error());
            }
            Ok(false)
        }
    }
}

fn dot_type(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    let record = binding.operand_type(0)?;
    if matches!(record.name(), TypeName::Any | TypeName::Null) {
        return Ok(Some(DataType::any().with_nullable(true)));
    }
    let Some(name) = field_name(binding) else {
        return Ok(None);
    };
    Ok(record.field(&name).map(|f| {
        let nullable = f.datatype.is_nullable() || record.is_nullable();
        f.datatype.clone().with_nullable(nullable)
    }))
}

fn unparse_dot(w: &mut SqlWriter<'_>, call: &Call, op: &'static Operator, left: u32, _right: u32) {
    let [record, Node::Literal(Literal {
        value: LiteralValue::CharString { value: field, .. },
        ..
    })] = call.operands.as_slice()
    else {
        w.write_function(op.name, call);
        return;
    };
    w.write_node(record, left, op.left_prec);
    w.dot();
    w.identifier(field);
}

pub static CARDINALITY: Operator = Operator::function("CARDINALITY", OperatorKind::Cardinality)
    .with_checker(COLLECTION_OR_MAP)
    .with_return_type(INTEGER_NULLABLE)
    .with_category(Category::Collection)
    .with_doc(&Documentation {
        category: Category::Collection,
        description: "Number of elements in an array, multiset or map.",
        arguments: &["collection"],
        example: None,
    });

pub static ELEMENT: Operator = Operator::function("ELEMENT", OperatorKind::Element)
    .with_checker(COLLECTION)
    .with_return_type(COLLECTION_COMPONENT_NULLABLE)
    .with_category(Category::Collection);

pub static MEMBER_OF: Operator = Operator::binary("MEMBER OF", OperatorKind::MemberOf, 30, true)
    .with_checker(MEMBER_OF_CHECKER)
    .with_return_type(BOOLEAN_NULLABLE)
    .with_category(Category::Collection);

pub static SUBMULTISET_OF: Operator =
    Operator::binary("SUBMULTISET OF", OperatorKind::Submultiset, 30, true)
        .with_checker(MULTISET_MULTISET)
        .with_return_type(BOOLEAN_NULLABLE)
        .with_category(Category::Collection);

pub static NOT_SUBMULTISET_OF: Operator =
    Operator::binary("NOT SUBMULTISET OF", OperatorKind::Submultiset, 30, true)
        .with_checker(MULTISET_MULTISET)
        .with_return_type(BOOLEAN_NULLABLE)
        .with_category(Category::Collection);

const fn collection_test(
    name: &'static str,
    kind: OperatorKind,
    checker: OperandTypeChecker,
) -> Operator {
    Operator::postfix(name, kind, 28)
        .with_checker(checker)
        .with_return_type(BOOLEAN)
        .with_category(Category::Collection)
}

pub static IS_A_SET: Operator = collection_test("IS A SET", OperatorKind::IsASet, MULTISET_ONLY);
pub static IS_NOT_A_SET: Operator =
    collection_test("IS NOT A SET", OperatorKind::IsASet, MULTISET_ONLY);
pub static IS_EMPTY: Operator = collection_test("IS EMPTY", OperatorKind::IsEmpty, COLLECTION_OR_MAP);
pub static IS_NOT_EMPTY: Operator =
    collection_test("IS NOT EMPTY", OperatorKind::IsEmpty, COLLECTION_OR_MAP);

const fn multiset_set_op(name: &'static str, prec: u32) -> Operator {
    Operator::binary(name, OperatorKind::MultisetSetOp, prec, true)
        .with_checker(MULTISET_MULTISET)
        .with_return_type(LEAST_RESTRICTIVE_NULLABLE)
        .with_operand_inference(OperandTypeInference::FirstKnown)
        .with_category(Category::Collection)
}

/// Distinct union, same as `MULTISET UNION DISTINCT`.
pub static MULTISET_UNION: Operator = multiset_set_op("MULTISET UNION", 14);
pub static MULTISET_UNION_ALL: Operator = multiset_set_op("MULTISET UNION ALL", 14);
pub static MULTISET_INTERSECT: Operator = multiset_set_op("MULTISET INTERSECT", 18);
pub static MULTISET_INTERSECT_ALL: Operator = multiset_set_op("MULTISET INTERSECT ALL", 18);
pub static MULTISET_EXCEPT: Operator = multiset_set_op("MULTISET EXCEPT", 14);
pub static MULTISET_EXCEPT_ALL: Operator = multiset_set_op("MULTISET EXCEPT ALL", 14);

#[cfg(test)]
mod tests {
    use polysql_error::ErrorKind;

    use super::*;
    use crate::functions::binding::{column_operands, with_test_binding};
    use crate::types::Field;

    #[test]
    fn row_fields_are_positional() {
        let types = [DataType::integer(), DataType::varchar(Some(3))];
        let ret = with_test_binding(&ROW, column_operands(2), &types, |b| {
            ROW.return_type.infer(b).unwrap().unwrap()
        });
        let names: Vec<_> = ret.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(vec!["EXPR$0", "EXPR$1"], names);
    }

    #[test]
    fn array_of_mixed_numerics() {
        let types = [DataType::integer(), DataType::double()];
        let ret = with_test_binding(&ARRAY_VALUE_CONSTRUCTOR, column_operands(2), &types, |b| {
            assert!(ARRAY_VALUE_CONSTRUCTOR.checker.check(b, true).unwrap());
            ARRAY_VALUE_CONSTRUCTOR.return_type.infer(b).unwrap()
        });
        assert_eq!(Some(DataType::array(DataType::double())), ret);
    }

    #[test]
    fn multiset_of_incompatible_values() {
        let types = [DataType::integer(), DataType::boolean()];
        let err = with_test_binding(&MULTISET_VALUE_CONSTRUCTOR, column_operands(2), &types, |b| {
            MULTISET_VALUE_CONSTRUCTOR.checker.check(b, true).unwrap_err()
        });
        assert_eq!(ErrorKind::IncompatibleValueTypes, err.kind());
    }

    #[test]
    fn map_keys_and_values_unify_separately() {
        let types = [
            DataType::char(1),
            DataType::integer(),
            DataType::char(3),
            DataType::bigint(),
        ];
        let ret = with_test_binding(&MAP_VALUE_CONSTRUCTOR, column_operands(4), &types, |b| {
            assert!(MAP_VALUE_CONSTRUCTOR.checker.check(b, true).unwrap());
            MAP_VALUE_CONSTRUCTOR.return_type.infer(b).unwrap()
        });
        assert_eq!(Some(DataType::map(DataType::varchar(Some(3)), DataType::bigint())), ret);

        let types = [DataType::char(1), DataType::integer(), DataType::char(3)];
        with_test_binding(&MAP_VALUE_CONSTRUCTOR, column_operands(3), &types, |b| {
            assert!(!MAP_VALUE_CONSTRUCTOR.checker.check(b, false).unwrap());
        });
    }

    #[test]
    fn item_on_row_by_position_and_name() {
        let row = DataType::row(vec![
            Field::new("a", DataType::integer()),
            Field::new("b", DataType::date()),
        ]);
        let types = [row.clone(), DataType::integer()];
        let operands = vec![
            Node::identifier("r", ParserPos::new(1, 1)),
            Node::Literal(Literal::integer(2, ParserPos::new(1, 3))),
        ];
        let ret = with_test_binding(&ITEM, operands, &types, |b| {
            assert!(ITEM.checker.check(b, true).unwrap());
            ITEM.return_type.infer(b).unwrap()
        });
        assert_eq!(Some(DataType::date().with_nullable(true)), ret);

        let types = [row, DataType::char(1)];
        let operands = vec![
            Node::identifier("r", ParserPos::new(1, 1)),
            Node::Literal(Literal::string("A", ParserPos::new(1, 3))),
        ];
        let ret = with_test_binding(&ITEM, operands, &types, |b| ITEM.return_type.infer(b).unwrap());
        assert_eq!(Some(DataType::integer().with_nullable(true)), ret);
    }

    #[test]
    fn item_on_array_needs_integer() {
        let types = [DataType::array(DataType::boolean()), DataType::varchar(None)];
        with_test_binding(&ITEM, column_operands(2), &types, |b| {
            assert!(!ITEM.checker.check(b, false).unwrap());
        });
    }

    #[test]
    fn dot_unknown_field() {
        let row = DataType::row(vec![Field::new("a", DataType::integer())]);
        let types = [row, DataType::char(1)];
        let operands = vec![
            Node::identifier("r", ParserPos::new(1, 1)),
            Node::Literal(Literal::string("z", ParserPos::new(1, 3))),
        ];
        let err = with_test_binding(&DOT, operands, &types, |b| DOT.checker.check(b, true).unwrap_err());
        assert_eq!(ErrorKind::UnknownIdentifier, err.kind());
        assert_eq!(Some(ParserPos::new(1, 3)), err.pos());
    }

    #[test]
    fn multiset_union_unifies_components() {
        let types = [
            DataType::multiset(DataType::integer()),
            DataType::multiset(DataType::bigint()).with_nullable(true),
        ];
        let ret = with_test_binding(&MULTISET_UNION, column_operands(2), &types, |b| {
            assert!(MULTISET_UNION.checker.check(b, true).unwrap());
            MULTISET_UNION.return_type.infer(b).unwrap()
        });
        assert_eq!(Some(DataType::multiset(DataType::bigint()).with_nullable(true)), ret);
    }

    #[test]
    fn member_of_requires_comparable_component() {
        let types = [DataType::boolean(), DataType::multiset(DataType::integer())];
        let err = with_test_binding(&MEMBER_OF, column_operands(2), &types, |b| {
            MEMBER_OF.checker.check(b, true).unwrap_err()
        });
        assert_eq!(ErrorKind::TypeNotComparable, err.kind());
    }
}
