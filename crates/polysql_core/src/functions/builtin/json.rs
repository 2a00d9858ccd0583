//! SQL/JSON query functions and predicates.
//!
//! The multi operand overloads carry the ON EMPTY/ON ERROR behaviors as
//! symbol operands, with a separate operand for a DEFAULT value:
//!
//! - `JSON_EXISTS(expr, path, on_error)`
//! - `JSON_VALUE(expr, path, on_empty, empty_default, on_error, error_default [, returning])`
//! - `JSON_QUERY(expr, path, wrapper, on_empty, on_error)`
use polysql_error::Result;

use crate::expr::{Call, JsonBehavior, Node, Symbol};
use crate::functions::OperatorKind;
use crate::functions::binding::CallBinding;
use crate::functions::checker::{
    CHARACTER,
    CustomChecker,
    OperandCountRange,
    OperandTypeChecker,
    family_accepts,
};
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::inference::{
    BOOLEAN,
    BOOLEAN_FORCE_NULLABLE,
    ReturnTypeInference,
    TypeTransform,
    VARCHAR_2000,
};
use crate::functions::operator::Operator;
use crate::types::{DataType, TypeFamily};
use crate::unparse::SqlWriter;

pub static OPERATORS: &[&Operator] = &[
    &JSON_EXISTS,
    &JSON_EXISTS_ON_ERROR,
    &JSON_VALUE,
    &JSON_VALUE_WITH_BEHAVIOR,
    &JSON_QUERY,
    &JSON_QUERY_WITH_BEHAVIOR,
    &IS_JSON_VALUE,
    &IS_NOT_JSON_VALUE,
    &IS_JSON_OBJECT,
    &IS_NOT_JSON_OBJECT,
    &IS_JSON_ARRAY,
    &IS_NOT_JSON_ARRAY,
    &IS_JSON_SCALAR,
    &IS_NOT_JSON_SCALAR,
];

const JSON_PATH: OperandTypeChecker =
    OperandTypeChecker::family(&[TypeFamily::Character, TypeFamily::Character]);

const VARCHAR_2000_FORCE_NULLABLE: ReturnTypeInference =
    ReturnTypeInference::Cascade(&VARCHAR_2000, &[TypeTransform::ForceNullable]);

const fn json_function(
    name: &'static str,
    checker: OperandTypeChecker,
    return_type: ReturnTypeInference,
) -> Operator {
    Operator::function(name, OperatorKind::Json)
        .with_checker(checker)
        .with_return_type(return_type)
        .with_category(Category::Json)
}

pub static JSON_EXISTS: Operator = json_function("JSON_EXISTS", JSON_PATH, BOOLEAN_FORCE_NULLABLE)
    .with_doc(&Documentation {
        category: Category::Json,
        description: "Check if a JSON path matches anything in a JSON document.",
        arguments: &["json", "path"],
        example: Some(Example {
            example: "JSON_EXISTS('{\"a\": 1}', 'strict $.a')",
            output: "TRUE",
        }),
    });

pub static JSON_EXISTS_ON_ERROR: Operator = json_function(
    "JSON_EXISTS",
    OperandTypeChecker::Custom(&CustomChecker {
        check: check_json_exists,
        range: OperandCountRange::exact(3),
        allowed: "$OP(<CHARACTER>, <CHARACTER> { TRUE | FALSE | UNKNOWN | ERROR } ON ERROR)",
    }),
    BOOLEAN_FORCE_NULLABLE,
)
.with_unparse(unparse_json_exists);

pub static JSON_VALUE: Operator = json_function("JSON_VALUE", JSON_PATH, VARCHAR_2000_FORCE_NULLABLE)
    .with_doc(&Documentation {
        category: Category::Json,
        description: "Extract a scalar value from a JSON document.",
        arguments: &["json", "path"],
        example: Some(Example {
            example: "JSON_VALUE('{\"a\": 1}', 'lax $.a')",
            output: "1",
        }),
    });

pub static JSON_VALUE_WITH_BEHAVIOR: Operator = json_function(
    "JSON_VALUE",
    OperandTypeChecker::Custom(&CustomChecker {
        check: check_json_value,
        range: OperandCountRange::between(6, 7),
        allowed: "$OP(<CHARACTER>, <CHARACTER> [RETURNING <TYPE>] { NULL | ERROR | DEFAULT <ANY> } ON EMPTY { NULL | ERROR | DEFAULT <ANY> } ON ERROR)",
    }),
    ReturnTypeInference::Custom(json_value_type),
)
.with_unparse(unparse_json_value);

pub static JSON_QUERY: Operator = json_function("JSON_QUERY", JSON_PATH, VARCHAR_2000_FORCE_NULLABLE);

pub static JSON_QUERY_WITH_BEHAVIOR: Operator = json_function(
    "JSON_QUERY",
    OperandTypeChecker::Custom(&CustomChecker {
        check: check_json_query,
        range: OperandCountRange::exact(5),
        allowed: "$OP(<CHARACTER>, <CHARACTER> <WRAPPER> WRAPPER { NULL | ERROR | EMPTY ARRAY | EMPTY OBJECT } ON EMPTY { NULL | ERROR | EMPTY ARRAY | EMPTY OBJECT } ON ERROR)",
    }),
    VARCHAR_2000_FORCE_NULLABLE,
)
.with_unparse(unparse_json_query);

fn check_json_operands(binding: &CallBinding<'_>) -> Result<bool> {
    for idx in 0..2 {
        if !family_accepts(TypeFamily::Character, binding.operand_type(idx)?) {
            return Ok(false);
        }
    }
    Ok(true)
}

fn behavior(binding: &CallBinding<'_>, idx: usize) -> Option<JsonBehavior> {
    match binding.operand_symbol(idx)? {
        Symbol::JsonBehavior(b) => Some(b),
        _ => None,
    }
}

fn finish(binding: &CallBinding<'_>, ok: bool, throw: bool) -> Result<bool> {
    if !ok && throw {
        return Err(binding.new_validation_signature_error());
    }
    Ok(ok)
}

fn check_json_exists(binding: &CallBinding<'_>, throw: bool) -> Result<bool> {
    let ok = check_json_operands(binding)?
        && matches!(
            behavior(binding, 2),
            Some(JsonBehavior::True | JsonBehavior::False | JsonBehavior::Unknown | JsonBehavior::Error)
        );
    finish(binding, ok, throw)
}

fn is_value_behavior(behavior: Option<JsonBehavior>) -> bool {
    matches!(
        behavior,
        Some(JsonBehavior::Null | JsonBehavior::Error | JsonBehavior::Default)
    )
}

fn check_json_value(binding: &CallBinding<'_>, throw: bool) -> Result<bool> {
    let ok = check_json_operands(binding)?
        && is_value_behavior(behavior(binding, 2))
        && is_value_behavior(behavior(binding, 4))
        && (binding.operand_count() == 6 || binding.operand_type_spec(6).is_some());
    finish(binding, ok, throw)
}

fn is_query_behavior(behavior: Option<JsonBehavior>) -> bool {
    matches!(
        behavior,
        Some(
            JsonBehavior::Null
                | JsonBehavior::Error
                | JsonBehavior::EmptyArray
                | JsonBehavior::EmptyObject
        )
    )
}

fn check_json_query(binding: &CallBinding<'_>, throw: bool) -> Result<bool> {
    let ok = check_json_operands(binding)?
        && matches!(binding.operand_symbol(2), Some(Symbol::JsonWrapper(_)))
        && is_query_behavior(behavior(binding, 3))
        && is_query_behavior(behavior(binding, 4));
    finish(binding, ok, throw)
}

/// The RETURNING type if given, VARCHAR(2000) otherwise. Always nullable.
fn json_value_type(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    let datatype = match binding.operand_type_spec(6) {
        Some(returning) => returning.clone(),
        None => DataType::varchar(Some(2000)),
    };
    Ok(Some(datatype.with_nullable(true)))
}

fn write_json_head(w: &mut SqlWriter<'_>, op: &'static Operator, operands: &[Node]) {
    w.open_call(op.name);
    if let [expr, path, ..] = operands {
        w.write_node(expr, 0, 0);
        w.comma();
        w.write_node(path, 0, 0);
    }
}

/// `<behavior> ON EMPTY`, or `DEFAULT <value> ON EMPTY`.
fn write_behavior(w: &mut SqlWriter<'_>, behavior: &Node, default: Option<&Node>, target: &str) {
    let symbol = behavior
        .as_literal()
        .and_then(|lit| lit.value.as_symbol());
    match (symbol, default) {
        (Some(Symbol::JsonBehavior(JsonBehavior::Default)), Some(default)) => {
            w.keyword("DEFAULT");
            w.write_node(default, 0, 0);
        }
        _ => w.write_node(behavior, 0, 0),
    }
    w.keyword("ON");
    w.keyword(target);
}

fn unparse_json_exists(w: &mut SqlWriter<'_>, call: &Call, op: &'static Operator, _left: u32, _right: u32) {
    let [_, _, on_error] = call.operands.as_slice() else {
        w.write_function(op.name, call);
        return;
    };
    write_json_head(w, op, &call.operands);
    write_behavior(w, on_error, None, "ERROR");
    w.close_paren();
}

fn unparse_json_value(w: &mut SqlWriter<'_>, call: &Call, op: &'static Operator, _left: u32, _right: u32) {
    let [_, _, on_empty, empty_default, on_error, error_default, rest @ ..] = call.operands.as_slice()
    else {
        w.write_function(op.name, call);
        return;
    };
    write_json_head(w, op, &call.operands);
    if let Some(Node::TypeSpec(spec)) = rest.first() {
        w.keyword("RETURNING");
        w.keyword(&spec.datatype.to_string());
    }
    write_behavior(w, on_empty, Some(empty_default), "EMPTY");
    write_behavior(w, on_error, Some(error_default), "ERROR");
    w.close_paren();
}

fn unparse_json_query(w: &mut SqlWriter<'_>, call: &Call, op: &'static Operator, _left: u32, _right: u32) {
    let [_, _, wrapper, on_empty, on_error] = call.operands.as_slice() else {
        w.write_function(op.name, call);
        return;
    };
    write_json_head(w, op, &call.operands);
    w.write_node(wrapper, 0, 0);
    w.keyword("WRAPPER");
    write_behavior(w, on_empty, None, "EMPTY");
    write_behavior(w, on_error, None, "ERROR");
    w.close_paren();
}

const fn json_predicate(name: &'static str) -> Operator {
    Operator::postfix(name, OperatorKind::IsJson, 28)
        .with_checker(CHARACTER)
        .with_return_type(BOOLEAN)
        .with_category(Category::Json)
}

pub static IS_JSON_VALUE: Operator = json_predicate("IS JSON VALUE");
pub static IS_NOT_JSON_VALUE: Operator = json_predicate("IS NOT JSON VALUE");
pub static IS_JSON_OBJECT: Operator = json_predicate("IS JSON OBJECT");
pub static IS_NOT_JSON_OBJECT: Operator = json_predicate("IS NOT JSON OBJECT");
pub static IS_JSON_ARRAY: Operator = json_predicate("IS JSON ARRAY");
pub static IS_NOT_JSON_ARRAY: Operator = json_predicate("IS NOT JSON ARRAY");
pub static IS_JSON_SCALAR: Operator = json_predicate("IS JSON SCALAR");
pub static IS_NOT_JSON_SCALAR: Operator = json_predicate("IS NOT JSON SCALAR");
