//! Session dependent niladic functions.
use crate::functions::OperatorKind;
use crate::functions::checker::NILADIC;
use crate::functions::documentation::{Category, Documentation};
use crate::functions::inference::VARCHAR_2000;
use crate::functions::operator::Operator;

pub static OPERATORS: &[&Operator] = &[
    &USER,
    &CURRENT_USER,
    &SESSION_USER,
    &SYSTEM_USER,
    &CURRENT_PATH,
    &CURRENT_ROLE,
    &CURRENT_CATALOG,
    &CURRENT_SCHEMA,
];

const fn context_variable(name: &'static str) -> Operator {
    Operator::function_id(name, OperatorKind::ContextVariable)
        .with_checker(NILADIC)
        .with_return_type(VARCHAR_2000)
        .with_category(Category::System)
        .dynamic()
}

pub static USER: Operator = context_variable("USER").with_doc(&Documentation {
    category: Category::System,
    description: "Name of the current user, same as CURRENT_USER.",
    arguments: &[],
    example: None,
});
pub static CURRENT_USER: Operator = context_variable("CURRENT_USER");
pub static SESSION_USER: Operator = context_variable("SESSION_USER");
pub static SYSTEM_USER: Operator = context_variable("SYSTEM_USER");
pub static CURRENT_PATH: Operator = context_variable("CURRENT_PATH");
pub static CURRENT_ROLE: Operator = context_variable("CURRENT_ROLE");
pub static CURRENT_CATALOG: Operator = context_variable("CURRENT_CATALOG");
pub static CURRENT_SCHEMA: Operator = context_variable("CURRENT_SCHEMA").with_doc(&Documentation {
    category: Category::System,
    description: "Name of the schema used to resolve unqualified names.",
    arguments: &[],
    example: None,
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::Syntax;
    use crate::types::DataType;

    #[test]
    fn all_dynamic_varchar() {
        for op in OPERATORS {
            assert!(op.flags.dynamic, "{op}");
            assert_eq!(Syntax::FunctionId, op.syntax, "{op}");
            let binding_free = match op.return_type {
                crate::functions::inference::ReturnTypeInference::Explicit(t) => t.to_datatype(),
                _ => panic!("unexpected strategy for {op}"),
            };
            assert_eq!(DataType::varchar(Some(2000)), binding_free);
        }
    }
}
