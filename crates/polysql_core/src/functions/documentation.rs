/// Operator categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Symbolic and keyword operators (`+`, `AND`, `BETWEEN`, ...).
    Operator(OperatorCategory),
    Aggregate(AggregateCategory),
    Numeric,
    String,
    TimeDate,
    System,
    Conditional,
    Collection,
    Json,
    Window,
    /// Operators that only exist after parsing, e.g. literal chains.
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorCategory {
    Numeric,
    Comparison,
    Logical,
    String,
    Structural,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateCategory {
    General,
    Statistical,
    Ranking,
    Grouping,
}

impl Category {
    pub const GENERAL_PURPOSE_AGGREGATE: Self = Category::Aggregate(AggregateCategory::General);
    pub const STATISTICAL_AGGREGATE: Self = Category::Aggregate(AggregateCategory::Statistical);
    pub const RANKING_AGGREGATE: Self = Category::Aggregate(AggregateCategory::Ranking);
    pub const GROUPING_AGGREGATE: Self = Category::Aggregate(AggregateCategory::Grouping);

    pub const NUMERIC_OPERATOR: Self = Category::Operator(OperatorCategory::Numeric);
    pub const COMPARISON_OPERATOR: Self = Category::Operator(OperatorCategory::Comparison);
    pub const LOGICAL_OPERATOR: Self = Category::Operator(OperatorCategory::Logical);
    pub const STRING_OPERATOR: Self = Category::Operator(OperatorCategory::String);
    pub const STRUCTURAL_OPERATOR: Self = Category::Operator(OperatorCategory::Structural);

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Operator(OperatorCategory::Numeric) => "numeric_operator",
            Self::Operator(OperatorCategory::Comparison) => "comparison_operator",
            Self::Operator(OperatorCategory::Logical) => "logical_operator",
            Self::Operator(OperatorCategory::String) => "string_operator",
            Self::Operator(OperatorCategory::Structural) => "structural_operator",
            Self::Aggregate(AggregateCategory::General) => "general_purpose_aggregate",
            Self::Aggregate(AggregateCategory::Statistical) => "statistical_aggregate",
            Self::Aggregate(AggregateCategory::Ranking) => "ranking_aggregate",
            Self::Aggregate(AggregateCategory::Grouping) => "grouping_aggregate",
            Self::Numeric => "numeric",
            Self::String => "string",
            Self::TimeDate => "timedate",
            Self::System => "system",
            Self::Conditional => "conditional",
            Self::Collection => "collection",
            Self::Json => "json",
            Self::Window => "window",
            Self::Internal => "internal",
        }
    }
}

/// Documentation for a single operator overload.
#[derive(Debug, Clone, Copy)]
pub struct Documentation {
    /// Category this operator belongs in.
    pub category: Category,
    /// Description of the operator.
    ///
    /// Whitespace will be trimmed. This allows for using raw strings and
    /// aligning everything to the left.
    pub description: &'static str,
    /// Argument names for this overload.
    ///
    /// If this doesn't match the number of operands, generic names will be
    /// used.
    pub arguments: &'static [&'static str],
    /// An optional example for the operator.
    pub example: Option<Example>,
}

/// A simple example.
#[derive(Debug, Clone, Copy)]
pub struct Example {
    /// Example usage of the operator.
    ///
    /// This should just be the expression itself and not an entire query.
    pub example: &'static str,
    /// The output for the above example.
    pub output: &'static str,
}
