//! Row filters for select queries

/// Operator for filter expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Equal to
    Eq,

    /// Not equal to
    Neq,
}

impl FilterOperator {
    /// Convert the operator to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
        }
    }
}

/// A single `column=operator.value` condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub operator: FilterOperator,
    pub value: String,
}

impl Filter {
    pub fn new(column: &str, operator: FilterOperator, value: impl ToString) -> Self {
        Self {
            column: column.to_string(),
            operator,
            value: value.to_string(),
        }
    }

    /// The query parameter value, e.g. `neq.out_of_stock`
    pub fn to_param(&self) -> String {
        format!("{}.{}", self.operator.as_str(), self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_postgrest_param() {
        let filter = Filter::new("stock_status", FilterOperator::Neq, "out_of_stock");
        assert_eq!(filter.to_param(), "neq.out_of_stock");
        assert_eq!(Filter::new("is_featured", FilterOperator::Eq, true).to_param(), "eq.true");
    }
}
