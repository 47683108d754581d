//! Select query builder

use crate::postgrest::filter::{Filter, FilterOperator};
use crate::postgrest::types::{OrderBy, SortOrder};

/// Filters, ordering and limit for a select over one collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    columns: String,
    filters: Vec<Filter>,
    order: Option<OrderBy>,
    limit: Option<usize>,
}

impl Default for SelectQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectQuery {
    /// Select all columns, unfiltered and unordered
    pub fn new() -> Self {
        Self {
            columns: "*".to_string(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn filter(mut self, column: &str, operator: FilterOperator, value: impl ToString) -> Self {
        self.filters.push(Filter::new(column, operator, value));
        self
    }

    /// Filter rows where column equals a value
    pub fn eq(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, FilterOperator::Eq, value)
    }

    /// Filter rows where column does not equal a value
    pub fn neq(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, FilterOperator::Neq, value)
    }

    /// Order the results by a column
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending {
            SortOrder::Ascending
        } else {
            SortOrder::Descending
        };
        self.order = Some(OrderBy {
            column: column.to_string(),
            direction,
        });
        self
    }

    /// Limit the number of rows returned
    pub fn limit(mut self, count: usize) -> Self {
        self.limit = Some(count);
        self
    }

    /// Newest first, the ordering every dashboard tab uses
    pub fn newest_first() -> Self {
        Self::new().order("created_at", false)
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn order_by(&self) -> Option<&OrderBy> {
        self.order.as_ref()
    }

    pub fn row_limit(&self) -> Option<usize> {
        self.limit
    }

    /// Query string parameters in PostgREST syntax
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.columns.clone())];
        for filter in &self.filters {
            params.push((filter.column.clone(), filter.to_param()));
        }
        if let Some(order) = &self.order {
            params.push(("order".to_string(), order.to_param()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}
