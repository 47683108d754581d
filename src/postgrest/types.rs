//! Types for the PostgrestClient

/// `Prefer` header value asking the backend not to echo written rows
pub const RETURN_MINIMAL: &str = "return=minimal";

/// Sort direction for ordered selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

/// `order=column.direction`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: SortOrder,
}

impl OrderBy {
    pub fn to_param(&self) -> String {
        format!("{}.{}", self.column, self.direction.as_str())
    }
}
