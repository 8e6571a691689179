//! Ordering types.

use serde::Deserialize;
use serde::Serialize;

/// Sort direction for ordering results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending order (A-Z, 0-9).
    #[default]
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl Direction {
    /// Parses a direction; anything other than `desc` is ascending.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("desc") {
            Direction::Desc
        } else {
            Direction::Asc
        }
    }

    /// Applies this direction to an ordering.
    pub fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }

    /// Returns the wire name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// The single active sort of a table.
///
/// # Example
///
/// ```
/// use datagrid_lib::query::SortConfig;
///
/// let sort = SortConfig::parse("age:desc").unwrap();
/// assert_eq!(sort.to_string(), "age:desc");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    /// Field to sort by.
    pub field: String,
    /// Sort direction.
    pub direction: Direction,
}

impl SortConfig {
    /// Creates an ascending sort on a field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    /// Creates a descending sort on a field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }

    /// Parses the `field:direction` wire form. The direction defaults to asc.
    ///
    /// Returns `None` for an empty field.
    pub fn parse(s: &str) -> Option<Self> {
        let (field, direction) = match s.split_once(':') {
            Some((field, direction)) => (field, Direction::parse(direction)),
            None => (s, Direction::Asc),
        };
        let field = field.trim();
        if field.is_empty() {
            return None;
        }
        Some(Self {
            field: field.to_string(),
            direction,
        })
    }
}

impl std::fmt::Display for SortConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.field, self.direction.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(SortConfig::parse("age:desc"), Some(SortConfig::desc("age")));
        assert_eq!(SortConfig::parse("name"), Some(SortConfig::asc("name")));
        assert_eq!(SortConfig::parse("name:"), Some(SortConfig::asc("name")));
        assert_eq!(SortConfig::parse(":desc"), None);
    }

    #[test]
    fn test_direction_apply() {
        use std::cmp::Ordering;
        assert_eq!(Direction::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(Direction::Desc.apply(Ordering::Less), Ordering::Greater);
    }
}
