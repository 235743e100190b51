//! Query description formatting.

/// One key/value pair of a query description.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryParam {
    /// Parameter name
    pub key: String,
    /// Parameter value; empty values are skipped when formatting
    pub value: String,
}

impl QueryParam {
    /// Create a parameter.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Render `prefix` followed by the non-empty parameters as `key: value`
/// pairs joined with `, `, in the given order.
///
/// ```
/// use svc_common::url::{QueryParam, format_query};
///
/// let params = [
///     QueryParam::new("id", "42"),
///     QueryParam::new("name", ""),
///     QueryParam::new("state", "TX"),
/// ];
/// assert_eq!(format_query("member ", &params), "member id: 42, state: TX");
/// ```
#[must_use]
pub fn format_query(prefix: &str, params: &[QueryParam]) -> String {
    let pairs = params
        .iter()
        .filter(|param| !param.value.is_empty())
        .map(|param| format!("{}: {}", param.key, param.value))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{prefix}{pairs}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_query_empty() {
        assert_eq!(format_query("", &[]), "");
        assert_eq!(format_query("prefix", &[]), "prefix");
        assert_eq!(format_query("p:", &[QueryParam::new("a", "")]), "p:");
    }

    #[test]
    fn test_format_query_skips_leading_empty() {
        let params = [
            QueryParam::new("a", ""),
            QueryParam::new("b", "2"),
            QueryParam::new("c", ""),
            QueryParam::new("d", "4"),
        ];
        assert_eq!(format_query("q ", &params), "q b: 2, d: 4");
    }

    #[test]
    fn test_format_query_keeps_empty_key() {
        assert_eq!(format_query("", &[QueryParam::new("", "v")]), ": v");
    }
}
