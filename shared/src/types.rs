//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Query string accepted by list endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
}

impl ListQuery {
    /// Trimmed search term, `None` when blank
    pub fn term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// `%term%` for a case-insensitive `ILIKE`, with wildcards in the term escaped
    pub fn ilike_pattern(&self) -> Option<String> {
        self.term().map(|term| {
            let mut pattern = String::with_capacity(term.len() + 2);
            pattern.push('%');
            for c in term.chars() {
                if matches!(c, '\\' | '%' | '_') {
                    pattern.push('\\');
                }
                pattern.push(c);
            }
            pattern.push('%');
            pattern
        })
    }
}

/// Case-insensitive substring match of `term` against any of `fields`
///
/// A blank term matches everything.
pub fn matches_search(term: &str, fields: &[&str]) -> bool {
    let term = term.trim().to_lowercase();
    term.is_empty() || fields.iter().any(|f| f.to_lowercase().contains(&term))
}

/// Generic success envelope for deletes and other bodiless results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl Default for SuccessResponse {
    fn default() -> Self {
        Self { success: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_search_is_none() {
        let query = ListQuery {
            search: Some("   ".to_string()),
        };
        assert_eq!(query.term(), None);
        assert_eq!(query.ilike_pattern(), None);
        assert_eq!(ListQuery::default().ilike_pattern(), None);
    }

    #[test]
    fn test_ilike_pattern_escapes_wildcards() {
        let query = ListQuery {
            search: Some(" 50%_off ".to_string()),
        };
        assert_eq!(query.ilike_pattern().as_deref(), Some("%50\\%\\_off%"));
    }

    #[test]
    fn test_matches_search() {
        assert!(matches_search("", &["anything"]));
        assert!(matches_search("MEHTA", &["Ravi Mehta", "98200"]));
        assert!(matches_search("982", &["Ravi Mehta", "98200"]));
        assert!(!matches_search("gold", &["Ravi Mehta", "98200"]));
    }
}
