//! Tag name normalization.
//!
//! Tag names are stored lowercase and trimmed; `(user, name)` is unique.

use std::collections::HashSet;

/// Normalize a single tag name. Returns `None` when nothing remains.
pub fn normalize_tag_name(name: &str) -> Option<String> {
    let normalized = name.trim().to_lowercase();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Normalize a list of tag names: trim, lowercase, drop empties and
/// duplicates. First-seen order is preserved.
///
/// ```
/// use bookmarko_core::normalize_tag_names;
///
/// let tags = normalize_tag_names(&[" Rust ", "rust", "", "Async"]);
/// assert_eq!(tags, vec!["rust".to_string(), "async".to_string()]);
/// ```
pub fn normalize_tag_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .filter_map(|n| normalize_tag_name(n.as_ref()))
        .filter(|n| seen.insert(n.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_lowercases() {
        assert_eq!(normalize_tag_name("  RuSt\t"), Some("rust".to_string()));
    }

    #[test]
    fn test_normalize_rejects_blank() {
        assert_eq!(normalize_tag_name("   "), None);
        assert_eq!(normalize_tag_name(""), None);
    }

    #[test]
    fn test_normalize_keeps_inner_whitespace() {
        assert_eq!(
            normalize_tag_name(" Machine Learning "),
            Some("machine learning".to_string())
        );
    }

    #[test]
    fn test_normalize_list_dedupes_case_insensitively() {
        let tags = normalize_tag_names(&["Web", "web ", "WEB", "dev"]);
        assert_eq!(tags, vec!["web", "dev"]);
    }

    #[test]
    fn test_normalize_list_empty_input() {
        let empty: [&str; 0] = [];
        assert!(normalize_tag_names(&empty).is_empty());
        assert!(normalize_tag_names(&["", "  "]).is_empty());
    }

    #[test]
    fn test_normalize_list_accepts_owned_strings() {
        let owned = vec!["A".to_string(), "b".to_string()];
        assert_eq!(normalize_tag_names(&owned), vec!["a", "b"]);
    }
}
