//! Case-insensitive substring filtering over display labels.

/// Result of a filter operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterMatch {
    /// Index of the matched item in the original list.
    pub index: usize,
    /// Byte offset of the match within the lowercased label.
    pub position: usize,
}

/// Filters labels by case-insensitive substring containment.
///
/// Matches keep the original order of `labels`, so the result is always a
/// subsequence of the input. An empty query matches everything.
///
/// # Example
///
/// ```ignore
/// let labels = vec!["Apple".to_string(), "Banana".to_string(), "Apricot".to_string()];
/// let matches = substring_filter("ap", &labels);
/// // Returns: Apple (0), Apricot (2)
/// ```
pub fn substring_filter(query: &str, labels: &[String]) -> Vec<FilterMatch> {
    let needle = query.to_lowercase();

    labels
        .iter()
        .enumerate()
        .filter_map(|(index, label)| {
            label
                .to_lowercase()
                .find(&needle)
                .map(|position| FilterMatch { index, position })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_query_returns_all() {
        let items = labels(&["apple", "banana"]);
        let matches = substring_filter("", &items);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].index, 0);
        assert_eq!(matches[1].index, 1);
    }

    #[test]
    fn test_substring_keeps_input_order() {
        let items = labels(&["Banana", "Apricot", "Grape", "apple"]);
        let indices: Vec<usize> = substring_filter("ap", &items).iter().map(|m| m.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_not_fuzzy() {
        let items = labels(&["alpha", "apple"]);
        let matches = substring_filter("ape", &items);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_case_insensitive() {
        let items = labels(&["Apple", "BANANA"]);
        let matches = substring_filter("aNaN", &items);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].index, 1);
        assert_eq!(matches[0].position, 1);
    }
}
