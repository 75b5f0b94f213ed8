use super::types::Article;

/// Substrings that hide a headline when they appear anywhere in its title.
const DEFAULT_BLOCKED: [&str; 9] = [
    "Trump", "trump", "USA", "America", "Elon", "Musk", "DOGE", "Tesla", "US",
];

/// Case-sensitive title blocklist applied to top headlines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blocklist {
    entries: Vec<String>,
}

impl Default for Blocklist {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCKED.iter().map(|s| s.to_string()))
    }
}

impl Blocklist {
    /// Empty entries are ignored, otherwise they would match every title.
    pub fn new(entries: impl IntoIterator<Item = String>) -> Self {
        Self {
            entries: entries.into_iter().filter(|e| !e.is_empty()).collect(),
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_blocked(&self, title: &str) -> bool {
        self.entries.iter().any(|entry| title.contains(entry.as_str()))
    }

    /// Drop every article whose title is blocked, preserving order.
    pub fn filter(&self, articles: Vec<Article>) -> Vec<Article> {
        let before = articles.len();
        let kept: Vec<Article> = articles
            .into_iter()
            .filter(|a| !self.is_blocked(&a.title))
            .collect();
        if kept.len() < before {
            tracing::debug!(removed = before - kept.len(), "Blocked headlines removed");
        }
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn titled(title: &str) -> Article {
        Article::new(title, format!("https://example.com/{}", title.len()))
    }

    #[test]
    fn test_default_entries_block() {
        let blocklist = Blocklist::default();
        assert!(blocklist.is_blocked("Musk buys another company"));
        assert!(blocklist.is_blocked("Made in the USA"));
        assert!(blocklist.is_blocked("News from America today"));
        assert!(!blocklist.is_blocked("Local bakery wins award"));
    }

    #[test]
    fn test_match_is_case_sensitive_substring() {
        let blocklist = Blocklist::default();
        // "US" matches inside other capitalized words
        assert!(blocklist.is_blocked("BUSINESS REPORT"));
        assert!(!blocklist.is_blocked("business report"));
        assert!(!blocklist.is_blocked("musk ox migration"));
    }

    #[test]
    fn test_filter_preserves_order() {
        let blocklist = Blocklist::new(vec!["Bad".to_string()]);
        let articles = vec![titled("First"), titled("Bad news"), titled("Third one")];
        let kept = blocklist.filter(articles);
        let titles: Vec<_> = kept.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Third one"]);
    }

    #[test]
    fn test_empty_entries_ignored() {
        let blocklist = Blocklist::new(vec![String::new(), "X".to_string()]);
        assert_eq!(blocklist.entries().len(), 1);
        assert!(!blocklist.is_blocked("anything"));
    }

    proptest! {
        #[test]
        fn prop_no_kept_title_contains_entry(titles in proptest::collection::vec("[A-Za-z ]{0,30}", 0..20)) {
            let blocklist = Blocklist::default();
            let articles: Vec<Article> = titles.iter().map(|t| titled(t)).collect();
            let kept = blocklist.filter(articles);
            for article in &kept {
                for entry in blocklist.entries() {
                    prop_assert!(!article.title.contains(entry.as_str()));
                }
            }
            let expected = titles.iter().filter(|t| !blocklist.is_blocked(t)).count();
            prop_assert_eq!(kept.len(), expected);
        }
    }
}
