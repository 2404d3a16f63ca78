/// Host-supplied leaf predicate over `(name, value)`.
pub type LeafPredicate<V> = dyn Fn(&str, &V) -> bool;

/// Substring filter applied to leaf names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextFilter {
    text: String,
    needle: String,
    case_sensitive: bool,
}

impl TextFilter {
    pub fn new(text: impl Into<String>, case_sensitive: bool) -> Self {
        let text = text.into();
        let needle = normalize(&text, case_sensitive);
        Self {
            text,
            needle,
            case_sensitive,
        }
    }

    /// Raw filter text as typed by the user.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Whether the filter matches everything (blank text).
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches(&self, name: &str) -> bool {
        if self.needle.is_empty() {
            return true;
        }

        if self.case_sensitive {
            name.contains(&self.needle)
        } else {
            name.to_lowercase().contains(&self.needle)
        }
    }
}

fn normalize(text: &str, case_sensitive: bool) -> String {
    let trimmed = text.trim();
    if case_sensitive {
        trimmed.to_owned()
    } else {
        trimmed.to_lowercase()
    }
}

/// Leaf filter used by a single rebuild.
pub enum Filter<'a, V> {
    /// Every leaf matches.
    All,
    Text(&'a TextFilter),
    Predicate(&'a LeafPredicate<V>),
}

impl<V> Filter<'_, V> {
    /// Whether the filter can reject leaves.
    ///
    /// Active filters force matching subtrees open when the selector is
    /// configured to expand matches.
    pub fn is_active(&self) -> bool {
        match self {
            Filter::All => false,
            Filter::Text(text) => !text.is_empty(),
            Filter::Predicate(_) => true,
        }
    }

    pub fn matches(&self, name: &str, value: &V) -> bool {
        match self {
            Filter::All => true,
            Filter::Text(text) => text.matches(name),
            Filter::Predicate(predicate) => predicate(name, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Filter, LeafPredicate, TextFilter};

    #[test]
    fn blank_filter_matches_everything() {
        let filter = TextFilter::new("   ", false);

        assert!(filter.is_empty());
        assert!(filter.matches("anything"));
        assert!(!Filter::<()>::Text(&filter).is_active());
    }

    #[test]
    fn matching_ignores_case_by_default() {
        let filter = TextFilter::new(" Main ", false);

        assert!(filter.matches("src/MAIN.rs"));
        assert!(filter.matches("domain"));
        assert!(!filter.matches("lib.rs"));
        assert_eq!(filter.text(), " Main ");
    }

    #[test]
    fn case_sensitive_filter_respects_case() {
        let filter = TextFilter::new("Main", true);

        assert!(filter.matches("Main.java"));
        assert!(!filter.matches("main.java"));
    }

    #[test]
    fn predicate_filter_sees_payload() {
        let even: &LeafPredicate<u32> = &|_: &str, value: &u32| value % 2 == 0;
        let filter = Filter::Predicate(even);

        assert!(filter.is_active());
        assert!(filter.matches("a", &4));
        assert!(!filter.matches("a", &3));
    }
}
