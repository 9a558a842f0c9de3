//! Trigger-phrase and keyword tables for the command parser
//!
//! Every table is an explicit ordered list. Lookup iterates in table order and
//! the first match wins, so the parser's behavior is fully determined by what
//! is written here. Treat the exact word lists as configuration: tests
//! enumerate them, and changing an entry is a behavior change.

use crate::models::Category;

/// Phrases that signal storage intent, checked in order
pub const STORE_TRIGGERS: &[&str] = &[
    "hey memento",
    "remember that",
    "remember this",
    "store this",
    "save this memory",
    "i want you to remember",
    "don't forget",
    "memorize this",
    "keep in mind",
    "note this down",
];

/// Phrases that signal recall intent, checked in order
pub const RECALL_TRIGGERS: &[&str] = &[
    "what did i tell you",
    "what did i ask you to remember",
    "what memories",
    "what do you remember",
    "show me",
    "tell me about",
    "recall",
];

/// Keywords that raise importance by 3
pub const HIGH_IMPORTANCE_KEYWORDS: &[&str] =
    &["important", "crucial", "critical", "urgent", "deadline"];

/// Keywords that lower importance by 2
pub const LOW_IMPORTANCE_KEYWORDS: &[&str] = &["maybe", "minor", "small", "trivial"];

/// Time phrases mapped to a `days_back` window, checked in order
pub const TIME_PHRASES: &[(&str, u32)] = &[
    ("today", 1),
    ("yesterday", 2),
    ("this week", 7),
    ("last week", 14),
    ("this month", 30),
    ("last month", 60),
    ("this year", 365),
];

/// Category keyword tables, checked in order; the first category with a
/// matching keyword wins
pub const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Work,
        &["work", "job", "meeting", "project", "deadline", "office"],
    ),
    (
        Category::Personal,
        &[
            "family",
            "personal",
            "friend",
            "home",
            "appointment",
            "dentist",
            "doctor",
            "birthday",
        ],
    ),
    (
        Category::Ideas,
        &[
            "idea",
            "ideas",
            "thought",
            "thoughts",
            "concept",
            "brainstorm",
            "inspiration",
        ],
    ),
    (
        Category::Tasks,
        &["task", "tasks", "todo", "reminder", "errand"],
    ),
];

/// Detect a category from lowercased text using [`CATEGORY_KEYWORDS`].
pub fn detect_category(lower: &str) -> Option<Category> {
    for (category, words) in CATEGORY_KEYWORDS {
        if words.iter().any(|w| contains_word(lower, w)) {
            return Some(category.clone());
        }
    }
    None
}

/// Detect a `days_back` window from lowercased text using [`TIME_PHRASES`].
pub fn detect_days_back(lower: &str) -> Option<u32> {
    for (phrase, days) in TIME_PHRASES {
        if contains_word(lower, phrase) {
            return Some(*days);
        }
    }
    None
}

/// Whether `needle` occurs in `haystack` on word boundaries.
///
/// A boundary is any position not flanked by an alphanumeric character, so
/// "small" does not match inside "smallish" but does match in "a small box".
/// Multi-word phrases ("last week") are matched the same way.
pub fn contains_word(haystack: &str, needle: &str) -> bool {
    find_word_boundary(haystack, needle).is_some()
}

/// Find the byte position of the first word-boundary occurrence of `needle`
/// in `haystack`, or `None`.
pub fn find_word_boundary(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }

    let mut start = 0;
    while let Some(offset) = haystack[start..].find(needle) {
        let pos = start + offset;
        let end = pos + needle.len();

        let left_ok = pos == 0
            || !haystack[..pos]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric());
        let right_ok = end == haystack.len()
            || !haystack[end..]
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric());

        if left_ok && right_ok {
            return Some(pos);
        }
        start = pos + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_boundaries_are_respected() {
        assert!(contains_word("a small box", "small"));
        assert!(!contains_word("a smallish box", "small"));
        assert!(contains_word("deadline!", "deadline"));
        assert!(contains_word("last week?", "last week"));
        assert!(!contains_word("lastweek", "last week"));
    }

    #[test]
    fn category_table_order_is_deterministic() {
        // "meeting" (work) appears before the personal table is consulted
        assert_eq!(
            detect_category("meeting with a friend"),
            Some(Category::Work)
        );
        assert_eq!(detect_category("my friend dana"), Some(Category::Personal));
        assert_eq!(detect_category("nothing here"), None);
    }

    #[test]
    fn time_table_first_match_wins() {
        assert_eq!(detect_days_back("this week and last month"), Some(7));
        assert_eq!(detect_days_back("last week"), Some(14));
        assert_eq!(detect_days_back("no time here"), None);
    }

    #[test]
    fn trigger_tables_are_lowercase() {
        for trigger in STORE_TRIGGERS.iter().chain(RECALL_TRIGGERS.iter()) {
            assert_eq!(*trigger, trigger.to_lowercase(), "{trigger}");
        }
    }
}
