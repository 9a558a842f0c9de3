//! Memory record model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Default importance assigned when no importance hint is present
pub const DEFAULT_IMPORTANCE: u8 = 5;

/// Minimum importance a stored record may carry
pub const MIN_IMPORTANCE: u8 = 1;

/// Maximum importance a stored record may carry
pub const MAX_IMPORTANCE: u8 = 10;

/// Categories a memory can belong to
///
/// The canonical set is small and fixed, but `Custom` keeps the model open for
/// callers that bring their own taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Uncategorized memory (the default)
    General,
    /// Work-related memory (job, meetings, projects, deadlines)
    Work,
    /// Personal memory (family, friends, appointments, home)
    Personal,
    /// Creative memory (ideas, thoughts, inspiration)
    Ideas,
    /// Task or reminder memory
    Tasks,
    /// Custom category supplied by the caller
    Custom(String),
}

impl Default for Category {
    fn default() -> Self {
        Self::General
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::General => write!(f, "general"),
            Self::Work => write!(f, "work"),
            Self::Personal => write!(f, "personal"),
            Self::Ideas => write!(f, "ideas"),
            Self::Tasks => write!(f, "tasks"),
            Self::Custom(s) => write!(f, "{}", s),
        }
    }
}

impl Category {
    /// Convert a string to a Category
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "general" | "" => Self::General,
            "work" => Self::Work,
            "personal" => Self::Personal,
            "ideas" => Self::Ideas,
            "tasks" => Self::Tasks,
            other => Self::Custom(other.to_string()),
        }
    }
}

/// A single stored memory belonging to exactly one user
///
/// Ids are unique only within a user's record set; two users may both own a
/// record with `id == 1`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryRecord {
    /// Per-user monotonically assigned identifier
    pub id: i64,

    /// The external identifier of the owning user (never empty)
    pub user_id: String,

    /// The memory content (never empty after trimming)
    pub content: String,

    /// Category of the memory
    #[serde(default)]
    pub category: Category,

    /// Deduplicated tags associated with the memory
    #[serde(default)]
    pub tags: Vec<String>,

    /// Importance on a 1-10 scale
    pub importance: u8,

    /// Open string-keyed metadata map
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,

    /// When the memory was created (UTC)
    pub created_at: DateTime<Utc>,

    /// When the memory was last updated (UTC); equals `created_at` until edited
    pub updated_at: DateTime<Utc>,
}

/// A memory waiting to be persisted: everything a [`MemoryRecord`] carries
/// except the storage-assigned id and timestamps
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MemoryDraft {
    /// The memory content
    pub content: String,

    /// Category of the memory
    #[serde(default)]
    pub category: Category,

    /// Tags associated with the memory
    #[serde(default)]
    pub tags: Vec<String>,

    /// Importance on a 1-10 scale; clamped at write time
    pub importance: u8,

    /// Open string-keyed metadata map
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl MemoryDraft {
    /// Create a draft with default category and importance
    pub fn new<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
            category: Category::General,
            tags: Vec::new(),
            importance: DEFAULT_IMPORTANCE,
            metadata: HashMap::new(),
        }
    }

    /// Create a builder for more complex draft construction
    pub fn builder<S: Into<String>>(content: S) -> DraftBuilder {
        DraftBuilder::new(content)
    }

    /// Normalize the draft in place: trim content, clamp importance, and
    /// deduplicate tags while preserving insertion order
    pub fn normalize(&mut self) {
        self.content = self.content.trim().to_string();
        self.importance = clamp_importance(self.importance);

        let mut seen = std::collections::HashSet::new();
        self.tags.retain(|t| seen.insert(t.clone()));
    }

    /// Whether the content is empty after trimming whitespace
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Clamp an importance value into the valid `[1, 10]` range
pub fn clamp_importance(importance: u8) -> u8 {
    importance.clamp(MIN_IMPORTANCE, MAX_IMPORTANCE)
}

/// Clamp a possibly out-of-range signed importance (e.g. after keyword
/// adjustments) into the valid `[1, 10]` range
pub fn clamp_importance_signed(importance: i32) -> u8 {
    importance.clamp(MIN_IMPORTANCE as i32, MAX_IMPORTANCE as i32) as u8
}

/// Builder for creating [`MemoryDraft`] instances
pub struct DraftBuilder {
    draft: MemoryDraft,
}

impl DraftBuilder {
    /// Create a new draft builder with the given content
    pub fn new<S: Into<String>>(content: S) -> Self {
        Self {
            draft: MemoryDraft::new(content),
        }
    }

    /// Set the category
    pub fn category(mut self, category: Category) -> Self {
        self.draft.category = category;
        self
    }

    /// Add a single tag
    pub fn tag<S: Into<String>>(mut self, tag: S) -> Self {
        self.draft.tags.push(tag.into());
        self
    }

    /// Replace the tags
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.draft.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the importance (clamped into `[1, 10]` on build)
    pub fn importance(mut self, importance: u8) -> Self {
        self.draft.importance = importance;
        self
    }

    /// Set a single metadata entry
    pub fn metadata<S: Into<String>>(mut self, key: S, value: serde_json::Value) -> Self {
        self.draft.metadata.insert(key.into(), value);
        self
    }

    /// Build the final normalized draft
    pub fn build(mut self) -> MemoryDraft {
        self.draft.normalize();
        self.draft
    }
}

/// Aggregate statistics over one user's memories
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MemoryStats {
    /// Total number of stored memories
    pub total: u64,

    /// Memory counts keyed by category name
    pub by_category: BTreeMap<String, u64>,

    /// Number of memories created within the last 7 days
    pub recent_7d: u64,

    /// Creation time of the oldest memory, if any
    pub oldest: Option<DateTime<Utc>>,

    /// Creation time of the newest memory, if any
    pub newest: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_canonical_names() {
        for name in ["general", "work", "personal", "ideas", "tasks"] {
            let category = Category::from_str(name);
            assert_eq!(category.to_string(), name);
        }
    }

    #[test]
    fn category_preserves_unknown_names_as_custom() {
        let category = Category::from_str("recipes");
        assert_eq!(category, Category::Custom("recipes".to_string()));
        assert_eq!(category.to_string(), "recipes");
    }

    #[test]
    fn importance_is_clamped() {
        assert_eq!(clamp_importance(0), 1);
        assert_eq!(clamp_importance(5), 5);
        assert_eq!(clamp_importance(200), 10);
        assert_eq!(clamp_importance_signed(-3), 1);
        assert_eq!(clamp_importance_signed(13), 10);
    }

    #[test]
    fn normalize_deduplicates_tags_in_order() {
        let mut draft = MemoryDraft::new("  hello  ");
        draft.tags = vec!["b".into(), "a".into(), "b".into(), "a".into()];
        draft.importance = 42;
        draft.normalize();

        assert_eq!(draft.content, "hello");
        assert_eq!(draft.tags, vec!["b".to_string(), "a".to_string()]);
        assert_eq!(draft.importance, 10);
    }

    #[test]
    fn builder_normalizes_on_build() {
        let draft = MemoryDraft::builder("note")
            .category(Category::Work)
            .tag("x")
            .tag("x")
            .importance(0)
            .metadata("source", serde_json::json!("test"))
            .build();

        assert_eq!(draft.category, Category::Work);
        assert_eq!(draft.tags, vec!["x".to_string()]);
        assert_eq!(draft.importance, 1);
        assert_eq!(draft.metadata["source"], serde_json::json!("test"));
    }
}
