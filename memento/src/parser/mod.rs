//! Natural-language command parsing for memory operations
//!
//! Free-form text is classified into a storage intent, a recall intent, or an
//! ambiguous result, and structured attributes (category, tags, importance,
//! time window) are extracted from it. All trigger-phrase and keyword tables
//! are fixed, ordered constants so the parser's behavior can be enumerated by
//! tests. Parsing never fails: unparseable input yields
//! [`ParsedCommand::Ambiguous`] and callers decide how to respond.

mod keywords;

pub use keywords::{
    HIGH_IMPORTANCE_KEYWORDS, LOW_IMPORTANCE_KEYWORDS, RECALL_TRIGGERS, STORE_TRIGGERS,
    TIME_PHRASES,
};

use crate::models::{clamp_importance_signed, Category, DEFAULT_IMPORTANCE};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default number of records returned by a recall when the caller does not
/// override the limit
pub const DEFAULT_RECALL_LIMIT: usize = 10;

lazy_static! {
    static ref HASHTAG_RE: Regex = Regex::new(r"#(\w+)").expect("valid hashtag regex");
}

/// Result of parsing a natural-language memory command
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum ParsedCommand {
    /// The text asks to store a memory
    Store {
        /// Memory content with trigger phrase and filler stripped
        content: String,
        /// Category derived from keyword lookup
        category: Category,
        /// Tags derived from `#hashtag` tokens
        tags: Vec<String>,
        /// Importance derived from keyword hints, clamped to `[1, 10]`
        importance: u8,
    },
    /// The text asks to recall memories
    Recall {
        /// Residual free-text query; empty means no text filter
        query: String,
        /// Category filter if a category keyword appears
        category: Option<Category>,
        /// Time window in days derived from the time-phrase table
        days_back: Option<u32>,
        /// Maximum number of records to return
        limit: usize,
    },
    /// Neither a store nor a recall trigger matched
    Ambiguous {
        /// The original input, unchanged
        raw_text: String,
    },
}

/// Parse free-form text into a memory command.
///
/// Matching is case-insensitive. When both a store and a recall trigger are
/// present, store wins: failing to persist a memory is worse than losing a
/// recall.
pub fn parse(text: &str) -> ParsedCommand {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return ParsedCommand::Ambiguous {
            raw_text: text.to_string(),
        };
    }

    // ASCII lowercasing keeps byte offsets aligned with the original text,
    // which matters when slicing the residual after a trigger match.
    let lower = trimmed.to_ascii_lowercase();

    if let Some((trigger, pos)) = find_trigger(&lower, STORE_TRIGGERS) {
        return parse_store(trimmed, &lower, pos + trigger.len());
    }

    if let Some((trigger, pos)) = find_trigger(&lower, RECALL_TRIGGERS) {
        return parse_recall(trimmed, &lower, pos + trigger.len());
    }

    ParsedCommand::Ambiguous {
        raw_text: text.to_string(),
    }
}

/// Parse text with a caller-declared intent, bypassing trigger classification
/// for the chosen branch. Used by the diagnostic `parse_memory_command` tool.
pub fn parse_as(text: &str, intent: DeclaredIntent) -> ParsedCommand {
    let trimmed = text.trim();
    let lower = trimmed.to_ascii_lowercase();

    match intent {
        DeclaredIntent::Store => {
            // Strip a leading trigger when present, otherwise keep everything.
            let after = find_trigger(&lower, STORE_TRIGGERS)
                .map(|(trigger, pos)| pos + trigger.len())
                .unwrap_or(0);
            parse_store(trimmed, &lower, after)
        }
        DeclaredIntent::Recall => {
            let after = find_trigger(&lower, RECALL_TRIGGERS)
                .map(|(trigger, pos)| pos + trigger.len())
                .unwrap_or(0);
            parse_recall(trimmed, &lower, after)
        }
    }
}

/// A caller-declared command type for [`parse_as`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredIntent {
    /// Force the store branch
    Store,
    /// Force the recall branch
    Recall,
}

/// Find the first trigger (in table order) contained in the lowercased input,
/// returning the trigger and its byte position.
fn find_trigger(lower: &str, triggers: &'static [&'static str]) -> Option<(&'static str, usize)> {
    for &trigger in triggers {
        if let Some(pos) = lower.find(trigger) {
            return Some((trigger, pos));
        }
    }
    None
}

fn parse_store(original: &str, lower: &str, after: usize) -> ParsedCommand {
    let mut rest = &original[after..];

    // Strip filler words and punctuation left behind by the trigger, plus any
    // chained store trigger ("Hey Memento, remember that ...").
    loop {
        let stripped = strip_filler(rest);
        let stripped_lower = stripped.to_ascii_lowercase();
        let chained = STORE_TRIGGERS
            .iter()
            .find(|t| stripped_lower.starts_with(**t));
        match chained {
            Some(trigger) => rest = &stripped[trigger.len()..],
            None => {
                rest = stripped;
                break;
            }
        }
    }

    let content = if rest.trim().is_empty() {
        // Never produce an empty memory from a non-empty command.
        original.to_string()
    } else {
        rest.trim().to_string()
    };

    let tags = extract_tags(original);
    let importance = extract_importance(lower);
    let category = keywords::detect_category(lower).unwrap_or(Category::General);

    ParsedCommand::Store {
        content,
        category,
        tags,
        importance,
    }
}

fn parse_recall(original: &str, lower: &str, after: usize) -> ParsedCommand {
    let residual = &original[after..];
    let residual_lower = &lower[after..];

    let days_back = keywords::detect_days_back(lower);
    let category = keywords::detect_category(lower);
    let query = clean_query(residual, residual_lower);

    ParsedCommand::Recall {
        query,
        category,
        days_back,
        limit: DEFAULT_RECALL_LIMIT,
    }
}

/// Remove leading filler tokens ("that", "this") and punctuation from the
/// residual text after a trigger phrase.
fn strip_filler(text: &str) -> &str {
    let mut rest = text.trim_start();
    loop {
        let before = rest;
        rest = rest.trim_start_matches([':', ',', '-']).trim_start();
        for filler in ["that", "this"] {
            let lower = rest.to_ascii_lowercase();
            if lower == filler {
                rest = "";
            } else if lower.starts_with(filler)
                && rest[filler.len()..].starts_with(|c: char| c.is_whitespace())
            {
                rest = rest[filler.len()..].trim_start();
            }
        }
        if rest == before {
            return rest;
        }
    }
}

/// Strip time phrases and surrounding punctuation from a recall query.
fn clean_query(residual: &str, residual_lower: &str) -> String {
    let mut cleaned = residual.to_string();

    // Remove time phrases case-insensitively using the lowered copy for
    // positions; phrases are ASCII so byte offsets line up.
    let mut lowered = residual_lower.to_string();
    for (phrase, _) in TIME_PHRASES {
        while let Some(pos) = keywords::find_word_boundary(&lowered, phrase) {
            cleaned.replace_range(pos..pos + phrase.len(), "");
            lowered.replace_range(pos..pos + phrase.len(), "");
        }
    }

    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c.is_whitespace() || "?.!,;:".contains(c))
        .to_string()
}

/// Extract `#hashtag` tokens from the original text as tags.
fn extract_tags(text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    HASHTAG_RE
        .captures_iter(text)
        .map(|c| c[1].to_lowercase())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Derive importance from keyword hints: base 5, +3 for high-importance
/// keywords, -2 for low-importance keywords, clamped to `[1, 10]`.
fn extract_importance(lower: &str) -> u8 {
    let mut importance = DEFAULT_IMPORTANCE as i32;
    if HIGH_IMPORTANCE_KEYWORDS
        .iter()
        .any(|w| keywords::contains_word(lower, w))
    {
        importance += 3;
    }
    if LOW_IMPORTANCE_KEYWORDS
        .iter()
        .any(|w| keywords::contains_word(lower, w))
    {
        importance -= 2;
    }
    clamp_importance_signed(importance)
}
