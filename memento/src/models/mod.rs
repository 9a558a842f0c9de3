//! Data models used throughout the Memento system

mod memory;

pub use memory::{
    clamp_importance, clamp_importance_signed, Category, DraftBuilder, MemoryDraft, MemoryRecord,
    MemoryStats, DEFAULT_IMPORTANCE, MAX_IMPORTANCE, MIN_IMPORTANCE,
};
