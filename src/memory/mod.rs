//! Two-tier assistant memory: canonical long-term collections plus a derived
//! contextual projection, with retention sweeping and JSON durability.
//!
//! Module tree:
//!   memory/types.rs     - Entity schema and memory-window constants
//!   memory/store.rs     - MemoryStore: owned aggregate with dedup mutators
//!   memory/context.rs   - Contextual projection recompute (pure)
//!   memory/retention.rs - Age-based eviction and fact dedup
//!   memory/persist.rs   - Tiered JSON document load/save + legacy migration

pub mod context;
pub mod persist;
pub mod retention;
pub mod store;
pub mod types;

pub use store::{MemoryStore, UpsertOutcome};
pub use types::{ContextualView, Fact, LongTermMemory, Reminder, ReminderStatus, ScheduledEvent};
