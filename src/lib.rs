//! Shared Jeeves library exports that keep the binary aligned on engine behavior.

pub mod calendar;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod initiator;
pub mod intent;
pub mod memory;
pub mod scheduler;
pub mod session;
pub mod speech;
mod telemetry;
pub mod timefmt;

pub use error::EngineError;
pub use intent::{ActionKind, Intent};
pub use memory::store::MemoryStore;
pub use session::{Engine, ListenGuard};
pub use telemetry::init_tracing;
