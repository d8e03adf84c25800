// Gesture Lock - Core Library
// Grid hit testing, the set/confirm/verify session and credential storage

pub mod config;
pub mod grid;
pub mod pattern;
pub mod session;
pub mod store;
pub mod trail;

#[cfg(feature = "tui")]
pub mod ui;

// Re-export commonly used types
pub use config::LockConfig;
pub use grid::{locate, GridCell, GridGeometry, GRID_CELLS, GRID_SIDE};
pub use pattern::{GestureSequence, PatternCode};
pub use session::{Mode, ModeSelection, Outcome, PatternSession, WorkflowState, MIN_PATTERN_LEN};
pub use store::{CredentialStore, MemoryStore, SqliteStore, StoredCredential, DEFAULT_CREDENTIAL_KEY};
pub use trail::{Segment, Trail};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
