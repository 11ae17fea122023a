//! # Cortex Data Model
//!
//! Clean DTOs for the knowledge cortex: typed entries joined by typed,
//! weighted, directed connections.
//!
//! Design rule: this module is pure data. No I/O, no async.
//! Entries arrive fully parsed from an `EntryStore`; nothing here knows
//! about the on-disk representation.

pub mod entry;
pub mod connection;
pub mod path;
pub mod value;
pub mod context;

pub use entry::{Entry, EntryType};
pub use connection::{Connection, ConnectionType, Direction, DEFAULT_WEIGHT, MAX_WEIGHT};
pub use path::EntryPath;
pub use value::{Value, compare_text, parse_number};
pub use context::{ContextMap, context_from};
