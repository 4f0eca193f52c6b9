//! Durable binary representation of the queue.
//!
//! File layout:
//!
//! ```text
//! "MTQ1" | schema version (u16 LE) | bitcode(PersistedQueue)
//! ```
//!
//! Actions are stored as `(tag, payload)` records so that a queue written
//! by a newer build with extra action kinds still loads: unknown tags are
//! dropped one action at a time. Paths are stored as raw bytes, so
//! non-UTF-8 names survive a reload. Older schema versions are upgraded
//! on load; newer ones are rejected.

mod codec;
mod errors;

pub use codec::{decode_queue, encode_queue, load_queue, save_queue, SCHEMA_VERSION};
pub use errors::{PersistenceError, PersistenceResult};
