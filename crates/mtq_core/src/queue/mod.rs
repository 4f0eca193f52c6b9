//! The durable work queue: items, their status machine and the store.
//!
//! # Architecture
//!
//! ```text
//! QueueStore (ordered Arc<QueueItem>, cursor, aggregate status)
//!     ├── QueueItem (status, actions, attributes, current step)
//!     │       └── process: prepare → actions → write
//!     ├── observers (QueueEvent subscriptions)
//!     └── persistence (saved after every mutation)
//! ```

mod cancel;
mod errors;
mod events;
mod factory;
mod item;
mod store;
mod types;

pub use cancel::CancelHandle;
pub use errors::{ItemError, ItemResult, PrepareError, QueueError, QueueResult, WriteError};
pub use events::{QueueEvent, QueueObserver, SubscriptionId};
pub use factory::ItemFactory;
pub use item::{ItemObserver, ItemSnapshot, NoopObserver, QueueItem};
pub(crate) use store::NextItem;
pub use store::QueueStore;
pub use types::{attributes, AttributeValue, ItemStatus, QueueStatus, LARGE_FILE_THRESHOLD};
