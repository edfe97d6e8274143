//! Record store layer
//!
//! Every repository reads and writes through a [`RecordStore`]:
//! - whole-collection get/set/remove of JSON object records
//! - persisted boolean flags (migration bookkeeping)
//! - id allocation
//!
//! [`Table`] gives a typed view of one collection on top of any backend.

mod error;
mod file;
mod ids;
mod memory;
mod sync;
mod table;
mod traits;

pub use error::{Result, StoreError};
pub use file::FileRecordStore;
pub use ids::SequentialIds;
pub use memory::InMemoryRecordStore;
pub use sync::{SYNC_JOURNAL, SyncedStore};
pub use table::Table;
pub use traits::{Record, RecordStore};
