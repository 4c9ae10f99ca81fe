pub mod atomic_writer;
pub mod json_table_store;
pub mod memory_store;
#[cfg(feature = "sqlite")]
pub mod sqlite_store;
pub mod tables;

pub use atomic_writer::AtomicWriter;
pub use json_table_store::{JsonEnvelope, JsonTableStore};
pub use memory_store::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite_store::SqliteStore;
pub use tables::Tables;
