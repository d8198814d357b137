pub mod batch;
pub mod kv_store;
pub mod memory;

pub use batch::{BatchOp, WriteBatch};
pub use kv_store::{KvStore, KvStoreProvider, RangeOrder};
pub use memory::InMemoryKvStore;
