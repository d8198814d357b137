mod store;

pub use store::InMemoryKvStore;
