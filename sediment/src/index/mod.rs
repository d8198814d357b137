pub mod definition;
pub mod maintenance;
pub mod template;

pub use definition::{HashIndex, IndexDefinition, IndexRegistry, IndexRegistryBuilder, SortedIndex};
pub use maintenance::IndexMaintenance;
pub use template::KeyTemplate;
