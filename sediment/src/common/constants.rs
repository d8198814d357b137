// doc constants
pub const DOC_ID: &str = "_id";
pub const DOC_CREATED: &str = "created";
pub const DOC_MODIFIED: &str = "modified";

// key constants
pub const KEY_SEPARATOR: &str = ":";
pub const LITERAL_MARKER: char = '#';
pub const FIELD_MARKER: char = '$';

// listing constants
pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 50;

// accessor constants
pub const GET_BY_PREFIX: &str = "get_by_";
pub const LIST_BY_PREFIX: &str = "list_by_";

// crate constants
pub const SEDIMENT_VERSION: &str = env!("CARGO_PKG_VERSION");
