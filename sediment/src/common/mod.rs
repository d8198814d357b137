pub mod constants;
pub mod defaults;
pub mod util;
pub mod value;

pub use constants::*;
pub use defaults::{Defaults, DefaultsProvider, StandardDefaults};
pub use util::{atomic, fan_out_join, Atomic, ReadExecutor, WriteExecutor};
pub use value::Value;
