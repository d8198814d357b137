pub mod task_util;
pub mod type_utils;

pub use task_util::fan_out_join;
pub use type_utils::{atomic, Atomic, ReadExecutor, WriteExecutor};
