pub mod task;

pub use task::{parse_completion, NewTask, Task, TaskUpdate};
