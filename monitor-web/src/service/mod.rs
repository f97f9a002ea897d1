pub mod node;
pub mod task;
