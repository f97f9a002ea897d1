mod node_handler;
mod task_handler;

pub use node_handler::*;
pub use task_handler::*;
