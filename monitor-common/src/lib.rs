//! common

mod defaults;
mod location;

pub use defaults::*;
pub use location::*;
