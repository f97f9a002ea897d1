mod param;

pub use param::*;
