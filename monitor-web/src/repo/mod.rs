pub mod model;
pub mod sea;
