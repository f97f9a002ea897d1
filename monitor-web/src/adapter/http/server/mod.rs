mod axum_server;

pub use axum_server::*;
