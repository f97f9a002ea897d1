use serde::{Deserialize, Serialize};

pub mod node;
pub mod task;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BaseKV {
    pub key: String,
    pub value: String,
}
