use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::repo::model::{node, node_event};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeVO {
    pub id: i32,
    pub name: String,
    pub location: String,
    pub remark: String,
}

impl From<node::Model> for NodeVO {
    fn from(d: node::Model) -> Self {
        Self {
            id: d.id,
            name: d.name,
            location: d.location,
            remark: d.remark,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeListItemVO {
    pub id: i32,
    pub name: String,
    pub location: String,
    pub remark: String,
    pub created_at: chrono::DateTime<Local>,
    pub updated_at: chrono::DateTime<Local>,
}

impl From<node::Model> for NodeListItemVO {
    fn from(d: node::Model) -> Self {
        Self {
            id: d.id,
            name: d.name,
            location: d.location,
            remark: d.remark,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeEventVO {
    pub id: i32,
    pub node_id: i32,
    pub kind: String,
    pub detail: String,
    pub created_at: chrono::DateTime<Local>,
}

impl From<node_event::Model> for NodeEventVO {
    fn from(d: node_event::Model) -> Self {
        Self {
            id: d.id,
            node_id: d.node_id,
            kind: d.kind,
            detail: d.detail,
            created_at: d.created_at,
        }
    }
}
