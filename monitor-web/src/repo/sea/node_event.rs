//! node event repo
use crate::repo::model::node_event::{self, NodeEventKind};
use chrono::Local;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, DbErr, EntityTrait, Order, QueryFilter, QueryOrder,
};

pub struct NodeEventRepo;

impl NodeEventRepo {
    pub async fn insert_event(
        db: &DbConn,
        node_id: i32,
        kind: NodeEventKind,
        detail: String,
    ) -> Result<node_event::Model, DbErr> {
        node_event::ActiveModel {
            node_id: Set(node_id),
            kind: Set(kind.to_string()),
            detail: Set(detail),
            created_at: Set(Local::now()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    /// Newest first.
    pub async fn list_by_node(db: &DbConn, node_id: i32) -> Result<Vec<node_event::Model>, DbErr> {
        node_event::Entity::find()
            .filter(node_event::Column::NodeId.eq(node_id))
            .order_by(node_event::Column::Id, Order::Desc)
            .all(db)
            .await
    }
}
