//! node repo
use crate::adapter::cmd::node::ValidRenameNode;
use crate::repo::model::node;
use chrono::Local;
use monitor_common::Location;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, DbErr, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder,
};

pub struct NodeRepo;

#[derive(Debug, Clone, Default)]
pub struct NodeFilter {
    pub name: Option<String>,
    pub location: Option<String>,
}

impl NodeFilter {
    fn condition(self) -> Condition {
        let mut cond = Condition::all();
        if let Some(name) = self.name.filter(|n| !n.is_empty()) {
            cond = cond.add(node::Column::Name.contains(name));
        }
        if let Some(location) = self.location.filter(|l| !l.is_empty()) {
            cond = cond.add(node::Column::Location.eq(location));
        }
        cond
    }
}

impl NodeRepo {
    pub async fn insert_node_one(
        db: &DbConn,
        name: String,
        location: Location,
        remark: String,
    ) -> Result<node::Model, DbErr> {
        let now = Local::now();
        node::ActiveModel {
            name: Set(name),
            location: Set(location.to_string()),
            remark: Set(remark),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    /// Sets name and location of an existing node, returning it as it was
    /// before and after the change.
    pub async fn rename_node(
        db: &DbConn,
        rename: ValidRenameNode,
    ) -> Result<(node::Model, node::Model), DbErr> {
        let before = NodeRepo::get_node_by_id(db, rename.id).await?;
        let mut active: node::ActiveModel = before.clone().into();
        active.name = Set(rename.node);
        active.location = Set(rename.location.to_string());
        active.updated_at = Set(Local::now());
        let after = active.update(db).await?;
        Ok((before, after))
    }

    pub async fn get_node_by_id(db: &DbConn, id: i32) -> Result<node::Model, DbErr> {
        node::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("node".to_string()))
    }

    pub async fn find_node_by(
        db: &DbConn,
        (page, size): (u64, u64),
        filter: NodeFilter,
    ) -> Result<(u64, Vec<node::Model>), DbErr> {
        let page = page.saturating_sub(1);
        if page.checked_mul(size).is_none() {
            return Err(DbErr::Custom(format!("page {} out of range", page + 1)));
        }
        let paginator = node::Entity::find()
            .filter(filter.condition())
            .order_by(node::Column::Id, Order::Asc)
            .paginate(db, size);
        let total = paginator.num_items().await?;
        let list = paginator.fetch_page(page).await?;
        Ok((total, list))
    }

    pub async fn node_select_kv(db: &DbConn) -> Result<Vec<node::Model>, DbErr> {
        node::Entity::find()
            .order_by(node::Column::CreatedAt, Order::Desc)
            .all(db)
            .await
    }
}
