mod node;
mod node_event;

pub use node::*;
pub use node_event::*;

use crate::repo::model::{node as node_model, node_event as node_event_model};
use sea_orm::{ConnectionTrait, DbConn, DbErr, EntityTrait, PrimaryKeyTrait, Schema};

pub struct SeaRepo;

impl SeaRepo {
    /// Creates every table that does not exist yet.
    pub async fn init_schema(db: &DbConn) -> Result<(), DbErr> {
        let backend = db.get_database_backend();
        let schema = Schema::new(backend);
        for mut stmt in [
            schema.create_table_from_entity(node_model::Entity),
            schema.create_table_from_entity(node_event_model::Entity),
        ] {
            stmt.if_not_exists();
            db.execute(backend.build(&stmt)).await?;
        }
        tracing::debug!("schema initialized");
        Ok(())
    }

    pub async fn delete_by_id<E>(
        db: &DbConn,
        id: <E::PrimaryKey as PrimaryKeyTrait>::ValueType,
    ) -> Result<(), DbErr>
    where
        E: EntityTrait,
    {
        let res = E::delete_by_id(id).exec(db).await?;
        if res.rows_affected == 0 {
            return Err(DbErr::RecordNotFound(E::default().table_name().to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use sea_orm::{ConnectOptions, Database, DatabaseConnection};

    use super::SeaRepo;

    pub(crate) async fn memory_db() -> DatabaseConnection {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).sqlx_logging(false);
        let conn = Database::connect(opt).await.unwrap();
        SeaRepo::init_schema(&conn).await.unwrap();
        conn
    }

    #[tokio::test]
    async fn init_schema_is_repeatable() {
        let conn = memory_db().await;
        SeaRepo::init_schema(&conn).await.unwrap();
    }
}
