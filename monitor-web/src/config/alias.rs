//! runtime state

use std::sync::Arc;

use super::{AppConfig, Db};
use crate::error::AppError;
use crate::repo::sea::SeaRepo;
use crate::service::task::TaskPool;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

#[derive(Clone)]
pub struct AppState {
    pub conn: DatabaseConnection,
    pub tasks: Arc<TaskPool>,
}

impl AppState {
    /// Connects the database, creates missing tables and starts the task pool.
    pub async fn build(config: &AppConfig) -> Result<AppState, AppError> {
        let conn = connect_db(&config.db_config).await?;
        SeaRepo::init_schema(&conn).await?;
        let tasks = Arc::new(TaskPool::new(&config.task));
        tracing::debug!("app state initialized");
        Ok(AppState { conn, tasks })
    }
}

pub async fn connect_db(db: &Db) -> Result<DatabaseConnection, AppError> {
    let mut opt = ConnectOptions::new(db.connect_url());
    opt.sqlx_logging(false);
    if let Db::Sqlite(sqlite) = db {
        if sqlite.is_memory() {
            // every pooled connection would open its own empty database
            opt.max_connections(1);
        }
    }
    match Database::connect(opt).await {
        Ok(conn) => {
            tracing::debug!("db conn initialized");
            Ok(conn)
        }
        Err(e) => {
            tracing::error!("create db conn error: {:?}", e);
            Err(e.into())
        }
    }
}
