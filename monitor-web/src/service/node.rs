//! node audit events

use sea_orm::DatabaseConnection;
use tracing::{info, warn};

use crate::repo::model::node_event::NodeEventKind;
use crate::repo::sea::NodeEventRepo;
use crate::service::task::{TaskId, TaskPool};

/// Queues an audit row for `node_id`. The caller's mutation is already
/// committed, so a full or closed pool only drops the event.
pub fn record_event(
    pool: &TaskPool,
    conn: &DatabaseConnection,
    node_id: i32,
    kind: NodeEventKind,
    detail: String,
) -> Option<TaskId> {
    let conn = conn.clone();
    let task = async move {
        NodeEventRepo::insert_event(&conn, node_id, kind, detail).await?;
        info!(node_id, kind = %kind, "node event recorded");
        anyhow::Ok(())
    };
    match pool.try_submit(format!("node-event:{kind}"), task) {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(node_id, kind = %kind, "node event dropped: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TaskConfig;
    use crate::repo::sea::tests::memory_db;
    use std::time::Duration;

    #[tokio::test]
    async fn event_is_written_by_pool() {
        let conn = memory_db().await;
        let pool = TaskPool::new(&TaskConfig::default());
        assert!(record_event(&pool, &conn, 7, NodeEventKind::Renamed, "a -> b".into()).is_some());
        pool.shutdown(Duration::from_secs(5)).await;

        let events = NodeEventRepo::list_by_node(&conn, 7).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, "renamed");
        assert_eq!(events[0].detail, "a -> b");

        // closed pool drops the event
        assert!(record_event(&pool, &conn, 7, NodeEventKind::Deleted, String::new()).is_none());
    }
}
