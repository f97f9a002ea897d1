use crate::adapter::vo::task::TaskStatsVO;
use crate::adapter::Response;
use crate::config::AppState;
use axum::extract::State;
use axum::Json;

pub async fn task_stats(State(state): State<AppState>) -> Json<Response<TaskStatsVO>> {
    Json(Response::success(state.tasks.stats()))
}
