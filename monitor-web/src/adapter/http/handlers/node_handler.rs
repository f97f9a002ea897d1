use crate::adapter::cmd::node::{NodeSaveCmd, RenameNodeCmd};
use crate::adapter::query::node::NodeListQuery;
use crate::adapter::vo::node::{NodeEventVO, NodeListItemVO, NodeVO};
use crate::adapter::vo::BaseKV;
use crate::adapter::{ResList, Response, ResponseSuccess};
use crate::config::AppState;
use crate::error::{AppError, AppJson};
use crate::repo::model::node;
use crate::repo::model::node_event::NodeEventKind;
use crate::repo::sea::{NodeEventRepo, NodeFilter, NodeRepo, SeaRepo};
use crate::service::node::record_event;
use axum::extract::{Path, State};
use axum::Json;
use monitor_common::Location;

pub async fn save_node(
    State(state): State<AppState>,
    AppJson(param): AppJson<NodeSaveCmd>,
) -> Result<Json<Response<i32>>, AppError> {
    let save = param.check()?;
    let model =
        NodeRepo::insert_node_one(&state.conn, save.name, save.location, save.remark).await?;
    tracing::info!(node_id = model.id, name = %model.name, "node registered");
    record_event(
        &state.tasks,
        &state.conn,
        model.id,
        NodeEventKind::Registered,
        format!("{} @ {}", model.name, model.location),
    );
    Ok(Json(Response::success(model.id)))
}

pub async fn rename_node(
    State(state): State<AppState>,
    AppJson(param): AppJson<RenameNodeCmd>,
) -> Result<Json<Response<NodeVO>>, AppError> {
    let rename = param.check()?;
    let (before, after) = NodeRepo::rename_node(&state.conn, rename).await?;
    tracing::info!(
        node_id = after.id,
        from = %before.name,
        to = %after.name,
        location = %after.location,
        "node renamed"
    );
    record_event(
        &state.tasks,
        &state.conn,
        after.id,
        NodeEventKind::Renamed,
        format!(
            "{} @ {} -> {} @ {}",
            before.name, before.location, after.name, after.location
        ),
    );
    Ok(Json(Response::success(after.into())))
}

pub async fn get_node_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Response<NodeVO>>, AppError> {
    let model = NodeRepo::get_node_by_id(&state.conn, id).await?;
    Ok(Json(Response::success(model.into())))
}

pub async fn list_node(
    State(state): State<AppState>,
    AppJson(query): AppJson<NodeListQuery>,
) -> Result<Json<Response<ResList<NodeListItemVO>>>, AppError> {
    let filter = NodeFilter {
        name: query.name,
        location: query.location,
    };
    let page = query.page_query.init()?;
    let (total, list) = NodeRepo::find_node_by(&state.conn, page, filter).await?;
    Ok(Json(Response::success(ResList::new(
        total,
        list.into_iter().map(NodeListItemVO::from).collect(),
    ))))
}

pub async fn node_select_kv_item(
    State(state): State<AppState>,
) -> Result<Json<Response<Vec<BaseKV>>>, AppError> {
    let list = NodeRepo::node_select_kv(&state.conn).await?;
    Ok(Json(Response::success(
        list.into_iter()
            .map(|d| BaseKV {
                key: d.id.to_string(),
                value: d.name,
            })
            .collect(),
    )))
}

pub async fn list_location() -> Json<Response<Vec<&'static str>>> {
    Json(Response::success(Location::codes()))
}

pub async fn list_node_event(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Response<Vec<NodeEventVO>>>, AppError> {
    let list = NodeEventRepo::list_by_node(&state.conn, id).await?;
    Ok(Json(Response::success(
        list.into_iter().map(NodeEventVO::from).collect(),
    )))
}

pub async fn delete_node_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ResponseSuccess>, AppError> {
    SeaRepo::delete_by_id::<node::Entity>(&state.conn, id).await?;
    tracing::info!(node_id = id, "node deleted");
    record_event(
        &state.tasks,
        &state.conn,
        id,
        NodeEventKind::Deleted,
        String::new(),
    );
    Ok(Json(ResponseSuccess::default()))
}
