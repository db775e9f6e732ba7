use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, patch};
use axum::{Form, Json, Router};
use serde::Deserialize;
use shared::{CreateTaskRequest, FilterOptions, Pagination};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::{Error, Result};
use crate::render;
use crate::storage::TaskStorage;

#[derive(Clone)]
pub struct AppState {
    pub storage: TaskStorage,
    pub page_size: u64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/fragment", get(task_fragment))
        .route("/tasks/toggle/:id", patch(toggle_task))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    page: Option<u64>,
    search: Option<String>,
    completed: Option<String>,
}

impl ListParams {
    fn into_options(self, page_size: u64) -> FilterOptions {
        FilterOptions {
            page: self.page.unwrap_or(1),
            page_size,
            search: self.search.unwrap_or_default(),
            // unparsable values are ignored, not rejected
            completed: self.completed.and_then(|raw| raw.parse().ok()),
        }
    }
}

async fn health() -> &'static str {
    "Healthy!"
}

async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Pagination>> {
    let opts = params.into_options(state.page_size);
    Ok(Json(state.storage.list(&opts).await?))
}

async fn task_fragment(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Html<String>> {
    let opts = params.into_options(state.page_size);
    let page = state.storage.list(&opts).await?;
    Ok(Html(render::task_list(&page, &opts)))
}

async fn create_task(
    State(state): State<AppState>,
    Form(req): Form<CreateTaskRequest>,
) -> Result<(StatusCode, Html<String>)> {
    if req.title.trim().is_empty() {
        return Err(Error::InvalidArgument("title is required".to_string()));
    }
    state.storage.create(&req.title, &req.description).await?;

    // respond with the refreshed first page so the client can swap it in
    let opts = FilterOptions {
        page_size: state.page_size,
        ..FilterOptions::new()
    };
    let page = state.storage.list(&opts).await?;
    Ok((StatusCode::CREATED, Html(render::task_list(&page, &opts))))
}

async fn toggle_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Html<String>> {
    state.storage.toggle(&id).await?;
    let opts = params.into_options(state.page_size);
    let page = state.storage.list(&opts).await?;
    Ok(Html(render::task_list(&page, &opts)))
}
