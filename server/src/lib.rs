//! HTTP adapter around `TodoService`.
//!
//! Parses ids and bodies, calls exactly one service operation per request,
//! and turns "not found" outcomes into 404 responses. Every error body is an
//! `ErrorResponse`.

pub mod config;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use log::{info, warn};
use tokio::{net::TcpListener, sync::RwLock};

use todo_core::{
    ClearCompletedResponse, Clock, CreateTodo, ErrorResponse, MessageResponse, SystemClock, Todo,
    TodoId, TodoService, UpdateTodo,
};

/// The one service instance of the process. The lock serializes id
/// assignment and read-modify-write updates.
pub type SharedService<C = SystemClock> = Arc<RwLock<TodoService<C>>>;

/// Router backed by a fresh, empty store.
pub fn app() -> Router {
    router(Arc::new(RwLock::new(TodoService::new())))
}

pub fn router<C: Clock + 'static>(service: SharedService<C>) -> Router {
    Router::new()
        .route("/api/todos", get(list_todos::<C>).post(create_todo::<C>))
        .route("/api/todos/completed/clear", delete(clear_completed::<C>))
        .route(
            "/api/todos/{id}",
            get(get_todo::<C>)
                .patch(update_todo::<C>)
                .delete(delete_todo::<C>),
        )
        .layer(middleware::from_fn(log_requests))
        .with_state(service)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Request failures, each mapped to a status and an `ErrorResponse`.
#[derive(Debug)]
pub enum HandlerError {
    InvalidId,
    InvalidBody(Vec<String>),
    NotFound,
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            HandlerError::InvalidId => (StatusCode::BAD_REQUEST, "Invalid todo ID", None),
            HandlerError::InvalidBody(errors) => {
                (StatusCode::BAD_REQUEST, "Invalid todo data", Some(errors))
            }
            HandlerError::NotFound => (StatusCode::NOT_FOUND, "Todo not found", None),
        };
        let body = ErrorResponse {
            message: message.to_string(),
            errors,
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for HandlerError {
    fn from(rejection: JsonRejection) -> Self {
        HandlerError::InvalidBody(vec![rejection.body_text()])
    }
}

fn parse_id(raw: &str) -> Result<TodoId, HandlerError> {
    raw.parse().map_err(|_| HandlerError::InvalidId)
}

async fn list_todos<C: Clock>(State(service): State<SharedService<C>>) -> Json<Vec<Todo>> {
    Json(service.read().await.get_all())
}

async fn get_todo<C: Clock>(
    State(service): State<SharedService<C>>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, HandlerError> {
    let id = parse_id(&id)?;
    service
        .read()
        .await
        .get_one(id)
        .map(Json)
        .ok_or(HandlerError::NotFound)
}

async fn create_todo<C: Clock>(
    State(service): State<SharedService<C>>,
    payload: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), HandlerError> {
    let Json(input) = payload?;
    input
        .validate()
        .map_err(|err| HandlerError::InvalidBody(vec![err.to_string()]))?;
    let todo = service.write().await.create(input);
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo<C: Clock>(
    State(service): State<SharedService<C>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTodo>, JsonRejection>,
) -> Result<Json<Todo>, HandlerError> {
    let id = parse_id(&id)?;
    let Json(patch) = payload?;
    patch
        .validate()
        .map_err(|err| HandlerError::InvalidBody(vec![err.to_string()]))?;
    service
        .write()
        .await
        .update(id, patch)
        .map(Json)
        .ok_or(HandlerError::NotFound)
}

async fn delete_todo<C: Clock>(
    State(service): State<SharedService<C>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, HandlerError> {
    let id = parse_id(&id)?;
    if !service.write().await.delete(id) {
        return Err(HandlerError::NotFound);
    }
    Ok(Json(MessageResponse {
        message: "Todo deleted successfully".to_string(),
    }))
}

async fn clear_completed<C: Clock>(
    State(service): State<SharedService<C>>,
) -> Json<ClearCompletedResponse> {
    let count = service.write().await.clear_completed();
    Json(ClearCompletedResponse::new(count))
}

/// Logs `METHOD path STATUS in Nms` for every `/api` request.
async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    if path.starts_with("/api") {
        let status = response.status();
        let elapsed = started.elapsed().as_millis();
        if status.is_server_error() {
            warn!("{method} {path} {} in {elapsed}ms", status.as_u16());
        } else {
            info!("{method} {path} {} in {elapsed}ms", status.as_u16());
        }
    }
    response
}
