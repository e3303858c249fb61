//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    ClearCompletedResponse, CreateTodo, ErrorResponse, MessageResponse, Todo, TodoId, UpdateTodo,
};

const TODOS_PATH: &str = "/api/todos";

#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        self.request(HttpMethod::Get, TODOS_PATH.to_string())
    }

    pub fn build_get_todo(&self, id: TodoId) -> HttpRequest {
        self.request(HttpMethod::Get, format!("{TODOS_PATH}/{id}"))
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, TODOS_PATH.to_string(), input)
    }

    pub fn build_update_todo(&self, id: TodoId, patch: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Patch, format!("{TODOS_PATH}/{id}"), patch)
    }

    pub fn build_delete_todo(&self, id: TodoId) -> HttpRequest {
        self.request(HttpMethod::Delete, format!("{TODOS_PATH}/{id}"))
    }

    pub fn build_clear_completed(&self) -> HttpRequest {
        self.request(HttpMethod::Delete, format!("{TODOS_PATH}/completed/clear"))
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        decode(&response, 200)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        decode(&response, 200)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        decode(&response, 201)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        decode(&response, 200)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        decode::<MessageResponse>(&response, 200).map(|_| ())
    }

    /// Returns how many completed todos the server removed.
    pub fn parse_clear_completed(&self, response: HttpResponse) -> Result<usize, ApiError> {
        decode::<ClearCompletedResponse>(&response, 200).map(|body| body.count)
    }

    fn request(&self, method: HttpMethod, path: String) -> HttpRequest {
        HttpRequest {
            method,
            url: format!("{}{path}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        path: String,
        payload: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(payload).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut request = self.request(method, path);
        request
            .headers
            .push(("content-type".to_string(), "application/json".to_string()));
        request.body = Some(body);
        Ok(request)
    }
}

fn decode<T: DeserializeOwned>(response: &HttpResponse, expected: u16) -> Result<T, ApiError> {
    check_status(response, expected)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    match response.status {
        status if status == expected => Ok(()),
        404 => Err(ApiError::NotFound),
        400 => match serde_json::from_str::<ErrorResponse>(&response.body) {
            Ok(body) => Err(ApiError::BadRequest {
                message: body.message,
                errors: body.errors.unwrap_or_default(),
            }),
            Err(_) => Err(ApiError::HttpError {
                status: 400,
                body: response.body.clone(),
            }),
        },
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}
