//! In-memory todo store, service operations and API client.
//!
//! # Overview
//! `TodoService` owns a `RecordStore` of todos and users and implements the
//! create / list / get / patch / delete / clear-completed operations the HTTP
//! server exposes. `TodoClient` speaks that same API from the other side
//! without touching the network (host-does-IO pattern).
//!
//! # Design
//! - The store is a plain owned value; callers that share it across tasks
//!   wrap the whole service in one lock.
//! - "Not found" is `None` / `false`, never an error.
//! - Timestamps come from an injected `Clock` so tests control time.
//! - Wire DTOs in `types` are shared by server and client.

pub mod client;
pub mod clock;
pub mod error;
pub mod http;
pub mod service;
pub mod store;
pub mod types;

pub use client::TodoClient;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ApiError, UserError, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use service::TodoService;
pub use store::{Record, RecordStore, Table};
pub use types::{
    ClearCompletedResponse, CreateTodo, ErrorResponse, MessageResponse, NewUser, Todo, TodoId,
    UpdateTodo, User, UserId,
};
