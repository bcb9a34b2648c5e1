//! Todo list view-model with optimistic updates.
//!
//! # Overview
//! Holds the local list of todos and keeps it in step with the todo service.
//! Every mutation is applied locally first and undone if the service reports
//! an error. Requests are built and responses parsed as plain data
//! (host-does-IO); a [`Transport`] can run the round-trip when the host does
//! not want to.
//!
//! # Design
//! - `TodoClient` is stateless: it holds only `base_url`.
//! - `TodoList` is the state container; its mutations are plain functions on
//!   owned data.
//! - `TodoViewModel` pairs each mutation with an undo step and settles both
//!   through one routine.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod list;
pub mod optimistic;
pub mod transport;
pub mod types;
pub mod view_model;

pub use client::TodoClient;
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use list::TodoList;
pub use optimistic::{Outcome, Pending, ToggleRollback};
pub use transport::{Transport, UreqTransport};
pub use types::{is_placeholder, Flag, NewTodo, Todo, TodoId, TodoPatch};
pub use view_model::TodoViewModel;
