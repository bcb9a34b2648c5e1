//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates.

use serde::{Deserialize, Serialize};

/// Identifier assigned by the todo service. Negative values are client-side
/// placeholders that only exist until a create request settles.
pub type TodoId = i64;

/// True for ids handed out locally before the service has answered.
pub fn is_placeholder(id: TodoId) -> bool {
    id < 0
}

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub desc: String,
    pub completed: bool,
    pub starred: bool,
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTodo {
    pub desc: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub starred: bool,
}

impl NewTodo {
    pub fn new(desc: impl Into<String>) -> Self {
        Self {
            desc: desc.into(),
            completed: false,
            starred: false,
        }
    }

    /// Materialize the payload as a local todo under `id`.
    pub fn into_todo(self, id: TodoId) -> Todo {
        Todo {
            id,
            desc: self.desc,
            completed: self.completed,
            starred: self.starred,
        }
    }
}

/// Partial update payload. Only the fields present in the JSON are applied;
/// omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starred: Option<bool>,
}

/// One of the two boolean flags a todo carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Completed,
    Starred,
}

impl Flag {
    pub fn get(self, todo: &Todo) -> bool {
        match self {
            Flag::Completed => todo.completed,
            Flag::Starred => todo.starred,
        }
    }

    pub fn set(self, todo: &mut Todo, value: bool) {
        match self {
            Flag::Completed => todo.completed = value,
            Flag::Starred => todo.starred = value,
        }
    }

    /// A patch that sets only this flag.
    pub fn patch(self, value: bool) -> TodoPatch {
        match self {
            Flag::Completed => TodoPatch {
                completed: Some(value),
                starred: None,
            },
            Flag::Starred => TodoPatch {
                completed: None,
                starred: Some(value),
            },
        }
    }
}
