//! Apply-then-reconcile machinery shared by every mutating operation.
//!
//! # Design
//! A mutation is applied to the [`TodoList`] before its request is sent. The
//! returned [`Pending`] remembers two things: what a successful response
//! should look like ([`Expect`]) and how to take the local change back
//! ([`Undo`]). Settling a pending mutation is the same routine for load, add,
//! delete and both toggles; only these two enums differ per operation.

use tracing::warn;

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::list::TodoList;
use crate::types::{Flag, Todo, TodoId};

/// How a failed toggle is rolled back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToggleRollback {
    /// Revert only when the flag was `true` before the toggle. A failed
    /// `false -> true` toggle is left flipped. This matches the shipped web
    /// frontend and is kept until product decides otherwise.
    #[default]
    OnlyFromTrue,
    /// Always restore the previous value.
    Always,
}

/// A locally applied mutation whose request has not been answered yet.
#[derive(Debug)]
#[must_use = "a pending mutation must be settled or its local change is never reconciled"]
pub struct Pending {
    pub(crate) request: HttpRequest,
    pub(crate) expect: Expect,
    pub(crate) undo: Undo,
}

impl Pending {
    pub(crate) fn new(request: HttpRequest, expect: Expect, undo: Undo) -> Self {
        Self { request, expect, undo }
    }

    /// The request the host has to execute before calling `settle`.
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// The placeholder id of an in-flight add, if this is one.
    pub fn placeholder(&self) -> Option<TodoId> {
        match self.expect {
            Expect::Created { placeholder } => Some(placeholder),
            _ => None,
        }
    }
}

/// Result of settling a [`Pending`] mutation.
#[derive(Debug)]
pub enum Outcome {
    Committed,
    RolledBack(ApiError),
}

impl Outcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Outcome::Committed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Expect {
    Listed,
    Created { placeholder: TodoId },
    Deleted,
    Patched,
}

#[derive(Debug)]
pub(crate) enum Confirmed {
    Listed(Vec<Todo>),
    Created { placeholder: TodoId, todo: Todo },
    Deleted,
    Patched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Undo {
    Nothing,
    RemovePlaceholder(TodoId),
    Restore(Todo),
    Revert { id: TodoId, flag: Flag, previous: bool },
}

impl Expect {
    pub(crate) fn parse(
        self,
        client: &TodoClient,
        response: HttpResponse,
    ) -> Result<Confirmed, ApiError> {
        match self {
            Expect::Listed => client.parse_list_todos(response).map(Confirmed::Listed),
            Expect::Created { placeholder } => client
                .parse_create_todo(response)
                .map(|todo| Confirmed::Created { placeholder, todo }),
            Expect::Deleted => client.parse_delete_todo(response).map(|()| Confirmed::Deleted),
            // The local flip already matches what was sent.
            Expect::Patched => client.parse_patch_todo(response).map(|_| Confirmed::Patched),
        }
    }
}

impl Confirmed {
    pub(crate) fn commit(self, list: &mut TodoList) {
        match self {
            Confirmed::Listed(todos) => list.replace_all(todos),
            Confirmed::Created { placeholder, todo } => {
                if !list.reassign_id(placeholder, todo.id) {
                    warn!(placeholder, id = todo.id, "created todo no longer in list");
                }
            }
            Confirmed::Deleted | Confirmed::Patched => {}
        }
    }
}

impl Undo {
    pub(crate) fn revert(self, list: &mut TodoList, policy: ToggleRollback) {
        match self {
            Undo::Nothing => {}
            Undo::RemovePlaceholder(placeholder) => {
                list.remove(placeholder);
            }
            // Re-appended at the end; the original position is not kept.
            Undo::Restore(todo) => list.push(todo),
            Undo::Revert { id, flag, previous } => {
                if previous || policy == ToggleRollback::Always {
                    list.set_flag(id, flag, previous);
                } else {
                    warn!(id, ?flag, "failed toggle from false left applied");
                }
            }
        }
    }
}

/// Reconcile `pending` with the host's result for its request.
pub(crate) fn settle(
    list: &mut TodoList,
    client: &TodoClient,
    policy: ToggleRollback,
    pending: Pending,
    response: Result<HttpResponse, ApiError>,
) -> Outcome {
    let Pending { request, expect, undo } = pending;
    match response.and_then(|response| expect.parse(client, response)) {
        Ok(confirmed) => {
            confirmed.commit(list);
            Outcome::Committed
        }
        Err(err) => {
            warn!(method = request.method.as_str(), path = %request.path, %err, "rolling back");
            undo.revert(list, policy);
            Outcome::RolledBack(err)
        }
    }
}
