use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: i64,
    pub desc: String,
    pub completed: bool,
    pub starred: bool,
}

#[derive(Deserialize)]
pub struct NewTodo {
    pub desc: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub starred: bool,
}

#[derive(Deserialize)]
pub struct TodoPatch {
    pub completed: Option<bool>,
    pub starred: Option<bool>,
}

/// Todos keyed by id; ids are handed out in ascending order from 1.
#[derive(Debug)]
pub struct Store {
    next_id: i64,
    todos: BTreeMap<i64, Todo>,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            next_id: 1,
            todos: BTreeMap::new(),
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/todos", get(list_todos))
        .route("/todos/add", post(create_todo))
        .route("/todos/{id}", patch(patch_todo).delete(delete_todo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_todos(State(db): State<Db>) -> Json<Vec<Todo>> {
    let store = db.read().await;
    Json(store.todos.values().cloned().collect())
}

async fn create_todo(
    State(db): State<Db>,
    Json(input): Json<NewTodo>,
) -> (StatusCode, Json<Todo>) {
    let mut store = db.write().await;
    let todo = Todo {
        id: store.next_id,
        desc: input.desc,
        completed: input.completed,
        starred: input.starred,
    };
    store.next_id += 1;
    store.todos.insert(todo.id, todo.clone());
    debug!(id = todo.id, "created todo");
    (StatusCode::CREATED, Json(todo))
}

async fn patch_todo(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<TodoPatch>,
) -> Result<Json<Todo>, StatusCode> {
    let mut store = db.write().await;
    let todo = store.todos.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(completed) = input.completed {
        todo.completed = completed;
    }
    if let Some(starred) = input.starred {
        todo.starred = starred;
    }
    debug!(id, "patched todo");
    Ok(Json(todo.clone()))
}

async fn delete_todo(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    store
        .todos
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}
