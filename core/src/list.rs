//! In-memory todo collection owned by the view-model.
//!
//! Every mutation is a small pure transformation on the `Vec<Todo>` so the
//! optimistic layer can apply and undo them without knowing about HTTP.

use crate::types::{Flag, Todo, TodoId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoList {
    todos: Vec<Todo>,
}

impl TodoList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Todo> {
        self.todos.iter()
    }

    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    pub fn replace_all(&mut self, todos: Vec<Todo>) {
        self.todos = todos;
    }

    pub fn push(&mut self, todo: Todo) {
        self.todos.push(todo);
    }

    /// Remove every todo with `id`, returning the first one removed.
    pub fn remove(&mut self, id: TodoId) -> Option<Todo> {
        let position = self.todos.iter().position(|todo| todo.id == id)?;
        let removed = self.todos.remove(position);
        self.todos.retain(|todo| todo.id != id);
        Some(removed)
    }

    /// Flip `flag` on the todo with `id`. Returns the value before the flip.
    pub fn toggle(&mut self, id: TodoId, flag: Flag) -> Option<bool> {
        let todo = self.todos.iter_mut().find(|todo| todo.id == id)?;
        let previous = flag.get(todo);
        flag.set(todo, !previous);
        Some(previous)
    }

    /// Returns false when no todo has `id`.
    pub fn set_flag(&mut self, id: TodoId, flag: Flag, value: bool) -> bool {
        let mut found = false;
        for todo in self.todos.iter_mut().filter(|todo| todo.id == id) {
            flag.set(todo, value);
            found = true;
        }
        found
    }

    pub fn reassign_id(&mut self, from: TodoId, to: TodoId) -> bool {
        let mut found = false;
        for todo in self.todos.iter_mut().filter(|todo| todo.id == from) {
            todo.id = to;
            found = true;
        }
        found
    }

    /// Starred todos first, then the rest. Relative order inside each group
    /// is the list order.
    pub fn display_order(&self) -> Vec<&Todo> {
        let (mut starred, unstarred): (Vec<&Todo>, Vec<&Todo>) =
            self.todos.iter().partition(|todo| todo.starred);
        starred.extend(unstarred);
        starred
    }
}

impl From<Vec<Todo>> for TodoList {
    fn from(todos: Vec<Todo>) -> Self {
        Self { todos }
    }
}
