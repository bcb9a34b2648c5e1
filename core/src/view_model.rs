//! The todo list view-model.
//!
//! # Design
//! `TodoViewModel` owns the list, the draft text of the "new todo" input and
//! a stateless [`TodoClient`]. Each operation comes in two flavours:
//!
//! - `begin_*` applies the change locally and returns a [`Pending`] whose
//!   request the host executes; the host then hands the response to
//!   [`TodoViewModel::settle`]. Several mutations may be in flight at once.
//! - `load`, `add`, `delete`, `toggle_star` and `toggle_checked` do both
//!   steps through a [`Transport`] and block until settled.
//!
//! Overlapping requests for the same todo are not sequenced. If two toggles
//! of one flag are in flight, the earlier failure can revert the later flip.

use tracing::debug;

use crate::client::TodoClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::HttpResponse;
use crate::list::TodoList;
use crate::optimistic::{self, Expect, Outcome, Pending, ToggleRollback, Undo};
use crate::transport::Transport;
use crate::types::{is_placeholder, Flag, NewTodo, Todo, TodoId};

#[derive(Debug, Clone)]
pub struct TodoViewModel {
    client: TodoClient,
    list: TodoList,
    draft: String,
    rollback: ToggleRollback,
    next_placeholder: TodoId,
}

impl TodoViewModel {
    pub fn new(client: TodoClient) -> Self {
        Self {
            client,
            list: TodoList::new(),
            draft: String::new(),
            rollback: ToggleRollback::default(),
            next_placeholder: -1,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(TodoClient::new(&config.base_url)).with_toggle_rollback(config.toggle_rollback)
    }

    pub fn with_toggle_rollback(mut self, rollback: ToggleRollback) -> Self {
        self.rollback = rollback;
        self
    }

    pub fn todos(&self) -> &TodoList {
        &self.list
    }

    pub fn display_order(&self) -> Vec<&Todo> {
        self.list.display_order()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn begin_load(&self) -> Pending {
        Pending::new(self.client.build_list_todos(), Expect::Listed, Undo::Nothing)
    }

    pub fn begin_add(&mut self, desc: impl Into<String>) -> Result<Pending, ApiError> {
        let input = NewTodo::new(desc);
        let request = self.client.build_create_todo(&input)?;

        let placeholder = self.next_placeholder;
        self.next_placeholder -= 1;
        debug!(placeholder, desc = %input.desc, "optimistic add");
        self.list.push(input.into_todo(placeholder));

        Ok(Pending::new(
            request,
            Expect::Created { placeholder },
            Undo::RemovePlaceholder(placeholder),
        ))
    }

    /// Adds the current draft text.
    pub fn begin_add_draft(&mut self) -> Result<Pending, ApiError> {
        let desc = self.draft.clone();
        self.begin_add(desc)
    }

    /// Returns `None` when no todo has `id` or `id` is a placeholder whose
    /// add is still in flight; nothing is sent in that case.
    pub fn begin_delete(&mut self, id: TodoId) -> Option<Pending> {
        if is_placeholder(id) {
            debug!(id, "delete of unsaved todo ignored");
            return None;
        }
        let removed = self.list.remove(id)?;
        debug!(id, "optimistic delete");
        Some(Pending::new(
            self.client.build_delete_todo(id),
            Expect::Deleted,
            Undo::Restore(removed),
        ))
    }

    pub fn begin_toggle_star(&mut self, id: TodoId) -> Result<Option<Pending>, ApiError> {
        self.begin_toggle(id, Flag::Starred)
    }

    pub fn begin_toggle_checked(&mut self, id: TodoId) -> Result<Option<Pending>, ApiError> {
        self.begin_toggle(id, Flag::Completed)
    }

    /// `Ok(None)` for unknown ids and for placeholders still awaiting their id.
    fn begin_toggle(&mut self, id: TodoId, flag: Flag) -> Result<Option<Pending>, ApiError> {
        if is_placeholder(id) {
            debug!(id, ?flag, "toggle of unsaved todo ignored");
            return Ok(None);
        }
        let Some(previous) = self.list.get(id).map(|todo| flag.get(todo)) else {
            return Ok(None);
        };
        let request = self.client.build_patch_todo(id, &flag.patch(!previous))?;
        self.list.toggle(id, flag);
        debug!(id, ?flag, value = !previous, "optimistic toggle");
        Ok(Some(Pending::new(
            request,
            Expect::Patched,
            Undo::Revert { id, flag, previous },
        )))
    }

    /// Reconcile a pending mutation with the result of executing its request.
    pub fn settle(&mut self, pending: Pending, response: Result<HttpResponse, ApiError>) -> Outcome {
        let clears_draft = pending.placeholder().is_some();
        let outcome = optimistic::settle(&mut self.list, &self.client, self.rollback, pending, response);
        if clears_draft && outcome.is_committed() {
            self.draft.clear();
        }
        outcome
    }

    pub fn load<T: Transport>(&mut self, transport: &T) -> Outcome {
        let pending = self.begin_load();
        self.drive(transport, pending)
    }

    pub fn add<T: Transport>(&mut self, transport: &T, desc: impl Into<String>) -> Outcome {
        match self.begin_add(desc) {
            Ok(pending) => self.drive(transport, pending),
            Err(err) => Outcome::RolledBack(err),
        }
    }

    pub fn add_draft<T: Transport>(&mut self, transport: &T) -> Outcome {
        let desc = self.draft.clone();
        self.add(transport, desc)
    }

    /// `None` when no todo has `id` or `id` is still a placeholder.
    pub fn delete<T: Transport>(&mut self, transport: &T, id: TodoId) -> Option<Outcome> {
        let pending = self.begin_delete(id)?;
        Some(self.drive(transport, pending))
    }

    pub fn toggle_star<T: Transport>(&mut self, transport: &T, id: TodoId) -> Option<Outcome> {
        self.toggle(transport, id, Flag::Starred)
    }

    pub fn toggle_checked<T: Transport>(&mut self, transport: &T, id: TodoId) -> Option<Outcome> {
        self.toggle(transport, id, Flag::Completed)
    }

    fn toggle<T: Transport>(&mut self, transport: &T, id: TodoId, flag: Flag) -> Option<Outcome> {
        match self.begin_toggle(id, flag) {
            Ok(pending) => pending.map(|pending| self.drive(transport, pending)),
            Err(err) => Some(Outcome::RolledBack(err)),
        }
    }

    fn drive<T: Transport>(&mut self, transport: &T, pending: Pending) -> Outcome {
        let response = transport.execute(pending.request());
        self.settle(pending, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    fn view_model() -> TodoViewModel {
        TodoViewModel::new(TodoClient::new("http://localhost:3000"))
    }

    fn loaded(todos: &[(TodoId, bool, bool)]) -> TodoViewModel {
        let mut vm = view_model();
        let body = serde_json::to_string(
            &todos
                .iter()
                .map(|&(id, completed, starred)| Todo {
                    id,
                    desc: format!("todo {id}"),
                    completed,
                    starred,
                })
                .collect::<Vec<_>>(),
        )
        .unwrap();
        let pending = vm.begin_load();
        assert!(vm.settle(pending, Ok(HttpResponse::new(200, body))).is_committed());
        vm
    }

    fn ids(vm: &TodoViewModel) -> Vec<TodoId> {
        vm.todos().iter().map(|t| t.id).collect()
    }

    fn server_error() -> Result<HttpResponse, ApiError> {
        Ok(HttpResponse::new(500, "boom"))
    }

    #[test]
    fn load_replaces_local_state() {
        let vm = loaded(&[(1, false, false), (2, true, true)]);
        assert_eq!(ids(&vm), vec![1, 2]);
    }

    #[test]
    fn failed_load_leaves_list_untouched() {
        let mut vm = view_model();
        let pending = vm.begin_load();
        let outcome = vm.settle(pending, server_error());
        assert!(!outcome.is_committed());
        assert!(vm.todos().is_empty());
    }

    #[test]
    fn add_inserts_placeholder_then_takes_server_id() {
        let mut vm = loaded(&[(1, false, false)]);
        vm.set_draft("walk dog");

        let pending = vm.begin_add_draft().unwrap();
        assert_eq!(pending.request().method, HttpMethod::Post);
        let placeholder = pending.placeholder().unwrap();
        assert!(placeholder < 0);
        assert_eq!(ids(&vm), vec![1, placeholder]);
        let local = vm.todos().get(placeholder).unwrap();
        assert!(!local.completed && !local.starred);

        let response = HttpResponse::new(
            200,
            r#"{"id":7,"desc":"walk dog","completed":false,"starred":false}"#,
        );
        assert!(vm.settle(pending, Ok(response)).is_committed());
        assert_eq!(ids(&vm), vec![1, 7]);
        assert_eq!(vm.todos().iter().filter(|t| t.id == 7).count(), 1);
        assert_eq!(vm.draft(), "");
    }

    #[test]
    fn rejected_add_restores_previous_list_and_keeps_draft() {
        let mut vm = loaded(&[(1, false, false), (2, false, true)]);
        let before = vm.todos().clone();
        vm.set_draft("nope");

        let pending = vm.begin_add_draft().unwrap();
        assert_eq!(vm.todos().len(), 3);
        let outcome = vm.settle(pending, server_error());

        assert!(matches!(outcome, Outcome::RolledBack(ApiError::HttpError { status: 500, .. })));
        assert_eq!(vm.todos(), &before);
        assert_eq!(vm.draft(), "nope");
    }

    #[test]
    fn concurrent_adds_get_distinct_placeholders() {
        let mut vm = view_model();
        let first = vm.begin_add("a").unwrap();
        let second = vm.begin_add("b").unwrap();
        assert_ne!(first.placeholder(), second.placeholder());

        vm.settle(second, Ok(HttpResponse::new(201, r#"{"id":5,"desc":"b","completed":false,"starred":false}"#)));
        vm.settle(first, server_error());
        assert_eq!(ids(&vm), vec![5]);
        assert_eq!(vm.todos().get(5).unwrap().desc, "b");
    }

    #[test]
    fn delete_is_immediate_and_restored_at_end_on_failure() {
        let mut vm = loaded(&[(1, false, false), (2, false, false), (3, false, false)]);

        let pending = vm.begin_delete(1).unwrap();
        assert_eq!(pending.request().path, "http://localhost:3000/todos/1");
        assert_eq!(ids(&vm), vec![2, 3]);

        vm.settle(pending, Ok(HttpResponse::new(404, "")));
        assert_eq!(ids(&vm), vec![2, 3, 1]);
    }

    #[test]
    fn confirmed_delete_stays_deleted() {
        let mut vm = loaded(&[(1, false, false), (2, false, false)]);
        let pending = vm.begin_delete(2).unwrap();
        assert!(vm.settle(pending, Ok(HttpResponse::new(204, ""))).is_committed());
        assert_eq!(ids(&vm), vec![1]);
    }

    #[test]
    fn delete_of_unknown_id_sends_nothing() {
        let mut vm = loaded(&[(1, false, false)]);
        assert!(vm.begin_delete(99).is_none());
        assert_eq!(ids(&vm), vec![1]);
    }

    #[test]
    fn toggle_star_flips_immediately_and_sends_new_value() {
        let mut vm = loaded(&[(1, false, false)]);
        let pending = vm.begin_toggle_star(1).unwrap().unwrap();
        assert!(vm.todos().get(1).unwrap().starred);

        let body: serde_json::Value =
            serde_json::from_str(pending.request().body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({ "starred": true }));

        let response = HttpResponse::new(200, r#"{"id":1,"desc":"todo 1","completed":false,"starred":true}"#);
        assert!(vm.settle(pending, Ok(response)).is_committed());
        assert!(vm.todos().get(1).unwrap().starred);
    }

    #[test]
    fn failed_toggle_from_true_reverts() {
        let mut vm = loaded(&[(1, true, true)]);

        let pending = vm.begin_toggle_checked(1).unwrap().unwrap();
        assert!(!vm.todos().get(1).unwrap().completed);
        vm.settle(pending, server_error());
        assert!(vm.todos().get(1).unwrap().completed);

        let pending = vm.begin_toggle_star(1).unwrap().unwrap();
        assert!(!vm.todos().get(1).unwrap().starred);
        vm.settle(pending, server_error());
        assert!(vm.todos().get(1).unwrap().starred);
    }

    #[test]
    fn failed_toggle_from_false_is_not_reverted_by_default() {
        let mut vm = loaded(&[(1, false, false)]);
        let pending = vm.begin_toggle_checked(1).unwrap().unwrap();
        let outcome = vm.settle(pending, server_error());
        assert!(!outcome.is_committed());
        assert!(vm.todos().get(1).unwrap().completed);
    }

    #[test]
    fn failed_toggle_from_false_reverts_with_always_policy() {
        let mut vm = loaded(&[(1, false, false)]).with_toggle_rollback(ToggleRollback::Always);
        let pending = vm.begin_toggle_star(1).unwrap().unwrap();
        vm.settle(pending, server_error());
        assert!(!vm.todos().get(1).unwrap().starred);
    }

    #[test]
    fn from_config_uses_base_url_and_policy() {
        let config = ClientConfig {
            base_url: "http://todos.test/".to_string(),
            toggle_rollback: ToggleRollback::Always,
        };
        let mut vm = TodoViewModel::from_config(&config);
        assert_eq!(vm.begin_load().request().path, "http://todos.test/todos");

        vm.list.push(Todo {
            id: 1,
            desc: "x".to_string(),
            completed: false,
            starred: false,
        });
        let pending = vm.begin_toggle_checked(1).unwrap().unwrap();
        vm.settle(pending, server_error());
        assert!(!vm.todos().get(1).unwrap().completed);
    }

    fn created(id: TodoId, desc: &str) -> Result<HttpResponse, ApiError> {
        Ok(HttpResponse::new(
            201,
            format!(r#"{{"id":{id},"desc":"{desc}","completed":false,"starred":false}}"#),
        ))
    }

    #[test]
    fn delete_of_in_flight_add_is_ignored() {
        let mut vm = view_model();
        let pending = vm.begin_add("x").unwrap();
        let placeholder = pending.placeholder().unwrap();

        assert!(vm.begin_delete(placeholder).is_none());
        assert_eq!(ids(&vm), vec![placeholder]);

        assert!(vm.settle(pending, created(5, "x")).is_committed());
        assert_eq!(ids(&vm), vec![5]);

        // Once the id is known, delete goes through.
        let pending = vm.begin_delete(5).unwrap();
        assert_eq!(pending.request().path, "http://localhost:3000/todos/5");
    }

    #[test]
    fn toggle_of_in_flight_add_is_ignored() {
        let mut vm = view_model();
        let pending = vm.begin_add("x").unwrap();
        let placeholder = pending.placeholder().unwrap();

        assert!(vm.begin_toggle_star(placeholder).unwrap().is_none());
        assert!(vm.begin_toggle_checked(placeholder).unwrap().is_none());
        let local = vm.todos().get(placeholder).unwrap();
        assert!(!local.starred && !local.completed);

        assert!(vm.settle(pending, created(5, "x")).is_committed());
        let saved = vm.todos().get(5).unwrap();
        assert!(!saved.starred && !saved.completed);
    }

    #[test]
    fn toggle_of_unknown_id_sends_nothing() {
        let mut vm = loaded(&[(1, false, false)]);
        assert!(vm.begin_toggle_star(42).unwrap().is_none());
    }

    #[test]
    fn display_order_puts_starred_first() {
        let vm = loaded(&[(1, false, false), (2, false, true), (3, false, false), (4, false, true)]);
        let order: Vec<TodoId> = vm.display_order().iter().map(|t| t.id).collect();
        assert_eq!(order, vec![2, 4, 1, 3]);
    }
}
