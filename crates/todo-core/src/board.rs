//! The task board: a view-local task list kept in sync with the server.
//!
//! The list is never patched in place. Every successful mutation is followed
//! by a full `list()`, and a failed one leaves the list and the form the user
//! typed into exactly as they were.

use std::fmt;

use todo_types::Task;

use crate::api::{ApiError, TodoApi};
use crate::busy::Busy;
use crate::forms::{FieldErrors, TaskForm};
use crate::notice::{Confirm, ConfirmPrompt, Notice, Notifier};

pub const LIST_FAILED: &str = "Failed to load TODOs";
pub const CREATED: &str = "Successfully added!";
pub const CREATE_FAILED: &str = "Failed to add TODO. Please try again.";
pub const UPDATED: &str = "Successfully updated!";
pub const UPDATE_FAILED: &str = "Failed to update TODO. Please try again.";
pub const DELETED: &str = "Deleted! Your task has been removed.";
pub const DELETE_FAILED: &str = "Could not delete the task. Please try again.";

#[derive(Debug)]
pub enum BoardError {
    NotLoggedIn,
    /// The same operation is already in flight.
    Busy,
    NoSelection,
    UnknownTask(String),
    Invalid(FieldErrors),
    Api(ApiError),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::NotLoggedIn => f.write_str("Not logged in"),
            BoardError::Busy => f.write_str("Another request is still in flight"),
            BoardError::NoSelection => f.write_str("No task selected for editing"),
            BoardError::UnknownTask(id) => write!(f, "No task with id {id}"),
            BoardError::Invalid(errors) => write!(f, "{errors}"),
            BoardError::Api(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for BoardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BoardError::Invalid(errors) => Some(errors),
            BoardError::Api(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ApiError> for BoardError {
    fn from(err: ApiError) -> Self {
        BoardError::Api(err)
    }
}

impl From<FieldErrors> for BoardError {
    fn from(errors: FieldErrors) -> Self {
        BoardError::Invalid(errors)
    }
}

pub type BoardResult<T> = Result<T, BoardError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

/// An open edit form for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub id: String,
    pub form: TaskForm,
}

/// The board operations that each carry their own busy flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardOp {
    List,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Default)]
struct BusyFlags {
    list: Busy,
    create: Busy,
    update: Busy,
    delete: Busy,
}

impl BusyFlags {
    fn get(&self, op: BoardOp) -> &Busy {
        match op {
            BoardOp::List => &self.list,
            BoardOp::Create => &self.create,
            BoardOp::Update => &self.update,
            BoardOp::Delete => &self.delete,
        }
    }
}

pub struct TaskBoard<A, N> {
    api: A,
    notifier: N,
    token: Option<String>,
    tasks: Vec<Task>,
    loaded: bool,
    pub create_form: TaskForm,
    edit: Option<EditState>,
    busy: BusyFlags,
}

impl<A: TodoApi, N: Notifier> TaskBoard<A, N> {
    /// `token` is the current session token; `None` makes every operation
    /// fail with [`BoardError::NotLoggedIn`] before any request.
    pub fn new(api: A, notifier: N, token: Option<String>) -> Self {
        Self {
            api,
            notifier,
            token: token.filter(|t| !t.is_empty()),
            tasks: Vec::new(),
            loaded: false,
            create_form: TaskForm::default(),
            edit: None,
            busy: BusyFlags::default(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Whether the most recent `list()` succeeded. When it did not, `tasks()`
    /// is stale or was never fetched.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn edit_state(&self) -> Option<&EditState> {
        self.edit.as_ref()
    }

    pub fn edit_form_mut(&mut self) -> Option<&mut TaskForm> {
        self.edit.as_mut().map(|edit| &mut edit.form)
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn is_creating(&self) -> bool {
        self.busy.create.is_in_flight()
    }

    /// A handle on `op`'s busy flag that stays shared with the board.
    ///
    /// A view keeps it to render a pending state while the operation's
    /// future is awaited. Holding a guard from it makes the board refuse
    /// `op` with [`BoardError::Busy`].
    pub fn busy(&self, op: BoardOp) -> Busy {
        self.busy.get(op).clone()
    }

    fn token(&self) -> BoardResult<String> {
        self.token.clone().ok_or(BoardError::NotLoggedIn)
    }

    /// Replaces the list with the server's, in server order.
    ///
    /// # Errors
    /// On failure the previous list is kept and an error notice is emitted.
    pub async fn list(&mut self) -> BoardResult<&[Task]> {
        let token = self.token()?;
        let _guard = self.busy.list.try_begin().ok_or(BoardError::Busy)?;

        match self.api.list_tasks(&token).await {
            Ok(tasks) => {
                tracing::debug!(count = tasks.len(), "task list refreshed");
                self.tasks = tasks;
                self.loaded = true;
                Ok(&self.tasks)
            }
            Err(err) => {
                tracing::warn!(error = %err, "task list fetch failed");
                self.loaded = false;
                self.notifier.notify(Notice::error(LIST_FAILED));
                Err(err.into())
            }
        }
    }

    /// Submits `create_form`.
    ///
    /// # Errors
    /// Invalid input fails before any request. A server failure leaves the
    /// form as typed.
    pub async fn create(&mut self) -> BoardResult<()> {
        let token = self.token()?;
        self.create_form.validate()?;
        let guard = self.busy.create.try_begin().ok_or(BoardError::Busy)?;

        let payload = self.create_form.to_payload();
        let result = self.api.create_task(&token, &payload).await;
        drop(guard);

        match result {
            Ok(()) => {
                tracing::info!(title = %payload.title, "task created");
                self.create_form.clear();
                self.notifier.notify(Notice::success(CREATED));
                self.refresh().await;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "task create failed");
                self.notifier.notify(Notice::error(CREATE_FAILED));
                Err(err.into())
            }
        }
    }

    /// Opens the edit form for a listed task, pre-filled with its values.
    ///
    /// # Errors
    /// Returns [`BoardError::UnknownTask`] if the id is not in the list.
    pub fn begin_edit(&mut self, id: &str) -> BoardResult<&mut TaskForm> {
        let task = self
            .task(id)
            .ok_or_else(|| BoardError::UnknownTask(id.to_string()))?;
        let state = EditState {
            id: task.id.clone(),
            form: TaskForm::new(task.title.clone(), task.description.clone()),
        };
        Ok(&mut self.edit.insert(state).form)
    }

    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Submits the open edit form as a full-record update.
    ///
    /// # Errors
    /// Requires an open edit form. On failure the form stays open with its
    /// contents.
    pub async fn update(&mut self) -> BoardResult<()> {
        let token = self.token()?;
        let edit = self.edit.as_ref().ok_or(BoardError::NoSelection)?;
        edit.form.validate()?;
        let (id, payload) = (edit.id.clone(), edit.form.to_payload());
        let guard = self.busy.update.try_begin().ok_or(BoardError::Busy)?;

        let result = self.api.update_task(&token, &id, &payload).await;
        drop(guard);

        match result {
            Ok(()) => {
                tracing::info!(%id, "task updated");
                self.refresh().await;
                self.edit = None;
                self.notifier.notify(Notice::success(UPDATED));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%id, error = %err, "task update failed");
                self.notifier.notify(Notice::error(UPDATE_FAILED));
                Err(err.into())
            }
        }
    }

    /// Deletes a task after the user confirms.
    ///
    /// # Errors
    /// On failure the list is left as it was; nothing is removed locally.
    pub async fn delete(
        &mut self,
        id: &str,
        confirm: &mut impl Confirm,
    ) -> BoardResult<DeleteOutcome> {
        let token = self.token()?;
        if !confirm.confirm(&ConfirmPrompt::delete_task()) {
            tracing::debug!(%id, "delete cancelled");
            return Ok(DeleteOutcome::Cancelled);
        }
        let guard = self.busy.delete.try_begin().ok_or(BoardError::Busy)?;

        let result = self.api.delete_task(&token, id).await;
        drop(guard);

        match result {
            Ok(()) => {
                tracing::info!(%id, "task deleted");
                self.notifier.notify(Notice::success(DELETED));
                self.refresh().await;
                Ok(DeleteOutcome::Deleted)
            }
            Err(err) => {
                tracing::warn!(%id, error = %err, "task delete failed");
                self.notifier.notify(Notice::error(DELETE_FAILED));
                Err(err.into())
            }
        }
    }

    /// Re-fetch after a successful mutation. A failure here was already
    /// reported by `list()` and does not undo the mutation.
    async fn refresh(&mut self) {
        if let Err(err) = self.list().await {
            tracing::debug!(error = %err, "refresh after mutation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::ApiClient;
    use crate::busy::BusyState;
    use crate::notice::{AutoConfirm, NoticeLevel, RecordingNotifier};

    fn todos(items: &[(&str, &str)]) -> serde_json::Value {
        let todos: Vec<_> = items
            .iter()
            .map(|(id, title)| {
                json!({"_id": id, "title": title, "description": format!("{title} description")})
            })
            .collect();
        json!({ "todos": todos })
    }

    async fn mount_list(server: &MockServer, items: &[(&str, &str)]) {
        Mock::given(method("GET"))
            .and(path("/todo/get-all"))
            .and(header("token", "tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(todos(items)))
            .mount(server)
            .await;
    }

    fn board(server: &MockServer) -> TaskBoard<ApiClient, RecordingNotifier> {
        let api = ApiClient::new(&server.uri(), Some(Duration::from_secs(5))).unwrap();
        TaskBoard::new(api, RecordingNotifier::default(), Some("tok-1".to_string()))
    }

    #[tokio::test]
    async fn test_list_twice_yields_same_sequence() {
        let server = MockServer::start().await;
        mount_list(&server, &[("a", "Alpha task"), ("b", "Bravo task")]).await;
        let mut board = board(&server);

        let first = board.list().await.unwrap().to_vec();
        let second = board.list().await.unwrap().to_vec();

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert!(board.is_loaded());
    }

    #[tokio::test]
    async fn test_list_failure_keeps_stale_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todo/get-all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(todos(&[("a", "Alpha task")])))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/todo/get-all"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let mut board = board(&server);

        board.list().await.unwrap();
        assert!(board.list().await.is_err());

        assert_eq!(board.tasks().len(), 1);
        assert_eq!(board.notifier().last().unwrap().text, LIST_FAILED);
        assert!(!board.is_loaded());
    }

    #[tokio::test]
    async fn test_invalid_create_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;
        let mut board = board(&server);
        board.create_form = TaskForm::new("abcd", "long enough description");

        let err = board.create().await.unwrap_err();
        let BoardError::Invalid(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert!(errors.get("title").unwrap().contains("at least 5"));
        assert!(board.notifier().notices.is_empty());
    }

    #[tokio::test]
    async fn test_create_success_clears_form_and_refetches() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/todo/create"))
            .and(header("token", "tok-1"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"_id": "n1"})))
            .expect(1)
            .mount(&server)
            .await;
        mount_list(&server, &[("n1", "abcde")]).await;
        let mut board = board(&server);
        board.create_form = TaskForm::new("abcde", "long enough description");

        board.create().await.unwrap();

        assert!(board.create_form.is_blank());
        assert_eq!(board.tasks()[0].id, "n1");
        assert!(!board.is_creating());
        assert_eq!(board.notifier().notices[0], Notice::success(CREATED));
    }

    #[tokio::test]
    async fn test_create_failure_keeps_form_contents() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/todo/create"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(todos(&[])))
            .expect(0)
            .mount(&server)
            .await;
        let mut board = board(&server);
        board.create_form = TaskForm::new("Groceries", "milk, eggs and bread");

        assert!(board.create().await.is_err());

        assert_eq!(
            board.create_form,
            TaskForm::new("Groceries", "milk, eggs and bread")
        );
        assert!(!board.is_creating());
        assert_eq!(board.notifier().last().unwrap().text, CREATE_FAILED);
    }

    #[tokio::test]
    async fn test_create_is_in_flight_while_request_pending() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/todo/create"))
            .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_millis(300)))
            .expect(1)
            .mount(&server)
            .await;
        mount_list(&server, &[("n1", "Groceries")]).await;
        let mut board = board(&server);
        board.create_form = TaskForm::new("Groceries", "milk, eggs and bread");
        let create_busy = board.busy(BoardOp::Create);
        assert_eq!(create_busy.state(), BusyState::Idle);

        let watcher = create_busy.clone();
        let (result, seen) = tokio::join!(board.create(), async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            watcher.state()
        });

        result.unwrap();
        assert_eq!(seen, BusyState::InFlight);
        assert_eq!(create_busy.state(), BusyState::Idle);
    }

    #[tokio::test]
    async fn test_held_busy_flag_refuses_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;
        let mut board = board(&server);
        board.create_form = TaskForm::new("Groceries", "milk, eggs and bread");
        let create_busy = board.busy(BoardOp::Create);

        let guard = create_busy.try_begin().unwrap();
        assert!(board.is_creating());
        assert!(matches!(board.create().await, Err(BoardError::Busy)));
        assert_eq!(
            board.create_form,
            TaskForm::new("Groceries", "milk, eggs and bread")
        );

        drop(guard);
        assert!(!board.is_creating());
    }

    #[tokio::test]
    async fn test_create_with_failed_refresh_is_not_loaded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/todo/create"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/todo/get-all"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let mut board = board(&server);
        board.create_form = TaskForm::new("Groceries", "milk, eggs and bread");

        board.create().await.unwrap();

        assert!(!board.is_loaded());
        assert_eq!(board.notifier().notices[0], Notice::success(CREATED));
        assert_eq!(board.notifier().last().unwrap().text, LIST_FAILED);
    }

    #[tokio::test]
    async fn test_update_requires_selection() {
        let server = MockServer::start().await;
        let mut board = board(&server);

        assert!(matches!(
            board.update().await,
            Err(BoardError::NoSelection)
        ));
    }

    #[tokio::test]
    async fn test_begin_edit_prefills_and_update_closes_form() {
        let server = MockServer::start().await;
        mount_list(&server, &[("a", "Alpha task")]).await;
        Mock::given(method("PATCH"))
            .and(path("/todo/update-todo/a"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        let mut board = board(&server);
        board.list().await.unwrap();

        let form = board.begin_edit("a").unwrap();
        assert_eq!(form.title, "Alpha task");
        assert_eq!(form.description, "Alpha task description");
        form.title = "Alpha renamed".to_string();

        board.update().await.unwrap();
        assert!(board.edit_state().is_none());
        assert_eq!(board.notifier().last().unwrap().text, UPDATED);
    }

    #[tokio::test]
    async fn test_update_failure_keeps_form_open() {
        let server = MockServer::start().await;
        mount_list(&server, &[("a", "Alpha task")]).await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let mut board = board(&server);
        board.list().await.unwrap();
        board.begin_edit("a").unwrap().title = "Alpha renamed".to_string();

        assert!(board.update().await.is_err());

        let edit = board.edit_state().unwrap();
        assert_eq!(edit.id, "a");
        assert_eq!(edit.form.title, "Alpha renamed");
        assert_eq!(board.notifier().last().unwrap().level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_begin_edit_unknown_id() {
        let server = MockServer::start().await;
        let mut board = board(&server);

        assert!(matches!(
            board.begin_edit("missing"),
            Err(BoardError::UnknownTask(_))
        ));
    }

    #[tokio::test]
    async fn test_declined_delete_sends_nothing() {
        let server = MockServer::start().await;
        mount_list(&server, &[("a", "Alpha task")]).await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let mut board = board(&server);
        board.list().await.unwrap();

        let outcome = board.delete("a", &mut AutoConfirm(false)).await.unwrap();

        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert_eq!(board.tasks().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_failure_is_not_optimistic() {
        let server = MockServer::start().await;
        mount_list(&server, &[("a", "Alpha task")]).await;
        Mock::given(method("DELETE"))
            .and(path("/todo/delete-todo/a"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        let mut board = board(&server);
        board.list().await.unwrap();

        assert!(board.delete("a", &mut AutoConfirm(true)).await.is_err());

        assert_eq!(board.tasks().len(), 1);
        assert_eq!(board.notifier().last().unwrap().text, DELETE_FAILED);
    }

    #[tokio::test]
    async fn test_confirmed_delete_refetches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todo/get-all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(todos(&[("a", "Alpha task")])))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        mount_list(&server, &[]).await;
        Mock::given(method("DELETE"))
            .and(path("/todo/delete-todo/a"))
            .and(header("token", "tok-1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        let mut board = board(&server);
        board.list().await.unwrap();

        let outcome = board.delete("a", &mut AutoConfirm(true)).await.unwrap();

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert!(board.tasks().is_empty());
        assert_eq!(board.notifier().notices[0], Notice::success(DELETED));
    }

    #[tokio::test]
    async fn test_missing_token_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let api = ApiClient::new(&server.uri(), None).unwrap();
        let mut board = TaskBoard::new(api, RecordingNotifier::default(), None);

        assert!(matches!(board.list().await, Err(BoardError::NotLoggedIn)));
        assert!(matches!(
            board.delete("a", &mut AutoConfirm(true)).await,
            Err(BoardError::NotLoggedIn)
        ));
    }
}
