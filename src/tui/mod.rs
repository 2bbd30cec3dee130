use anyhow::Result;

use crate::application::todo_service::TodoService;
use crate::domain::todo::{CreateTodo, Todo, TodoId, TodoPatch};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode { View, Create, Edit }

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Filter { All, Completed, Pending }

impl Filter {
    pub fn next(self) -> Self {
        match self {
            Filter::All => Filter::Completed,
            Filter::Completed => Filter::Pending,
            Filter::Pending => Filter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Completed => "Completed",
            Filter::Pending => "Pending",
        }
    }

    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            Filter::All => true,
            Filter::Completed => todo.completed,
            Filter::Pending => !todo.completed,
        }
    }
}

/// Client-side view-model. `todos` is a disposable cache of the server's
/// state: rebuilt wholesale by `load`, and patched after a mutation only
/// once the server has confirmed it. A failed mutation leaves the cache
/// untouched and surfaces on `status`.
pub struct App<S: TodoService> {
    service: S,
    pub todos: Vec<Todo>,
    pub filter: Filter,
    pub mode: Mode,
    pub new_title: String,
    pub editing_id: Option<TodoId>,
    pub editing_title: String,
    /// Index into the visible subset, not into `todos`.
    pub selected: usize,
    pub status: Option<String>,
}

impl<S: TodoService> App<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            todos: Vec::new(),
            filter: Filter::All,
            mode: Mode::View,
            new_title: String::new(),
            editing_id: None,
            editing_title: String::new(),
            selected: 0,
            status: None,
        }
    }

    /// Replace the local list wholesale from the server.
    pub async fn load(&mut self) -> Result<()> {
        self.todos = self.service.list().await?;
        self.clamp_selection();
        Ok(())
    }

    /// Indices into `todos` passing the current filter.
    pub fn visible(&self) -> Vec<usize> {
        self.todos
            .iter()
            .enumerate()
            .filter(|(_, t)| self.filter.matches(t))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn selected_todo(&self) -> Option<&Todo> {
        self.visible().get(self.selected).and_then(|&i| self.todos.get(i))
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.visible().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let current = self.selected.min(len - 1) as isize;
        self.selected = (current + delta).clamp(0, len as isize - 1) as usize;
    }

    pub fn cycle_filter(&mut self) {
        self.filter = self.filter.next();
        self.clamp_selection();
    }

    pub fn start_create(&mut self) {
        self.mode = Mode::Create;
        self.new_title.clear();
    }

    pub fn cancel_create(&mut self) {
        self.mode = Mode::View;
        self.new_title.clear();
    }

    /// Create the drafted todo. An empty draft is dropped without a request;
    /// on success the server-returned record is prepended and the draft
    /// cleared; on failure the draft is kept for another attempt.
    pub async fn add(&mut self) {
        let title = self.new_title.trim().to_string();
        if title.is_empty() {
            self.cancel_create();
            return;
        }
        let result = self.service.create(CreateTodo { title }).await;
        match result {
            Ok(todo) => {
                self.todos.insert(0, todo);
                self.new_title.clear();
                self.mode = Mode::View;
                self.status = None;
            }
            Err(e) => self.status = Some(format!("create failed: {e}")),
        }
    }

    /// Flip the selected todo's completed flag. The locally known delta is
    /// applied, not the server's echoed record.
    pub async fn toggle_selected(&mut self) {
        let Some(todo) = self.selected_todo() else { return };
        let id = todo.id;
        let completed = !todo.completed;
        let result = self
            .service
            .update(id, TodoPatch { title: None, completed: Some(completed) })
            .await;
        match result {
            Ok(_) => {
                if let Some(t) = self.todos.iter_mut().find(|t| t.id == id) {
                    t.completed = completed;
                }
                self.status = None;
                self.clamp_selection();
            }
            Err(e) => self.status = Some(format!("update failed: {e}")),
        }
    }

    pub fn begin_edit(&mut self) {
        let Some(todo) = self.selected_todo() else { return };
        let (id, title) = (todo.id, todo.title.clone());
        self.editing_id = Some(id);
        self.editing_title = title;
        self.mode = Mode::Edit;
    }

    /// Discard the edit buffer. No request is made.
    pub fn cancel_edit(&mut self) {
        self.editing_id = None;
        self.editing_title.clear();
        self.mode = Mode::View;
    }

    /// Push the edit buffer to the server, applying it locally on success.
    /// On failure the buffer stays open.
    pub async fn save_edit(&mut self) {
        let Some(id) = self.editing_id else { return };
        let title = self.editing_title.clone();
        let result = self
            .service
            .update(id, TodoPatch { title: Some(title.clone()), completed: None })
            .await;
        match result {
            Ok(_) => {
                if let Some(t) = self.todos.iter_mut().find(|t| t.id == id) {
                    t.title = title;
                }
                self.status = None;
                self.cancel_edit();
            }
            Err(e) => self.status = Some(format!("update failed: {e}")),
        }
    }

    pub async fn remove_selected(&mut self) {
        let Some(todo) = self.selected_todo() else { return };
        let id = todo.id;
        let result = self.service.delete(id).await;
        match result {
            Ok(_) => {
                self.todos.retain(|t| t.id != id);
                self.status = None;
                self.clamp_selection();
            }
            Err(e) => self.status = Some(format!("delete failed: {e}")),
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Fake server: applies mutations to its own list, or fails on demand.
    #[derive(Clone, Default)]
    struct StubService {
        items: Arc<Mutex<Vec<Todo>>>,
        next_id: Arc<AtomicI64>,
        fail: Arc<AtomicBool>,
        requests: Arc<AtomicUsize>,
    }

    impl StubService {
        fn with_items(items: Vec<Todo>) -> Self {
            let stub = Self::default();
            let max_id = items.iter().map(|t| t.id.0).max().unwrap_or(0);
            stub.next_id.store(max_id, Ordering::SeqCst);
            *stub.items.lock().unwrap() = items;
            stub
        }

        fn fail_next(&self) {
            self.fail.store(true, Ordering::SeqCst);
        }

        fn requests(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }

        fn gate(&self) -> Result<()> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            if self.fail.swap(false, Ordering::SeqCst) {
                Err(anyhow!("connection refused"))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl TodoService for StubService {
        async fn create(&self, input: CreateTodo) -> Result<Todo> {
            self.gate()?;
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            let todo = sample(id, &input.title, false);
            self.items.lock().unwrap().insert(0, todo.clone());
            Ok(todo)
        }

        async fn list(&self) -> Result<Vec<Todo>> {
            self.gate()?;
            Ok(self.items.lock().unwrap().clone())
        }

        async fn update(&self, id: TodoId, patch: TodoPatch) -> Result<Option<Todo>> {
            self.gate()?;
            let mut items = self.items.lock().unwrap();
            let Some(t) = items.iter_mut().find(|t| t.id == id) else { return Ok(None) };
            if let Some(title) = patch.title { t.title = title; }
            if let Some(completed) = patch.completed { t.completed = completed; }
            Ok(Some(t.clone()))
        }

        async fn delete(&self, id: TodoId) -> Result<bool> {
            self.gate()?;
            let mut items = self.items.lock().unwrap();
            let before = items.len();
            items.retain(|t| t.id != id);
            Ok(items.len() < before)
        }
    }

    fn sample(id: i64, title: &str, completed: bool) -> Todo {
        Todo { id: TodoId(id), title: title.into(), completed, created_at: Utc::now() }
    }

    fn ids(app: &App<StubService>) -> Vec<i64> {
        app.visible().iter().map(|&i| app.todos[i].id.0).collect()
    }

    #[test]
    fn filter_predicates() {
        let mut app = App::new(StubService::default());
        app.todos = vec![sample(1, "pending one", false), sample(2, "done one", true)];

        assert_eq!(ids(&app), vec![1, 2]);
        app.filter = Filter::Completed;
        assert_eq!(ids(&app), vec![2]);
        app.filter = Filter::Pending;
        assert_eq!(ids(&app), vec![1]);
    }

    #[tokio::test]
    async fn load_replaces_the_list_wholesale() {
        let service = StubService::with_items(vec![sample(1, "from server", false)]);
        let mut app = App::new(service);
        app.todos = vec![sample(9, "stale", true)];

        app.load().await.unwrap();
        assert_eq!(app.todos.len(), 1);
        assert_eq!(app.todos[0].title, "from server");
    }

    #[tokio::test]
    async fn add_prepends_server_record_and_clears_draft() {
        let service = StubService::with_items(vec![sample(1, "older", false)]);
        let mut app = App::new(service);
        app.load().await.unwrap();

        app.start_create();
        app.new_title.push_str("newest");
        app.add().await;

        assert_eq!(app.todos[0].title, "newest");
        assert_eq!(app.todos.len(), 2);
        assert!(app.new_title.is_empty());
        assert_eq!(app.mode, Mode::View);
    }

    #[tokio::test]
    async fn add_with_empty_draft_issues_no_request() {
        let service = StubService::default();
        let mut app = App::new(service.clone());

        app.start_create();
        app.new_title.push_str("   ");
        app.add().await;

        assert_eq!(service.requests(), 0);
        assert!(app.todos.is_empty());
        assert_eq!(app.mode, Mode::View);
    }

    #[tokio::test]
    async fn toggle_flips_the_local_flag_on_success() {
        let service = StubService::with_items(vec![sample(1, "task", false)]);
        let mut app = App::new(service);
        app.load().await.unwrap();

        app.toggle_selected().await;
        assert!(app.todos[0].completed);
        assert_eq!(app.todos[0].title, "task");
    }

    #[tokio::test]
    async fn failed_toggle_leaves_state_untouched() {
        let service = StubService::with_items(vec![sample(1, "task", false)]);
        let mut app = App::new(service.clone());
        app.load().await.unwrap();

        service.fail_next();
        app.toggle_selected().await;

        assert!(!app.todos[0].completed);
        assert!(app.status.is_some());
    }

    #[tokio::test]
    async fn save_edit_replaces_the_local_title() {
        let service = StubService::with_items(vec![sample(1, "tpyo", false)]);
        let mut app = App::new(service);
        app.load().await.unwrap();

        app.begin_edit();
        assert_eq!(app.editing_title, "tpyo");
        app.editing_title = "typo".into();
        app.save_edit().await;

        assert_eq!(app.todos[0].title, "typo");
        assert_eq!(app.mode, Mode::View);
        assert!(app.editing_id.is_none());
    }

    #[tokio::test]
    async fn cancel_edit_discards_the_buffer_without_a_request() {
        let service = StubService::with_items(vec![sample(1, "keep me", false)]);
        let mut app = App::new(service.clone());
        app.load().await.unwrap();
        let requests_after_load = service.requests();

        app.begin_edit();
        app.editing_title = "discard me".into();
        app.cancel_edit();

        assert_eq!(service.requests(), requests_after_load);
        assert_eq!(app.todos[0].title, "keep me");
        assert_eq!(app.mode, Mode::View);
    }

    #[tokio::test]
    async fn remove_deletes_locally_on_success() {
        let service = StubService::with_items(vec![sample(2, "second", false), sample(1, "first", false)]);
        let mut app = App::new(service);
        app.load().await.unwrap();

        app.remove_selected().await;
        assert_eq!(app.todos.len(), 1);
        assert_eq!(app.todos[0].id.0, 1);
    }

    #[tokio::test]
    async fn failed_remove_keeps_the_record() {
        let service = StubService::with_items(vec![sample(1, "survivor", false)]);
        let mut app = App::new(service.clone());
        app.load().await.unwrap();

        service.fail_next();
        app.remove_selected().await;

        assert_eq!(app.todos.len(), 1);
        assert!(app.status.is_some());
    }

    #[tokio::test]
    async fn selection_clamps_when_the_filter_narrows() {
        let service = StubService::with_items(vec![
            sample(3, "c", false),
            sample(2, "b", false),
            sample(1, "a", true),
        ]);
        let mut app = App::new(service);
        app.load().await.unwrap();
        app.selected = 2;

        app.cycle_filter(); // Completed: one visible item
        assert_eq!(app.selected, 0);
        assert_eq!(ids(&app), vec![1]);
    }
}
