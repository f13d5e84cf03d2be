//! Client-side task store.
//!
//! `TaskStore` is the single source of truth for the session: an owned state
//! container, not a global. All local mutations are synchronous; remote
//! synchronization lives in `SyncedStore`, which wraps the store together
//! with a `TasksRemote` implementation and applies the app's optimistic
//! policy: reads surface failures, writes never do.

use crate::client::{ClientError, TasksRemote};
use crate::models::{Category, Priority, Task, UpdateTaskRequest, User};
use chrono::{DateTime, Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use tracing::{debug, warn};

/// Swatches assigned to new categories, drawn uniformly at random.
pub const CATEGORY_PALETTE: [&str; 8] = [
    "#4F46E5", // indigo
    "#0D9488", // teal
    "#F59E0B", // amber
    "#10B981", // emerald
    "#8B5CF6", // violet
    "#EC4899", // pink
    "#EF4444", // red
    "#3B82F6", // blue
];

/// Everything a new task needs except what the store generates (id and
/// timestamps).
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub deadline: DateTime<Utc>,
    pub subject: String,
    pub completed: bool,
}

#[derive(Debug, Default, Clone)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// Client-generated identifier for an optimistic create. Replaced by the
/// server id when the create call lands; kept forever when it doesn't.
fn generate_local_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(13)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}

#[derive(Debug, Default)]
pub struct TaskStore {
    pub tasks: Vec<Task>,
    pub categories: Vec<Category>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an optimistic task under a fresh local id. Returns the task.
    pub fn add_task(&mut self, draft: TaskDraft) -> &Task {
        let id = generate_local_id();
        self.add_task_with_id(id, draft)
    }

    /// Append a task under a known id (server-issued on a successful
    /// create). Timestamps are still the client's.
    pub fn add_task_with_id(&mut self, id: String, draft: TaskDraft) -> &Task {
        let now = Utc::now();
        let idx = self.tasks.len();
        self.tasks.push(Task {
            id,
            user_id: draft.user_id,
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            deadline: draft.deadline,
            subject: draft.subject,
            completed: draft.completed,
            created_at: now,
            updated_at: now,
        });
        &self.tasks[idx]
    }

    /// Merge the patch into the matching task. No-op when the id is absent.
    pub fn update_task(&mut self, id: &str, patch: UpdateTaskRequest) {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return;
        };

        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(deadline) = patch.deadline {
            task.deadline = deadline;
        }
        if let Some(subject) = patch.subject {
            task.subject = subject;
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        task.updated_at = Utc::now();
    }

    pub fn delete_task(&mut self, id: &str) {
        self.tasks.retain(|t| t.id != id);
    }

    /// Flip completion and refresh `updated_at`. Returns the new state, or
    /// None when the id is absent.
    pub fn toggle_completion(&mut self, id: &str) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        task.completed = !task.completed;
        task.updated_at = Utc::now();
        Some(task.completed)
    }

    /// Wholesale replacement from a fetch.
    pub fn replace_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    // Categories (client-local, never synced)

    pub fn add_category(&mut self, user_id: &str, name: &str) -> Category {
        let color = CATEGORY_PALETTE[rand::thread_rng().gen_range(0..CATEGORY_PALETTE.len())];
        let category = Category {
            id: generate_local_id(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
        };
        self.categories.push(category.clone());
        category
    }

    pub fn update_category(&mut self, id: &str, patch: CategoryPatch) {
        let Some(category) = self.categories.iter_mut().find(|c| c.id == id) else {
            return;
        };
        if let Some(name) = patch.name {
            category.name = name;
        }
        if let Some(color) = patch.color {
            category.color = color;
        }
    }

    /// Removes only the category. Tasks keep their `subject` reference and
    /// resolve to the fallback label from then on.
    pub fn delete_category(&mut self, id: &str) {
        self.categories.retain(|c| c.id != id);
    }

    /// Resolve a task's subject to its category name.
    pub fn category_name(&self, category_id: &str) -> String {
        self.categories
            .iter()
            .find(|c| c.id == category_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "Unknown Subject".to_string())
    }

    // Queries

    pub fn tasks_by_category(&self, category_id: &str) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.subject == category_id).collect()
    }

    pub fn tasks_by_priority(&self, priority: Priority) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.priority == priority).collect()
    }

    /// Incomplete tasks due on or before `now + days`. Past-due tasks
    /// satisfy that bound, so "upcoming" includes overdue; callers wanting
    /// strictly future work must filter again.
    pub fn upcoming_tasks(&self, days: i64, now: DateTime<Utc>) -> Vec<&Task> {
        let horizon = now + Duration::days(days);
        self.tasks
            .iter()
            .filter(|t| !t.completed && t.deadline <= horizon)
            .collect()
    }
}

// ── Remote synchronization ─────────────────────────────────────

/// The store plus its remote. Mutations apply locally no matter what the
/// network does; only `refresh` reports failure.
pub struct SyncedStore<R> {
    pub store: TaskStore,
    remote: R,
}

impl<R: TasksRemote> SyncedStore<R> {
    pub fn new(remote: R) -> Self {
        SyncedStore { store: TaskStore::new(), remote }
    }

    pub fn with_store(store: TaskStore, remote: R) -> Self {
        SyncedStore { store, remote }
    }

    /// Replace the collection with the server's copy. On failure the error
    /// flag is set and the existing collection stays untouched.
    pub async fn refresh(&mut self, user_id: &str) {
        self.store.is_loading = true;
        self.store.error = None;

        match self.remote.fetch_tasks(user_id).await {
            Ok(tasks) => {
                debug!(count = tasks.len(), "fetched tasks");
                self.store.replace_tasks(tasks);
            }
            Err(e) => {
                warn!(%e, "task fetch failed");
                self.store.error = Some("Failed to fetch tasks".to_string());
            }
        }
        self.store.is_loading = false;
    }

    /// Create remotely first so the local copy carries the server id. When
    /// the call fails the task keeps its client-generated id: accepted
    /// drift, invisible to the user. Returns the id the task ended up with.
    pub async fn create_task(&mut self, draft: TaskDraft) -> String {
        match self.remote.create_task(&draft).await {
            Ok(created) => {
                debug!(id = %created.id, "task created on server");
                self.store.add_task_with_id(created.id.clone(), draft);
                created.id
            }
            Err(e) => {
                warn!(%e, "remote create failed, keeping local task");
                self.store.add_task(draft).id.clone()
            }
        }
    }

    /// Best-effort remote update; the local merge happens regardless.
    pub async fn save_task(&mut self, id: &str, patch: UpdateTaskRequest) {
        if let Err(e) = self.remote.update_task(id, &patch).await {
            warn!(%e, id, "remote update failed, keeping local change");
        }
        self.store.update_task(id, patch);
    }

    /// Best-effort remote delete; local removal proceeds regardless.
    pub async fn remove_task(&mut self, id: &str) {
        if let Err(e) = self.remote.delete_task(id).await {
            warn!(%e, id, "remote delete failed, removing locally anyway");
        }
        self.store.delete_task(id);
    }

    /// Best-effort remote toggle; the local flip happens regardless.
    pub async fn toggle_task(&mut self, id: &str) -> Option<bool> {
        if let Err(e) = self.remote.toggle_task(id).await {
            warn!(%e, id, "remote toggle failed, flipping locally anyway");
        }
        self.store.toggle_completion(id)
    }
}

// ── Auth session state ─────────────────────────────────────────

/// Who is signed in, if anyone. The server holds the durable copy; this is
/// session state the UI reads.
#[derive(Debug, Default)]
pub struct AuthState {
    pub user: Option<User>,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn log_in(&mut self, user: User) {
        self.user = Some(user);
    }

    pub fn log_out(&mut self) {
        self.user = None;
    }

    /// Local profile merge. The remote call is best-effort and separate,
    /// like every other write.
    pub fn update_profile(&mut self, name: &str) {
        if let Some(user) = self.user.as_mut() {
            user.name = name.to_string();
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
