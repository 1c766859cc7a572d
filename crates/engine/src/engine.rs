use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use ordo_core::config::AppConfig;
use ordo_core::dto::ReorderIntent;
use ordo_core::error::{SyncError, SyncResult};
use ordo_core::model::{Id, ListGroup, SortKey, Sortable, Task, TaskGroup};
use ordo_core::notify::Notifier;
use ordo_core::ordering::{resolve_sort_key, NeighborContext, NeighborRole, Placement};
use ordo_core::scope::{Scope, TaskScope};
use ordo_remote::TaskApi;
use parking_lot::Mutex;

use crate::debounce::{ScopedDebouncer, DEFAULT_WINDOW};
use crate::queue::SerialQueue;
use crate::reconcile;
use crate::state::{Snapshot, TreeState};
use crate::telemetry::{self, Event};

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub debounce_window: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            debounce_window: DEFAULT_WINDOW,
        }
    }
}

impl EngineOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            debounce_window: config.debounce_window(),
        }
    }
}

/// User-initiated changes that are not reorders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    CreateGroup,
    RenameGroup,
    DeleteGroup,
    CreateList,
    RenameList,
    DeleteList,
    CreateTaskGroup,
    RenameTaskGroup,
    DeleteTaskGroup,
    CreateTask,
    UpdateTask,
    DeleteTask,
    MoveTask,
}

impl Mutation {
    pub fn label(&self) -> &'static str {
        match self {
            Mutation::CreateGroup => "create group",
            Mutation::RenameGroup => "rename group",
            Mutation::DeleteGroup => "delete group",
            Mutation::CreateList => "create list",
            Mutation::RenameList => "rename list",
            Mutation::DeleteList => "delete list",
            Mutation::CreateTaskGroup => "create task group",
            Mutation::RenameTaskGroup => "rename task group",
            Mutation::DeleteTaskGroup => "delete task group",
            Mutation::CreateTask => "create task",
            Mutation::UpdateTask => "update task",
            Mutation::DeleteTask => "delete task",
            Mutation::MoveTask => "move task",
        }
    }
}

pub(crate) struct Shared {
    pub(crate) api: Arc<dyn TaskApi>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) state: Mutex<TreeState>,
    pub(crate) telemetry: telemetry::Handle,
    /// Reorder failures not yet reported by [`SyncEngine::settle`].
    pub(crate) failed_reorders: Mutex<Vec<SyncError>>,
    debouncer: ScopedDebouncer<Scope, ReorderIntent>,
    queue: SerialQueue<Scope>,
}

/// Optimistic reorder synchronization over a [`TaskApi`].
///
/// Local state changes the instant a move is requested. Reorders are
/// debounced per scope, dispatched one at a time per scope, and either adopted
/// from the server's response or reconciled by a forced refetch.
#[derive(Clone)]
pub struct SyncEngine {
    pub(crate) shared: Arc<Shared>,
}

impl SyncEngine {
    pub fn new(api: Arc<dyn TaskApi>, notifier: Arc<dyn Notifier>, options: EngineOptions) -> Self {
        Self {
            shared: Arc::new(Shared {
                api,
                notifier,
                state: Mutex::new(TreeState::default()),
                telemetry: telemetry::Handle::new(),
                failed_reorders: Mutex::new(Vec::new()),
                debouncer: ScopedDebouncer::new(options.debounce_window),
                queue: SerialQueue::new(),
            }),
        }
    }

    /// Run `f` against the current tree.
    pub fn read<R>(&self, f: impl FnOnce(&TreeState) -> R) -> R {
        f(&self.shared.state.lock())
    }

    pub fn list_groups(&self) -> Vec<ListGroup> {
        self.read(|state| state.groups().to_vec())
    }

    pub fn is_loading(&self) -> bool {
        self.read(|state| state.list_groups.loading)
    }

    pub fn is_loaded(&self) -> bool {
        self.read(|state| state.list_groups.loaded)
    }

    pub fn last_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.read(|state| state.list_groups.last_fetched_at)
    }

    pub fn task_groups(&self, list_id: Id) -> Vec<TaskGroup> {
        self.read(|state| state.task_groups(list_id).to_vec())
    }

    pub fn tasks(&self, scope: TaskScope) -> Vec<Task> {
        self.read(|state| state.tasks(scope).to_vec())
    }

    pub fn find_list_name_by_id(&self, list_id: Id) -> Option<String> {
        self.read(|state| state.find_list_name_by_id(list_id).map(str::to_string))
    }

    pub fn telemetry(&self) -> &telemetry::Handle {
        &self.shared.telemetry
    }

    /// Scopes with a reorder still waiting out its debounce window.
    pub fn pending_reorders(&self) -> usize {
        self.shared.debouncer.armed()
    }

    /// Wait until no reorder is debouncing or in flight.
    ///
    /// Returns the first reorder that failed since the previous call. The
    /// failure has already been notified and reconciled by then.
    pub async fn settle(&self) -> SyncResult<()> {
        loop {
            if self.shared.debouncer.armed() > 0 {
                tokio::time::sleep(self.shared.debouncer.window()).await;
                continue;
            }
            self.shared.queue.idle().await;
            if self.shared.debouncer.armed() == 0 && self.shared.queue.pending() == 0 {
                break;
            }
        }
        let failures = std::mem::take(&mut *self.shared.failed_reorders.lock());
        match failures.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Record `intent` as the latest for its scope and arm the debounce timer.
    pub(crate) fn schedule_reorder(&self, intent: ReorderIntent) {
        let scope = intent.scope();
        self.shared.telemetry.record(Event::ReorderQueued {
            scope: scope.to_string(),
            moved_id: intent.moved_id(),
        });

        let weak = Arc::downgrade(&self.shared);
        self.shared.debouncer.submit(scope, intent, move |scope, intent| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let job = Arc::clone(&shared);
            shared.queue.enqueue(scope, async move {
                job.dispatch(intent).await;
            });
        });
    }

    /// Surface a non-reorder failure and record the outcome.
    pub(crate) fn finish<T>(&self, mutation: Mutation, result: SyncResult<T>) -> SyncResult<T> {
        match &result {
            Ok(_) => self
                .shared
                .telemetry
                .record(Event::MutationApplied(mutation.label().into())),
            Err(err) => {
                tracing::warn!(action = mutation.label(), error = %err, "mutation failed");
                self.shared.telemetry.record(Event::MutationFailed {
                    action: mutation.label().into(),
                    error: err.to_string(),
                });
                self.shared.notifier.error(&err.to_string());
            }
        }
        result
    }

    /// Surface a failed fetch to the user.
    pub(crate) fn surface<T>(&self, result: SyncResult<T>) -> SyncResult<T> {
        if let Err(err) = &result {
            self.shared.notifier.error(&err.to_string());
        }
        result
    }
}

/// Neighbor sort keys for a reorder of `moved_id` within `items`.
pub(crate) fn neighbor_keys<T: Sortable>(
    items: &[T],
    scope: Scope,
    moved_id: Id,
    placement: Placement,
) -> (SortKey, SortKey) {
    let context = |role| NeighborContext {
        scope,
        role,
        moved_id,
    };
    (
        resolve_sort_key(items, placement.prev_id, Some(context(NeighborRole::Prev))),
        resolve_sort_key(items, placement.next_id, Some(context(NeighborRole::Next))),
    )
}

impl Shared {
    /// Send one debounced reorder and adopt or reconcile its outcome.
    async fn dispatch(self: &Arc<Self>, intent: ReorderIntent) {
        let scope = intent.scope();
        tracing::debug!(%scope, moved_id = intent.moved_id(), "dispatching reorder");

        let result = match intent.clone() {
            ReorderIntent::Groups(dto) => self
                .api
                .reorder_list_groups(dto)
                .await
                .map(Snapshot::ListGroups),
            ReorderIntent::Lists(dto) => self.api.reorder_lists(dto).await.map(Snapshot::ListGroups),
            ReorderIntent::TaskGroups(dto) => {
                let list_id = dto.list_id;
                self.api
                    .reorder_task_groups(dto)
                    .await
                    .map(|groups| Snapshot::TaskGroups { list_id, groups })
            }
            ReorderIntent::Tasks(dto) => {
                let scope = dto.scope();
                self.api
                    .reorder_tasks(dto)
                    .await
                    .map(|tasks| Snapshot::Tasks { scope, tasks })
            }
        };

        match result {
            Ok(snapshot) => {
                let count = snapshot.item_count();
                self.state.lock().replace_scope(snapshot);
                self.telemetry.record(Event::ReorderCommitted {
                    scope: scope.to_string(),
                    count,
                });
            }
            Err(err) => reconcile::recover(self, &intent, err).await,
        }
    }

    /// Load list groups unless a load is running, or they are loaded and
    /// `force` is unset. Returns whether a request was made.
    pub(crate) async fn load_list_groups(&self, force: bool) -> SyncResult<bool> {
        {
            let mut state = self.state.lock();
            let groups = &mut state.list_groups;
            if groups.loading || (groups.loaded && !force) {
                return Ok(false);
            }
            groups.loading = true;
        }

        let result = self.api.list_groups().await;
        let mut state = self.state.lock();
        state.list_groups.loading = false;
        match result {
            Ok(groups) => {
                let count = groups.len();
                state.replace_scope(Snapshot::ListGroups(groups));
                state.list_groups.last_fetched_at = Some(Utc::now());
                drop(state);
                self.telemetry.record(Event::FetchCompleted {
                    scope: Scope::Groups.to_string(),
                    count,
                });
                Ok(true)
            }
            Err(err) => {
                drop(state);
                self.record_fetch_failure(Scope::Groups, &err);
                Err(err)
            }
        }
    }

    pub(crate) async fn load_task_groups(&self, list_id: Id) -> SyncResult<Vec<TaskGroup>> {
        let scope = Scope::TaskGroups { list_id };
        match self.api.task_groups(list_id).await {
            Ok(groups) => {
                self.state.lock().replace_scope(Snapshot::TaskGroups {
                    list_id,
                    groups: groups.clone(),
                });
                self.telemetry.record(Event::FetchCompleted {
                    scope: scope.to_string(),
                    count: groups.len(),
                });
                Ok(groups)
            }
            Err(err) => {
                self.record_fetch_failure(scope, &err);
                Err(err)
            }
        }
    }

    pub(crate) async fn load_tasks(&self, task_scope: TaskScope) -> SyncResult<Vec<Task>> {
        let scope = Scope::Tasks(task_scope);
        match self.api.tasks(task_scope).await {
            Ok(tasks) => {
                self.state.lock().replace_scope(Snapshot::Tasks {
                    scope: task_scope,
                    tasks: tasks.clone(),
                });
                self.telemetry.record(Event::FetchCompleted {
                    scope: scope.to_string(),
                    count: tasks.len(),
                });
                Ok(tasks)
            }
            Err(err) => {
                self.record_fetch_failure(scope, &err);
                Err(err)
            }
        }
    }

    fn record_fetch_failure(&self, scope: Scope, err: &SyncError) {
        self.telemetry.record(Event::FetchFailed {
            scope: scope.to_string(),
            error: err.to_string(),
        });
    }
}
