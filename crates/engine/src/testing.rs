//! In-memory remote store for engine tests. It assigns sort keys the way the
//! real backend does: from the neighbor keys in the payload.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use ordo_core::dto::{
    CreateListDto, CreateListGroupDto, CreateTaskDto, CreateTaskGroupDto, MoveTaskDto,
    PatchTaskDto, ReorderIntent, ReorderListGroupsDto, ReorderListsDto, ReorderTaskGroupsDto,
    ReorderTasksDto, RootTasksQuery,
};
use ordo_core::error::{SyncError, SyncResult};
use ordo_core::model::{
    Id, ListGroup, ListItem, SortKey, Task, TaskFilter, TaskGroup, TaskPriority, TaskStatus,
    ROOT_PARENT_ID,
};
use ordo_core::notify::Notifier;
use ordo_core::scope::TaskScope;
use ordo_remote::TaskApi;
use parking_lot::Mutex;

pub(crate) const WORK: Id = 1;
pub(crate) const HOME: Id = 2;
pub(crate) const LATER: Id = 3;
pub(crate) const INBOX: Id = 10;
pub(crate) const DEFAULT_TG: Id = 100;
pub(crate) const DOING_TG: Id = 101;

#[derive(Default)]
struct Data {
    groups: Vec<ListGroup>,
    task_groups: Vec<TaskGroup>,
    tasks: Vec<Task>,
}

pub(crate) struct FakeServer {
    data: Mutex<Data>,
    calls: Mutex<Vec<&'static str>>,
    log: Mutex<Vec<String>>,
    reorders: Mutex<Vec<ReorderIntent>>,
    failures: Mutex<HashMap<&'static str, (SyncError, usize)>>,
    delays: Mutex<HashMap<&'static str, Duration>>,
    next_id: AtomicI64,
}

fn by_key<T>(items: &mut [T], key: impl Fn(&T) -> SortKey) {
    items.sort_by(|a, b| key(a).total_cmp(&key(b)));
}

/// Key the backend assigns to an item placed between two neighbors.
fn placed_key(prev_id: Option<Id>, next_id: Option<Id>, prev: SortKey, next: SortKey) -> SortKey {
    match (prev_id, next_id) {
        (Some(_), Some(_)) => (prev + next) / 2.0,
        (Some(_), None) => prev + 1.0,
        (None, Some(_)) => next - 1.0,
        (None, None) => 1.0,
    }
}

fn in_scope(task: &Task, scope: TaskScope) -> bool {
    task.list_id == scope.list_id
        && task.task_group_id == scope.task_group_id
        && task.parent_id == scope.parent_id
}

pub(crate) fn task(id: Id, scope: TaskScope, sort_order: SortKey) -> Task {
    Task {
        id,
        user_id: 1,
        list_id: scope.list_id,
        task_group_id: scope.task_group_id,
        parent_id: scope.parent_id,
        name: format!("Task {id}"),
        content: None,
        sort_order,
        status: TaskStatus::Todo,
        priority: TaskPriority::None,
        started_at: None,
        due_at: None,
        completed_at: None,
        created_at: None,
        updated_at: None,
        has_children: false,
    }
}

fn list(id: Id, name: &str, sort_order: SortKey) -> ListItem {
    ListItem {
        id,
        name: name.into(),
        sort_order,
    }
}

fn task_group(id: Id, list_id: Id, sort_order: SortKey, is_default: bool) -> TaskGroup {
    TaskGroup {
        id,
        list_id,
        name: format!("Group {id}"),
        sort_order,
        is_default,
    }
}

impl FakeServer {
    /// Groups A(1) B(2) C(3); list 10 with task groups 100..=102, three root
    /// tasks in group 100 and two children under task 1000.
    pub(crate) fn seeded() -> Self {
        let root = TaskScope::root(INBOX, DEFAULT_TG);
        let children = TaskScope::new(INBOX, DEFAULT_TG, 1000);
        let mut parent = task(1000, root, 1.0);
        parent.has_children = true;

        let data = Data {
            groups: vec![
                ListGroup {
                    id: WORK,
                    name: "A".into(),
                    sort_order: 1.0,
                    list: vec![
                        list(INBOX, "Inbox", 1.0),
                        list(11, "Backlog", 2.0),
                        list(12, "Ideas", 3.0),
                    ],
                },
                ListGroup {
                    id: HOME,
                    name: "B".into(),
                    sort_order: 2.0,
                    list: vec![list(20, "Chores", 1.0)],
                },
                ListGroup {
                    id: LATER,
                    name: "C".into(),
                    sort_order: 3.0,
                    list: Vec::new(),
                },
            ],
            task_groups: vec![
                task_group(DEFAULT_TG, INBOX, 1.0, true),
                task_group(DOING_TG, INBOX, 2.0, false),
                task_group(102, INBOX, 3.0, false),
            ],
            tasks: vec![
                parent,
                task(1001, root, 2.0),
                task(1002, root, 3.0),
                task(1003, children, 1.0),
                task(1004, children, 2.0),
            ],
        };

        Self {
            data: Mutex::new(data),
            calls: Mutex::new(Vec::new()),
            log: Mutex::new(Vec::new()),
            reorders: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(5000),
        }
    }

    /// Fail the next `times` calls of `op` with `err`.
    pub(crate) fn fail(&self, op: &'static str, err: SyncError, times: usize) {
        self.failures.lock().insert(op, (err, times));
    }

    pub(crate) fn delay(&self, op: &'static str, delay: Duration) {
        self.delays.lock().insert(op, delay);
    }

    pub(crate) fn calls(&self, op: &str) -> usize {
        self.calls.lock().iter().filter(|call| **call == op).count()
    }

    pub(crate) fn log(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    pub(crate) fn reorders(&self) -> Vec<ReorderIntent> {
        self.reorders.lock().clone()
    }

    /// Authoritative list groups, as a fresh fetch would return them.
    pub(crate) fn groups(&self) -> Vec<ListGroup> {
        self.data.lock().sorted_groups()
    }

    pub(crate) fn scope_tasks(&self, scope: TaskScope) -> Vec<Task> {
        self.data.lock().sorted_tasks(|task| in_scope(task, scope))
    }

    pub(crate) fn list_task_groups(&self, list_id: Id) -> Vec<TaskGroup> {
        self.data.lock().sorted_task_groups(list_id)
    }

    /// Mutate the store behind the engine's back, as another client would.
    pub(crate) fn edit_task(&self, task_id: Id, f: impl FnOnce(&mut Task)) {
        if let Some(task) = self.data.lock().tasks.iter_mut().find(|t| t.id == task_id) {
            f(task);
        }
    }

    fn next_id(&self) -> Id {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn take_failure(&self, op: &'static str) -> Option<SyncError> {
        let mut failures = self.failures.lock();
        let (err, remaining) = failures.get_mut(op)?;
        let err = err.clone();
        *remaining -= 1;
        if *remaining == 0 {
            failures.remove(op);
        }
        Some(err)
    }

    async fn run<R>(
        &self,
        op: &'static str,
        f: impl FnOnce(&mut Data) -> SyncResult<R> + Send,
    ) -> SyncResult<R> {
        self.calls.lock().push(op);
        self.log.lock().push(format!("start {op}"));
        let delay = self.delays.lock().get(op).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let result = match self.take_failure(op) {
            Some(err) => Err(err),
            None => f(&mut self.data.lock()),
        };
        self.log.lock().push(format!("end {op}"));
        result
    }
}

impl Data {
    fn sorted_groups(&self) -> Vec<ListGroup> {
        let mut groups = self.groups.clone();
        by_key(&mut groups, |group: &ListGroup| group.sort_order);
        for group in &mut groups {
            by_key(&mut group.list, |item: &ListItem| item.sort_order);
        }
        groups
    }

    fn sorted_task_groups(&self, list_id: Id) -> Vec<TaskGroup> {
        let mut groups: Vec<TaskGroup> = self
            .task_groups
            .iter()
            .filter(|group| group.list_id == list_id)
            .cloned()
            .collect();
        by_key(&mut groups, |group: &TaskGroup| group.sort_order);
        groups
    }

    fn sorted_tasks(&self, filter: impl Fn(&Task) -> bool) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|&task| filter(task))
            .cloned()
            .collect();
        by_key(&mut tasks, |task: &Task| task.sort_order);
        tasks
    }

    fn task_mut(&mut self, task_id: Id) -> SyncResult<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == task_id)
            .ok_or_else(|| SyncError::Rejected(format!("task {task_id} does not exist")))
    }

    fn remove_subtree(&mut self, task_id: Id) {
        let mut pending = vec![task_id];
        while let Some(id) = pending.pop() {
            pending.extend(
                self.tasks
                    .iter()
                    .filter(|task| task.parent_id == id)
                    .map(|task| task.id),
            );
            self.tasks.retain(|task| task.id != id);
        }
    }
}

#[async_trait]
impl TaskApi for FakeServer {
    async fn list_groups(&self) -> SyncResult<Vec<ListGroup>> {
        self.run("list_groups", |data| Ok(data.sorted_groups())).await
    }

    async fn create_list_group(&self, dto: CreateListGroupDto) -> SyncResult<ListGroup> {
        let id = self.next_id();
        self.run("create_list_group", move |data| {
            let group = ListGroup {
                id,
                name: dto.name,
                sort_order: dto.prev_sort_order + 1.0,
                list: Vec::new(),
            };
            data.groups.push(group.clone());
            Ok(group)
        })
        .await
    }

    async fn rename_list_group(&self, group_id: Id, name: String) -> SyncResult<ListGroup> {
        self.run("rename_list_group", move |data| {
            let group = data
                .groups
                .iter_mut()
                .find(|group| group.id == group_id)
                .ok_or_else(|| SyncError::Rejected("group does not exist".into()))?;
            group.name = name;
            Ok(group.clone())
        })
        .await
    }

    async fn delete_list_group(&self, group_id: Id) -> SyncResult<()> {
        self.run("delete_list_group", move |data| {
            data.groups.retain(|group| group.id != group_id);
            Ok(())
        })
        .await
    }

    async fn reorder_list_groups(&self, dto: ReorderListGroupsDto) -> SyncResult<Vec<ListGroup>> {
        self.reorders.lock().push(ReorderIntent::Groups(dto.clone()));
        self.run("reorder_list_groups", move |data| {
            let key = placed_key(dto.prev_id, dto.next_id, dto.prev_sort_order, dto.next_sort_order);
            let group = data
                .groups
                .iter_mut()
                .find(|group| group.id == dto.moved_id)
                .ok_or_else(|| SyncError::Rejected("group does not exist".into()))?;
            group.sort_order = key;
            Ok(data.sorted_groups())
        })
        .await
    }

    async fn create_list(&self, dto: CreateListDto) -> SyncResult<ListItem> {
        let id = self.next_id();
        self.run("create_list", move |data| {
            let group = data
                .groups
                .iter_mut()
                .find(|group| group.id == dto.group_id)
                .ok_or_else(|| SyncError::Rejected("group does not exist".into()))?;
            let item = list(id, &dto.name, dto.prev_sort_order + 1.0);
            group.list.push(item.clone());
            Ok(item)
        })
        .await
    }

    async fn rename_list(&self, list_id: Id, name: String) -> SyncResult<ListItem> {
        self.run("rename_list", move |data| {
            let item = data
                .groups
                .iter_mut()
                .find_map(|group| group.list.iter_mut().find(|item| item.id == list_id))
                .ok_or_else(|| SyncError::Rejected("list does not exist".into()))?;
            item.name = name;
            Ok(item.clone())
        })
        .await
    }

    async fn delete_list(&self, list_id: Id) -> SyncResult<()> {
        self.run("delete_list", move |data| {
            for group in &mut data.groups {
                group.list.retain(|item| item.id != list_id);
            }
            Ok(())
        })
        .await
    }

    async fn reorder_lists(&self, dto: ReorderListsDto) -> SyncResult<Vec<ListGroup>> {
        self.reorders.lock().push(ReorderIntent::Lists(dto.clone()));
        self.run("reorder_lists", move |data| {
            let mut moved = None;
            for group in &mut data.groups {
                if let Some(index) = group.list.iter().position(|item| item.id == dto.moved_id) {
                    moved = Some(group.list.remove(index));
                }
            }
            let mut item = moved.ok_or_else(|| SyncError::Rejected("list does not exist".into()))?;
            item.sort_order =
                placed_key(dto.prev_id, dto.next_id, dto.prev_sort_order, dto.next_sort_order);
            let target = data
                .groups
                .iter_mut()
                .find(|group| group.id == dto.group_id)
                .ok_or_else(|| SyncError::Rejected("group does not exist".into()))?;
            target.list.push(item);
            Ok(data.sorted_groups())
        })
        .await
    }

    async fn task_groups(&self, list_id: Id) -> SyncResult<Vec<TaskGroup>> {
        self.run("task_groups", move |data| Ok(data.sorted_task_groups(list_id)))
            .await
    }

    async fn create_task_group(&self, dto: CreateTaskGroupDto) -> SyncResult<TaskGroup> {
        let id = self.next_id();
        self.run("create_task_group", move |data| {
            let mut group = task_group(id, dto.list_id, dto.prev_sort_order + 1.0, false);
            group.name = dto.name;
            data.task_groups.push(group.clone());
            Ok(group)
        })
        .await
    }

    async fn rename_task_group(&self, task_group_id: Id, name: String) -> SyncResult<TaskGroup> {
        self.run("rename_task_group", move |data| {
            let group = data
                .task_groups
                .iter_mut()
                .find(|group| group.id == task_group_id)
                .ok_or_else(|| SyncError::Rejected("task group does not exist".into()))?;
            group.name = name;
            Ok(group.clone())
        })
        .await
    }

    async fn delete_task_group(&self, task_group_id: Id) -> SyncResult<()> {
        self.run("delete_task_group", move |data| {
            data.task_groups.retain(|group| group.id != task_group_id);
            data.tasks.retain(|task| task.task_group_id != task_group_id);
            Ok(())
        })
        .await
    }

    async fn reorder_task_groups(&self, dto: ReorderTaskGroupsDto) -> SyncResult<Vec<TaskGroup>> {
        self.reorders.lock().push(ReorderIntent::TaskGroups(dto.clone()));
        self.run("reorder_task_groups", move |data| {
            let key = placed_key(dto.prev_id, dto.next_id, dto.prev_sort_order, dto.next_sort_order);
            let group = data
                .task_groups
                .iter_mut()
                .find(|group| group.id == dto.moved_id)
                .ok_or_else(|| SyncError::Rejected("task group does not exist".into()))?;
            group.sort_order = key;
            Ok(data.sorted_task_groups(dto.list_id))
        })
        .await
    }

    async fn tasks(&self, scope: TaskScope) -> SyncResult<Vec<Task>> {
        self.run("tasks", move |data| {
            Ok(data.sorted_tasks(|task| in_scope(task, scope)))
        })
        .await
    }

    async fn root_tasks(&self, query: RootTasksQuery) -> SyncResult<Vec<Task>> {
        self.run("root_tasks", move |data| {
            let parent_id = query.parent_id.unwrap_or(ROOT_PARENT_ID);
            let filter = query.filter.unwrap_or(TaskFilter::All);
            Ok(data.sorted_tasks(|task| {
                task.parent_id == parent_id
                    && match filter {
                        TaskFilter::All => true,
                        TaskFilter::Todo => !task.is_done(),
                        TaskFilter::Done => task.is_done(),
                    }
            }))
        })
        .await
    }

    async fn children(&self, task_id: Id) -> SyncResult<Vec<Task>> {
        self.run("children", move |data| {
            Ok(data.sorted_tasks(|task| task.parent_id == task_id))
        })
        .await
    }

    async fn create_task(&self, dto: CreateTaskDto) -> SyncResult<Task> {
        let id = self.next_id();
        self.run("create_task", move |data| {
            let mut created = task(id, dto.scope(), dto.prev_sort_order + 1.0);
            created.name = dto.name;
            if dto.parent_id != ROOT_PARENT_ID {
                data.task_mut(dto.parent_id)?.has_children = true;
            }
            data.tasks.push(created.clone());
            Ok(created)
        })
        .await
    }

    async fn patch_task(&self, task_id: Id, patch: PatchTaskDto) -> SyncResult<Task> {
        self.run("patch_task", move |data| {
            let task = data.task_mut(task_id)?;
            if let Some(name) = patch.name {
                task.name = name;
            }
            if let Some(content) = patch.content {
                task.content = content;
            }
            if let Some(started_at) = patch.started_at {
                task.started_at = started_at;
            }
            if let Some(due_at) = patch.due_at {
                task.due_at = due_at;
            }
            if let Some(status) = patch.status {
                task.status = status;
            }
            if let Some(priority) = patch.priority {
                task.priority = priority;
            }
            Ok(task.clone())
        })
        .await
    }

    async fn delete_task(&self, task_id: Id, cascade: bool) -> SyncResult<()> {
        self.run("delete_task", move |data| {
            if cascade {
                data.remove_subtree(task_id);
            } else {
                data.tasks.retain(|task| task.id != task_id);
            }
            Ok(())
        })
        .await
    }

    async fn move_task(&self, task_id: Id, dto: MoveTaskDto) -> SyncResult<Task> {
        self.run("move_task", move |data| {
            let key = placed_key(
                dto.prev_id,
                dto.next_id,
                dto.prev_sort_order.unwrap_or_default(),
                dto.next_sort_order.unwrap_or_default(),
            );
            let task = data.task_mut(task_id)?;
            task.list_id = dto.list_id;
            if let Some(task_group_id) = dto.task_group_id {
                task.task_group_id = task_group_id;
            }
            if let Some(parent_id) = dto.parent_id {
                task.parent_id = parent_id;
            }
            task.sort_order = key;
            Ok(task.clone())
        })
        .await
    }

    async fn reorder_tasks(&self, dto: ReorderTasksDto) -> SyncResult<Vec<Task>> {
        self.reorders.lock().push(ReorderIntent::Tasks(dto.clone()));
        self.run("reorder_tasks", move |data| {
            let key = placed_key(dto.prev_id, dto.next_id, dto.prev_sort_order, dto.next_sort_order);
            data.task_mut(dto.moved_id)?.sort_order = key;
            let scope = dto.scope();
            Ok(data.sorted_tasks(|task| in_scope(task, scope)))
        })
        .await
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    errors: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub(crate) fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.errors.lock().push(message.to_string());
    }
}
