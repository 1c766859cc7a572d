use async_trait::async_trait;
use ordo_core::dto::{
    CreateListDto, CreateListGroupDto, CreateTaskDto, CreateTaskGroupDto, MoveTaskDto,
    PatchTaskDto, ReorderListGroupsDto, ReorderListsDto, ReorderTaskGroupsDto, ReorderTasksDto,
    RootTasksQuery,
};
use ordo_core::error::SyncResult;
use ordo_core::model::{Id, ListGroup, ListItem, Task, TaskGroup};
use ordo_core::scope::TaskScope;

/// Every remote operation the sync engine relies on.
///
/// Reorder calls return the authoritative ordering of the affected scope;
/// reordering lists returns every group, since a list may change groups.
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list_groups(&self) -> SyncResult<Vec<ListGroup>>;
    async fn create_list_group(&self, dto: CreateListGroupDto) -> SyncResult<ListGroup>;
    async fn rename_list_group(&self, group_id: Id, name: String) -> SyncResult<ListGroup>;
    async fn delete_list_group(&self, group_id: Id) -> SyncResult<()>;
    async fn reorder_list_groups(&self, dto: ReorderListGroupsDto) -> SyncResult<Vec<ListGroup>>;

    async fn create_list(&self, dto: CreateListDto) -> SyncResult<ListItem>;
    async fn rename_list(&self, list_id: Id, name: String) -> SyncResult<ListItem>;
    async fn delete_list(&self, list_id: Id) -> SyncResult<()>;
    async fn reorder_lists(&self, dto: ReorderListsDto) -> SyncResult<Vec<ListGroup>>;

    async fn task_groups(&self, list_id: Id) -> SyncResult<Vec<TaskGroup>>;
    async fn create_task_group(&self, dto: CreateTaskGroupDto) -> SyncResult<TaskGroup>;
    async fn rename_task_group(&self, task_group_id: Id, name: String) -> SyncResult<TaskGroup>;
    async fn delete_task_group(&self, task_group_id: Id) -> SyncResult<()>;
    async fn reorder_task_groups(&self, dto: ReorderTaskGroupsDto) -> SyncResult<Vec<TaskGroup>>;

    async fn tasks(&self, scope: TaskScope) -> SyncResult<Vec<Task>>;
    async fn root_tasks(&self, query: RootTasksQuery) -> SyncResult<Vec<Task>>;
    async fn children(&self, task_id: Id) -> SyncResult<Vec<Task>>;
    async fn create_task(&self, dto: CreateTaskDto) -> SyncResult<Task>;
    async fn patch_task(&self, task_id: Id, patch: PatchTaskDto) -> SyncResult<Task>;
    async fn delete_task(&self, task_id: Id, cascade: bool) -> SyncResult<()>;
    async fn move_task(&self, task_id: Id, dto: MoveTaskDto) -> SyncResult<Task>;
    async fn reorder_tasks(&self, dto: ReorderTasksDto) -> SyncResult<Vec<Task>>;
}
