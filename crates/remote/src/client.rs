use std::sync::Arc;

use async_trait::async_trait;
use ordo_core::dto::{
    CreateListDto, CreateListGroupDto, CreateTaskDto, CreateTaskGroupDto, MoveTaskDto,
    PatchTaskDto, RenameDto, ReorderListGroupsDto, ReorderListsDto, ReorderTaskGroupsDto,
    ReorderTasksDto, RootTasksQuery,
};
use ordo_core::envelope::{expect_sequence, Envelope, EnvelopeFamily};
use ordo_core::error::{SyncError, SyncResult};
use ordo_core::model::{Id, ListDto, ListGroup, ListGroupDto, ListItem, Task, TaskGroup};
use ordo_core::notify::Notifier;
use ordo_core::scope::TaskScope;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::api::TaskApi;
use crate::session::{SessionProvider, UnauthorizedGuard};
use crate::transport::{Request, Transport};

const LIST_GROUPS: &str = "/task/list-groups";
const LISTS: &str = "/task/lists";
const TASK_GROUPS: &str = "/task/task-groups";
const TASKS: &str = "/task/tasks";

/// Envelope-aware client for the task backend.
pub struct RemoteApi<T> {
    transport: T,
    session: Arc<dyn SessionProvider>,
    notifier: Arc<dyn Notifier>,
    guard: UnauthorizedGuard,
}

impl<T: Transport> RemoteApi<T> {
    pub fn new(transport: T, session: Arc<dyn SessionProvider>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            transport,
            session,
            notifier,
            guard: UnauthorizedGuard::default(),
        }
    }

    pub fn with_guard(mut self, guard: UnauthorizedGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn execute(&self, mut request: Request, default_message: &str) -> SyncResult<Value> {
        request.token = self.session.token();
        let body = match self.transport.send(request).await {
            Ok(body) => body,
            Err(SyncError::Unauthorized) => {
                self.handle_unauthorized();
                return Err(SyncError::Unauthorized);
            }
            Err(err) => return Err(err),
        };
        Envelope::from_body(body)?.into_data(default_message)
    }

    fn handle_unauthorized(&self) {
        if !self.guard.try_begin() {
            return;
        }
        tracing::warn!("remote store rejected the session token");
        self.session.clear_session();
        self.notifier.error("Session expired, please sign in again");
    }

    async fn call<R: DeserializeOwned>(&self, request: Request, default_message: &str) -> SyncResult<R> {
        let data = self.execute(request, default_message).await?;
        Ok(serde_json::from_value(data)?)
    }

    async fn call_unit(&self, request: Request, default_message: &str) -> SyncResult<()> {
        self.execute(request, default_message).await.map(|_| ())
    }

    async fn call_sequence<R: DeserializeOwned>(
        &self,
        request: Request,
        family: EnvelopeFamily,
        default_message: &str,
    ) -> SyncResult<Vec<R>> {
        let data = self.execute(request, default_message).await?;
        expect_sequence(&data, family, default_message)
    }

    async fn call_groups(&self, request: Request, default_message: &str) -> SyncResult<Vec<ListGroup>> {
        let groups: Vec<ListGroupDto> = self
            .call_sequence(request, EnvelopeFamily::ListGroups, default_message)
            .await?;
        Ok(groups.into_iter().map(ListGroup::from).collect())
    }
}

fn body(value: &impl Serialize) -> SyncResult<Value> {
    Ok(serde_json::to_value(value)?)
}

fn rename(name: String) -> SyncResult<Value> {
    body(&RenameDto { name })
}

#[async_trait]
impl<T: Transport> TaskApi for RemoteApi<T> {
    async fn list_groups(&self) -> SyncResult<Vec<ListGroup>> {
        self.call_groups(Request::get(LIST_GROUPS), "Failed to load list groups")
            .await
    }

    async fn create_list_group(&self, dto: CreateListGroupDto) -> SyncResult<ListGroup> {
        let request = Request::post(LIST_GROUPS).json(body(&dto)?);
        let group: ListGroupDto = self.call(request, "Failed to create group").await?;
        Ok(group.into())
    }

    async fn rename_list_group(&self, group_id: Id, name: String) -> SyncResult<ListGroup> {
        let request = Request::patch(format!("{LIST_GROUPS}/{group_id}")).json(rename(name)?);
        let group: ListGroupDto = self.call(request, "Failed to rename group").await?;
        Ok(group.into())
    }

    async fn delete_list_group(&self, group_id: Id) -> SyncResult<()> {
        let request = Request::delete(format!("{LIST_GROUPS}/{group_id}"));
        self.call_unit(request, "Failed to delete group").await
    }

    async fn reorder_list_groups(&self, dto: ReorderListGroupsDto) -> SyncResult<Vec<ListGroup>> {
        let request = Request::patch(format!("{LIST_GROUPS}/sort-order")).json(body(&dto)?);
        self.call_groups(request, "Failed to update group order").await
    }

    async fn create_list(&self, dto: CreateListDto) -> SyncResult<ListItem> {
        let request = Request::post(LISTS).json(body(&dto)?);
        let list: ListDto = self.call(request, "Failed to create list").await?;
        Ok(list.into())
    }

    async fn rename_list(&self, list_id: Id, name: String) -> SyncResult<ListItem> {
        let request = Request::patch(format!("{LISTS}/{list_id}")).json(rename(name)?);
        let list: ListDto = self.call(request, "Failed to rename list").await?;
        Ok(list.into())
    }

    async fn delete_list(&self, list_id: Id) -> SyncResult<()> {
        let request = Request::delete(format!("{LISTS}/{list_id}"));
        self.call_unit(request, "Failed to delete list").await
    }

    async fn reorder_lists(&self, dto: ReorderListsDto) -> SyncResult<Vec<ListGroup>> {
        let request = Request::patch(format!("{LISTS}/sort-order")).json(body(&dto)?);
        self.call_groups(request, "Failed to update list order").await
    }

    async fn task_groups(&self, list_id: Id) -> SyncResult<Vec<TaskGroup>> {
        let request = Request::get(TASK_GROUPS).query("listId", list_id);
        self.call_sequence(request, EnvelopeFamily::TaskGroups, "Failed to load task groups")
            .await
    }

    async fn create_task_group(&self, dto: CreateTaskGroupDto) -> SyncResult<TaskGroup> {
        let request = Request::post(TASK_GROUPS).json(body(&dto)?);
        self.call(request, "Failed to create task group").await
    }

    async fn rename_task_group(&self, task_group_id: Id, name: String) -> SyncResult<TaskGroup> {
        let request = Request::patch(format!("{TASK_GROUPS}/{task_group_id}")).json(rename(name)?);
        self.call(request, "Failed to rename task group").await
    }

    async fn delete_task_group(&self, task_group_id: Id) -> SyncResult<()> {
        let request = Request::delete(format!("{TASK_GROUPS}/{task_group_id}"));
        self.call_unit(request, "Failed to delete task group").await
    }

    async fn reorder_task_groups(&self, dto: ReorderTaskGroupsDto) -> SyncResult<Vec<TaskGroup>> {
        let request = Request::patch(format!("{TASK_GROUPS}/sort-order")).json(body(&dto)?);
        self.call_sequence(
            request,
            EnvelopeFamily::TaskGroups,
            "Failed to update task group order",
        )
        .await
    }

    async fn tasks(&self, scope: TaskScope) -> SyncResult<Vec<Task>> {
        let request = Request::get(TASKS)
            .query("listId", scope.list_id)
            .query("taskGroupId", scope.task_group_id)
            .query("parentId", scope.parent_id);
        self.call_sequence(request, EnvelopeFamily::Tasks, "Failed to load tasks")
            .await
    }

    async fn root_tasks(&self, query: RootTasksQuery) -> SyncResult<Vec<Task>> {
        let request = Request::get(format!("{TASKS}/root"))
            .query("parentId", query.parent_id.unwrap_or(ordo_core::model::ROOT_PARENT_ID))
            .query_opt("filter", query.filter.map(|filter| filter.as_str()))
            .query_opt("sortKey", query.sort_key.map(|key| key.as_str()))
            .query_opt("sortDir", query.sort_dir.map(|dir| dir.as_str()));
        self.call_sequence(request, EnvelopeFamily::Tasks, "Failed to load tasks")
            .await
    }

    async fn children(&self, task_id: Id) -> SyncResult<Vec<Task>> {
        let request = Request::get(format!("{TASKS}/{task_id}/children"));
        self.call_sequence(request, EnvelopeFamily::Tasks, "Failed to load subtasks")
            .await
    }

    async fn create_task(&self, dto: CreateTaskDto) -> SyncResult<Task> {
        let request = Request::post(TASKS).json(body(&dto)?);
        self.call(request, "Failed to create task").await
    }

    async fn patch_task(&self, task_id: Id, patch: PatchTaskDto) -> SyncResult<Task> {
        let request = Request::patch(format!("{TASKS}/{task_id}")).json(body(&patch)?);
        self.call(request, "Failed to update task").await
    }

    async fn delete_task(&self, task_id: Id, cascade: bool) -> SyncResult<()> {
        let request = Request::delete(format!("{TASKS}/{task_id}")).query("cascade", cascade);
        self.call_unit(request, "Failed to delete task").await
    }

    async fn move_task(&self, task_id: Id, dto: MoveTaskDto) -> SyncResult<Task> {
        let request = Request::patch(format!("{TASKS}/{task_id}/move")).json(body(&dto)?);
        self.call(request, "Failed to move task").await
    }

    async fn reorder_tasks(&self, dto: ReorderTasksDto) -> SyncResult<Vec<Task>> {
        let request = Request::patch(format!("{TASKS}/sort-order")).json(body(&dto)?);
        self.call_sequence(request, EnvelopeFamily::Tasks, "Failed to update task order")
            .await
    }
}
