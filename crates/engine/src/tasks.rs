//! Task groups of a list and the task trees inside them.

use ordo_core::dto::{
    CreateTaskDto, CreateTaskGroupDto, MoveTaskDto, PatchTaskDto, ReorderIntent,
    ReorderTaskGroupsDto, ReorderTasksDto, RootTasksQuery,
};
use ordo_core::error::{SyncError, SyncResult};
use ordo_core::model::{Id, Task, TaskGroup, ROOT_PARENT_ID};
use ordo_core::ordering::{
    creation_anchor, insert_by_neighbors, move_by_neighbors, remove_by_id, resolve_sort_key,
    Placement,
};
use ordo_core::scope::{Scope, TaskScope};

use crate::engine::{neighbor_keys, Mutation, SyncEngine};
use crate::state::Snapshot;

impl SyncEngine {
    pub async fn fetch_task_groups(&self, list_id: Id) -> SyncResult<Vec<TaskGroup>> {
        let result = self.shared.load_task_groups(list_id).await;
        self.surface(result)
    }

    pub async fn create_task_group(
        &self,
        list_id: Id,
        name: &str,
        placement: Placement,
    ) -> SyncResult<TaskGroup> {
        let prev_sort_order = self.read(|state| {
            state
                .task_groups_loaded(list_id)
                .then(|| creation_anchor(state.task_groups(list_id), placement))
        });
        let Some(prev_sort_order) = prev_sort_order else {
            return Err(SyncError::NotFound(format!(
                "task groups of list {list_id} are not loaded"
            )));
        };
        let dto = CreateTaskGroupDto {
            list_id,
            name: name.to_string(),
            prev_id: placement.prev_id,
            next_id: placement.next_id,
            prev_sort_order,
        };

        let result = self.shared.api.create_task_group(dto).await;
        if let Ok(group) = &result {
            let mut state = self.shared.state.lock();
            insert_by_neighbors(state.task_groups_mut(list_id), group.clone(), placement);
        }
        self.finish(Mutation::CreateTaskGroup, result)
    }

    pub async fn rename_task_group(&self, task_group_id: Id, name: &str) -> SyncResult<()> {
        let result = self
            .shared
            .api
            .rename_task_group(task_group_id, name.to_string())
            .await;
        if let Ok(updated) = &result {
            if let Some(group) = self.shared.state.lock().find_task_group_mut(task_group_id) {
                group.name = updated.name.clone();
                group.sort_order = updated.sort_order;
            }
        }
        self.finish(Mutation::RenameTaskGroup, result.map(|_| ()))
    }

    pub async fn delete_task_group(&self, task_group_id: Id) -> SyncResult<()> {
        let result = self.shared.api.delete_task_group(task_group_id).await;
        if result.is_ok() {
            let mut state = self.shared.state.lock();
            if let Some(list_id) = state.list_of_task_group(task_group_id) {
                state.remove_task_group(list_id, task_group_id);
            }
        }
        self.finish(Mutation::DeleteTaskGroup, result)
    }

    /// Move a task group next to its new neighbors and schedule the reorder.
    pub fn reorder_task_group(
        &self,
        list_id: Id,
        moved_id: Id,
        placement: Placement,
    ) -> SyncResult<()> {
        let scope = Scope::TaskGroups { list_id };
        let dto = {
            let mut state = self.shared.state.lock();
            if !state.task_groups_loaded(list_id) {
                return Err(SyncError::not_found("task group", moved_id));
            }
            let groups = state.task_groups_mut(list_id);
            if !move_by_neighbors(groups, moved_id, placement) {
                return Err(SyncError::not_found("task group", moved_id));
            }
            let (prev_sort_order, next_sort_order) =
                neighbor_keys(groups, scope, moved_id, placement);
            ReorderTaskGroupsDto {
                list_id,
                moved_id,
                prev_id: placement.prev_id,
                next_id: placement.next_id,
                prev_sort_order,
                next_sort_order,
            }
        };
        self.schedule_reorder(ReorderIntent::TaskGroups(dto));
        Ok(())
    }

    pub async fn fetch_tasks(&self, scope: TaskScope) -> SyncResult<Vec<Task>> {
        let result = self.shared.load_tasks(scope).await;
        self.surface(result)
    }

    /// Load the children of a task. They are kept in the tree only when the
    /// parent itself is loaded.
    pub async fn fetch_children(&self, task_id: Id) -> SyncResult<Vec<Task>> {
        let result = self.shared.api.children(task_id).await;
        if let Ok(children) = &result {
            let mut state = self.shared.state.lock();
            let parent_scope = state.find_task(task_id).map(|(scope, _)| scope);
            if let Some(scope) = parent_scope {
                let child_scope = TaskScope::new(scope.list_id, scope.task_group_id, task_id);
                state.replace_scope(Snapshot::Tasks {
                    scope: child_scope,
                    tasks: children.clone(),
                });
            }
        }
        self.surface(result)
    }

    /// Root tasks across lists; not mirrored into the tree.
    pub async fn my_root_tasks(&self, query: RootTasksQuery) -> SyncResult<Vec<Task>> {
        let result = self.shared.api.root_tasks(query).await;
        self.surface(result)
    }

    pub async fn create_task(
        &self,
        scope: TaskScope,
        name: &str,
        placement: Placement,
    ) -> SyncResult<Task> {
        let prev_sort_order = self.read(|state| {
            state
                .is_scope_complete(scope)
                .then(|| creation_anchor(state.tasks(scope), placement))
        });
        let Some(prev_sort_order) = prev_sort_order else {
            return Err(SyncError::NotFound(format!(
                "{} is not loaded",
                Scope::Tasks(scope)
            )));
        };
        let dto = CreateTaskDto {
            list_id: scope.list_id,
            task_group_id: scope.task_group_id,
            parent_id: scope.parent_id,
            name: name.to_string(),
            prev_id: placement.prev_id,
            next_id: placement.next_id,
            prev_sort_order,
        };

        let result = self.shared.api.create_task(dto).await;
        if let Ok(task) = &result {
            let mut state = self.shared.state.lock();
            insert_by_neighbors(state.tasks_mut(scope), task.clone(), placement);
            if scope.parent_id != ROOT_PARENT_ID {
                if let Some(parent) = state.find_task_mut(scope.parent_id) {
                    parent.has_children = true;
                }
            }
        }
        self.finish(Mutation::CreateTask, result)
    }

    pub async fn update_task(&self, task_id: Id, patch: PatchTaskDto) -> SyncResult<Task> {
        let result = self.shared.api.patch_task(task_id, patch).await;
        if let Ok(updated) = &result {
            if let Some(task) = self.shared.state.lock().find_task_mut(task_id) {
                *task = updated.clone();
            }
        }
        self.finish(Mutation::UpdateTask, result)
    }

    pub async fn delete_task(&self, task_id: Id, cascade: bool) -> SyncResult<()> {
        let result = self.shared.api.delete_task(task_id, cascade).await;
        if result.is_ok() {
            let mut state = self.shared.state.lock();
            if let Some((scope, _)) = state.remove_task(task_id) {
                state.forget_subtree(scope.list_id, task_id);
                if state.tasks(scope).is_empty() {
                    if let Some(parent) = state.find_task_mut(scope.parent_id) {
                        parent.has_children = false;
                    }
                }
            }
        }
        self.finish(Mutation::DeleteTask, result)
    }

    /// Move a task into another scope (task group and/or parent).
    ///
    /// The move is applied locally first; a failure refetches both scopes.
    pub async fn move_task(
        &self,
        task_id: Id,
        target: TaskScope,
        placement: Placement,
    ) -> SyncResult<Task> {
        let prepared = {
            let mut state = self.shared.state.lock();
            let source = state.find_task(task_id).map(|(scope, _)| scope);
            match source {
                None => None,
                Some(source) => {
                    let siblings = state.tasks(target);
                    let prev_sort_order = placement
                        .prev_id
                        .map(|id| resolve_sort_key(siblings, Some(id), None));
                    let next_sort_order = placement
                        .next_id
                        .map(|id| resolve_sort_key(siblings, Some(id), None));

                    let removed = remove_by_id(state.tasks_mut(source), task_id);
                    if let Some(mut task) = removed.filter(|_| state.is_scope_loaded(target)) {
                        task.list_id = target.list_id;
                        task.task_group_id = target.task_group_id;
                        task.parent_id = target.parent_id;
                        insert_by_neighbors(state.tasks_mut(target), task, placement);
                    }
                    Some((source, prev_sort_order, next_sort_order))
                }
            }
        };
        let Some((source, prev_sort_order, next_sort_order)) = prepared else {
            return self.finish(Mutation::MoveTask, Err(SyncError::not_found("task", task_id)));
        };

        let dto = MoveTaskDto {
            list_id: target.list_id,
            task_group_id: Some(target.task_group_id),
            parent_id: Some(target.parent_id),
            prev_id: placement.prev_id,
            next_id: placement.next_id,
            prev_sort_order,
            next_sort_order,
        };
        let result = self.shared.api.move_task(task_id, dto).await;
        match &result {
            Ok(moved) => {
                if let Some(task) = self.shared.state.lock().find_task_mut(task_id) {
                    *task = moved.clone();
                }
            }
            Err(_) => {
                for scope in [source, target] {
                    if let Err(err) = self.shared.load_tasks(scope).await {
                        tracing::warn!(scope = %Scope::Tasks(scope), error = %err, "task refetch failed");
                    }
                }
            }
        }
        self.finish(Mutation::MoveTask, result)
    }

    /// Move a task within its sibling scope and schedule the reorder.
    pub fn reorder_task(&self, scope: TaskScope, moved_id: Id, placement: Placement) -> SyncResult<()> {
        let dto = {
            let mut state = self.shared.state.lock();
            if !state.is_scope_loaded(scope) {
                return Err(SyncError::not_found("task", moved_id));
            }
            let tasks = state.tasks_mut(scope);
            if !move_by_neighbors(tasks, moved_id, placement) {
                return Err(SyncError::not_found("task", moved_id));
            }
            let (prev_sort_order, next_sort_order) =
                neighbor_keys(tasks, Scope::Tasks(scope), moved_id, placement);
            ReorderTasksDto {
                list_id: scope.list_id,
                task_group_id: scope.task_group_id,
                parent_id: scope.parent_id,
                moved_id,
                prev_id: placement.prev_id,
                next_id: placement.next_id,
                prev_sort_order,
                next_sort_order,
            }
        };
        self.schedule_reorder(ReorderIntent::Tasks(dto));
        Ok(())
    }
}
