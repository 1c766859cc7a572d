//! Request payloads sent to the remote store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{Id, SortDir, SortKey, TaskFilter, TaskPriority, TaskSortKey, TaskStatus};
use crate::scope::{Scope, TaskScope};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameDto {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListGroupDto {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_id: Option<Id>,
    pub prev_sort_order: SortKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListDto {
    pub group_id: Id,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_id: Option<Id>,
    pub prev_sort_order: SortKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskGroupDto {
    pub list_id: Id,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_id: Option<Id>,
    pub prev_sort_order: SortKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskDto {
    pub list_id: Id,
    pub task_group_id: Id,
    pub parent_id: Id,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_id: Option<Id>,
    pub prev_sort_order: SortKey,
}

impl CreateTaskDto {
    pub fn scope(&self) -> TaskScope {
        TaskScope::new(self.list_id, self.task_group_id, self.parent_id)
    }
}

/// Partial task update; `None` fields are left untouched by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchTaskDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_at: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
}

impl PatchTaskDto {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Moves a task into another task group and/or under another parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTaskDto {
    pub list_id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_group_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Id>,
    pub prev_id: Option<Id>,
    pub next_id: Option<Id>,
    pub prev_sort_order: Option<SortKey>,
    pub next_sort_order: Option<SortKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderListGroupsDto {
    pub moved_id: Id,
    pub prev_id: Option<Id>,
    pub next_id: Option<Id>,
    pub prev_sort_order: SortKey,
    pub next_sort_order: SortKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderListsDto {
    pub group_id: Id,
    pub moved_id: Id,
    pub prev_id: Option<Id>,
    pub next_id: Option<Id>,
    pub prev_sort_order: SortKey,
    pub next_sort_order: SortKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderTaskGroupsDto {
    pub list_id: Id,
    pub moved_id: Id,
    pub prev_id: Option<Id>,
    pub next_id: Option<Id>,
    pub prev_sort_order: SortKey,
    pub next_sort_order: SortKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderTasksDto {
    pub list_id: Id,
    pub task_group_id: Id,
    pub parent_id: Id,
    pub moved_id: Id,
    pub prev_id: Option<Id>,
    pub next_id: Option<Id>,
    pub prev_sort_order: SortKey,
    pub next_sort_order: SortKey,
}

impl ReorderTasksDto {
    pub fn scope(&self) -> TaskScope {
        TaskScope::new(self.list_id, self.task_group_id, self.parent_id)
    }
}

/// One pending reorder, as recorded by the debouncer.
#[derive(Debug, Clone, PartialEq)]
pub enum ReorderIntent {
    Groups(ReorderListGroupsDto),
    Lists(ReorderListsDto),
    TaskGroups(ReorderTaskGroupsDto),
    Tasks(ReorderTasksDto),
}

impl ReorderIntent {
    pub fn scope(&self) -> Scope {
        match self {
            ReorderIntent::Groups(_) => Scope::Groups,
            ReorderIntent::Lists(dto) => Scope::Lists {
                group_id: dto.group_id,
            },
            ReorderIntent::TaskGroups(dto) => Scope::TaskGroups {
                list_id: dto.list_id,
            },
            ReorderIntent::Tasks(dto) => Scope::Tasks(dto.scope()),
        }
    }

    pub fn moved_id(&self) -> Id {
        match self {
            ReorderIntent::Groups(dto) => dto.moved_id,
            ReorderIntent::Lists(dto) => dto.moved_id,
            ReorderIntent::TaskGroups(dto) => dto.moved_id,
            ReorderIntent::Tasks(dto) => dto.moved_id,
        }
    }

    /// Message shown when the server rejects the reorder without one.
    pub fn failure_message(&self) -> &'static str {
        match self {
            ReorderIntent::Groups(_) => "Failed to update group order",
            ReorderIntent::Lists(_) => "Failed to update list order",
            ReorderIntent::TaskGroups(_) => "Failed to update task group order",
            ReorderIntent::Tasks(_) => "Failed to update task order",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootTasksQuery {
    pub parent_id: Option<Id>,
    pub filter: Option<TaskFilter>,
    pub sort_key: Option<TaskSortKey>,
    pub sort_dir: Option<SortDir>,
}
