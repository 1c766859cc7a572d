//! Keys naming one ordered sibling collection.

use std::fmt;

use crate::model::Id;

/// Sibling tasks share a list, a task group and a parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskScope {
    pub list_id: Id,
    pub task_group_id: Id,
    pub parent_id: Id,
}

impl TaskScope {
    pub fn new(list_id: Id, task_group_id: Id, parent_id: Id) -> Self {
        Self {
            list_id,
            task_group_id,
            parent_id,
        }
    }

    pub fn root(list_id: Id, task_group_id: Id) -> Self {
        Self::new(list_id, task_group_id, crate::model::ROOT_PARENT_ID)
    }
}

/// Two reorders on different scopes never wait for each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    Groups,
    Lists { group_id: Id },
    TaskGroups { list_id: Id },
    Tasks(TaskScope),
}

impl Scope {
    /// List whose board owns this scope, if any.
    pub fn list_id(&self) -> Option<Id> {
        match self {
            Scope::Groups | Scope::Lists { .. } => None,
            Scope::TaskGroups { list_id } => Some(*list_id),
            Scope::Tasks(scope) => Some(scope.list_id),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Groups => write!(f, "groups"),
            Scope::Lists { group_id } => write!(f, "lists:{group_id}"),
            Scope::TaskGroups { list_id } => write!(f, "task-groups:{list_id}"),
            Scope::Tasks(scope) => write!(
                f,
                "tasks:{}:{}:{}",
                scope.list_id, scope.task_group_id, scope.parent_id
            ),
        }
    }
}
