//! In-memory tree mirrored from the remote store.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use ordo_core::model::{Id, ListGroup, ListItem, Task, TaskGroup, ROOT_PARENT_ID};
use ordo_core::ordering::{position_of, remove_by_id};
use ordo_core::scope::{Scope, TaskScope};

#[derive(Debug, Clone, Default)]
pub struct ListGroupsState {
    pub groups: Vec<ListGroup>,
    pub loading: bool,
    pub loaded: bool,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

/// Everything loaded for one list: its task groups and task sibling
/// collections keyed by `(task_group_id, parent_id)`.
#[derive(Debug, Clone, Default)]
pub struct Board {
    pub task_groups: Vec<TaskGroup>,
    pub task_groups_loaded: bool,
    pub tasks: BTreeMap<(Id, Id), Vec<Task>>,
}

/// Authoritative ordering of one scope, as returned by the remote store.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    ListGroups(Vec<ListGroup>),
    TaskGroups { list_id: Id, groups: Vec<TaskGroup> },
    Tasks { scope: TaskScope, tasks: Vec<Task> },
}

impl Snapshot {
    pub fn scope(&self) -> Scope {
        match self {
            Snapshot::ListGroups(_) => Scope::Groups,
            Snapshot::TaskGroups { list_id, .. } => Scope::TaskGroups { list_id: *list_id },
            Snapshot::Tasks { scope, .. } => Scope::Tasks(*scope),
        }
    }

    pub fn item_count(&self) -> usize {
        match self {
            Snapshot::ListGroups(groups) => groups.len(),
            Snapshot::TaskGroups { groups, .. } => groups.len(),
            Snapshot::Tasks { tasks, .. } => tasks.len(),
        }
    }
}

#[derive(Debug, Default)]
pub struct TreeState {
    pub list_groups: ListGroupsState,
    boards: HashMap<Id, Board>,
}

impl TreeState {
    /// Replace one scope wholesale. This is the only place sort keys change.
    pub fn replace_scope(&mut self, snapshot: Snapshot) {
        tracing::trace!(
            scope = %snapshot.scope(),
            count = snapshot.item_count(),
            "replacing scope"
        );
        match snapshot {
            Snapshot::ListGroups(groups) => {
                self.list_groups.groups = groups;
                self.list_groups.loaded = true;
            }
            Snapshot::TaskGroups { list_id, groups } => {
                let board = self.board_mut(list_id);
                board.task_groups = groups;
                board.task_groups_loaded = true;
            }
            Snapshot::Tasks { scope, tasks } => {
                self.board_mut(scope.list_id)
                    .tasks
                    .insert((scope.task_group_id, scope.parent_id), tasks);
            }
        }
    }

    pub fn groups(&self) -> &[ListGroup] {
        &self.list_groups.groups
    }

    pub fn groups_mut(&mut self) -> &mut Vec<ListGroup> {
        &mut self.list_groups.groups
    }

    pub fn group(&self, group_id: Id) -> Option<&ListGroup> {
        self.list_groups.groups.iter().find(|group| group.id == group_id)
    }

    pub fn group_mut(&mut self, group_id: Id) -> Option<&mut ListGroup> {
        self.list_groups
            .groups
            .iter_mut()
            .find(|group| group.id == group_id)
    }

    /// Lists of `group_id`, empty when the group is not loaded.
    pub fn lists(&self, group_id: Id) -> &[ListItem] {
        self.group(group_id)
            .map(|group| group.list.as_slice())
            .unwrap_or(&[])
    }

    /// Group holding `list_id`, and the list itself.
    pub fn find_list(&self, list_id: Id) -> Option<(Id, &ListItem)> {
        self.list_groups.groups.iter().find_map(|group| {
            group
                .list
                .iter()
                .find(|item| item.id == list_id)
                .map(|item| (group.id, item))
        })
    }

    pub fn find_list_mut(&mut self, list_id: Id) -> Option<&mut ListItem> {
        self.list_groups
            .groups
            .iter_mut()
            .find_map(|group| group.list.iter_mut().find(|item| item.id == list_id))
    }

    pub fn find_list_name_by_id(&self, list_id: Id) -> Option<&str> {
        self.find_list(list_id).map(|(_, item)| item.name.as_str())
    }

    /// Detach a list from whichever group holds it.
    pub fn remove_list(&mut self, list_id: Id) -> Option<ListItem> {
        self.list_groups
            .groups
            .iter_mut()
            .find_map(|group| remove_by_id(&mut group.list, list_id))
    }

    pub fn board(&self, list_id: Id) -> Option<&Board> {
        self.boards.get(&list_id)
    }

    pub fn board_mut(&mut self, list_id: Id) -> &mut Board {
        self.boards.entry(list_id).or_default()
    }

    pub fn forget_board(&mut self, list_id: Id) {
        self.boards.remove(&list_id);
    }

    pub fn task_groups(&self, list_id: Id) -> &[TaskGroup] {
        self.board(list_id)
            .map(|board| board.task_groups.as_slice())
            .unwrap_or(&[])
    }

    pub fn task_groups_loaded(&self, list_id: Id) -> bool {
        self.board(list_id)
            .map(|board| board.task_groups_loaded)
            .unwrap_or(false)
    }

    pub fn task_groups_mut(&mut self, list_id: Id) -> &mut Vec<TaskGroup> {
        &mut self.board_mut(list_id).task_groups
    }

    pub fn find_task_group_mut(&mut self, task_group_id: Id) -> Option<&mut TaskGroup> {
        self.boards.values_mut().find_map(|board| {
            board
                .task_groups
                .iter_mut()
                .find(|group| group.id == task_group_id)
        })
    }

    pub fn list_of_task_group(&self, task_group_id: Id) -> Option<Id> {
        self.boards.iter().find_map(|(list_id, board)| {
            position_of(&board.task_groups, task_group_id).map(|_| *list_id)
        })
    }

    /// Drop a task group and every task scope under it.
    pub fn remove_task_group(&mut self, list_id: Id, task_group_id: Id) -> Option<TaskGroup> {
        let board = self.boards.get_mut(&list_id)?;
        board
            .tasks
            .retain(|(group_id, _), _| *group_id != task_group_id);
        remove_by_id(&mut board.task_groups, task_group_id)
    }

    pub fn tasks(&self, scope: TaskScope) -> &[Task] {
        self.board(scope.list_id)
            .and_then(|board| board.tasks.get(&(scope.task_group_id, scope.parent_id)))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn tasks_mut(&mut self, scope: TaskScope) -> &mut Vec<Task> {
        self.board_mut(scope.list_id)
            .tasks
            .entry((scope.task_group_id, scope.parent_id))
            .or_default()
    }

    pub fn is_scope_loaded(&self, scope: TaskScope) -> bool {
        self.board(scope.list_id)
            .map(|board| {
                board
                    .tasks
                    .contains_key(&(scope.task_group_id, scope.parent_id))
            })
            .unwrap_or(false)
    }

    /// Whether every sibling in `scope` is known locally: the scope was
    /// fetched, or it holds the children of a loaded task that has none.
    pub fn is_scope_complete(&self, scope: TaskScope) -> bool {
        if self.is_scope_loaded(scope) {
            return true;
        }
        scope.parent_id != ROOT_PARENT_ID
            && self
                .find_task(scope.parent_id)
                .map(|(_, parent)| !parent.has_children)
                .unwrap_or(false)
    }

    /// Every task scope of `list_id` that has been fetched at least once.
    pub fn loaded_task_scopes(&self, list_id: Id) -> Vec<TaskScope> {
        self.board(list_id)
            .map(|board| {
                board
                    .tasks
                    .keys()
                    .map(|(task_group_id, parent_id)| {
                        TaskScope::new(list_id, *task_group_id, *parent_id)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn find_task(&self, task_id: Id) -> Option<(TaskScope, &Task)> {
        self.boards.iter().find_map(|(list_id, board)| {
            board.tasks.iter().find_map(|((task_group_id, parent_id), tasks)| {
                tasks
                    .iter()
                    .find(|task| task.id == task_id)
                    .map(|task| (TaskScope::new(*list_id, *task_group_id, *parent_id), task))
            })
        })
    }

    pub fn find_task_mut(&mut self, task_id: Id) -> Option<&mut Task> {
        self.boards.values_mut().find_map(|board| {
            board
                .tasks
                .values_mut()
                .find_map(|tasks| tasks.iter_mut().find(|task| task.id == task_id))
        })
    }

    pub fn remove_task(&mut self, task_id: Id) -> Option<(TaskScope, Task)> {
        let (scope, _) = self.find_task(task_id)?;
        let task = remove_by_id(self.tasks_mut(scope), task_id)?;
        Some((scope, task))
    }

    /// Forget the loaded children of `parent_id`, recursively.
    pub fn forget_subtree(&mut self, list_id: Id, parent_id: Id) {
        let Some(board) = self.boards.get_mut(&list_id) else {
            return;
        };
        let mut pending = vec![parent_id];
        while let Some(parent) = pending.pop() {
            let keys: Vec<(Id, Id)> = board
                .tasks
                .keys()
                .filter(|(_, key_parent)| *key_parent == parent)
                .copied()
                .collect();
            for key in keys {
                if let Some(children) = board.tasks.remove(&key) {
                    pending.extend(children.iter().map(|child| child.id));
                }
            }
        }
    }
}
