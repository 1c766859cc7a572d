use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Server-assigned identifier.
pub type Id = i64;

/// Opaque ordering value; only comparable within one scope.
pub type SortKey = f64;

/// Parent id used by the backend for root tasks.
pub const ROOT_PARENT_ID: Id = 0;

/// Anything that lives in an ordered sibling collection.
pub trait Sortable {
    fn id(&self) -> Id;
    fn sort_order(&self) -> SortKey;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub id: Id,
    pub name: String,
    pub sort_order: SortKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGroup {
    pub id: Id,
    pub name: String,
    pub sort_order: SortKey,
    pub list: Vec<ListItem>,
}

/// Wire shape of a group; older endpoints omit `list` or send `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGroupDto {
    pub id: Id,
    pub name: String,
    pub sort_order: SortKey,
    #[serde(default)]
    pub list: Option<Vec<ListItem>>,
}

impl From<ListGroupDto> for ListGroup {
    fn from(dto: ListGroupDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            sort_order: dto.sort_order,
            list: dto.list.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDto {
    pub id: Id,
    pub group_id: Id,
    pub name: String,
    pub sort_order: SortKey,
}

impl From<ListDto> for ListItem {
    fn from(dto: ListDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            sort_order: dto.sort_order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskGroup {
    pub id: Id,
    pub list_id: Id,
    pub name: String,
    pub sort_order: SortKey,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
        }
    }
}

impl TryFrom<u8> for TaskStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TaskStatus::Todo),
            1 => Ok(TaskStatus::InProgress),
            2 => Ok(TaskStatus::Done),
            other => Err(format!("unknown task status {other}")),
        }
    }
}

impl From<TaskStatus> for u8 {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Todo => 0,
            TaskStatus::InProgress => 1,
            TaskStatus::Done => 2,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "todo" | "0" => Ok(TaskStatus::Todo),
            "in-progress" | "doing" | "1" => Ok(TaskStatus::InProgress),
            "done" | "2" => Ok(TaskStatus::Done),
            other => Err(anyhow!(
                "Unknown status '{}': expected todo|in-progress|done",
                other
            )),
        }
    }
}

impl ValueEnum for TaskStatus {
    fn value_variants<'a>() -> &'a [Self] {
        const VARIANTS: [TaskStatus; 3] =
            [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];
        &VARIANTS
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TaskPriority {
    None,
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::None => "none",
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

impl TryFrom<u8> for TaskPriority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TaskPriority::None),
            1 => Ok(TaskPriority::Low),
            2 => Ok(TaskPriority::Medium),
            3 => Ok(TaskPriority::High),
            other => Err(format!("unknown task priority {other}")),
        }
    }
}

impl From<TaskPriority> for u8 {
    fn from(priority: TaskPriority) -> Self {
        match priority {
            TaskPriority::None => 0,
            TaskPriority::Low => 1,
            TaskPriority::Medium => 2,
            TaskPriority::High => 3,
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ValueEnum for TaskPriority {
    fn value_variants<'a>() -> &'a [Self] {
        const VARIANTS: [TaskPriority; 4] = [
            TaskPriority::None,
            TaskPriority::Low,
            TaskPriority::Medium,
            TaskPriority::High,
        ];
        &VARIANTS
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Id,
    #[serde(default)]
    pub user_id: Id,
    pub list_id: Id,
    pub task_group_id: Id,
    pub parent_id: Id,
    pub name: String,
    #[serde(default)]
    pub content: Option<String>,
    pub sort_order: SortKey,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(default)]
    pub started_at: Option<NaiveDate>,
    #[serde(default)]
    pub due_at: Option<NaiveDate>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub has_children: bool,
}

impl Task {
    pub fn is_root(&self) -> bool {
        self.parent_id == ROOT_PARENT_ID
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }
}

impl Sortable for ListGroup {
    fn id(&self) -> Id {
        self.id
    }

    fn sort_order(&self) -> SortKey {
        self.sort_order
    }
}

impl Sortable for ListItem {
    fn id(&self) -> Id {
        self.id
    }

    fn sort_order(&self) -> SortKey {
        self.sort_order
    }
}

impl Sortable for TaskGroup {
    fn id(&self) -> Id {
        self.id
    }

    fn sort_order(&self) -> SortKey {
        self.sort_order
    }
}

impl Sortable for Task {
    fn id(&self) -> Id {
        self.id
    }

    fn sort_order(&self) -> SortKey {
        self.sort_order
    }
}

/// Filter for the cross-list "my tasks" view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[clap(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    All,
    Todo,
    Done,
}

impl TaskFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            TaskFilter::Todo => "todo",
            TaskFilter::Done => "done",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[clap(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum TaskSortKey {
    Custom,
    StartedAt,
    DueAt,
    CreatedAt,
    UpdatedAt,
    CompletedAt,
    Priority,
}

impl TaskSortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskSortKey::Custom => "custom",
            TaskSortKey::StartedAt => "startedAt",
            TaskSortKey::DueAt => "dueAt",
            TaskSortKey::CreatedAt => "createdAt",
            TaskSortKey::UpdatedAt => "updatedAt",
            TaskSortKey::CompletedAt => "completedAt",
            TaskSortKey::Priority => "priority",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[clap(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }
}
