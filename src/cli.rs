use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::core::model::{Id, SortDir, TaskFilter, TaskSortKey, TaskStatus};
use crate::core::ordering::Placement;
use crate::core::ConfigOverrides;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "ordo",
    version,
    about = "Drag-and-drop ordering for list groups, lists, task groups and tasks, kept in sync with a remote store.",
    after_help = "Examples:\n  ordo groups\n  ordo group move 3 --after 1\n  ordo tasks 10 100 --parent 1000\n  ordo task reorder 10 100 1002 --before 1000\n  ordo mine --filter todo --sort dueAt"
)]
pub struct Cli {
    /// Override the data directory (defaults to platform-specific app dir)
    #[arg(long, value_name = "PATH", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Override the remote store base URL
    #[arg(long, value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Bearer token for the remote store
    #[arg(long, value_name = "TOKEN", global = true)]
    pub token: Option<String>,

    /// Tracing filter (e.g. "info", "debug", or full directives)
    #[arg(long = "log", value_name = "DIRECTIVE", global = true)]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: CliCommand,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            data_dir: self.data_dir.clone(),
            base_url: self.base_url.clone(),
            token: self.token.clone(),
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Show list groups with their lists
    Groups,
    /// Create, rename, delete or move a list group
    #[command(subcommand)]
    Group(GroupCommand),
    /// Create, rename, delete or move a list
    #[command(subcommand)]
    List(ListCommand),
    /// Show the task groups of a list
    TaskGroups {
        #[arg(value_name = "LIST")]
        list_id: Id,
    },
    /// Create, rename, delete or move a task group
    #[command(subcommand)]
    TaskGroup(TaskGroupCommand),
    /// Show the tasks of one task group, optionally under a parent task
    Tasks(ScopeArgs),
    /// Create, edit, delete, move or reorder a task
    #[command(subcommand)]
    Task(TaskCommand),
    /// Root tasks across all lists
    Mine(MineArgs),
}

/// Neighbors an item should land between.
#[derive(Args, Debug, Clone, Default)]
pub struct PlacementArgs {
    /// Place right after this sibling
    #[arg(long, value_name = "ID")]
    pub after: Option<Id>,

    /// Place right before this sibling
    #[arg(long, value_name = "ID")]
    pub before: Option<Id>,
}

impl From<&PlacementArgs> for Placement {
    fn from(args: &PlacementArgs) -> Self {
        Placement::new(args.after, args.before)
    }
}

#[derive(Args, Debug, Clone)]
pub struct ScopeArgs {
    #[arg(value_name = "LIST")]
    pub list_id: Id,

    #[arg(value_name = "TASK_GROUP")]
    pub task_group_id: Id,

    /// Parent task; root tasks when omitted
    #[arg(long = "parent", value_name = "ID")]
    pub parent_id: Option<Id>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum GroupCommand {
    Create {
        name: String,
        #[command(flatten)]
        placement: PlacementArgs,
    },
    Rename {
        id: Id,
        name: String,
    },
    Delete {
        id: Id,
    },
    Move {
        id: Id,
        #[command(flatten)]
        placement: PlacementArgs,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ListCommand {
    Create {
        #[arg(value_name = "GROUP")]
        group_id: Id,
        name: String,
        #[command(flatten)]
        placement: PlacementArgs,
    },
    Rename {
        id: Id,
        name: String,
    },
    Delete {
        id: Id,
    },
    /// Move a list, possibly into another group
    Move {
        id: Id,
        /// Destination group
        #[arg(long = "group", value_name = "GROUP")]
        group_id: Id,
        #[command(flatten)]
        placement: PlacementArgs,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum TaskGroupCommand {
    Create {
        #[arg(value_name = "LIST")]
        list_id: Id,
        name: String,
        #[command(flatten)]
        placement: PlacementArgs,
    },
    Rename {
        id: Id,
        name: String,
    },
    Delete {
        id: Id,
    },
    Move {
        #[arg(value_name = "LIST")]
        list_id: Id,
        id: Id,
        #[command(flatten)]
        placement: PlacementArgs,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum TaskCommand {
    Create {
        #[command(flatten)]
        scope: ScopeArgs,
        name: String,
        #[command(flatten)]
        placement: PlacementArgs,
    },
    Rename {
        id: Id,
        name: String,
    },
    /// Set the status of a task
    Status {
        id: Id,
        #[arg(value_enum)]
        status: TaskStatus,
    },
    Delete {
        id: Id,
        /// Also delete every subtask
        #[arg(long)]
        cascade: bool,
    },
    /// Move a task into another task group or under another parent
    Move {
        #[command(flatten)]
        from: ScopeArgs,
        id: Id,
        /// Destination task group (defaults to the current one)
        #[arg(long = "to-group", value_name = "TASK_GROUP")]
        to_group: Option<Id>,
        /// Destination parent task (0 for root)
        #[arg(long = "to-parent", value_name = "ID")]
        to_parent: Option<Id>,
        #[command(flatten)]
        placement: PlacementArgs,
    },
    /// Reorder a task among its siblings
    Reorder {
        #[command(flatten)]
        scope: ScopeArgs,
        id: Id,
        #[command(flatten)]
        placement: PlacementArgs,
    },
    /// Show the subtasks of a task
    Children {
        id: Id,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct MineArgs {
    #[arg(long, value_enum)]
    pub filter: Option<TaskFilter>,

    #[arg(long = "sort", value_enum)]
    pub sort_key: Option<TaskSortKey>,

    #[arg(long = "dir", value_enum)]
    pub sort_dir: Option<SortDir>,

    /// Only tasks under this parent
    #[arg(long = "parent", value_name = "ID")]
    pub parent_id: Option<Id>,
}
