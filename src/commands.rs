use std::io::Write;

use anyhow::{Context, Result};

use crate::cli::{
    CliCommand, GroupCommand, ListCommand, MineArgs, ScopeArgs, TaskCommand, TaskGroupCommand,
};
use crate::core::dto::{PatchTaskDto, RootTasksQuery};
use crate::core::model::{ListGroup, Task, TaskGroup, ROOT_PARENT_ID};
use crate::core::ordering::Placement;
use crate::core::scope::TaskScope;
use crate::engine::SyncEngine;

/// Run one command against `engine` and print the resulting state.
///
/// Reorders wait for the engine to settle so what is printed is the remote
/// store's ordering, not the optimistic one. A rejected reorder is returned
/// as an error after the engine has restored the server's order.
pub async fn execute<W: Write>(engine: &SyncEngine, command: CliCommand, mut writer: W) -> Result<()> {
    match command {
        CliCommand::Groups => {
            engine.fetch_list_groups(true).await?;
            write_groups(&mut writer, &engine.list_groups())
        }
        CliCommand::Group(command) => handle_group(engine, command, &mut writer).await,
        CliCommand::List(command) => handle_list(engine, command, &mut writer).await,
        CliCommand::TaskGroups { list_id } => {
            let groups = engine.fetch_task_groups(list_id).await?;
            write_task_groups(&mut writer, &groups)
        }
        CliCommand::TaskGroup(command) => handle_task_group(engine, command, &mut writer).await,
        CliCommand::Tasks(args) => {
            let tasks = engine.fetch_tasks(scope_of(&args)).await?;
            write_tasks(&mut writer, &tasks)
        }
        CliCommand::Task(command) => handle_task(engine, command, &mut writer).await,
        CliCommand::Mine(args) => {
            let tasks = engine.my_root_tasks(root_query(&args)).await?;
            write_tasks(&mut writer, &tasks)
        }
    }
}

async fn handle_group<W: Write>(engine: &SyncEngine, command: GroupCommand, writer: &mut W) -> Result<()> {
    engine.fetch_list_groups(true).await?;
    match command {
        GroupCommand::Create { name, placement } => {
            let group = engine.create_list_group(&name, (&placement).into()).await?;
            writeln!(writer, "Created group {} ({})", group.name, group.id)?;
        }
        GroupCommand::Rename { id, name } => {
            engine.rename_list_group(id, &name).await?;
            writeln!(writer, "Renamed group {id}")?;
        }
        GroupCommand::Delete { id } => {
            engine.delete_list_group(id).await?;
            writeln!(writer, "Deleted group {id}")?;
        }
        GroupCommand::Move { id, placement } => {
            engine.reorder_group(id, (&placement).into())?;
            engine
                .settle()
                .await
                .with_context(|| format!("failed to move group {id}"))?;
        }
    }
    write_groups(writer, &engine.list_groups())
}

async fn handle_list<W: Write>(engine: &SyncEngine, command: ListCommand, writer: &mut W) -> Result<()> {
    engine.fetch_list_groups(true).await?;
    match command {
        ListCommand::Create {
            group_id,
            name,
            placement,
        } => {
            let item = engine.create_list(group_id, &name, (&placement).into()).await?;
            writeln!(writer, "Created list {} ({})", item.name, item.id)?;
        }
        ListCommand::Rename { id, name } => {
            engine.rename_list(id, &name).await?;
            writeln!(writer, "Renamed list {id}")?;
        }
        ListCommand::Delete { id } => {
            let name = engine
                .find_list_name_by_id(id)
                .unwrap_or_else(|| id.to_string());
            engine.delete_list(id).await?;
            writeln!(writer, "Deleted list {name}")?;
        }
        ListCommand::Move {
            id,
            group_id,
            placement,
        } => {
            engine.reorder_list(group_id, id, (&placement).into())?;
            engine
                .settle()
                .await
                .with_context(|| format!("failed to move list {id}"))?;
        }
    }
    write_groups(writer, &engine.list_groups())
}

async fn handle_task_group<W: Write>(
    engine: &SyncEngine,
    command: TaskGroupCommand,
    writer: &mut W,
) -> Result<()> {
    match command {
        TaskGroupCommand::Create {
            list_id,
            name,
            placement,
        } => {
            engine.fetch_task_groups(list_id).await?;
            let group = engine
                .create_task_group(list_id, &name, (&placement).into())
                .await?;
            writeln!(writer, "Created task group {} ({})", group.name, group.id)?;
            write_task_groups(writer, &engine.task_groups(list_id))
        }
        TaskGroupCommand::Rename { id, name } => {
            engine.rename_task_group(id, &name).await?;
            writeln!(writer, "Renamed task group {id}")?;
            Ok(())
        }
        TaskGroupCommand::Delete { id } => {
            engine.delete_task_group(id).await?;
            writeln!(writer, "Deleted task group {id}")?;
            Ok(())
        }
        TaskGroupCommand::Move {
            list_id,
            id,
            placement,
        } => {
            engine.fetch_task_groups(list_id).await?;
            engine.reorder_task_group(list_id, id, (&placement).into())?;
            engine
                .settle()
                .await
                .with_context(|| format!("failed to move task group {id}"))?;
            write_task_groups(writer, &engine.task_groups(list_id))
        }
    }
}

async fn handle_task<W: Write>(engine: &SyncEngine, command: TaskCommand, writer: &mut W) -> Result<()> {
    match command {
        TaskCommand::Create {
            scope,
            name,
            placement,
        } => {
            let scope = scope_of(&scope);
            engine.fetch_tasks(scope).await?;
            let task = engine.create_task(scope, &name, (&placement).into()).await?;
            writeln!(writer, "Created task {} ({})", task.name, task.id)?;
            write_tasks(writer, &engine.tasks(scope))
        }
        TaskCommand::Rename { id, name } => {
            let patch = PatchTaskDto {
                name: Some(name),
                ..PatchTaskDto::default()
            };
            let task = engine.update_task(id, patch).await?;
            write_tasks(writer, &[task])
        }
        TaskCommand::Status { id, status } => {
            let patch = PatchTaskDto {
                status: Some(status),
                ..PatchTaskDto::default()
            };
            let task = engine.update_task(id, patch).await?;
            write_tasks(writer, &[task])
        }
        TaskCommand::Delete { id, cascade } => {
            engine.delete_task(id, cascade).await?;
            writeln!(writer, "Deleted task {id}")?;
            Ok(())
        }
        TaskCommand::Move {
            from,
            id,
            to_group,
            to_parent,
            placement,
        } => {
            let source = scope_of(&from);
            let target = TaskScope::new(
                source.list_id,
                to_group.unwrap_or(source.task_group_id),
                to_parent.unwrap_or(ROOT_PARENT_ID),
            );
            engine.fetch_tasks(source).await?;
            if target != source {
                engine.fetch_tasks(target).await?;
            }
            let placement: Placement = (&placement).into();
            engine
                .move_task(id, target, placement)
                .await
                .with_context(|| format!("failed to move task {id}"))?;
            write_tasks(writer, &engine.tasks(target))
        }
        TaskCommand::Reorder {
            scope,
            id,
            placement,
        } => {
            let scope = scope_of(&scope);
            engine.fetch_tasks(scope).await?;
            engine.reorder_task(scope, id, (&placement).into())?;
            engine
                .settle()
                .await
                .with_context(|| format!("failed to reorder task {id}"))?;
            write_tasks(writer, &engine.tasks(scope))
        }
        TaskCommand::Children { id } => {
            let children = engine.fetch_children(id).await?;
            write_tasks(writer, &children)
        }
    }
}

fn scope_of(args: &ScopeArgs) -> TaskScope {
    TaskScope::new(
        args.list_id,
        args.task_group_id,
        args.parent_id.unwrap_or(ROOT_PARENT_ID),
    )
}

fn root_query(args: &MineArgs) -> RootTasksQuery {
    RootTasksQuery {
        parent_id: args.parent_id,
        filter: args.filter,
        sort_key: args.sort_key,
        sort_dir: args.sort_dir,
    }
}

fn write_groups<W: Write>(writer: &mut W, groups: &[ListGroup]) -> Result<()> {
    if groups.is_empty() {
        writeln!(writer, "No list groups")?;
        return Ok(());
    }
    for group in groups {
        writeln!(writer, "{:>6}  {}  [{}]", group.id, group.name, group.sort_order)?;
        for item in &group.list {
            writeln!(writer, "{:>10}  {}  [{}]", item.id, item.name, item.sort_order)?;
        }
    }
    Ok(())
}

fn write_task_groups<W: Write>(writer: &mut W, groups: &[TaskGroup]) -> Result<()> {
    if groups.is_empty() {
        writeln!(writer, "No task groups")?;
        return Ok(());
    }
    for group in groups {
        let marker = if group.is_default { " (default)" } else { "" };
        writeln!(
            writer,
            "{:>6}  {}{}  [{}]",
            group.id, group.name, marker, group.sort_order
        )?;
    }
    Ok(())
}

fn write_tasks<W: Write>(writer: &mut W, tasks: &[Task]) -> Result<()> {
    if tasks.is_empty() {
        writeln!(writer, "No tasks")?;
        return Ok(());
    }
    for task in tasks {
        let children = if task.has_children { " +" } else { "" };
        let due = task
            .due_at
            .map(|date| format!(" due {date}"))
            .unwrap_or_default();
        writeln!(
            writer,
            "{:>6}  [{:<11}] {}{}{}  [{}]",
            task.id,
            task.status.as_str(),
            task.name,
            children,
            due,
            task.sort_order
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{ListItem, TaskPriority, TaskStatus};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn groups_render_nested_lists() {
        let groups = vec![ListGroup {
            id: 1,
            name: "Work".into(),
            sort_order: 1.0,
            list: vec![ListItem {
                id: 10,
                name: "Inbox".into(),
                sort_order: 2.5,
            }],
        }];

        assert_eq!(
            render(|out| write_groups(out, &groups)),
            "     1  Work  [1]\n        10  Inbox  [2.5]\n"
        );
        assert_eq!(render(|out| write_groups(out, &[])), "No list groups\n");
    }

    #[test]
    fn tasks_show_status_children_and_due_date() {
        let task = Task {
            id: 7,
            user_id: 1,
            list_id: 10,
            task_group_id: 100,
            parent_id: 0,
            name: "Ship it".into(),
            content: None,
            sort_order: 3.0,
            status: TaskStatus::InProgress,
            priority: TaskPriority::High,
            started_at: None,
            due_at: NaiveDate::from_ymd_opt(2026, 1, 31),
            completed_at: None,
            created_at: None,
            updated_at: None,
            has_children: true,
        };

        assert_eq!(
            render(|out| write_tasks(out, &[task])),
            "     7  [in-progress] Ship it + due 2026-01-31  [3]\n"
        );
    }

    #[test]
    fn default_task_group_is_marked() {
        let groups = vec![TaskGroup {
            id: 100,
            list_id: 10,
            name: "Default".into(),
            sort_order: 1.0,
            is_default: true,
        }];
        assert_eq!(
            render(|out| write_task_groups(out, &groups)),
            "   100  Default (default)  [1]\n"
        );
    }

    #[test]
    fn missing_parent_means_root_scope() {
        let args = ScopeArgs {
            list_id: 10,
            task_group_id: 100,
            parent_id: None,
        };
        assert_eq!(scope_of(&args), TaskScope::root(10, 100));
    }
}
