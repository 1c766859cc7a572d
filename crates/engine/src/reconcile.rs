//! Recovery after a failed reorder: tell the user, then replace the
//! speculative local ordering with a fresh authoritative snapshot.

use std::sync::Arc;

use ordo_core::dto::ReorderIntent;
use ordo_core::error::SyncError;
use ordo_core::model::Id;
use ordo_core::scope::Scope;

use crate::engine::Shared;
use crate::telemetry::Event;

pub(crate) async fn recover(shared: &Arc<Shared>, intent: &ReorderIntent, err: SyncError) {
    let scope = intent.scope();
    let kind = err.kind();
    let err = if err.to_string().trim().is_empty() {
        SyncError::Rejected(intent.failure_message().to_string())
    } else {
        err
    };
    let message = err.to_string();
    tracing::warn!(
        %scope,
        moved_id = intent.moved_id(),
        kind,
        error = %message,
        "reorder failed, refetching"
    );
    shared.failed_reorders.lock().push(err);
    shared.telemetry.record(Event::ReorderFailed {
        scope: scope.to_string(),
        error: message.clone(),
    });
    shared.notifier.error(&message);

    match scope {
        Scope::Groups | Scope::Lists { .. } => {
            if let Err(err) = shared.load_list_groups(true).await {
                tracing::warn!(%scope, error = %err, "refetch after failed reorder also failed");
                return;
            }
        }
        Scope::TaskGroups { list_id } => refetch_board(shared, list_id).await,
        Scope::Tasks(task_scope) => refetch_board(shared, task_scope.list_id).await,
    }
    shared.telemetry.record(Event::Reconciled(scope.to_string()));
}

/// Refetch a list's task groups and every task scope of it that is loaded.
async fn refetch_board(shared: &Arc<Shared>, list_id: Id) {
    if let Err(err) = shared.load_task_groups(list_id).await {
        tracing::warn!(list_id, error = %err, "task group refetch failed");
    }

    let scopes = shared.state.lock().loaded_task_scopes(list_id);
    for task_scope in scopes {
        if let Err(err) = shared.load_tasks(task_scope).await {
            tracing::warn!(scope = %Scope::Tasks(task_scope), error = %err, "task refetch failed");
        }
    }
}
