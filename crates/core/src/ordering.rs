//! Neighbor-based placement and sort-key lookup for ordered sibling collections.
//!
//! Positions are always described relative to neighbors. Sort keys are read from
//! the current collection but never invented locally.

use crate::model::{Id, SortKey, Sortable};
use crate::scope::Scope;

/// Sort key used when a neighbor is absent or unknown.
pub const DEFAULT_SORT_KEY: SortKey = 0.0;

/// Where an item should land, expressed through its would-be neighbors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Placement {
    pub prev_id: Option<Id>,
    pub next_id: Option<Id>,
}

impl Placement {
    pub fn new(prev_id: Option<Id>, next_id: Option<Id>) -> Self {
        Self { prev_id, next_id }
    }

    pub fn after(prev_id: Id) -> Self {
        Self::new(Some(prev_id), None)
    }

    pub fn before(next_id: Id) -> Self {
        Self::new(None, Some(next_id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborRole {
    Prev,
    Next,
}

impl NeighborRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            NeighborRole::Prev => "prev",
            NeighborRole::Next => "next",
        }
    }
}

/// Identifies the move a lookup belongs to, for the stale-neighbor diagnostic.
#[derive(Debug, Clone, Copy)]
pub struct NeighborContext {
    pub scope: Scope,
    pub role: NeighborRole,
    pub moved_id: Id,
}

/// Resolve the sort key of `neighbor_id` within `items`.
///
/// Unknown neighbors fall back to [`DEFAULT_SORT_KEY`]. With both neighbors
/// stale the remote store receives two zero anchors and may under-order the
/// item; the reconciliation refetch is what corrects that.
pub fn resolve_sort_key<T: Sortable>(
    items: &[T],
    neighbor_id: Option<Id>,
    context: Option<NeighborContext>,
) -> SortKey {
    let Some(neighbor_id) = neighbor_id else {
        return DEFAULT_SORT_KEY;
    };
    if let Some(found) = items.iter().find(|item| item.id() == neighbor_id) {
        return found.sort_order();
    }

    if let Some(context) = context {
        if cfg!(debug_assertions) {
            tracing::warn!(
                scope = %context.scope,
                moved_id = context.moved_id,
                role = context.role.as_str(),
                neighbor_id,
                "reorder neighbor not found in local state, falling back to sort key 0"
            );
        }
    }
    DEFAULT_SORT_KEY
}

/// Largest sort key in the collection, never below [`DEFAULT_SORT_KEY`].
pub fn max_sort_order<T: Sortable>(items: &[T]) -> SortKey {
    items
        .iter()
        .map(Sortable::sort_order)
        .filter(|key| key.is_finite())
        .fold(DEFAULT_SORT_KEY, SortKey::max)
}

/// Anchor for a creation: the resolved previous neighbor when it is loaded,
/// otherwise the end of the collection.
pub fn creation_anchor<T: Sortable>(items: &[T], placement: Placement) -> SortKey {
    placement
        .prev_id
        .and_then(|prev_id| items.iter().find(|item| item.id() == prev_id))
        .map(Sortable::sort_order)
        .unwrap_or_else(|| max_sort_order(items))
}

pub fn position_of<T: Sortable>(items: &[T], id: Id) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

/// Insert after `prev_id`, else before `next_id`, else at the end.
pub fn insert_by_neighbors<T: Sortable>(items: &mut Vec<T>, item: T, placement: Placement) {
    if let Some(index) = placement.prev_id.and_then(|id| position_of(items, id)) {
        items.insert(index + 1, item);
        return;
    }
    if let Some(index) = placement.next_id.and_then(|id| position_of(items, id)) {
        items.insert(index, item);
        return;
    }
    items.push(item);
}

/// Remove the first item with `id`; absent ids are a no-op.
pub fn remove_by_id<T: Sortable>(items: &mut Vec<T>, id: Id) -> Option<T> {
    let index = position_of(items, id)?;
    Some(items.remove(index))
}

/// Optimistically move `moved_id` next to its new neighbors.
///
/// Returns `false` and leaves `items` untouched when the item is not loaded.
pub fn move_by_neighbors<T: Sortable>(items: &mut Vec<T>, moved_id: Id, placement: Placement) -> bool {
    let Some(item) = remove_by_id(items, moved_id) else {
        return false;
    };
    insert_by_neighbors(items, item, placement);
    true
}
