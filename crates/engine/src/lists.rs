//! List groups and the lists inside them.

use ordo_core::dto::{
    CreateListDto, CreateListGroupDto, ReorderIntent, ReorderListGroupsDto, ReorderListsDto,
};
use ordo_core::error::{SyncError, SyncResult};
use ordo_core::model::{Id, ListGroup, ListItem};
use ordo_core::ordering::{creation_anchor, insert_by_neighbors, move_by_neighbors, Placement};
use ordo_core::scope::Scope;

use crate::engine::{neighbor_keys, Mutation, SyncEngine};

impl SyncEngine {
    /// Load list groups with their lists.
    ///
    /// A load already in flight makes this a no-op, as does an earlier
    /// successful load unless `force` is set.
    pub async fn fetch_list_groups(&self, force: bool) -> SyncResult<()> {
        let result = self.shared.load_list_groups(force).await.map(|_| ());
        self.surface(result)
    }

    pub async fn create_list_group(&self, name: &str, placement: Placement) -> SyncResult<ListGroup> {
        let prev_sort_order = self.read(|state| creation_anchor(state.groups(), placement));
        let dto = CreateListGroupDto {
            name: name.to_string(),
            prev_id: placement.prev_id,
            next_id: placement.next_id,
            prev_sort_order,
        };

        let result = self.shared.api.create_list_group(dto).await;
        if let Ok(group) = &result {
            let mut state = self.shared.state.lock();
            insert_by_neighbors(state.groups_mut(), group.clone(), placement);
            state.list_groups.loaded = true;
        }
        self.finish(Mutation::CreateGroup, result)
    }

    pub async fn rename_list_group(&self, group_id: Id, name: &str) -> SyncResult<()> {
        let result = self
            .shared
            .api
            .rename_list_group(group_id, name.to_string())
            .await;
        if let Ok(updated) = &result {
            if let Some(group) = self.shared.state.lock().group_mut(group_id) {
                group.name = updated.name.clone();
                group.sort_order = updated.sort_order;
            }
        }
        self.finish(Mutation::RenameGroup, result.map(|_| ()))
    }

    pub async fn delete_list_group(&self, group_id: Id) -> SyncResult<()> {
        let result = self.shared.api.delete_list_group(group_id).await;
        if result.is_ok() {
            let mut state = self.shared.state.lock();
            let lists: Vec<Id> = state.lists(group_id).iter().map(|item| item.id).collect();
            state.groups_mut().retain(|group| group.id != group_id);
            for list_id in lists {
                state.forget_board(list_id);
            }
        }
        self.finish(Mutation::DeleteGroup, result)
    }

    pub async fn create_list(
        &self,
        group_id: Id,
        name: &str,
        placement: Placement,
    ) -> SyncResult<ListItem> {
        let anchor = self.read(|state| {
            state
                .group(group_id)
                .map(|group| creation_anchor(&group.list, placement))
        });
        let Some(prev_sort_order) = anchor else {
            return self.finish(Mutation::CreateList, Err(SyncError::not_found("group", group_id)));
        };
        let dto = CreateListDto {
            group_id,
            name: name.to_string(),
            prev_id: placement.prev_id,
            next_id: placement.next_id,
            prev_sort_order,
        };

        let result = self.shared.api.create_list(dto).await;
        if let Ok(item) = &result {
            if let Some(group) = self.shared.state.lock().group_mut(group_id) {
                insert_by_neighbors(&mut group.list, item.clone(), placement);
            }
        }
        self.finish(Mutation::CreateList, result)
    }

    pub async fn rename_list(&self, list_id: Id, name: &str) -> SyncResult<()> {
        let result = self.shared.api.rename_list(list_id, name.to_string()).await;
        if let Ok(updated) = &result {
            if let Some(item) = self.shared.state.lock().find_list_mut(list_id) {
                item.name = updated.name.clone();
                item.sort_order = updated.sort_order;
            }
        }
        self.finish(Mutation::RenameList, result.map(|_| ()))
    }

    pub async fn delete_list(&self, list_id: Id) -> SyncResult<()> {
        let result = self.shared.api.delete_list(list_id).await;
        if result.is_ok() {
            let mut state = self.shared.state.lock();
            state.remove_list(list_id);
            state.forget_board(list_id);
        }
        self.finish(Mutation::DeleteList, result)
    }

    /// Move a group next to its new neighbors and schedule the reorder.
    pub fn reorder_group(&self, moved_id: Id, placement: Placement) -> SyncResult<()> {
        let scope = Scope::Groups;
        let dto = {
            let mut state = self.shared.state.lock();
            let groups = state.groups_mut();
            if !move_by_neighbors(groups, moved_id, placement) {
                return Err(SyncError::not_found("group", moved_id));
            }
            let (prev_sort_order, next_sort_order) =
                neighbor_keys(groups, scope, moved_id, placement);
            ReorderListGroupsDto {
                moved_id,
                prev_id: placement.prev_id,
                next_id: placement.next_id,
                prev_sort_order,
                next_sort_order,
            }
        };
        self.schedule_reorder(ReorderIntent::Groups(dto));
        Ok(())
    }

    /// Move a list into `group_id` (possibly from another group) next to its
    /// new neighbors and schedule the reorder.
    pub fn reorder_list(&self, group_id: Id, moved_id: Id, placement: Placement) -> SyncResult<()> {
        let scope = Scope::Lists { group_id };
        let dto = {
            let mut state = self.shared.state.lock();
            if state.group(group_id).is_none() {
                return Err(SyncError::not_found("group", group_id));
            }
            let Some(item) = state.remove_list(moved_id) else {
                return Err(SyncError::not_found("list", moved_id));
            };
            let group = state
                .group_mut(group_id)
                .ok_or_else(|| SyncError::not_found("group", group_id))?;
            insert_by_neighbors(&mut group.list, item, placement);

            let (prev_sort_order, next_sort_order) =
                neighbor_keys(&group.list, scope, moved_id, placement);
            ReorderListsDto {
                group_id,
                moved_id,
                prev_id: placement.prev_id,
                next_id: placement.next_id,
                prev_sort_order,
                next_sort_order,
            }
        };
        self.schedule_reorder(ReorderIntent::Lists(dto));
        Ok(())
    }
}
