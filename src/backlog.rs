//! Backlog service: reads through a [`QueryCache`], orders stories for
//! display and persists manual reorders through the repositories.

use crate::{
    domain::{
        order_stories, plan_group_move, sort_groups, Board, BoardConfig, BoardId, ChecklistKind,
        DragGesture, DropPlan, Group, GroupId, GroupSwap, GroupUpdate, MoveDirection, OrderBy,
        Prioritization, PrioritizationPatch, Story, StoryId, StoryUpdate,
    },
    error::{BacklogError, Result},
    storage::{QueryCache, Storage},
};
use tracing::{debug, info, warn};

/// A group as rendered: the group (None for the ungrouped bucket) with its
/// stories in display order
#[derive(Debug, Clone)]
pub struct GroupView {
    pub group: Option<Group>,
    pub stories: Vec<Story>,
}

/// Operations on one board
pub struct Backlog<S> {
    storage: S,
    cache: QueryCache,
    board: Board,
}

impl<S: Storage> Backlog<S> {
    /// Opens an existing board
    pub async fn open(storage: S, board_id: &BoardId) -> Result<Self> {
        let board = storage.load_board(board_id).await?;
        Ok(Self::with_board(storage, board))
    }

    /// Creates and persists a new board
    pub async fn create(storage: S, config: BoardConfig) -> Result<Self> {
        config.validate()?;
        storage.initialize().await?;

        let board = Board::new(config);
        storage.save_board(&board).await?;
        info!("Created board {} ({})", board.config.name, board.id);

        Ok(Self::with_board(storage, board))
    }

    fn with_board(storage: S, board: Board) -> Self {
        Self {
            storage,
            cache: QueryCache::new(),
            board,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Non-archived stories by ascending `sort_order`, cached
    pub async fn stories(&self) -> Result<Vec<Story>> {
        if let Some(cached) = self.cache.stories(&self.board.id).await {
            return Ok(cached);
        }

        let stories = self.storage.list_stories(&self.board.id).await?;
        self.cache.set_stories(&self.board.id, stories.clone()).await;
        Ok(stories)
    }

    pub async fn archived_stories(&self) -> Result<Vec<Story>> {
        self.storage.list_archived_stories(&self.board.id).await
    }

    /// All groups in manual order, archived included, cached
    pub async fn groups(&self) -> Result<Vec<Group>> {
        if let Some(cached) = self.cache.groups(&self.board.id).await {
            return Ok(cached);
        }

        let mut groups = self.storage.list_groups(&self.board.id).await?;
        sort_groups(&mut groups);
        self.cache.set_groups(&self.board.id, groups.clone()).await;
        Ok(groups)
    }

    pub async fn active_groups(&self) -> Result<Vec<Group>> {
        Ok(self
            .groups()
            .await?
            .into_iter()
            .filter(|g| !g.archived)
            .collect())
    }

    pub async fn archived_groups(&self) -> Result<Vec<Group>> {
        Ok(self
            .groups()
            .await?
            .into_iter()
            .filter(|g| g.archived)
            .collect())
    }

    /// Active groups with their ordered stories, then the ungrouped bucket
    pub async fn board_view(&self) -> Result<Vec<GroupView>> {
        let groups = self.active_groups().await?;
        let stories = self.stories().await?;

        let mut views: Vec<GroupView> = groups
            .into_iter()
            .map(|group| {
                let members: Vec<Story> = stories
                    .iter()
                    .filter(|s| s.group_id.as_ref() == Some(&group.id))
                    .cloned()
                    .collect();
                GroupView {
                    stories: order_stories(&members, Some(&group)),
                    group: Some(group),
                }
            })
            .collect();

        let ungrouped: Vec<Story> = stories
            .iter()
            .filter(|s| s.group_id.is_none())
            .cloned()
            .collect();
        views.push(GroupView {
            group: None,
            stories: order_stories(&ungrouped, None),
        });

        Ok(views)
    }

    /// Creates a story after all existing ones, in an active group or
    /// ungrouped
    pub async fn create_story(
        &self,
        title: String,
        description: Option<String>,
        group_id: Option<GroupId>,
    ) -> Result<Story> {
        if let Some(group_id) = &group_id {
            if self.storage.load_group(group_id).await?.archived {
                return Err(BacklogError::GroupNotFound(group_id.to_string()));
            }
        }

        let stories = self.storage.list_stories(&self.board.id).await?;
        let sort_order = next_sort_order(stories.iter().map(|s| s.sort_order));
        let mut story = self.board.new_story(title, sort_order);
        story.description = description;
        story.group_id = group_id;

        self.storage.save_story(&story).await?;
        self.cache.invalidate_stories(&self.board.id).await;
        info!("Created story {} at position {}", story.id, story.sort_order);
        Ok(story)
    }

    /// Creates a group after all existing ones, ordered per board config
    pub async fn create_group(&self, title: String) -> Result<Group> {
        let groups = self.storage.list_groups(&self.board.id).await?;
        let group = self
            .board
            .new_group(title, next_sort_order(groups.iter().map(|g| g.sort_order)));

        self.storage.save_group(&group).await?;
        self.cache.invalidate_groups(&self.board.id).await;
        info!("Created group {} at position {}", group.id, group.sort_order);
        Ok(group)
    }

    pub async fn archive_story(&self, id: &StoryId) -> Result<Story> {
        self.set_story_archived(id, true).await
    }

    /// Brings an archived story back; it keeps its group and position
    pub async fn unarchive_story(&self, id: &StoryId) -> Result<Story> {
        self.set_story_archived(id, false).await
    }

    async fn set_story_archived(&self, id: &StoryId, archived: bool) -> Result<Story> {
        let story = self
            .storage
            .update_story(id, &StoryUpdate::archived(archived))
            .await?;
        self.cache.invalidate_stories(&self.board.id).await;
        debug!("Story {} archived = {}", id, archived);
        Ok(story)
    }

    pub async fn delete_story(&self, id: &StoryId) -> Result<()> {
        let result = self.storage.delete_story(id).await;
        self.cache.invalidate_stories(&self.board.id).await;
        result?;
        info!("Deleted story {}", id);
        Ok(())
    }

    pub async fn archive_group(&self, id: &GroupId) -> Result<Group> {
        self.set_group_archived(id, true).await
    }

    pub async fn unarchive_group(&self, id: &GroupId) -> Result<Group> {
        self.set_group_archived(id, false).await
    }

    async fn set_group_archived(&self, id: &GroupId, archived: bool) -> Result<Group> {
        let group = self
            .storage
            .update_group(id, &GroupUpdate::archived(archived))
            .await?;
        self.cache.invalidate_groups(&self.board.id).await;
        debug!("Group {} archived = {}", id, archived);
        Ok(group)
    }

    /// Deletes a group; its stories, archived ones included, become ungrouped
    pub async fn delete_group(&self, id: &GroupId) -> Result<()> {
        self.storage.load_group(id).await?;

        let mut stories = self.storage.list_stories(&self.board.id).await?;
        stories.extend(self.storage.list_archived_stories(&self.board.id).await?);

        let result = async {
            for story in stories.iter().filter(|s| s.group_id.as_ref() == Some(id)) {
                self.storage
                    .update_story(&story.id, &StoryUpdate::group(None))
                    .await?;
            }
            self.storage.delete_group(id).await
        }
        .await;

        self.cache.invalidate_board(&self.board.id).await;
        result?;
        info!("Deleted group {}", id);
        Ok(())
    }

    pub async fn set_order_by(&self, group_id: &GroupId, order_by: OrderBy) -> Result<Group> {
        let group = self
            .storage
            .update_group(group_id, &GroupUpdate::order_by(order_by))
            .await?;
        self.cache.invalidate_groups(&self.board.id).await;
        Ok(group)
    }

    /// Flips the group's direction between ascending and descending
    pub async fn toggle_order_direction(&self, group_id: &GroupId) -> Result<Group> {
        let current = self.storage.load_group(group_id).await?;
        let group = self
            .storage
            .update_group(
                group_id,
                &GroupUpdate::order_direction(current.order_direction.toggled()),
            )
            .await?;
        self.cache.invalidate_groups(&self.board.id).await;
        Ok(group)
    }

    /// Flips one item of the story's checklist of the given kind
    pub async fn toggle_checklist_item(
        &self,
        story_id: &StoryId,
        kind: ChecklistKind,
        item: usize,
    ) -> Result<Story> {
        let story = self.storage.load_story(story_id).await?;
        let mut checklists = story.checklists.clone();
        checklists
            .iter_mut()
            .find(|c| c.kind == kind)
            .ok_or_else(|| BacklogError::ChecklistNotFound(kind.to_string()))?
            .toggle_item(item)?;

        let update = StoryUpdate {
            checklists: Some(checklists),
            ..StoryUpdate::default()
        };
        let story = self.storage.update_story(story_id, &update).await?;
        self.cache.replace_story(&story).await;
        Ok(story)
    }

    /// Upserts a story's prioritization optimistically
    ///
    /// The cached stories show the new values right away; if the write
    /// fails the previous snapshot is put back.
    pub async fn update_prioritization(
        &self,
        story_id: &StoryId,
        patch: PrioritizationPatch,
    ) -> Result<Story> {
        let snapshot = self.stories().await?;
        let current = match snapshot.iter().find(|s| &s.id == story_id) {
            Some(story) => story.clone(),
            None => self.storage.load_story(story_id).await?,
        };

        let merged = Prioritization::merged(current.prioritization.as_ref(), &patch);
        let mut optimistic = current;
        optimistic.prioritization = Some(merged.clone());
        self.cache.replace_story(&optimistic).await;

        match self
            .storage
            .update_story(story_id, &StoryUpdate::prioritization(merged))
            .await
        {
            Ok(saved) => {
                self.cache.replace_story(&saved).await;
                Ok(saved)
            }
            Err(err) => {
                warn!("Prioritization of story {} failed, rolling back: {}", story_id, err);
                self.cache.set_stories(&self.board.id, snapshot).await;
                Err(err)
            }
        }
    }

    /// Drops the dragged story onto another story
    pub async fn drop_on_story(&self, gesture: DragGesture, target: &StoryId) -> Result<DropPlan> {
        let dragged = gesture.dragged().clone();
        let stories = self.storage.list_stories(&self.board.id).await?;

        let plan = gesture.drop_on_story(&stories, target).map_err(|err| {
            warn!("Abandoned drop of story {} onto {}: {}", dragged, target, err);
            err
        })?;

        self.execute(&plan).await?;
        Ok(plan)
    }

    /// Drops the dragged story onto a group, or the ungrouped area for `None`
    pub async fn drop_on_group(
        &self,
        gesture: DragGesture,
        target: Option<&GroupId>,
    ) -> Result<DropPlan> {
        let dragged = gesture.dragged().clone();
        let stories = self.storage.list_stories(&self.board.id).await?;
        let groups = self.storage.list_groups(&self.board.id).await?;

        let plan = gesture
            .drop_on_group(&stories, &groups, target)
            .map_err(|err| {
                warn!("Abandoned drop of story {} onto group: {}", dragged, err);
                err
            })?;

        self.execute(&plan).await?;
        Ok(plan)
    }

    pub async fn move_group_up(&self, group_id: &GroupId) -> Result<Option<GroupSwap>> {
        self.move_group(group_id, MoveDirection::Up).await
    }

    pub async fn move_group_down(&self, group_id: &GroupId) -> Result<Option<GroupSwap>> {
        self.move_group(group_id, MoveDirection::Down).await
    }

    async fn move_group(
        &self,
        group_id: &GroupId,
        direction: MoveDirection,
    ) -> Result<Option<GroupSwap>> {
        let mut groups: Vec<Group> = self
            .storage
            .list_groups(&self.board.id)
            .await?
            .into_iter()
            .filter(|g| !g.archived)
            .collect();
        sort_groups(&mut groups);

        let Some(swap) = plan_group_move(&groups, group_id, direction)? else {
            debug!("Group {} already at the {:?} boundary", group_id, direction);
            return Ok(None);
        };

        let [(first, first_update), (second, second_update)] = swap.updates();
        let (first_result, second_result) = tokio::join!(
            self.storage.update_group(&first, &first_update),
            self.storage.update_group(&second, &second_update),
        );

        self.cache.invalidate_groups(&self.board.id).await;
        settle_pair(first_result, second_result)?;
        info!("Moved group {} {:?}", group_id, direction);
        Ok(Some(swap))
    }

    /// Persists a drop plan, then invalidates the board's cached reads
    async fn execute(&self, plan: &DropPlan) -> Result<()> {
        if plan.is_ignored() {
            debug!("Story dropped onto itself, nothing to do");
            return Ok(());
        }
        debug!("Applying drop plan {:?}", plan);

        let result = async {
            let story_updates = plan.story_updates();
            let applied = story_updates.len();
            self.apply_story_updates(story_updates).await?;

            if let Some((group_id, update)) = plan.group_update() {
                self.storage
                    .update_group(&group_id, &update)
                    .await
                    .map_err(|err| BacklogError::PartialUpdate {
                        applied,
                        total: applied + 1,
                        failed: err.to_string(),
                    })?;
            }
            Ok::<(), BacklogError>(())
        }
        .await;

        self.cache.invalidate_board(&self.board.id).await;
        match &result {
            Ok(()) => info!("Applied drop plan {:?}", plan),
            Err(err) => warn!("Drop plan failed, state needs a refetch: {}", err),
        }
        result
    }

    /// Issues the updates of one logical operation concurrently
    async fn apply_story_updates(&self, updates: Vec<(StoryId, StoryUpdate)>) -> Result<()> {
        match updates.as_slice() {
            [] => Ok(()),
            [(id, update)] => self.storage.update_story(id, update).await.map(|_| ()),
            [(first, first_update), (second, second_update)] => {
                let (first_result, second_result) = tokio::join!(
                    self.storage.update_story(first, first_update),
                    self.storage.update_story(second, second_update),
                );
                settle_pair(first_result, second_result)
            }
            _ => Err(BacklogError::Other(format!(
                "unexpected number of story updates: {}",
                updates.len()
            ))),
        }
    }
}

/// Position after the current maximum, 0 when there is none
fn next_sort_order(sort_orders: impl Iterator<Item = i64>) -> i64 {
    sort_orders.max().map_or(0, |max| max + 1)
}

/// Combines the results of two concurrent writes
///
/// A single failure leaves the pair inconsistent and is reported as
/// `PartialUpdate`; no rollback is attempted.
fn settle_pair<A, B>(first: Result<A>, second: Result<B>) -> Result<()> {
    match (first, second) {
        (Ok(_), Ok(_)) => Ok(()),
        (Err(err), Ok(_)) | (Ok(_), Err(err)) => {
            warn!("Only one of two paired updates was applied: {}", err);
            Err(BacklogError::PartialUpdate {
                applied: 1,
                total: 2,
                failed: err.to_string(),
            })
        }
        (Err(err), Err(_)) => Err(err),
    }
}
