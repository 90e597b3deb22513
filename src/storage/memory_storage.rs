use crate::{
    domain::{Board, BoardId, Group, GroupId, GroupUpdate, Story, StoryId, StoryUpdate},
    error::{BacklogError, Result},
    storage::{GroupRepository, Storage, StoryRepository},
};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-process storage backend
#[derive(Default)]
pub struct MemoryStorage {
    boards: RwLock<HashMap<BoardId, Board>>,
    stories: RwLock<HashMap<StoryId, Story>>,
    groups: RwLock<HashMap<GroupId, Group>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    async fn board_stories(&self, board_id: &BoardId, archived: bool) -> Vec<Story> {
        let mut stories: Vec<Story> = self
            .stories
            .read()
            .await
            .values()
            .filter(|s| &s.board_id == board_id && s.archived == archived)
            .cloned()
            .collect();
        stories.sort_by(|a, b| {
            (a.sort_order, a.created_at, &a.id).cmp(&(b.sort_order, b.created_at, &b.id))
        });
        stories
    }
}

#[async_trait]
impl StoryRepository for MemoryStorage {
    async fn list_stories(&self, board_id: &BoardId) -> Result<Vec<Story>> {
        Ok(self.board_stories(board_id, false).await)
    }

    async fn list_archived_stories(&self, board_id: &BoardId) -> Result<Vec<Story>> {
        Ok(self.board_stories(board_id, true).await)
    }

    async fn load_story(&self, id: &StoryId) -> Result<Story> {
        self.stories
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| BacklogError::StoryNotFound(id.to_string()))
    }

    async fn save_story(&self, story: &Story) -> Result<()> {
        self.stories
            .write()
            .await
            .insert(story.id.clone(), story.clone());
        Ok(())
    }

    async fn update_story(&self, id: &StoryId, update: &StoryUpdate) -> Result<Story> {
        let mut stories = self.stories.write().await;
        let story = stories
            .get_mut(id)
            .ok_or_else(|| BacklogError::StoryNotFound(id.to_string()))?;
        update.apply(story);
        Ok(story.clone())
    }

    async fn delete_story(&self, id: &StoryId) -> Result<()> {
        self.stories
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| BacklogError::StoryNotFound(id.to_string()))
    }
}

#[async_trait]
impl GroupRepository for MemoryStorage {
    async fn list_groups(&self, board_id: &BoardId) -> Result<Vec<Group>> {
        let mut groups: Vec<Group> = self
            .groups
            .read()
            .await
            .values()
            .filter(|g| &g.board_id == board_id)
            .cloned()
            .collect();
        groups.sort_by(|a, b| {
            (a.sort_order, a.created_at, &a.id).cmp(&(b.sort_order, b.created_at, &b.id))
        });
        Ok(groups)
    }

    async fn load_group(&self, id: &GroupId) -> Result<Group> {
        self.groups
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| BacklogError::GroupNotFound(id.to_string()))
    }

    async fn save_group(&self, group: &Group) -> Result<()> {
        self.groups
            .write()
            .await
            .insert(group.id.clone(), group.clone());
        Ok(())
    }

    async fn update_group(&self, id: &GroupId, update: &GroupUpdate) -> Result<Group> {
        let mut groups = self.groups.write().await;
        let group = groups
            .get_mut(id)
            .ok_or_else(|| BacklogError::GroupNotFound(id.to_string()))?;
        update.apply(group);
        Ok(group.clone())
    }

    async fn delete_group(&self, id: &GroupId) -> Result<()> {
        self.groups
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| BacklogError::GroupNotFound(id.to_string()))
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn save_board(&self, board: &Board) -> Result<()> {
        board.config.validate()?;
        self.boards
            .write()
            .await
            .insert(board.id.clone(), board.clone());
        Ok(())
    }

    async fn load_board(&self, id: &BoardId) -> Result<Board> {
        self.boards
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| BacklogError::BoardNotFound(id.to_string()))
    }

    async fn list_board_ids(&self) -> Result<Vec<BoardId>> {
        let mut ids: Vec<BoardId> = self.boards.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn is_initialized(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderBy;

    #[tokio::test]
    async fn test_story_crud() {
        let storage = MemoryStorage::new();
        let board = Board::default();
        let story = board.new_story("Story".to_string(), 3);

        storage.save_story(&story).await.unwrap();
        assert_eq!(storage.load_story(&story.id).await.unwrap(), story);

        let updated = storage
            .update_story(&story.id, &StoryUpdate::archived(true))
            .await
            .unwrap();
        assert!(updated.archived);
        assert!(storage.list_stories(&board.id).await.unwrap().is_empty());
        assert_eq!(storage.list_archived_stories(&board.id).await.unwrap().len(), 1);

        storage.delete_story(&story.id).await.unwrap();
        assert!(matches!(
            storage.load_story(&story.id).await,
            Err(BacklogError::StoryNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_group_crud() {
        let storage = MemoryStorage::new();
        let board = Board::default();
        let b = board.new_group("b".to_string(), 1);
        let a = board.new_group("a".to_string(), 0);
        storage.save_group(&b).await.unwrap();
        storage.save_group(&a).await.unwrap();

        let groups = storage.list_groups(&board.id).await.unwrap();
        assert_eq!(groups[0].id, a.id);

        let updated = storage
            .update_group(&b.id, &GroupUpdate::order_by(OrderBy::Priority))
            .await
            .unwrap();
        assert_eq!(updated.order_by, OrderBy::Priority);

        storage.delete_group(&a.id).await.unwrap();
        assert_eq!(storage.list_groups(&board.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_equal_sort_orders_list_deterministically() {
        let storage = MemoryStorage::new();
        let board = Board::default();
        let mut newer = board.new_story("newer".to_string(), 1);
        let mut older = board.new_story("older".to_string(), 1);
        older.created_at = newer.created_at - chrono::Duration::seconds(5);
        let mut twin = board.new_story("twin".to_string(), 1);
        twin.created_at = newer.created_at;
        if twin.id < newer.id {
            std::mem::swap(&mut twin.id, &mut newer.id);
        }

        for story in [&twin, &newer, &older] {
            storage.save_story(story).await.unwrap();
        }

        for _ in 0..3 {
            let titles: Vec<String> = storage
                .list_stories(&board.id)
                .await
                .unwrap()
                .into_iter()
                .map(|s| s.title)
                .collect();
            assert_eq!(titles, vec!["older", "newer", "twin"]);
        }
    }

    #[tokio::test]
    async fn test_board_with_invalid_config_is_rejected() {
        let storage = MemoryStorage::new();
        let mut board = Board::default();
        board.config.name = String::new();
        assert!(matches!(
            storage.save_board(&board).await,
            Err(BacklogError::ConfigError(_))
        ));
        assert!(storage.list_board_ids().await.unwrap().is_empty());
    }
}
