use crate::{
    domain::{Board, BoardId, Group, GroupId, GroupUpdate, Story, StoryId, StoryUpdate},
    error::{BacklogError, Result},
    storage::{GroupRepository, Storage, StoryRepository},
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    path::{Path, PathBuf},
    str::FromStr,
};
use tokio::fs;
use tracing::debug;

/// File-based storage: one JSON document per board, group and story
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    const DATA_DIR: &'static str = ".backlog";
    const BOARDS_DIR: &'static str = "boards";
    const STORIES_DIR: &'static str = "stories";
    const GROUPS_DIR: &'static str = "groups";

    /// Creates a new FileStorage instance for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::DATA_DIR),
        }
    }

    fn boards_dir(&self) -> PathBuf {
        self.root_path.join(Self::BOARDS_DIR)
    }

    fn stories_dir(&self) -> PathBuf {
        self.root_path.join(Self::STORIES_DIR)
    }

    fn groups_dir(&self) -> PathBuf {
        self.root_path.join(Self::GROUPS_DIR)
    }

    fn board_file(&self, id: &BoardId) -> PathBuf {
        self.boards_dir().join(format!("{}.json", id))
    }

    fn story_file(&self, id: &StoryId) -> PathBuf {
        self.stories_dir().join(format!("{}.json", id))
    }

    fn group_file(&self, id: &GroupId) -> PathBuf {
        self.groups_dir().join(format!("{}.json", id))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    async fn write_json<T: Serialize>(&self, dir: &Path, file: &Path, value: &T) -> Result<()> {
        self.ensure_directory_exists(dir).await?;
        let json = serde_json::to_string_pretty(value)?;
        fs::write(file, json).await?;
        Ok(())
    }

    async fn read_json<T: DeserializeOwned>(file: &Path) -> Result<T> {
        let contents = fs::read_to_string(file).await?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Reads every JSON document of a directory
    async fn read_all<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(dir).await?;
        let mut values = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                values.push(Self::read_json(&path).await?);
            }
        }

        Ok(values)
    }

    async fn board_stories(&self, board_id: &BoardId, archived: bool) -> Result<Vec<Story>> {
        let mut stories: Vec<Story> = Self::read_all(&self.stories_dir())
            .await?
            .into_iter()
            .filter(|s: &Story| &s.board_id == board_id && s.archived == archived)
            .collect();
        stories.sort_by(|a, b| {
            (a.sort_order, a.created_at, &a.id).cmp(&(b.sort_order, b.created_at, &b.id))
        });
        Ok(stories)
    }
}

#[async_trait]
impl StoryRepository for FileStorage {
    async fn list_stories(&self, board_id: &BoardId) -> Result<Vec<Story>> {
        self.board_stories(board_id, false).await
    }

    async fn list_archived_stories(&self, board_id: &BoardId) -> Result<Vec<Story>> {
        self.board_stories(board_id, true).await
    }

    async fn load_story(&self, id: &StoryId) -> Result<Story> {
        let file_path = self.story_file(id);

        if !file_path.exists() {
            return Err(BacklogError::StoryNotFound(id.to_string()));
        }

        Self::read_json(&file_path).await
    }

    async fn save_story(&self, story: &Story) -> Result<()> {
        self.write_json(&self.stories_dir(), &self.story_file(&story.id), story)
            .await
    }

    async fn update_story(&self, id: &StoryId, update: &StoryUpdate) -> Result<Story> {
        let mut story = self.load_story(id).await?;
        update.apply(&mut story);
        self.save_story(&story).await?;
        debug!("Updated story {}", id);
        Ok(story)
    }

    async fn delete_story(&self, id: &StoryId) -> Result<()> {
        let file_path = self.story_file(id);

        if !file_path.exists() {
            return Err(BacklogError::StoryNotFound(id.to_string()));
        }

        fs::remove_file(file_path).await?;
        Ok(())
    }
}

#[async_trait]
impl GroupRepository for FileStorage {
    async fn list_groups(&self, board_id: &BoardId) -> Result<Vec<Group>> {
        let mut groups: Vec<Group> = Self::read_all(&self.groups_dir())
            .await?
            .into_iter()
            .filter(|g: &Group| &g.board_id == board_id)
            .collect();
        groups.sort_by(|a, b| {
            (a.sort_order, a.created_at, &a.id).cmp(&(b.sort_order, b.created_at, &b.id))
        });
        Ok(groups)
    }

    async fn load_group(&self, id: &GroupId) -> Result<Group> {
        let file_path = self.group_file(id);

        if !file_path.exists() {
            return Err(BacklogError::GroupNotFound(id.to_string()));
        }

        Self::read_json(&file_path).await
    }

    async fn save_group(&self, group: &Group) -> Result<()> {
        self.write_json(&self.groups_dir(), &self.group_file(&group.id), group)
            .await
    }

    async fn update_group(&self, id: &GroupId, update: &GroupUpdate) -> Result<Group> {
        let mut group = self.load_group(id).await?;
        update.apply(&mut group);
        self.save_group(&group).await?;
        debug!("Updated group {}", id);
        Ok(group)
    }

    async fn delete_group(&self, id: &GroupId) -> Result<()> {
        let file_path = self.group_file(id);

        if !file_path.exists() {
            return Err(BacklogError::GroupNotFound(id.to_string()));
        }

        fs::remove_file(file_path).await?;
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;
        self.ensure_directory_exists(&self.boards_dir()).await?;
        self.ensure_directory_exists(&self.stories_dir()).await?;
        self.ensure_directory_exists(&self.groups_dir()).await?;
        Ok(())
    }

    async fn save_board(&self, board: &Board) -> Result<()> {
        board.config.validate()?;
        self.write_json(&self.boards_dir(), &self.board_file(&board.id), board)
            .await
    }

    async fn load_board(&self, id: &BoardId) -> Result<Board> {
        if !self.root_path.exists() {
            return Err(BacklogError::BoardNotInitialized);
        }

        let board_file = self.board_file(id);
        if !board_file.exists() {
            return Err(BacklogError::BoardNotFound(id.to_string()));
        }

        Self::read_json(&board_file).await
    }

    async fn list_board_ids(&self) -> Result<Vec<BoardId>> {
        let boards_dir = self.boards_dir();

        if !boards_dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&boards_dir).await?;
        let mut ids = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    if let Ok(id) = BoardId::from_str(stem) {
                        ids.push(id);
                    }
                }
            }
        }

        ids.sort();
        Ok(ids)
    }

    async fn is_initialized(&self) -> bool {
        self.root_path.exists() && self.boards_dir().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Moscow, OrderBy, Prioritization};
    use tempfile::TempDir;

    async fn storage() -> (TempDir, FileStorage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        storage.initialize().await.unwrap();
        (temp_dir, storage)
    }

    #[tokio::test]
    async fn test_storage_initialization() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        assert!(!storage.is_initialized().await);

        storage.initialize().await.unwrap();

        assert!(storage.is_initialized().await);
        assert!(storage.stories_dir().exists());
        assert!(storage.groups_dir().exists());
    }

    #[tokio::test]
    async fn test_board_save_and_load() {
        let (_dir, storage) = storage().await;
        let board = Board::default();

        storage.save_board(&board).await.unwrap();

        let loaded = storage.load_board(&board.id).await.unwrap();
        assert_eq!(loaded.id, board.id);
        assert_eq!(loaded.config, board.config);
        assert_eq!(storage.list_board_ids().await.unwrap(), vec![board.id]);
    }

    #[tokio::test]
    async fn test_load_missing_board() {
        let (_dir, storage) = storage().await;
        let result = storage.load_board(&BoardId::new()).await;
        assert!(matches!(result, Err(BacklogError::BoardNotFound(_))));
    }

    #[tokio::test]
    async fn test_load_board_before_initialization() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        let result = storage.load_board(&BoardId::new()).await;
        assert!(matches!(result, Err(BacklogError::BoardNotInitialized)));
    }

    #[tokio::test]
    async fn test_story_save_and_load() {
        let (_dir, storage) = storage().await;
        let board = Board::default();
        let story = board
            .new_story("Checkout".to_string(), 0)
            .with_prioritization(Prioritization::moscow(Moscow::Must));

        storage.save_story(&story).await.unwrap();

        let loaded = storage.load_story(&story.id).await.unwrap();
        assert_eq!(loaded, story);
    }

    #[tokio::test]
    async fn test_list_stories_filters_board_and_archived() {
        let (_dir, storage) = storage().await;
        let board = Board::default();
        let other = Board::default();

        let second = board.new_story("second".to_string(), 5);
        let first = board.new_story("first".to_string(), 1);
        let mut archived = board.new_story("archived".to_string(), 2);
        archived.archived = true;
        let foreign = other.new_story("foreign".to_string(), 0);

        for story in [&second, &first, &archived, &foreign] {
            storage.save_story(story).await.unwrap();
        }

        let listed = storage.list_stories(&board.id).await.unwrap();
        let titles: Vec<&str> = listed.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second"]);

        let archived_list = storage.list_archived_stories(&board.id).await.unwrap();
        assert_eq!(archived_list.len(), 1);
        assert_eq!(archived_list[0].id, archived.id);
    }

    #[tokio::test]
    async fn test_update_story_persists_fields() {
        let (_dir, storage) = storage().await;
        let board = Board::default();
        let story = board.new_story("Story".to_string(), 0);
        storage.save_story(&story).await.unwrap();

        let updated = storage
            .update_story(&story.id, &StoryUpdate::sort_order(7))
            .await
            .unwrap();
        assert_eq!(updated.sort_order, 7);

        let loaded = storage.load_story(&story.id).await.unwrap();
        assert_eq!(loaded.sort_order, 7);
        assert!(loaded.updated_at >= story.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_story() {
        let (_dir, storage) = storage().await;
        let result = storage
            .update_story(&StoryId::new(), &StoryUpdate::sort_order(1))
            .await;
        assert!(matches!(result, Err(BacklogError::StoryNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_story() {
        let (_dir, storage) = storage().await;
        let story = Board::default().new_story("Story".to_string(), 0);
        storage.save_story(&story).await.unwrap();

        storage.delete_story(&story.id).await.unwrap();

        assert!(storage.load_story(&story.id).await.is_err());
        assert!(storage.delete_story(&story.id).await.is_err());
    }

    #[tokio::test]
    async fn test_groups_listed_in_manual_order() {
        let (_dir, storage) = storage().await;
        let board = Board::default();
        let later = board.new_group("Later".to_string(), 1);
        let now = board.new_group("Now".to_string(), 0);
        storage.save_group(&later).await.unwrap();
        storage.save_group(&now).await.unwrap();

        let groups = storage.list_groups(&board.id).await.unwrap();
        assert_eq!(groups[0].id, now.id);
        assert_eq!(groups[1].id, later.id);
    }

    #[tokio::test]
    async fn test_update_and_delete_group() {
        let (_dir, storage) = storage().await;
        let group = Board::default().new_group("Group".to_string(), 0);
        storage.save_group(&group).await.unwrap();

        let updated = storage
            .update_group(&group.id, &GroupUpdate::order_by(OrderBy::StoryPoints))
            .await
            .unwrap();
        assert_eq!(updated.order_by, OrderBy::StoryPoints);

        storage.delete_group(&group.id).await.unwrap();
        assert!(matches!(
            storage.load_group(&group.id).await,
            Err(BacklogError::GroupNotFound(_))
        ));
    }
}
