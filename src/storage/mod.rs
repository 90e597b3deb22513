use crate::{
    domain::{Board, BoardId, Group, GroupId, GroupUpdate, Story, StoryId, StoryUpdate},
    error::Result,
};
use async_trait::async_trait;

pub mod cache;
#[cfg(feature = "file-storage")]
pub mod file_storage;
pub mod memory_storage;

pub use cache::QueryCache;
#[cfg(feature = "file-storage")]
pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;

/// Source of stories and sink for field-level story updates
#[async_trait]
pub trait StoryRepository: Send + Sync {
    /// Lists the board's non-archived stories by ascending `sort_order`
    async fn list_stories(&self, board_id: &BoardId) -> Result<Vec<Story>>;

    /// Lists the board's archived stories by ascending `sort_order`
    async fn list_archived_stories(&self, board_id: &BoardId) -> Result<Vec<Story>>;

    /// Loads a story by ID
    async fn load_story(&self, id: &StoryId) -> Result<Story>;

    /// Saves a story, replacing any previous version
    async fn save_story(&self, story: &Story) -> Result<()>;

    /// Applies `update` to a stored story and returns the updated story
    async fn update_story(&self, id: &StoryId, update: &StoryUpdate) -> Result<Story>;

    /// Deletes a story
    async fn delete_story(&self, id: &StoryId) -> Result<()>;
}

/// Source of groups and sink for field-level group updates
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Lists all groups of a board, archived included, by ascending `sort_order`
    async fn list_groups(&self, board_id: &BoardId) -> Result<Vec<Group>>;

    /// Loads a group by ID
    async fn load_group(&self, id: &GroupId) -> Result<Group>;

    /// Saves a group, replacing any previous version
    async fn save_group(&self, group: &Group) -> Result<()>;

    /// Applies `update` to a stored group and returns the updated group
    async fn update_group(&self, id: &GroupId, update: &GroupUpdate) -> Result<Group>;

    /// Deletes a group; its stories are not touched
    async fn delete_group(&self, id: &GroupId) -> Result<()>;
}

/// Storage backend for boards and their stories and groups
#[async_trait]
pub trait Storage: StoryRepository + GroupRepository {
    /// Initializes the storage backend
    async fn initialize(&self) -> Result<()>;

    /// Saves the board state
    async fn save_board(&self, board: &Board) -> Result<()>;

    /// Loads a board by ID
    async fn load_board(&self, id: &BoardId) -> Result<Board>;

    /// Lists all board IDs
    async fn list_board_ids(&self) -> Result<Vec<BoardId>>;

    /// Checks if the storage is initialized
    async fn is_initialized(&self) -> bool;
}
