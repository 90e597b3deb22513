//! Keyed snapshots of repository reads.
//!
//! Entries never expire on their own; writers decide when to invalidate.

use crate::domain::{BoardId, Group, Story};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
pub struct QueryCache {
    stories: RwLock<HashMap<BoardId, Vec<Story>>>,
    groups: RwLock<HashMap<BoardId, Vec<Group>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn stories(&self, board_id: &BoardId) -> Option<Vec<Story>> {
        self.stories.read().await.get(board_id).cloned()
    }

    pub async fn set_stories(&self, board_id: &BoardId, stories: Vec<Story>) {
        self.stories.write().await.insert(board_id.clone(), stories);
    }

    /// Replaces one cached story in place
    ///
    /// Returns false when the board's stories are not cached or the story is
    /// not among them.
    pub async fn replace_story(&self, story: &Story) -> bool {
        let mut stories = self.stories.write().await;
        match stories
            .get_mut(&story.board_id)
            .and_then(|cached| cached.iter_mut().find(|s| s.id == story.id))
        {
            Some(slot) => {
                *slot = story.clone();
                true
            }
            None => false,
        }
    }

    pub async fn groups(&self, board_id: &BoardId) -> Option<Vec<Group>> {
        self.groups.read().await.get(board_id).cloned()
    }

    pub async fn set_groups(&self, board_id: &BoardId, groups: Vec<Group>) {
        self.groups.write().await.insert(board_id.clone(), groups);
    }

    pub async fn invalidate_stories(&self, board_id: &BoardId) {
        if self.stories.write().await.remove(board_id).is_some() {
            debug!("Invalidated cached stories of board {}", board_id);
        }
    }

    pub async fn invalidate_groups(&self, board_id: &BoardId) {
        if self.groups.write().await.remove(board_id).is_some() {
            debug!("Invalidated cached groups of board {}", board_id);
        }
    }

    /// Drops everything cached for a board
    pub async fn invalidate_board(&self, board_id: &BoardId) {
        self.invalidate_stories(board_id).await;
        self.invalidate_groups(board_id).await;
    }
}
