use crate::domain::{
    group::Group,
    id::BoardId,
    sorting::{OrderBy, OrderDirection},
    story::Story,
};
use crate::error::{BacklogError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Board configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub name: String,
    /// Ordering given to newly created groups
    #[serde(default)]
    pub default_order_by: OrderBy,
    #[serde(default)]
    pub default_order_direction: OrderDirection,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            name: "Backlog".to_string(),
            default_order_by: OrderBy::Custom,
            default_order_direction: OrderDirection::Asc,
        }
    }
}

impl BoardConfig {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(BacklogError::ConfigError(
                "board name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// A backlog board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub config: BoardConfig,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    pub fn new(config: BoardConfig) -> Self {
        let now = Utc::now();
        Self {
            id: BoardId::new(),
            config,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a group on this board using the configured default ordering
    pub fn new_group(&self, title: String, sort_order: i64) -> Group {
        Group::new(self.id.clone(), title, sort_order).with_ordering(
            self.config.default_order_by,
            self.config.default_order_direction,
        )
    }

    /// Creates an ungrouped story on this board
    pub fn new_story(&self, title: String, sort_order: i64) -> Story {
        Story::new(self.id.clone(), title).with_sort_order(sort_order)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}
