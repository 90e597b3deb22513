use crate::domain::{
    id::{BoardId, GroupId},
    sorting::{OrderBy, OrderDirection},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named bucket of stories within a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub board_id: BoardId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Position of the group among its siblings
    pub sort_order: i64,
    #[serde(default)]
    pub order_by: OrderBy,
    #[serde(default)]
    pub order_direction: OrderDirection,
    #[serde(default)]
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    pub fn new(board_id: BoardId, title: String, sort_order: i64) -> Self {
        let now = Utc::now();
        Self {
            id: GroupId::new(),
            board_id,
            title,
            color: None,
            sort_order,
            order_by: OrderBy::default(),
            order_direction: OrderDirection::default(),
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_ordering(mut self, order_by: OrderBy, direction: OrderDirection) -> Self {
        self.order_by = order_by;
        self.order_direction = direction;
        self
    }
}

/// Field-level change to a group; unset fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupUpdate {
    pub title: Option<String>,
    pub color: Option<Option<String>>,
    pub sort_order: Option<i64>,
    pub order_by: Option<OrderBy>,
    pub order_direction: Option<OrderDirection>,
    pub archived: Option<bool>,
}

impl GroupUpdate {
    pub fn sort_order(sort_order: i64) -> Self {
        Self {
            sort_order: Some(sort_order),
            ..Self::default()
        }
    }

    pub fn order_by(order_by: OrderBy) -> Self {
        Self {
            order_by: Some(order_by),
            ..Self::default()
        }
    }

    pub fn order_direction(direction: OrderDirection) -> Self {
        Self {
            order_direction: Some(direction),
            ..Self::default()
        }
    }

    pub fn archived(archived: bool) -> Self {
        Self {
            archived: Some(archived),
            ..Self::default()
        }
    }

    /// Writes the set fields into `group` and stamps `updated_at`
    pub fn apply(&self, group: &mut Group) {
        if let Some(title) = &self.title {
            group.title = title.clone();
        }
        if let Some(color) = &self.color {
            group.color = color.clone();
        }
        if let Some(sort_order) = self.sort_order {
            group.sort_order = sort_order;
        }
        if let Some(order_by) = self.order_by {
            group.order_by = order_by;
        }
        if let Some(direction) = self.order_direction {
            group.order_direction = direction;
        }
        if let Some(archived) = self.archived {
            group.archived = archived;
        }
        group.updated_at = Utc::now();
    }
}
