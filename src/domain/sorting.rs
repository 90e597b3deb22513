use crate::domain::{group::Group, prioritization::priority_score, story::Story};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::{fmt, str::FromStr};

/// Strategy used to order the stories inside a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderBy {
    /// Manual order, by `sort_order`
    #[default]
    Custom,
    Priority,
    StoryPoints,
    CreatedAt,
    UpdatedAt,
}

/// Sort order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    fn apply(self, cmp: Ordering) -> Ordering {
        match self {
            Self::Asc => cmp,
            Self::Desc => cmp.reverse(),
        }
    }
}

impl FromStr for OrderBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "custom" | "manual" => Ok(OrderBy::Custom),
            "priority" => Ok(OrderBy::Priority),
            "story-points" | "points" => Ok(OrderBy::StoryPoints),
            "created" | "created-at" => Ok(OrderBy::CreatedAt),
            "updated" | "updated-at" => Ok(OrderBy::UpdatedAt),
            _ => Err(format!(
                "Invalid ordering '{}'. Valid orderings: custom, priority, story-points, created, updated",
                s
            )),
        }
    }
}

impl FromStr for OrderDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(OrderDirection::Asc),
            "desc" => Ok(OrderDirection::Desc),
            _ => Err(format!(
                "Invalid order direction '{}'. Valid directions: asc, desc",
                s
            )),
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom => write!(f, "Manual order"),
            Self::Priority => write!(f, "Priority"),
            Self::StoryPoints => write!(f, "Story points"),
            Self::CreatedAt => write!(f, "Created"),
            Self::UpdatedAt => write!(f, "Last updated"),
        }
    }
}

/// Orders the stories of a group according to the group's configuration
///
/// Returns a new vector; the input is left untouched. Without a group the
/// stories are put in manual ascending order.
///
/// # Examples
/// ```
/// use backlog_core::domain::{order_stories, BoardId, Story};
///
/// let board = BoardId::new();
/// let stories = vec![
///     Story::new(board.clone(), "B".to_string()).with_sort_order(1),
///     Story::new(board, "A".to_string()).with_sort_order(0),
/// ];
///
/// let ordered = order_stories(&stories, None);
/// assert_eq!(ordered[0].title, "A");
/// ```
pub fn order_stories(stories: &[Story], group: Option<&Group>) -> Vec<Story> {
    let (order_by, direction) = group
        .map(|g| (g.order_by, g.order_direction))
        .unwrap_or_default();

    let mut ordered = stories.to_vec();
    sort_stories(&mut ordered, order_by, direction);
    ordered
}

/// Sorts stories in place; stable, so equal keys keep their input order
///
/// `Desc` reverses the whole comparator, tie-breaks included.
pub fn sort_stories(stories: &mut [Story], order_by: OrderBy, direction: OrderDirection) {
    stories.sort_by(|a, b| {
        let cmp = match order_by {
            OrderBy::Custom => a.sort_order.cmp(&b.sort_order),
            OrderBy::Priority => priority_score(b)
                .cmp(&priority_score(a))
                .then_with(|| a.sort_order.cmp(&b.sort_order)),
            OrderBy::StoryPoints => b
                .points()
                .cmp(&a.points())
                .then_with(|| a.sort_order.cmp(&b.sort_order)),
            // Oldest first
            OrderBy::CreatedAt => a.created_at.cmp(&b.created_at),
            // Most recently touched first
            OrderBy::UpdatedAt => b.updated_at.cmp(&a.updated_at),
        };

        direction.apply(cmp)
    });
}

/// Puts groups in their manual order
pub fn sort_groups(groups: &mut [Group]) {
    groups.sort_by(|a, b| a.sort_order.cmp(&b.sort_order));
}
