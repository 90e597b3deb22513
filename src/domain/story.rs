use crate::domain::{
    checklist::Checklist,
    id::{BoardId, GroupId, StoryId},
    prioritization::Prioritization,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user story on a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: StoryId,
    pub board_id: BoardId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_points: Option<u32>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prioritization: Option<Prioritization>,
    #[serde(default)]
    pub checklists: Vec<Checklist>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Story {
    /// Creates an ungrouped story carrying the INVEST checklist
    pub fn new(board_id: BoardId, title: String) -> Self {
        let now = Utc::now();
        Self {
            id: StoryId::new(),
            board_id,
            title,
            description: None,
            group_id: None,
            sort_order: 0,
            story_points: None,
            archived: false,
            prioritization: None,
            checklists: vec![Checklist::invest()],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_sort_order(mut self, sort_order: i64) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn in_group(mut self, group_id: GroupId) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn with_story_points(mut self, points: u32) -> Self {
        self.story_points = Some(points);
        self
    }

    pub fn with_prioritization(mut self, prioritization: Prioritization) -> Self {
        self.prioritization = Some(prioritization);
        self
    }

    /// Story points with missing estimates counted as zero
    pub fn points(&self) -> u32 {
        self.story_points.unwrap_or(0)
    }

    /// Refined once every attached checklist is complete
    pub fn is_refined(&self) -> bool {
        !self.checklists.is_empty() && self.checklists.iter().all(Checklist::is_complete)
    }

    /// Whether both stories sit in the same group, both ungrouped included
    pub fn shares_group_with(&self, other: &Story) -> bool {
        self.group_id == other.group_id
    }
}

/// Field-level change to a story; unset fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub group_id: Option<Option<GroupId>>,
    pub sort_order: Option<i64>,
    pub story_points: Option<Option<u32>>,
    pub archived: Option<bool>,
    pub prioritization: Option<Option<Prioritization>>,
    pub checklists: Option<Vec<Checklist>>,
}

impl StoryUpdate {
    pub fn sort_order(sort_order: i64) -> Self {
        Self {
            sort_order: Some(sort_order),
            ..Self::default()
        }
    }

    pub fn group(group_id: Option<GroupId>) -> Self {
        Self {
            group_id: Some(group_id),
            ..Self::default()
        }
    }

    pub fn archived(archived: bool) -> Self {
        Self {
            archived: Some(archived),
            ..Self::default()
        }
    }

    pub fn prioritization(prioritization: Prioritization) -> Self {
        Self {
            prioritization: Some(Some(prioritization)),
            ..Self::default()
        }
    }

    /// Writes the set fields into `story` and stamps `updated_at`
    pub fn apply(&self, story: &mut Story) {
        if let Some(title) = &self.title {
            story.title = title.clone();
        }
        if let Some(description) = &self.description {
            story.description = description.clone();
        }
        if let Some(group_id) = &self.group_id {
            story.group_id = group_id.clone();
        }
        if let Some(sort_order) = self.sort_order {
            story.sort_order = sort_order;
        }
        if let Some(points) = self.story_points {
            story.story_points = points;
        }
        if let Some(archived) = self.archived {
            story.archived = archived;
        }
        if let Some(prioritization) = &self.prioritization {
            story.prioritization = prioritization.clone();
        }
        if let Some(checklists) = &self.checklists {
            story.checklists = checklists.clone();
        }
        story.updated_at = Utc::now();
    }
}
