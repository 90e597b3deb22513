//! # Backlog Core
//!
//! Core domain models and logic for refining and prioritizing product
//! backlogs.
//!
//! This crate scores stories with MoSCoW, GUT and CSD, orders the stories of
//! each group by the group's chosen strategy, and plans the field updates
//! produced by manual drag-and-drop reordering. Persistence sits behind the
//! [`storage`] repository traits.

pub mod backlog;
pub mod domain;
pub mod error;
pub mod storage;

// Re-export commonly used types
pub use backlog::{Backlog, GroupView};
pub use domain::{
    board::{Board, BoardConfig},
    group::Group,
    id::{BoardId, GroupId, StoryId},
    prioritization::{priority_score, Prioritization},
    reorder::{DragGesture, DropPlan},
    sorting::{order_stories, OrderBy, OrderDirection},
    story::Story,
};
pub use error::{BacklogError, Result};
pub use storage::Storage;
