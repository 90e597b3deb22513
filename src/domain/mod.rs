pub mod board;
pub mod checklist;
pub mod group;
pub mod id;
pub mod prioritization;
pub mod reorder;
pub mod sorting;
pub mod story;

pub use board::{Board, BoardConfig};
pub use checklist::{Checklist, ChecklistItem, ChecklistKind};
pub use group::{Group, GroupUpdate};
pub use id::{BoardId, GroupId, StoryId};
pub use prioritization::{priority_score, Csd, Moscow, Prioritization, PrioritizationPatch};
pub use reorder::{plan_group_move, DragGesture, DropPlan, GroupSwap, MoveDirection, Reposition};
pub use sorting::{order_stories, sort_groups, sort_stories, OrderBy, OrderDirection};
pub use story::{Story, StoryUpdate};
