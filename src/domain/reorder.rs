//! Manual reordering by drag and drop.
//!
//! Planning is pure: a drop is resolved against a snapshot of stories and
//! groups and yields a [`DropPlan`] describing the field updates to issue.
//! Persisting the plan is left to the caller.

use crate::domain::{
    group::{Group, GroupUpdate},
    id::{GroupId, StoryId},
    sorting::OrderBy,
    story::{Story, StoryUpdate},
};
use crate::error::{BacklogError, Result};

/// A story being dragged
///
/// Only the dragged id is captured; the gesture is consumed by its drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragGesture {
    dragged: StoryId,
}

/// New `sort_order` proposed for one story
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reposition {
    pub story_id: StoryId,
    pub sort_order: i64,
}

/// Field updates resulting from a drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropPlan {
    /// Dropped onto itself
    Ignored,
    /// Reassign the story to another group (or to none); `sort_order` is kept
    Move {
        story_id: StoryId,
        to_group: Option<GroupId>,
    },
    /// Exchange the `sort_order` values of two stories of the same group
    Swap {
        dragged: Reposition,
        target: Reposition,
        group: Option<GroupId>,
    },
}

impl DragGesture {
    pub fn start(story_id: StoryId) -> Self {
        Self { dragged: story_id }
    }

    pub fn dragged(&self) -> &StoryId {
        &self.dragged
    }

    /// Drops the dragged story onto another story
    ///
    /// Stories of the same group (both ungrouped included) swap their
    /// `sort_order`; otherwise the dragged story moves into the target's
    /// group. Fails without a plan when either story is missing.
    pub fn drop_on_story(self, stories: &[Story], target: &StoryId) -> Result<DropPlan> {
        if &self.dragged == target {
            return Ok(DropPlan::Ignored);
        }

        let dragged = find_story(stories, &self.dragged)?;
        let target = find_story(stories, target)?;

        if dragged.shares_group_with(target) {
            Ok(DropPlan::Swap {
                dragged: Reposition {
                    story_id: dragged.id.clone(),
                    sort_order: target.sort_order,
                },
                target: Reposition {
                    story_id: target.id.clone(),
                    sort_order: dragged.sort_order,
                },
                group: target.group_id.clone(),
            })
        } else {
            Ok(DropPlan::Move {
                story_id: dragged.id.clone(),
                to_group: target.group_id.clone(),
            })
        }
    }

    /// Drops the dragged story onto a group, or onto the ungrouped area
    /// when `target` is `None`
    ///
    /// The story is reassigned even when it already sits in that group.
    /// Archived groups are not drop targets.
    pub fn drop_on_group(
        self,
        stories: &[Story],
        groups: &[Group],
        target: Option<&GroupId>,
    ) -> Result<DropPlan> {
        let dragged = find_story(stories, &self.dragged)?;

        if let Some(group_id) = target {
            if !groups.iter().any(|g| &g.id == group_id && !g.archived) {
                return Err(BacklogError::GroupNotFound(group_id.to_string()));
            }
        }

        Ok(DropPlan::Move {
            story_id: dragged.id.clone(),
            to_group: target.cloned(),
        })
    }
}

impl DropPlan {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }

    /// Story updates to issue, at most two
    pub fn story_updates(&self) -> Vec<(StoryId, StoryUpdate)> {
        match self {
            Self::Ignored => Vec::new(),
            Self::Move { story_id, to_group } => {
                vec![(story_id.clone(), StoryUpdate::group(to_group.clone()))]
            }
            Self::Swap {
                dragged, target, ..
            } => vec![
                (
                    dragged.story_id.clone(),
                    StoryUpdate::sort_order(dragged.sort_order),
                ),
                (
                    target.story_id.clone(),
                    StoryUpdate::sort_order(target.sort_order),
                ),
            ],
        }
    }

    /// Group that receives the dropped story, if any
    ///
    /// A manual drop opts this group out of automatic ordering.
    pub fn receiving_group(&self) -> Option<&GroupId> {
        match self {
            Self::Ignored => None,
            Self::Move { to_group, .. } => to_group.as_ref(),
            Self::Swap { group, .. } => group.as_ref(),
        }
    }

    /// Switches the receiving group back to manual order
    pub fn group_update(&self) -> Option<(GroupId, GroupUpdate)> {
        self.receiving_group()
            .map(|id| (id.clone(), GroupUpdate::order_by(OrderBy::Custom)))
    }

    /// Applies the plan to an in-memory snapshot
    pub fn apply(&self, stories: &mut [Story], groups: &mut [Group]) {
        for (story_id, update) in self.story_updates() {
            if let Some(story) = stories.iter_mut().find(|s| s.id == story_id) {
                update.apply(story);
            }
        }
        if let Some((group_id, update)) = self.group_update() {
            if let Some(group) = groups.iter_mut().find(|g| g.id == group_id) {
                update.apply(group);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Exchange of `sort_order` between two adjacent groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSwap {
    pub moved: (GroupId, i64),
    pub neighbour: (GroupId, i64),
}

impl GroupSwap {
    /// Both updates; they are meant to be issued together
    pub fn updates(&self) -> [(GroupId, GroupUpdate); 2] {
        [
            (self.moved.0.clone(), GroupUpdate::sort_order(self.moved.1)),
            (
                self.neighbour.0.clone(),
                GroupUpdate::sort_order(self.neighbour.1),
            ),
        ]
    }

    pub fn apply(&self, groups: &mut [Group]) {
        for (group_id, update) in self.updates() {
            if let Some(group) = groups.iter_mut().find(|g| g.id == group_id) {
                update.apply(group);
            }
        }
    }
}

/// Plans moving a group one step within `groups`, which must already be in
/// display order
///
/// Returns `None` when the group is already at the boundary.
pub fn plan_group_move(
    groups: &[Group],
    group_id: &GroupId,
    direction: MoveDirection,
) -> Result<Option<GroupSwap>> {
    let index = groups
        .iter()
        .position(|g| &g.id == group_id)
        .ok_or_else(|| BacklogError::GroupNotFound(group_id.to_string()))?;

    let neighbour_index = match direction {
        MoveDirection::Up if index > 0 => index - 1,
        MoveDirection::Down if index + 1 < groups.len() => index + 1,
        _ => return Ok(None),
    };

    let moved = &groups[index];
    let neighbour = &groups[neighbour_index];
    Ok(Some(GroupSwap {
        moved: (moved.id.clone(), neighbour.sort_order),
        neighbour: (neighbour.id.clone(), moved.sort_order),
    }))
}

fn find_story<'a>(stories: &'a [Story], id: &StoryId) -> Result<&'a Story> {
    stories
        .iter()
        .find(|s| &s.id == id)
        .ok_or_else(|| BacklogError::StoryNotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{sorting::OrderDirection, BoardId};

    struct Fixture {
        stories: Vec<Story>,
        groups: Vec<Group>,
    }

    /// Two groups (todo sorted by priority, done manual) plus ungrouped stories
    fn fixture() -> Fixture {
        let board = BoardId::new();
        let todo = Group::new(board.clone(), "Todo".to_string(), 0)
            .with_ordering(OrderBy::Priority, OrderDirection::Asc);
        let done = Group::new(board.clone(), "Done".to_string(), 1);

        let stories = vec![
            Story::new(board.clone(), "t1".to_string())
                .with_sort_order(0)
                .in_group(todo.id.clone()),
            Story::new(board.clone(), "t2".to_string())
                .with_sort_order(1)
                .in_group(todo.id.clone()),
            Story::new(board.clone(), "d1".to_string())
                .with_sort_order(2)
                .in_group(done.id.clone()),
            Story::new(board.clone(), "u1".to_string()).with_sort_order(3),
            Story::new(board, "u2".to_string()).with_sort_order(4),
        ];

        Fixture {
            stories,
            groups: vec![todo, done],
        }
    }

    fn id_of(stories: &[Story], title: &str) -> StoryId {
        stories.iter().find(|s| s.title == title).unwrap().id.clone()
    }

    fn sort_order_of(stories: &[Story], title: &str) -> i64 {
        stories.iter().find(|s| s.title == title).unwrap().sort_order
    }

    #[test]
    fn test_drop_on_itself_is_ignored() {
        let f = fixture();
        let id = id_of(&f.stories, "t1");
        let plan = DragGesture::start(id.clone())
            .drop_on_story(&f.stories, &id)
            .unwrap();
        assert!(plan.is_ignored());
        assert!(plan.story_updates().is_empty());
        assert!(plan.group_update().is_none());
    }

    #[test]
    fn test_same_group_swaps_sort_order_and_forces_custom() {
        let mut f = fixture();
        let t1 = id_of(&f.stories, "t1");
        let t2 = id_of(&f.stories, "t2");

        let plan = DragGesture::start(t1).drop_on_story(&f.stories, &t2).unwrap();
        assert!(matches!(plan, DropPlan::Swap { .. }));
        assert_eq!(plan.story_updates().len(), 2);

        plan.apply(&mut f.stories, &mut f.groups);
        assert_eq!(sort_order_of(&f.stories, "t1"), 1);
        assert_eq!(sort_order_of(&f.stories, "t2"), 0);
        assert_eq!(f.groups[0].order_by, OrderBy::Custom);
        // Direction is left alone
        assert_eq!(f.groups[0].order_direction, OrderDirection::Asc);
    }

    #[test]
    fn test_swap_twice_restores_original_pair() {
        let mut f = fixture();
        let t1 = id_of(&f.stories, "t1");
        let t2 = id_of(&f.stories, "t2");

        for _ in 0..2 {
            let plan = DragGesture::start(t1.clone())
                .drop_on_story(&f.stories, &t2)
                .unwrap();
            plan.apply(&mut f.stories, &mut f.groups);
        }

        assert_eq!(sort_order_of(&f.stories, "t1"), 0);
        assert_eq!(sort_order_of(&f.stories, "t2"), 1);
    }

    #[test]
    fn test_ungrouped_stories_swap_without_group_update() {
        let mut f = fixture();
        let u1 = id_of(&f.stories, "u1");
        let u2 = id_of(&f.stories, "u2");

        let plan = DragGesture::start(u2).drop_on_story(&f.stories, &u1).unwrap();
        assert!(matches!(plan, DropPlan::Swap { group: None, .. }));
        assert!(plan.group_update().is_none());

        plan.apply(&mut f.stories, &mut f.groups);
        assert_eq!(sort_order_of(&f.stories, "u1"), 4);
        assert_eq!(sort_order_of(&f.stories, "u2"), 3);
    }

    #[test]
    fn test_cross_group_drop_moves_story() {
        let mut f = fixture();
        let d1 = id_of(&f.stories, "d1");
        let t2 = id_of(&f.stories, "t2");
        let todo = f.groups[0].id.clone();

        let plan = DragGesture::start(d1).drop_on_story(&f.stories, &t2).unwrap();
        assert_eq!(plan.receiving_group(), Some(&todo));

        plan.apply(&mut f.stories, &mut f.groups);
        let moved = f.stories.iter().find(|s| s.title == "d1").unwrap();
        assert_eq!(moved.group_id, Some(todo));
        assert_eq!(moved.sort_order, 2);
        assert_eq!(sort_order_of(&f.stories, "t2"), 1);
        assert_eq!(f.groups[0].order_by, OrderBy::Custom);
    }

    #[test]
    fn test_drop_onto_ungrouped_story_ungroups() {
        let f = fixture();
        let t1 = id_of(&f.stories, "t1");
        let u1 = id_of(&f.stories, "u1");

        let plan = DragGesture::start(t1.clone())
            .drop_on_story(&f.stories, &u1)
            .unwrap();
        assert_eq!(
            plan,
            DropPlan::Move {
                story_id: t1,
                to_group: None
            }
        );
        assert!(plan.group_update().is_none());
    }

    #[test]
    fn test_unknown_story_yields_no_plan() {
        let f = fixture();
        let t1 = id_of(&f.stories, "t1");
        let missing = StoryId::new();

        let err = DragGesture::start(t1.clone())
            .drop_on_story(&f.stories, &missing)
            .unwrap_err();
        assert!(matches!(err, BacklogError::StoryNotFound(_)));

        let err = DragGesture::start(missing)
            .drop_on_story(&f.stories, &t1)
            .unwrap_err();
        assert!(matches!(err, BacklogError::StoryNotFound(_)));
    }

    #[test]
    fn test_drop_on_group_forces_custom() {
        let mut f = fixture();
        let u1 = id_of(&f.stories, "u1");
        let todo = f.groups[0].id.clone();
        assert_eq!(f.groups[0].order_by, OrderBy::Priority);

        let plan = DragGesture::start(u1)
            .drop_on_group(&f.stories, &f.groups, Some(&todo))
            .unwrap();
        plan.apply(&mut f.stories, &mut f.groups);

        let moved = f.stories.iter().find(|s| s.title == "u1").unwrap();
        assert_eq!(moved.group_id, Some(todo));
        assert_eq!(f.groups[0].order_by, OrderBy::Custom);
    }

    #[test]
    fn test_drop_on_own_group_still_reassigns() {
        let f = fixture();
        let t1 = id_of(&f.stories, "t1");
        let todo = f.groups[0].id.clone();

        let plan = DragGesture::start(t1)
            .drop_on_group(&f.stories, &f.groups, Some(&todo))
            .unwrap();
        assert_eq!(plan.story_updates().len(), 1);
        assert_eq!(plan.receiving_group(), Some(&todo));
    }

    #[test]
    fn test_drop_on_ungrouped_area() {
        let mut f = fixture();
        let d1 = id_of(&f.stories, "d1");

        let plan = DragGesture::start(d1)
            .drop_on_group(&f.stories, &f.groups, None)
            .unwrap();
        assert!(plan.group_update().is_none());

        plan.apply(&mut f.stories, &mut f.groups);
        assert!(f.stories.iter().find(|s| s.title == "d1").unwrap().group_id.is_none());
    }

    #[test]
    fn test_drop_on_unknown_group() {
        let f = fixture();
        let u1 = id_of(&f.stories, "u1");
        let err = DragGesture::start(u1)
            .drop_on_group(&f.stories, &f.groups, Some(&GroupId::new()))
            .unwrap_err();
        assert!(matches!(err, BacklogError::GroupNotFound(_)));
    }

    #[test]
    fn test_drop_on_archived_group() {
        let mut f = fixture();
        let u1 = id_of(&f.stories, "u1");
        f.groups[1].archived = true;
        let done = f.groups[1].id.clone();

        let err = DragGesture::start(u1)
            .drop_on_group(&f.stories, &f.groups, Some(&done))
            .unwrap_err();
        assert!(matches!(err, BacklogError::GroupNotFound(_)));
    }

    #[test]
    fn test_group_move_swaps_with_neighbour() {
        let board = BoardId::new();
        let mut groups = vec![
            Group::new(board.clone(), "a".to_string(), 0),
            Group::new(board.clone(), "b".to_string(), 5),
            Group::new(board, "c".to_string(), 9),
        ];
        let b = groups[1].id.clone();

        let swap = plan_group_move(&groups, &b, MoveDirection::Up)
            .unwrap()
            .unwrap();
        assert_eq!(swap.moved, (b.clone(), 0));
        assert_eq!(swap.neighbour, (groups[0].id.clone(), 5));

        swap.apply(&mut groups);
        assert_eq!(groups[0].sort_order, 5);
        assert_eq!(groups[1].sort_order, 0);

        let swap = plan_group_move(&groups, &groups[2].id.clone(), MoveDirection::Up)
            .unwrap()
            .unwrap();
        assert_eq!(swap.moved.1, 0);
    }

    #[test]
    fn test_group_move_at_boundary_is_noop() {
        let board = BoardId::new();
        let groups = vec![
            Group::new(board.clone(), "first".to_string(), 0),
            Group::new(board, "last".to_string(), 1),
        ];

        assert!(plan_group_move(&groups, &groups[0].id, MoveDirection::Up)
            .unwrap()
            .is_none());
        assert!(plan_group_move(&groups, &groups[1].id, MoveDirection::Down)
            .unwrap()
            .is_none());
        assert!(plan_group_move(&groups, &groups[0].id, MoveDirection::Down)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_group_move_unknown_group() {
        let err = plan_group_move(&[], &GroupId::new(), MoveDirection::Down).unwrap_err();
        assert!(matches!(err, BacklogError::GroupNotFound(_)));
    }
}
