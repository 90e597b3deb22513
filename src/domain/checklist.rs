use crate::error::{BacklogError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of refinement checklist attached to a story
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChecklistKind {
    /// Definition of Ready
    Dor,
    Invest,
    Custom,
}

impl fmt::Display for ChecklistKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dor => write!(f, "DoR"),
            Self::Invest => write!(f, "INVEST"),
            Self::Custom => write!(f, "Custom"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub title: String,
    pub is_checked: bool,
    pub sort_order: i64,
}

/// A refinement checklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checklist {
    pub kind: ChecklistKind,
    pub title: String,
    pub items: Vec<ChecklistItem>,
}

impl Checklist {
    const INVEST_ITEMS: [&'static str; 6] = [
        "Independent",
        "Negotiable",
        "Valuable",
        "Estimable",
        "Small",
        "Testable",
    ];

    pub fn new(kind: ChecklistKind, title: String) -> Self {
        Self {
            kind,
            title,
            items: Vec::new(),
        }
    }

    /// The INVEST checklist every new story starts with, all items unchecked
    pub fn invest() -> Self {
        let mut checklist = Self::new(ChecklistKind::Invest, "INVEST checklist".to_string());
        for title in Self::INVEST_ITEMS {
            checklist.add_item(title.to_string());
        }
        checklist
    }

    /// Appends an unchecked item after the existing ones
    pub fn add_item(&mut self, title: String) {
        let sort_order = self
            .items
            .iter()
            .map(|item| item.sort_order)
            .max()
            .map_or(0, |max| max + 1);
        self.items.push(ChecklistItem {
            title,
            is_checked: false,
            sort_order,
        });
    }

    pub fn toggle_item(&mut self, index: usize) -> Result<()> {
        let item = self
            .items
            .get_mut(index)
            .ok_or(BacklogError::ChecklistItemNotFound(index))?;
        item.is_checked = !item.is_checked;
        Ok(())
    }

    /// Fraction of checked items, 0.0 for an empty checklist
    pub fn progress(&self) -> f64 {
        if self.items.is_empty() {
            return 0.0;
        }
        let checked = self.items.iter().filter(|item| item.is_checked).count();
        checked as f64 / self.items.len() as f64
    }

    pub fn is_complete(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|item| item.is_checked)
    }
}
