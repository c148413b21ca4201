/// Prompt items produced by the generator
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a prompt line came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "category", rename_all = "lowercase")]
pub enum Slot {
    /// The "no constraint at all" outcome
    Unconstrained,
    /// An option of a named catalog category
    Named(String),
    /// A draw from the special prompt pool
    Special,
}

/// One revealed constraint line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptItem {
    pub slot: Slot,
    pub value: String,
}

/// Items of one generation, in reveal order
pub type GenerationResult = Vec<PromptItem>;

impl PromptItem {
    pub fn unconstrained(value: impl Into<String>) -> Self {
        PromptItem {
            slot: Slot::Unconstrained,
            value: value.into(),
        }
    }

    pub fn named(category: impl Into<String>, value: impl Into<String>) -> Self {
        PromptItem {
            slot: Slot::Named(category.into()),
            value: value.into(),
        }
    }

    pub fn special(value: impl Into<String>) -> Self {
        PromptItem {
            slot: Slot::Special,
            value: value.into(),
        }
    }

    pub fn is_special(&self) -> bool {
        self.slot == Slot::Special
    }

    /// Category name, if this item came from a named category
    pub fn category(&self) -> Option<&str> {
        match &self.slot {
            Slot::Named(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for PromptItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slot {
            Slot::Unconstrained => write!(f, "{}", self.value),
            Slot::Named(category) => write!(f, "{}: {}", category, self.value),
            Slot::Special => write!(f, "special: {}", self.value),
        }
    }
}
