//! Prompt generation
//!
//! A standard draw rolls once to decide how many categories constrain the
//! song, picks that many distinct categories, and takes one non-free option
//! from each. A lone constraint is paired with a special prompt.

use crate::catalog::Catalog;
use crate::chance::Chance;
use crate::pool::SpecialPool;
use crate::prompt::{GenerationResult, PromptItem};
use std::sync::Arc;

/// Rolls below this produce the unconstrained outcome
pub const UNCONSTRAINED_BELOW: f64 = 0.05;
/// Rolls below this (and not unconstrained) produce one constraint
pub const ONE_BELOW: f64 = 0.55;
/// Rolls below this (and above [`ONE_BELOW`]) produce two constraints
pub const TWO_BELOW: f64 = 0.85;

/// Number of category constraints for a roll, or `None` for the
/// unconstrained outcome
///
/// The outcomes are weighted 5% unconstrained, 50% one, 30% two, 15% three.
pub fn constraint_count(roll: f64) -> Option<usize> {
    if roll < UNCONSTRAINED_BELOW {
        None
    } else if roll < ONE_BELOW {
        Some(1)
    } else if roll < TWO_BELOW {
        Some(2)
    } else {
        Some(3)
    }
}

#[derive(Debug, Clone)]
pub struct Generator {
    catalog: Arc<Catalog>,
}

impl Generator {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Generator { catalog }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Produce a standard result
    ///
    /// Items come out in catalog category order regardless of the order the
    /// categories were picked in. When the catalog has fewer categories than
    /// the rolled count, every category is used.
    pub fn standard<C: Chance + ?Sized>(
        &self,
        pool: &mut SpecialPool,
        chance: &mut C,
    ) -> GenerationResult {
        let roll = chance.roll();
        let Some(count) = constraint_count(roll) else {
            log::debug!("roll {:.3}: unconstrained", roll);
            return vec![PromptItem::unconstrained(self.catalog.unconstrained())];
        };

        let categories = self.catalog.categories();
        let count = count.min(categories.len());
        log::debug!("roll {:.3}: {} constraint(s)", roll, count);

        let mut selected = Vec::with_capacity(count);
        while selected.len() < count {
            let index = chance.pick(categories.len());
            if !selected.contains(&index) {
                selected.push(index);
            }
        }

        let mut result = GenerationResult::with_capacity(count + 1);
        for (index, category) in categories.iter().enumerate() {
            if !selected.contains(&index) {
                continue;
            }
            let pick = chance.pick(category.choice_count());
            if let Some(value) = category.choice(pick) {
                result.push(PromptItem::named(category.name(), value));
            }
        }

        if result.len() == 1 {
            let draw = pool.draw(chance);
            result.push(PromptItem::special(draw.prompt));
        }

        result
    }

    /// Produce a result holding a single special prompt
    pub fn special_only<C: Chance + ?Sized>(
        &self,
        pool: &mut SpecialPool,
        chance: &mut C,
    ) -> GenerationResult {
        let draw = pool.draw(chance);
        vec![PromptItem::special(draw.prompt)]
    }
}
