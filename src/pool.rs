//! Special prompt pool
//!
//! Draws special prompts without repetition until the whole list has been
//! used, then starts over.

use crate::catalog::Catalog;
use crate::chance::Chance;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Outcome of one pool draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialDraw {
    /// Position of the prompt in the catalog's special list
    pub index: usize,
    pub prompt: String,
    /// Whether this draw found the pool exhausted and started a new round
    pub exhausted: bool,
}

/// Tracks which special prompts were used since the last reset
#[derive(Debug, Clone)]
pub struct SpecialPool {
    catalog: Arc<Catalog>,
    used: BTreeSet<usize>,
}

impl SpecialPool {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        SpecialPool {
            catalog,
            used: BTreeSet::new(),
        }
    }

    /// Draw one prompt uniformly from those not yet used
    ///
    /// When every prompt has been used, the pool is cleared and the pick is
    /// made from the entire list; the picked prompt is then the only used one.
    /// That pick may equal the prompt drawn just before the reset.
    pub fn draw<C: Chance + ?Sized>(&mut self, chance: &mut C) -> SpecialDraw {
        let specials = self.catalog.specials();
        let available: Vec<usize> = (0..specials.len())
            .filter(|i| !self.used.contains(i))
            .collect();

        let (index, exhausted) = if available.is_empty() {
            self.used.clear();
            (chance.pick(specials.len()), true)
        } else {
            (available[chance.pick(available.len())], false)
        };
        self.used.insert(index);

        log::trace!(
            "special draw #{} (exhausted: {}, used {}/{})",
            index,
            exhausted,
            self.used.len(),
            specials.len()
        );

        SpecialDraw {
            index,
            prompt: specials[index].clone(),
            exhausted,
        }
    }

    /// Forget every used prompt
    pub fn reset(&mut self) {
        self.used.clear();
    }

    pub fn used_count(&self) -> usize {
        self.used.len()
    }

    pub fn total(&self) -> usize {
        self.catalog.specials().len()
    }

    pub fn remaining(&self) -> usize {
        self.total() - self.used_count()
    }

    pub fn is_used(&self, index: usize) -> bool {
        self.used.contains(&index)
    }

    /// Used prompts in list order
    pub fn used(&self) -> impl Iterator<Item = &str> + '_ {
        self.used
            .iter()
            .map(|&i| self.catalog.specials()[i].as_str())
    }
}
