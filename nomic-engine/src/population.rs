//! Categorized village population and weighted-random depletion.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Category uncounted villagers fall into, drained first by starvation.
pub const GENERAL_CATEGORY: &str = "general";

/// Category whose members staff farms.
pub const FARMING_CATEGORY: &str = "farming";

/// Village population broken down by occupation category.
///
/// Older player files stored a bare head count. Deserialization folds that
/// shape into a single `general` entry, so everything past the serde
/// boundary works with categories only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PoolRepr")]
pub struct PopulationPool(BTreeMap<String, u32>);

#[derive(Deserialize)]
#[serde(untagged)]
enum PoolRepr {
    Count(u32),
    Categories(BTreeMap<String, u32>),
}

impl From<PoolRepr> for PopulationPool {
    fn from(repr: PoolRepr) -> Self {
        match repr {
            PoolRepr::Count(count) => Self::with_general(count),
            PoolRepr::Categories(categories) => Self(categories),
        }
    }
}

impl PopulationPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pool holding `count` villagers, all in the general category.
    #[must_use]
    pub fn with_general(count: u32) -> Self {
        let mut pool = Self::default();
        pool.insert(GENERAL_CATEGORY, count);
        pool
    }

    pub fn insert(&mut self, category: &str, count: u32) {
        self.0.insert(category.to_string(), count);
    }

    #[must_use]
    pub fn count(&self, category: &str) -> u32 {
        self.0.get(category).copied().unwrap_or(0)
    }

    /// Head count across every category.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.values().map(|&count| u64::from(count)).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(name, &count)| (name.as_str(), count))
    }

    /// Removes up to `amount` villagers and returns the unfulfilled
    /// remainder (0 when the pool covered the whole amount).
    ///
    /// The general category is drained first without touching the RNG; the
    /// rest is taken one villager at a time from a uniformly random
    /// non-empty category. A category that reaches zero leaves the eligible
    /// set but keeps its key in the map.
    pub fn reduce<R>(&mut self, amount: u64, rng: &mut R) -> u64
    where
        R: Rng + ?Sized,
    {
        let mut remaining = amount;

        if remaining > 0 {
            let head = self.count(GENERAL_CATEGORY);
            let drained = u32::try_from(remaining).map_or(head, |need| need.min(head));
            if drained > 0
                && let Some(general) = self.0.get_mut(GENERAL_CATEGORY)
            {
                *general -= drained;
                remaining -= u64::from(drained);
            }
        }

        if remaining == 0 {
            return 0;
        }

        let mut eligible: SmallVec<[String; 4]> = self
            .0
            .iter()
            .filter(|&(_, &count)| count > 0)
            .map(|(name, _)| name.clone())
            .collect();

        while remaining > 0 && !eligible.is_empty() {
            let slot = rng.gen_range(0..eligible.len());
            let Some(count) = self.0.get_mut(eligible[slot].as_str()) else {
                eligible.swap_remove(slot);
                continue;
            };
            *count -= 1;
            remaining -= 1;
            if *count == 0 {
                eligible.swap_remove(slot);
            }
        }

        remaining
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for PopulationPool {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, count)| (name.into(), count))
                .collect(),
        )
    }
}
