//! Famine-cycle configuration, message catalog and per-player step pieces.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dice;
use crate::farm;
use crate::limiter;
use crate::player::Village;
use crate::repository::NoticeRequest;
use crate::schedule::WeeklySchedule;

/// Fixed summary message for the once-per-cycle snapshot persistence.
pub const SUMMARY_MESSAGE: &str = "Feeding the population.";

/// Label famine notices are filed under.
pub const HUNGER_LABEL: &str = "Hunger";

/// Tunables for the famine cycle and the roll command policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FamineConfig {
    /// Sum-form dice expression rolled once per active farm.
    pub production_expression: String,
    /// Farmers required to keep one farm producing.
    pub farmers_per_farm: u32,
    /// Die counts above this are treated as oversized roll requests.
    pub oversized_roll_threshold: u32,
    pub schedule: WeeklySchedule,
    pub notices: NoticesConfig,
}

impl Default for FamineConfig {
    fn default() -> Self {
        Self {
            production_expression: farm::PRODUCTION_EXPRESSION.to_string(),
            farmers_per_farm: farm::FARMERS_REQUIRED_PER_FARM,
            oversized_roll_threshold: limiter::OVERSIZED_DIE_COUNT,
            schedule: WeeklySchedule::default(),
            notices: NoticesConfig::default(),
        }
    }
}

impl FamineConfig {
    /// Checks every field against its allowed range.
    ///
    /// # Errors
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !dice::is_sum_expression(&self.production_expression) {
            return Err(ConfigError::ProductionExpression {
                expression: self.production_expression.clone(),
            });
        }
        if self.farmers_per_farm == 0 {
            return Err(ConfigError::ZeroField {
                field: "farmers_per_farm",
            });
        }
        if self.notices.page_size == 0 {
            return Err(ConfigError::ZeroField {
                field: "notices.page_size",
            });
        }
        let schedule = &self.schedule;
        for (field, value, max) in [
            ("schedule.weekday", schedule.weekday, 7),
            ("schedule.hour", schedule.hour, 24),
            ("schedule.minute", schedule.minute, 60),
        ] {
            if value >= max {
                return Err(ConfigError::FieldRange { field, value, max });
            }
        }
        Ok(())
    }
}

/// Famine-notice listing and filing options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoticesConfig {
    pub label: String,
    /// Page size used when scanning open notices for resolution.
    pub page_size: u32,
}

impl Default for NoticesConfig {
    fn default() -> Self {
        Self {
            label: HUNGER_LABEL.to_string(),
            page_size: 100,
        }
    }
}

/// Invalid famine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("production expression {expression:?} is not a sum-form dice roll")]
    ProductionExpression { expression: String },
    #[error("{field} must be at least 1")]
    ZeroField { field: &'static str },
    #[error("{field} must be below {max}, got {value}")]
    FieldRange {
        field: &'static str,
        value: u8,
        max: u8,
    },
}

/// Where one player landed after a famine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerOutcome {
    /// Player has no village to feed.
    NoVillage,
    /// Village exists but nobody lives there.
    NoPopulation,
    /// Starvation emptied the village; it was removed and points reset.
    WipedOut { starved: u64 },
    /// Village made it through the cycle.
    Survived {
        starved: u64,
        production: i64,
        /// Hunger balance after production and demand.
        hunger: i64,
        /// Whether a famine notice was raised this cycle.
        famine: bool,
    },
}

/// Deaths applied for last cycle's unmet hunger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarvationReport {
    pub deaths: u64,
    pub message: String,
}

/// Kills `min(total population, hunger)` villagers, zeroes the hunger
/// balance and reports the starvation message to persist.
///
/// Callers only invoke this with a positive hunger balance; the deficit
/// being settled here is the one carried over from the previous cycle.
pub fn apply_starvation<R>(login: &str, village: &mut Village, rng: &mut R) -> StarvationReport
where
    R: Rng + ?Sized,
{
    let hunger = u64::try_from(village.hunger).unwrap_or(0);
    let deaths = village.total_population().min(hunger);
    let message = messages::starvation(login, &village.name, deaths);

    village.population.reduce(deaths, rng);
    village.hunger = 0;

    StarvationReport { deaths, message }
}

/// This cycle's farm output, already applied to the hunger balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Harvest {
    pub active_farms: u32,
    pub production: i64,
}

/// Rolls production for the village's active farms and credits it against
/// the hunger balance (which may go negative, banking a surplus).
pub fn apply_production<R>(village: &mut Village, config: &FamineConfig, rng: &mut R) -> Harvest
where
    R: Rng + ?Sized,
{
    let active_farms = farm::active_farms(
        village.farms,
        village.farmer_count(),
        config.farmers_per_farm,
    );
    let production = farm::production(active_farms, &config.production_expression, rng);
    village.hunger = village.hunger.saturating_sub(production);
    Harvest {
        active_farms,
        production,
    }
}

/// Adds one unit of demand per villager to the hunger balance and returns
/// the head count.
pub fn accrue_demand(village: &mut Village) -> u64 {
    let population = village.total_population();
    let demand = i64::try_from(population).unwrap_or(i64::MAX);
    village.hunger = village.hunger.saturating_add(demand);
    population
}

/// Builds the notice payload for a village left hungry after harvest.
#[must_use]
pub fn famine_notice(login: &str, village: &Village, harvest: Harvest, label: &str) -> NoticeRequest {
    NoticeRequest {
        title: messages::famine_title(login),
        body: messages::famine(
            login,
            &village.name,
            harvest.active_farms,
            harvest.production,
            village.hunger,
        ),
        assignee: login.to_string(),
        labels: vec![label.to_string()],
    }
}

pub mod messages {
    //! Player-facing message catalog, kept word for word across rewrites.

    #[must_use]
    pub fn famine_title(login: &str) -> String {
        format!("@{login} feed your population!")
    }

    #[must_use]
    pub fn famine(
        login: &str,
        village_name: &str,
        farm_count: u32,
        production: i64,
        hunger_count: i64,
    ) -> String {
        format!(
            "@{login}'s village of {village_name} has famine in their population! \n\n \
             There are {farm_count} active farms, which produced enough to feed \
             {production} people this week. An additional {hunger_count} people need food."
        )
    }

    #[must_use]
    pub fn starvation(login: &str, village_name: &str, death_count: u64) -> String {
        format!("@{login}'s village, {village_name} had {death_count} people starve to death.")
    }

    #[must_use]
    pub fn wipe_out(login: &str) -> String {
        format!(
            "@{login}'s village has all starved to death. Their village has been removed, \
             and their points have been reduced to 0."
        )
    }

    #[must_use]
    pub fn resolved(login: &str) -> String {
        format!("@{login} has resolved their villages hungry population.")
    }
}
