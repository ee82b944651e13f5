//! Nomic Famine Engine
//!
//! Core simulation logic for Nomic, the issue-driven village strategy game.
//! This crate covers the weekly famine cycle (farm production, hunger,
//! starvation, wipeout) plus the dice roller behind the `/roll` command,
//! with no networking or UI attached.

pub mod dice;
pub mod famine;
pub mod farm;
pub mod limiter;
pub mod player;
pub mod population;
pub mod repository;
pub mod rng;
pub mod schedule;

// Re-export commonly used types
pub use dice::{
    RollOutcome, RollResponse, evaluate, invalid_command_help, is_sum_expression, probe, simple,
    subtraction, sum,
};
pub use famine::{
    ConfigError, FamineConfig, HUNGER_LABEL, Harvest, NoticesConfig, PlayerOutcome, SUMMARY_MESSAGE,
    StarvationReport, accrue_demand, apply_production, apply_starvation, famine_notice, messages,
};
pub use farm::{FARMERS_REQUIRED_PER_FARM, PRODUCTION_EXPRESSION, active_farms, production};
pub use limiter::{AbuseVerdict, OVERSIZED_DIE_COUNT, RollLimiter};
pub use player::{Player, PlayerData, Village};
pub use population::{FARMING_CATEGORY, GENERAL_CATEGORY, PopulationPool};
pub use repository::{FamineNotice, NoticeQuery, NoticeRequest, PlayerRepository};
pub use rng::{CountingRng, RngBundle};
pub use schedule::{Scheduler, Unscheduled, WeeklySchedule, format_next_run};

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use thiserror::Error;

/// Failure that aborts a famine cycle before any player is processed.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("failed to load player data")]
    Snapshot(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// What one famine cycle did, player by player.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    /// Per-player outcomes in snapshot order.
    pub outcomes: Vec<(String, PlayerOutcome)>,
    /// Whether the end-of-cycle snapshot write succeeded.
    pub persisted: bool,
    /// Next scheduled run, if any.
    pub next_run: Option<DateTime<Utc>>,
}

impl CycleReport {
    #[must_use]
    pub fn active_players(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn total_starved(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|(_, outcome)| match outcome {
                PlayerOutcome::WipedOut { starved } | PlayerOutcome::Survived { starved, .. } => {
                    *starved
                }
                _ => 0,
            })
            .sum()
    }

    #[must_use]
    pub fn wipeouts(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, PlayerOutcome::WipedOut { .. }))
            .count()
    }

    #[must_use]
    pub fn notices_raised(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, PlayerOutcome::Survived { famine: true, .. }))
            .count()
    }
}

/// Famine simulation engine bound to a player repository.
pub struct FamineEngine<R>
where
    R: PlayerRepository,
{
    repository: R,
    config: FamineConfig,
    rng: RngBundle,
}

impl<R> FamineEngine<R>
where
    R: PlayerRepository,
{
    /// Create an engine with an OS-sourced seed.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration fails validation.
    pub fn new(repository: R, config: FamineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            repository,
            config,
            rng: RngBundle::from_entropy(),
        })
    }

    /// Create an engine with a fixed seed for reproducible cycles.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration fails validation.
    pub fn with_seed(repository: R, config: FamineConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            repository,
            config,
            rng: RngBundle::from_user_seed(seed),
        })
    }

    /// Replace every RNG stream from a fresh seed.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = RngBundle::from_user_seed(seed);
    }

    #[must_use]
    pub fn config(&self) -> &FamineConfig {
        &self.config
    }

    #[must_use]
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// RNG streams, for hosts that also serve command rolls.
    #[must_use]
    pub fn rng(&self) -> &RngBundle {
        &self.rng
    }

    /// Next scheduled famine run under the configured weekly rule.
    #[must_use]
    pub fn next_run(&self) -> Option<DateTime<Utc>> {
        self.config.schedule.next_run(Utc::now())
    }

    /// Runs one full famine cycle: loads the snapshot, feeds every active
    /// player, persists the mutated snapshot once and reports the next
    /// scheduled run.
    ///
    /// Per-player persistence failures are logged and do not stop the
    /// cycle; only the initial snapshot load can abort it.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::Snapshot`] when the player data cannot be
    /// loaded.
    pub fn run_famine_cycle(&mut self) -> Result<CycleReport, CycleError> {
        info!("Performing Hunger Process...");

        let mut data = self
            .repository
            .load_player_data()
            .map_err(|error| CycleError::Snapshot(Box::new(error)))?;

        if data.active_players.is_empty() {
            warn!("No active players found!");
            return Ok(CycleReport::default());
        }

        info!(" :: {} active players :: ", data.active_players.len());

        let mut outcomes = Vec::with_capacity(data.active_players.len());
        for index in 0..data.active_players.len() {
            let login = data.active_players[index].name.clone();
            let outcome = self.process_player(&mut data, index);
            outcomes.push((login, outcome));
        }

        let persisted = match self.repository.update_player_file(&data, SUMMARY_MESSAGE) {
            Ok(()) => true,
            Err(error) => {
                error!("failed to persist player data: {error}");
                false
            }
        };

        let next_run = self.next_run();
        info!(
            "Finished Hunger Process. Next Hunger Job Scheduled to run at {}",
            format_next_run(next_run)
        );

        Ok(CycleReport {
            outcomes,
            persisted,
            next_run,
        })
    }

    /// One player's famine step. Starvation settles last cycle's deficit
    /// before this cycle's production is rolled; a village emptied by
    /// starvation is wiped before any farming happens.
    fn process_player(&self, data: &mut PlayerData, index: usize) -> PlayerOutcome {
        let login = data.active_players[index].name.clone();

        let starvation = {
            let player = &mut data.active_players[index];
            let Some(village) = player.village.as_mut() else {
                debug!("  - {login}: NO VILLAGE");
                return PlayerOutcome::NoVillage;
            };
            if village.population.is_empty() {
                debug!("  - {login}: NO POPULATION");
                return PlayerOutcome::NoPopulation;
            }
            if village.hunger > 0 {
                Some(apply_starvation(
                    &login,
                    village,
                    &mut *self.rng.depletion(),
                ))
            } else {
                None
            }
        };

        let mut starved = 0;
        if let Some(report) = &starvation {
            starved = report.deaths;
            debug!("  - {}", report.message);
            if let Err(error) = self.repository.update_player_file(data, &report.message) {
                error!("failed to persist starvation for {login}: {error}");
            }
        }

        let wiped = data.active_players[index]
            .village
            .as_ref()
            .is_some_and(|village| village.total_population() == 0);
        if wiped {
            let player = &mut data.active_players[index];
            player.village = None;
            player.points = 0;

            let message = messages::wipe_out(&login);
            debug!("  - {message}");
            if let Err(error) = self.repository.update_player_file(data, &message) {
                error!("failed to persist wipeout for {login}: {error}");
            }
            return PlayerOutcome::WipedOut { starved };
        }

        let player = &mut data.active_players[index];
        let Some(village) = player.village.as_mut() else {
            return PlayerOutcome::NoVillage;
        };

        let harvest = apply_production(village, &self.config, &mut *self.rng.production());
        debug!(
            "  - Processing Farm Production for {login}: {} - {}",
            harvest.active_farms, harvest.production
        );

        let population = accrue_demand(village);
        let hunger = village.hunger;
        debug!("  - {login}: population - {population} | hunger: {hunger}");

        let notice = (hunger > 0)
            .then(|| famine_notice(&login, village, harvest, &self.config.notices.label));

        if let Some(request) = &notice {
            debug!("  - {}", request.body);
            if let Err(error) = self.repository.create_famine_notice(request) {
                error!("failed to raise famine notice for {login}: {error}");
            }
        }

        PlayerOutcome::Survived {
            starved,
            production: harvest.production,
            hunger,
            famine: notice.is_some(),
        }
    }

    /// Closes open famine notices assigned to a player whose hunger is
    /// back at or below zero, posting the resolution comment on each
    /// first. Returns how many notices were closed.
    ///
    /// Players still hungry, or without a village, are left untouched.
    pub fn resolve_famine_notices(&self, player: &Player) -> u32 {
        let Some(village) = player.village.as_ref() else {
            return 0;
        };
        if village.hunger > 0 {
            return 0;
        }

        let query = NoticeQuery {
            label: self.config.notices.label.clone(),
            per_page: self.config.notices.page_size,
        };
        let notices = match self.repository.list_open_famine_notices(&query) {
            Ok(notices) => notices,
            Err(error) => {
                error!("failed to list open famine notices: {error}");
                return 0;
            }
        };

        let message = messages::resolved(&player.name);
        let mut closed = 0;
        for notice in notices
            .iter()
            .filter(|notice| notice.assignee.as_deref() == Some(player.name.as_str()))
        {
            match self.repository.resolve_famine_notice(notice, &message) {
                Ok(()) => closed += 1,
                Err(error) => {
                    error!("failed to resolve famine notice #{}: {error}", notice.id);
                }
            }
        }
        closed
    }
}
