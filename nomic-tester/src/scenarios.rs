//! Scenario catalog: each entry drives the famine engine through one
//! scripted situation and checks the outcomes, messages and persisted
//! state against the game's rules.

use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail, ensure};
use chrono::{DateTime, TimeZone, Utc};
use colored::Colorize;
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use nomic_engine::{
    FARMERS_REQUIRED_PER_FARM, FamineConfig, FamineEngine, HUNGER_LABEL, NoticeRequest,
    PRODUCTION_EXPRESSION, PlayerData, PlayerOutcome, PlayerRepository, RngBundle, RollLimiter,
    RollOutcome, RollResponse, SUMMARY_MESSAGE, Scheduler, Unscheduled, WeeklySchedule,
    active_farms, evaluate, format_next_run, invalid_command_help, probe, production,
};

use crate::fixtures;
use crate::memory::MemoryRepository;

/// Per-run inputs every scenario check receives.
pub struct ScenarioCtx {
    pub seed: u64,
    /// Famine cycles the long-arc scenarios may consume.
    pub cycles: u32,
}

pub struct ScenarioSpec {
    pub key: &'static str,
    pub description: &'static str,
    run: fn(&ScenarioCtx) -> Result<()>,
}

/// One scenario execution against one seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

pub fn all_scenarios() -> Vec<ScenarioSpec> {
    vec![
        ScenarioSpec {
            key: "smoke",
            description: "One clean famine cycle over a mixed roster",
            run: check_smoke,
        },
        ScenarioSpec {
            key: "starvation",
            description: "Unfed hunger kills villagers and posts the starvation comment",
            run: check_starvation,
        },
        ScenarioSpec {
            key: "wipeout",
            description: "A fully starved village is removed and the player zeroed",
            run: check_wipeout,
        },
        ScenarioSpec {
            key: "famine-notice",
            description: "A production shortfall raises a labeled, assigned notice",
            run: check_famine_notice,
        },
        ScenarioSpec {
            key: "notice-resolution",
            description: "Fed players get their open notices closed with a comment",
            run: check_notice_resolution,
        },
        ScenarioSpec {
            key: "farm-staffing",
            description: "Active-farm math follows the farmers-per-farm rule",
            run: check_farm_staffing,
        },
        ScenarioSpec {
            key: "dice-grammar",
            description: "Roll requests answer in the exact comment format",
            run: check_dice_grammar,
        },
        ScenarioSpec {
            key: "roll-abuse",
            description: "Oversized rolls walk the warning ladder and then go silent",
            run: check_roll_abuse,
        },
        ScenarioSpec {
            key: "village-decline",
            description: "An unfarmed village declines from famine notice to wipeout",
            run: check_village_decline,
        },
        ScenarioSpec {
            key: "legacy-population",
            description: "Bare population counts normalize to categories on persist",
            run: check_legacy_population,
        },
        ScenarioSpec {
            key: "persistence-failure",
            description: "Failed snapshot writes are reported without stopping the cycle",
            run: check_persistence_failure,
        },
        ScenarioSpec {
            key: "determinism",
            description: "A fixed seed replays identical cycles",
            run: check_determinism,
        },
        ScenarioSpec {
            key: "schedule",
            description: "The weekly schedule lands on the next famine slot",
            run: check_schedule,
        },
    ]
}

pub fn get_scenario(key: &str) -> Option<ScenarioSpec> {
    all_scenarios().into_iter().find(|spec| spec.key == key)
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    all_scenarios()
        .iter()
        .map(|spec| (spec.key, spec.description))
        .collect()
}

pub fn scenario_keys() -> Vec<String> {
    all_scenarios()
        .iter()
        .map(|spec| spec.key.to_string())
        .collect()
}

/// Runs every named scenario against every seed, one result per pair.
pub fn run_scenarios(
    keys: &[String],
    seeds: &[u64],
    cycles: u32,
    verbose: bool,
) -> Vec<ScenarioResult> {
    let mut results = Vec::new();

    for key in keys {
        let Some(spec) = get_scenario(key) else {
            eprintln!("⚠️  Unknown scenario: {}", key.yellow());
            continue;
        };
        for &seed in seeds {
            results.push(run_one(&spec, seed, cycles, verbose));
        }
    }

    results
}

fn run_one(spec: &ScenarioSpec, seed: u64, cycles: u32, verbose: bool) -> ScenarioResult {
    if verbose {
        println!(
            "🧪 Testing scenario: {} (seed: {seed})",
            spec.key.bright_white()
        );
    }
    debug!("running scenario {} with seed {seed}", spec.key);

    let ctx = ScenarioCtx { seed, cycles };
    let start = Instant::now();
    let outcome = (spec.run)(&ctx);
    let duration = start.elapsed();

    match outcome {
        Ok(()) => {
            if verbose {
                println!("  ✅ {} passed ({duration:?})", spec.key);
            }
            ScenarioResult {
                scenario_name: spec.key.to_string(),
                seed,
                passed: true,
                failures: Vec::new(),
                duration,
            }
        }
        Err(error) => {
            let failure = format!("{error:#}");
            if verbose {
                println!("  ❌ {} failed: {}", spec.key, failure.clone().red());
            }
            ScenarioResult {
                scenario_name: spec.key.to_string(),
                seed,
                passed: false,
                failures: vec![failure],
                duration,
            }
        }
    }
}

fn engine_for(
    repo: &MemoryRepository,
    seed: u64,
) -> Result<FamineEngine<MemoryRepository>> {
    Ok(FamineEngine::with_seed(
        repo.clone(),
        FamineConfig::default(),
        seed,
    )?)
}

fn check_smoke(ctx: &ScenarioCtx) -> Result<()> {
    let repo = MemoryRepository::with_data(fixtures::mixed_roster());
    let mut engine = engine_for(&repo, ctx.seed)?;

    let report = engine.run_famine_cycle()?;

    ensure!(report.persisted, "the cycle must persist its final snapshot");
    ensure!(
        report.active_players() == 4,
        "the mixed roster has four players, saw {}",
        report.active_players()
    );
    ensure!(
        report.next_run.is_some(),
        "the weekly default always schedules the next cycle"
    );

    let journal = repo.journal();
    ensure!(
        journal.last().map(String::as_str) == Some(SUMMARY_MESSAGE),
        "the last snapshot write is the cycle summary, saw {journal:?}"
    );
    Ok(())
}

fn check_starvation(ctx: &ScenarioCtx) -> Result<()> {
    let repo = MemoryRepository::with_data(fixtures::roster(vec![fixtures::player(
        "ada",
        12,
        Some(fixtures::village("Eastwood", 1, 5, &[("general", 9)])),
    )]));
    let mut engine = engine_for(&repo, ctx.seed)?;

    let report = engine.run_famine_cycle()?;

    ensure!(
        report.outcomes[0].1
            == PlayerOutcome::Survived {
                starved: 5,
                production: 0,
                hunger: 4,
                famine: true,
            },
        "five deaths settle the carried deficit, got {:?}",
        report.outcomes[0].1
    );

    let journal = repo.journal();
    ensure!(
        journal[0] == "@ada's village, Eastwood had 5 people starve to death.",
        "starvation comment mismatch: {:?}",
        journal[0]
    );

    let stored = repo.data();
    let survivors = stored
        .player("ada")
        .and_then(|player| player.village.as_ref())
        .map(|village| village.total_population())
        .context("ada keeps her village")?;
    ensure!(survivors == 4, "nine villagers minus five deaths, got {survivors}");
    Ok(())
}

fn check_wipeout(ctx: &ScenarioCtx) -> Result<()> {
    let repo = MemoryRepository::with_data(fixtures::roster(vec![fixtures::player(
        "ada",
        12,
        Some(fixtures::village("Eastwood", 1, 5, &[("general", 3)])),
    )]));
    let mut engine = engine_for(&repo, ctx.seed)?;

    let report = engine.run_famine_cycle()?;

    ensure!(
        report.outcomes[0].1 == PlayerOutcome::WipedOut { starved: 3 },
        "three villagers cannot cover five hunger, got {:?}",
        report.outcomes[0].1
    );
    ensure!(report.wipeouts() == 1, "one wipeout expected");

    let ada = repo.data().player("ada").cloned().context("ada stays on the roster")?;
    ensure!(ada.village.is_none(), "the wiped village must be removed");
    ensure!(ada.points == 0, "wipeouts reset points, got {}", ada.points);

    let journal = repo.journal();
    ensure!(
        journal[1]
            == "@ada's village has all starved to death. Their village has been removed, \
                and their points have been reduced to 0.",
        "wipeout comment mismatch: {:?}",
        journal[1]
    );
    Ok(())
}

fn check_famine_notice(ctx: &ScenarioCtx) -> Result<()> {
    // Two staffed farms produce at most 48; sixty-four mouths guarantee
    // a shortfall whatever the dice say.
    let repo = MemoryRepository::with_data(fixtures::roster(vec![fixtures::player(
        "ada",
        3,
        Some(fixtures::village(
            "Eastwood",
            2,
            0,
            &[("farming", 4), ("general", 60)],
        )),
    )]));
    let mut engine = engine_for(&repo, ctx.seed)?;

    let report = engine.run_famine_cycle()?;

    ensure!(
        report.notices_raised() == 1,
        "exactly one famine notice expected, saw {}",
        report.notices_raised()
    );

    let requests = repo.notice_requests();
    ensure!(requests.len() == 1, "one notice request expected");
    let request = &requests[0];
    ensure!(
        request.title == "@ada feed your population!",
        "notice title mismatch: {:?}",
        request.title
    );
    ensure!(
        request.assignee == "ada",
        "the hungry player owns the notice, got {:?}",
        request.assignee
    );
    ensure!(
        request.labels == vec![HUNGER_LABEL.to_string()],
        "notices carry the hunger label, got {:?}",
        request.labels
    );
    ensure!(
        request.body.contains("'s village of Eastwood has famine in their population!"),
        "notice body mismatch: {:?}",
        request.body
    );
    ensure!(
        request.body.contains("There are 2 active farms"),
        "notice body reports the active farm count, got {:?}",
        request.body
    );
    Ok(())
}

fn check_notice_resolution(ctx: &ScenarioCtx) -> Result<()> {
    let repo = MemoryRepository::default();
    for login in ["ada", "brook"] {
        repo.create_famine_notice(&NoticeRequest {
            title: format!("@{login} feed your population!"),
            body: String::new(),
            assignee: login.to_string(),
            labels: vec![HUNGER_LABEL.to_string()],
        })?;
    }
    let engine = engine_for(&repo, ctx.seed)?;

    let fed = fixtures::player(
        "ada",
        3,
        Some(fixtures::village("Eastwood", 1, -2, &[("general", 5)])),
    );
    let closed = engine.resolve_famine_notices(&fed);
    ensure!(closed == 1, "one notice belongs to ada, closed {closed}");
    ensure!(
        repo.resolutions() == vec!["@ada has resolved their villages hungry population.".to_string()],
        "resolution comment mismatch: {:?}",
        repo.resolutions()
    );

    let remaining = repo.open_notices();
    ensure!(remaining.len() == 1, "brook's notice must stay open");
    ensure!(
        remaining[0].assignee.as_deref() == Some("brook"),
        "wrong notice closed"
    );

    let hungry = fixtures::player(
        "brook",
        2,
        Some(fixtures::village("Gully", 1, 4, &[("general", 5)])),
    );
    ensure!(
        engine.resolve_famine_notices(&hungry) == 0,
        "a player still in deficit keeps their notice"
    );
    let villageless = fixtures::player("brook", 0, None);
    ensure!(
        engine.resolve_famine_notices(&villageless) == 0,
        "a player without a village is left untouched"
    );
    Ok(())
}

fn check_farm_staffing(ctx: &ScenarioCtx) -> Result<()> {
    let staffing = [
        (10, 20, 10),
        (10, 0, 0),
        (10, 10, 5),
        (10, 11, 5),
        (10, 19, 9),
        (0, 20, 0),
        (3, 5, 2),
    ];
    for (farms, farmers, expected) in staffing {
        let active = active_farms(farms, farmers, FARMERS_REQUIRED_PER_FARM);
        ensure!(
            active == expected,
            "{farms} farms with {farmers} farmers should run {expected} farms, got {active}"
        );
    }

    let bundle = RngBundle::from_user_seed(ctx.seed);
    for _ in 0..32 {
        let harvest = production(2, PRODUCTION_EXPRESSION, &mut *bundle.production());
        ensure!(
            (26..=48).contains(&harvest),
            "two farms rolling 1d12+12 each stay within 26..=48, got {harvest}"
        );
    }
    ensure!(
        production(0, PRODUCTION_EXPRESSION, &mut *bundle.production()) == 0,
        "idle farms produce nothing"
    );
    Ok(())
}

/// Command-layer routing for one roll request: probe for a dice shape,
/// gate oversized die counts through the abuse ladder, then evaluate the
/// exact notation. An empty reply means the request was dropped without
/// comment.
fn route_roll<R>(
    login: &str,
    comment: &str,
    limiter: &mut RollLimiter,
    threshold: u32,
    rng: &mut R,
) -> String
where
    R: Rng + ?Sized,
{
    let Some(count) = probe(comment) else {
        return invalid_command_help(login);
    };
    if count > threshold {
        let verdict = limiter.record_oversized(login);
        return verdict.message(login).unwrap_or_default();
    }

    let mut response = RollResponse::for_request(login);
    let Some(outcome) = evaluate(comment, &mut response, rng) else {
        return invalid_command_help(login);
    };
    response.push_results(&outcome);
    limiter.record_accepted(login);
    response.message
}

fn check_dice_grammar(ctx: &ScenarioCtx) -> Result<()> {
    let bundle = RngBundle::from_user_seed(ctx.seed);
    let mut limiter = RollLimiter::new();
    let threshold = FamineConfig::default().oversized_roll_threshold;

    let reply = route_roll("ada", "3d6", &mut limiter, threshold, &mut *bundle.command());
    ensure!(
        reply.starts_with("@ada requested I roll 3d6.\n\nBelow are the results:\n\n`| "),
        "simple roll reply mismatch: {reply:?}"
    );
    ensure!(reply.ends_with(" |`"), "results table must close its row: {reply:?}");
    ensure!(
        reply.matches('|').count() == 4,
        "three dice print four separators: {reply:?}"
    );

    let reply = route_roll("ada", "2d8+5", &mut limiter, threshold, &mut *bundle.command());
    ensure!(
        reply.contains("2d8 and add 5 to the total."),
        "sum description mismatch: {reply:?}"
    );

    let reply = route_roll("ada", "2d8-5", &mut limiter, threshold, &mut *bundle.command());
    ensure!(
        reply.contains("2d8 and subtract 5 from the total."),
        "subtraction description mismatch: {reply:?}"
    );

    let reply = route_roll("ada", "2d8+", &mut limiter, threshold, &mut *bundle.command());
    ensure!(
        reply.contains("2d8 and add 0 to the total."),
        "a missing constant reads as zero: {reply:?}"
    );

    let reply = route_roll("ada", "3 D 6", &mut limiter, threshold, &mut *bundle.command());
    ensure!(
        reply.contains("requested I roll 3d6."),
        "whitespace and case variants normalize: {reply:?}"
    );

    let help = route_roll("ada", "banana", &mut limiter, threshold, &mut *bundle.command());
    ensure!(
        help == invalid_command_help("ada"),
        "unmatched chatter earns the help text: {help:?}"
    );

    let trailing = route_roll(
        "ada",
        "roll 3d6 please",
        &mut limiter,
        threshold,
        &mut *bundle.command(),
    );
    ensure!(
        trailing == invalid_command_help("ada"),
        "expressions must sit at the end of the request: {trailing:?}"
    );

    for _ in 0..32 {
        let mut response = RollResponse::default();
        match evaluate("2d8+5", &mut response, &mut *bundle.command()) {
            Some(RollOutcome::Total(total)) => ensure!(
                (7..=21).contains(&total),
                "2d8+5 out of range: {total}"
            ),
            other => bail!("2d8+5 should evaluate to a total, got {other:?}"),
        }
    }
    Ok(())
}

fn check_roll_abuse(ctx: &ScenarioCtx) -> Result<()> {
    let bundle = RngBundle::from_user_seed(ctx.seed);
    let mut limiter = RollLimiter::new();
    let threshold = FamineConfig::default().oversized_roll_threshold;

    let first = route_roll("ada", "200d20", &mut limiter, threshold, &mut *bundle.command());
    ensure!(
        first
            == "I'm sorry @ada, you seem to be trying to overload my circiuts. \
                Please don't do that, or I may have to hurt you.",
        "first warning mismatch: {first:?}"
    );

    let second = route_roll("ada", "200d20", &mut limiter, threshold, &mut *bundle.command());
    ensure!(
        second == "I have warned you @ada. Don't mistake me for a docile weakling.",
        "second warning mismatch: {second:?}"
    );

    let third = route_roll("ada", "200d20", &mut limiter, threshold, &mut *bundle.command());
    ensure!(third.is_empty(), "the third strike goes silent: {third:?}");
    ensure!(limiter.strikes("ada") == 3, "three strikes recorded");

    let other = route_roll("brook", "500d6", &mut limiter, threshold, &mut *bundle.command());
    ensure!(
        other.starts_with("I'm sorry @brook"),
        "logins are tracked independently: {other:?}"
    );

    let allowed = route_roll("ada", "100d6", &mut limiter, threshold, &mut *bundle.command());
    ensure!(
        allowed.contains("Below are the results:"),
        "die counts at the threshold still roll: {allowed:?}"
    );
    ensure!(
        limiter.strikes("ada") == 0,
        "an accepted roll clears the strike count"
    );

    let again = route_roll("ada", "200d20", &mut limiter, threshold, &mut *bundle.command());
    ensure!(again == first, "the ladder restarts after a clean roll: {again:?}");
    Ok(())
}

fn check_village_decline(ctx: &ScenarioCtx) -> Result<()> {
    ensure!(
        ctx.cycles >= 2,
        "the decline arc needs at least two cycles, got {}",
        ctx.cycles
    );

    let repo = MemoryRepository::with_data(fixtures::roster(vec![fixtures::player(
        "ada",
        9,
        Some(fixtures::village("Gully", 1, 0, &[("general", 10)])),
    )]));
    let mut engine = engine_for(&repo, ctx.seed)?;

    let report = engine.run_famine_cycle()?;
    ensure!(
        report.outcomes[0].1
            == PlayerOutcome::Survived {
                starved: 0,
                production: 0,
                hunger: 10,
                famine: true,
            },
        "an unfarmed village goes straight into famine, got {:?}",
        report.outcomes[0].1
    );
    ensure!(repo.open_notices().len() == 1, "the famine notice is on file");

    let report = engine.run_famine_cycle()?;
    ensure!(
        report.outcomes[0].1 == PlayerOutcome::WipedOut { starved: 10 },
        "the carried deficit starves everyone, got {:?}",
        report.outcomes[0].1
    );

    for _ in 2..ctx.cycles {
        let report = engine.run_famine_cycle()?;
        ensure!(
            report.outcomes[0].1 == PlayerOutcome::NoVillage,
            "a wiped player idles through later cycles, got {:?}",
            report.outcomes[0].1
        );
    }

    let ada = repo.data().player("ada").cloned().context("ada stays on the roster")?;
    ensure!(ada.village.is_none() && ada.points == 0, "the wipeout must persist");
    Ok(())
}

fn check_legacy_population(ctx: &ScenarioCtx) -> Result<()> {
    let data: PlayerData = serde_json::from_str(fixtures::LEGACY_PLAYER_FILE)?;
    let farmers = data
        .player("ada")
        .and_then(|player| player.village.as_ref())
        .map(nomic_engine::Village::farmer_count)
        .context("the legacy file carries a village")?;
    ensure!(farmers == 0, "bare counts hold no farmers, got {farmers}");

    let repo = MemoryRepository::with_data(data);
    let mut engine = engine_for(&repo, ctx.seed)?;
    let report = engine.run_famine_cycle()?;

    ensure!(
        report.notices_raised() == 1,
        "seven unfed mouths and zero farms mean famine"
    );
    let stored = serde_json::to_string(&repo.data())?;
    ensure!(
        stored.contains(r#""population":{"general":7}"#),
        "bare counts persist as a general category, stored {stored}"
    );
    Ok(())
}

fn check_persistence_failure(ctx: &ScenarioCtx) -> Result<()> {
    let repo = MemoryRepository::with_data(fixtures::mixed_roster());
    repo.fail_updates(true);
    let mut engine = engine_for(&repo, ctx.seed)?;

    let report = engine.run_famine_cycle()?;

    ensure!(
        report.active_players() == 4,
        "every player is still processed, saw {}",
        report.active_players()
    );
    ensure!(!report.persisted, "the summary write must be reported as failed");
    ensure!(
        report.outcomes[3].1
            == PlayerOutcome::Survived {
                starved: 6,
                production: 0,
                hunger: 4,
                famine: true,
            },
        "brook's starvation still resolves in memory, got {:?}",
        report.outcomes[3].1
    );
    ensure!(repo.journal().is_empty(), "no snapshot write may land");
    ensure!(
        repo.data() == fixtures::mixed_roster(),
        "the stored snapshot stays untouched"
    );
    ensure!(
        repo.open_notices().len() == 1,
        "notice filing is independent of snapshot writes"
    );

    // Storage comes back; the next cycle replays from the stale snapshot
    // and persists normally.
    repo.fail_updates(false);
    let report = engine.run_famine_cycle()?;
    ensure!(report.persisted, "recovered storage persists again");
    let journal = repo.journal();
    ensure!(
        journal.last().map(String::as_str) == Some(SUMMARY_MESSAGE),
        "the recovered cycle ends on the summary write, saw {journal:?}"
    );
    Ok(())
}

fn check_determinism(ctx: &ScenarioCtx) -> Result<()> {
    let build_roster = || {
        fixtures::roster(vec![
            fixtures::player(
                "ada",
                3,
                Some(fixtures::village(
                    "Eastwood",
                    1,
                    4,
                    &[("general", 9), ("farming", 3)],
                )),
            ),
            fixtures::player(
                "brook",
                2,
                Some(fixtures::village(
                    "Terrace",
                    3,
                    12,
                    &[("farming", 2), ("hunting", 5)],
                )),
            ),
        ])
    };

    let first_repo = MemoryRepository::with_data(build_roster());
    let second_repo = MemoryRepository::with_data(build_roster());
    let mut first = engine_for(&first_repo, ctx.seed)?;
    let mut second = engine_for(&second_repo, ctx.seed)?;

    // Command rolls draw from their own stream and must not nudge the
    // simulation.
    for _ in 0..5 {
        let mut response = RollResponse::default();
        let _ = evaluate("3d6", &mut response, &mut *second.rng().command());
    }

    for _ in 0..ctx.cycles.max(1) {
        let left = first.run_famine_cycle()?;
        let right = second.run_famine_cycle()?;
        ensure!(
            left.outcomes == right.outcomes,
            "the same seed must replay identical outcomes"
        );
    }
    ensure!(
        first_repo.data() == second_repo.data(),
        "replayed cycles must persist identical snapshots"
    );
    Ok(())
}

fn check_schedule(_ctx: &ScenarioCtx) -> Result<()> {
    let schedule = WeeklySchedule::default();

    let tuesday = utc_slot(2025, 1, 7, 12, 0)?;
    let next = schedule
        .next_run(tuesday)
        .context("weekly schedules always produce a next run")?;
    ensure!(
        next == utc_slot(2025, 1, 8, 15, 0)?,
        "the default slot is Wednesday 15:00 UTC, got {next}"
    );

    let following = schedule
        .next_run(next)
        .context("a run at the slot itself still schedules another")?;
    ensure!(
        following == utc_slot(2025, 1, 15, 15, 0)?,
        "an exact-slot instant rolls a full week, got {following}"
    );

    ensure!(
        format_next_run(Some(next)) == "1/8/25 15:00 UTC",
        "schedule formatting mismatch: {:?}",
        format_next_run(Some(next))
    );
    ensure!(format_next_run(None) == "NONE", "no schedule prints NONE");
    ensure!(
        Unscheduled.next_run(tuesday).is_none(),
        "Unscheduled never fires"
    );
    Ok(())
}

fn utc_slot(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Result<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .context("valid utc timestamp")
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_keys_are_unique() {
        let keys: Vec<_> = all_scenarios().iter().map(|spec| spec.key).collect();
        let mut deduped = keys.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(keys.len(), deduped.len());
    }

    #[test]
    fn every_scenario_passes_with_the_default_setup() {
        for spec in all_scenarios() {
            let ctx = ScenarioCtx {
                seed: 1337,
                cycles: 4,
            };
            if let Err(error) = (spec.run)(&ctx) {
                panic!("scenario {} failed: {error:#}", spec.key);
            }
        }
    }

    #[test]
    fn runner_collects_results_per_seed() {
        let results = run_scenarios(&["smoke".to_string()], &[1, 2], 4, false);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|result| result.passed));
        assert_eq!(results[0].scenario_name, "smoke");
        assert_eq!(results[0].seed, 1);
        assert_eq!(results[1].seed, 2);
    }

    #[test]
    fn runner_skips_unknown_scenarios() {
        let results = run_scenarios(&["nonsense".to_string()], &[1], 4, false);
        assert!(results.is_empty());
    }

    #[test]
    fn failing_checks_are_reported_not_panicked() {
        fn failing_check(_ctx: &ScenarioCtx) -> Result<()> {
            bail!("boom");
        }
        let spec = ScenarioSpec {
            key: "boom",
            description: "always fails",
            run: failing_check,
        };
        let result = run_one(&spec, 1, 4, false);
        assert!(!result.passed);
        assert_eq!(result.failures, vec!["boom".to_string()]);
    }

    #[test]
    fn results_serialize_durations_as_millis() {
        let result = ScenarioResult {
            scenario_name: "smoke".to_string(),
            seed: 1,
            passed: true,
            failures: Vec::new(),
            duration: Duration::from_millis(25),
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"duration\":25"));

        let back: ScenarioResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.duration, Duration::from_millis(25));
    }
}
