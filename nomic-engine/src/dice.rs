//! Dice expression evaluator for player roll commands and farm production.
//!
//! Three notations are recognized: simple (`3d6`), sum (`2d8+5`) and
//! subtraction (`2d8-5`). Matching is end-anchored and tried in that order;
//! only the first notation that matches contributes a result. A looser
//! unanchored [`probe`] exists for command layers that need to tell "a dice
//! request, just oversized or malformed" apart from unrelated chatter.

use std::sync::OnceLock;

use rand::Rng;
use regex::Regex;

const SIMPLE_PATTERN: &str = r"([0-9]+)\s*[dD]\s*([0-9]+)$";
const SUM_PATTERN: &str = r"([0-9]+)\s*[dD]\s*([0-9]+)\s*\+\s*([0-9]*)$";
const SUBTRACTION_PATTERN: &str = r"([0-9]+)\s*[dD]\s*([0-9]+)\s*\-\s*([0-9]*)$";
const BASE_PATTERN: &str = r"([0-9]+)\s*[dD]\s*([0-9]+)";

fn simple_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(SIMPLE_PATTERN).expect("simple pattern compiles"))
}

fn sum_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(SUM_PATTERN).expect("sum pattern compiles"))
}

fn subtraction_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(SUBTRACTION_PATTERN).expect("subtraction pattern compiles"))
}

fn base_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(BASE_PATTERN).expect("base pattern compiles"))
}

/// Result of one evaluated dice expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollOutcome {
    /// One entry per die, in roll order (simple form).
    Series(Vec<u32>),
    /// Aggregate of all dice plus or minus the constant (sum/subtraction).
    Total(i64),
}

/// Reply accumulator a roll request builds its comment text into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollResponse {
    pub message: String,
}

impl RollResponse {
    /// Accumulator opened with the standard request preamble.
    #[must_use]
    pub fn for_request(login: &str) -> Self {
        Self {
            message: format!("@{login} requested I roll "),
        }
    }

    /// Appends the results table for an evaluated outcome.
    pub fn push_results(&mut self, outcome: &RollOutcome) {
        self.message.push_str("\n\nBelow are the results:\n\n`");
        match outcome {
            RollOutcome::Series(values) => {
                for value in values {
                    self.message.push_str(&format!("| {value} "));
                }
                self.message.push('|');
            }
            RollOutcome::Total(total) => {
                self.message.push_str(&format!("| {total} |"));
            }
        }
        self.message.push('`');
    }
}

/// Evaluates `comment` against the notations in declaration order and
/// returns the first match, appending its instruction description to
/// `response`. `None` means no notation matched.
pub fn evaluate<R>(comment: &str, response: &mut RollResponse, rng: &mut R) -> Option<RollOutcome>
where
    R: Rng + ?Sized,
{
    if let Some(outcome) = simple(comment, response, rng) {
        return Some(outcome);
    }
    if let Some(outcome) = sum(comment, response, rng) {
        return Some(outcome);
    }
    subtraction(comment, response, rng)
}

/// Simple form: `<count>d<sides>` at the end of the comment.
pub fn simple<R>(comment: &str, response: &mut RollResponse, rng: &mut R) -> Option<RollOutcome>
where
    R: Rng + ?Sized,
{
    let caps = simple_pattern().captures(comment)?;
    let count: u32 = caps.get(1)?.as_str().parse().ok()?;
    let sides: u32 = caps.get(2)?.as_str().parse().ok()?;

    response.message.push_str(&format!("{count}d{sides}."));

    let series = (0..count).map(|_| roll_die(sides, rng)).collect();
    Some(RollOutcome::Series(series))
}

/// Sum form: `<count>d<sides>+<const>`; an absent constant adds 0.
pub fn sum<R>(comment: &str, response: &mut RollResponse, rng: &mut R) -> Option<RollOutcome>
where
    R: Rng + ?Sized,
{
    let (count, sides, constant) = parse_aggregate(sum_pattern(), comment)?;

    response
        .message
        .push_str(&format!("{count}d{sides} and add {constant} to the total."));

    let total = roll_total(count, sides, rng).saturating_add(i64::from(constant));
    Some(RollOutcome::Total(total))
}

/// Subtraction form: `<count>d<sides>-<const>`; the total may go negative.
pub fn subtraction<R>(comment: &str, response: &mut RollResponse, rng: &mut R) -> Option<RollOutcome>
where
    R: Rng + ?Sized,
{
    let (count, sides, constant) = parse_aggregate(subtraction_pattern(), comment)?;

    response.message.push_str(&format!(
        "{count}d{sides} and subtract {constant} from the total."
    ));

    let total = roll_total(count, sides, rng).saturating_sub(i64::from(constant));
    Some(RollOutcome::Total(total))
}

/// Loose "contains a dice roll" check for command layers, matched anywhere
/// in the comment. Returns the die count, saturated to `u32::MAX` when the
/// digits overflow, so oversized requests still register as dice requests.
#[must_use]
pub fn probe(comment: &str) -> Option<u32> {
    let caps = base_pattern().captures(comment)?;
    let count = caps.get(1)?.as_str().parse().unwrap_or(u32::MAX);
    Some(count)
}

/// Whether `text` is a valid sum-form expression (used to vet configured
/// production expressions up front).
#[must_use]
pub fn is_sum_expression(text: &str) -> bool {
    sum_pattern().is_match(text)
}

/// Rolls a sum-form expression without description side effects. Farm
/// production uses this once per active farm.
pub(crate) fn sum_total<R>(expression: &str, rng: &mut R) -> Option<i64>
where
    R: Rng + ?Sized,
{
    let (count, sides, constant) = parse_aggregate(sum_pattern(), expression)?;
    Some(roll_total(count, sides, rng).saturating_add(i64::from(constant)))
}

/// Help text returned for a request that matched no notation.
#[must_use]
pub fn invalid_command_help(login: &str) -> String {
    let mut message = format!(
        "I'm sorry @{login}, the request entered did not match any of my logic circuits. \
         Please try something which matches one of the following:\n\n```\n"
    );
    for pattern in [SIMPLE_PATTERN, SUM_PATTERN, SUBTRACTION_PATTERN] {
        message.push_str(pattern);
        message.push_str("\n\n");
    }
    message.push_str("```");
    message
}

fn parse_aggregate(pattern: &Regex, comment: &str) -> Option<(u32, u32, u32)> {
    let caps = pattern.captures(comment)?;
    let count: u32 = caps.get(1)?.as_str().parse().ok()?;
    let sides: u32 = caps.get(2)?.as_str().parse().ok()?;
    let constant = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
    let constant: u32 = if constant.is_empty() {
        0
    } else {
        constant.parse().ok()?
    };
    Some((count, sides, constant))
}

fn roll_total<R>(count: u32, sides: u32, rng: &mut R) -> i64
where
    R: Rng + ?Sized,
{
    (0..count)
        .map(|_| i64::from(roll_die(sides, rng)))
        .fold(0i64, i64::saturating_add)
}

// A die always has at least one face; `0` sides rolls as a one-sided die.
fn roll_die<R>(sides: u32, rng: &mut R) -> u32
where
    R: Rng + ?Sized,
{
    rng.gen_range(1..=sides.max(1))
}
