//! Farm staffing and production rolls.

use rand::Rng;

use crate::dice;

/// Farmers needed to keep one farm producing.
pub const FARMERS_REQUIRED_PER_FARM: u32 = 2;

/// Dice expression rolled once per active farm.
pub const PRODUCTION_EXPRESSION: &str = "1d12+12";

/// Number of farms with full staffing. Farms short of farmers idle one by
/// one: `active = farms - ceil(max(0, farms*R - farmers) / R)`, floored at
/// zero, with `R` farmers required per farm.
#[must_use]
pub fn active_farms(farms: u32, farmers: u32, farmers_per_farm: u32) -> u32 {
    let per_farm = u64::from(farmers_per_farm.max(1));
    let needed = u64::from(farms) * per_farm;
    let understaffed = needed.saturating_sub(u64::from(farmers));
    let idle = understaffed.div_ceil(per_farm);
    let active = u64::from(farms).saturating_sub(idle);
    u32::try_from(active).unwrap_or(farms)
}

/// Total food produced this cycle: one roll of `expression` (sum form) per
/// active farm. Zero farms never touches the RNG.
pub fn production<R>(active_farms: u32, expression: &str, rng: &mut R) -> i64
where
    R: Rng + ?Sized,
{
    (0..active_farms)
        .map(|_| dice::sum_total(expression, rng).unwrap_or(0))
        .fold(0i64, i64::saturating_add)
}
