//! Rate limiting for oversized roll requests.
//!
//! Strike counts live for the limiter's lifetime only; the game forgives
//! everyone on restart.

use std::collections::HashMap;

/// Die counts above this are treated as oversized requests.
pub const OVERSIZED_DIE_COUNT: u32 = 100;

/// Policy outcome for one oversized request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbuseVerdict {
    /// First strike.
    Warning,
    /// Second strike.
    FinalWarning,
    /// Third strike onward; the request is dropped without a reply.
    Ignored,
}

impl AbuseVerdict {
    /// Reply text for this verdict; `None` means stay silent.
    #[must_use]
    pub fn message(&self, login: &str) -> Option<String> {
        match self {
            Self::Warning => Some(format!(
                "I'm sorry @{login}, you seem to be trying to overload my circiuts. \
                 Please don't do that, or I may have to hurt you."
            )),
            Self::FinalWarning => Some(format!(
                "I have warned you @{login}. Don't mistake me for a docile weakling."
            )),
            Self::Ignored => None,
        }
    }
}

/// Per-login strike counter for oversized rolls.
#[derive(Debug, Clone, Default)]
pub struct RollLimiter {
    strikes: HashMap<String, u32>,
}

impl RollLimiter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an oversized request and returns the verdict for it.
    pub fn record_oversized(&mut self, login: &str) -> AbuseVerdict {
        let strikes = self.strikes.entry(login.to_string()).or_insert(0);
        *strikes = strikes.saturating_add(1);
        match *strikes {
            1 => AbuseVerdict::Warning,
            2 => AbuseVerdict::FinalWarning,
            _ => AbuseVerdict::Ignored,
        }
    }

    /// Clears the strike count after an accepted normal roll.
    pub fn record_accepted(&mut self, login: &str) {
        self.strikes.insert(login.to_string(), 0);
    }

    #[must_use]
    pub fn strikes(&self, login: &str) -> u32 {
        self.strikes.get(login).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strikes_escalate_then_go_silent() {
        let mut limiter = RollLimiter::new();
        assert_eq!(limiter.record_oversized("ada"), AbuseVerdict::Warning);
        assert_eq!(limiter.record_oversized("ada"), AbuseVerdict::FinalWarning);
        assert_eq!(limiter.record_oversized("ada"), AbuseVerdict::Ignored);
        assert_eq!(limiter.record_oversized("ada"), AbuseVerdict::Ignored);
        assert_eq!(limiter.strikes("ada"), 4);
    }

    #[test]
    fn verdict_messages() {
        let warning = AbuseVerdict::Warning.message("ada").unwrap();
        assert!(warning.contains("@ada"));
        assert!(warning.contains("overload my circiuts"));

        let final_warning = AbuseVerdict::FinalWarning.message("ada").unwrap();
        assert!(final_warning.contains("docile weakling"));

        assert_eq!(AbuseVerdict::Ignored.message("ada"), None);
    }

    #[test]
    fn accepted_rolls_reset_the_count() {
        let mut limiter = RollLimiter::new();
        limiter.record_oversized("ada");
        limiter.record_oversized("ada");
        limiter.record_accepted("ada");
        assert_eq!(limiter.strikes("ada"), 0);
        assert_eq!(limiter.record_oversized("ada"), AbuseVerdict::Warning);
    }

    #[test]
    fn logins_are_tracked_independently() {
        let mut limiter = RollLimiter::new();
        limiter.record_oversized("ada");
        assert_eq!(limiter.record_oversized("brook"), AbuseVerdict::Warning);
        assert_eq!(limiter.strikes("ada"), 1);
        assert_eq!(limiter.strikes("brook"), 1);
    }
}
