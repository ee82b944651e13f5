//! Canned rosters and builders the scenarios feed the engine.

use nomic_engine::{Player, PlayerData, Village};

/// Player file in the oldest stored form: a bare population count.
pub const LEGACY_PLAYER_FILE: &str = r#"{
    "activePlayers": [
        {
            "name": "ada",
            "points": 2,
            "village": {"name": "Old Town", "farms": 0, "hunger": 0, "population": 7}
        }
    ]
}"#;

pub fn village(name: &str, farms: u32, hunger: i64, population: &[(&str, u32)]) -> Village {
    Village {
        name: name.to_string(),
        farms,
        hunger,
        population: population.iter().copied().collect(),
    }
}

pub fn player(name: &str, points: i64, village: Option<Village>) -> Player {
    Player {
        name: name.to_string(),
        points,
        village,
    }
}

pub fn roster(players: Vec<Player>) -> PlayerData {
    PlayerData {
        active_players: players,
    }
}

/// One player of every kind: no village, empty village, a village the
/// farms comfortably feed, and a starving one.
#[must_use]
pub fn mixed_roster() -> PlayerData {
    roster(vec![
        player("nova", 1, None),
        player("moss", 2, Some(village("Hollow", 1, 0, &[]))),
        player(
            "ada",
            3,
            Some(village("Eastwood", 2, 0, &[("farming", 4), ("general", 6)])),
        ),
        player("brook", 4, Some(village("Gully", 0, 6, &[("general", 10)]))),
    ])
}
