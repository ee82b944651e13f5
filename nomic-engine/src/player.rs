//! Player-file data model.
//!
//! Mirrors the JSON player file the game keeps under version control:
//! `{"activePlayers": [{"name", "points", "village"?}]}`. A wiped-out
//! player loses the `village` key entirely rather than keeping a null.

use serde::{Deserialize, Serialize};

use crate::population::{FARMING_CATEGORY, PopulationPool};

/// Full active-player snapshot handed to the famine cycle and persisted
/// back in one piece.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerData {
    pub active_players: Vec<Player>,
}

impl PlayerData {
    #[must_use]
    pub fn player(&self, name: &str) -> Option<&Player> {
        self.active_players.iter().find(|player| player.name == name)
    }

    pub fn player_mut(&mut self, name: &str) -> Option<&mut Player> {
        self.active_players
            .iter_mut()
            .find(|player| player.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Player {
    pub name: String,
    pub points: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub village: Option<Village>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Village {
    pub name: String,
    pub farms: u32,
    /// Running food deficit; negative values are banked surplus.
    pub hunger: i64,
    pub population: PopulationPool,
}

impl Village {
    /// Farmers available to staff farms this cycle.
    #[must_use]
    pub fn farmer_count(&self) -> u32 {
        self.population.count(FARMING_CATEGORY)
    }

    #[must_use]
    pub fn total_population(&self) -> u64 {
        self.population.total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_player_file_shape() {
        let json = r#"{
            "activePlayers": [
                {
                    "name": "ada",
                    "points": 12,
                    "village": {
                        "name": "Eastwood",
                        "farms": 3,
                        "hunger": 0,
                        "population": {"general": 10, "farming": 6}
                    }
                },
                {"name": "brook", "points": 0}
            ]
        }"#;

        let data: PlayerData = serde_json::from_str(json).unwrap();
        assert_eq!(data.active_players.len(), 2);

        let ada = data.player("ada").unwrap();
        let village = ada.village.as_ref().unwrap();
        assert_eq!(village.farms, 3);
        assert_eq!(village.farmer_count(), 6);
        assert_eq!(village.total_population(), 16);

        assert!(data.player("brook").unwrap().village.is_none());
        assert!(data.player("nobody").is_none());
    }

    #[test]
    fn legacy_bare_population_still_parses() {
        let json = r#"{"name":"ada","points":1,"village":{"name":"Old Town","farms":1,"hunger":2,"population":7}}"#;
        let player: Player = serde_json::from_str(json).unwrap();
        let village = player.village.unwrap();
        assert_eq!(village.population, PopulationPool::with_general(7));
        assert_eq!(village.farmer_count(), 0);
    }

    #[test]
    fn wiped_players_serialize_without_a_village_key() {
        let player = Player {
            name: "ada".to_string(),
            points: 0,
            village: None,
        };
        let json = serde_json::to_string(&player).unwrap();
        assert_eq!(json, r#"{"name":"ada","points":0}"#);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let village: Village = serde_json::from_str(r#"{"name":"Sparse"}"#).unwrap();
        assert_eq!(village.farms, 0);
        assert_eq!(village.hunger, 0);
        assert!(village.population.is_empty());

        let data: PlayerData = serde_json::from_str("{}").unwrap();
        assert!(data.active_players.is_empty());
    }
}
