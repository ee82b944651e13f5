use std::cell::RefCell;
use std::rc::Rc;

use nomic_engine::{
    FamineConfig, FamineEngine, FamineNotice, NoticeQuery, NoticeRequest, PlayerData,
    PlayerOutcome, PlayerRepository, SUMMARY_MESSAGE,
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("test repository failure")]
struct TestError;

#[derive(Default)]
struct RepoState {
    data: PlayerData,
    journal: Vec<String>,
    open: Vec<FamineNotice>,
    resolutions: Vec<String>,
    next_id: u64,
}

#[derive(Clone, Default)]
struct TestRepository {
    state: Rc<RefCell<RepoState>>,
}

impl TestRepository {
    fn from_player_file(json: &str) -> Self {
        let repo = Self::default();
        repo.state.borrow_mut().data = serde_json::from_str(json).unwrap();
        repo
    }

    fn data(&self) -> PlayerData {
        self.state.borrow().data.clone()
    }

    fn journal(&self) -> Vec<String> {
        self.state.borrow().journal.clone()
    }

    fn open_notices(&self) -> Vec<FamineNotice> {
        self.state.borrow().open.clone()
    }
}

impl PlayerRepository for TestRepository {
    type Error = TestError;

    fn load_player_data(&self) -> Result<PlayerData, Self::Error> {
        Ok(self.state.borrow().data.clone())
    }

    fn update_player_file(&self, data: &PlayerData, message: &str) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        state.data = data.clone();
        state.journal.push(message.to_string());
        Ok(())
    }

    fn create_famine_notice(&self, request: &NoticeRequest) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = state.next_id;
        state.open.push(FamineNotice {
            id,
            title: request.title.clone(),
            assignee: Some(request.assignee.clone()),
        });
        Ok(())
    }

    fn list_open_famine_notices(
        &self,
        _query: &NoticeQuery,
    ) -> Result<Vec<FamineNotice>, Self::Error> {
        Ok(self.state.borrow().open.clone())
    }

    fn resolve_famine_notice(
        &self,
        notice: &FamineNotice,
        message: &str,
    ) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        state.open.retain(|open| open.id != notice.id);
        state.resolutions.push(message.to_string());
        Ok(())
    }
}

fn engine_with(repo: TestRepository, seed: u64) -> FamineEngine<TestRepository> {
    FamineEngine::with_seed(repo, FamineConfig::default(), seed).unwrap()
}

const DECLINING_VILLAGE: &str = r#"{
    "activePlayers": [
        {
            "name": "ada",
            "points": 9,
            "village": {
                "name": "Gully",
                "farms": 1,
                "hunger": 0,
                "population": {"general": 10}
            }
        }
    ]
}"#;

#[test]
fn unfarmed_village_declines_from_notice_to_wipeout() {
    let repo = TestRepository::from_player_file(DECLINING_VILLAGE);
    let mut engine = engine_with(repo.clone(), 0xCAFE);

    // Cycle one: no farmers, no food; ten mouths put the village in famine.
    let report = engine.run_famine_cycle().unwrap();
    assert_eq!(
        report.outcomes,
        vec![(
            "ada".to_string(),
            PlayerOutcome::Survived {
                starved: 0,
                production: 0,
                hunger: 10,
                famine: true,
            }
        )]
    );
    assert_eq!(report.notices_raised(), 1);
    assert_eq!(repo.journal(), vec![SUMMARY_MESSAGE.to_string()]);
    assert_eq!(repo.open_notices().len(), 1);

    // Cycle two: the carried deficit starves everyone before farming.
    let report = engine.run_famine_cycle().unwrap();
    assert_eq!(
        report.outcomes,
        vec![("ada".to_string(), PlayerOutcome::WipedOut { starved: 10 })]
    );

    let ada = repo.data().player("ada").cloned().unwrap();
    assert!(ada.village.is_none());
    assert_eq!(ada.points, 0);

    let journal = repo.journal();
    assert_eq!(journal.len(), 4);
    assert_eq!(
        journal[1],
        "@ada's village, Gully had 10 people starve to death."
    );
    assert!(journal[2].contains("has all starved to death"));
    assert_eq!(journal[3], SUMMARY_MESSAGE);
}

#[test]
fn feeding_the_village_resolves_its_notice() {
    let repo = TestRepository::from_player_file(DECLINING_VILLAGE);
    let mut engine = engine_with(repo.clone(), 0xCAFE);

    engine.run_famine_cycle().unwrap();
    assert_eq!(repo.open_notices().len(), 1);

    // An external feed action settles the deficit between cycles.
    {
        let mut state = repo.state.borrow_mut();
        let village = state
            .data
            .player_mut("ada")
            .and_then(|player| player.village.as_mut())
            .unwrap();
        village.hunger = -3;
    }

    let ada = repo.data().player("ada").cloned().unwrap();
    assert_eq!(engine.resolve_famine_notices(&ada), 1);
    assert!(repo.open_notices().is_empty());
    assert_eq!(
        repo.state.borrow().resolutions,
        vec!["@ada has resolved their villages hungry population.".to_string()]
    );
}

#[test]
fn well_staffed_farms_keep_a_village_fed_indefinitely() {
    let repo = TestRepository::from_player_file(
        r#"{
            "activePlayers": [
                {
                    "name": "brook",
                    "points": 5,
                    "village": {
                        "name": "Terrace",
                        "farms": 2,
                        "hunger": 0,
                        "population": {"farming": 4}
                    }
                }
            ]
        }"#,
    );
    let mut engine = engine_with(repo.clone(), 7);

    let mut last_hunger = 0;
    for cycle in 0..3 {
        let report = engine.run_famine_cycle().unwrap();
        let (_, outcome) = &report.outcomes[0];
        assert!(
            matches!(
                outcome,
                PlayerOutcome::Survived {
                    starved: 0,
                    famine: false,
                    ..
                }
            ),
            "cycle {cycle} should stay fed, got {outcome:?}"
        );

        let hunger = repo
            .data()
            .player("brook")
            .and_then(|player| player.village.as_ref().map(|village| village.hunger))
            .unwrap();
        assert!(hunger < last_hunger, "surplus should grow every cycle");
        last_hunger = hunger;
    }
    assert!(repo.open_notices().is_empty());
}

#[test]
fn mixed_roster_processes_every_archetype_in_one_cycle() {
    let repo = TestRepository::from_player_file(
        r#"{
            "activePlayers": [
                {"name": "nova", "points": 1},
                {
                    "name": "moss",
                    "points": 2,
                    "village": {"name": "Hollow", "farms": 1, "hunger": 0, "population": {}}
                },
                {
                    "name": "ada",
                    "points": 3,
                    "village": {
                        "name": "Eastwood",
                        "farms": 2,
                        "hunger": 0,
                        "population": {"farming": 4}
                    }
                },
                {
                    "name": "brook",
                    "points": 4,
                    "village": {"name": "Gully", "farms": 0, "hunger": 6, "population": 4}
                }
            ]
        }"#,
    );
    let mut engine = engine_with(repo.clone(), 0xBEEF);

    let report = engine.run_famine_cycle().unwrap();

    assert_eq!(report.outcomes[0], ("nova".to_string(), PlayerOutcome::NoVillage));
    assert_eq!(
        report.outcomes[1],
        ("moss".to_string(), PlayerOutcome::NoPopulation)
    );
    assert!(matches!(
        report.outcomes[2].1,
        PlayerOutcome::Survived { famine: false, .. }
    ));
    assert_eq!(
        report.outcomes[3],
        ("brook".to_string(), PlayerOutcome::WipedOut { starved: 4 })
    );
    assert_eq!(report.total_starved(), 4);
    assert_eq!(report.wipeouts(), 1);

    // Starvation, wipeout, then the one summary write.
    assert_eq!(repo.journal().len(), 3);

    let stored = serde_json::to_string(&repo.data()).unwrap();
    assert!(stored.contains(r#""activePlayers""#));
    assert!(stored.contains(r#""name":"brook","points":0}"#));
}

#[test]
fn replaying_a_seed_reproduces_the_whole_story() {
    let roster = r#"{
        "activePlayers": [
            {
                "name": "ada",
                "points": 3,
                "village": {
                    "name": "Eastwood",
                    "farms": 1,
                    "hunger": 4,
                    "population": {"general": 9, "farming": 3, "hunting": 2}
                }
            }
        ]
    }"#;

    let first_repo = TestRepository::from_player_file(roster);
    let second_repo = TestRepository::from_player_file(roster);
    let mut first = engine_with(first_repo.clone(), 1234);
    let mut second = engine_with(second_repo.clone(), 1234);

    for _ in 0..4 {
        let left = first.run_famine_cycle().unwrap();
        let right = second.run_famine_cycle().unwrap();
        assert_eq!(left.outcomes, right.outcomes);
    }
    assert_eq!(first_repo.data(), second_repo.data());
}
