use serde_json::json;
use tower_gym_core::{EnemyState, GameInfo, GameState, Position, TowerState};
use tower_gym_system_reward::{RewardError, RewardShaper, RewardTuning};

fn game_info() -> GameInfo {
    serde_json::from_value(json!({
        "actions": [{ "type": "BUILD_TOWER", "position": { "x": 0, "y": 0 } }, { "type": "NONE" }],
        "towers": [
            { "type": "archer", "cost": 50, "range": 100, "attackCooldown": 500 },
            { "type": "mortar", "cost": 90, "range": 50, "attackCooldown": 1500 }
        ],
        "map": {
            "cell_size": 50,
            "width": 500,
            "height": 400,
            "path_length": 300,
            "path_cells": [
                { "x": 25, "y": 25 }, { "x": 75, "y": 25 }, { "x": 125, "y": 25 },
                { "x": 175, "y": 25 }, { "x": 225, "y": 25 }, { "x": 275, "y": 25 }
            ]
        },
        "waves": {
            "wave_delay": 10_000,
            "max_enemies": 10,
            "spawn_delay": 500,
            "slower_enemy_sample": { "currentSpeed": 0.125 },
            "enemy_types": ["grunt"]
        },
        "max_global_info": { "gameTime": 600_000, "waveNumber": 50, "money": 5_000 },
        "slower_tower_sample": { "attackCooldown": 1_500 }
    }))
    .expect("info parses")
}

fn shaper() -> RewardShaper {
    RewardShaper::new(&game_info(), RewardTuning::default())
}

fn tower(x: f64, y: f64, kind: &str) -> TowerState {
    TowerState {
        position: Position::new(x, y),
        kind: kind.to_owned(),
        attack_cooldown: 0.0,
    }
}

fn enemies(count: usize) -> Vec<EnemyState> {
    (0..count)
        .map(|index| EnemyState {
            position: Position::new(25.0 + index as f64, 25.0),
            kind: "grunt".to_owned(),
            current_health: 10.0,
            full_health: 10.0,
            path_progress: 0.1,
        })
        .collect()
}

fn previous() -> GameState {
    GameState {
        game_time: 1_000.0,
        wave_number: 2,
        money: 100.0,
        game_over: false,
        towers: vec![tower(425.0, 375.0, "archer")],
        enemies: enemies(5),
    }
}

fn next_with_new_tower(new_tower: TowerState) -> GameState {
    GameState {
        game_time: 1_100.0,
        wave_number: 3,
        money: 96.0,
        game_over: false,
        towers: vec![tower(425.0, 375.0, "archer"), new_tower],
        enemies: enemies(3),
    }
}

#[test]
fn covering_tower_transition_scores_twelve() {
    let next = next_with_new_tower(tower(100.0, 75.0, "archer"));
    let terms = shaper().shape(&previous(), &next).expect("shapes");

    assert_eq!(terms.enemies_removed, 2.0);
    assert_eq!(terms.wave_completion, 6.0);
    assert_eq!(terms.tower_placement, 8.0, "four path cells covered");
    assert_eq!(terms.spending, -4.0);
    assert_eq!(terms.terminal, 0.0);
    assert_eq!(terms.total(), 12.0);
}

#[test]
fn uncovered_tower_transition_scores_minus_twenty_six() {
    let next = next_with_new_tower(tower(425.0, 275.0, "archer"));
    let reward = shaper().reward(&previous(), &next).expect("shapes");
    assert_eq!(reward, -26.0);
}

#[test]
fn coverage_boundary_is_exclusive() {
    let next = next_with_new_tower(tower(25.0, 75.0, "mortar"));
    let terms = shaper().shape(&previous(), &next).expect("shapes");
    assert_eq!(terms.tower_placement, -30.0, "cell at exactly range is uncovered");
}

#[test]
fn game_over_subtracts_exactly_one_hundred() {
    let quiet = previous();
    let lost = GameState {
        game_over: true,
        ..previous()
    };

    let shaper = shaper();
    let baseline = shaper.reward(&previous(), &quiet).expect("shapes");
    let terminal = shaper.reward(&previous(), &lost).expect("shapes");
    assert_eq!(baseline, 0.0);
    assert_eq!(terminal - baseline, -100.0);

    let mixed = GameState {
        game_over: true,
        ..next_with_new_tower(tower(100.0, 75.0, "archer"))
    };
    assert_eq!(shaper.reward(&previous(), &mixed).expect("shapes"), -88.0);
}

#[test]
fn negative_population_deltas_contribute_nothing() {
    let next = GameState {
        towers: Vec::new(),
        enemies: enemies(9),
        ..previous()
    };
    let terms = shaper().shape(&previous(), &next).expect("shapes");
    assert_eq!(terms.enemies_removed, 0.0);
    assert_eq!(terms.tower_placement, 0.0);
}

#[test]
fn every_new_tower_is_scored() {
    let mut next = next_with_new_tower(tower(100.0, 75.0, "archer"));
    next.towers.push(tower(425.0, 275.0, "archer"));
    let terms = shaper().shape(&previous(), &next).expect("shapes");
    assert_eq!(terms.tower_placement, 8.0 - 30.0);
}

#[test]
fn unknown_new_tower_type_is_reported() {
    let next = next_with_new_tower(tower(100.0, 75.0, "laser"));
    assert_eq!(
        shaper().shape(&previous(), &next),
        Err(RewardError::UnknownTowerType("laser".to_owned()))
    );
}

#[test]
fn custom_tuning_scales_terms() {
    let tuning = RewardTuning {
        spending_penalty: 0.0,
        wave_multiplier: 1.0,
        ..RewardTuning::default()
    };
    let shaper = RewardShaper::new(&game_info(), tuning);
    let next = next_with_new_tower(tower(100.0, 75.0, "archer"));
    assert_eq!(shaper.reward(&previous(), &next).expect("shapes"), 2.0 + 3.0 + 8.0);
    assert_eq!(shaper.tuning().spending_penalty, 0.0);
}
