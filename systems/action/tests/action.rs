use serde_json::json;
use tower_gym_core::{ActionKind, GameInfo, GridAction, Position};
use tower_gym_system_action::{ActionTranslator, TranslateError};

fn game_info() -> GameInfo {
    serde_json::from_value(json!({
        "actions": [
            { "type": "BUILD_TOWER", "towerType": null, "position": { "x": 0, "y": 0 } },
            { "type": "NONE" }
        ],
        "towers": [
            { "type": "archer", "cost": 50, "range": 120, "attackCooldown": 500 },
            { "type": "cannon", "cost": 80, "range": 90, "attackCooldown": 1500 }
        ],
        "map": {
            "cell_size": 50,
            "width": 900,
            "height": 600,
            "path_length": 1500,
            "path_cells": []
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

#[test]
fn build_action_targets_cell_centre() {
    let translator = ActionTranslator::new(&game_info());
    let command = translator
        .translate(GridAction::new(0, 1, 3, 7))
        .expect("translates");

    assert_eq!(command.kind, ActionKind::BuildTower);
    assert_eq!(command.tower_type(), Some("cannon"));
    assert_eq!(command.position(), Some(Position::new(175.0, 375.0)));
}

#[test]
fn every_cell_maps_to_half_cell_offset() {
    let translator = ActionTranslator::new(&game_info());
    let [_, _, columns, rows] = translator.space().nvec();

    for column in 0..columns {
        for row in 0..rows {
            let command = translator
                .translate(GridAction::new(0, 0, column, row))
                .expect("translates");
            let expected = Position::new(25.0 + 50.0 * column as f64, 25.0 + 50.0 * row as f64);
            assert_eq!(command.position(), Some(expected));
        }
    }
}

#[test]
fn non_build_actions_ignore_tower_and_cell() {
    let translator = ActionTranslator::new(&game_info());
    let command = translator
        .translate(GridAction::new(1, 99, 999, 999))
        .expect("translates");

    assert_eq!(command.kind, ActionKind::Other("NONE".to_owned()));
    assert!(command.payload.is_empty());
}

#[test]
fn translation_does_not_mutate_the_catalogue() {
    let translator = ActionTranslator::new(&game_info());
    let _ = translator
        .translate(GridAction::new(0, 1, 3, 7))
        .expect("translates");
    let second = translator
        .translate(GridAction::new(0, 0, 0, 0))
        .expect("translates");

    assert_eq!(second.tower_type(), Some("archer"));
    assert_eq!(second.position(), Some(Position::new(25.0, 25.0)));
}

#[test]
fn out_of_range_indices_fail_fast() {
    let translator = ActionTranslator::new(&game_info());

    assert_eq!(
        translator.translate(GridAction::new(2, 0, 0, 0)),
        Err(TranslateError::ActionOutOfRange { index: 2, len: 2 })
    );
    assert_eq!(
        translator.translate(GridAction::new(0, 2, 0, 0)),
        Err(TranslateError::TowerOutOfRange { index: 2, len: 2 })
    );
    assert_eq!(
        translator.translate(GridAction::new(0, 0, 18, 0)),
        Err(TranslateError::CellOutOfRange {
            column: 18,
            row: 0,
            columns: 18,
            rows: 12,
        })
    );
}

#[test]
fn space_matches_catalogues_and_grid() {
    let translator = ActionTranslator::new(&game_info());
    assert_eq!(translator.space().nvec(), [2, 2, 18, 12]);
}
