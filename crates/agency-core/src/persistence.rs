//! Snapshot save/load.
//!
//! JSON is the canonical snapshot format and the only one that migrates
//! older shapes. Bincode is offered for compact same-version saves.

use std::io::{Read, Write};

use agency_logic::efficiency::PhaseKind;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::components::{GameState, STATE_VERSION};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
    #[error("save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("migration failed: {0}")]
    Migration(String),
}

pub fn to_json(state: &GameState) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string(state)?)
}

/// Parses a snapshot, upgrading older shapes first. Missing fields take
/// their defaults.
pub fn from_json(raw: &str) -> Result<GameState, PersistenceError> {
    let mut value: Value = serde_json::from_str(raw)?;
    let found = value.get("version").and_then(Value::as_u64).unwrap_or(1) as u32;
    if found > STATE_VERSION {
        return Err(PersistenceError::VersionMismatch {
            expected: STATE_VERSION,
            found,
        });
    }
    if found < STATE_VERSION {
        log::info!("migrating snapshot from version {} to {}", found, STATE_VERSION);
        migrate_legacy(&mut value)?;
    }
    let mut state: GameState = serde_json::from_value(value)?;
    state.version = STATE_VERSION;
    Ok(state)
}

pub fn save_binary<W: Write>(state: &GameState, writer: W) -> Result<(), PersistenceError> {
    bincode::serialize_into(writer, state)?;
    Ok(())
}

/// Loads a binary snapshot. Only the current version is accepted.
pub fn load_binary<R: Read>(reader: R) -> Result<GameState, PersistenceError> {
    let state: GameState = bincode::deserialize_from(reader)?;
    if state.version != STATE_VERSION {
        return Err(PersistenceError::VersionMismatch {
            expected: STATE_VERSION,
            found: state.version,
        });
    }
    Ok(state)
}

/// Upgrades a version 1 snapshot in place: single-figure project progress
/// becomes four phases, and the two assignment fields become one set.
pub fn migrate_legacy(value: &mut Value) -> Result<(), PersistenceError> {
    let root = value
        .as_object_mut()
        .ok_or_else(|| PersistenceError::Migration("snapshot is not an object".into()))?;

    let mut current_phase: Map<String, Value> = Map::new();
    if let Some(Value::Array(projects)) = root.get_mut("projects") {
        for project in projects.iter_mut().filter_map(Value::as_object_mut) {
            let id = project.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
            if !project.contains_key("phases") {
                let phases = legacy_phases(project);
                project.insert("phases".into(), phases);
            }
            project.remove("progress");
            project.remove("estimated_hours");
            project.remove("hours_completed");
            if let Some(kind) = first_open_phase(project.get("phases")) {
                current_phase.insert(id, Value::String(kind));
            }
        }
    }

    migrate_members(root, &current_phase);
    root.insert("version".into(), json!(STATE_VERSION));
    Ok(())
}

fn migrate_members(root: &mut Map<String, Value>, current_phase: &Map<String, Value>) {
    let Some(Value::Array(members)) = root.get_mut("team").and_then(|t| t.get_mut("members")) else {
        return;
    };
    for member in members.iter_mut().filter_map(Value::as_object_mut) {
        let mut project_ids: Vec<String> = Vec::new();
        if let Some(Value::String(id)) = member.remove("current_assignment") {
            project_ids.push(id);
        }
        if let Some(Value::Array(ids)) = member.remove("assigned_projects") {
            project_ids.extend(ids.into_iter().filter_map(|v| v.as_str().map(str::to_string)));
        }
        member.remove("hour_split");
        if member.contains_key("assignments") {
            continue;
        }
        project_ids.sort();
        project_ids.dedup();
        let assignments: Vec<Value> = project_ids
            .into_iter()
            .filter_map(|pid| {
                current_phase
                    .get(&pid)
                    .map(|phase| json!({ "project_id": pid, "phase": phase }))
            })
            .collect();
        member.insert("assignments".into(), Value::Array(assignments));
    }
}

/// Splits a legacy hour estimate across the four phases in the standard
/// 3:4:5:3 ratio and fills them in order from the legacy progress.
fn legacy_phases(project: &Map<String, Value>) -> Value {
    let estimate = project
        .get("estimated_hours")
        .and_then(Value::as_f64)
        .filter(|h| *h > 0.0)
        .unwrap_or(15.0);
    let progress = project
        .get("progress")
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
        .clamp(0.0, 1.0);
    let unit: f64 = PhaseKind::ALL.iter().map(|k| k.hours_multiplier()).sum();
    let mut done = estimate * progress;
    let mut seen_open = false;
    let mut phases = Map::new();
    for kind in PhaseKind::ALL {
        let required = estimate * kind.hours_multiplier() / unit;
        let filled = done.min(required);
        done -= filled;
        let phase_progress = if required > 0.0 { filled / required } else { 1.0 };
        let status = if phase_progress >= 1.0 - 1e-9 {
            "complete"
        } else if !seen_open {
            seen_open = true;
            if phase_progress > 0.0 { "active" } else { "ready" }
        } else {
            "waiting"
        };
        let stored = if status == "complete" { 1.0 } else { phase_progress };
        phases.insert(
            kind.name().to_string(),
            json!({
                "kind": kind,
                "progress": stored,
                "status": status,
                "hours_required": required,
                "freelancer": null,
                "risky_overlap": false,
            }),
        );
    }
    Value::Object(phases)
}

fn first_open_phase(phases: Option<&Value>) -> Option<String> {
    let phases = phases?.as_object()?;
    PhaseKind::ALL.iter().find_map(|k| {
        let key = k.name().to_string();
        let phase = phases.get(&key)?;
        match phase.get("status").and_then(Value::as_str) {
            Some("complete") => None,
            _ => Some(key),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use agency_logic::efficiency::PhaseStatus;

    const LEGACY: &str = r#"{
        "clock": { "week": 3, "day": 2, "hour": 11, "minute": 0 },
        "money": 18000,
        "projects": [
            { "id": "site", "name": "Site", "progress": 0.4, "estimated_hours": 30.0, "weeks_remaining": 2.0 }
        ],
        "team": { "members": [
            { "id": "you", "name": "You", "role": "lead", "is_player": true },
            { "id": "sarah", "name": "Sarah", "role": "designer", "current_assignment": "site",
              "assigned_projects": ["site"], "hour_split": { "site": 1.0 } }
        ] }
    }"#;

    #[test]
    fn test_legacy_snapshot_migrates_to_phases() {
        let state = from_json(LEGACY).unwrap();
        assert_eq!(state.version, STATE_VERSION);
        let p = state.project("site").unwrap();
        assert!((p.estimated_hours() - 30.0).abs() < 1e-9);
        assert!((p.progress() - 0.4).abs() < 1e-9);
        // 12 done hours: management (6h) full, design (8h) at 75%.
        assert_eq!(p.phases.management.status, PhaseStatus::Complete);
        assert_eq!(p.phases.design.status, PhaseStatus::Active);
        assert!((p.phases.design.progress - 0.75).abs() < 1e-9);
        assert_eq!(p.phases.development.status, PhaseStatus::Waiting);

        let sarah = state.team.get("sarah").unwrap();
        assert_eq!(sarah.assignments.len(), 1);
        let a = sarah.assignments.iter().next().unwrap();
        assert_eq!(a.project_id, "site");
        assert_eq!(a.phase, PhaseKind::Design);
        // Stats backfilled.
        assert_eq!(state.stats.projects_completed, 0);
    }

    #[test]
    fn test_newer_version_rejected() {
        let err = from_json(r#"{ "version": 99 }"#).unwrap_err();
        assert!(matches!(err, PersistenceError::VersionMismatch { found: 99, .. }));
    }

    #[test]
    fn test_binary_roundtrip() {
        let mut state = GameState::default();
        state.money = 1234;
        let mut buf = Vec::new();
        save_binary(&state, &mut buf).unwrap();
        let loaded = load_binary(buf.as_slice()).unwrap();
        assert_eq!(loaded.money, 1234);
    }

    #[test]
    fn test_binary_rejects_other_version() {
        let mut state = GameState::default();
        state.version = 1;
        let mut buf = Vec::new();
        save_binary(&state, &mut buf).unwrap();
        assert!(matches!(
            load_binary(buf.as_slice()),
            Err(PersistenceError::VersionMismatch { expected: 2, found: 1 })
        ));
    }
}
