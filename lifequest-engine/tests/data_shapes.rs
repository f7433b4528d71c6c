use std::hash::Hasher;

use chrono::{TimeZone, Utc};
use lifequest_engine::{
    Activity, ApplicationStatus, EngineConfig, GoalKind, Intensity, LifeMap, LifeSession,
    ProfileRecord, RuleBook, SocialCategory, TimeWaster, WorkoutType,
};
use serde_json::{Map, Value};
use twox_hash::XxHash64;

const RULES_ASSET: &str = include_str!("../assets/rules.json");

#[test]
fn bundled_rules_serialize_back_to_the_asset() {
    let rules = RuleBook::load_from_static().unwrap();
    let serialized = canonicalize_value(serde_json::to_value(&rules).unwrap());
    let asset = canonicalize_value(serde_json::from_str(RULES_ASSET).unwrap());
    assert_eq!(serialized, asset, "rule book drops or renames a table");
}

#[test]
fn rule_book_snapshot_hash_is_stable_across_reloads() {
    let first = RuleBook::load_from_static().unwrap();
    let canonical = canonical_json(&first);
    let reparsed = RuleBook::from_json(&canonical).unwrap();
    assert_eq!(reparsed, first);
    assert_eq!(
        snapshot_hash(canonical.as_bytes()),
        snapshot_hash(canonical_json(&reparsed).as_bytes()),
        "rule snapshot changed\n{canonical}"
    );
}

#[test]
fn profile_record_uses_camel_case_domains_and_rfc3339_times() {
    let at = Utc.with_ymd_and_hms(2026, 2, 3, 4, 5, 6).unwrap();
    let mut session = LifeSession::new(
        "shape",
        RuleBook::load_from_static().unwrap(),
        LifeMap::load_from_static().unwrap(),
        EngineConfig::default(),
    );
    session
        .log_activity(
            &Activity::Workout {
                workout: WorkoutType::Swimming,
                intensity: Intensity::Light,
                minutes: 20.0,
            },
            at,
        )
        .unwrap();
    session
        .log_activity(
            &Activity::Social {
                category: SocialCategory::Networking,
                minutes: 60.0,
                quality: 4,
                with: "meetup".to_string(),
            },
            at,
        )
        .unwrap();
    session
        .log_activity(
            &Activity::TimeWasted {
                category: TimeWaster::Gaming,
                hours: 1.5,
            },
            at,
        )
        .unwrap();
    session
        .create_goal("Ship it", GoalKind::Commitment, 1.0, None, at)
        .unwrap();
    let app = session.open_application("Globex", "Intern", at).unwrap();
    session
        .advance_application(app.id, ApplicationStatus::Screening, at)
        .unwrap();

    let value = serde_json::to_value(session.to_record()).unwrap();
    let object = value.as_object().unwrap();
    for key in [
        "workouts",
        "networkingEvents",
        "timeWasters",
        "progressEvents",
        "publicCommitments",
        "internshipApplications",
        "lifeMap",
        "gauges",
    ] {
        assert!(object.contains_key(key), "missing {key}");
    }
    assert_eq!(object["networkingEvents"].as_array().unwrap().len(), 1);
    assert!(object["socialInteractions"].as_array().unwrap().is_empty());
    assert_eq!(object["progressEvents"].as_array().unwrap().len(), 2);

    let workout = &object["workouts"][0];
    assert_eq!(workout["timestamp"], "2026-02-03T04:05:06Z");
    assert_eq!(workout["kind"], "workout");
    assert!(workout.get("xpDelta").is_some());
    assert_eq!(object["timeWasters"][0]["kind"], "punishment");
    assert_eq!(object["lifeMap"][0]["missions"][0]["xpReward"], 50);

    let restored: ProfileRecord = serde_json::from_value(value).unwrap();
    assert_eq!(restored.workouts[0].timestamp, at);
    assert_eq!(restored, session.to_record());
}

#[test]
fn missing_domains_load_as_empty() {
    let json = r#"{
        "workouts": [],
        "gauges": {
            "energy": {"value": 50, "max": 100, "regenPerTick": 5},
            "mood": {"value": 60, "max": 100, "regenPerTick": 2}
        }
    }"#;
    let record: ProfileRecord = serde_json::from_str(json).unwrap();
    assert!(record.transactions.is_empty());
    assert!(record.life_map.is_empty());
    assert_eq!(record.gauges.unwrap().energy.value(), 50);
}

fn canonical_json(rules: &RuleBook) -> String {
    let value = canonicalize_value(serde_json::to_value(rules).unwrap());
    serde_json::to_string_pretty(&value).unwrap()
}

fn canonicalize_value(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize_value).collect()),
        Value::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut result = Map::with_capacity(entries.len());
            for (key, value) in entries {
                result.insert(key, canonicalize_value(value));
            }
            Value::Object(result)
        }
        other => other,
    }
}

fn snapshot_hash(bytes: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(bytes);
    hasher.finish()
}
