use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};
use lifequest_engine::{
    Activity, CashFlow, ExpenseCategory, IncomeCategory, Intensity, LearningCategory, LifeEngine,
    MemoryStore, SocialCategory, TimeWaster, WorkoutType,
};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;

use crate::storage::FileRules;

pub mod catalog;
pub mod goals;
pub mod ledger;
pub mod lifemap;
pub mod persistence;
pub mod smoke;

pub use catalog::{get_scenario, list_scenarios};

/// Inputs shared by every iteration of a scenario run.
#[derive(Debug, Clone)]
pub struct ScenarioCtx {
    pub rules: FileRules,
    pub data_dir: PathBuf,
    pub seed: u64,
    pub verbose: bool,
}

impl ScenarioCtx {
    pub fn memory_engine(&self) -> LifeEngine<FileRules, MemoryStore> {
        LifeEngine::new(self.rules.clone(), MemoryStore::new())
    }

    pub fn user_id(&self, scenario: &str) -> String {
        format!("qa-{scenario}-{}", self.seed)
    }
}

pub type ScenarioFn = fn(&ScenarioCtx, &mut ChaCha8Rng) -> Result<()>;

#[derive(Debug, Clone, Copy)]
pub struct TestScenario {
    pub name: &'static str,
    pub description: &'static str,
    pub run: ScenarioFn,
}

/// Fixed start of the simulated clock so runs are reproducible.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 8, 0, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

pub fn advance(clock: &mut DateTime<Utc>, rng: &mut ChaCha8Rng) {
    *clock += Duration::minutes(rng.gen_range(1..=180));
}

fn pick<T: Copy>(rng: &mut ChaCha8Rng, items: &[T]) -> T {
    items[rng.gen_range(0..items.len())]
}

pub fn random_activity(rng: &mut ChaCha8Rng) -> Activity {
    let minutes = f64::from(rng.gen_range(5_u32..=150));
    match rng.gen_range(0..5) {
        0 => Activity::Workout {
            workout: pick(rng, WorkoutType::ALL),
            intensity: pick(rng, Intensity::ALL),
            minutes,
        },
        1 => {
            let flow = if rng.gen_bool(0.5) {
                CashFlow::Income(pick(rng, IncomeCategory::ALL))
            } else {
                CashFlow::Expense(pick(rng, ExpenseCategory::ALL))
            };
            Activity::Transaction {
                flow,
                amount: f64::from(rng.gen_range(1_u32..=5_000)),
                note: String::new(),
            }
        }
        2 => Activity::Learning {
            category: pick(rng, LearningCategory::ALL),
            minutes,
            quality: rng.gen_range(1..=5),
            topic: String::new(),
        },
        3 => Activity::Social {
            category: pick(rng, SocialCategory::ALL),
            minutes,
            quality: rng.gen_range(1..=5),
            with: String::new(),
        },
        _ => Activity::TimeWasted {
            category: pick(rng, TimeWaster::ALL),
            hours: f64::from(rng.gen_range(1_u32..=8)) / 2.0,
        },
    }
}
