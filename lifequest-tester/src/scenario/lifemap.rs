use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Result, ensure};
use lifequest_engine::{LifeError, LifeSession, MissionOutcome, ZoneStatus};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::{ScenarioCtx, advance, base_time, random_activity};

pub fn run(ctx: &ScenarioCtx, rng: &mut ChaCha8Rng) -> Result<()> {
    let engine = ctx.memory_engine();
    let bonus = engine.config().zone_unlock_bonus_xp;
    let mut clock = base_time();
    let mut session = engine.create_session(&ctx.user_id("lifemap"), clock)?;
    let zone_count = session.life_map().zones.len();
    ensure!(zone_count > 0, "life map has no zones");

    let mut done: BTreeSet<(String, String)> = BTreeSet::new();
    let mut unlock_paid: BTreeMap<String, i64> = BTreeMap::new();

    let steps: usize = rng.gen_range(30..=120);
    for step in 0..steps {
        advance(&mut clock, rng);
        let zone = session.life_map().zones[rng.gen_range(0..zone_count)].clone();
        match rng.gen_range(0..4) {
            0 => {
                session.log_activity(&random_activity(rng), clock)?;
            }
            1 => {
                let status = session.zone_status(&zone.id)?;
                match session.unlock_zone(&zone.id, clock) {
                    Ok(paid) => {
                        ensure!(status != ZoneStatus::Locked, "step {step}: locked zone unlocked");
                        *unlock_paid.entry(zone.id.clone()).or_default() += paid;
                    }
                    Err(LifeError::ZoneNotUnlockable { .. }) => {
                        ensure!(status == ZoneStatus::Locked, "step {step}: {status:?} refused");
                    }
                    Err(err) => return Err(err.into()),
                }
                let total = unlock_paid.get(&zone.id).copied().unwrap_or(0);
                ensure!(
                    total == 0 || total == bonus,
                    "step {step}: '{}' paid {total} in unlock bonuses",
                    zone.id
                );
            }
            2 if !zone.missions.is_empty() => {
                let mission = &zone.missions[rng.gen_range(0..zone.missions.len())];
                let key = (zone.id.clone(), mission.id.clone());
                let gauges = *session.gauges();
                let net = session.totals().net;
                match session.complete_mission(&zone.id, &mission.id, clock) {
                    Ok(outcome) if done.contains(&key) => {
                        ensure!(
                            outcome == MissionOutcome::default(),
                            "step {step}: repeat of '{}' paid {outcome:?}",
                            mission.id
                        );
                    }
                    Ok(outcome) => {
                        ensure!(outcome.xp_delta == mission.xp_reward, "step {step}: wrong XP");
                        done.insert(key);
                    }
                    Err(LifeError::InsufficientResource { .. } | LifeError::ZoneLocked(_)) => {
                        ensure!(
                            *session.gauges() == gauges && session.totals().net == net,
                            "step {step}: rejected mission changed state"
                        );
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            _ => session.tick(rng.gen_range(0..=4), clock),
        }
        check_state(&session, &done, step)?;
    }
    Ok(())
}

fn check_state(
    session: &LifeSession,
    done: &BTreeSet<(String, String)>,
    step: usize,
) -> Result<()> {
    for gauge in [session.gauges().energy, session.gauges().mood] {
        ensure!(
            (0..=gauge.max()).contains(&gauge.value()),
            "step {step}: gauge {} outside [0, {}]",
            gauge.value(),
            gauge.max()
        );
    }
    for (zone_id, mission_id) in done {
        let completed = session
            .zone(zone_id)
            .and_then(|z| z.missions.iter().find(|m| &m.id == mission_id))
            .is_some_and(|m| m.completed);
        ensure!(completed, "step {step}: mission '{mission_id}' reverted");
    }
    Ok(())
}
