use anyhow::{Result, ensure};
use lifequest_engine::{EventId, LifeSession};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::{ScenarioCtx, advance, base_time, random_activity};

pub fn run(ctx: &ScenarioCtx, rng: &mut ChaCha8Rng) -> Result<()> {
    let engine = ctx.memory_engine();
    let mut clock = base_time();
    let mut session = engine.create_session(&ctx.user_id("ledger"), clock)?;
    let mut live: Vec<EventId> = Vec::new();
    let mut removed: Vec<EventId> = Vec::new();

    let steps: usize = rng.gen_range(40..=160);
    for step in 0..steps {
        advance(&mut clock, rng);
        if !live.is_empty() && rng.gen_bool(0.3) {
            let id = live.swap_remove(rng.gen_range(0..live.len()));
            let delta = session.ledger().get(id).map(|e| e.xp_delta);
            let before = session.totals().net;
            let correction = session.remove_event(id, clock)?;
            ensure!(
                Some(-correction) == delta,
                "step {step}: correction {correction} does not reverse {delta:?}"
            );
            ensure!(session.totals().net == before + correction, "step {step}: net drifted");
            removed.push(id);
        } else {
            let event = session.log_activity(&random_activity(rng), clock)?;
            live.push(event.id);
        }
        check_totals(&session, step)?;
    }

    for id in removed {
        ensure!(
            session.remove_event(id, clock).is_err(),
            "{id} was removed twice"
        );
    }
    ensure!(session.ledger().len() == live.len(), "ledger lost or kept events");
    Ok(())
}

fn check_totals(session: &LifeSession, step: usize) -> Result<()> {
    let sum: i64 = session.ledger().events().iter().map(|e| e.xp_delta).sum();
    let totals = session.totals();
    ensure!(sum == totals.net, "step {step}: sum {sum} != net {}", totals.net);
    ensure!(
        totals.earned - totals.lost == totals.net,
        "step {step}: earned {} - lost {} != net {}",
        totals.earned,
        totals.lost,
        totals.net
    );
    Ok(())
}
