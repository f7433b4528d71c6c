use anyhow::{Context, Result, ensure};
use lifequest_engine::{GoalKind, LifeError};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::{ScenarioCtx, advance, base_time};

pub fn run(ctx: &ScenarioCtx, rng: &mut ChaCha8Rng) -> Result<()> {
    let engine = ctx.memory_engine();
    let mut clock = base_time();
    let mut session = engine.create_session(&ctx.user_id("goals"), clock)?;

    let kind = GoalKind::ALL[rng.gen_range(0..GoalKind::ALL.len())];
    let target = f64::from(rng.gen_range(100_u32..=20_000));
    let id = session.create_goal("QA goal", kind, target, None, clock)?;
    let reward = session.goal(id).context("goal missing")?.xp_reward;
    let mut bonus_paid = 0;
    let mut failed = false;

    for step in 0..rng.gen_range(10..=80) {
        advance(&mut clock, rng);
        if kind == GoalKind::Commitment && !failed && rng.gen_bool(0.05) {
            let penalty = session.fail_commitment(id, clock);
            let completed = session.goal(id).is_some_and(|g| g.completed);
            ensure!(
                penalty.is_ok() != completed,
                "step {step}: fail_commitment on completed={completed} returned {penalty:?}"
            );
            failed = penalty.is_ok();
            continue;
        }
        if rng.gen_bool(0.1) {
            let new_target = f64::from(rng.gen_range(50_u32..=20_000));
            bonus_paid += session.edit_goal_target(id, new_target, clock)?.bonus_xp;
        } else {
            let amount = rng.gen_range(-0.4..1.0) * target;
            match session.contribute(id, amount, clock) {
                Ok(outcome) => bonus_paid += outcome.bonus_xp,
                Err(LifeError::Validation { .. }) if failed || amount == 0.0 => {}
                Err(err) => return Err(err).context(format!("step {step}")),
            }
        }

        let goal = session.goal(id).context("goal missing")?;
        ensure!(
            (0.0..=goal.target).contains(&goal.current),
            "step {step}: current {} outside [0, {}]",
            goal.current,
            goal.target
        );
        ensure!(
            bonus_paid == if goal.completed { reward } else { 0 },
            "step {step}: bonus {bonus_paid} with completed={}",
            goal.completed
        );
    }
    Ok(())
}
