use anyhow::{Context, Result, ensure};
use chrono::Duration;
use lifequest_engine::{GoalKind, LifeEngine, SyncStatus};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::{ScenarioCtx, advance, base_time, random_activity};
use crate::storage::JsonFileStore;

pub fn run(ctx: &ScenarioCtx, rng: &mut ChaCha8Rng) -> Result<()> {
    let engine = LifeEngine::new(ctx.rules.clone(), JsonFileStore::new(&ctx.data_dir));
    let window = engine.config().save_window();
    let user_id = ctx.user_id("persistence");
    let mut clock = base_time();
    let mut session = engine.create_session(&user_id, clock)?;

    session.unlock_zone("home_base", clock)?;
    session.complete_mission("home_base", "morning_routine", clock)?;
    let goal = session.create_goal("Rainy day", GoalKind::Savings, 5_000.0, None, clock)?;
    session.open_application("Hooli", "QA Intern", clock)?;

    for _ in 0..rng.gen_range(5..=40) {
        advance(&mut clock, rng);
        session.log_activity(&random_activity(rng), clock)?;
        if rng.gen_bool(0.3) {
            session.contribute(goal, f64::from(rng.gen_range(100_u32..=1_500)), clock)?;
        }

        let early = clock + Duration::milliseconds(window.num_milliseconds() / 2);
        ensure!(
            window.is_zero() || !engine.flush_due(&mut session, early)?,
            "flushed before the debounce window"
        );
        ensure!(session.save_queue().has_pending(), "pending writes dropped");
        ensure!(
            engine.flush_due(&mut session, clock + window)?,
            "flush did not happen once the window passed"
        );
        ensure!(
            matches!(session.sync_status(), SyncStatus::Synced { .. }),
            "sync status {:?}",
            session.sync_status()
        );
    }

    session.tick(3, clock);
    engine.save_session(&mut session, clock)?;
    let reloaded = engine
        .load_session(&user_id)?
        .context("saved profile did not reload")?;
    ensure!(reloaded.totals() == session.totals(), "totals changed across reload");
    ensure!(
        reloaded.to_record() == session.to_record(),
        "profile record changed across reload"
    );
    if ctx.verbose {
        println!(
            "     ↳ {} events persisted to {}",
            reloaded.ledger().len(),
            engine.store().path_for(&user_id).display()
        );
    }
    Ok(())
}
