use anyhow::{Result, ensure};
use lifequest_engine::{Activity, GoalKind, Intensity, TimeWaster, WorkoutType};
use rand_chacha::ChaCha8Rng;

use super::{ScenarioCtx, base_time};

pub fn run(ctx: &ScenarioCtx, _rng: &mut ChaCha8Rng) -> Result<()> {
    let engine = ctx.memory_engine();
    let now = base_time();
    let mut session = engine.create_session(&ctx.user_id("smoke"), now)?;

    let gym = session.log_activity(
        &Activity::Workout {
            workout: WorkoutType::GymWorkout,
            intensity: Intensity::Moderate,
            minutes: 45.0,
        },
        now,
    )?;
    ensure!(gym.xp_delta == 180, "gym workout paid {} XP, expected 180", gym.xp_delta);

    let reels = session.log_activity(
        &Activity::TimeWasted {
            category: TimeWaster::SocialMediaReels,
            hours: 2.0,
        },
        now,
    )?;
    ensure!(session.totals().lost == 100, "reels lost {}", session.totals().lost);
    let before = session.totals().net;
    session.remove_event(reels.id, now)?;
    ensure!(
        session.totals().net == before + 100,
        "removing reels did not restore 100 XP"
    );

    let goal = session.create_goal("Emergency fund", GoalKind::Savings, 10_000.0, None, now)?;
    let mut bonus = 0;
    for amount in [1_000.0, 1_000.0, 1_000.0, 1_000.0, 6_000.0, 1_000.0] {
        bonus += session.contribute(goal, amount, now)?.bonus_xp;
    }
    let Some(goal) = session.goal(goal) else {
        anyhow::bail!("goal vanished");
    };
    ensure!(goal.completed, "goal should be completed");
    ensure!((goal.current - 10_000.0).abs() < f64::EPSILON, "current {}", goal.current);
    ensure!(bonus == goal.xp_reward, "bonus paid {bonus}, reward {}", goal.xp_reward);
    Ok(())
}
