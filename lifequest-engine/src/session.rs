//! The single owned progression state for one user.
//!
//! Every mutation applies locally first, routes its XP through the ledger,
//! and enqueues the touched domains for a debounced save.
use chrono::{DateTime, NaiveDate, Utc};

use crate::activity::{Activity, ActivityKind, SocialCategory, classify};
use crate::applications::{Application, ApplicationId, ApplicationStatus};
use crate::config::EngineConfig;
use crate::constants::{LOG_LEVEL, LOG_PERSISTENCE, LOG_XP};
use crate::error::LifeError;
use crate::gauges::Gauges;
use crate::goals::{Goal, GoalContribution, GoalId, GoalKind};
use crate::ledger::{ActivityEvent, EventDraft, EventId, Ledger, Totals};
use crate::level::{LevelCurve, LevelInfo};
use crate::numbers::positive_magnitude;
use crate::persistence::{PartialRecord, ProfileRecord, ProfileStore, SaveQueue, SyncStatus};
use crate::rules::RuleBook;
use crate::xp::price;
use crate::zones::{LifeMap, MissionOutcome, Zone, ZoneStatus};

/// Where a ledger event is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventDomain {
    Workouts,
    Transactions,
    LearningSessions,
    SocialInteractions,
    NetworkingEvents,
    TimeWasters,
    ProgressEvents,
}

impl EventDomain {
    fn of(event: &ActivityEvent) -> Self {
        match event.kind {
            ActivityKind::Workout => Self::Workouts,
            ActivityKind::Transaction => Self::Transactions,
            ActivityKind::LearningSession => Self::LearningSessions,
            ActivityKind::SocialInteraction
                if event.category == SocialCategory::Networking.label() =>
            {
                Self::NetworkingEvents
            }
            ActivityKind::SocialInteraction => Self::SocialInteractions,
            ActivityKind::Punishment => Self::TimeWasters,
            ActivityKind::MissionCompletion
            | ActivityKind::GoalContribution
            | ActivityKind::ZoneUnlock
            | ActivityKind::ApplicationUpdate => Self::ProgressEvents,
        }
    }
}

/// XP paid when an application is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplicationReceipt {
    pub id: ApplicationId,
    pub xp_delta: i64,
}

#[derive(Debug, Clone)]
pub struct LifeSession {
    user_id: String,
    rules: RuleBook,
    config: EngineConfig,
    curve: LevelCurve,
    ledger: Ledger,
    goals: Vec<Goal>,
    applications: Vec<Application>,
    map: LifeMap,
    gauges: Gauges,
    next_goal_id: u64,
    next_application_id: u64,
    queue: SaveQueue,
}

impl LifeSession {
    /// A fresh session with an empty ledger and the given map template.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        rules: RuleBook,
        map: LifeMap,
        config: EngineConfig,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            rules,
            curve: config.level_curve(),
            gauges: config.starting_gauges(),
            queue: SaveQueue::new(config.save_window()),
            config,
            ledger: Ledger::new(),
            goals: Vec::new(),
            applications: Vec::new(),
            map,
            next_goal_id: 0,
            next_application_id: 0,
        }
    }

    /// Rehydrate a session from a stored record.
    ///
    /// Stored goals are re-clamped (see [`Goal::sanitized`]). An empty or
    /// invalid stored map falls back to `map_template`; missing gauges start
    /// fresh.
    #[must_use]
    pub fn from_record(
        user_id: impl Into<String>,
        record: ProfileRecord,
        rules: RuleBook,
        map_template: LifeMap,
        config: EngineConfig,
    ) -> Self {
        let mut session = Self::new(user_id, rules, map_template, config);
        let ProfileRecord {
            workouts,
            transactions,
            learning_sessions,
            social_interactions,
            networking_events,
            time_wasters,
            progress_events,
            savings_goals,
            business_goals,
            learning_goals,
            public_commitments,
            internship_applications,
            life_map,
            gauges,
        } = record;

        let events = [
            workouts,
            transactions,
            learning_sessions,
            social_interactions,
            networking_events,
            time_wasters,
            progress_events,
        ]
        .into_iter()
        .flatten()
        .collect();
        session.ledger = Ledger::from_events(events);

        session.goals = [savings_goals, business_goals, learning_goals, public_commitments]
            .into_iter()
            .flatten()
            .filter_map(Goal::sanitized)
            .collect();
        session.goals.sort_by_key(|g| g.id);
        session.next_goal_id = session.goals.iter().map(|g| g.id.0 + 1).max().unwrap_or(0);

        session.applications = internship_applications;
        session.next_application_id = session
            .applications
            .iter()
            .map(|a| a.id.0 + 1)
            .max()
            .unwrap_or(0);

        if !life_map.is_empty() {
            let stored = LifeMap { zones: life_map };
            match stored.validate() {
                Ok(()) => session.map = stored,
                Err(err) => {
                    log::warn!(
                        target: LOG_PERSISTENCE,
                        "stored life map for '{}' rejected ({err}); using template",
                        session.user_id
                    );
                }
            }
        }
        if let Some(gauges) = gauges {
            session.gauges = gauges;
        }
        session
    }

    /// Snapshot every domain in wire form.
    #[must_use]
    pub fn to_record(&self) -> ProfileRecord {
        let mut record = ProfileRecord {
            internship_applications: self.applications.clone(),
            life_map: self.map.zones.clone(),
            gauges: Some(self.gauges),
            ..ProfileRecord::default()
        };
        for event in self.ledger.events() {
            let bucket = match EventDomain::of(event) {
                EventDomain::Workouts => &mut record.workouts,
                EventDomain::Transactions => &mut record.transactions,
                EventDomain::LearningSessions => &mut record.learning_sessions,
                EventDomain::SocialInteractions => &mut record.social_interactions,
                EventDomain::NetworkingEvents => &mut record.networking_events,
                EventDomain::TimeWasters => &mut record.time_wasters,
                EventDomain::ProgressEvents => &mut record.progress_events,
            };
            bucket.push(event.clone());
        }
        for goal in &self.goals {
            let bucket = match goal.kind {
                GoalKind::Savings => &mut record.savings_goals,
                GoalKind::Business => &mut record.business_goals,
                GoalKind::Learning => &mut record.learning_goals,
                GoalKind::Commitment => &mut record.public_commitments,
            };
            bucket.push(goal.clone());
        }
        record
    }

    // Accessors ------------------------------------------------------------

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    #[must_use]
    pub const fn rules(&self) -> &RuleBook {
        &self.rules
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    #[must_use]
    pub const fn totals(&self) -> Totals {
        self.ledger.totals()
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.curve.level_for(self.totals().net)
    }

    #[must_use]
    pub fn level_info(&self) -> LevelInfo {
        self.curve.info(self.totals().net)
    }

    #[must_use]
    pub fn streak_days(&self, today: NaiveDate) -> u32 {
        self.ledger.streak_days(today)
    }

    #[must_use]
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    #[must_use]
    pub fn goal(&self, id: GoalId) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    #[must_use]
    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    #[must_use]
    pub const fn life_map(&self) -> &LifeMap {
        &self.map
    }

    #[must_use]
    pub fn zone(&self, zone_id: &str) -> Option<&Zone> {
        self.map.zone(zone_id)
    }

    #[must_use]
    pub const fn gauges(&self) -> &Gauges {
        &self.gauges
    }

    #[must_use]
    pub const fn sync_status(&self) -> &SyncStatus {
        self.queue.status()
    }

    #[must_use]
    pub const fn save_queue(&self) -> &SaveQueue {
        &self.queue
    }

    // Activities -----------------------------------------------------------

    /// Classify, price, and record a user-logged activity.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::Validation` for a non-positive magnitude, a
    /// quality rating outside 1-5, or XP that would overflow the totals;
    /// nothing is recorded in that case.
    pub fn log_activity(
        &mut self,
        activity: &Activity,
        at: DateTime<Utc>,
    ) -> Result<ActivityEvent, LifeError> {
        validate_activity(activity).inspect_err(|err| {
            log::warn!(target: LOG_XP, "ignored {activity:?}: {err}");
        })?;
        let classification = classify(activity, &self.rules);
        let xp = price(&classification, &self.rules);
        self.record(
            EventDraft {
                kind: classification.kind,
                category: classification.label().to_string(),
                magnitude: classification.magnitude,
                timestamp: at,
                xp_delta: xp,
            },
            at,
        )
        .inspect_err(|err| {
            log::warn!(target: LOG_XP, "ignored {activity:?}: {err}");
        })
    }

    /// Delete a user-logged event and reverse its XP; returns the
    /// correction applied.
    ///
    /// Progress events (goal payouts, penalties, unlocks, missions, and
    /// application rewards) belong to the state that produced them and stay.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::NotFound` when no event has that id and
    /// `LifeError::Validation` for a progress event.
    pub fn remove_event(&mut self, id: EventId, at: DateTime<Utc>) -> Result<i64, LifeError> {
        let domain = self
            .ledger
            .get(id)
            .map(EventDomain::of)
            .ok_or_else(|| LifeError::not_found("event", id.to_string()))?;
        if domain == EventDomain::ProgressEvents {
            return Err(LifeError::validation(
                "event",
                "is system-generated and cannot be removed",
            ));
        }
        let before = self.level();
        let correction = self
            .ledger
            .remove(id)
            .ok_or_else(|| LifeError::not_found("event", id.to_string()))?;
        self.note_level_change(before);
        self.enqueue_events(domain, at);
        Ok(correction)
    }

    fn record(&mut self, draft: EventDraft, at: DateTime<Utc>) -> Result<ActivityEvent, LifeError> {
        let before = self.level();
        let event = self.ledger.record(draft).ok_or_else(totals_overflow)?;
        self.note_level_change(before);
        self.enqueue_events(EventDomain::of(&event), at);
        Ok(event)
    }

    /// Checked before any state change whose XP is recorded afterwards.
    fn ensure_room(&self, delta: i64) -> Result<(), LifeError> {
        if self.ledger.has_room_for(delta) {
            Ok(())
        } else {
            Err(totals_overflow())
        }
    }

    fn note_level_change(&self, before: u32) {
        let after = self.level();
        if after > before {
            log::info!(target: LOG_LEVEL, "'{}' reached level {after}", self.user_id);
        } else if after < before {
            log::info!(target: LOG_LEVEL, "'{}' dropped to level {after}", self.user_id);
        }
    }

    // Goals ----------------------------------------------------------------

    /// Create a goal; `xp_reward` defaults to the rule book value for `kind`.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::Validation` for an empty title or a non-positive
    /// target.
    pub fn create_goal(
        &mut self,
        title: impl Into<String>,
        kind: GoalKind,
        target: f64,
        xp_reward: Option<i64>,
        at: DateTime<Utc>,
    ) -> Result<GoalId, LifeError> {
        let reward = xp_reward.unwrap_or_else(|| self.rules.goal_reward(kind));
        let id = GoalId(self.next_goal_id);
        let goal = Goal::new(id, title, kind, target, reward, at)?;
        self.next_goal_id += 1;
        self.goals.push(goal);
        self.enqueue_goals(kind, at);
        Ok(id)
    }

    /// Set a deadline on an existing goal.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::NotFound` for an unknown goal.
    pub fn set_goal_deadline(
        &mut self,
        id: GoalId,
        deadline: DateTime<Utc>,
        at: DateTime<Utc>,
    ) -> Result<(), LifeError> {
        let goal = self.goal_mut(id)?;
        goal.deadline = Some(deadline);
        let kind = goal.kind;
        self.enqueue_goals(kind, at);
        Ok(())
    }

    /// Contribute toward a goal, paying its reward on first completion.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::NotFound` for an unknown goal and
    /// `LifeError::Validation` for a zero or non-finite amount or a failed
    /// commitment.
    pub fn contribute(
        &mut self,
        id: GoalId,
        amount: f64,
        at: DateTime<Utc>,
    ) -> Result<GoalContribution, LifeError> {
        if amount == 0.0 {
            return Err(LifeError::validation("amount", "must not be zero"));
        }
        self.ensure_goal_room(id)?;
        let goal = self.goal_mut(id)?;
        let outcome = goal.contribute(amount)?;
        let (kind, title) = (goal.kind, goal.title.clone());
        self.settle_goal(kind, title, outcome, at)?;
        Ok(outcome)
    }

    /// Change a goal's target. Lowering it to or below `current` completes
    /// an open goal, paying once.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::NotFound` for an unknown goal and
    /// `LifeError::Validation` for a non-positive target.
    pub fn edit_goal_target(
        &mut self,
        id: GoalId,
        target: f64,
        at: DateTime<Utc>,
    ) -> Result<GoalContribution, LifeError> {
        self.ensure_goal_room(id)?;
        let goal = self.goal_mut(id)?;
        let outcome = goal.edit_target(target)?;
        let (kind, title) = (goal.kind, goal.title.clone());
        self.settle_goal(kind, title, outcome, at)?;
        Ok(outcome)
    }

    /// Mark a public commitment as failed and deduct the penalty once.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::NotFound` for an unknown goal and
    /// `LifeError::Validation` when the goal is not an open commitment.
    pub fn fail_commitment(&mut self, id: GoalId, at: DateTime<Utc>) -> Result<i64, LifeError> {
        let penalty = self.rules.commitment_penalty().saturating_abs().saturating_neg();
        self.ensure_room(penalty)?;
        let goal = self.goal_mut(id)?;
        if !goal.fail() {
            return Err(LifeError::validation("goal", "is not an open commitment"));
        }
        let title = goal.title.clone();
        self.enqueue_goals(GoalKind::Commitment, at);
        self.record(
            EventDraft {
                kind: ActivityKind::GoalContribution,
                category: format!("Missed commitment: {title}"),
                magnitude: 1.0,
                timestamp: at,
                xp_delta: penalty,
            },
            at,
        )?;
        Ok(penalty)
    }

    fn goal_mut(&mut self, id: GoalId) -> Result<&mut Goal, LifeError> {
        self.goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| LifeError::not_found("goal", id.to_string()))
    }

    fn ensure_goal_room(&self, id: GoalId) -> Result<(), LifeError> {
        match self.goal(id) {
            Some(goal) if !goal.completed => self.ensure_room(goal.xp_reward),
            _ => Ok(()),
        }
    }

    fn settle_goal(
        &mut self,
        kind: GoalKind,
        title: String,
        outcome: GoalContribution,
        at: DateTime<Utc>,
    ) -> Result<(), LifeError> {
        self.enqueue_goals(kind, at);
        if outcome.bonus_xp == 0 && outcome.applied == 0.0 {
            return Ok(());
        }
        self.record(
            EventDraft {
                kind: ActivityKind::GoalContribution,
                category: title,
                magnitude: outcome.applied,
                timestamp: at,
                xp_delta: outcome.bonus_xp,
            },
            at,
        )?;
        Ok(())
    }

    // Applications ---------------------------------------------------------

    /// Track a new application and pay the `applied` reward.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::Validation` when company or role is blank.
    pub fn open_application(
        &mut self,
        company: impl Into<String>,
        role: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<ApplicationReceipt, LifeError> {
        self.ensure_room(self.rules.application_reward(ApplicationStatus::Applied))?;
        let id = ApplicationId(self.next_application_id);
        let mut application = Application::open(id, company, role, at)?;
        self.next_application_id += 1;
        let xp_delta = if application.claim(ApplicationStatus::Applied) {
            self.rules.application_reward(ApplicationStatus::Applied)
        } else {
            0
        };
        let label = application_label(&application);
        self.applications.push(application);
        self.enqueue_applications(at);
        self.record_application_xp(label, xp_delta, at)?;
        Ok(ApplicationReceipt { id, xp_delta })
    }

    /// Move an application through the pipeline; each status pays once.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::NotFound` for an unknown id and
    /// `LifeError::Validation` for a backwards move or a closed pipeline.
    pub fn advance_application(
        &mut self,
        id: ApplicationId,
        status: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> Result<i64, LifeError> {
        self.ensure_room(self.rules.application_reward(status))?;
        let application = self
            .applications
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| LifeError::not_found("application", id.to_string()))?;
        let xp_delta = if application.advance(status, at)? {
            self.rules.application_reward(status)
        } else {
            0
        };
        let label = application_label(application);
        self.enqueue_applications(at);
        self.record_application_xp(label, xp_delta, at)?;
        Ok(xp_delta)
    }

    fn record_application_xp(
        &mut self,
        label: String,
        xp_delta: i64,
        at: DateTime<Utc>,
    ) -> Result<(), LifeError> {
        if xp_delta == 0 {
            return Ok(());
        }
        self.record(
            EventDraft {
                kind: ActivityKind::ApplicationUpdate,
                category: label,
                magnitude: 1.0,
                timestamp: at,
                xp_delta,
            },
            at,
        )?;
        Ok(())
    }

    // LifeMap --------------------------------------------------------------

    /// # Errors
    ///
    /// Returns `LifeError::NotFound` for an unknown zone.
    pub fn zone_status(&self, zone_id: &str) -> Result<ZoneStatus, LifeError> {
        self.map.status(zone_id, self.level())
    }

    /// Unlock a zone, paying the flat bonus the first time.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::NotFound` for an unknown zone and
    /// `LifeError::ZoneNotUnlockable` while it is still locked.
    pub fn unlock_zone(&mut self, zone_id: &str, at: DateTime<Utc>) -> Result<i64, LifeError> {
        self.ensure_room(self.config.zone_unlock_bonus_xp)?;
        let level = self.level();
        let bonus = self
            .map
            .unlock(zone_id, level, self.config.zone_unlock_bonus_xp)?;
        self.enqueue(
            PartialRecord {
                life_map: Some(self.map.zones.clone()),
                ..PartialRecord::default()
            },
            at,
        );
        if bonus != 0 {
            let name = self
                .map
                .zone(zone_id)
                .map_or_else(|| zone_id.to_string(), |z| z.name.clone());
            self.record(
                EventDraft {
                    kind: ActivityKind::ZoneUnlock,
                    category: name,
                    magnitude: 1.0,
                    timestamp: at,
                    xp_delta: bonus,
                },
                at,
            )?;
        }
        Ok(bonus)
    }

    /// Complete a mission: deduct energy, move mood, pay XP, all once.
    ///
    /// # Errors
    ///
    /// See [`LifeMap::complete_mission`]; on error nothing changes.
    pub fn complete_mission(
        &mut self,
        zone_id: &str,
        mission_id: &str,
        at: DateTime<Utc>,
    ) -> Result<MissionOutcome, LifeError> {
        let reward = self
            .map
            .zone(zone_id)
            .and_then(|z| z.missions.iter().find(|m| m.id == mission_id))
            .map_or(0, |m| m.xp_reward);
        self.ensure_room(reward)?;
        let outcome = self
            .map
            .complete_mission(zone_id, mission_id, &mut self.gauges)?;
        if outcome == MissionOutcome::default() {
            return Ok(outcome);
        }
        self.enqueue(
            PartialRecord {
                life_map: Some(self.map.zones.clone()),
                gauges: Some(self.gauges),
                ..PartialRecord::default()
            },
            at,
        );
        if outcome.xp_delta != 0 {
            let title = self
                .map
                .zone(zone_id)
                .and_then(|z| z.missions.iter().find(|m| m.id == mission_id))
                .map_or_else(|| mission_id.to_string(), |m| m.title.clone());
            self.record(
                EventDraft {
                    kind: ActivityKind::MissionCompletion,
                    category: title,
                    magnitude: 1.0,
                    timestamp: at,
                    xp_delta: outcome.xp_delta,
                },
                at,
            )?;
        }
        Ok(outcome)
    }

    /// Advance time for the gauges.
    pub fn tick(&mut self, ticks: u32, at: DateTime<Utc>) {
        if ticks == 0 {
            return;
        }
        self.gauges.tick(ticks);
        self.enqueue(
            PartialRecord {
                gauges: Some(self.gauges),
                ..PartialRecord::default()
            },
            at,
        );
    }

    // Persistence ----------------------------------------------------------

    /// Queue every domain, e.g. before the first save of a new profile.
    pub fn enqueue_full_save(&mut self, at: DateTime<Utc>) {
        self.enqueue(PartialRecord::full(self.to_record()), at);
    }

    /// Write pending domains if the debounce window has passed.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::Persistence` on store failure; local state is
    /// kept and [`Self::sync_status`] reports a retryable failure.
    pub fn flush_due<S: ProfileStore>(
        &mut self,
        store: &S,
        now: DateTime<Utc>,
    ) -> Result<bool, LifeError> {
        self.queue.flush_due(store, &self.user_id, now)
    }

    /// Write pending domains now. Also the retry path after a failure.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::Persistence` on store failure.
    pub fn flush<S: ProfileStore>(
        &mut self,
        store: &S,
        now: DateTime<Utc>,
    ) -> Result<(), LifeError> {
        self.queue.flush(store, &self.user_id, now)
    }

    fn enqueue(&mut self, partial: PartialRecord, at: DateTime<Utc>) {
        log::trace!(target: LOG_PERSISTENCE, "queued domains for '{}'", self.user_id);
        self.queue.enqueue(partial, at);
    }

    fn enqueue_events(&mut self, domain: EventDomain, at: DateTime<Utc>) {
        let events: Vec<ActivityEvent> = self
            .ledger
            .events()
            .iter()
            .filter(|e| EventDomain::of(e) == domain)
            .cloned()
            .collect();
        let mut partial = PartialRecord::default();
        let slot = match domain {
            EventDomain::Workouts => &mut partial.workouts,
            EventDomain::Transactions => &mut partial.transactions,
            EventDomain::LearningSessions => &mut partial.learning_sessions,
            EventDomain::SocialInteractions => &mut partial.social_interactions,
            EventDomain::NetworkingEvents => &mut partial.networking_events,
            EventDomain::TimeWasters => &mut partial.time_wasters,
            EventDomain::ProgressEvents => &mut partial.progress_events,
        };
        *slot = Some(events);
        self.enqueue(partial, at);
    }

    fn enqueue_goals(&mut self, kind: GoalKind, at: DateTime<Utc>) {
        let goals: Vec<Goal> = self.goals.iter().filter(|g| g.kind == kind).cloned().collect();
        let mut partial = PartialRecord::default();
        let slot = match kind {
            GoalKind::Savings => &mut partial.savings_goals,
            GoalKind::Business => &mut partial.business_goals,
            GoalKind::Learning => &mut partial.learning_goals,
            GoalKind::Commitment => &mut partial.public_commitments,
        };
        *slot = Some(goals);
        self.enqueue(partial, at);
    }

    fn enqueue_applications(&mut self, at: DateTime<Utc>) {
        self.enqueue(
            PartialRecord {
                internship_applications: Some(self.applications.clone()),
                ..PartialRecord::default()
            },
            at,
        );
    }
}

fn application_label(application: &Application) -> String {
    format!(
        "{} @ {} ({})",
        application.role,
        application.company,
        application.status.key()
    )
}

fn totals_overflow() -> LifeError {
    LifeError::validation("xp_delta", "would overflow the XP totals")
}

fn validate_activity(activity: &Activity) -> Result<(), LifeError> {
    let (field, magnitude) = match activity {
        Activity::Workout { minutes, .. } => ("minutes", *minutes),
        Activity::Transaction { amount, .. } => ("amount", *amount),
        Activity::Learning {
            minutes, quality, ..
        }
        | Activity::Social {
            minutes, quality, ..
        } => {
            if !(1..=5).contains(quality) {
                return Err(LifeError::validation("quality", "must be between 1 and 5"));
            }
            ("minutes", *minutes)
        }
        Activity::TimeWasted { hours, .. } => ("hours", *hours),
    };
    if positive_magnitude(magnitude).is_none() {
        return Err(LifeError::validation(field, "must be greater than zero"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{CashFlow, IncomeCategory, Intensity, TimeWaster, WorkoutType};
    use crate::persistence::MemoryStore;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 7, 30, 0).unwrap()
    }

    fn session() -> LifeSession {
        LifeSession::new(
            "tester",
            RuleBook::load_from_static().unwrap(),
            LifeMap::load_from_static().unwrap(),
            EngineConfig::default(),
        )
    }

    fn gym(minutes: f64) -> Activity {
        Activity::Workout {
            workout: WorkoutType::GymWorkout,
            intensity: Intensity::Moderate,
            minutes,
        }
    }

    #[test]
    fn logging_and_removing_keeps_net_equal_to_ledger_sum() {
        let mut s = session();
        let workout = s.log_activity(&gym(45.0), now()).unwrap();
        assert_eq!(workout.xp_delta, 180);
        let reels = s
            .log_activity(
                &Activity::TimeWasted {
                    category: TimeWaster::SocialMediaReels,
                    hours: 2.0,
                },
                now(),
            )
            .unwrap();
        assert_eq!(s.totals().lost, 100);
        assert_eq!(s.totals().net, 80);

        assert_eq!(s.remove_event(reels.id, now()).unwrap(), 100);
        assert_eq!(s.totals().net, 180);
        let sum: i64 = s.ledger().events().iter().map(|e| e.xp_delta).sum();
        assert_eq!(sum, s.totals().net);
        assert!(matches!(
            s.remove_event(reels.id, now()),
            Err(LifeError::NotFound { what: "event", .. })
        ));
    }

    #[test]
    fn invalid_activity_is_a_no_op() {
        let mut s = session();
        assert!(matches!(
            s.log_activity(&gym(0.0), now()),
            Err(LifeError::Validation { field: "minutes", .. })
        ));
        assert!(s.ledger().is_empty());
        assert!(!s.save_queue().has_pending());
    }

    #[test]
    fn goal_bonus_flows_through_ledger_once() {
        let mut s = session();
        let id = s
            .create_goal("Emergency fund", GoalKind::Savings, 10_000.0, None, now())
            .unwrap();
        for _ in 0..4 {
            s.contribute(id, 1_000.0, now()).unwrap();
        }
        assert_eq!(s.contribute(id, 6_000.0, now()).unwrap().bonus_xp, 500);
        assert_eq!(s.contribute(id, 1_000.0, now()).unwrap().bonus_xp, 0);
        assert_eq!(s.totals().net, 500);
        assert!(s.goal(id).unwrap().completed);
    }

    #[test]
    fn failed_commitment_deducts_penalty_once() {
        let mut s = session();
        let id = s
            .create_goal("Post daily", GoalKind::Commitment, 30.0, None, now())
            .unwrap();
        assert_eq!(s.fail_commitment(id, now()).unwrap(), -150);
        assert!(s.fail_commitment(id, now()).is_err());
        assert_eq!(s.totals().net, -150);
        assert_eq!(s.level(), 1);
    }

    #[test]
    fn application_statuses_pay_once() {
        let mut s = session();
        let receipt = s.open_application("Acme", "Data Intern", now()).unwrap();
        assert_eq!(receipt.xp_delta, 25);
        assert_eq!(
            s.advance_application(receipt.id, ApplicationStatus::Interview, now())
                .unwrap(),
            75
        );
        assert_eq!(
            s.advance_application(receipt.id, ApplicationStatus::Interview, now())
                .unwrap(),
            0
        );
        assert_eq!(s.totals().net, 100);
    }

    #[test]
    fn zone_unlock_needs_level_and_pays_once() {
        let mut s = session();
        assert_eq!(s.zone_status("home_base").unwrap(), ZoneStatus::Unlockable);
        assert_eq!(s.unlock_zone("home_base", now()).unwrap(), 100);
        assert_eq!(s.unlock_zone("home_base", now()).unwrap(), 0);
        assert!(s.unlock_zone("fitness_forest", now()).is_err());

        for _ in 0..3 {
            s.log_activity(&gym(60.0), now()).unwrap();
        }
        assert_eq!(s.level(), 2);
        assert_eq!(s.unlock_zone("fitness_forest", now()).unwrap(), 100);
    }

    #[test]
    fn mission_flow_updates_gauges_and_ledger() {
        let mut s = session();
        s.unlock_zone("home_base", now()).unwrap();
        let outcome = s.complete_mission("home_base", "declutter", now()).unwrap();
        assert_eq!(outcome.xp_delta, 40);
        assert_eq!(s.gauges().energy.value(), 85);
        assert_eq!(s.gauges().mood.value(), 78);
        let repeat = s.complete_mission("home_base", "declutter", now()).unwrap();
        assert_eq!(repeat, MissionOutcome::default());
        assert_eq!(s.totals().net, 140);

        s.tick(2, now());
        assert_eq!(s.gauges().energy.value(), 95);
    }

    #[test]
    fn record_round_trip_restores_state() {
        let mut s = session();
        s.log_activity(&gym(45.0), now()).unwrap();
        s.unlock_zone("home_base", now()).unwrap();
        s.complete_mission("home_base", "morning_routine", now()).unwrap();
        let goal = s
            .create_goal("Course", GoalKind::Learning, 10.0, Some(42), now())
            .unwrap();
        s.contribute(goal, 3.0, now()).unwrap();

        let json = serde_json::to_string(&s.to_record()).unwrap();
        let record: ProfileRecord = serde_json::from_str(&json).unwrap();
        let restored = LifeSession::from_record(
            "tester",
            record,
            RuleBook::load_from_static().unwrap(),
            LifeMap::load_from_static().unwrap(),
            EngineConfig::default(),
        );
        assert_eq!(restored.totals(), s.totals());
        assert_eq!(restored.gauges(), s.gauges());
        assert_eq!(restored.goals(), s.goals());
        assert_eq!(restored.zone_status("home_base").unwrap(), ZoneStatus::Unlocked);
        assert_eq!(restored.ledger().events(), s.ledger().events());
    }

    #[test]
    fn failed_save_keeps_local_state_and_retries() {
        let store = MemoryStore::new();
        let mut s = session();
        s.log_activity(&gym(30.0), now()).unwrap();
        store.set_offline(true);
        let later = now() + Duration::seconds(5);
        assert!(s.flush_due(&store, later).is_err());
        assert!(matches!(s.sync_status(), SyncStatus::Failed { .. }));
        assert_eq!(s.totals().net, 170);

        store.set_offline(false);
        s.flush(&store, later).unwrap();
        assert_eq!(store.snapshot("tester").unwrap().workouts.len(), 1);
    }

    fn business_income(amount: f64) -> Activity {
        Activity::Transaction {
            flow: CashFlow::Income(IncomeCategory::Business),
            amount,
            note: String::new(),
        }
    }

    #[test]
    fn oversized_xp_is_refused_without_breaking_totals() {
        let mut s = session();
        let windfall = s.log_activity(&business_income(1.2e20), now()).unwrap();
        assert_eq!(windfall.xp_delta, i64::MAX);
        assert_eq!(s.level(), u32::MAX);

        assert!(matches!(
            s.log_activity(&business_income(1e20), now()),
            Err(LifeError::Validation { field: "xp_delta", .. })
        ));
        assert!(s.unlock_zone("home_base", now()).is_err());
        assert_eq!(s.zone_status("home_base").unwrap(), ZoneStatus::Unlockable);
        assert_eq!(s.ledger().len(), 1);

        let reels = s
            .log_activity(
                &Activity::TimeWasted {
                    category: TimeWaster::SocialMediaReels,
                    hours: 2.0,
                },
                now(),
            )
            .unwrap();
        assert_eq!(reels.xp_delta, -100);
        assert_eq!(s.remove_event(windfall.id, now()).unwrap(), -i64::MAX);
        let sum: i64 = s.ledger().events().iter().map(|e| e.xp_delta).sum();
        assert_eq!(sum, s.totals().net);
        assert_eq!(s.totals().net, -100);
        assert_eq!(s.level(), 1);
    }

    #[test]
    fn progress_events_stay_in_the_ledger() {
        let mut s = session();
        let pledge = s
            .create_goal("Post daily", GoalKind::Commitment, 30.0, None, now())
            .unwrap();
        s.fail_commitment(pledge, now()).unwrap();
        s.unlock_zone("home_base", now()).unwrap();
        let ids: Vec<EventId> = s.ledger().events().iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), 2);
        for id in ids {
            assert!(matches!(
                s.remove_event(id, now()),
                Err(LifeError::Validation { field: "event", .. })
            ));
        }
        assert_eq!(s.totals().net, -50);
        assert!(s.goal(pledge).unwrap().failed);
        assert_eq!(s.unlock_zone("home_base", now()).unwrap(), 0);
    }

    #[test]
    fn tampered_record_is_reclamped_on_load() {
        let mut s = session();
        let goal = s
            .create_goal("Laptop", GoalKind::Savings, 100.0, Some(300), now())
            .unwrap();
        s.contribute(goal, 40.0, now()).unwrap();

        let mut record = s.to_record();
        record.savings_goals[0].current = 250.0;
        let mut unusable = record.savings_goals[0].clone();
        unusable.id = GoalId(7);
        unusable.target = 0.0;
        record.savings_goals.push(unusable);
        record.life_map[0].missions[0].energy_cost = -40;

        let template = LifeMap::load_from_static().unwrap();
        let mut restored = LifeSession::from_record(
            "tester",
            record,
            RuleBook::load_from_static().unwrap(),
            template.clone(),
            EngineConfig::default(),
        );
        let stored = restored.goal(goal).unwrap();
        assert!((stored.current - 100.0).abs() < f64::EPSILON);
        assert!(stored.completed);
        assert!(restored.goal(GoalId(7)).is_none());
        assert_eq!(restored.life_map(), &template);

        assert_eq!(restored.contribute(goal, 10.0, now()).unwrap().bonus_xp, 0);
        assert_eq!(restored.totals(), s.totals());
    }
}
