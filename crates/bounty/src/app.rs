use tracing::{info, warn};

use foundation::ids::{LocationId, SessionId};
use foundation::time::Time;
use runtime::metrics::Metrics;
use runtime::{Clock, EventBus, TimerQueue};
use scene::picking::{PickOptions, Ray, pick_beacon};
use scene::{Category, Location, LocationRegistry, SelectChange, Selection, Status};

use crate::config::BountyConfig;
use crate::error::{ConfigError, Rejected};
use crate::reward::RewardPolicy;
use crate::verification::{
    APPROVAL_NOTE, Applied, Completion, Phase, PhaseEvent, Session, Submission,
    VerificationMachine,
};
use crate::wallet::{Credits, Wallet};

/// Result of a successful `select_beacon`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    Unchanged,
    Selected {
        previous: Option<LocationId>,
        /// Session cancelled because the selection moved away from it.
        cancelled: Option<SessionId>,
    },
}

/// The whole application state, mutated only through intents.
///
/// Derived values (the selected record, panel visibility, the current phase)
/// are computed from the owned state on demand and never stored.
#[derive(Debug)]
pub struct App {
    registry: LocationRegistry,
    selection: Selection,
    wallet: Wallet,
    reward: RewardPolicy,
    verification: VerificationMachine,
    timers: TimerQueue<PhaseEvent>,
    feed: EventBus,
    metrics: Metrics,
    clock: Clock,
}

impl App {
    pub fn new(config: &BountyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_parts(
            config.registry()?,
            Wallet::new(config.starting_balance),
            config.reward,
            VerificationMachine::new(config.timeline),
            EventBus::with_capacity_limit(config.feed_capacity),
        ))
    }

    pub fn from_parts(
        registry: LocationRegistry,
        wallet: Wallet,
        reward: RewardPolicy,
        verification: VerificationMachine,
        feed: EventBus,
    ) -> Self {
        let mut metrics = Metrics::new();
        metrics.set_gauge("wallet.balance_cents", wallet.balance().cents() as i64);
        Self {
            registry,
            selection: Selection::new(),
            wallet,
            reward,
            verification,
            timers: TimerQueue::new(),
            feed,
            metrics,
            clock: Clock::new(),
        }
    }

    /// Selects the beacon `id`.
    ///
    /// Moving the selection to a different beacon cancels any verification in
    /// flight; re-selecting the current beacon changes nothing.
    pub fn select_beacon(&mut self, id: LocationId) -> Result<SelectOutcome, Rejected> {
        let change = match self.selection.select(id, &self.registry) {
            Ok(change) => change,
            Err(err) => return Err(self.reject(err.into())),
        };
        let SelectChange::Changed { previous } = change else {
            return Ok(SelectOutcome::Unchanged);
        };
        let cancelled = self.cancel_session("selection changed");
        if let Some(location) = self.registry.get(id) {
            let line = format!("Selected {} ({})", location.name, location.status);
            self.feed.emit(self.clock.now(), "select", line);
        }
        Ok(SelectOutcome::Selected {
            previous,
            cancelled,
        })
    }

    /// Picks the beacon under `ray` and selects it.
    pub fn pick_beacon(&mut self, ray: Ray, opts: PickOptions) -> Result<SelectOutcome, Rejected> {
        match pick_beacon(&self.registry, ray, opts) {
            Some(hit) => self.select_beacon(hit.location),
            None => Err(self.reject(Rejected::NothingPicked)),
        }
    }

    /// Closes the bounty panel: clears the selection and cancels any session.
    pub fn close_panel(&mut self) -> Option<SessionId> {
        let cancelled = self.cancel_session("panel closed");
        if self.selection.clear().is_some() {
            self.feed.emit(self.clock.now(), "close", "Panel closed");
        }
        cancelled
    }

    /// Starts a verification session for the selected, stale location.
    pub fn submit_bounty(&mut self, submission: Submission) -> Result<SessionId, Rejected> {
        match self.try_start(submission) {
            Ok(id) => Ok(id),
            Err(err) => Err(self.reject(err)),
        }
    }

    /// Moves time forward to `now` and delivers every phase event that fell
    /// due, in order. Earlier times are ignored.
    pub fn advance_to(&mut self, now: Time) -> Vec<Applied> {
        if !self.clock.advance_to(now) {
            return Vec::new();
        }
        let due = self.timers.pop_due(now);
        let mut applied = Vec::with_capacity(due.len());
        for timer in due {
            let outcome = self.verification.apply(timer.payload);
            self.on_applied(timer.due, &outcome);
            applied.push(outcome);
        }
        applied
    }

    pub fn now(&self) -> Time {
        self.clock.now()
    }

    pub fn registry(&self) -> &LocationRegistry {
        &self.registry
    }

    pub fn locations(&self) -> &[Location] {
        self.registry.all()
    }

    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.registry.get(id)
    }

    pub fn selected_id(&self) -> Option<LocationId> {
        self.selection.id()
    }

    pub fn current(&self) -> Option<&Location> {
        self.selection.current(&self.registry)
    }

    pub fn phase(&self) -> Phase {
        self.verification.phase()
    }

    pub fn session(&self) -> Option<&Session> {
        self.verification.active()
    }

    pub fn balance(&self) -> Credits {
        self.wallet.balance()
    }

    /// Reward a bounty on `location` would pay right now.
    pub fn reward_for(&self, location: &Location) -> Credits {
        self.reward.reward_for(location)
    }

    pub fn feed(&self) -> &EventBus {
        &self.feed
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn search(&self, query: &str) -> Result<Vec<&Location>, Rejected> {
        Ok(self.registry.search(query)?)
    }

    pub fn by_category(&self, category: Category) -> Vec<&Location> {
        self.registry.by_category(category).collect()
    }

    pub fn categories(&self) -> Vec<Category> {
        self.registry.categories()
    }

    pub fn page(&self, limit: usize, offset: usize) -> &[Location] {
        self.registry.page(limit, offset)
    }

    fn try_start(&mut self, submission: Submission) -> Result<SessionId, Rejected> {
        if let Some(active) = self.verification.active() {
            return Err(Rejected::SessionInFlight(active.id));
        }
        let location = self.current().ok_or(Rejected::NoSelection)?;
        let evidence = submission.into_evidence()?;
        if location.status != Status::Stale {
            return Err(Rejected::NotStale(location.id));
        }
        let target = location.id;
        let name = location.name.clone();
        let reward = self.reward.reward_for(location);
        let now = self.clock.now();

        let (id, schedule) = self.verification.start(target, evidence, reward, now)?;
        for (due, event) in schedule {
            self.timers.schedule(due, event);
        }
        self.metrics.incr("bounty.submitted");
        self.feed
            .emit(now, "bounty", format!("Bounty {id} submitted for {name}"));
        self.feed.emit(now, "phase", Phase::Scanning.label());
        info!(session = %id, %target, %reward, "bounty submitted");
        Ok(id)
    }

    fn on_applied(&mut self, at: Time, outcome: &Applied) {
        match outcome {
            Applied::Discarded(event) => {
                self.metrics.incr("timers.discarded");
                warn!(session = %event.session, step = ?event.step, "discarded stale phase event");
            }
            Applied::Advanced { phase, .. } => {
                let label = match phase {
                    Phase::Verdict => format!("{}. {APPROVAL_NOTE}", phase.label()),
                    other => other.label().to_string(),
                };
                self.feed.emit(at, "phase", label);
            }
            Applied::Completed(done) => self.complete(at, done),
        }
    }

    /// Flips the target to fresh and credits the wallet, both or neither.
    fn complete(&mut self, at: Time, done: &Completion) {
        if let Err(err) = self.registry.set_status(done.target, Status::Fresh) {
            warn!(session = %done.session, %err, "completion target vanished; no credit");
            return;
        }
        let balance = self.wallet.credit(done.reward);

        self.metrics.incr("bounty.completed");
        self.metrics
            .set_gauge("wallet.balance_cents", balance.cents() as i64);
        self.metrics.observe(
            "bounty.latency_ms",
            (at.since(done.started_at) * 1000.0).round() as i64,
        );
        let name = self
            .registry
            .get(done.target)
            .map_or_else(|| done.target.to_string(), |l| l.name.clone());
        self.feed.emit(
            at,
            "reward",
            format!("{name} marked fresh, +{} (balance {balance})", done.reward),
        );
        info!(session = %done.session, target = %done.target, %balance, "bounty verified");
    }

    fn cancel_session(&mut self, reason: &'static str) -> Option<SessionId> {
        let session = self.verification.invalidate()?;
        let dropped = self.timers.cancel_where(|e| e.session == session.id);
        self.metrics.incr("bounty.cancelled");
        self.feed.emit(
            self.clock.now(),
            "cancel",
            format!("Verification {} cancelled ({reason})", session.id),
        );
        info!(session = %session.id, dropped, reason, "verification cancelled");
        Some(session.id)
    }

    fn reject(&mut self, err: Rejected) -> Rejected {
        self.metrics.incr("intent.rejected");
        warn!(%err, "intent rejected");
        err
    }
}

#[cfg(test)]
mod tests {
    use super::{App, SelectOutcome};
    use crate::config::BountyConfig;
    use crate::error::Rejected;
    use crate::verification::{Phase, Submission};
    use crate::wallet::Credits;
    use foundation::ids::LocationId;
    use foundation::math::Vec3;
    use foundation::time::Time;
    use scene::Status;
    use scene::picking::{PickOptions, Ray};

    fn app() -> App {
        App::new(&BountyConfig::default()).expect("default config")
    }

    const CAFE: LocationId = LocationId(1);
    const CAMERA: LocationId = LocationId(3);

    #[test]
    fn submit_without_selection_is_rejected() {
        let mut app = app();
        assert_eq!(
            app.submit_bounty(Submission::with_image("photo.jpg")),
            Err(Rejected::NoSelection)
        );
        assert_eq!(app.phase(), Phase::Idle);
        assert_eq!(app.metrics().counter("intent.rejected"), 1);
    }

    #[test]
    fn submit_for_fresh_location_is_rejected() {
        let mut app = app();
        app.select_beacon(CAMERA).expect("known");
        assert_eq!(
            app.submit_bounty(Submission::with_image("photo.jpg")),
            Err(Rejected::NotStale(CAMERA))
        );
        assert_eq!(app.pending_timers(), 0);
    }

    #[test]
    fn second_submission_while_in_flight_is_rejected() {
        let mut app = app();
        app.select_beacon(CAFE).expect("known");
        let id = app
            .submit_bounty(Submission::with_image("photo.jpg"))
            .expect("start");
        app.advance_to(Time(1.0));
        assert_eq!(
            app.submit_bounty(Submission::with_image("again.jpg")),
            Err(Rejected::SessionInFlight(id))
        );
        assert_eq!(app.pending_timers(), 3);
    }

    #[test]
    fn closing_panel_cancels_pending_effects() {
        let mut app = app();
        app.select_beacon(CAFE).expect("known");
        let id = app
            .submit_bounty(Submission::with_image("photo.jpg"))
            .expect("start");
        app.advance_to(Time(2.0));
        assert_eq!(app.phase(), Phase::CrossReferencing);

        assert_eq!(app.close_panel(), Some(id));
        assert_eq!(app.pending_timers(), 0);
        app.advance_to(Time(10.0));

        assert_eq!(app.phase(), Phase::Idle);
        assert_eq!(app.location(CAFE).map(|l| l.status), Some(Status::Stale));
        assert_eq!(app.balance(), Credits::whole(100));
        assert!(app.current().is_none());
    }

    #[test]
    fn switching_selection_cancels_but_reselect_does_not() {
        let mut app = app();
        app.select_beacon(CAFE).expect("known");
        let id = app
            .submit_bounty(Submission::with_image("photo.jpg"))
            .expect("start");

        assert_eq!(app.select_beacon(CAFE), Ok(SelectOutcome::Unchanged));
        assert_eq!(app.phase(), Phase::Scanning);

        assert_eq!(
            app.select_beacon(CAMERA),
            Ok(SelectOutcome::Selected {
                previous: Some(CAFE),
                cancelled: Some(id),
            })
        );
        app.advance_to(Time(5.0));
        assert_eq!(app.balance(), Credits::whole(100));
        assert_eq!(app.metrics().counter("bounty.cancelled"), 1);
    }

    #[test]
    fn unknown_beacon_keeps_selection() {
        let mut app = app();
        app.select_beacon(CAMERA).expect("known");
        assert_eq!(
            app.select_beacon(LocationId(77)),
            Err(Rejected::UnknownLocation(LocationId(77)))
        );
        assert_eq!(app.selected_id(), Some(CAMERA));
    }

    #[test]
    fn time_does_not_run_backwards() {
        let mut app = app();
        app.advance_to(Time(3.0));
        assert!(app.advance_to(Time(1.0)).is_empty());
        assert_eq!(app.now(), Time(3.0));
    }

    #[test]
    fn pick_selects_beacon_under_ray() {
        let mut app = app();
        let down = Ray::new(Vec3::new(-4.0, 10.0, -2.0), Vec3::new(0.0, -1.0, 0.0));
        app.pick_beacon(down, PickOptions::default()).expect("hit");
        assert_eq!(app.selected_id(), Some(CAFE));

        let up = Ray::new(Vec3::new(50.0, 10.0, 50.0), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(
            app.pick_beacon(up, PickOptions::default()),
            Err(Rejected::NothingPicked)
        );
        assert_eq!(app.selected_id(), Some(CAFE));
    }

    #[test]
    fn feed_narrates_the_session() {
        let mut app = app();
        app.select_beacon(CAFE).expect("known");
        app.submit_bounty(Submission::with_image("photo.jpg"))
            .expect("start");
        app.advance_to(Time(4.0));
        let kinds: Vec<&str> = app.feed().events().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec!["select", "bounty", "phase", "phase", "phase", "reward"]
        );
        let last = app.feed().recent(1)[0];
        assert_eq!(
            last.message,
            "The Grand Cafe marked fresh, +15.00 (balance 115.00)"
        );
    }

    #[test]
    fn search_surfaces_registry_errors_as_rejections() {
        let app = app();
        assert!(matches!(app.search("ox"), Err(Rejected::InvalidQuery(_))));
        assert_eq!(app.search("market").expect("ok").len(), 1);
    }

    #[test]
    fn listing_projections_follow_the_seed() {
        let app = app();
        assert_eq!(app.categories().len(), 5);
        let names: Vec<&str> = app.page(2, 1).iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Blackwell's Bookshop", "Radcliffe Camera"]);
    }
}
