use crate::core::options::FilterOptions;
use crate::runtime::effect::Effect;
use crate::runtime::intent::Intent;
use crate::runtime::reducer::Reducer;
use crate::runtime::scheduler::Scheduler;
use crate::state::session::FilterSession;
use std::time::{Duration, Instant};

/// One attached widget: its session plus the timers it owns.
///
/// Every entry point takes `now` so callers (and tests) drive time
/// explicitly. Scheduling effects are consumed here; everything returned is
/// for the host to apply.
#[derive(Debug)]
pub struct FilterInstance {
    session: FilterSession,
    scheduler: Scheduler,
}

impl FilterInstance {
    pub fn new(options: FilterOptions) -> Self {
        Self {
            session: FilterSession::new(options),
            scheduler: Scheduler::new(),
        }
    }

    pub fn session(&self) -> &FilterSession {
        &self.session
    }

    pub fn dispatch(&mut self, intent: Intent, now: Instant) -> Vec<Effect> {
        let effects = Reducer::reduce(&mut self.session, intent);
        self.route(effects, now)
    }

    /// Fires every timer due at `now`. Each fired intent is reduced against
    /// the session as it is at that moment.
    pub fn advance(&mut self, now: Instant) -> Vec<Effect> {
        let mut out = Vec::new();
        for intent in self.scheduler.drain_ready(now) {
            out.extend(self.dispatch(intent, now));
        }
        out
    }

    pub fn poll_timeout(&self, now: Instant, default_timeout: Duration) -> Duration {
        self.scheduler.poll_timeout(now, default_timeout)
    }

    /// Cancels every armed timer and hides the popup.
    pub fn detach(&mut self) -> Vec<Effect> {
        self.scheduler.cancel_all();
        if self.session.is_shown() {
            return self.session.hide_popup();
        }
        Vec::new()
    }

    fn route(&mut self, effects: Vec<Effect>, now: Instant) -> Vec<Effect> {
        let mut out = Vec::with_capacity(effects.len());
        for effect in effects {
            match effect {
                Effect::Schedule(command) => {
                    self.scheduler.schedule(command, now);
                }
                other => out.push(other),
            }
        }
        out
    }
}
