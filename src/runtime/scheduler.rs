use crate::runtime::intent::Intent;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKey {
    Filter,
    BlurHide,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerCommand {
    /// Arms a timer for `key` unless one is already armed. Later requests
    /// neither reset nor extend the pending one.
    Coalesce {
        key: TimerKey,
        delay: Duration,
        intent: Intent,
    },
    EmitAfter {
        key: TimerKey,
        delay: Duration,
        intent: Intent,
    },
    Cancel {
        key: TimerKey,
    },
}

/// Version guard carried by an armed task. Bumping the key's version
/// invalidates every task holding an older token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerToken {
    key: TimerKey,
    version: u64,
}

#[derive(Debug, Clone)]
struct DelayedTask {
    due_at: Instant,
    token: TimerToken,
    intent: Intent,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    delayed: Vec<DelayedTask>,
    key_versions: HashMap<TimerKey, u64>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, command: SchedulerCommand, now: Instant) -> Option<TimerToken> {
        match command {
            SchedulerCommand::Coalesce { key, delay, intent } => {
                if self.is_armed(key) {
                    trace!(?key, "timer already armed, coalescing");
                    return None;
                }
                self.push(key, now, delay, intent)
            }
            SchedulerCommand::EmitAfter { key, delay, intent } => {
                self.push(key, now, delay, intent)
            }
            SchedulerCommand::Cancel { key } => {
                self.cancel(key);
                None
            }
        }
    }

    pub fn cancel_all(&mut self) {
        for key in [TimerKey::Filter, TimerKey::BlurHide] {
            self.cancel(key);
        }
    }

    pub fn is_armed(&self, key: TimerKey) -> bool {
        self.delayed
            .iter()
            .any(|task| task.token.key == key && self.token_is_valid(task.token))
    }

    /// Removes and returns the intents of every task due at `now`, earliest
    /// first.
    pub fn drain_ready(&mut self, now: Instant) -> Vec<Intent> {
        let mut due = Vec::new();
        let mut idx = 0usize;
        while idx < self.delayed.len() {
            if self.delayed[idx].due_at <= now {
                due.push(self.delayed.remove(idx));
            } else {
                idx += 1;
            }
        }

        due.sort_by_key(|task| task.due_at);
        due.into_iter()
            .filter(|task| self.token_is_valid(task.token))
            .map(|task| {
                trace!(key = ?task.token.key, "timer fired");
                task.intent
            })
            .collect()
    }

    pub fn poll_timeout(&self, now: Instant, default_timeout: Duration) -> Duration {
        let mut next = default_timeout;

        for task in &self.delayed {
            let due_in = task.due_at.saturating_duration_since(now);
            if due_in < next {
                next = due_in;
            }
        }

        next
    }

    /// A deadline past what `Instant` can represent never fires, so the task
    /// is not armed at all.
    fn push(
        &mut self,
        key: TimerKey,
        now: Instant,
        delay: Duration,
        intent: Intent,
    ) -> Option<TimerToken> {
        let Some(due_at) = now.checked_add(delay) else {
            trace!(?key, ?delay, "timer delay out of range, not armed");
            return None;
        };
        let version = *self.key_versions.entry(key).or_insert(0);
        let token = TimerToken { key, version };
        trace!(?key, "timer armed");
        self.delayed.push(DelayedTask {
            due_at,
            token,
            intent,
        });
        Some(token)
    }

    fn cancel(&mut self, key: TimerKey) {
        self.bump_version(key);
        self.delayed.retain(|task| task.token.key != key);
        trace!(?key, "timer cancelled");
    }

    fn token_is_valid(&self, token: TimerToken) -> bool {
        let current = *self.key_versions.get(&token.key).unwrap_or(&0);
        current == token.version
    }

    fn bump_version(&mut self, key: TimerKey) -> u64 {
        let entry = self.key_versions.entry(key).or_insert(0);
        *entry = entry.saturating_add(1);
        *entry
    }
}

#[cfg(test)]
mod tests {
    use super::{Scheduler, SchedulerCommand, TimerKey};
    use crate::runtime::intent::Intent;
    use std::time::{Duration, Instant};

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn coalesce(delay: u64) -> SchedulerCommand {
        SchedulerCommand::Coalesce {
            key: TimerKey::Filter,
            delay: ms(delay),
            intent: Intent::RunFilter,
        }
    }

    #[test]
    fn coalesce_keeps_first_deadline() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        assert!(scheduler.schedule(coalesce(150), t0).is_some());
        assert!(scheduler.schedule(coalesce(150), t0 + ms(30)).is_none());
        assert!(scheduler.schedule(coalesce(150), t0 + ms(60)).is_none());

        assert!(scheduler.drain_ready(t0 + ms(149)).is_empty());
        assert_eq!(scheduler.drain_ready(t0 + ms(150)), vec![Intent::RunFilter]);
        assert!(scheduler.drain_ready(t0 + ms(300)).is_empty());
    }

    #[test]
    fn coalesce_rearms_after_firing() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(coalesce(100), t0);
        assert_eq!(scheduler.drain_ready(t0 + ms(100)).len(), 1);
        assert!(!scheduler.is_armed(TimerKey::Filter));
        assert!(scheduler.schedule(coalesce(100), t0 + ms(120)).is_some());
        assert_eq!(scheduler.drain_ready(t0 + ms(220)).len(), 1);
    }

    #[test]
    fn cancel_drops_armed_timer() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(coalesce(100), t0);
        scheduler.schedule(SchedulerCommand::Cancel { key: TimerKey::Filter }, t0);
        assert!(scheduler.drain_ready(t0 + ms(500)).is_empty());
    }

    #[test]
    fn keys_are_independent() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(coalesce(150), t0);
        scheduler.schedule(
            SchedulerCommand::EmitAfter {
                key: TimerKey::BlurHide,
                delay: ms(50),
                intent: Intent::BlurElapsed,
            },
            t0,
        );
        assert_eq!(scheduler.poll_timeout(t0, ms(1000)), ms(50));
        assert_eq!(
            scheduler.drain_ready(t0 + ms(200)),
            vec![Intent::BlurElapsed, Intent::RunFilter]
        );
    }

    #[test]
    fn cancel_all_clears_everything() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(coalesce(10), t0);
        scheduler.cancel_all();
        assert_eq!(scheduler.poll_timeout(t0, ms(1000)), ms(1000));
        assert!(scheduler.drain_ready(t0 + ms(20)).is_empty());
    }

    #[test]
    fn unrepresentable_deadline_is_not_armed() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        let command = SchedulerCommand::Coalesce {
            key: TimerKey::Filter,
            delay: Duration::MAX,
            intent: Intent::RunFilter,
        };
        assert!(scheduler.schedule(command, t0).is_none());
        assert!(!scheduler.is_armed(TimerKey::Filter));
        assert_eq!(scheduler.poll_timeout(t0, ms(1000)), ms(1000));
    }
}
