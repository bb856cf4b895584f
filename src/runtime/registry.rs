use crate::core::InstanceId;
use crate::core::options::FilterOptions;
use crate::runtime::effect::Effect;
use crate::runtime::instance::FilterInstance;
use crate::runtime::intent::Intent;
use crate::ui::placement::Viewport;
use indexmap::IndexMap;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attached {
    /// The host should start listening for viewport resizes.
    pub install_resize_listener: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Detached {
    pub effects: Vec<Effect>,
    /// The last instance is gone; the host should stop listening.
    pub remove_resize_listener: bool,
}

/// All live instances of one host process, in attach order. The shared
/// resize listener exists exactly while the registry is non-empty.
#[derive(Debug, Default)]
pub struct Registry {
    instances: IndexMap<InstanceId, FilterInstance>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn has_resize_listener(&self) -> bool {
        !self.instances.is_empty()
    }

    /// Registers an instance. Attaching an id that is already live replaces
    /// that instance in place.
    pub fn attach(&mut self, id: impl Into<InstanceId>, options: FilterOptions) -> Attached {
        let id = id.into();
        let was_empty = self.instances.is_empty();
        let replaced = self
            .instances
            .insert(id.clone(), FilterInstance::new(options))
            .is_some();
        debug!(instance = %id, replaced, live = self.instances.len(), "attach");
        Attached {
            install_resize_listener: was_empty,
        }
    }

    pub fn detach(&mut self, id: &str) -> Option<Detached> {
        let mut instance = self.instances.shift_remove(id)?;
        let effects = instance.detach();
        debug!(instance = id, live = self.instances.len(), "detach");
        Some(Detached {
            effects,
            remove_resize_listener: self.instances.is_empty(),
        })
    }

    pub fn get(&self, id: &str) -> Option<&FilterInstance> {
        self.instances.get(id)
    }

    pub fn dispatch(&mut self, id: &str, intent: Intent, now: Instant) -> Vec<Effect> {
        match self.instances.get_mut(id) {
            Some(instance) => instance.dispatch(intent, now),
            None => Vec::new(),
        }
    }

    /// Pushes a new viewport to every instance; visible popups come back
    /// with a reposition.
    pub fn resize(&mut self, viewport: Viewport, now: Instant) -> Vec<(InstanceId, Vec<Effect>)> {
        self.instances
            .iter_mut()
            .map(|(id, instance)| (id.clone(), instance.dispatch(Intent::Resize(viewport), now)))
            .filter(|(_, effects)| !effects.is_empty())
            .collect()
    }

    pub fn advance(&mut self, now: Instant) -> Vec<(InstanceId, Vec<Effect>)> {
        self.instances
            .iter_mut()
            .map(|(id, instance)| (id.clone(), instance.advance(now)))
            .filter(|(_, effects)| !effects.is_empty())
            .collect()
    }

    pub fn poll_timeout(&self, now: Instant, default_timeout: Duration) -> Duration {
        self.instances
            .values()
            .map(|instance| instance.poll_timeout(now, default_timeout))
            .min()
            .unwrap_or(default_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::Registry;
    use crate::core::options::FilterOptions;
    use crate::runtime::effect::Effect;
    use crate::runtime::intent::Intent;
    use crate::ui::placement::{AnchorRect, Layout, Side, Viewport};
    use std::time::{Duration, Instant};

    fn options() -> FilterOptions {
        FilterOptions::new(["apple", "apricot", "avocado"])
    }

    #[test]
    fn listener_follows_first_attach_and_last_detach() {
        let mut registry = Registry::new();
        assert!(registry.attach("a", options()).install_resize_listener);
        assert!(!registry.attach("b", options()).install_resize_listener);

        let first = registry.detach("a").expect("a is live");
        assert!(!first.remove_resize_listener);
        let last = registry.detach("b").expect("b is live");
        assert!(last.remove_resize_listener);
        assert!(!registry.has_resize_listener());
        assert!(registry.detach("b").is_none());
    }

    #[test]
    fn reattach_replaces_without_double_counting() {
        let mut registry = Registry::new();
        registry.attach("a", options());
        assert!(!registry.attach("a", options()).install_resize_listener);
        assert_eq!(registry.len(), 1);
        assert!(registry.detach("a").expect("live").remove_resize_listener);
    }

    #[test]
    fn resize_repositions_only_visible_popups() {
        let mut registry = Registry::new();
        registry.attach("shown", options());
        registry.attach("hidden", options());
        let t0 = Instant::now();

        let layout = Layout::new(
            AnchorRect {
                left: 0,
                top: 20,
                width: 10,
                height: 1,
            },
            Viewport {
                height: 40,
                scroll_top: 0,
            },
        );
        for id in ["shown", "hidden"] {
            registry.dispatch(id, Intent::Layout(layout), t0);
        }
        registry.dispatch("shown", Intent::Input("ap".to_string()), t0);
        registry.advance(t0 + Duration::from_millis(150));

        let updates = registry.resize(
            Viewport {
                height: 22,
                scroll_top: 0,
            },
            t0 + Duration::from_millis(200),
        );
        assert_eq!(updates.len(), 1);
        let (id, effects) = &updates[0];
        assert_eq!(id.as_str(), "shown");
        match effects.as_slice() {
            [Effect::Reposition(placement)] => assert_eq!(placement.side, Side::Above),
            other => panic!("unexpected effects: {other:?}"),
        }
    }

    #[test]
    fn detach_hides_a_visible_popup() {
        let mut registry = Registry::new();
        registry.attach("a", options());
        let t0 = Instant::now();
        registry.dispatch("a", Intent::Input("ap".to_string()), t0);
        registry.advance(t0 + Duration::from_millis(150));
        let detached = registry.detach("a").expect("live");
        assert_eq!(detached.effects, vec![Effect::HidePopup]);
    }

    #[test]
    fn poll_timeout_is_earliest_across_instances() {
        let mut registry = Registry::new();
        registry.attach("slow", options().with_wait_time(Duration::from_millis(300)));
        registry.attach("fast", options().with_wait_time(Duration::from_millis(50)));
        let t0 = Instant::now();
        registry.dispatch("slow", Intent::Input("a".to_string()), t0);
        registry.dispatch("fast", Intent::Input("a".to_string()), t0);
        assert_eq!(
            registry.poll_timeout(t0, Duration::from_secs(1)),
            Duration::from_millis(50)
        );
        assert!(registry.dispatch("missing", Intent::Confirm, t0).is_empty());
    }
}
