// ==============================================================================
// schedule.rs — PER-WORLD STEP SCHEDULE
// ------------------------------------------------------------------------------
// Owned by the stepping loop:
// - pre-step / post-step subscriber lists (object ids)
// - subscribe / unsubscribe requests are queued and only applied between
//   ticks (apply_pending), never while a list is being dispatched
// - "taints": deferred mutations keyed by (object, action), posted at most
//   once per tick and run at the start of the next tick
// ==============================================================================

use tracing::debug;

/// Host-local object id.
pub type LocalId = u32;

/// Deferred work the stepping loop performs on an object before stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Taint {
    /// Push vehicle physical properties (mass, friction, damping, gravity) to the body.
    RefreshVehicle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HookChange {
    Subscribe(LocalId),
    Unsubscribe(LocalId),
}

#[derive(Debug, Default)]
pub struct StepSchedule {
    pre_step: Vec<LocalId>,
    post_step: Vec<LocalId>,
    pending: Vec<HookChange>,
    taints: Vec<(LocalId, Taint)>,
}

impl StepSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for pre-step and post-step callbacks from the next tick on.
    pub fn subscribe(&mut self, id: LocalId) {
        self.pending.push(HookChange::Subscribe(id));
    }

    pub fn unsubscribe(&mut self, id: LocalId) {
        self.pending.push(HookChange::Unsubscribe(id));
    }

    /// Apply queued subscription changes in the order they were requested.
    pub fn apply_pending(&mut self) {
        for change in self.pending.drain(..) {
            match change {
                HookChange::Subscribe(id) => {
                    if !self.pre_step.contains(&id) {
                        self.pre_step.push(id);
                    }
                    if !self.post_step.contains(&id) {
                        self.post_step.push(id);
                    }
                    debug!(id, "step hooks registered");
                }
                HookChange::Unsubscribe(id) => {
                    self.pre_step.retain(|s| *s != id);
                    self.post_step.retain(|s| *s != id);
                    debug!(id, "step hooks removed");
                }
            }
        }
    }

    pub fn pre_step_subscribers(&self) -> &[LocalId] {
        &self.pre_step
    }

    pub fn post_step_subscribers(&self) -> &[LocalId] {
        &self.post_step
    }

    pub fn is_subscribed(&self, id: LocalId) -> bool {
        self.pre_step.contains(&id)
    }

    /// Queue `taint` for `id`. Posting the same pair again before it runs is a no-op.
    pub fn post_taint(&mut self, id: LocalId, taint: Taint) {
        if !self.taints.contains(&(id, taint)) {
            self.taints.push((id, taint));
        }
    }

    pub fn pending_taints(&self) -> usize {
        self.taints.len()
    }

    /// Hand over queued taints, leaving the queue empty.
    pub fn take_taints(&mut self) -> Vec<(LocalId, Taint)> {
        std::mem::take(&mut self.taints)
    }

    /// Drop everything scheduled for an object that is leaving the world.
    pub fn forget(&mut self, id: LocalId) {
        self.pre_step.retain(|s| *s != id);
        self.post_step.retain(|s| *s != id);
        self.pending.retain(|c| !matches!(c, HookChange::Subscribe(s) | HookChange::Unsubscribe(s) if *s == id));
        self.taints.retain(|(s, _)| *s != id);
    }
}
