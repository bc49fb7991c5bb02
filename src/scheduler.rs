//! Timer table for the notice lifecycle.
//!
//! Each timer is bound to one `(notice, purpose)` key and runs as a tokio
//! task. Arming a key always cancels its predecessor first, so at most one
//! timer per key is live. A fired timer hands its key and token to the
//! dispatch callback; the receiver must [`Scheduler::claim`] the key before
//! acting, which filters out timers cancelled after they already woke up.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::trace;

use crate::types::NoticeId;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TimerPurpose {
    RevealStagger,
    AutoDismiss,
    HideTransition,
}

impl TimerPurpose {
    pub const ALL: [Self; 3] = [Self::RevealStagger, Self::AutoDismiss, Self::HideTransition];
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TimerKey {
    pub id: NoticeId,
    pub purpose: TimerPurpose,
}

impl TimerKey {
    pub const fn new(id: NoticeId, purpose: TimerPurpose) -> Self {
        Self { id, purpose }
    }
}

/// Identifies one arming of a key.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimerToken(u64);

pub type Dispatch = Arc<dyn Fn(TimerKey, TimerToken) + Send + Sync>;

struct TimerSlot {
    token: TimerToken,
    task: JoinHandle<()>,
}

pub struct Scheduler {
    runtime: Handle,
    stagger_step: Duration,
    dispatch: Dispatch,
    timers: HashMap<TimerKey, TimerSlot>,
    next_token: u64,
}

impl Scheduler {
    pub fn new(runtime: Handle, stagger_step: Duration, dispatch: Dispatch) -> Self {
        Self {
            runtime,
            stagger_step,
            dispatch,
            timers: HashMap::new(),
            next_token: 0,
        }
    }

    /// Arms the reveal of the `stagger_index`-th notice of a render pass.
    pub fn schedule_reveal(&mut self, id: NoticeId, stagger_index: usize) {
        let factor = u32::try_from(stagger_index).unwrap_or(u32::MAX);
        let delay = self.stagger_step.saturating_mul(factor);
        self.arm(TimerKey::new(id, TimerPurpose::RevealStagger), delay);
    }

    pub fn arm_auto_dismiss(&mut self, id: NoticeId, duration: Duration) {
        self.arm(TimerKey::new(id, TimerPurpose::AutoDismiss), duration);
    }

    /// Stops the countdown without touching the notice itself.
    pub fn pause_auto_dismiss(&mut self, id: NoticeId) -> bool {
        self.cancel(TimerKey::new(id, TimerPurpose::AutoDismiss))
    }

    /// Restarts the countdown for the full `duration`; time already spent
    /// before the pause is not credited.
    pub fn resume_auto_dismiss(&mut self, id: NoticeId, duration: Duration) {
        self.arm_auto_dismiss(id, duration);
    }

    pub fn arm_hide(&mut self, id: NoticeId, transition: Duration) {
        self.arm(TimerKey::new(id, TimerPurpose::HideTransition), transition);
    }

    pub fn cancel_all(&mut self, id: NoticeId) {
        for purpose in TimerPurpose::ALL {
            self.cancel(TimerKey::new(id, purpose));
        }
    }

    pub fn cancel_everything(&mut self) {
        for (_, slot) in self.timers.drain() {
            slot.task.abort();
        }
    }

    /// Accepts a fired timer if it is still the live one for its key and
    /// removes it from the table.
    pub fn claim(&mut self, key: TimerKey, token: TimerToken) -> bool {
        match self.timers.get(&key) {
            Some(slot) if slot.token == token => {
                self.timers.remove(&key);
                true
            }
            _ => false,
        }
    }

    pub fn is_armed(&self, key: TimerKey) -> bool {
        self.timers.contains_key(&key)
    }

    pub fn live_count(&self) -> usize {
        self.timers.len()
    }

    fn arm(&mut self, key: TimerKey, delay: Duration) {
        self.cancel(key);
        self.next_token += 1;
        let token = TimerToken(self.next_token);
        let dispatch = Arc::clone(&self.dispatch);
        trace!(
            notice_id = %key.id,
            purpose = ?key.purpose,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "arming timer"
        );
        let task = self.runtime.spawn(async move {
            sleep(delay).await;
            dispatch(key, token);
        });
        self.timers.insert(key, TimerSlot { token, task });
    }

    fn cancel(&mut self, key: TimerKey) -> bool {
        self.timers.remove(&key).is_some_and(|slot| {
            slot.task.abort();
            true
        })
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel_everything();
    }
}
