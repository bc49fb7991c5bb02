//! Lifecycle manager: the public face of the crate.
//!
//! A [`Notifier`] validates caller input, keeps the [`NoticeStore`] and the
//! [`Scheduler`] in step and drives the [`Renderer`]. All state sits behind
//! one mutex, so timer callbacks and caller operations are applied one at a
//! time, the way a UI event loop would run them.

mod singleton;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use crate::Result;
use crate::config::Config;
use crate::error::Error;
use crate::render::Renderer;
use crate::scheduler::{Dispatch, Scheduler, TimerKey, TimerPurpose, TimerToken};
use crate::store::{ActiveEntry, NoticeStore, Phase};
use crate::types::{NoticeId, NoticeRequest, NoticeStatus, Severity};

/// Point-in-time view of one notice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoticeSnapshot {
    pub id: NoticeId,
    pub message: String,
    pub severity: Severity,
    pub duration: Duration,
    pub closable: bool,
    pub status: NoticeStatus,
    /// Auto-dismiss suspended by a hovering pointer.
    pub paused: bool,
}

/// Cloneable handle to one notification surface.
#[derive(Clone)]
pub struct Notifier {
    shared: Arc<Mutex<State>>,
}

struct State {
    config: Config,
    store: NoticeStore,
    scheduler: Scheduler,
    renderer: Box<dyn Renderer>,
    runtime: Handle,
    render_pass: Option<JoinHandle<()>>,
    destroyed: bool,
    me: Weak<Mutex<State>>,
}

fn lock(shared: &Mutex<State>) -> MutexGuard<'_, State> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Notifier {
    /// Builds a standalone notifier on the current tokio runtime, injecting
    /// the presentation and creating the container up front.
    ///
    /// The runtime must be a current-thread one. Render passes and timers run
    /// as tasks on it, so a render pass only starts once the caller yields:
    /// every notice queued in between belongs to the same staggered batch.
    ///
    /// Most hosts want [`Notifier::get_or_create`] instead, which keeps one
    /// instance per process.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`] when called outside a tokio runtime or on a
    /// multi-thread one.
    pub fn new(config: Config, mut renderer: Box<dyn Renderer>) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|err| Error::Runtime(err.to_string()))?;
        if runtime.runtime_flavor() != RuntimeFlavor::CurrentThread {
            return Err(Error::Runtime(format!(
                "notifier needs a current-thread runtime, found {:?}",
                runtime.runtime_flavor()
            )));
        }
        renderer.ensure_presentation_injected_once();
        renderer.ensure_container();

        let shared = Arc::new_cyclic(|me: &Weak<Mutex<State>>| {
            let target = me.clone();
            let dispatch: Dispatch = Arc::new(move |key: TimerKey, token: TimerToken| {
                if let Some(shared) = target.upgrade() {
                    lock(&shared).on_timer(key, token);
                }
            });
            Mutex::new(State {
                scheduler: Scheduler::new(runtime.clone(), config.stagger_step, dispatch),
                config,
                store: NoticeStore::new(),
                renderer,
                runtime,
                render_pass: None,
                destroyed: false,
                me: me.clone(),
            })
        });
        Ok(Self { shared })
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        lock(&self.shared)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Queues a notice. Blank messages are logged and dropped; a `severity`
    /// other than the exact names `success`, `error`, `warning` or `info`
    /// becomes `info` and a negative or non-finite duration becomes the
    /// configured default. Zero seconds keeps the notice until closed.
    ///
    /// A destroyed notifier drops every notice, and so does each clone of
    /// its handle. Hosts that keep a handle across [`Notifier::destroy`]
    /// should resolve it again through [`Notifier::get_or_create`], which
    /// builds a fresh instance.
    pub fn add(&self, message: &str, severity: &str, duration_secs: f64, closable: bool) {
        self.push(
            NoticeRequest::new(message)
                .severity(severity)
                .duration_secs(duration_secs)
                .closable(closable),
        );
    }

    pub fn success(&self, message: &str, duration_secs: Option<f64>) {
        self.shortcut(Severity::Success, message, duration_secs);
    }

    pub fn error(&self, message: &str, duration_secs: Option<f64>) {
        self.shortcut(Severity::Error, message, duration_secs);
    }

    pub fn warning(&self, message: &str, duration_secs: Option<f64>) {
        self.shortcut(Severity::Warning, message, duration_secs);
    }

    pub fn info(&self, message: &str, duration_secs: Option<f64>) {
        self.shortcut(Severity::Info, message, duration_secs);
    }

    fn shortcut(&self, severity: Severity, message: &str, duration_secs: Option<f64>) {
        let mut state = self.lock();
        let secs = duration_secs
            .unwrap_or_else(|| state.config.durations.for_severity(severity).as_secs_f64());
        state.push(
            NoticeRequest::new(message)
                .severity(severity.as_str())
                .duration_secs(secs),
        );
    }

    /// Queues a notice and returns its id, or `None` when it was rejected.
    ///
    /// The reveal happens in a render pass scheduled on the runtime; every
    /// notice pushed before that pass runs is staggered with it.
    pub fn push(&self, request: NoticeRequest) -> Option<NoticeId> {
        self.lock().push(request)
    }

    /// Queues several notices and renders them right away as one batch.
    pub fn push_batch(&self, requests: impl IntoIterator<Item = NoticeRequest>) -> Vec<NoticeId> {
        let mut state = self.lock();
        let ids = requests
            .into_iter()
            .filter_map(|request| state.push(request))
            .collect();
        state.render();
        ids
    }

    /// Runs the pending render pass now instead of waiting for the runtime.
    pub fn flush(&self) {
        self.lock().render();
    }

    /// Removes every notice whose message equals `message`, whatever its
    /// phase. Mounted ones disappear without the hide transition.
    pub fn close_by_message(&self, message: &str) {
        self.lock().close_by_message(message);
    }

    /// Manual close, as triggered by the close button of a mounted notice.
    /// Ignored for notices that are not closable.
    pub fn close(&self, id: NoticeId) {
        self.lock().manual_close(id);
    }

    pub fn pointer_enter(&self, id: NoticeId) {
        self.lock().pointer_enter(id);
    }

    pub fn pointer_leave(&self, id: NoticeId) {
        self.lock().pointer_leave(id);
    }

    /// Cancels every timer, drops every notice and tears the rendering
    /// surface down. A process-wide instance is released so the next
    /// [`Notifier::get_or_create`] starts from scratch. Calling it again is a
    /// no-op.
    pub fn destroy(&self) {
        let torn_down = self.lock().destroy();
        if torn_down {
            singleton::release(self);
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.lock().destroyed
    }

    /// Current status of `id`; notices this notifier no longer holds (or
    /// never held) report [`NoticeStatus::Removed`].
    pub fn status(&self, id: NoticeId) -> NoticeStatus {
        self.lock().store.status(id).unwrap_or(NoticeStatus::Removed)
    }

    pub fn notices(&self) -> Vec<NoticeSnapshot> {
        self.lock()
            .store
            .records()
            .map(|record| NoticeSnapshot {
                id: record.notice.id,
                message: record.notice.message.clone(),
                severity: record.notice.severity,
                duration: record.notice.duration,
                closable: record.notice.closable,
                status: record.phase.status(),
                paused: matches!(record.phase, Phase::Active { paused: true, .. }),
            })
            .collect()
    }

    pub fn pending_count(&self) -> usize {
        self.lock().store.pending_len()
    }

    pub fn active_count(&self) -> usize {
        self.lock().store.active_len()
    }

    pub fn live_timers(&self) -> usize {
        self.lock().scheduler.live_count()
    }
}

impl State {
    fn push(&mut self, request: NoticeRequest) -> Option<NoticeId> {
        if self.destroyed {
            warn!("notifier was destroyed; dropping notification");
            return None;
        }
        let notice = match request.validate(&self.config) {
            Ok(notice) => notice,
            Err(err) => {
                error!(error = %err, "rejecting notification");
                return None;
            }
        };
        let id = notice.id;
        debug!(
            notice_id = %id,
            severity = %notice.severity,
            duration_ms = u64::try_from(notice.duration.as_millis()).unwrap_or(u64::MAX),
            closable = notice.closable,
            "notice queued"
        );
        self.store.enqueue(notice);
        self.request_render();
        Some(id)
    }

    fn request_render(&mut self) {
        if self.render_pass.is_some() {
            return;
        }
        let me = self.me.clone();
        self.render_pass = Some(self.runtime.spawn(async move {
            if let Some(shared) = me.upgrade() {
                lock(&shared).render();
            }
        }));
    }

    fn render(&mut self) {
        if let Some(task) = self.render_pass.take() {
            task.abort();
        }
        if self.destroyed {
            return;
        }
        let batch = self.store.drain_pending();
        if batch.is_empty() {
            return;
        }
        trace!(batch = batch.len(), "render pass");
        for (index, notice) in batch.iter().enumerate() {
            self.scheduler.schedule_reveal(notice.id, index);
        }
    }

    fn on_timer(&mut self, key: TimerKey, token: TimerToken) {
        if self.destroyed || !self.scheduler.claim(key, token) {
            trace!(notice_id = %key.id, purpose = ?key.purpose, "ignoring stale timer");
            return;
        }
        match key.purpose {
            TimerPurpose::RevealStagger => self.reveal(key.id),
            TimerPurpose::AutoDismiss => {
                debug!(notice_id = %key.id, "auto-dismiss elapsed");
                self.hide_and_remove(key.id);
            }
            TimerPurpose::HideTransition => self.finish_hide(key.id),
        }
    }

    fn reveal(&mut self, id: NoticeId) {
        let notice = match self.store.get(id) {
            Some(record) if record.phase == Phase::Staggered => record.notice.clone(),
            _ => return,
        };
        let handle = self.renderer.mount(&notice);
        self.store.activate(
            id,
            ActiveEntry {
                handle,
                severity: notice.severity,
                message: notice.message.clone(),
                duration: notice.duration,
            },
        );
        self.renderer.reveal(handle);
        self.store.promote(id);
        debug!(notice_id = %id, %handle, "notice revealed");

        if notice.auto_dismisses() {
            self.scheduler.arm_auto_dismiss(id, notice.duration);
        }
    }

    fn hide_and_remove(&mut self, id: NoticeId) {
        let Some(entry) = self.store.begin_hide(id) else {
            return;
        };
        self.scheduler.cancel_all(id);
        let transition = self.renderer.hide(entry.handle);
        self.scheduler.arm_hide(id, transition);
    }

    fn finish_hide(&mut self, id: NoticeId) {
        match self.store.get(id).map(|r| &r.phase) {
            Some(Phase::Hiding(_)) => {}
            _ => return,
        }
        if let Some(entry) = self.store.deactivate(id).and_then(|r| r.phase.entry().cloned()) {
            self.renderer.finish_hide(entry.handle);
        }
        debug!(notice_id = %id, "notice removed");
    }

    fn manual_close(&mut self, id: NoticeId) {
        if self.destroyed {
            return;
        }
        let closable = self.store.get(id).is_some_and(|r| r.notice.closable);
        if !closable {
            debug!(notice_id = %id, "close requested for unknown or non-closable notice");
            return;
        }
        self.hide_and_remove(id);
    }

    fn pointer_enter(&mut self, id: NoticeId) {
        if self.destroyed || self.hover_target(id).is_none() {
            return;
        }
        self.scheduler.pause_auto_dismiss(id);
        self.store.set_paused(id, true);
        trace!(notice_id = %id, "auto-dismiss paused");
    }

    fn pointer_leave(&mut self, id: NoticeId) {
        if self.destroyed {
            return;
        }
        let Some(duration) = self.hover_target(id) else {
            return;
        };
        self.scheduler.resume_auto_dismiss(id, duration);
        self.store.set_paused(id, false);
        trace!(notice_id = %id, "auto-dismiss restarted");
    }

    /// Display duration of an active, auto-dismissing notice.
    fn hover_target(&self, id: NoticeId) -> Option<Duration> {
        match self.store.get(id).map(|r| &r.phase) {
            Some(Phase::Active { entry, .. }) if !entry.duration.is_zero() => Some(entry.duration),
            _ => None,
        }
    }

    fn close_by_message(&mut self, message: &str) {
        if self.destroyed {
            warn!("notifier was destroyed; ignoring close request");
            return;
        }
        let mut closed = 0_usize;
        for notice in self.store.find_pending_by_message(message) {
            self.scheduler.cancel_all(notice.id);
            self.store.deactivate(notice.id);
            closed += 1;
        }
        for (id, entry) in self.store.find_active_by_message(message) {
            self.scheduler.cancel_all(id);
            self.renderer.remove_immediately(entry.handle);
            self.store.deactivate(id);
            closed += 1;
        }
        if closed > 0 {
            debug!(closed, "closed notices by message");
        }
    }

    fn destroy(&mut self) -> bool {
        if self.destroyed {
            debug!("notifier already destroyed");
            return false;
        }
        self.scheduler.cancel_everything();
        if let Some(task) = self.render_pass.take() {
            task.abort();
        }
        let mounted = self.store.clear();
        self.renderer.teardown();
        self.destroyed = true;
        info!(mounted = mounted.len(), "notifier destroyed");
        true
    }
}
