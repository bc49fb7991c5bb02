use std::sync::{Mutex, PoisonError};

use tracing::info;

use super::Notifier;
use crate::Result;
use crate::config::Config;
use crate::render::Renderer;

static INSTANCE: Mutex<Option<Notifier>> = Mutex::new(None);

impl Notifier {
    /// Returns the process-wide notifier, building it on first use.
    ///
    /// While an instance is live the arguments are ignored and the renderer
    /// factory is not called. After [`Notifier::destroy`] the next call
    /// builds a fresh instance, re-injecting the presentation and recreating
    /// the container.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Runtime`] when no instance is live and
    /// the call happens outside a current-thread tokio runtime.
    pub fn get_or_create<F>(config: Config, make_renderer: F) -> Result<Self>
    where
        F: FnOnce(&Config) -> Box<dyn Renderer>,
    {
        let mut slot = INSTANCE.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = slot.as_ref().filter(|n| !n.is_destroyed()) {
            return Ok(existing.clone());
        }
        let renderer = make_renderer(&config);
        let notifier = Self::new(config, renderer)?;
        *slot = Some(notifier.clone());
        info!("notifier initialised");
        Ok(notifier)
    }

    /// The live process-wide notifier, if any.
    pub fn current() -> Option<Self> {
        INSTANCE
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|n| !n.is_destroyed())
            .cloned()
    }
}

/// Forgets `notifier` if it is the registered instance.
pub(super) fn release(notifier: &Notifier) {
    let mut slot = INSTANCE.lock().unwrap_or_else(PoisonError::into_inner);
    if slot.as_ref().is_some_and(|n| n.ptr_eq(notifier)) {
        *slot = None;
    }
}
