//! Rendering collaborator used by the [`Notifier`](crate::Notifier).
//!
//! The notifier owns all timing; a renderer only turns notices into
//! elements and plays transitions when told to.

pub mod html;
pub mod markup;

use std::fmt;
use std::time::Duration;

use crate::types::Notice;

pub use html::{Document, DocumentHandle, Element, HtmlRenderer};

/// Opaque reference to a mounted element, chosen by the renderer.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ElementHandle(pub u64);

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

/// Surface the lifecycle manager draws on.
///
/// Implementations must not call back into the notifier from these methods;
/// they run while the notifier state is locked.
pub trait Renderer: Send {
    /// Installs the stylesheet. Repeated calls must not inject it twice.
    fn ensure_presentation_injected_once(&mut self);

    /// Creates the stacking container if it is missing.
    fn ensure_container(&mut self);

    fn mount(&mut self, notice: &Notice) -> ElementHandle;

    /// Starts the show transition of a mounted element.
    fn reveal(&mut self, handle: ElementHandle);

    /// Starts the hide transition and returns how long it lasts. The
    /// notifier calls [`Renderer::finish_hide`] once that time has elapsed.
    fn hide(&mut self, handle: ElementHandle) -> Duration;

    /// Detaches an element whose hide transition has completed.
    fn finish_hide(&mut self, handle: ElementHandle);

    /// Detaches an element at once, without any transition.
    fn remove_immediately(&mut self, handle: ElementHandle);

    /// Removes the container and the injected presentation.
    fn teardown(&mut self);
}
