use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::trace;

use super::markup::{
    CONTAINER_CLASS, HIDE_CLASS, NOTICE_CLASS, SHOW_CLASS, STYLE_CLASS, STYLESHEET, notice_markup,
};
use super::{ElementHandle, Renderer};
use crate::config::Config;
use crate::types::{Notice, NoticeId};

/// In-memory page the [`HtmlRenderer`] draws into.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    pub styles_injected: bool,
    pub container: Option<Container>,
    pub elements: BTreeMap<ElementHandle, Element>,
    /// Times the stylesheet was injected over the document's life.
    pub style_injections: usize,
    /// Times a container was created over the document's life.
    pub containers_created: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Container {
    pub attributes: Vec<(&'static str, &'static str)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    pub notice_id: NoticeId,
    pub classes: Vec<String>,
    pub attributes: Vec<(&'static str, String)>,
    pub inner_html: String,
}

impl Element {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }
}

impl Document {
    pub fn element_for(&self, notice_id: NoticeId) -> Option<&Element> {
        self.elements.values().find(|e| e.notice_id == notice_id)
    }

    /// Serialises the container and its elements, in mount order.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        if self.styles_injected {
            let _ = writeln!(out, r#"<style class="{STYLE_CLASS}">…</style>"#);
        }
        let Some(container) = &self.container else {
            return out;
        };
        let _ = write!(out, r#"<div class="{CONTAINER_CLASS}""#);
        for (name, value) in &container.attributes {
            let _ = write!(out, r#" {name}="{value}""#);
        }
        out.push_str(">\n");
        for element in self.elements.values() {
            let _ = write!(out, r#"  <div class="{}""#, element.classes.join(" "));
            for (name, value) in &element.attributes {
                let _ = write!(out, r#" {name}="{value}""#);
            }
            let _ = writeln!(out, ">{}</div>", element.inner_html);
        }
        out.push_str("</div>\n");
        out
    }
}

/// Shared view of a [`Document`], kept by whoever needs to inspect the page
/// while the renderer itself is owned by the notifier.
#[derive(Clone, Debug, Default)]
pub struct DocumentHandle(Arc<Mutex<Document>>);

impl DocumentHandle {
    fn lock(&self) -> MutexGuard<'_, Document> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Document {
        self.lock().clone()
    }

    pub fn to_html(&self) -> String {
        self.lock().to_html()
    }
}

pub struct HtmlRenderer {
    document: DocumentHandle,
    hide_transition: Duration,
    allow_html: bool,
    next_handle: u64,
}

impl HtmlRenderer {
    pub fn new(config: &Config) -> Self {
        Self::with_document(config, DocumentHandle::default())
    }

    /// Draws into an existing document, e.g. one that outlives a destroyed
    /// notifier.
    pub fn with_document(config: &Config, document: DocumentHandle) -> Self {
        Self {
            document,
            hide_transition: config.hide_transition,
            allow_html: config.allow_html,
            next_handle: 0,
        }
    }

    pub fn document(&self) -> DocumentHandle {
        self.document.clone()
    }

    fn with_element(&self, handle: ElementHandle, f: impl FnOnce(&mut Element)) {
        if let Some(element) = self.document.lock().elements.get_mut(&handle) {
            f(element);
        }
    }
}

impl Renderer for HtmlRenderer {
    fn ensure_presentation_injected_once(&mut self) {
        let mut doc = self.document.lock();
        if doc.styles_injected {
            return;
        }
        trace!(bytes = STYLESHEET.len(), "injecting notification styles");
        doc.styles_injected = true;
        doc.style_injections += 1;
    }

    fn ensure_container(&mut self) {
        let mut doc = self.document.lock();
        if doc.container.is_some() {
            return;
        }
        doc.container = Some(Container {
            attributes: vec![("aria-live", "polite"), ("aria-atomic", "true")],
        });
        doc.containers_created += 1;
    }

    fn mount(&mut self, notice: &Notice) -> ElementHandle {
        self.ensure_container();
        self.next_handle += 1;
        let handle = ElementHandle(self.next_handle);
        let element = Element {
            notice_id: notice.id,
            classes: vec![NOTICE_CLASS.to_string(), notice.severity.to_string()],
            attributes: vec![
                ("role", "alert".to_string()),
                ("aria-live", "assertive".to_string()),
                ("data-notice-id", notice.id.to_string()),
            ],
            inner_html: notice_markup(notice, self.allow_html),
        };
        self.document.lock().elements.insert(handle, element);
        handle
    }

    fn reveal(&mut self, handle: ElementHandle) {
        self.with_element(handle, |e| e.add_class(SHOW_CLASS));
    }

    fn hide(&mut self, handle: ElementHandle) -> Duration {
        self.with_element(handle, |e| e.add_class(HIDE_CLASS));
        self.hide_transition
    }

    fn finish_hide(&mut self, handle: ElementHandle) {
        self.document.lock().elements.remove(&handle);
    }

    fn remove_immediately(&mut self, handle: ElementHandle) {
        self.document.lock().elements.remove(&handle);
    }

    fn teardown(&mut self) {
        let mut doc = self.document.lock();
        doc.elements.clear();
        doc.container = None;
        doc.styles_injected = false;
    }
}

#[cfg(test)]
mod tests {
    use super::HtmlRenderer;
    use crate::config::Config;
    use crate::render::Renderer;
    use crate::types::NoticeRequest;
    use std::time::Duration;

    #[test]
    fn presentation_is_injected_once() {
        let mut renderer = HtmlRenderer::new(&Config::default());
        renderer.ensure_presentation_injected_once();
        renderer.ensure_presentation_injected_once();
        renderer.ensure_container();
        renderer.ensure_container();
        let doc = renderer.document().snapshot();
        assert_eq!(doc.style_injections, 1);
        assert_eq!(doc.containers_created, 1);
    }

    #[test]
    fn element_goes_through_show_and_hide_classes() {
        let config = Config::default();
        let mut renderer = HtmlRenderer::new(&config);
        let notice = NoticeRequest::new("hello")
            .severity("error")
            .validate(&config)
            .unwrap();

        let handle = renderer.mount(&notice);
        renderer.reveal(handle);
        let doc = renderer.document();
        let element = doc.snapshot().element_for(notice.id).cloned().unwrap();
        assert!(element.has_class("notify-notice"));
        assert!(element.has_class("error"));
        assert!(element.has_class("show"));

        assert_eq!(renderer.hide(handle), Duration::from_millis(450));
        assert!(doc.snapshot().elements[&handle].has_class("hide"));

        renderer.finish_hide(handle);
        assert!(doc.snapshot().elements.is_empty());
    }

    #[test]
    fn teardown_removes_container_and_styles() {
        let config = Config::default();
        let mut renderer = HtmlRenderer::new(&config);
        renderer.ensure_presentation_injected_once();
        renderer.mount(&NoticeRequest::new("x").validate(&config).unwrap());
        renderer.teardown();

        let doc = renderer.document().snapshot();
        assert!(!doc.styles_injected);
        assert!(doc.container.is_none());
        assert!(doc.elements.is_empty());
        assert_eq!(doc.to_html(), "");
    }
}
