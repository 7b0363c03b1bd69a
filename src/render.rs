//! Result containers and how decoded payloads are shown in them

use crate::models::Payload;
use crate::utils::html::escape_html;

/// Text shown on the upload path when the decoder finds nothing
pub const NO_CODE_FOUND: &str = "No QR code found.";

/// CSS classes applied to a rendered payload link
pub const LINK_CLASS: &str = "underline text-blue-700";

/// What a result container currently displays
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultContent {
    /// Clickable link whose href and text are both the payload
    Link(Payload),
    /// Plain text message
    Message(String),
}

impl ResultContent {
    /// Link to a decoded payload
    pub fn link(payload: Payload) -> Self {
        ResultContent::Link(payload)
    }

    /// Plain text message
    pub fn message(text: impl Into<String>) -> Self {
        ResultContent::Message(text.into())
    }

    /// Link target, if this is a link
    pub fn href(&self) -> Option<&str> {
        match self {
            ResultContent::Link(payload) => Some(payload.as_str()),
            ResultContent::Message(_) => None,
        }
    }

    /// Visible text of the container
    pub fn text(&self) -> &str {
        match self {
            ResultContent::Link(payload) => payload.as_str(),
            ResultContent::Message(text) => text,
        }
    }

    /// HTML markup for the container, with the payload escaped
    pub fn to_html(&self) -> String {
        match self {
            ResultContent::Link(payload) => {
                let escaped = escape_html(payload.as_str());
                format!(r#"<a class="{LINK_CLASS}" href="{escaped}">{escaped}</a>"#)
            }
            ResultContent::Message(text) => escape_html(text),
        }
    }
}

/// A page element that displays scan results
///
/// Each call replaces whatever the container showed before.
pub trait ResultSurface {
    /// Replace the container's contents
    fn render(&mut self, content: &ResultContent);
}

/// In-memory result container
///
/// Records the current content and how many times it was written, so callers
/// can tell "never written" apart from "written with the same value".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultPanel {
    content: Option<ResultContent>,
    writes: usize,
}

impl ResultPanel {
    /// Empty container, never written
    pub fn new() -> Self {
        Self::default()
    }

    /// Current content, `None` while still in its initial state
    pub fn content(&self) -> Option<&ResultContent> {
        self.content.as_ref()
    }

    /// Number of times the container was written
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Markup of the current content, empty when never written
    pub fn to_html(&self) -> String {
        self.content.as_ref().map(ResultContent::to_html).unwrap_or_default()
    }
}

impl ResultSurface for ResultPanel {
    fn render(&mut self, content: &ResultContent) {
        self.content = Some(content.clone());
        self.writes += 1;
    }
}

impl<S: ResultSurface + ?Sized> ResultSurface for &mut S {
    fn render(&mut self, content: &ResultContent) {
        (**self).render(content);
    }
}
