//! Document adapter seam.
//!
//! Components never touch a concrete document; they go through [`Ui`],
//! addressing elements by id. Event callbacks are explicit [`Listener`]
//! registrations that the application routes back to the components.

mod dom;

pub use dom::{ChartInstance, MemoryDom};

use crate::charts::ChartConfig;
use crate::dashboard::form::Slider;
use crate::error::UiError;
use crate::labels::Endpoint;
use crate::model::TestKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Input,
    Change,
}

/// Behaviors that can be attached to an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listener {
    ToggleInfoBox,
    Submit(Endpoint),
    SliderLabel(Slider),
    SelectTestKind(TestKind),
    HeavyLoadSwitch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChartHandle(pub u64);

pub trait Ui: Send {
    fn exists(&self, id: &str) -> bool;

    /// Replace the element's children with the parsed fragment.
    fn set_html(&mut self, id: &str, html: &str) -> Result<(), UiError>;
    fn append_html(&mut self, id: &str, html: &str) -> Result<(), UiError>;
    fn prepend_html(&mut self, id: &str, html: &str) -> Result<(), UiError>;
    fn set_text(&mut self, id: &str, text: &str) -> Result<(), UiError>;

    fn set_visible(&mut self, id: &str, visible: bool) -> Result<(), UiError>;
    fn is_visible(&self, id: &str) -> Result<bool, UiError>;

    fn has_class(&self, id: &str, class: &str) -> Result<bool, UiError>;
    fn add_class(&mut self, id: &str, class: &str) -> Result<(), UiError>;
    fn remove_class(&mut self, id: &str, class: &str) -> Result<(), UiError>;

    fn value(&self, id: &str) -> Result<Option<String>, UiError>;
    fn set_value(&mut self, id: &str, value: &str) -> Result<(), UiError>;
    fn is_checked(&self, id: &str) -> Result<bool, UiError>;
    fn set_checked(&mut self, id: &str, checked: bool) -> Result<(), UiError>;

    /// Attach a listener. Returns `false` when the same listener is
    /// already attached to that element for that event.
    fn listen(&mut self, id: &str, event: EventKind, listener: Listener) -> Result<bool, UiError>;
    fn listeners(&self, id: &str, event: EventKind) -> Vec<Listener>;

    fn create_chart(&mut self, canvas_id: &str, config: ChartConfig) -> Result<ChartHandle, UiError>;
    fn destroy_chart(&mut self, handle: ChartHandle) -> Result<(), UiError>;
}

/// Escape text for inclusion in HTML content or a quoted attribute.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Decode character references in parsed text or attribute values.
/// Unknown or unterminated references are kept literally.
pub fn unescape_html(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&tail[1..end]).map(|c| (c, end + 1)));
        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &tail[len..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
