//! Widget binding layer.
//!
//! The engine never owns a real text widget. A host implements
//! [`MaskedField`] and routes the widget's ordered edit events through
//! [`MaskBinding::notify`]; the binding answers each event with one
//! `(text, cursor)` rewrite. Real widgets echo programmatic rewrites back
//! as change events — a guard flag discards those echoes while the rewrite
//! is in flight, so the watcher's own writeback is never reinterpreted as
//! a user edit.

use std::sync::Arc;

use crate::replace::ReplacePattern;
use crate::watcher::{EditEvent, EditOutcome, FillState, MaskWatcher};

/// The contract a host text widget must satisfy.
pub trait MaskedField {
    /// Apply a programmatic rewrite of the field contents, returning any
    /// change events the widget emits in response.
    fn apply_rewrite(&mut self, text: &str, cursor: usize) -> Vec<EditEvent>;
}

/// One live attachment of a compiled mask to a widget.
///
/// Owns the widget and the watcher (with its exclusive `MaskState`);
/// dropping or [`unbind`](Self::unbind)ing the binding discards the state,
/// so no dangling callback can outlive it.
pub struct MaskBinding<W: MaskedField> {
    watcher: MaskWatcher,
    widget: W,
    rewriting: bool,
    on_reject: Option<Box<dyn FnMut(char)>>,
}

impl<W: MaskedField> MaskBinding<W> {
    pub(crate) fn new(mask: Arc<ReplacePattern>, widget: W) -> Self {
        Self {
            watcher: MaskWatcher::new(mask),
            widget,
            rewriting: false,
            on_reject: None,
        }
    }

    /// Install an observer for rejected characters. Rejection is expected
    /// during normal interactive use; this exists for UI feedback only.
    pub fn on_reject(&mut self, observer: impl FnMut(char) + 'static) {
        self.on_reject = Some(Box::new(observer));
    }

    /// Feed one widget edit event through the mask.
    ///
    /// Events arriving while the binding is writing its own rewrite back
    /// are echoes of that rewrite and are ignored.
    pub fn notify(&mut self, event: EditEvent) -> EditOutcome {
        if self.rewriting {
            return EditOutcome::Ignored;
        }
        let outcome = self.watcher.handle_event(event);
        match outcome {
            EditOutcome::Applied => self.push_rewrite(),
            EditOutcome::Rejected(ch) => {
                if let Some(observer) = &mut self.on_reject {
                    observer(ch);
                }
                // The widget may already show the offending character;
                // rewrite restores the enforced text either way.
                self.push_rewrite();
            }
            EditOutcome::Ignored => {}
        }
        outcome
    }

    fn push_rewrite(&mut self) {
        self.rewriting = true;
        let text = self.watcher.text();
        let cursor = self.watcher.display_cursor();
        let echoes = self.widget.apply_rewrite(&text, cursor);
        for echo in echoes {
            let _ = self.notify(echo);
        }
        self.rewriting = false;
    }

    /// Current committed text.
    pub fn text(&self) -> String {
        self.watcher.text()
    }

    /// Current cursor position within the committed text.
    pub fn cursor(&self) -> usize {
        self.watcher.display_cursor()
    }

    /// Full-length display buffer with placeholder symbols.
    pub fn display(&self) -> String {
        self.watcher.display()
    }

    pub fn fill_state(&self) -> FillState {
        self.watcher.fill_state()
    }

    /// Detach from the widget: the mask state is discarded and the widget
    /// handed back.
    pub fn unbind(self) -> W {
        self.widget
    }
}

/// Mock field for testing — records rewrites and can echo them back.
#[cfg(test)]
pub struct MockField {
    pub text: String,
    pub cursor: usize,
    pub rewrites: Vec<(String, usize)>,
    /// When set, every rewrite is echoed back as a `Replace` event, the
    /// way a real widget reports programmatic text changes.
    pub echo: bool,
}

#[cfg(test)]
impl MockField {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            rewrites: Vec::new(),
            echo: false,
        }
    }

    pub fn echoing() -> Self {
        Self {
            echo: true,
            ..Self::new()
        }
    }
}

#[cfg(test)]
impl MaskedField for MockField {
    fn apply_rewrite(&mut self, text: &str, cursor: usize) -> Vec<EditEvent> {
        let previous_len = self.text.chars().count();
        self.text = text.to_string();
        self.cursor = cursor;
        self.rewrites.push((text.to_string(), cursor));
        if self.echo {
            vec![EditEvent::Replace {
                start: 0,
                end: previous_len,
                text: text.to_string(),
            }]
        } else {
            Vec::new()
        }
    }
}
