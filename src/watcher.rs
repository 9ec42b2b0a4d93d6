//! Live mask enforcement.
//!
//! A [`MaskWatcher`] owns one [`MaskState`] and consumes keystroke-level
//! edits in arrival order, each transition completing before the next event
//! is accepted. The compiled mask itself is shared read-only; every watcher
//! has exclusive ownership of its own mutable state.
//!
//! Slot states are `Empty` or `Filled(char)`; literal slots are pre-filled
//! at construction and never change. Rejected input leaves the state
//! untouched.

use std::sync::Arc;

use tracing::trace;

use crate::placeholder;
use crate::replace::{ReplacePattern, SlotKind};

/// A keystroke-level edit reported by the host widget. Positions are
/// character indices into the widget text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditEvent {
    /// Characters typed (or pasted) at a position.
    Insert { at: usize, text: String },
    /// Backspace at a position, deleting backward.
    Backspace { at: usize },
    /// A range replaced wholesale (selection paste, programmatic set).
    Replace {
        start: usize,
        end: usize,
        text: String,
    },
}

/// The outcome of one edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The edit changed the state (possibly partially, for ranges).
    Applied,
    /// The edit was rejected outright; the state is untouched.
    Rejected(char),
    /// The edit was a no-op or a suppressed writeback echo.
    Ignored,
}

/// Global fill state of the mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillState {
    Incomplete,
    Complete,
}

/// Per-binding mutable state: one fill entry per slot plus the slot cursor.
///
/// `Clone + PartialEq` so rejection safety is checkable exactly: a rejected
/// edit must leave the state comparing equal to its prior value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskState {
    /// Literal slots hold their character from construction on; class
    /// slots start `None`.
    fills: Vec<Option<char>>,
    /// Slot index where the next edit lands (0..=len).
    cursor: usize,
}

/// The stateful incremental formatter for one widget binding.
pub struct MaskWatcher {
    mask: Arc<ReplacePattern>,
    state: MaskState,
}

impl MaskWatcher {
    pub fn new(mask: Arc<ReplacePattern>) -> Self {
        let fills = mask
            .specs()
            .iter()
            .map(|spec| match spec.kind {
                SlotKind::Literal(c) => Some(c),
                SlotKind::Class(_) => None,
            })
            .collect();
        Self {
            mask,
            state: MaskState { fills, cursor: 0 },
        }
    }

    /// The shared compiled mask.
    pub fn mask(&self) -> &ReplacePattern {
        &self.mask
    }

    /// Current state, for exact comparison.
    pub fn state(&self) -> &MaskState {
        &self.state
    }

    /// Apply one edit event.
    pub fn handle_event(&mut self, event: EditEvent) -> EditOutcome {
        match event {
            EditEvent::Insert { at, text } => {
                self.set_cursor(at);
                self.insert_str(&text)
            }
            EditEvent::Backspace { at } => {
                self.set_cursor(at);
                self.backspace()
            }
            EditEvent::Replace { start, end, text } => self.replace_range(start, end, &text),
        }
    }

    /// Move the slot cursor to a text position.
    pub fn set_cursor(&mut self, pos: usize) {
        self.state.cursor = pos.min(self.mask.len());
    }

    /// Insert one character at the cursor.
    ///
    /// Literal slots under the cursor are skipped without consuming input
    /// (they materialize in the committed text instead); the character is
    /// validated against the class slot it lands on.
    pub fn insert_char(&mut self, ch: char) -> EditOutcome {
        let Some(slot) = self.next_editable(self.state.cursor) else {
            trace!(%ch, "insert past end of mask");
            return EditOutcome::Rejected(ch);
        };
        let SlotKind::Class(alphabet) = self.mask.specs()[slot].kind else {
            unreachable!("next_editable returns class slots only");
        };
        if !alphabet.contains(ch) {
            trace!(slot, %ch, "rejected by slot alphabet");
            return EditOutcome::Rejected(ch);
        }
        self.state.fills[slot] = Some(ch);
        self.state.cursor = slot + 1;
        trace!(slot, %ch, "filled slot");
        EditOutcome::Applied
    }

    /// Sequentially insert `text`, stopping at the first rejection.
    pub fn insert_str(&mut self, text: &str) -> EditOutcome {
        let mut outcome = EditOutcome::Ignored;
        for ch in text.chars() {
            match self.insert_char(ch) {
                EditOutcome::Applied => outcome = EditOutcome::Applied,
                rejected => {
                    // Partial success: keep the accepted prefix.
                    if outcome == EditOutcome::Ignored {
                        outcome = rejected;
                    }
                    break;
                }
            }
        }
        outcome
    }

    /// Backspace: walk left past literals to the nearest filled class slot
    /// and clear it. A no-op at the start of the buffer.
    pub fn backspace(&mut self) -> EditOutcome {
        let Some(slot) = self.prev_filled(self.state.cursor) else {
            return EditOutcome::Ignored;
        };
        self.state.fills[slot] = None;
        self.state.cursor = slot;
        trace!(slot, "cleared slot");
        EditOutcome::Applied
    }

    /// Replace the text range `start..end`: clear the class slots in range,
    /// then insert `text` sequentially. Partial success is allowed; the
    /// accepted prefix stays.
    pub fn replace_range(&mut self, start: usize, end: usize, text: &str) -> EditOutcome {
        let len = self.mask.len();
        let start = start.min(len);
        let end = end.clamp(start, len);

        let mut cleared = false;
        for slot in start..end {
            if !self.mask.specs()[slot].is_literal() && self.state.fills[slot].is_some() {
                self.state.fills[slot] = None;
                cleared = true;
            }
        }
        self.state.cursor = start;

        match self.insert_str(text) {
            EditOutcome::Applied => EditOutcome::Applied,
            _ if cleared => EditOutcome::Applied,
            other => other,
        }
    }

    /// `Complete` iff every class slot is filled.
    pub fn fill_state(&self) -> FillState {
        let complete = self
            .mask
            .specs()
            .iter()
            .zip(&self.state.fills)
            .all(|(spec, fill)| spec.is_literal() || fill.is_some());
        if complete {
            FillState::Complete
        } else {
            FillState::Incomplete
        }
    }

    /// The raw entered characters, in slot order, literals excluded.
    pub fn raw(&self) -> String {
        self.mask
            .specs()
            .iter()
            .zip(&self.state.fills)
            .filter(|(spec, _)| !spec.is_literal())
            .filter_map(|(_, fill)| *fill)
            .collect()
    }

    /// The full-length display buffer: filled slots show their character,
    /// literal slots their literal, empty class slots the placeholder
    /// symbol.
    pub fn display(&self) -> String {
        self.mask
            .specs()
            .iter()
            .zip(&self.state.fills)
            .map(|(spec, fill)| fill.unwrap_or_else(|| placeholder::symbol(spec)))
            .collect()
    }

    /// The committed text the widget shows: the display buffer cut after
    /// the last filled class slot, auto-inserted literals included,
    /// trailing unfilled slots trimmed.
    pub fn text(&self) -> String {
        self.display().chars().take(self.committed()).collect()
    }

    /// The cursor position within the committed text.
    pub fn display_cursor(&self) -> usize {
        let pos = self
            .next_editable(self.state.cursor)
            .unwrap_or_else(|| self.mask.len());
        pos.min(self.committed())
    }

    /// Number of leading slots materialized in the committed text: through
    /// the last filled class slot and the literal run that follows it.
    fn committed(&self) -> usize {
        let last_filled = self
            .mask
            .specs()
            .iter()
            .zip(&self.state.fills)
            .enumerate()
            .rev()
            .find(|(_, (spec, fill))| !spec.is_literal() && fill.is_some())
            .map(|(i, _)| i);
        match last_filled {
            None => 0,
            Some(i) => self.next_editable(i + 1).unwrap_or_else(|| self.mask.len()),
        }
    }

    /// First class slot at or after `from`.
    fn next_editable(&self, from: usize) -> Option<usize> {
        (from..self.mask.len()).find(|&i| !self.mask.specs()[i].is_literal())
    }

    /// Nearest filled class slot strictly before `before`.
    fn prev_filled(&self, before: usize) -> Option<usize> {
        (0..before.min(self.mask.len()))
            .rev()
            .find(|&i| !self.mask.specs()[i].is_literal() && self.state.fills[i].is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::parser::compile;

    fn watcher(pattern: &str) -> MaskWatcher {
        let tokens = compile(pattern).unwrap();
        MaskWatcher::new(Arc::new(ReplacePattern::generate(&tokens)))
    }

    fn type_str(w: &mut MaskWatcher, s: &str) {
        for ch in s.chars() {
            assert_eq!(w.insert_char(ch), EditOutcome::Applied, "typing {ch:?}");
        }
    }

    // --- The 999-AA scenario ---

    #[test]
    fn scenario_digits_dash_upper() {
        let mut w = watcher(r"\d{3}-[A-Z]{2}");
        type_str(&mut w, "427X");
        assert_eq!(w.text(), "427-X");

        // '9' is not Latin upper: rejected, state untouched.
        let before = w.state().clone();
        assert_eq!(w.insert_char('9'), EditOutcome::Rejected('9'));
        assert_eq!(w.state(), &before);
        assert_eq!(w.text(), "427-X");
        assert_eq!(w.fill_state(), FillState::Incomplete);

        assert_eq!(w.insert_char('Z'), EditOutcome::Applied);
        assert_eq!(w.text(), "427-XZ");
        assert_eq!(w.fill_state(), FillState::Complete);
    }

    // --- Literal auto-skip ---

    #[test]
    fn literal_auto_inserted_on_advance() {
        let mut w = watcher(r"\d-\d");
        assert_eq!(w.insert_char('1'), EditOutcome::Applied);
        assert_eq!(w.text(), "1-");
        assert_eq!(w.display_cursor(), 2);
        assert_eq!(w.insert_char('2'), EditOutcome::Applied);
        assert_eq!(w.text(), "1-2");
        assert_eq!(w.display_cursor(), 3);
    }

    #[test]
    fn leading_literals_materialize_on_first_insert() {
        let mut w = watcher(r"\+7 \d{3}");
        assert_eq!(w.text(), "");
        assert_eq!(w.display_cursor(), 0);
        assert_eq!(w.insert_char('9'), EditOutcome::Applied);
        assert_eq!(w.text(), "+7 9");
    }

    #[test]
    fn trailing_literals_materialize_when_last_slot_fills() {
        let mut w = watcher(r"\d{2}\)");
        type_str(&mut w, "12");
        assert_eq!(w.text(), "12)");
        assert_eq!(w.fill_state(), FillState::Complete);
    }

    // --- Monotonicity ---

    #[test]
    fn complete_then_incomplete_on_clear() {
        let mut w = watcher(r"\d{3}-[A-Z]{2}");
        assert_eq!(w.fill_state(), FillState::Incomplete);
        type_str(&mut w, "427XZ");
        assert_eq!(w.fill_state(), FillState::Complete);
        assert_eq!(w.backspace(), EditOutcome::Applied);
        assert_eq!(w.fill_state(), FillState::Incomplete);
    }

    // --- Rejection safety ---

    #[test]
    fn rejection_leaves_state_untouched() {
        let mut w = watcher(r"[A-Z]{2}");
        type_str(&mut w, "Q");
        let before = w.state().clone();
        assert_eq!(w.insert_char('7'), EditOutcome::Rejected('7'));
        assert_eq!(w.state(), &before);
        assert_eq!(w.insert_char('й'), EditOutcome::Rejected('й'));
        assert_eq!(w.state(), &before);
    }

    #[test]
    fn insert_past_full_mask_rejected() {
        let mut w = watcher(r"\d");
        type_str(&mut w, "1");
        assert_eq!(w.insert_char('2'), EditOutcome::Rejected('2'));
        assert_eq!(w.text(), "1");
    }

    #[test]
    fn empty_mask_rejects_everything() {
        let mut w = watcher("");
        assert_eq!(w.insert_char('x'), EditOutcome::Rejected('x'));
        assert_eq!(w.text(), "");
    }

    // --- Backspace ---

    #[test]
    fn backspace_walks_left_over_literals() {
        let mut w = watcher(r"\d{3}-[A-Z]{2}");
        type_str(&mut w, "427");
        assert_eq!(w.text(), "427-");
        // Cursor sits after the auto-inserted dash; backspace clears '7'.
        assert_eq!(w.backspace(), EditOutcome::Applied);
        assert_eq!(w.text(), "42");
        assert_eq!(w.display_cursor(), 2);
    }

    #[test]
    fn backspace_at_start_is_noop() {
        let mut w = watcher(r"\d{2}");
        assert_eq!(w.backspace(), EditOutcome::Ignored);
        type_str(&mut w, "1");
        assert_eq!(w.backspace(), EditOutcome::Applied);
        assert_eq!(w.backspace(), EditOutcome::Ignored);
        assert_eq!(w.text(), "");
    }

    // --- Overtype ---

    #[test]
    fn insert_at_filled_slot_overwrites() {
        let mut w = watcher(r"\d{3}");
        type_str(&mut w, "123");
        let outcome = w.handle_event(EditEvent::Insert {
            at: 0,
            text: "9".to_string(),
        });
        assert_eq!(outcome, EditOutcome::Applied);
        assert_eq!(w.text(), "923");
    }

    // --- Replace range ---

    #[test]
    fn replace_range_clears_then_inserts() {
        let mut w = watcher(r"\d{3}");
        type_str(&mut w, "123");
        assert_eq!(w.replace_range(0, 2, "78"), EditOutcome::Applied);
        assert_eq!(w.text(), "783");
    }

    #[test]
    fn replace_range_partial_acceptance() {
        let mut w = watcher(r"\d{3}");
        type_str(&mut w, "123");
        // 'x' is rejected; the accepted prefix stays.
        assert_eq!(w.replace_range(0, 3, "7x"), EditOutcome::Applied);
        assert_eq!(w.text(), "7");
        assert_eq!(w.fill_state(), FillState::Incomplete);
    }

    #[test]
    fn replace_range_all_rejected_still_applies_the_clear() {
        let mut w = watcher(r"\d{2}");
        type_str(&mut w, "12");
        assert_eq!(w.replace_range(0, 2, "xy"), EditOutcome::Applied);
        assert_eq!(w.text(), "");
    }

    #[test]
    fn replace_nothing_with_rejects_is_rejected() {
        let mut w = watcher(r"\d{2}");
        assert_eq!(w.replace_range(0, 0, "x"), EditOutcome::Rejected('x'));
    }

    // --- Paste across literals ---

    #[test]
    fn paste_without_separators_crosses_literals() {
        let mut w = watcher(r"\d{3}-[A-Z]{2}");
        let outcome = w.handle_event(EditEvent::Insert {
            at: 0,
            text: "427XZ".to_string(),
        });
        assert_eq!(outcome, EditOutcome::Applied);
        assert_eq!(w.text(), "427-XZ");
        assert_eq!(w.fill_state(), FillState::Complete);
    }

    // --- Display buffer ---

    #[test]
    fn display_shows_placeholder_symbols_for_empty_slots() {
        let mut w = watcher(r"\d{3}-[A-Z]{2}");
        assert_eq!(w.display(), "999-AA");
        w.insert_char('4');
        assert_eq!(w.display(), "499-AA");
    }

    #[test]
    fn raw_excludes_literals() {
        let mut w = watcher(r"\d{3}-[A-Z]{2}");
        type_str(&mut w, "427X");
        assert_eq!(w.raw(), "427X");
    }

    // --- Events ---

    #[test]
    fn backspace_event_uses_reported_position() {
        let mut w = watcher(r"\d{3}");
        type_str(&mut w, "123");
        // Caret placed after the second digit: clear the '2'.
        assert_eq!(w.handle_event(EditEvent::Backspace { at: 2 }), EditOutcome::Applied);
        assert_eq!(w.display(), "193");
        assert_eq!(w.text(), "193");
    }
}
