//! Placeholder rendering.
//!
//! Maps each mask slot to a single display character, producing the hint
//! string shown in an empty field. The same symbols stand in for unfilled
//! slots in the watcher's display buffer.

use crate::replace::{PlaceholderSpec, SlotKind};

/// Render the spec list to a placeholder string.
///
/// Literal slots render as themselves; class slots render via
/// [`AlphabetId::placeholder_symbol`](crate::alphabet::AlphabetId::placeholder_symbol).
/// Output length always equals `specs.len()`.
pub fn render(specs: &[PlaceholderSpec]) -> String {
    specs.iter().map(symbol).collect()
}

/// The display symbol for one slot.
pub fn symbol(spec: &PlaceholderSpec) -> char {
    match spec.kind {
        SlotKind::Literal(c) => c,
        SlotKind::Class(alphabet) => alphabet.placeholder_symbol(),
    }
}
