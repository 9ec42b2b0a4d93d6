//! A mask-driven text formatting and input filtering engine.
//!
//! A restricted-syntax pattern compiles once into a replacement template
//! and an ordered placeholder specification; the specification drives both
//! static reformatting and a live watcher that enforces the mask against
//! keystrokes on a bound text widget.
//!
//! # Example
//!
//! ```rust
//! use textmask::TextFormatter;
//!
//! let formatter = TextFormatter::new(r"(\d{3})-([A-Z]{2})").unwrap();
//!
//! assert_eq!(formatter.placeholder(), "999-AA");
//! assert_eq!(formatter.replacement_template(), "$1$2$3-$4$5");
//! assert_eq!(formatter.format_text("427-XZ").unwrap(), "427-XZ");
//! assert!(formatter.format_text("427XZ").is_err());
//! ```

pub mod alphabet;
mod formatter;
pub mod pattern;
pub mod placeholder;
mod replace;
pub mod tui;
mod watcher;
mod widget;

pub use alphabet::AlphabetId;
pub use formatter::{BuildError, NoMatch, TextFormatter};
pub use pattern::{PatternError, Token, compile};
pub use replace::{PlaceholderSpec, ReplacePattern, SlotKind, TemplateError};
pub use watcher::{EditEvent, EditOutcome, FillState, MaskState, MaskWatcher};
pub use widget::{MaskBinding, MaskedField};
