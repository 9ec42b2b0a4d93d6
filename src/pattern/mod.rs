//! Mask pattern engine.
//!
//! A mask pattern is a restricted regex subset, rich enough to describe a
//! fixed-length input mask and nothing more. It compiles once into a token
//! sequence; the replacement generator and the watcher both derive from it.
//!
//! # Pattern syntax
//!
//! | Syntax     | Meaning                                                  |
//! |------------|----------------------------------------------------------|
//! | `c`        | Literal character                                        |
//! | `\d`       | One digit                                                |
//! | `\c`       | Escaped literal (`\+`, `\(`, `\\`, …)                    |
//! | `[...]`    | Explicit set of singles and `x-y` ranges; must equal one registered alphabet |
//! | `(...)`    | Group (one level of nesting)                             |
//! | `{n}`      | Exactly n repetitions of the preceding class             |
//! | `{n,m}`    | n to m repetitions; the mask expands to m slots          |
//! | `+` `{n,}` | Open repetition, bounded to its guaranteed minimum       |
//! | `^` `$`    | Anchors, accepted at the pattern ends only               |
//!
//! Anything else is rejected at compile time with a named error; unsupported
//! syntax is never silently treated as literal text.

pub mod ast;
pub mod matcher;
pub mod parser;

pub use ast::{Token, flatten, slot_count};
pub use matcher::match_full;
pub use parser::{PatternError, compile};
