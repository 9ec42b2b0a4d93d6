//! Replacement template generation.
//!
//! Walking the compiled token sequence yields the two artifacts everything
//! else consumes: a template string carrying one positional `$k` marker per
//! class slot, and the ordered placeholder specification. The compiled
//! [`ReplacePattern`] is immutable and may be shared read-only by any number
//! of watcher bindings.

use itertools::Itertools;

use crate::alphabet::AlphabetId;
use crate::pattern::ast::{Token, flatten};

/// What one mask slot expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// A fixed character, auto-inserted during live input.
    Literal(char),
    /// One character from the given alphabet.
    Class(AlphabetId),
}

/// One entry per mask slot. The ordered sequence of specs is the canonical
/// mask description; its length is the total mask length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderSpec {
    pub position: usize,
    pub kind: SlotKind,
}

impl PlaceholderSpec {
    pub fn is_literal(&self) -> bool {
        matches!(self.kind, SlotKind::Literal(_))
    }
}

/// Errors from validating a caller-supplied replacement template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A `$k` marker referencing a group the mask does not have.
    UnknownGroup(usize),
    /// A `$` not followed by digits or a second `$`.
    BareMarker,
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownGroup(k) => write!(f, "Template references unknown group ${k}"),
            Self::BareMarker => write!(f, "Bare '$' in template (use '$$' for a literal)"),
        }
    }
}

/// One parsed piece of a replacement template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TemplatePiece {
    Text(String),
    /// 0-based class-slot ordinal. Literal slots are not groups; `$k`
    /// markers number the class slots only, in pattern order.
    Group(usize),
}

/// The compiled replacement artifact: template plus placeholder specs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacePattern {
    template: String,
    pieces: Vec<TemplatePiece>,
    specs: Vec<PlaceholderSpec>,
    /// Slot position of each class slot, by ordinal.
    class_positions: Vec<usize>,
}

impl ReplacePattern {
    /// Generate the position-preserving replacement for `tokens`: each
    /// literal contributes itself, each class run of maximum length N
    /// contributes N consecutive `$k` markers in pattern order.
    pub fn generate(tokens: &[Token]) -> Self {
        let specs = layout(tokens);
        let class_positions = class_positions(&specs);
        let mut group = 0;
        let pieces = specs
            .iter()
            .map(|spec| match spec.kind {
                SlotKind::Literal(c) => TemplatePiece::Text(c.to_string()),
                SlotKind::Class(_) => {
                    group += 1;
                    TemplatePiece::Group(group - 1)
                }
            })
            .collect::<Vec<_>>();
        let template = render_template(&pieces);
        Self {
            template,
            pieces,
            specs,
            class_positions,
        }
    }

    /// Build a replacement with a caller-supplied template. This is the
    /// explicit opt-in for reordering output: `$k` markers (1-based, over
    /// the class slots in pattern order) may appear in any order, and are
    /// validated against the class-slot count.
    pub fn with_template(tokens: &[Token], template: &str) -> Result<Self, TemplateError> {
        let specs = layout(tokens);
        let class_positions = class_positions(&specs);
        let pieces = parse_template(template, class_positions.len())?;
        Ok(Self {
            template: template.to_string(),
            pieces,
            specs,
            class_positions,
        })
    }

    /// The template string, `$k` markers included.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The ordered placeholder specification, one entry per mask slot.
    pub fn specs(&self) -> &[PlaceholderSpec] {
        &self.specs
    }

    /// Total mask length in slots.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Apply the template to per-slot captures. Unfilled captures
    /// substitute as nothing.
    pub fn substitute(&self, captures: &[Option<char>]) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                TemplatePiece::Text(text) => out.push_str(text),
                TemplatePiece::Group(g) => {
                    let slot = self.class_positions[*g];
                    if let Some(ch) = captures.get(slot).copied().flatten() {
                        out.push(ch);
                    }
                }
            }
        }
        out
    }
}

/// Slot positions of the class slots, in order.
fn class_positions(specs: &[PlaceholderSpec]) -> Vec<usize> {
    specs
        .iter()
        .filter(|spec| !spec.is_literal())
        .map(|spec| spec.position)
        .collect()
}

/// Expand flattened tokens into per-slot specs.
fn layout(tokens: &[Token]) -> Vec<PlaceholderSpec> {
    let mut specs = Vec::new();
    for token in flatten(tokens) {
        match token {
            Token::Literal(c) => specs.push(PlaceholderSpec {
                position: specs.len(),
                kind: SlotKind::Literal(c),
            }),
            Token::ClassRun {
                alphabet, max_len, ..
            } => {
                for _ in 0..max_len {
                    specs.push(PlaceholderSpec {
                        position: specs.len(),
                        kind: SlotKind::Class(alphabet),
                    });
                }
            }
            Token::Group(_) => unreachable!("groups are flattened before layout"),
        }
    }
    specs
}

/// Render pieces back to template text, escaping literal `$` as `$$`.
fn render_template(pieces: &[TemplatePiece]) -> String {
    pieces
        .iter()
        .map(|piece| match piece {
            TemplatePiece::Text(text) => text.replace('$', "$$"),
            TemplatePiece::Group(g) => format!("${}", g + 1),
        })
        .join("")
}

/// Parse a template into pieces, validating markers against `groups`.
fn parse_template(template: &str, groups: usize) -> Result<Vec<TemplatePiece>, TemplateError> {
    let mut pieces: Vec<TemplatePiece> = Vec::new();
    let mut text = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            text.push(c);
            continue;
        }
        if chars.peek() == Some(&'$') {
            chars.next();
            text.push('$');
            continue;
        }
        let mut digits = String::new();
        while let Some(&d) = chars.peek() {
            if d.is_ascii_digit() {
                digits.push(d);
                chars.next();
            } else {
                break;
            }
        }
        if digits.is_empty() {
            return Err(TemplateError::BareMarker);
        }
        let k: usize = digits.parse().map_err(|_| TemplateError::BareMarker)?;
        if k == 0 || k > groups {
            return Err(TemplateError::UnknownGroup(k));
        }
        if !text.is_empty() {
            pieces.push(TemplatePiece::Text(std::mem::take(&mut text)));
        }
        pieces.push(TemplatePiece::Group(k - 1));
    }
    if !text.is_empty() {
        pieces.push(TemplatePiece::Text(text));
    }
    Ok(pieces)
}
