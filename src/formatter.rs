//! Formatter facade.
//!
//! [`TextFormatter`] compiles a mask pattern once, eagerly, at construction
//! and composes the compiler, replacement generator and placeholder
//! generator behind the public operations. The compiled artifact is
//! immutable and shared read-only by every widget binding.

use std::sync::Arc;

use crate::pattern::ast::Token;
use crate::pattern::matcher;
use crate::pattern::parser::{self, PatternError};
use crate::placeholder;
use crate::replace::{ReplacePattern, TemplateError};
use crate::widget::{MaskBinding, MaskedField};

/// `format` was called with input that does not conform to the pattern.
///
/// Recoverable: the compiled pattern is untouched and further calls are
/// fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoMatch;

impl std::fmt::Display for NoMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Input does not match the mask pattern")
    }
}

/// Errors from constructing a [`TextFormatter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    Pattern(PatternError),
    Template(TemplateError),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pattern(e) => write!(f, "{e}"),
            Self::Template(e) => write!(f, "{e}"),
        }
    }
}

/// The public face of the engine: one compiled mask, all operations.
pub struct TextFormatter {
    tokens: Vec<Token>,
    mask: Arc<ReplacePattern>,
    placeholder: String,
}

impl TextFormatter {
    /// Compile `pattern` with the generated, position-preserving
    /// replacement template.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let tokens = parser::compile(pattern)?;
        let mask = ReplacePattern::generate(&tokens);
        Ok(Self::from_parts(tokens, mask))
    }

    /// Compile `pattern` with a caller-supplied replacement template — the
    /// explicit opt-in for reordered output.
    pub fn with_template(pattern: &str, template: &str) -> Result<Self, BuildError> {
        let tokens = parser::compile(pattern).map_err(BuildError::Pattern)?;
        let mask =
            ReplacePattern::with_template(&tokens, template).map_err(BuildError::Template)?;
        Ok(Self::from_parts(tokens, mask))
    }

    fn from_parts(tokens: Vec<Token>, mask: ReplacePattern) -> Self {
        Self {
            placeholder: placeholder::render(mask.specs()),
            mask: Arc::new(mask),
            tokens,
        }
    }

    /// Reformat `input` through the replacement template.
    ///
    /// Total over inputs conforming to the pattern; anything else is
    /// [`NoMatch`].
    pub fn format_text(&self, input: &str) -> Result<String, NoMatch> {
        let captures = matcher::match_full(&self.tokens, input).ok_or(NoMatch)?;
        Ok(self.mask.substitute(&captures))
    }

    /// The placeholder hint string, one symbol per mask slot.
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// The replacement template string.
    pub fn replacement_template(&self) -> &str {
        self.mask.template()
    }

    /// The compiled replacement artifact.
    pub fn replace_pattern(&self) -> &ReplacePattern {
        &self.mask
    }

    /// Attach a mask watcher to `widget`. The binding owns its own state;
    /// the compiled mask is shared.
    pub fn bind<W: MaskedField>(&self, widget: W) -> MaskBinding<W> {
        MaskBinding::new(self.mask.clone(), widget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watcher::EditEvent;
    use crate::widget::MockField;

    fn fmt(pattern: &str) -> TextFormatter {
        TextFormatter::new(pattern).expect("pattern should compile")
    }

    // --- Derived artifacts ---

    #[test]
    fn placeholder_and_template() {
        let f = fmt(r"\d{3}-[A-Z]{2}");
        assert_eq!(f.placeholder(), "999-AA");
        assert_eq!(f.replacement_template(), "$1$2$3-$4$5");
    }

    #[test]
    fn placeholder_length_equals_slot_count() {
        for pattern in [r"\d{3}-[A-Z]{2}", r"(\d{2,4})x", r"\+7 \d", ""] {
            let f = fmt(pattern);
            assert_eq!(
                f.placeholder().chars().count(),
                f.replace_pattern().len(),
                "pattern {pattern:?}"
            );
        }
    }

    // --- format_text ---

    #[test]
    fn format_conforming_input() {
        let f = fmt(r"\d{3}-[A-Z]{2}");
        assert_eq!(f.format_text("427-XZ").unwrap(), "427-XZ");
        assert_eq!(f.format_text("427XZ"), Err(NoMatch));
    }

    #[test]
    fn format_is_idempotent_for_mask_preserving_templates() {
        let f = fmt(r"\d{2}-\d{2}");
        let once = f.format_text("12-34").unwrap();
        assert_eq!(f.format_text(&once).unwrap(), once);
    }

    #[test]
    fn format_variable_run() {
        let f = fmt(r"\d{2,4}");
        assert_eq!(f.format_text("12").unwrap(), "12");
        assert_eq!(f.format_text("1234").unwrap(), "1234");
        assert_eq!(f.format_text("1"), Err(NoMatch));
    }

    #[test]
    fn pure_literal_pattern_is_identity() {
        let f = fmt(r"\+7");
        assert_eq!(f.placeholder(), "+7");
        assert_eq!(f.format_text("+7").unwrap(), "+7");
        assert_eq!(f.format_text("8"), Err(NoMatch));
    }

    #[test]
    fn empty_pattern_is_identity_on_empty_input() {
        let f = fmt("");
        assert_eq!(f.format_text("").unwrap(), "");
        assert_eq!(f.format_text("x"), Err(NoMatch));
    }

    // --- Reordering opt-in ---

    #[test]
    fn custom_template_reorders_groups() {
        let f = TextFormatter::with_template(r"(\d{2})(\d{2})", "$3$4.$1$2").unwrap();
        assert_eq!(f.format_text("1234").unwrap(), "34.12");
        assert_eq!(f.replacement_template(), "$3$4.$1$2");
    }

    #[test]
    fn custom_template_errors_are_typed() {
        assert!(matches!(
            TextFormatter::with_template(r"\d", "$9"),
            Err(BuildError::Template(TemplateError::UnknownGroup(9)))
        ));
        assert!(matches!(
            TextFormatter::with_template(r"\d{", "$1"),
            Err(BuildError::Pattern(_))
        ));
    }

    // --- Binding ---

    #[test]
    fn bindings_share_the_mask_but_not_state() {
        let f = fmt(r"\d{2}");
        let mut a = f.bind(MockField::new());
        let mut b = f.bind(MockField::new());
        a.notify(EditEvent::Insert {
            at: 0,
            text: "4".to_string(),
        });
        assert_eq!(a.text(), "4");
        assert_eq!(b.text(), "");
        b.notify(EditEvent::Insert {
            at: 0,
            text: "7".to_string(),
        });
        assert_eq!(a.text(), "4");
        assert_eq!(b.text(), "7");
    }
}
