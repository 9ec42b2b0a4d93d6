//! Recursive descent compiler for mask pattern strings.

use std::iter::Peekable;
use std::str::Chars;

use tracing::debug;

use crate::alphabet;

use super::ast::Token;

/// Errors that can occur while compiling a mask pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// Recognized meta syntax that is neither literal nor resolvable
    /// against a registered alphabet.
    UnsupportedConstruct(String),
    /// A class run with no guaranteed slot (`*`, `{0,}`); the mask needs a
    /// finite length.
    UnboundedRepetition,
    UnclosedGroup,
    UnclosedClass,
    GroupTooDeep,
    InvalidCount,
    DanglingQuantifier,
    UnexpectedEnd,
}

impl std::fmt::Display for PatternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedConstruct(s) => {
                write!(f, "Unsupported construct in pattern: {s}")
            }
            Self::UnboundedRepetition => write!(f, "Repetition has no finite bound"),
            Self::UnclosedGroup => write!(f, "Unclosed group '(' in pattern"),
            Self::UnclosedClass => write!(f, "Unclosed character set '[' in pattern"),
            Self::GroupTooDeep => write!(f, "Groups may nest only one level deep"),
            Self::InvalidCount => write!(f, "Invalid repetition count"),
            Self::DanglingQuantifier => {
                write!(f, "Quantifier is not attached to a character class")
            }
            Self::UnexpectedEnd => write!(f, "Unexpected end of pattern"),
        }
    }
}

/// Compile a mask pattern string into a token sequence.
///
/// The empty pattern compiles to an empty sequence.
pub fn compile(pattern: &str) -> Result<Vec<Token>, PatternError> {
    let mut parser = Parser {
        chars: pattern.chars().peekable(),
    };

    // A leading anchor carries no information: matching is anchored anyway.
    if parser.chars.peek() == Some(&'^') {
        parser.chars.next();
    }

    let tokens = parser.parse_sequence(0)?;
    match parser.chars.peek() {
        None => {
            debug!(pattern, slots = super::ast::slot_count(&tokens), "compiled mask pattern");
            Ok(tokens)
        }
        Some(&c) => Err(PatternError::UnsupportedConstruct(c.to_string())),
    }
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
}

impl Parser<'_> {
    /// Parse tokens until end of input or, inside a group, a closing `)`.
    fn parse_sequence(&mut self, depth: usize) -> Result<Vec<Token>, PatternError> {
        let mut tokens = Vec::new();
        loop {
            match self.chars.peek() {
                None => break,
                Some(&')') if depth > 0 => break,
                Some(&'$') => {
                    self.chars.next();
                    // Only valid as the final character of the whole pattern.
                    if depth == 0 && self.chars.peek().is_none() {
                        break;
                    }
                    return Err(PatternError::UnsupportedConstruct("$".to_string()));
                }
                Some(&'(') => {
                    self.chars.next();
                    if depth >= 2 {
                        return Err(PatternError::GroupTooDeep);
                    }
                    let children = self.parse_sequence(depth + 1)?;
                    match self.chars.next() {
                        Some(')') => {}
                        _ => return Err(PatternError::UnclosedGroup),
                    }
                    tokens.push(Token::Group(children));
                }
                Some(&'[') => {
                    self.chars.next();
                    let alphabet = self.parse_class()?;
                    let (min_len, max_len) = self.parse_quantifier()?;
                    tokens.push(Token::ClassRun {
                        alphabet,
                        min_len,
                        max_len,
                    });
                }
                Some(&'\\') => {
                    self.chars.next();
                    match self.parse_escape()? {
                        Escape::Digit => {
                            let (min_len, max_len) = self.parse_quantifier()?;
                            tokens.push(Token::ClassRun {
                                alphabet: alphabet::AlphabetId::Digits,
                                min_len,
                                max_len,
                            });
                        }
                        Escape::Literal(c) => tokens.push(Token::Literal(c)),
                    }
                }
                Some(&('+' | '*' | '{')) => {
                    // Quantifiers are consumed right after a class; seeing
                    // one here means there is no class to attach it to.
                    return Err(PatternError::DanglingQuantifier);
                }
                Some(&(c @ ('?' | '|' | '.' | '^' | ')' | ']' | '}'))) => {
                    return Err(PatternError::UnsupportedConstruct(c.to_string()));
                }
                Some(&c) => {
                    self.chars.next();
                    tokens.push(Token::Literal(c));
                }
            }
        }
        Ok(tokens)
    }

    /// Parse the character after a `\`.
    fn parse_escape(&mut self) -> Result<Escape, PatternError> {
        match self.chars.next() {
            None => Err(PatternError::UnexpectedEnd),
            Some('d') => Ok(Escape::Digit),
            Some(c) if c.is_ascii_alphanumeric() => {
                // Other shorthand classes (\w, \s, …) are not in the subset;
                // reject rather than mis-tokenize.
                Err(PatternError::UnsupportedConstruct(format!("\\{c}")))
            }
            Some(c) => Ok(Escape::Literal(c)),
        }
    }

    /// Parse an optional quantifier after a class, returning `(min, max)`.
    ///
    /// Open-ended repetition is bounded by the mask context to the minimum
    /// it guarantees: `+` contributes one slot, `{n,}` contributes n.
    fn parse_quantifier(&mut self) -> Result<(usize, usize), PatternError> {
        match self.chars.peek() {
            Some(&'+') => {
                self.chars.next();
                Ok((1, 1))
            }
            Some(&'*') => {
                self.chars.next();
                Err(PatternError::UnboundedRepetition)
            }
            Some(&'{') => {
                self.chars.next();
                self.parse_count()
            }
            _ => Ok((1, 1)),
        }
    }

    /// Parse a `{n}` / `{n,m}` / `{n,}` count (the `{` has been consumed).
    fn parse_count(&mut self) -> Result<(usize, usize), PatternError> {
        let min = self.parse_number()?;
        match self.chars.next() {
            Some('}') => {
                if min == 0 {
                    return Err(PatternError::InvalidCount);
                }
                Ok((min, min))
            }
            Some(',') => {
                if self.chars.peek() == Some(&'}') {
                    self.chars.next();
                    // {n,} — no explicit bound; clamp to the guaranteed n.
                    if min == 0 {
                        return Err(PatternError::UnboundedRepetition);
                    }
                    return Ok((min, min));
                }
                let max = self.parse_number()?;
                match self.chars.next() {
                    Some('}') => {}
                    _ => return Err(PatternError::InvalidCount),
                }
                if max == 0 || min > max {
                    return Err(PatternError::InvalidCount);
                }
                Ok((min, max))
            }
            _ => Err(PatternError::InvalidCount),
        }
    }

    fn parse_number(&mut self) -> Result<usize, PatternError> {
        let mut s = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() {
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        if s.is_empty() {
            return Err(PatternError::InvalidCount);
        }
        s.parse::<usize>().map_err(|_| PatternError::InvalidCount)
    }

    /// Parse a `[...]` set (the `[` has been consumed) and resolve it
    /// against the alphabet registry by exact set equality.
    fn parse_class(&mut self) -> Result<alphabet::AlphabetId, PatternError> {
        if self.chars.peek() == Some(&'^') {
            return Err(PatternError::UnsupportedConstruct("[^".to_string()));
        }

        let mut raw = String::new();
        let mut members: Vec<char> = Vec::new();
        let mut pending: Option<char> = None;

        loop {
            match self.chars.next() {
                None => return Err(PatternError::UnclosedClass),
                Some(']') => {
                    if let Some(p) = pending.take() {
                        members.push(p);
                    }
                    break;
                }
                Some('\\') => {
                    let c = self.chars.next().ok_or(PatternError::UnclosedClass)?;
                    raw.push('\\');
                    raw.push(c);
                    if let Some(p) = pending.take() {
                        members.push(p);
                    }
                    pending = Some(c);
                }
                Some('-') => {
                    raw.push('-');
                    match (pending.take(), self.chars.peek()) {
                        // x-y range: expand inclusively.
                        (Some(lo), Some(&hi)) if hi != ']' => {
                            self.chars.next();
                            raw.push(hi);
                            if lo > hi {
                                return Err(PatternError::UnsupportedConstruct(format!(
                                    "[{lo}-{hi}]"
                                )));
                            }
                            members.extend(lo..=hi);
                        }
                        // Leading or trailing '-' is a plain member.
                        (p, _) => {
                            if let Some(p) = p {
                                members.push(p);
                            }
                            pending = Some('-');
                        }
                    }
                }
                Some(c) => {
                    raw.push(c);
                    if let Some(p) = pending.take() {
                        members.push(p);
                    }
                    pending = Some(c);
                }
            }
        }

        alphabet::resolve_set(&members)
            .ok_or_else(|| PatternError::UnsupportedConstruct(format!("[{raw}]")))
    }
}

enum Escape {
    Digit,
    Literal(char),
}
