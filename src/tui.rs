//! Interactive terminal field.
//!
//! Binds a compiled mask to a single-line raw-mode field: printable keys go
//! through the mask binding, rejected keys beep, Enter accepts the current
//! text and Esc cancels. The terminal line itself is the bound widget.

use std::io::{Write, stdout};

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyModifiers};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::{cursor, execute, terminal};

use crate::formatter::TextFormatter;
use crate::watcher::EditEvent;
use crate::widget::MaskedField;

/// The terminal line acting as the bound widget.
struct TermField {
    hint: String,
}

impl TermField {
    fn redraw(&self, text: &str, cursor_pos: usize) {
        let tail: String = self.hint.chars().skip(text.chars().count()).collect();
        execute!(
            stdout(),
            cursor::MoveToColumn(0),
            terminal::Clear(terminal::ClearType::CurrentLine),
            Print(text),
            SetAttribute(Attribute::Dim),
            Print(tail),
            SetAttribute(Attribute::Reset),
            cursor::MoveToColumn(cursor_pos as u16),
        )
        .ok();
        stdout().flush().ok();
    }
}

impl MaskedField for TermField {
    fn apply_rewrite(&mut self, text: &str, cursor: usize) -> Vec<EditEvent> {
        self.redraw(text, cursor);
        // The terminal does not echo programmatic writes back.
        Vec::new()
    }
}

/// Run the field until Enter (returns the committed text) or Esc/Ctrl-C
/// (returns `None`).
pub fn run(formatter: &TextFormatter) -> Result<Option<String>> {
    terminal::enable_raw_mode()?;
    let result = run_field(formatter);
    terminal::disable_raw_mode()?;
    println!();
    result
}

fn run_field(formatter: &TextFormatter) -> Result<Option<String>> {
    let field = TermField {
        hint: formatter.placeholder().to_string(),
    };
    field.redraw("", 0);

    let mut binding = formatter.bind(field);
    binding.on_reject(|_| {
        execute!(stdout(), Print('\x07')).ok();
    });

    loop {
        let Event::Key(key) = crossterm::event::read()? else {
            continue;
        };
        match key.code {
            KeyCode::Enter => return Ok(Some(binding.text())),
            KeyCode::Esc => return Ok(None),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(None);
            }
            KeyCode::Backspace => {
                binding.notify(EditEvent::Backspace {
                    at: binding.cursor(),
                });
            }
            KeyCode::Char(ch) => {
                binding.notify(EditEvent::Insert {
                    at: binding.cursor(),
                    text: ch.to_string(),
                });
            }
            _ => {}
        }
    }
}
