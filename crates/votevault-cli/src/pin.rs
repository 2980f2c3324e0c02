//! PIN input.
//!
//! The PIN comes from `VOTEVAULT_PIN` when set. Otherwise it is typed at the
//! terminal with each character echoed as `*`, or, when standard input is
//! not a terminal, read from its first line. It is held in a [`Zeroizing`]
//! buffer and wiped when the command finishes.

use std::{
    fmt,
    io::{self, BufRead, Write},
};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use zeroize::Zeroizing;

use crate::error::CliError;

/// Environment variable consulted before standard input
pub const PIN_ENV_VAR: &str = "VOTEVAULT_PIN";

/// Read the PIN from `from_env`, falling back to one line of `input`.
///
/// The trailing line ending is stripped; nothing else is. Callers pass
/// `std::env::var(PIN_ENV_VAR).ok()` and a locked stdin.
///
/// # Errors
///
/// - `EmptyPin`: no PIN given
/// - `Io`: reading `input` failed
pub fn read_pin(
    from_env: Option<String>,
    mut input: impl BufRead,
) -> Result<Zeroizing<Vec<u8>>, CliError> {
    let pin = match from_env {
        Some(value) => Zeroizing::new(value.into_bytes()),
        None => {
            let mut line = Zeroizing::new(String::new());
            input.read_line(&mut line)?;

            let len = line.trim_end_matches(['\r', '\n']).len();
            Zeroizing::new(line.as_bytes()[..len].to_vec())
        },
    };

    if pin.is_empty() {
        return Err(CliError::EmptyPin);
    }
    Ok(pin)
}

/// Initial buffer size, so typical PINs never reallocate and leave copies
const PIN_CAPACITY: usize = 64;

/// Effect of one key press on a [`MaskedPin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinKey {
    /// A character was appended
    Typed,
    /// The last character was removed
    Erased,
    /// Enter: the PIN is complete
    Submitted,
    /// Esc or Ctrl-C: entry abandoned
    Cancelled,
    /// No effect
    Ignored,
}

/// PIN being typed at a terminal, fed one key event at a time.
pub struct MaskedPin {
    typed: Zeroizing<String>,
}

impl Default for MaskedPin {
    fn default() -> Self {
        Self { typed: Zeroizing::new(String::with_capacity(PIN_CAPACITY)) }
    }
}

impl fmt::Debug for MaskedPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaskedPin").field("len", &self.typed.chars().count()).finish()
    }
}

impl MaskedPin {
    /// Apply one key event. Only presses count; repeats and releases are
    /// ignored.
    pub fn handle_key(&mut self, key: KeyEvent) -> PinKey {
        if key.kind != KeyEventKind::Press {
            return PinKey::Ignored;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                PinKey::Cancelled
            },
            KeyCode::Char(c) => {
                self.typed.push(c);
                PinKey::Typed
            },
            KeyCode::Backspace => {
                if self.typed.pop().is_some() {
                    PinKey::Erased
                } else {
                    PinKey::Ignored
                }
            },
            KeyCode::Enter => PinKey::Submitted,
            KeyCode::Esc => PinKey::Cancelled,
            _ => PinKey::Ignored,
        }
    }

    /// The typed PIN as bytes.
    ///
    /// # Errors
    ///
    /// - `EmptyPin`: nothing was typed
    pub fn finish(self) -> Result<Zeroizing<Vec<u8>>, CliError> {
        if self.typed.is_empty() {
            return Err(CliError::EmptyPin);
        }
        Ok(Zeroizing::new(self.typed.as_bytes().to_vec()))
    }
}

/// Raw mode for the lifetime of the guard.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Prompt for the PIN on the terminal without echoing it.
///
/// `prompt` and one `*` per typed character go to stderr. The terminal is
/// restored before returning, on every path.
///
/// # Errors
///
/// - `PinEntryCancelled`: Esc or Ctrl-C
/// - `EmptyPin`: Enter with nothing typed
/// - `Io`: the terminal could not be read or switched to raw mode
pub fn prompt_pin(prompt: &str) -> Result<Zeroizing<Vec<u8>>, CliError> {
    let mut out = io::stderr().lock();
    write!(out, "{prompt}")?;
    out.flush()?;

    let mut pin = MaskedPin::default();
    let outcome = {
        let _raw = RawMode::enable()?;
        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            match pin.handle_key(key) {
                PinKey::Typed => write!(out, "*")?,
                PinKey::Erased => write!(out, "\x08 \x08")?,
                PinKey::Ignored => continue,
                PinKey::Submitted => break Ok(()),
                PinKey::Cancelled => break Err(CliError::PinEntryCancelled),
            }
            out.flush()?;
        }
    };

    writeln!(out)?;
    outcome?;
    pin.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_wins_over_input() {
        let pin = read_pin(Some("1234".to_string()), &b"9999\n"[..]).unwrap();
        assert_eq!(pin.as_slice(), b"1234");
    }

    #[test]
    fn reads_first_line_without_line_ending() {
        let pin = read_pin(None, &b"1234\r\nignored\n"[..]).unwrap();
        assert_eq!(pin.as_slice(), b"1234");
    }

    #[test]
    fn inner_whitespace_is_kept() {
        let pin = read_pin(None, &b" 12 34\n"[..]).unwrap();
        assert_eq!(pin.as_slice(), b" 12 34");
    }

    #[test]
    fn empty_pin_is_rejected() {
        assert_eq!(read_pin(None, &b"\n"[..]), Err(CliError::EmptyPin));
        assert_eq!(read_pin(None, &b""[..]), Err(CliError::EmptyPin));
        assert_eq!(read_pin(Some(String::new()), &b"1234\n"[..]), Err(CliError::EmptyPin));
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_keys(pin: &mut MaskedPin, keys: &str) {
        for c in keys.chars() {
            assert_eq!(pin.handle_key(press(KeyCode::Char(c))), PinKey::Typed);
        }
    }

    #[test]
    fn masked_entry_collects_typed_characters() {
        let mut pin = MaskedPin::default();
        type_keys(&mut pin, "1234");

        assert_eq!(pin.handle_key(press(KeyCode::Enter)), PinKey::Submitted);
        assert_eq!(pin.finish().unwrap().as_slice(), b"1234");
    }

    #[test]
    fn backspace_erases_last_character() {
        let mut pin = MaskedPin::default();
        assert_eq!(pin.handle_key(press(KeyCode::Backspace)), PinKey::Ignored);

        type_keys(&mut pin, "129");
        assert_eq!(pin.handle_key(press(KeyCode::Backspace)), PinKey::Erased);
        type_keys(&mut pin, "34");

        assert_eq!(pin.finish().unwrap().as_slice(), b"1234");
    }

    #[test]
    fn escape_and_ctrl_c_cancel() {
        let mut pin = MaskedPin::default();
        type_keys(&mut pin, "12");

        assert_eq!(pin.handle_key(press(KeyCode::Esc)), PinKey::Cancelled);
        assert_eq!(
            pin.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            PinKey::Cancelled
        );
    }

    #[test]
    fn releases_and_other_keys_are_ignored() {
        let mut pin = MaskedPin::default();
        let mut release = press(KeyCode::Char('9'));
        release.kind = KeyEventKind::Release;

        assert_eq!(pin.handle_key(release), PinKey::Ignored);
        assert_eq!(pin.handle_key(press(KeyCode::Left)), PinKey::Ignored);
        assert_eq!(pin.handle_key(press(KeyCode::Tab)), PinKey::Ignored);
        assert_eq!(pin.finish(), Err(CliError::EmptyPin));
    }

    #[test]
    fn masked_pin_debug_hides_digits() {
        let mut pin = MaskedPin::default();
        type_keys(&mut pin, "4321");

        let debug = format!("{pin:?}");
        assert!(!debug.contains("4321"));
        assert!(debug.contains("len: 4"));
    }
}
