//! Line-oriented control input
//!
//! Each line from the control stream is either a key name resolved through
//! the key bindings (`space`, `pageup`, `,` ...), a textual command with an
//! argument (`seek 4096`, `seek+ -100`, `volume 0.1`, `loop 0 8192`), or the
//! snake_case name of a [`KeyAction`]. End of input quits.

use std::collections::BTreeMap;
use std::io::BufRead;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use serde::de::IntoDeserializer;
use serde::de::value::StrDeserializer;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use waterfall_core::{Command, VOLUME_STEP};

/// Something the control collaborator asks the player to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    /// Forward to the session
    Command(Command),
    /// Write the current frame as a PNG
    Capture,
    /// End the session
    Quit,
}

/// A bindable action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    TogglePause,
    ToggleMute,
    IncreaseRate,
    DecreaseRate,
    JumpRateUp,
    JumpRateDown,
    ReverseDirection,
    ResetDefault,
    ForcePositive,
    ForceNegative,
    Freeze,
    StepForward,
    StepBack,
    SeekStart,
    SeekLastFrame,
    Restart,
    ToggleLoop,
    ToggleBoomerang,
    SetLoopStart,
    SetLoopEnd,
    VolumeUp,
    VolumeDown,
    Capture,
    Quit,
}

impl KeyAction {
    pub fn event(self) -> ControlEvent {
        let command = match self {
            KeyAction::TogglePause => Command::TogglePause,
            KeyAction::ToggleMute => Command::ToggleMute,
            KeyAction::IncreaseRate => Command::IncreaseRate,
            KeyAction::DecreaseRate => Command::DecreaseRate,
            KeyAction::JumpRateUp => Command::JumpRateUp,
            KeyAction::JumpRateDown => Command::JumpRateDown,
            KeyAction::ReverseDirection => Command::ReverseDirection,
            KeyAction::ResetDefault => Command::ResetDefault,
            KeyAction::ForcePositive => Command::ForcePositive,
            KeyAction::ForceNegative => Command::ForceNegative,
            KeyAction::Freeze => Command::Freeze,
            KeyAction::StepForward => Command::StepFrame(1),
            KeyAction::StepBack => Command::StepFrame(-1),
            KeyAction::SeekStart => Command::SeekStart,
            KeyAction::SeekLastFrame => Command::SeekLastFrame,
            KeyAction::Restart => Command::Restart,
            KeyAction::ToggleLoop => Command::ToggleLoop,
            KeyAction::ToggleBoomerang => Command::ToggleBoomerang,
            KeyAction::SetLoopStart => Command::SetLoopStartHere,
            KeyAction::SetLoopEnd => Command::SetLoopEndHere,
            KeyAction::VolumeUp => Command::AdjustVolume(VOLUME_STEP),
            KeyAction::VolumeDown => Command::AdjustVolume(-VOLUME_STEP),
            KeyAction::Capture => return ControlEvent::Capture,
            KeyAction::Quit => return ControlEvent::Quit,
        };
        ControlEvent::Command(command)
    }

    fn from_name(name: &str) -> Option<Self> {
        let de: StrDeserializer<'_, serde::de::value::Error> = name.into_deserializer();
        Self::deserialize(de).ok()
    }
}

/// Key name -> action table
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBindings {
    map: BTreeMap<String, KeyAction>,
}

impl KeyBindings {
    /// Defaults with user overrides layered on top
    pub fn with_overrides(overrides: &BTreeMap<String, KeyAction>) -> Self {
        let mut bindings = Self::default();
        for (key, action) in overrides {
            bindings.map.insert(key.to_ascii_lowercase(), *action);
        }
        bindings
    }

    pub fn get(&self, key: &str) -> Option<KeyAction> {
        self.map.get(&key.to_ascii_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        use KeyAction::*;
        let map = [
            ("space", TogglePause),
            ("up", IncreaseRate),
            ("down", DecreaseRate),
            ("right", StepForward),
            ("left", StepBack),
            ("pageup", JumpRateUp),
            ("pagedown", JumpRateDown),
            ("home", SeekStart),
            ("end", SeekLastFrame),
            ("backspace", Restart),
            ("0", ResetDefault),
            ("-", ForceNegative),
            ("=", ForcePositive),
            ("r", ReverseDirection),
            ("m", ToggleMute),
            ("l", ToggleLoop),
            ("b", ToggleBoomerang),
            (",", SetLoopStart),
            (".", SetLoopEnd),
            ("+", VolumeUp),
            ("kp-", VolumeDown),
            ("c", Capture),
            ("q", Quit),
        ]
        .into_iter()
        .map(|(key, action)| (key.to_string(), action))
        .collect();
        Self { map }
    }
}

/// A control line that could not be understood
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("unknown key or command '{0}'")]
    Unknown(String),

    #[error("'{command}' needs {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("'{command}': '{value}' is not a number")]
    BadNumber { command: &'static str, value: String },
}

fn number(command: &'static str, value: Option<&str>) -> Result<f64, InputError> {
    let value = value.ok_or(InputError::MissingArgument {
        command,
        expected: "a number",
    })?;
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| InputError::BadNumber {
            command,
            value: value.to_string(),
        })
}

/// Parse one control line; blank lines yield `None`
pub fn parse_line(line: &str, bindings: &KeyBindings) -> Result<Option<ControlEvent>, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let mut words = line.split_whitespace();
    let head = words.next().unwrap_or_default().to_ascii_lowercase();
    let event = match head.as_str() {
        "seek" => ControlEvent::Command(Command::SeekAbsolute(number("seek", words.next())?)),
        "seek+" => ControlEvent::Command(Command::SeekRelative(number("seek+", words.next())?)),
        "volume" => ControlEvent::Command(Command::AdjustVolume(number("volume", words.next())?)),
        "loop" => {
            let start = number("loop", words.next())?;
            let end = number("loop", words.next())?;
            ControlEvent::Command(Command::SetLoop { start, end })
        }
        "quit" | "exit" => ControlEvent::Quit,
        key => match bindings.get(key).or_else(|| KeyAction::from_name(key)) {
            Some(action) => action.event(),
            None => return Err(InputError::Unknown(line.to_string())),
        },
    };
    Ok(Some(event))
}

/// Read control lines until EOF, `quit`, or the receiver goes away
///
/// Unparsable lines are logged and skipped. Always ends with a `Quit` event
/// unless the receiver is gone.
pub fn read_controls<R: BufRead>(reader: R, bindings: &KeyBindings, tx: &Sender<ControlEvent>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Control input error: {}", e);
                break;
            }
        };
        match parse_line(&line, bindings) {
            Ok(Some(event)) => {
                debug!(?event, "Control event");
                if tx.send(event).is_err() {
                    return;
                }
                if event == ControlEvent::Quit {
                    return;
                }
            }
            Ok(None) => {}
            Err(e) => warn!("{}", e),
        }
    }
    let _ = tx.send(ControlEvent::Quit);
}

/// Spawn a thread that reads control lines from stdin
pub fn spawn_stdin_reader(bindings: KeyBindings, tx: Sender<ControlEvent>) -> JoinHandle<()> {
    thread::Builder::new()
        .name("control-input".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            read_controls(stdin.lock(), &bindings, &tx);
            debug!("Control input thread finished");
        })
        .expect("failed to spawn control input thread")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::mpsc;

    fn parse(line: &str) -> Result<Option<ControlEvent>, InputError> {
        parse_line(line, &KeyBindings::default())
    }

    fn command(line: &str) -> Command {
        match parse(line) {
            Ok(Some(ControlEvent::Command(c))) => c,
            other => panic!("{line:?} parsed to {other:?}"),
        }
    }

    // =============================================================
    // Key names
    // =============================================================

    #[test]
    fn test_default_keys() {
        assert_eq!(command("space"), Command::TogglePause);
        assert_eq!(command("right"), Command::StepFrame(1));
        assert_eq!(command("left"), Command::StepFrame(-1));
        assert_eq!(command("PageUp"), Command::JumpRateUp);
        assert_eq!(command("0"), Command::ResetDefault);
        assert_eq!(command("-"), Command::ForceNegative);
        assert_eq!(command("="), Command::ForcePositive);
        assert_eq!(command("r"), Command::ReverseDirection);
        assert_eq!(command(","), Command::SetLoopStartHere);
        assert_eq!(command("."), Command::SetLoopEndHere);
        assert_eq!(command("+"), Command::AdjustVolume(VOLUME_STEP));
        assert_eq!(command("kp-"), Command::AdjustVolume(-VOLUME_STEP));
        assert_eq!(parse("q"), Ok(Some(ControlEvent::Quit)));
        assert_eq!(parse("c"), Ok(Some(ControlEvent::Capture)));
    }

    #[test]
    fn test_action_names() {
        assert_eq!(command("freeze"), Command::Freeze);
        assert_eq!(command("toggle_boomerang"), Command::ToggleBoomerang);
        assert_eq!(parse("capture"), Ok(Some(ControlEvent::Capture)));
    }

    #[test]
    fn test_overrides_layer_on_defaults() {
        let mut overrides = BTreeMap::new();
        overrides.insert("F".to_string(), KeyAction::Freeze);
        overrides.insert("space".to_string(), KeyAction::ToggleMute);
        let bindings = KeyBindings::with_overrides(&overrides);
        assert_eq!(bindings.get("f"), Some(KeyAction::Freeze));
        assert_eq!(bindings.get("space"), Some(KeyAction::ToggleMute));
        assert_eq!(bindings.get("l"), Some(KeyAction::ToggleLoop));
        assert_eq!(bindings.len(), KeyBindings::default().len() + 1);
    }

    // =============================================================
    // Textual commands
    // =============================================================

    #[test]
    fn test_textual_commands() {
        assert_eq!(command("seek 4096"), Command::SeekAbsolute(4096.0));
        assert_eq!(command("  seek+ -100  "), Command::SeekRelative(-100.0));
        assert_eq!(command("volume 0.25"), Command::AdjustVolume(0.25));
        assert_eq!(
            command("loop 10 20.5"),
            Command::SetLoop {
                start: 10.0,
                end: 20.5
            }
        );
        assert_eq!(parse("quit"), Ok(Some(ControlEvent::Quit)));
        assert_eq!(parse("   "), Ok(None));
    }

    #[test]
    fn test_bad_lines() {
        assert_eq!(parse("jump"), Err(InputError::Unknown("jump".to_string())));
        assert!(matches!(
            parse("seek"),
            Err(InputError::MissingArgument { command: "seek", .. })
        ));
        assert!(matches!(
            parse("volume loud"),
            Err(InputError::BadNumber { command: "volume", .. })
        ));
        assert!(matches!(parse("seek nan"), Err(InputError::BadNumber { .. })));
    }

    // =============================================================
    // Reader loop
    // =============================================================

    #[test]
    fn test_reader_forwards_and_quits_on_eof() {
        let (tx, rx) = mpsc::channel();
        let input = Cursor::new("space\nbogus\n\nseek 12\n");
        read_controls(input, &KeyBindings::default(), &tx);
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                ControlEvent::Command(Command::TogglePause),
                ControlEvent::Command(Command::SeekAbsolute(12.0)),
                ControlEvent::Quit,
            ]
        );
    }

    #[test]
    fn test_reader_stops_at_quit() {
        let (tx, rx) = mpsc::channel();
        let input = Cursor::new("m\nq\nspace\n");
        read_controls(input, &KeyBindings::default(), &tx);
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![ControlEvent::Command(Command::ToggleMute), ControlEvent::Quit]
        );
    }
}
