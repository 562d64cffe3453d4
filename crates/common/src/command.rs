//! Typed command nodes and the call-syntax parser.
//!
//! Command lines are parsed once, at compile time, into typed nodes with
//! already-parsed operands. Operands that must stay dynamic (anything the
//! user can write an expression into) are kept as source text and evaluated
//! at run time against the variable store and the current cell.
//!
//! Unrecognized call tokens parse to [`Command::Noop`]: they still count as
//! an executed step but have no physical effect. This keeps template text
//! that is not a command (structural comments, `pass`) forward-compatible.

/// Absolute movement direction for `moveDir`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    /// Heading in degrees (0 = right, 90 = down, canvas orientation).
    pub fn heading(self) -> f64 {
        match self {
            Direction::Right => 0.0,
            Direction::Down => 90.0,
            Direction::Left => 180.0,
            Direction::Up => 270.0,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "right" => Direction::Right,
            "down" => Direction::Down,
            "left" => Direction::Left,
            "up" => Direction::Up,
            _ => return None,
        })
    }
}

/// A single executable command.
///
/// String payloads are expression source text, evaluated when the command
/// runs; numeric payloads were literal digits in the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Forward(i64),
    Backward(i64),
    MoveDir(Direction, i64),
    TurnRight(i64),
    TurnLeft(i64),
    PenUp,
    PenDown,
    FillCell,
    SetColor(String),
    PenSize(u32),
    Home,
    Restart,
    Clear,
    Stamp,
    SetHeading(i64),
    Wait(String),
    /// Report the current cell's value (display-only, no state change).
    GetCellValue,
    SetCellValue(String),
    SetVar(String, String),
    SavePos(String),
    RestorePos(String),
    /// A recognized line with no effect (`pass`, unknown calls, `speed(..)`).
    Noop,
}

impl Command {
    /// Parse a cleaned command line (no indent, no tag) into a typed command.
    ///
    /// Returns [`Command::Noop`] for anything that is not in the catalog or
    /// whose operands do not parse; a bad command must never abort a run.
    pub fn parse(text: &str) -> Command {
        let text = text.trim();
        if text.is_empty() || text == "pass" || text.starts_with('#') {
            return Command::Noop;
        }

        let Some((name, args)) = split_call(text) else {
            return Command::Noop;
        };

        let cmd = match name {
            "forward" => arg_count(&args, 0).map(Command::Forward),
            "backward" => arg_count(&args, 0).map(Command::Backward),
            "moveDir" => {
                let dir = args.first().and_then(|a| Direction::parse(unquote(a)));
                let count = match args.get(1) {
                    Some(a) => parse_digits(a),
                    None => Some(1),
                };
                match (dir, count) {
                    (Some(d), Some(n)) => Some(Command::MoveDir(d, n)),
                    _ => None,
                }
            }
            "right" => arg_count(&args, 0).map(Command::TurnRight),
            "left" => arg_count(&args, 0).map(Command::TurnLeft),
            "penup" => Some(Command::PenUp),
            "pendown" => Some(Command::PenDown),
            "fillcell" => Some(Command::FillCell),
            "color" => args
                .first()
                .map(|a| Command::SetColor(unquote(a).to_string())),
            "pensize" => args
                .first()
                .and_then(|a| a.parse::<u32>().ok())
                .map(Command::PenSize),
            "home" => Some(Command::Home),
            "restart" => Some(Command::Restart),
            "clear" => Some(Command::Clear),
            "stamp" => Some(Command::Stamp),
            "setheading" => arg_count(&args, 0).map(Command::SetHeading),
            "wait" => args.first().map(|a| Command::Wait(a.to_string())),
            "getCurrentValue" => Some(Command::GetCellValue),
            "setCurrentValue" => args.first().map(|a| Command::SetCellValue(a.to_string())),
            "var_set" => match (args.first(), args.get(1)) {
                (Some(name), Some(value)) => Some(Command::SetVar(
                    unquote(name).to_string(),
                    value.to_string(),
                )),
                _ => None,
            },
            "savePos" => Some(Command::SavePos(pos_name(&args))),
            "restorePos" => Some(Command::RestorePos(pos_name(&args))),
            // The slider owns the speed setting; programs cannot override it.
            "speed" => Some(Command::Noop),
            _ => None,
        };

        cmd.unwrap_or(Command::Noop)
    }
}

/// Saved-position name argument, defaulting to `"default"`.
fn pos_name(args: &[String]) -> String {
    args.first()
        .map(|a| unquote(a).to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "default".to_string())
}

/// Digit-only operand at position `idx` (templates emit plain integers).
fn arg_count(args: &[String], idx: usize) -> Option<i64> {
    args.get(idx).and_then(|a| parse_digits(a))
}

fn parse_digits(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn unquote(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| s.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
        .unwrap_or(s)
}

/// Split `t.name(arg, arg)` into the call name and its top-level arguments.
///
/// The optional `t.` receiver prefix is stripped. Arguments are split on
/// commas at parenthesis depth zero only.
fn split_call(text: &str) -> Option<(&str, Vec<String>)> {
    let open = text.find('(')?;
    let close = text.rfind(')')?;
    if close < open {
        return None;
    }

    let mut name = text[..open].trim();
    name = name.strip_prefix("t.").unwrap_or(name);
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }

    let inner = &text[open + 1..close];
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in inner.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                args.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    let last = current.trim();
    if !last.is_empty() {
        args.push(last.to_string());
    }

    Some((name, args))
}
