//! Edit scripts: one command per line, `#` starts a comment line.

use anyhow::{Context, Result, anyhow, bail};
use tabledom::{Key, Modifiers};

/// A single script step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Double-click the cell at (row, cell).
    DoubleClick { row: usize, cell: usize },
    /// Type into the focused input.
    Type(String),
    /// Press a key, e.g. `enter` or `ctrl+a`.
    Key { key: Key, modifiers: Modifiers },
    Blur,
    Get { row: usize, cell: usize },
    Set { row: usize, cell: usize, text: String },
    Last { cell: usize, text: String },
    /// Append a row; values are separated by `|`.
    Add(Vec<String>),
    Update { row: usize, values: Vec<String> },
    Delete(usize),
    /// Print the body rows.
    Rows,
    /// Print the table as JSON.
    Dump,
}

/// Parse a whole script. Blank lines and comments are skipped; the
/// returned pairs carry 1-based line numbers.
pub fn parse_script(src: &str) -> Result<Vec<(usize, Command)>> {
    let mut commands = Vec::new();
    for (i, line) in src.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let command = parse_line(line).with_context(|| format!("line {}", i + 1))?;
        commands.push((i + 1, command));
    }
    Ok(commands)
}

pub fn parse_line(line: &str) -> Result<Command> {
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "dblclick" => {
            let (row, cell, _) = address(rest, 2)?;
            Command::DoubleClick { row, cell }
        }
        "type" => Command::Type(rest.to_string()),
        "key" => {
            let (key, modifiers) = parse_key(rest)?;
            Command::Key { key, modifiers }
        }
        "blur" => Command::Blur,
        "get" => {
            let (row, cell, _) = address(rest, 2)?;
            Command::Get { row, cell }
        }
        "set" => {
            let (row, cell, text) = address(rest, 2)?;
            Command::Set { row, cell, text }
        }
        "last" => {
            let (cell, _, text) = address(rest, 1)?;
            Command::Last { cell, text }
        }
        "add" => Command::Add(split_values(rest)),
        "update" => {
            let (row, _, text) = address(rest, 1)?;
            Command::Update {
                row,
                values: split_values(&text),
            }
        }
        "delete" => {
            let (row, _, _) = address(rest, 1)?;
            Command::Delete(row)
        }
        "rows" => Command::Rows,
        "dump" => Command::Dump,
        other => bail!("unknown command '{other}'"),
    };
    Ok(command)
}

/// Read `count` (1 or 2) leading indices; the remainder is returned as text.
fn address(rest: &str, count: usize) -> Result<(usize, usize, String)> {
    let mut remainder = rest;
    let mut indices = [0; 2];
    for slot in indices.iter_mut().take(count) {
        let (token, tail) = match remainder.split_once(char::is_whitespace) {
            Some((token, tail)) => (token, tail.trim_start()),
            None => (remainder, ""),
        };
        if token.is_empty() {
            bail!("expected {count} index argument(s)");
        }
        *slot = token
            .parse()
            .with_context(|| format!("'{token}' is not an index"))?;
        remainder = tail;
    }
    Ok((indices[0], indices[1], remainder.to_string()))
}

fn split_values(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('|').map(str::to_string).collect()
}

/// Parse `name` or `mod+..+name`, modifiers being ctrl, shift and alt.
fn parse_key(spec: &str) -> Result<(Key, Modifiers)> {
    let spec = spec.trim();
    if spec.is_empty() {
        bail!("missing key name");
    }

    let mut modifiers = Modifiers::new();
    let mut parts: Vec<&str> = spec.split('+').collect();
    // "ctrl++" names the plus key
    let name = if spec.ends_with("++") {
        parts.truncate(parts.len().saturating_sub(2));
        "+"
    } else {
        parts.pop().unwrap_or_default()
    };

    for part in parts {
        match part.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => modifiers.ctrl = true,
            "shift" => modifiers.shift = true,
            "alt" => modifiers.alt = true,
            other => bail!("unknown modifier '{other}'"),
        }
    }

    let key = Key::from_name(name).ok_or_else(|| anyhow!("unknown key '{name}'"))?;
    Ok((key, modifiers))
}
