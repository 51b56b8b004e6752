//! Hunter roster input: `NAME:ID` arguments or an interactive prompt loop.

use std::collections::HashSet;
use std::io::{BufRead, Write};

use crate::constants::MAX_HUNTER_NAME;
use crate::error::{RosterError, SimError};
use crate::types::HunterSpec;

const FINISH: &str = "done";

pub fn validate_name(name: &str) -> Result<&str, RosterError> {
    if name.is_empty() {
        return Err(RosterError::EmptyName);
    }
    if name.chars().count() > MAX_HUNTER_NAME {
        return Err(RosterError::NameTooLong {
            max: MAX_HUNTER_NAME,
        });
    }
    Ok(name)
}

pub fn parse_id(text: &str) -> Result<i32, RosterError> {
    let text = text.trim();
    text.parse()
        .map_err(|_| RosterError::InvalidId(text.to_string()))
}

/// Parses `NAME:ID`. Names may contain `:`; the id is whatever follows the last one.
pub fn parse_entry(entry: &str) -> Result<HunterSpec, RosterError> {
    let (name, id) = entry
        .rsplit_once(':')
        .ok_or_else(|| RosterError::MalformedEntry(entry.to_string()))?;
    Ok(HunterSpec {
        name: validate_name(name.trim())?.to_string(),
        id: parse_id(id)?,
    })
}

pub fn parse_entries<S: AsRef<str>>(entries: &[S]) -> Result<Vec<HunterSpec>, RosterError> {
    let roster = entries
        .iter()
        .map(|entry| parse_entry(entry.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    if roster.is_empty() {
        return Err(RosterError::NoHunters);
    }
    ensure_unique_ids(&roster)?;
    Ok(roster)
}

/// Occupancy is tracked by hunter id, so two hunters may not share one.
pub fn ensure_unique_ids(roster: &[HunterSpec]) -> Result<(), RosterError> {
    let mut seen = HashSet::with_capacity(roster.len());
    for hunter in roster {
        if !seen.insert(hunter.id) {
            return Err(RosterError::DuplicateId(hunter.id));
        }
    }
    Ok(())
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>, SimError> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Prompts for hunters until `done` (with at least one hunter entered) or end of input.
pub fn collect_interactive<R: BufRead, W: Write>(
    mut input: R,
    out: &mut W,
) -> Result<Vec<HunterSpec>, SimError> {
    writeln!(out, "==========================\nWillow House Investigation\n==========================")?;
    write!(out, "Enter hunters one at a time. Type '{FINISH}' as the name to finish.")?;

    let mut roster: Vec<HunterSpec> = Vec::new();
    'hunters: loop {
        let name = loop {
            write!(
                out,
                "\nEnter hunter's name (max {MAX_HUNTER_NAME} characters) or '{FINISH}' to finish: "
            )?;
            out.flush()?;
            let Some(line) = read_line(&mut input)? else {
                break 'hunters;
            };
            if line == FINISH {
                if roster.is_empty() {
                    write!(out, "\nError: Add at least 1 hunter")?;
                    continue;
                }
                break 'hunters;
            }
            match validate_name(&line) {
                Ok(_) => break line,
                Err(error) => write!(out, "\nError: {error}")?,
            }
        };

        let id = loop {
            write!(out, "Enter hunter ID (integer): ")?;
            out.flush()?;
            let Some(line) = read_line(&mut input)? else {
                break 'hunters;
            };
            match parse_id(&line) {
                Ok(id) if roster.iter().any(|hunter| hunter.id == id) => {
                    writeln!(out, "Error: {}", RosterError::DuplicateId(id))?
                }
                Ok(id) => break id,
                Err(_) => writeln!(out, "Error: Value was not an integer")?,
            }
        };
        roster.push(HunterSpec { name, id });
    }
    writeln!(out)?;

    if roster.is_empty() {
        return Err(RosterError::NoHunters.into());
    }
    Ok(roster)
}
