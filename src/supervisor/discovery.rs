//! Find running server processes by name.
//!
//! Uses `pgrep -f` and falls back to scanning `ps aux` when `pgrep` is not
//! installed. Only processes whose executable (first command-line word) is
//! the server binary match, so `tail -f weather-server.log` is not mistaken
//! for the weather server.

use std::io::ErrorKind;
use std::process::Command;
use tracing::{debug, warn};

/// Where a PID list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Pgrep,
    Ps,
    /// Neither tool could be run
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub pids: Vec<i32>,
    pub source: Source,
}

/// PIDs of processes running the binary `name`, excluding this process.
pub fn find_pids(name: &str) -> Lookup {
    let own_pid = std::process::id() as i32;

    let mut lookup = match pgrep(name) {
        Ok(pids) => Lookup {
            pids,
            source: Source::Pgrep,
        },
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("pgrep not available, falling back to ps");
            match ps(name) {
                Ok(pids) => Lookup {
                    pids,
                    source: Source::Ps,
                },
                Err(e) => {
                    warn!(error = %e, "Unable to list processes");
                    Lookup {
                        pids: Vec::new(),
                        source: Source::Unavailable,
                    }
                }
            }
        }
        Err(e) => {
            warn!(error = %e, "pgrep failed");
            Lookup {
                pids: Vec::new(),
                source: Source::Unavailable,
            }
        }
    };

    lookup.pids.retain(|&pid| pid != own_pid);
    debug!(server = name, pids = ?lookup.pids, source = ?lookup.source, "Process lookup");
    lookup
}

fn pgrep(name: &str) -> std::io::Result<Vec<i32>> {
    let output = Command::new("pgrep")
        .arg("-f")
        .arg(command_pattern(name))
        .output()?;

    // pgrep exits 1 when nothing matched
    if !output.status.success() {
        return Ok(Vec::new());
    }
    Ok(parse_pid_lines(&String::from_utf8_lossy(&output.stdout)))
}

fn ps(name: &str) -> std::io::Result<Vec<i32>> {
    let output = Command::new("ps").arg("aux").output()?;
    if !output.status.success() {
        return Ok(Vec::new());
    }
    Ok(parse_ps_aux(&String::from_utf8_lossy(&output.stdout), name))
}

/// Extended regex matching a command line whose first word is `name`,
/// optionally preceded by a directory.
pub fn command_pattern(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars() {
        if "\\.^$|?*+()[]{}".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("^([^ ]*/)?{}( |$)", escaped)
}

/// Parse `pgrep` output: one PID per line. Unparseable lines are skipped.
pub fn parse_pid_lines(output: &str) -> Vec<i32> {
    output
        .lines()
        .filter_map(|line| line.trim().parse::<i32>().ok())
        .collect()
}

/// Parse `ps aux` output, returning the PID column of rows running `name`.
///
/// The command column starts at the 11th field.
pub fn parse_ps_aux(output: &str, name: &str) -> Vec<i32> {
    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let executable = fields.get(10)?;
            if !is_executable(executable, name) {
                return None;
            }
            fields.get(1)?.parse::<i32>().ok()
        })
        .collect()
}

fn is_executable(word: &str, name: &str) -> bool {
    word == name || word.rsplit('/').next() == Some(name)
}
