//! The user's crontab as positional lines.
//!
//! The OS boundary offers no partial mutation: `crontab -l` lists the whole
//! table and `crontab <file>` replaces it. Every change is therefore a full
//! read-modify-write of the text.
//!
//! Known hazard: nothing locks the table between the listing and the
//! rewrite. If another process edits the crontab in between, a delete
//! removes whatever now sits at the line number taken from the stale
//! listing, and the rewrite discards the other process's change. This is not
//! detected.

use std::fmt;

use crate::config::Settings;
use crate::error::{AdminError, Result};
use crate::io::temp_file_with;
use crate::runner::{CommandRunner, ExecutionResult, Invocation};
use crate::validate::CRON_FIELDS;

// ---------------------------------------------------------------------------
// CronEntry
// ---------------------------------------------------------------------------

/// One line of the crontab. Lines that are not jobs (comments, variable
/// assignments) keep an empty `schedule` and their raw text as `command`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronEntry {
    pub schedule: String,
    pub command: String,
    /// 1-based position in the crontab text.
    pub line_number: usize,
}

impl CronEntry {
    pub fn parse_line(line_number: usize, line: &str) -> Self {
        let trimmed = line.trim_start();
        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        let is_job = !trimmed.starts_with('#')
            && !trimmed.starts_with('@')
            && fields.len() > CRON_FIELDS
            && !fields[0].contains('=');

        if !is_job {
            return Self {
                schedule: String::new(),
                command: line.to_string(),
                line_number,
            };
        }

        // Command text starts after the fifth field, with its own spacing kept.
        let mut rest = trimmed;
        for _ in 0..CRON_FIELDS {
            rest = rest.trim_start();
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            rest = &rest[end..];
        }
        Self {
            schedule: fields[..CRON_FIELDS].join(" "),
            command: rest.trim().to_string(),
            line_number,
        }
    }

    pub fn is_job(&self) -> bool {
        !self.schedule.is_empty()
    }
}

impl fmt::Display for CronEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_job() {
            write!(f, "{} {}", self.schedule, self.command)
        } else {
            f.write_str(&self.command)
        }
    }
}

// ---------------------------------------------------------------------------
// Crontab
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Crontab {
    lines: Vec<String>,
}

impl Crontab {
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.lines().map(|l| l.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn entries(&self) -> Vec<CronEntry> {
        self.lines
            .iter()
            .enumerate()
            .map(|(i, line)| CronEntry::parse_line(i + 1, line))
            .collect()
    }

    /// Copy of the table without the 1-based `line_number`. `None` if the
    /// line does not exist.
    pub fn without_line(&self, line_number: usize) -> Option<Crontab> {
        if line_number == 0 || line_number > self.lines.len() {
            return None;
        }
        let mut lines = self.lines.clone();
        lines.remove(line_number - 1);
        Some(Crontab { lines })
    }

    /// Copy of the table with `<schedule> <command>` appended.
    pub fn with_entry(&self, schedule: &str, command: &str) -> Crontab {
        let mut lines = self.lines.clone();
        lines.push(format!("{schedule} {command}"));
        Crontab { lines }
    }

    /// Full crontab text. Non-empty tables end with a newline, which
    /// `crontab` requires on the last entry.
    pub fn render(&self) -> String {
        if self.lines.is_empty() {
            return String::new();
        }
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

// ---------------------------------------------------------------------------
// OS boundary
// ---------------------------------------------------------------------------

/// `crontab -l` prints this when the user has no table yet.
const NO_CRONTAB: &str = "no crontab for";

/// Read the current table with `crontab -l`.
///
/// A user without a crontab reads as an empty table. Any other failing
/// listing is an error, so no rewrite is built from an unseen table.
pub fn read_crontab(runner: &mut dyn CommandRunner, settings: &Settings) -> Result<Crontab> {
    let result = runner.run(&settings.crontab_program, &["-l"]);
    if result.success() {
        return Ok(Crontab::parse(&result.stdout));
    }
    if result.stderr.contains(NO_CRONTAB) {
        tracing::debug!("no crontab yet; starting from an empty table");
        return Ok(Crontab::default());
    }
    tracing::warn!(
        exit_code = result.exit_code,
        stderr = %result.stderr.trim(),
        "crontab listing failed"
    );
    Err(AdminError::CrontabRead {
        exit_code: result.exit_code,
        stderr: result.stderr.trim().to_string(),
    })
}

/// Replace the whole table with `table`.
///
/// The text goes through a temporary file handed to `crontab <file>`. The
/// returned result carries the installer's exit code.
pub fn install_crontab(
    runner: &mut dyn CommandRunner,
    settings: &Settings,
    table: &Crontab,
) -> Result<ExecutionResult> {
    let tmp = temp_file_with(table.render().as_bytes())?;
    let path = tmp
        .path()
        .to_str()
        .ok_or_else(|| AdminError::CrontabWrite("temp path is not valid UTF-8".into()))?;

    tracing::info!(lines = table.len(), "rewriting crontab");
    let result = runner.execute(&Invocation::new(&settings.crontab_program, &[path]));
    Ok(result)
}
