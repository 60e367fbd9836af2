//! Syntactic validation of user-supplied fields.
//!
//! Every check here is a pure function over the raw input. Checks that need
//! the live system (process liveness, timezone database lookup, directory
//! creation for paths) are layered on top by the dispatcher.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::maxscan;

pub const NICE_MIN: i32 = -20;
pub const NICE_MAX: i32 = 19;
pub const CRON_FIELDS: usize = 5;

// ---------------------------------------------------------------------------
// Rejection
// ---------------------------------------------------------------------------

/// Human-readable reason an input was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub reason: String,
}

impl Rejection {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

// ---------------------------------------------------------------------------
// ValidatorKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidatorKind {
    Pid,
    Nice,
    Port,
    CronSchedule,
    NonEmpty,
    Timezone,
    Path,
    IntegerList,
}

impl ValidatorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidatorKind::Pid => "pid",
            ValidatorKind::Nice => "nice",
            ValidatorKind::Port => "port",
            ValidatorKind::CronSchedule => "cron_schedule",
            ValidatorKind::NonEmpty => "non_empty",
            ValidatorKind::Timezone => "timezone",
            ValidatorKind::Path => "path",
            ValidatorKind::IntegerList => "integer_list",
        }
    }

    /// Run the syntactic rule for this kind and return the normalized value
    /// that will be substituted into the command template.
    pub fn check(self, raw: &str) -> Result<String, Rejection> {
        match self {
            ValidatorKind::Pid => pid(raw).map(|p| p.to_string()),
            ValidatorKind::Nice => nice(raw).map(|n| n.to_string()),
            ValidatorKind::Port => port(raw).map(|p| p.to_string()),
            ValidatorKind::CronSchedule => cron_schedule(raw),
            ValidatorKind::NonEmpty => non_empty(raw),
            ValidatorKind::Timezone => timezone_name(raw),
            ValidatorKind::Path => path_text(raw),
            ValidatorKind::IntegerList => maxscan::parse_values(raw).map(|values| {
                values
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            }),
        }
    }
}

impl fmt::Display for ValidatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

static DIGITS_RE: OnceLock<Regex> = OnceLock::new();
static CRON_FIELD_RE: OnceLock<Regex> = OnceLock::new();
static TIMEZONE_RE: OnceLock<Regex> = OnceLock::new();

fn digits_re() -> &'static Regex {
    DIGITS_RE.get_or_init(|| Regex::new(r"^[0-9]+$").unwrap())
}

fn cron_field_re() -> &'static Regex {
    CRON_FIELD_RE.get_or_init(|| Regex::new(r"^[0-9*]+$").unwrap())
}

fn timezone_re() -> &'static Regex {
    TIMEZONE_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_+\-]+(/[A-Za-z0-9_+\-]+)*$").unwrap())
}

/// Digits only, and positive: `kill 0` would signal our own process group.
/// Liveness is checked separately.
pub fn pid(raw: &str) -> Result<u32, Rejection> {
    let raw = raw.trim();
    if !digits_re().is_match(raw) {
        return Err(Rejection::new(format!(
            "invalid PID '{raw}': must contain digits only"
        )));
    }
    let value = raw
        .parse::<u32>()
        .map_err(|_| Rejection::new(format!("invalid PID '{raw}': out of range")))?;
    if value == 0 {
        return Err(Rejection::new(format!(
            "invalid PID '{raw}': PID must be positive"
        )));
    }
    Ok(value)
}

pub fn nice(raw: &str) -> Result<i32, Rejection> {
    let raw = raw.trim();
    let value: i64 = raw
        .parse()
        .map_err(|_| Rejection::new(format!("invalid nice value '{raw}': not an integer")))?;
    if value < i64::from(NICE_MIN) || value > i64::from(NICE_MAX) {
        return Err(Rejection::new(format!(
            "invalid nice value {value}: must be between {NICE_MIN} and {NICE_MAX}"
        )));
    }
    Ok(value as i32)
}

pub fn port(raw: &str) -> Result<u16, Rejection> {
    let raw = raw.trim();
    let value: i64 = raw
        .parse()
        .map_err(|_| Rejection::new(format!("invalid port '{raw}': not an integer")))?;
    u16::try_from(value).map_err(|_| {
        Rejection::new(format!(
            "invalid port {value}: must be between 0 and {}",
            u16::MAX
        ))
    })
}

/// Five whitespace-separated fields of digits and `*`. Field ranges are not
/// checked, so `99 2 * * *` passes.
pub fn cron_schedule(raw: &str) -> Result<String, Rejection> {
    let fields: Vec<&str> = raw.split_whitespace().collect();
    if fields.len() != CRON_FIELDS {
        return Err(Rejection::new(format!(
            "invalid schedule '{}': expected {CRON_FIELDS} fields, got {}",
            raw.trim(),
            fields.len()
        )));
    }
    if let Some(bad) = fields.iter().find(|f| !cron_field_re().is_match(f)) {
        return Err(Rejection::new(format!(
            "invalid schedule field '{bad}': only digits and '*' are allowed"
        )));
    }
    Ok(fields.join(" "))
}

pub fn non_empty(raw: &str) -> Result<String, Rejection> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Rejection::new("input must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Shape of a timezone name such as `Europe/Berlin`. Existence in the
/// timezone database is checked separately.
pub fn timezone_name(raw: &str) -> Result<String, Rejection> {
    let name = raw.trim();
    if !timezone_re().is_match(name) || name.split('/').any(|part| part == "..") {
        return Err(Rejection::new(format!("invalid timezone '{name}'")));
    }
    Ok(name.to_string())
}

pub fn path_text(raw: &str) -> Result<String, Rejection> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Rejection::new("path must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// 1-based line selector for the delete flow. `Ok(None)` means cancel.
pub fn line_selector(raw: &str, count: usize) -> Result<Option<usize>, Rejection> {
    let raw = raw.trim();
    if !digits_re().is_match(raw) {
        return Err(Rejection::new(format!(
            "invalid line number '{raw}': must contain digits only"
        )));
    }
    let n: usize = raw
        .parse()
        .map_err(|_| Rejection::new(format!("invalid line number '{raw}'")))?;
    if n == 0 {
        return Ok(None);
    }
    if n > count {
        return Err(Rejection::new(format!(
            "line {n} is out of range: the crontab has {count} line(s)"
        )));
    }
    Ok(Some(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pid_accepts_digits_only() {
        assert_eq!(pid("1234").unwrap(), 1234);
        assert_eq!(pid(" 42 ").unwrap(), 42);
        assert!(pid("").is_err());
        assert!(pid("-1").is_err());
        assert!(pid("12a").is_err());
        assert!(pid("1 2").is_err());
    }

    #[test]
    fn pid_zero_is_rejected() {
        for raw in ["0", "00", " 0 "] {
            let err = pid(raw).unwrap_err();
            assert!(err.reason.contains("must be positive"), "{raw}: {err}");
        }
        assert_eq!(pid("007").unwrap(), 7);
    }

    #[test]
    fn nice_range_is_closed() {
        assert_eq!(nice("-20").unwrap(), -20);
        assert_eq!(nice("19").unwrap(), 19);
        assert_eq!(nice("0").unwrap(), 0);
        assert!(nice("-21").is_err());
        assert!(nice("20").is_err());
        assert!(nice("ten").is_err());
    }

    #[test]
    fn port_range_is_closed() {
        assert_eq!(port("0").unwrap(), 0);
        assert_eq!(port("65535").unwrap(), 65535);
        assert!(port("65536").is_err());
        assert!(port("-1").is_err());
        assert!(port("http").is_err());
    }

    #[test]
    fn port_rejection_names_the_range() {
        let err = port("70000").unwrap_err();
        assert!(err.reason.contains("between 0 and 65535"), "{err}");
    }

    #[test]
    fn cron_schedule_rules() {
        assert_eq!(cron_schedule("0 2 * * *").unwrap(), "0 2 * * *");
        assert!(cron_schedule("0 2 * *").is_err());
        assert!(cron_schedule("0 2 * * * *").is_err());
        assert!(cron_schedule("a 2 * * *").is_err());
        assert!(cron_schedule("*/5 * * * *").is_err());
    }

    #[test]
    fn cron_schedule_does_not_check_field_ranges() {
        // Only the character class is enforced; minute 99 is accepted.
        assert_eq!(cron_schedule("99 2 * * *").unwrap(), "99 2 * * *");
    }

    #[test]
    fn cron_schedule_normalizes_spacing() {
        assert_eq!(cron_schedule("  0   2 * *\t* ").unwrap(), "0 2 * * *");
    }

    #[test]
    fn non_empty_rejects_blank() {
        assert!(non_empty("").is_err());
        assert!(non_empty("   \t").is_err());
        assert_eq!(non_empty("  vim ").unwrap(), "vim");
    }

    #[test]
    fn timezone_name_shape() {
        assert_eq!(timezone_name("Europe/Berlin").unwrap(), "Europe/Berlin");
        assert_eq!(timezone_name("UTC").unwrap(), "UTC");
        assert_eq!(timezone_name("Etc/GMT+5").unwrap(), "Etc/GMT+5");
        assert!(timezone_name("").is_err());
        assert!(timezone_name("/etc/passwd").is_err());
        assert!(timezone_name("../../etc/passwd").is_err());
        assert!(timezone_name("Europe Berlin").is_err());
    }

    #[test]
    fn line_selector_cancel_and_range() {
        assert_eq!(line_selector("0", 3).unwrap(), None);
        assert_eq!(line_selector("3", 3).unwrap(), Some(3));
        assert!(line_selector("4", 3).is_err());
        assert!(line_selector("1", 0).is_err());
        assert!(line_selector("x", 3).is_err());
    }

    #[test]
    fn kind_check_normalizes_values() {
        assert_eq!(ValidatorKind::Nice.check("+5").unwrap(), "5");
        assert_eq!(ValidatorKind::IntegerList.check("1, 2 3").unwrap(), "1,2,3");
        assert!(ValidatorKind::NonEmpty.check(" ").is_err());
    }
}
