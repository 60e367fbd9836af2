use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::error::{AdminError, Result};
use crate::runner::OutputMode;
use crate::validate::ValidatorKind;

pub const EXIT_SELECTOR: &str = "0";

// ---------------------------------------------------------------------------
// Selector / Choice
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Selector {
    pub group: u8,
    pub item: u8,
}

impl Selector {
    pub fn new(group: u8, item: u8) -> Self {
        Self { group, item }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.group, self.item)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Exit,
    Action(Selector),
}

static SELECTOR_RE: OnceLock<Regex> = OnceLock::new();

fn selector_re() -> &'static Regex {
    SELECTOR_RE.get_or_init(|| Regex::new(r"^([0-9])\.([0-9])$").unwrap())
}

/// Parse a menu entry: `<digit>.<digit>` or the bare exit digit.
pub fn parse_choice(input: &str) -> Result<Choice> {
    let input = input.trim();
    if input == EXIT_SELECTOR {
        return Ok(Choice::Exit);
    }
    let caps = selector_re()
        .captures(input)
        .ok_or_else(|| AdminError::InvalidChoice(input.to_string()))?;
    let digit = |i: usize| -> Result<u8> {
        caps[i]
            .parse()
            .map_err(|_| AdminError::InvalidChoice(input.to_string()))
    };
    Ok(Choice::Action(Selector::new(digit(1)?, digit(2)?)))
}

// ---------------------------------------------------------------------------
// Command templates
// ---------------------------------------------------------------------------

/// One argument of a delegated command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Literal(&'static str),
    /// The validated answer to prompt `n`.
    Input(usize),
    /// The answer to prompt `n` glued to a fixed prefix, e.g. `:<port>`.
    Prefixed(&'static str, usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    pub program: &'static str,
    pub args: Vec<Arg>,
}

impl CommandTemplate {
    pub fn new(program: &'static str, args: Vec<Arg>) -> Self {
        Self { program, args }
    }

    pub fn render(&self, inputs: &[String]) -> Vec<String> {
        let answer = |i: usize| inputs.get(i).cloned().unwrap_or_default();
        self.args
            .iter()
            .map(|arg| match arg {
                Arg::Literal(s) => s.to_string(),
                Arg::Input(i) => answer(*i),
                Arg::Prefixed(prefix, i) => format!("{prefix}{}", answer(*i)),
            })
            .collect()
    }

    /// Highest prompt index referenced, if any.
    pub fn max_input(&self) -> Option<usize> {
        self.args
            .iter()
            .filter_map(|arg| match arg {
                Arg::Literal(_) => None,
                Arg::Input(i) | Arg::Prefixed(_, i) => Some(*i),
            })
            .max()
    }
}

fn lits(args: &[&'static str]) -> Vec<Arg> {
    args.iter().map(|a| Arg::Literal(*a)).collect()
}

// ---------------------------------------------------------------------------
// ActionDescriptor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub label: &'static str,
    pub kind: ValidatorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Run(CommandTemplate),
    AddCronEntry,
    DeleteCronEntry,
    FindMax,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub title: &'static str,
    pub prompts: Vec<Prompt>,
    pub operation: Operation,
    pub requires_privilege: bool,
    pub output: OutputMode,
    /// Printed after a zero exit in capture mode.
    pub success: &'static str,
    /// Completes "Error ..." after a nonzero exit.
    pub activity: &'static str,
}

impl ActionDescriptor {
    pub fn run(title: &'static str, program: &'static str, args: Vec<Arg>) -> Self {
        Self::new(title, Operation::Run(CommandTemplate::new(program, args)))
    }

    pub fn builtin(title: &'static str, operation: Operation) -> Self {
        Self::new(title, operation)
    }

    fn new(title: &'static str, operation: Operation) -> Self {
        Self {
            title,
            prompts: Vec::new(),
            operation,
            requires_privilege: false,
            output: OutputMode::Capture,
            success: "Done.",
            activity: "running the command",
        }
    }

    pub fn prompt(mut self, label: &'static str, kind: ValidatorKind) -> Self {
        self.prompts.push(Prompt { label, kind });
        self
    }

    pub fn privileged(mut self) -> Self {
        self.requires_privilege = true;
        self
    }

    pub fn streaming(mut self) -> Self {
        self.output = OutputMode::Stream;
        self
    }

    pub fn reports(mut self, success: &'static str, activity: &'static str) -> Self {
        self.success = success;
        self.activity = activity;
        self
    }

    pub fn is_listing(&self) -> bool {
        self.output == OutputMode::Stream
    }
}

// ---------------------------------------------------------------------------
// ActionRegistry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Group {
    pub number: u8,
    pub title: &'static str,
    pub actions: Vec<(u8, ActionDescriptor)>,
}

#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    groups: Vec<Group>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(
        mut self,
        number: u8,
        title: &'static str,
        actions: Vec<(u8, ActionDescriptor)>,
    ) -> Self {
        self.groups.push(Group {
            number,
            title,
            actions,
        });
        self
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn resolve(&self, selector: Selector) -> Result<&ActionDescriptor> {
        let group = self
            .groups
            .iter()
            .find(|g| g.number == selector.group)
            .ok_or_else(|| AdminError::InvalidChoice(selector.to_string()))?;
        group
            .actions
            .iter()
            .find(|(item, _)| *item == selector.item)
            .map(|(_, action)| action)
            .ok_or_else(|| AdminError::InvalidSubChoice {
                selector: selector.to_string(),
                group: group.number,
            })
    }

    /// Every registered action in menu order.
    pub fn catalog(&self) -> Vec<(Selector, &Group, &ActionDescriptor)> {
        self.groups
            .iter()
            .flat_map(|g| {
                g.actions
                    .iter()
                    .map(move |(item, action)| (Selector::new(g.number, *item), g, action))
            })
            .collect()
    }

    /// The full administration menu.
    pub fn standard() -> Self {
        use Arg::{Input, Prefixed};
        use ValidatorKind::*;

        Self::new()
            .group(
                1,
                "Process management",
                vec![
                    (1, ActionDescriptor::run("List processes", "ps", lits(&["aux"]))
                        .streaming()
                        .reports("", "listing processes")),
                    (2, ActionDescriptor::run(
                        "Search processes by name",
                        "pgrep",
                        vec![Arg::Literal("-a"), Arg::Literal("-f"), Input(0)],
                    )
                    .prompt("Process name", NonEmpty)
                    .streaming()
                    .reports("", "searching processes")),
                    (3, ActionDescriptor::run("Kill process", "kill", vec![Input(0)])
                        .prompt("PID", Pid)
                        .reports("Process terminated.", "killing the process")),
                    (4, ActionDescriptor::run(
                        "Change process priority",
                        "renice",
                        vec![Arg::Literal("-n"), Input(1), Arg::Literal("-p"), Input(0)],
                    )
                    .prompt("PID", Pid)
                    .prompt("Nice value (-20..19)", Nice)
                    .privileged()
                    .reports("Priority changed.", "changing the priority")),
                ],
            )
            .group(
                2,
                "Sockets and ports",
                vec![
                    (1, ActionDescriptor::run("List listening sockets", "ss", lits(&["-tulpn"]))
                        .streaming()
                        .reports("", "listing sockets")),
                    (2, ActionDescriptor::run(
                        "Find process using a port",
                        "lsof",
                        vec![Arg::Literal("-i"), Prefixed(":", 0)],
                    )
                    .prompt("Port", Port)
                    .streaming()
                    .reports("", "looking up the port")),
                    (3, ActionDescriptor::run(
                        "Show sockets on a port",
                        "ss",
                        vec![
                            Arg::Literal("-tuan"),
                            Arg::Literal("sport"),
                            Arg::Literal("="),
                            Prefixed(":", 0),
                        ],
                    )
                    .prompt("Port", Port)
                    .streaming()
                    .reports("", "listing sockets on the port")),
                ],
            )
            .group(
                3,
                "Network",
                vec![
                    (1, ActionDescriptor::run("Show network configuration", "ip", lits(&["addr", "show"]))
                        .streaming()
                        .reports("", "reading the network configuration")),
                    (2, ActionDescriptor::run(
                        "Test connectivity (ping)",
                        "ping",
                        vec![Arg::Literal("-c"), Arg::Literal("4"), Input(0)],
                    )
                    .prompt("Host", NonEmpty)
                    .streaming()
                    .reports("", "pinging the host")),
                    (3, ActionDescriptor::run("Enable networking", "nmcli", lits(&["networking", "on"]))
                        .privileged()
                        .reports("Networking enabled.", "enabling networking")),
                    (4, ActionDescriptor::run("Disable networking", "nmcli", lits(&["networking", "off"]))
                        .privileged()
                        .reports("Networking disabled.", "disabling networking")),
                ],
            )
            .group(
                4,
                "Files",
                vec![
                    (1, ActionDescriptor::run("Create empty file", "touch", vec![Input(0)])
                        .prompt("File path", Path)
                        .reports("File created.", "creating the file")),
                    (2, ActionDescriptor::run("Show file contents", "cat", vec![Input(0)])
                        .prompt("File path", Path)
                        .streaming()
                        .reports("", "reading the file")),
                    (3, ActionDescriptor::run("Copy file", "cp", vec![Input(0), Input(1)])
                        .prompt("Source path", Path)
                        .prompt("Destination path", Path)
                        .reports("File copied.", "copying the file")),
                    (4, ActionDescriptor::run("Move file", "mv", vec![Input(0), Input(1)])
                        .prompt("Source path", Path)
                        .prompt("Destination path", Path)
                        .reports("File moved.", "moving the file")),
                    (5, ActionDescriptor::run("Delete file", "rm", vec![Input(0)])
                        .prompt("File path", Path)
                        .reports("File deleted.", "deleting the file")),
                ],
            )
            .group(
                5,
                "Scheduled tasks (cron)",
                vec![
                    (1, ActionDescriptor::run("List scheduled tasks", "crontab", lits(&["-l"]))
                        .streaming()
                        .reports("", "listing scheduled tasks")),
                    (2, ActionDescriptor::builtin("Add scheduled task", Operation::AddCronEntry)
                        .prompt("Schedule (5 fields, e.g. 0 2 * * *)", CronSchedule)
                        .prompt("Command", NonEmpty)
                        .reports("Scheduled task added.", "adding the scheduled task")),
                    (3, ActionDescriptor::builtin("Delete scheduled task", Operation::DeleteCronEntry)
                        .reports("Scheduled task deleted.", "deleting the scheduled task")),
                ],
            )
            .group(
                6,
                "Time and date",
                vec![
                    (1, ActionDescriptor::run("Show time and date settings", "timedatectl", lits(&["status"]))
                        .streaming()
                        .reports("", "reading time settings")),
                    (2, ActionDescriptor::run(
                        "Set timezone",
                        "timedatectl",
                        vec![Arg::Literal("set-timezone"), Input(0)],
                    )
                    .prompt("Timezone (e.g. Europe/Berlin)", Timezone)
                    .privileged()
                    .reports("Timezone set.", "setting the timezone")),
                    (3, ActionDescriptor::run("Enable NTP synchronisation", "timedatectl", lits(&["set-ntp", "true"]))
                        .privileged()
                        .reports("NTP enabled.", "enabling NTP")),
                    (4, ActionDescriptor::run("Disable NTP synchronisation", "timedatectl", lits(&["set-ntp", "false"]))
                        .privileged()
                        .reports("NTP disabled.", "disabling NTP")),
                ],
            )
            .group(
                7,
                "Packages",
                vec![
                    (1, ActionDescriptor::run(
                        "Install package (apt)",
                        "apt-get",
                        vec![Arg::Literal("install"), Arg::Literal("-y"), Input(0)],
                    )
                    .prompt("Package name", NonEmpty)
                    .privileged()
                    .reports("Package installed.", "installing the package")),
                    (2, ActionDescriptor::run(
                        "Remove package (apt)",
                        "apt-get",
                        vec![Arg::Literal("remove"), Arg::Literal("-y"), Input(0)],
                    )
                    .prompt("Package name", NonEmpty)
                    .privileged()
                    .reports("Package removed.", "removing the package")),
                    (3, ActionDescriptor::run("Install package (snap)", "snap", vec![Arg::Literal("install"), Input(0)])
                        .prompt("Package name", NonEmpty)
                        .privileged()
                        .reports("Package installed.", "installing the package")),
                    (4, ActionDescriptor::run("Remove package (snap)", "snap", vec![Arg::Literal("remove"), Input(0)])
                        .prompt("Package name", NonEmpty)
                        .privileged()
                        .reports("Package removed.", "removing the package")),
                    (5, ActionDescriptor::run(
                        "Install package (flatpak)",
                        "flatpak",
                        vec![
                            Arg::Literal("install"),
                            Arg::Literal("-y"),
                            Arg::Literal("flathub"),
                            Input(0),
                        ],
                    )
                    .prompt("Application ID", NonEmpty)
                    .reports("Package installed.", "installing the package")),
                    (6, ActionDescriptor::run(
                        "Remove package (flatpak)",
                        "flatpak",
                        vec![Arg::Literal("uninstall"), Arg::Literal("-y"), Input(0)],
                    )
                    .prompt("Application ID", NonEmpty)
                    .reports("Package removed.", "removing the package")),
                ],
            )
            .group(
                8,
                "Utilities",
                vec![(
                    1,
                    ActionDescriptor::builtin("Find maximum in integer list", Operation::FindMax)
                        .prompt("Integers (comma-separated, max 16)", IntegerList),
                )],
            )
    }
}
