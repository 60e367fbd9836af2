//! Delegation of system effects to external programs.
//!
//! Every action ends in a single call to an OS utility (`ps`, `ss`, `kill`,
//! `crontab`, `timedatectl`, a package manager, ...). The runner launches it,
//! waits for it, and hands back an [`ExecutionResult`]. A nonzero exit code is
//! a normal result, never an error; callers decide how to phrase it.
//!
//! # Output modes
//! - [`OutputMode::Stream`]: stdout/stderr are inherited so listing output
//!   appears as the tool writes it. The result carries only the exit code.
//! - [`OutputMode::Capture`]: stdout/stderr are buffered into the result.

use std::process::{Command, Stdio};

use crate::config::Privilege;

/// Exit code reported when the program could not be launched at all,
/// matching what a POSIX shell reports for an unknown command.
pub const EXIT_NOT_FOUND: i32 = 127;

// ---------------------------------------------------------------------------
// ExecutionResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn with_stdout(exit_code: i32, stdout: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    fn not_launched(program: &str, reason: impl std::fmt::Display) -> Self {
        Self {
            exit_code: EXIT_NOT_FOUND,
            stdout: String::new(),
            stderr: format!("{program}: {reason}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Stream,
    Capture,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub privileged: bool,
    pub mode: OutputMode,
}

impl Invocation {
    pub fn new<S: AsRef<str>>(program: &str, args: &[S]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.as_ref().to_string()).collect(),
            privileged: false,
            mode: OutputMode::Capture,
        }
    }

    pub fn privileged(mut self, privileged: bool) -> Self {
        self.privileged = privileged;
        self
    }

    pub fn mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    /// The command line as it would be typed, for logs and tests.
    pub fn display(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.as_str());
        parts.extend(self.args.iter().map(|a| a.as_str()));
        parts.join(" ")
    }
}

// ---------------------------------------------------------------------------
// CommandRunner
// ---------------------------------------------------------------------------

pub trait CommandRunner {
    fn execute(&mut self, invocation: &Invocation) -> ExecutionResult;

    fn run(&mut self, program: &str, args: &[&str]) -> ExecutionResult {
        self.execute(&Invocation::new(program, args))
    }

    fn run_privileged(&mut self, program: &str, args: &[&str]) -> ExecutionResult {
        self.execute(&Invocation::new(program, args).privileged(true))
    }
}

/// Runs invocations as real child processes.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    privilege: Privilege,
}

impl SystemRunner {
    pub fn new(privilege: Privilege) -> Self {
        Self { privilege }
    }

    /// Program and argument list after applying the privilege helper.
    pub fn command_line(&self, invocation: &Invocation) -> (String, Vec<String>) {
        match (&self.privilege, invocation.privileged) {
            (Privilege::Helper(helper), true) => {
                let mut args = Vec::with_capacity(invocation.args.len() + 1);
                args.push(invocation.program.clone());
                args.extend(invocation.args.iter().cloned());
                (helper.clone(), args)
            }
            _ => (invocation.program.clone(), invocation.args.clone()),
        }
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new(Privilege::default())
    }
}

impl CommandRunner for SystemRunner {
    fn execute(&mut self, invocation: &Invocation) -> ExecutionResult {
        let (program, args) = self.command_line(invocation);

        if which::which(&program).is_err() {
            tracing::warn!(program = %program, "program not found on PATH");
            return ExecutionResult::not_launched(&program, "command not found");
        }

        let mut cmd = Command::new(&program);
        cmd.args(&args);

        // Tools may still prompt on the terminal (sudo asks for a password).
        cmd.stdin(Stdio::inherit());
        match invocation.mode {
            OutputMode::Stream => {
                cmd.stdout(Stdio::inherit());
                cmd.stderr(Stdio::inherit());
            }
            OutputMode::Capture => {
                cmd.stdout(Stdio::piped());
                cmd.stderr(Stdio::piped());
            }
        }

        tracing::debug!(command = %invocation.display(), privileged = invocation.privileged, "spawning");

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(program = %program, error = %e, "spawn failed");
                return ExecutionResult::not_launched(&program, e);
            }
        };

        let output = match child.wait_with_output() {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(program = %program, error = %e, "wait failed");
                return ExecutionResult::not_launched(&program, e);
            }
        };

        // No code when terminated by a signal.
        let exit_code = output.status.code().unwrap_or(-1);
        tracing::debug!(command = %invocation.display(), exit_code, "finished");

        ExecutionResult {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// ScriptedRunner (tests)
// ---------------------------------------------------------------------------

/// Records every invocation and answers from a queue of canned results.
/// Unscripted calls succeed with empty output. When a call's only argument
/// names an existing file, its contents are kept in `files`.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct ScriptedRunner {
    pub calls: Vec<Invocation>,
    pub files: Vec<String>,
    responses: std::collections::VecDeque<(String, ExecutionResult)>,
}

#[cfg(test)]
impl ScriptedRunner {
    /// Answer the next invocation of `program` with `result`.
    pub fn respond(mut self, program: &str, result: ExecutionResult) -> Self {
        self.responses.push_back((program.to_string(), result));
        self
    }

    pub fn programs(&self) -> Vec<&str> {
        self.calls.iter().map(|c| c.program.as_str()).collect()
    }
}

#[cfg(test)]
impl CommandRunner for ScriptedRunner {
    fn execute(&mut self, invocation: &Invocation) -> ExecutionResult {
        self.calls.push(invocation.clone());
        if let [arg] = invocation.args.as_slice() {
            if let Ok(text) = std::fs::read_to_string(arg) {
                self.files.push(text);
            }
        }
        let pos = self
            .responses
            .iter()
            .position(|(program, _)| *program == invocation.program);
        match pos.and_then(|i| self.responses.remove(i)) {
            Some((_, result)) => result,
            None => ExecutionResult::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helper_prefixes_privileged_invocations() {
        let runner = SystemRunner::new(Privilege::Helper("sudo".into()));
        let inv = Invocation::new("renice", &["-n", "5", "-p", "42"]).privileged(true);
        let (program, args) = runner.command_line(&inv);
        assert_eq!(program, "sudo");
        assert_eq!(args, vec!["renice", "-n", "5", "-p", "42"]);
    }

    #[test]
    fn unprivileged_invocations_are_untouched() {
        let runner = SystemRunner::new(Privilege::Helper("sudo".into()));
        let inv = Invocation::new("ps", &["aux"]);
        let (program, args) = runner.command_line(&inv);
        assert_eq!(program, "ps");
        assert_eq!(args, vec!["aux"]);
    }

    #[test]
    fn direct_privilege_skips_helper() {
        let runner = SystemRunner::new(Privilege::Direct);
        let inv = Invocation::new("timedatectl", &["set-ntp", "true"]).privileged(true);
        assert_eq!(runner.command_line(&inv).0, "timedatectl");
    }

    #[test]
    fn missing_program_is_a_result_not_an_error() {
        let mut runner = SystemRunner::new(Privilege::Direct);
        let result = runner.run("admenu-no-such-program-xyz", &[]);
        assert_eq!(result.exit_code, EXIT_NOT_FOUND);
        assert!(result.stderr.contains("command not found"));
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_captured() {
        let mut runner = SystemRunner::new(Privilege::Direct);
        let result = runner.run("sh", &["-c", "echo out; echo err >&2; exit 3"]);
        assert_eq!(result.exit_code, 3);
        assert_eq!(result.stdout.trim(), "out");
        assert_eq!(result.stderr.trim(), "err");
        assert!(!result.success());
    }

    #[test]
    fn display_joins_program_and_args() {
        let inv = Invocation::new("ss", &["-tuan", "sport", "=", ":22"]);
        assert_eq!(inv.display(), "ss -tuan sport = :22");
    }

    #[test]
    fn scripted_runner_answers_in_order() {
        let mut runner = ScriptedRunner::default()
            .respond("kill", ExecutionResult::with_stdout(1, ""))
            .respond("kill", ExecutionResult::with_stdout(0, "ok"));
        assert_eq!(runner.run("kill", &["-0", "1"]).exit_code, 1);
        assert_eq!(runner.run("kill", &["1"]).stdout, "ok");
        assert!(runner.run("ps", &["aux"]).success());
        assert_eq!(runner.programs(), vec!["kill", "kill", "ps"]);
    }

    #[test]
    fn run_privileged_flags_the_invocation() {
        let mut runner = ScriptedRunner::default();
        runner.run_privileged("timedatectl", &["set-ntp", "true"]);
        runner.run("ps", &["aux"]);
        assert!(runner.calls[0].privileged);
        assert!(!runner.calls[1].privileged);
        assert_eq!(runner.calls[0].mode, OutputMode::Capture);
    }
}
