//! Menu dispatcher.
//!
//! One pass through the menu is a walk over [`State`]:
//!
//! ```text
//! AwaitingSelector ──► ValidatingInputs ──► Executing ──► ReportingResult ──► AwaitingSelector
//!        │                    │                                 ▲
//!        │                    └── first rejected field ─────────┤
//!        ├── unresolved selector ───────────────────────────────┘
//!        └── exit selector / end of input ──► Exiting
//! ```
//!
//! Nothing runs until every prompt of the action has been answered and
//! accepted. Every executed command ends in `ReportingResult`, whatever its
//! exit code.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::Settings;
use crate::cron::{self, Crontab};
use crate::error::{AdminError, Result};
use crate::maxscan;
use crate::paths;
use crate::registry::{parse_choice, ActionDescriptor, ActionRegistry, Choice, Operation, Selector};
use crate::runner::{CommandRunner, ExecutionResult, Invocation};
use crate::validate::{self, Rejection, ValidatorKind};

// ---------------------------------------------------------------------------
// State / Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

#[derive(Debug)]
pub enum State {
    AwaitingSelector,
    ValidatingInputs(Selector),
    Executing {
        selector: Selector,
        inputs: Vec<String>,
    },
    ReportingResult(Outcome),
    Exiting,
}

#[derive(Debug)]
pub enum Outcome {
    /// The selector did not resolve to an action.
    Unresolved(AdminError),
    Rejected {
        label: String,
        rejection: Rejection,
    },
    Cancelled,
    Info(String),
    Lines(Vec<String>),
    /// The action stopped before running its command.
    Failed {
        action: ActionDescriptor,
        error: AdminError,
    },
    Finished {
        action: ActionDescriptor,
        result: ExecutionResult,
    },
}

// ---------------------------------------------------------------------------
// MenuDispatcher
// ---------------------------------------------------------------------------

pub struct MenuDispatcher<R, W, C> {
    registry: ActionRegistry,
    settings: Settings,
    cwd: PathBuf,
    runner: C,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write, C: CommandRunner> MenuDispatcher<R, W, C> {
    pub fn new(registry: ActionRegistry, settings: Settings, runner: C, input: R, output: W) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            registry,
            settings,
            cwd,
            runner,
            input,
            output,
        }
    }

    /// Directory that relative file paths resolve against.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn runner(&self) -> &C {
        &self.runner
    }

    pub fn into_parts(self) -> (C, W) {
        (self.runner, self.output)
    }

    /// Run one menu round: from `AwaitingSelector` back to it, or to `Exiting`.
    pub fn dispatch_once(&mut self) -> Result<Flow> {
        let mut state = self.step(State::AwaitingSelector)?;
        loop {
            state = match state {
                State::AwaitingSelector => return Ok(Flow::Continue),
                State::Exiting => return Ok(Flow::Exit),
                other => self.step(other)?,
            };
        }
    }

    /// Advance the state machine by one transition.
    pub fn step(&mut self, state: State) -> Result<State> {
        match state {
            State::AwaitingSelector => self.await_selector(),
            State::ValidatingInputs(selector) => self.validate_inputs(selector),
            State::Executing { selector, inputs } => {
                Ok(State::ReportingResult(self.execute(selector, &inputs)?))
            }
            State::ReportingResult(outcome) => {
                self.report(&outcome)?;
                Ok(State::AwaitingSelector)
            }
            State::Exiting => Ok(State::Exiting),
        }
    }

    // -----------------------------------------------------------------------
    // AwaitingSelector
    // -----------------------------------------------------------------------

    fn await_selector(&mut self) -> Result<State> {
        self.render_menu()?;
        let Some(line) = self.read_line("Enter your choice: ")? else {
            tracing::info!("end of input, leaving the menu");
            writeln!(self.output)?;
            return Ok(State::Exiting);
        };

        let selector = match parse_choice(&line) {
            Ok(Choice::Exit) => {
                writeln!(self.output, "Exiting.")?;
                return Ok(State::Exiting);
            }
            Ok(Choice::Action(selector)) => selector,
            Err(e) => return Ok(State::ReportingResult(Outcome::Unresolved(e))),
        };

        match self.registry.resolve(selector) {
            Ok(action) => {
                tracing::debug!(%selector, action = action.title, "selector resolved");
                Ok(State::ValidatingInputs(selector))
            }
            Err(e) => Ok(State::ReportingResult(Outcome::Unresolved(e))),
        }
    }

    fn render_menu(&mut self) -> Result<()> {
        let out = &mut self.output;
        writeln!(out, "===== System administration =====")?;
        for group in self.registry.groups() {
            writeln!(out, "{}. {}", group.number, group.title)?;
            for (item, action) in &group.actions {
                writeln!(out, "   {}.{}  {}", group.number, item, action.title)?;
            }
        }
        writeln!(out, "0. Exit")?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // ValidatingInputs
    // -----------------------------------------------------------------------

    fn validate_inputs(&mut self, selector: Selector) -> Result<State> {
        let prompts = self.registry.resolve(selector)?.prompts.clone();
        let mut inputs = Vec::with_capacity(prompts.len());

        for prompt in prompts {
            let Some(raw) = self.read_line(&format!("{}: ", prompt.label))? else {
                return Ok(State::Exiting);
            };
            match self.accept(prompt.kind, &raw) {
                Ok(value) => inputs.push(value),
                Err(rejection) => {
                    tracing::debug!(%selector, kind = %prompt.kind, reason = %rejection, "input rejected");
                    return Ok(State::ReportingResult(Outcome::Rejected {
                        label: prompt.label.to_string(),
                        rejection,
                    }));
                }
            }
        }

        Ok(State::Executing { selector, inputs })
    }

    /// Syntactic rule first, then the system checks some kinds need.
    fn accept(&mut self, kind: ValidatorKind, raw: &str) -> std::result::Result<String, Rejection> {
        let value = kind.check(raw)?;
        match kind {
            ValidatorKind::Pid => {
                // Zero-signal probe: delivers nothing, fails if the PID is gone.
                let probe = self.runner.run("kill", &["-0", value.as_str()]);
                if !probe.success() {
                    return Err(Rejection::new(format!(
                        "no running process with PID {value}"
                    )));
                }
                Ok(value)
            }
            ValidatorKind::Timezone => {
                if !self.settings.zoneinfo_dir().join(&value).is_file() {
                    return Err(Rejection::new(format!(
                        "unknown timezone '{value}': not in {}",
                        self.settings.zoneinfo_dir().display()
                    )));
                }
                Ok(value)
            }
            ValidatorKind::Path => paths::resolve_path(&self.cwd, &value)
                .map(|p| p.display().to_string())
                .map_err(|e| Rejection::new(format!("cannot prepare path '{value}': {e}"))),
            _ => Ok(value),
        }
    }

    // -----------------------------------------------------------------------
    // Executing
    // -----------------------------------------------------------------------

    fn execute(&mut self, selector: Selector, inputs: &[String]) -> Result<Outcome> {
        let action = self.registry.resolve(selector)?.clone();
        tracing::info!(%selector, action = action.title, "executing");

        match action.operation.clone() {
            Operation::Run(template) => {
                let args = template.render(inputs);
                let invocation = Invocation::new(template.program, &args)
                    .privileged(action.requires_privilege)
                    .mode(action.output);
                let result = self.runner.execute(&invocation);
                Ok(Outcome::Finished { action, result })
            }
            Operation::AddCronEntry => {
                let table = match cron::read_crontab(&mut self.runner, &self.settings) {
                    Ok(table) => table,
                    Err(error) => return Ok(Outcome::Failed { action, error }),
                };
                let updated = table.with_entry(&inputs[0], &inputs[1]);
                let result = cron::install_crontab(&mut self.runner, &self.settings, &updated)?;
                Ok(Outcome::Finished { action, result })
            }
            Operation::DeleteCronEntry => self.delete_cron_entry(action),
            Operation::FindMax => match maxscan::parse_values(&inputs[0]) {
                Ok(values) => Ok(Outcome::Lines(maxscan::report(&values))),
                Err(rejection) => Ok(Outcome::Rejected {
                    label: "Integers".to_string(),
                    rejection,
                }),
            },
        }
    }

    /// List, pick a line, rewrite the table without it.
    ///
    /// The line number refers to the listing taken here. The table is not
    /// re-read before the rewrite (see the hazard noted in [`crate::cron`]).
    fn delete_cron_entry(&mut self, action: ActionDescriptor) -> Result<Outcome> {
        let table = match cron::read_crontab(&mut self.runner, &self.settings) {
            Ok(table) => table,
            Err(error) => return Ok(Outcome::Failed { action, error }),
        };
        if table.is_empty() {
            return Ok(Outcome::Info("No scheduled tasks to delete.".to_string()));
        }

        self.print_crontab(&table)?;
        let Some(raw) = self.read_line("Line number to delete (0 to cancel): ")? else {
            return Ok(Outcome::Cancelled);
        };
        let line = match validate::line_selector(&raw, table.len()) {
            Ok(Some(line)) => line,
            Ok(None) => return Ok(Outcome::Cancelled),
            Err(rejection) => {
                return Ok(Outcome::Rejected {
                    label: "Line number".to_string(),
                    rejection,
                })
            }
        };

        let Some(updated) = table.without_line(line) else {
            return Ok(Outcome::Rejected {
                label: "Line number".to_string(),
                rejection: Rejection::new(format!("line {line} is out of range")),
            });
        };
        let result = cron::install_crontab(&mut self.runner, &self.settings, &updated)?;
        Ok(Outcome::Finished { action, result })
    }

    fn print_crontab(&mut self, table: &Crontab) -> Result<()> {
        writeln!(self.output, "Current scheduled tasks:")?;
        for entry in table.entries() {
            writeln!(self.output, "{:>4}  {}", entry.line_number, entry)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // ReportingResult
    // -----------------------------------------------------------------------

    fn report(&mut self, outcome: &Outcome) -> Result<()> {
        let out = &mut self.output;
        match outcome {
            Outcome::Unresolved(AdminError::InvalidSubChoice { selector, group }) => {
                writeln!(
                    out,
                    "Invalid sub-choice '{selector}': group {group} has no such item."
                )?;
            }
            Outcome::Unresolved(AdminError::InvalidChoice(input)) => {
                writeln!(
                    out,
                    "Invalid choice '{input}'. Enter <group>.<item> (e.g. 1.1) or 0 to exit."
                )?;
            }
            Outcome::Unresolved(other) => writeln!(out, "Invalid choice: {other}")?,
            Outcome::Rejected { label, rejection } => {
                writeln!(out, "Error ({label}): {rejection}")?;
            }
            Outcome::Cancelled => writeln!(out, "Cancelled. No changes made.")?,
            Outcome::Info(message) => writeln!(out, "{message}")?,
            Outcome::Lines(lines) => {
                for line in lines {
                    writeln!(out, "{line}")?;
                }
            }
            Outcome::Failed { action, error } => {
                writeln!(out, "Error {}: {error}. No changes made.", action.activity)?;
            }
            Outcome::Finished { action, result } => {
                if !result.stderr.is_empty() {
                    tracing::debug!(action = action.title, stderr = %result.stderr.trim(), "command stderr");
                }
                if !result.success() {
                    writeln!(
                        out,
                        "Error {} (exit code {}).",
                        action.activity, result.exit_code
                    )?;
                } else if !action.is_listing() && !action.success.is_empty() {
                    writeln!(out, "{}", action.success)?;
                }
            }
        }
        writeln!(out)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Terminal I/O
    // -----------------------------------------------------------------------

    /// Prompt and read one line. `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']);
        Ok(Some(trimmed.to_string()))
    }
}
