use std::io::{BufRead, Write};

use crate::dispatch::{Flow, MenuDispatcher};
use crate::error::Result;
use crate::runner::CommandRunner;

/// Repeats menu rounds until one of them ends the session.
///
/// Rejected input, invalid selectors and failed commands all come back as
/// [`Flow::Continue`]. Only the exit selector or end of input stop the loop.
/// I/O errors on the terminal itself propagate.
pub struct SessionLoop<R, W, C> {
    dispatcher: MenuDispatcher<R, W, C>,
}

impl<R: BufRead, W: Write, C: CommandRunner> SessionLoop<R, W, C> {
    pub fn new(dispatcher: MenuDispatcher<R, W, C>) -> Self {
        Self { dispatcher }
    }

    /// Returns the number of completed rounds, the exiting one excluded.
    pub fn run(&mut self) -> Result<usize> {
        let mut rounds = 0;
        while self.dispatcher.dispatch_once()? == Flow::Continue {
            rounds += 1;
        }
        tracing::debug!(rounds, "session ended");
        Ok(rounds)
    }

    pub fn into_dispatcher(self) -> MenuDispatcher<R, W, C> {
        self.dispatcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::registry::ActionRegistry;
    use crate::runner::{ExecutionResult, ScriptedRunner};
    use std::io::Cursor;

    fn session(input: &str, runner: ScriptedRunner) -> SessionLoop<Cursor<Vec<u8>>, Vec<u8>, ScriptedRunner> {
        SessionLoop::new(MenuDispatcher::new(
            ActionRegistry::standard(),
            Settings::default(),
            runner,
            Cursor::new(input.as_bytes().to_vec()),
            Vec::new(),
        ))
    }

    #[test]
    fn exits_immediately_on_exit_selector() {
        let mut s = session("0\n1.1\n", ScriptedRunner::default());
        assert_eq!(s.run().unwrap(), 0);
        assert!(s.into_dispatcher().runner().calls.is_empty());
    }

    #[test]
    fn errors_keep_the_session_alive() {
        let runner = ScriptedRunner::default()
            .respond("ps", ExecutionResult::with_stdout(1, ""))
            .respond("kill", ExecutionResult::with_stdout(1, ""));
        let mut s = session("bogus\n1.9\n1.1\n1.3\n77\n2.2\n99999\n0\n", runner);
        assert_eq!(s.run().unwrap(), 5);
        let (runner, out) = s.into_dispatcher().into_parts();
        assert_eq!(runner.programs(), vec!["ps", "kill"]);
        assert!(String::from_utf8(out).unwrap().contains("Exiting."));
    }

    #[test]
    fn end_of_input_stops_like_exit() {
        let mut s = session("1.1\n", ScriptedRunner::default());
        assert_eq!(s.run().unwrap(), 1);
    }
}
