use admenu_core::config::Settings;
use admenu_core::dispatch::MenuDispatcher;
use admenu_core::registry::ActionRegistry;
use admenu_core::runner::SystemRunner;
use admenu_core::session::SessionLoop;
use anyhow::Context;

/// Run the interactive menu on the process's own terminal until the user
/// exits or input ends.
pub fn run(settings: Settings) -> anyhow::Result<()> {
    let runner = SystemRunner::new(settings.privilege.clone());
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();

    tracing::debug!(privilege = ?settings.privilege, zoneinfo = %settings.zoneinfo_dir().display(), "starting menu");

    let dispatcher = MenuDispatcher::new(
        ActionRegistry::standard(),
        settings,
        runner,
        stdin.lock(),
        stdout.lock(),
    );
    SessionLoop::new(dispatcher)
        .run()
        .context("terminal I/O failed")?;
    Ok(())
}
