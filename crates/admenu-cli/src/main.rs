mod cmd;
mod output;

use admenu_core::config::{Privilege, Settings, DEFAULT_PRIVILEGE_HELPER, DEFAULT_ZONEINFO_DIR};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "admenu",
    about = "Menu-driven system administration: processes, sockets, network, files, cron, time, packages",
    version
)]
struct Cli {
    /// Run privileged actions without a helper (e.g. when already root)
    #[arg(long, env = "ADMENU_NO_SUDO")]
    no_sudo: bool,

    /// Program used to elevate privileged actions
    #[arg(long = "sudo", value_name = "PROGRAM", env = "ADMENU_SUDO", default_value = DEFAULT_PRIVILEGE_HELPER)]
    sudo: String,

    /// Timezone database directory used to check timezone names
    #[arg(long, value_name = "DIR", env = "ADMENU_ZONEINFO", default_value = DEFAULT_ZONEINFO_DIR)]
    zoneinfo: PathBuf,

    /// Print the action catalog and exit
    #[arg(long)]
    list: bool,
}

impl Cli {
    fn settings(&self) -> Settings {
        let privilege = if self.no_sudo {
            Privilege::Direct
        } else {
            Privilege::Helper(self.sudo.clone())
        };
        Settings::default()
            .with_privilege(privilege)
            .with_zoneinfo_dir(&self.zoneinfo)
    }
}

fn main() {
    let cli = Cli::parse();

    // stdout belongs to the menu; diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = if cli.list {
        cmd::list::run()
    } else {
        cmd::menu::run(cli.settings())
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
