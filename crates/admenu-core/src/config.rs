use std::path::{Path, PathBuf};

pub const DEFAULT_PRIVILEGE_HELPER: &str = "sudo";
pub const DEFAULT_ZONEINFO_DIR: &str = "/usr/share/zoneinfo";
pub const DEFAULT_CRONTAB_PROGRAM: &str = "crontab";

// ---------------------------------------------------------------------------
// Privilege
// ---------------------------------------------------------------------------

/// How actions flagged `requires_privilege` are launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Privilege {
    /// Prefix the command with a helper such as `sudo`.
    Helper(String),
    /// Run the command as-is (already root, or elevation handled elsewhere).
    Direct,
}

impl Default for Privilege {
    fn default() -> Self {
        Privilege::Helper(DEFAULT_PRIVILEGE_HELPER.to_string())
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub privilege: Privilege,
    pub zoneinfo_dir: PathBuf,
    pub crontab_program: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            privilege: Privilege::default(),
            zoneinfo_dir: PathBuf::from(DEFAULT_ZONEINFO_DIR),
            crontab_program: DEFAULT_CRONTAB_PROGRAM.to_string(),
        }
    }
}

impl Settings {
    pub fn with_privilege(mut self, privilege: Privilege) -> Self {
        self.privilege = privilege;
        self
    }

    pub fn with_zoneinfo_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.zoneinfo_dir = dir.into();
        self
    }

    pub fn with_crontab_program(mut self, program: impl Into<String>) -> Self {
        self.crontab_program = program.into();
        self
    }

    pub fn zoneinfo_dir(&self) -> &Path {
        &self.zoneinfo_dir
    }
}
