pub mod config;
pub mod cron;
pub mod dispatch;
pub mod error;
pub mod io;
pub mod maxscan;
pub mod paths;
pub mod registry;
pub mod runner;
pub mod session;
pub mod validate;

pub use error::{AdminError, Result};
