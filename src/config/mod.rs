pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "tester-match")]
#[command(about = "Ranks testers by their experience with the devices they own")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory holding devices.csv, testers.csv, bugs.csv and tester_device.csv
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Address the HTTP server listens on
    #[arg(long)]
    pub bind: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Serve GET /match-testers/ and GET /devices/ (default)
    Serve,
    /// Print the ranking once as JSON
    Rank {
        /// Country codes, repeated or comma separated
        #[arg(long)]
        countries: Vec<String>,
        /// Device ids, repeated or comma separated
        #[arg(long)]
        devices: Vec<String>,
    },
    /// Print all devices as JSON
    Devices,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 合併設定檔與命令列參數，命令列優先
    pub fn settings(&self) -> Result<TomlConfig> {
        let mut settings = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(dir) = &self.data_dir {
            settings.dataset.dir = dir.clone();
        }
        if let Some(bind) = &self.bind {
            settings.server.bind = bind.clone();
        }
        if self.json_logs {
            settings.logging.json = true;
        }
        Ok(settings)
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}
