use crate::config::toml_config::TomlConfig;
use crate::config::AppConfig;
use crate::utils::error::Result;
use clap::{Args, Parser};

/// Options shared by every binary: where configuration comes from and how to log.
#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "GEO_SHOPPER_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl ConfigArgs {
    /// defaults → TOML file → environment → flags
    pub fn load(&self) -> Result<AppConfig> {
        let mut config = AppConfig::default();

        if let Some(path) = &self.config {
            TomlConfig::from_file(path)?.apply_to(&mut config);
        }
        config.apply_env(|name| std::env::var(name).ok())?;

        if self.log_json {
            config.log_json = true;
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "geo-shopper")]
#[command(about = "Multi-market shopping search service with spreadsheet export")]
pub struct ServeArgs {
    #[command(flatten)]
    pub common: ConfigArgs,

    /// Address to bind (overrides HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    pub fn load_config(&self) -> Result<AppConfig> {
        let mut config = self.common.load()?;
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        Ok(config)
    }
}
