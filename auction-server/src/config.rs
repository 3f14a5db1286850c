use {
    anyhow::Result,
    clap::{
        crate_authors,
        crate_description,
        crate_name,
        crate_version,
        Args,
        Parser,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    std::{
        fs,
        time::Duration,
    },
};

mod server;

#[derive(Parser, Debug)]
#[command(name = crate_name!())]
#[command(author = crate_authors!())]
#[command(about = crate_description!())]
#[command(version = crate_version!())]
pub enum Options {
    /// Run the auction server service.
    Run(RunOptions),
}

#[derive(Args, Clone, Debug)]
pub struct RunOptions {
    /// Server Options
    #[command(flatten)]
    pub server: server::Options,

    #[command(flatten)]
    pub config: ConfigOptions,

    /// Operator token for the administrative endpoints (creating and
    /// cancelling auctions, reading audit trails).
    #[arg(long = "admin-token")]
    #[arg(env = "ADMIN_TOKEN")]
    pub admin_token: Option<String>,
}

#[derive(Args, Clone, Debug)]
#[command(next_help_heading = "Config Options")]
#[group(id = "Config")]
pub struct ConfigOptions {
    /// Path to a configuration file containing the auction engine settings.
    #[arg(long = "config")]
    #[arg(env = "DRIVEBID_CONFIG")]
    #[arg(default_value = "config.yaml")]
    pub config: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub auction: AuctionConfig,
}

impl Config {
    pub fn load(path: &str) -> Result<Config> {
        let yaml_content = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&yaml_content)?;
        Ok(config)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuctionConfig {
    /// Window the seller has to approve a winning bid after the auction
    /// closes, as a humantime string (e.g. "7d").
    #[serde(default = "default_approval_window", with = "humantime_serde")]
    pub approval_window: Duration,

    /// Period of the lifecycle evaluation tick.
    #[serde(
        default = "default_lifecycle_tick_interval",
        with = "humantime_serde"
    )]
    pub lifecycle_tick_interval: Duration,

    /// Capacity of the update fan-out channel. Subscribers that lag behind
    /// it are disconnected.
    #[serde(default = "default_broadcast_channel_size")]
    pub broadcast_channel_size: usize,
}

fn default_approval_window() -> Duration {
    crate::kernel::deadline::DEFAULT_APPROVAL_WINDOW
}

fn default_lifecycle_tick_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_broadcast_channel_size() -> usize {
    1000
}
