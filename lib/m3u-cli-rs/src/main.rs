mod commands;
mod config;
mod logger;

use self::config::Config;
use anyhow::Context;
use std::path::PathBuf;

const USER_AGENT_VALUE: &str = concat!("m3u-cli/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, argh::FromArgs)]
#[argh(description = "a cli to inspect and download hls streams")]
struct Options {
    #[argh(
        option,
        description = "the path to a config file. Defaults to \"m3u.toml\", if it exists."
    )]
    config: Option<PathBuf>,

    #[argh(subcommand)]
    subcommand: Subcommand,
}

#[derive(Debug, argh::FromArgs)]
#[argh(subcommand)]
enum Subcommand {
    Info(self::commands::info::Options),
    Download(self::commands::download::Options),
}

fn main() -> anyhow::Result<()> {
    let options: Options = argh::from_env();
    let config = Config::load(options.config.as_deref()).context("failed to load config")?;
    crate::logger::init(&config).context("failed to init logger")?;

    let tokio_rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    tokio_rt.block_on(async_main(options, config))
}

async fn async_main(options: Options, config: Config) -> anyhow::Result<()> {
    let user_agent = config.user_agent.as_deref().unwrap_or(USER_AGENT_VALUE);
    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .build()
        .context("failed to build http client")?;
    let resolver = m3u::ContentResolver::new(client);

    match options.subcommand {
        Subcommand::Info(options) => {
            self::commands::info::exec(&resolver, options).await?;
        }
        Subcommand::Download(options) => {
            self::commands::download::exec(&resolver, &config, options).await?;
        }
    }

    Ok(())
}
