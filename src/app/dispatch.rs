use crate::app::relay;
use crate::app::status::{render_online_checks, render_status};
use crate::cli::{Cli, Commands};
use crate::config::Config;
use anyhow::Result;

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            tracing::info!(config = %config.config_path.display(), "starting relay");
            relay::run(config).await
        }
        Commands::Check { online } => {
            println!("{}", render_status(&config));
            if online {
                println!();
                println!("{}", render_online_checks(&config).await);
            }
            Ok(())
        }
    }
}
