// src/main.rs
mod app;
mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::Args;
use matchboard::config::Config;
use matchboard::data_fetcher::api::{OpenLigaClient, create_http_client_with_timeout};
use matchboard::error::AppError;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();
    commands::validate_args(&args)?;

    // Logging needs the configured log path, so load config before anything else
    let loaded = Config::load().await;
    let (log_file_path, _guard) = logging::setup_logging(&args, loaded.as_ref().ok()).await?;
    tracing::info!("Logs are being written to: {log_file_path}");

    // Configuration operations work even with an invalid config file
    if args.list_config {
        return commands::handle_list_config_command().await;
    }
    if args.new_api_domain.is_some() {
        return commands::handle_config_update_command(&args).await;
    }

    let mut config = loaded?;
    commands::apply_args_to_config(&args, &mut config);
    let client = create_http_client_with_timeout(config.http_timeout_seconds)?;

    if args.match_id.is_some() || args.table || args.teams {
        let openliga = OpenLigaClient::new(client, config.openliga_base(), config.cache_ttl());
        return match args.match_id {
            Some(match_id) => commands::handle_match_command(&args, &openliga, match_id).await,
            None if args.table => commands::handle_table_command(&args, &config, &openliga).await,
            None => commands::handle_teams_command(&args, &config, &openliga).await,
        };
    }

    if args.history {
        return commands::handle_history_command(&args, &config, &client).await;
    }

    if args.once {
        return commands::handle_once_command(&args, &config, &client).await;
    }

    app::run_live(&args, &config, client).await
}
