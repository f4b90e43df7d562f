use crate::cli::Args;
use chrono::Local;
use matchboard::board::{FilterSet, RoundCursor};
use matchboard::config::{Config, parse_competition_list};
use matchboard::constants::window::MAX_DAYS;
use matchboard::data_fetcher::api::{OpenLigaClient, fetch_history, fetch_window};
use matchboard::data_fetcher::cache::FetchOptions;
use matchboard::display;
use matchboard::error::AppError;
use reqwest::Client;
use std::collections::HashMap;
use tracing::warn;

/// Validates command line argument combinations.
///
/// Returns an error if values are out of range or flags conflict.
pub fn validate_args(args: &Args) -> Result<(), AppError> {
    for (flag, days) in [("--days-back", args.days_back), ("--days-ahead", args.days_ahead)] {
        if let Some(days) = days
            && days > MAX_DAYS
        {
            return Err(AppError::validation(format!(
                "{flag} must be between 0 and {MAX_DAYS}, got {days}"
            )));
        }
    }
    if args.rounds == Some(0) {
        return Err(AppError::validation("--rounds must be at least 1"));
    }
    if args.table && args.teams {
        return Err(AppError::validation(
            "Cannot use both --table and --teams simultaneously",
        ));
    }
    Ok(())
}

/// Folds command line overrides that affect runtime settings into `config`.
pub fn apply_args_to_config(args: &Args, config: &mut Config) {
    if let Some(seconds) = args.refresh_seconds {
        config.refresh_seconds = seconds;
    }
    if let Some(rounds) = args.rounds {
        config.rounds_per_page = rounds;
    }
}

/// Filter set from the configured defaults with command line overrides.
pub fn filters_from_args(args: &Args, config: &Config) -> FilterSet {
    let mut filters = FilterSet::from_config(config);
    if let Some(raw) = &args.leagues {
        filters = filters.with_competitions(&parse_competition_list(raw), &config.default_competitions);
    }
    if args.season.is_some() {
        filters = filters.with_season(args.season);
    }
    filters.with_days(
        args.days_back.unwrap_or(filters.days_back),
        args.days_ahead.unwrap_or(filters.days_ahead),
    )
}

/// Handles the --list-config command.
pub async fn handle_list_config_command() -> Result<(), AppError> {
    Config::display().await
}

/// Handles the --config command: stores a new board API domain.
pub async fn handle_config_update_command(args: &Args) -> Result<(), AppError> {
    let mut config = Config::load().await.unwrap_or_else(|e| {
        warn!("Existing config could not be loaded ({e}), starting from defaults");
        Config::default()
    });

    if let Some(new_domain) = &args.new_api_domain {
        config.api_domain = new_domain.trim().to_string();
    }
    config.normalize_domains();
    config.validate()?;

    config.save().await?;
    println!("Config updated successfully!");
    Ok(())
}

/// Handles the --once command: fetches the window once and prints it.
///
/// A failed fetch is printed rather than returned, like the live board does.
pub async fn handle_once_command(args: &Args, config: &Config, client: &Client) -> Result<(), AppError> {
    let filters = filters_from_args(args, config);
    let query = filters.window_query()?;

    println!("{}", filters.competitions.join(", ").to_uppercase());
    match fetch_window(client, config.api_base(), &query).await {
        Ok(window) => {
            if let (Some(from), Some(to)) = (&window.date_from, &window.date_to) {
                println!("{}", display::format_date_range(from, to));
            }
            print!(
                "{}",
                display::format_sections(&window.live, &window.upcoming, &window.recent)
            );
        }
        Err(e) => println!("{}", display::format_fetch_error(&e)),
    }
    Ok(())
}

/// Handles the --history command: loads finished rounds and prints one page.
pub async fn handle_history_command(args: &Args, config: &Config, client: &Client) -> Result<(), AppError> {
    let filters = filters_from_args(args, config);
    let events = fetch_history(
        client,
        config.api_base(),
        &filters.competitions,
        filters.season,
        config.history_days_back,
    )
    .await?;

    let mut cursor = RoundCursor::new(events, config.rounds_per_page);
    for _ in 0..args.page {
        if !cursor.older() {
            break;
        }
    }
    if cursor.index() < args.page {
        warn!(
            "Requested history page {} but only {} pages exist",
            args.page,
            cursor.index() + 1
        );
    }

    println!(
        "{} history, {} rounds",
        filters.competitions.join(", ").to_uppercase(),
        cursor.total_rounds()
    );
    print!("{}", display::format_round_page(&cursor.page()));
    Ok(())
}

async fn print_cache_info(openliga: &OpenLigaClient) {
    for (name, info) in openliga.cache_info().await {
        println!(
            "cache {name}: entries={} in_flight={} hits={} misses={} fetches={} failures={}",
            info.entries,
            info.in_flight,
            info.stats.hits,
            info.stats.misses,
            info.stats.fetches,
            info.stats.failures
        );
    }
}

/// Handles the --match command.
pub async fn handle_match_command(
    args: &Args,
    openliga: &OpenLigaClient,
    match_id: i64,
) -> Result<(), AppError> {
    let detail = openliga
        .get_match_details(match_id, FetchOptions::default())
        .await?;
    print!("{}", display::format_match_detail(&detail));
    if args.debug {
        print_cache_info(openliga).await;
    }
    Ok(())
}

/// Handles the --table command for the first selected competition.
pub async fn handle_table_command(
    args: &Args,
    config: &Config,
    openliga: &OpenLigaClient,
) -> Result<(), AppError> {
    let filters = filters_from_args(args, config);
    let (league, season) = lookup_target(&filters)?;

    let (table, icons) = tokio::join!(
        openliga.get_league_table(&league, season, FetchOptions::default()),
        openliga.team_icon_index(&league, season, FetchOptions::default())
    );
    let table = table?;
    let icons = icons.unwrap_or_else(|e| {
        warn!("Team icons unavailable for {league} {season}: {e}");
        HashMap::new()
    });

    println!("{} {season}", league.to_uppercase());
    print!("{}", display::format_table(&table, &icons));
    if args.debug {
        print_cache_info(openliga).await;
    }
    Ok(())
}

/// Handles the --teams command for the first selected competition.
pub async fn handle_teams_command(
    args: &Args,
    config: &Config,
    openliga: &OpenLigaClient,
) -> Result<(), AppError> {
    let filters = filters_from_args(args, config);
    let (league, season) = lookup_target(&filters)?;

    let teams = openliga
        .get_available_teams(&league, season, FetchOptions::default())
        .await?;
    println!("{} {season}", league.to_uppercase());
    print!("{}", display::format_teams(&teams));
    if args.debug {
        print_cache_info(openliga).await;
    }
    Ok(())
}

/// League and season used by the OpenLigaDB lookups.
fn lookup_target(filters: &FilterSet) -> Result<(String, i32), AppError> {
    let league = filters
        .competitions
        .first()
        .cloned()
        .ok_or_else(|| AppError::validation("No competition selected"))?;
    Ok((league, filters.season_or_current(Local::now().date_naive())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_filters_from_args_overrides_config() {
        let config = Config {
            default_competitions: vec!["bl1".to_string()],
            default_season: Some(2024),
            ..Config::default()
        };
        let args = Args::parse_from([
            "matchboard",
            "--leagues",
            "BL2, bl3",
            "--days-back",
            "2",
        ]);
        let filters = filters_from_args(&args, &config);
        assert_eq!(filters.competitions, vec!["bl2", "bl3"]);
        assert_eq!(filters.season, Some(2024));
        assert_eq!(filters.days_back, 2);
        assert_eq!(filters.days_ahead, config.days_ahead);
    }

    #[test]
    fn test_blank_leagues_fall_back_to_config() {
        let config = Config::default();
        let args = Args::parse_from(["matchboard", "--leagues", " , "]);
        let filters = filters_from_args(&args, &config);
        assert_eq!(filters.competitions, config.default_competitions);
    }

    #[test]
    fn test_validate_args_ranges() {
        let args = Args::parse_from(["matchboard", "--days-ahead", "400"]);
        assert!(validate_args(&args).is_err());
        let args = Args::parse_from(["matchboard", "--rounds", "0"]);
        assert!(validate_args(&args).is_err());
        let args = Args::parse_from(["matchboard", "--table", "--teams"]);
        assert!(validate_args(&args).is_err());
        assert!(validate_args(&Args::default()).is_ok());
    }

    #[test]
    fn test_args_override_runtime_settings() {
        let mut config = Config::default();
        let args = Args::parse_from(["matchboard", "--refresh", "0", "--rounds", "5"]);
        apply_args_to_config(&args, &mut config);
        assert_eq!(config.refresh_seconds, 0);
        assert_eq!(config.rounds_per_page, 5);
    }
}
