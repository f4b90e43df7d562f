use clap::Parser;
use clap::builder::styling::{AnsiColor, Effects, Styles};

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Red.on_default())
}

/// Determines if the application should run in non-interactive mode.
/// Everything except the live board prints once and exits:
/// - --once
/// - --history, --match, --table, --teams lookups
/// - config operations
pub fn is_noninteractive_mode(args: &Args) -> bool {
    args.once
        || args.history
        || args.match_id.is_some()
        || args.table
        || args.teams
        || args.new_api_domain.is_some()
        || args.list_config
}

/// Football match board
///
/// Shows live, upcoming and recent matches for one or more competitions and
/// keeps them fresh in the background.
///
/// Without flags the live board runs until Ctrl-C, printing the board
/// whenever it changes. Use --once for a single snapshot, --history to page
/// through finished rounds, or --match/--table/--teams for OpenLigaDB lookups.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
#[command(styles = get_styles())]
pub struct Args {
    /// Print the board once and exit.
    #[arg(short, long)]
    pub once: bool,

    /// Comma-separated competition codes, e.g. "bl1,bl2".
    /// Defaults to the configured competitions.
    #[arg(long, short = 'L', help_heading = "Filters", value_name = "CODES")]
    pub leagues: Option<String>,

    /// Season (starting year, e.g. 2024). Defaults to the configured season.
    #[arg(long, short = 's', help_heading = "Filters")]
    pub season: Option<i32>,

    /// Days into the past covered by the board (0-365).
    #[arg(long = "days-back", help_heading = "Filters")]
    pub days_back: Option<u32>,

    /// Days into the future covered by the board (0-365).
    #[arg(long = "days-ahead", help_heading = "Filters")]
    pub days_ahead: Option<u32>,

    /// Background refresh interval in seconds (0 disables, max 3600).
    #[arg(long = "refresh", help_heading = "Filters", value_name = "SECONDS")]
    pub refresh_seconds: Option<u64>,

    /// Print finished matches grouped by round and exit.
    #[arg(long, help_heading = "History")]
    pub history: bool,

    /// Rounds per history page.
    #[arg(long, help_heading = "History", value_name = "N")]
    pub rounds: Option<usize>,

    /// History page to print, 0 being the most recent rounds.
    #[arg(long, help_heading = "History", default_value_t = 0)]
    pub page: usize,

    /// Show details for one match by its OpenLigaDB id.
    #[arg(long = "match", help_heading = "Lookups", value_name = "ID")]
    pub match_id: Option<i64>,

    /// Show the league table for the first competition and the season.
    #[arg(long, help_heading = "Lookups")]
    pub table: bool,

    /// Show the teams of the first competition and the season.
    #[arg(long, help_heading = "Lookups")]
    pub teams: bool,

    /// Update the board API domain in the config file.
    #[arg(long = "config", help_heading = "Configuration", value_name = "API_DOMAIN")]
    pub new_api_domain: Option<String>,

    /// List current configuration settings.
    #[arg(long = "list-config", short = 'l', help_heading = "Configuration")]
    pub list_config: bool,

    /// Also log to stdout and print cache statistics after lookups.
    #[arg(long = "debug", help_heading = "Debug")]
    pub debug: bool,

    /// Specify a custom log file path. If not provided, logs will be written to the default location.
    #[arg(long = "log-file", help_heading = "Debug")]
    pub log_file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_mode_is_default() {
        let args = Args::parse_from(["matchboard"]);
        assert!(!is_noninteractive_mode(&args));
        assert_eq!(args.page, 0);
    }

    #[test]
    fn test_lookup_flags_are_noninteractive() {
        let args = Args::parse_from(["matchboard", "--match", "66001"]);
        assert_eq!(args.match_id, Some(66001));
        assert!(is_noninteractive_mode(&args));

        let args = Args::parse_from(["matchboard", "--history", "--rounds", "2", "--page", "1"]);
        assert!(is_noninteractive_mode(&args));
        assert_eq!(args.rounds, Some(2));
    }

    #[test]
    fn test_filter_flags() {
        let args = Args::parse_from([
            "matchboard",
            "-o",
            "--leagues",
            "bl1,bl2",
            "--season",
            "2023",
            "--days-back",
            "3",
            "--days-ahead",
            "10",
        ]);
        assert!(args.once);
        assert_eq!(args.leagues.as_deref(), Some("bl1,bl2"));
        assert_eq!(args.season, Some(2023));
        assert_eq!((args.days_back, args.days_ahead), (Some(3), Some(10)));
    }
}
