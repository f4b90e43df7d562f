use crate::cli::Args;
use crate::commands::filters_from_args;
use matchboard::board::BoardController;
use matchboard::config::Config;
use matchboard::display::format_board;
use matchboard::error::AppError;
use reqwest::Client;
use std::io::{IsTerminal, Write, stdout};
use tracing::info;

fn render(controller: &BoardController, clear: bool) -> Result<(), AppError> {
    let mut out = stdout().lock();
    if clear {
        write!(out, "\x1b[2J\x1b[H")?;
    } else {
        writeln!(out)?;
    }
    write!(out, "{}", format_board(&controller.view()))?;
    out.flush()?;
    Ok(())
}

/// Run the live board.
///
/// - Applies the filters from config and command line
/// - Redraws whenever the board state changes
/// - Keeps refreshing in the background until Ctrl-C
pub async fn run_live(args: &Args, config: &Config, client: Client) -> Result<(), AppError> {
    let controller = BoardController::from_config(config, client);
    let mut changes = controller.subscribe();
    let clear = stdout().is_terminal() && !args.debug;

    controller.apply_filters(filters_from_args(args, config));
    render(&controller, clear)?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                render(&controller, clear)?;
            }
            result = &mut ctrl_c => {
                result?;
                info!("Ctrl-C received, stopping live board");
                break;
            }
        }
    }

    controller.shutdown();
    Ok(())
}
