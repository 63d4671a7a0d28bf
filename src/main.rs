mod cli;
mod config;
mod logging;
mod paths;
mod plain;
mod refresh;
mod render;
mod report;
mod source;
mod timer;
mod tui;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use source::TimerSource;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The full-screen display owns the terminal, so its logs go to a file.
    let log_file = match &cli.command {
        Command::Display { plain: false, .. } => Some(paths::log_file()),
        _ => None,
    };
    logging::init_logging(cli.quiet, log_file.as_deref())?;

    match cli.command {
        Command::Display {
            feed,
            plain,
            no_refresh,
        } => {
            let source = TimerSource::new(cli.config, feed.feed);
            let (config, timer) = source.load_timer()?;
            tracing::info!(phases = timer.phases.len(), plain, "starting display");
            if plain {
                plain::run(&source, &config, timer, !no_refresh)
            } else {
                tui::display::run(&source, &config, timer, !no_refresh)
            }
        }

        Command::Show { feed, at, json } => {
            let at = report::resolve_instant(at.as_deref())?;
            let (_, timer) = TimerSource::new(cli.config, feed.feed).load_timer()?;
            report::show(&timer, &at, json)
        }

        Command::Phases { feed, json } => {
            let (_, timer) = TimerSource::new(cli.config, feed.feed).load_timer()?;
            report::phases(&timer, json)
        }

        Command::Check { feed } => {
            let warnings = report::check(&TimerSource::new(cli.config, feed.feed))?;
            if warnings > 0 {
                anyhow::bail!("{warnings} warning(s) in the timer configuration");
            }
            Ok(())
        }

        Command::Duration { seconds } => {
            println!("{}", timer::duration::duration(seconds));
            Ok(())
        }

        Command::Paths => {
            report::show_paths();
            Ok(())
        }
    }
}
