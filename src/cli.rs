use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "papi-timer")]
#[command(about = "Round countdown display for chess event rooms")]
pub struct Cli {
    /// Config file (defaults to the XDG config location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Only log errors
    #[arg(long, short, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Where phases come from when not built from `[[timer.hours]]`.
#[derive(Args)]
pub struct FeedArgs {
    /// JSON phase feed produced by the event server
    #[arg(long)]
    pub feed: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the countdown display
    Display {
        #[command(flatten)]
        feed: FeedArgs,

        /// Print slot changes as lines instead of drawing full-screen
        #[arg(long)]
        plain: bool,

        /// Do not poll the server for updates
        #[arg(long)]
        no_refresh: bool,
    },

    /// Show what the display shows at one instant
    Show {
        #[command(flatten)]
        feed: FeedArgs,

        /// Instant to resolve, YYYY-MM-DD hh:mm[:ss] (defaults to now)
        #[arg(long)]
        at: Option<String>,

        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },

    /// List phases with their boundaries
    Phases {
        #[command(flatten)]
        feed: FeedArgs,

        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },

    /// Validate the configuration and print remarks
    Check {
        #[command(flatten)]
        feed: FeedArgs,
    },

    /// Format a number of seconds the way the display does
    Duration {
        seconds: u64,
    },

    /// Show where config, data and log files are stored
    Paths,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_display_flags() {
        let cli = Cli::try_parse_from(["papi-timer", "display", "--plain", "--no-refresh", "--feed", "f.json"]).unwrap();
        match cli.command {
            Command::Display { feed, plain, no_refresh } => {
                assert!(plain && no_refresh);
                assert_eq!(feed.feed, Some(PathBuf::from("f.json")));
            }
            _ => panic!("expected display"),
        }
    }

    #[test]
    fn global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["papi-timer", "show", "--config", "c.toml", "--json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        assert!(matches!(cli.command, Command::Show { json: true, .. }));
    }

    #[test]
    fn duration_takes_seconds() {
        let cli = Cli::try_parse_from(["papi-timer", "duration", "3661"]).unwrap();
        assert!(matches!(cli.command, Command::Duration { seconds: 3661 }));
    }
}
