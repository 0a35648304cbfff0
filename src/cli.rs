// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::Parser;
use clap::Subcommand;

use crate::cmd::check::check_deck;
use crate::cmd::import::import_deck;
use crate::cmd::session::print_session;
use crate::cmd::settings::SettingsEdit;
use crate::cmd::settings::edit_settings;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_deck_stats;
use crate::collection::Collection;
use crate::drill::server::start_server;
use crate::error::Fallible;
use crate::settings::SessionMode;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the data directory. Defaults to the current directory.
    #[arg(long, global = true)]
    data_dir: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a deck and report what it contains, without importing it.
    Check {
        /// A deck file, a directory of `.deck` files, or a URL.
        source: String,
    },
    /// Replace the stored deck.
    Import {
        /// A deck file, a directory of `.deck` files, or a URL.
        source: String,
    },
    /// Sample a study session from the stored deck and print it.
    Session {
        /// Number of cards. Zero means all of them.
        #[arg(long)]
        size: Option<usize>,
        /// Sampling temperature.
        #[arg(long)]
        temperature: Option<f64>,
    },
    /// Print deck statistics.
    Stats {
        /// Output format.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
    /// Edit and print the study settings.
    Settings {
        #[arg(long)]
        temperature: Option<f64>,
        /// Session size. Zero means the whole deck.
        #[arg(long)]
        size: Option<usize>,
        #[arg(long)]
        speech_rate: Option<f64>,
        #[arg(long)]
        mode: Option<SessionMode>,
        /// Restore the defaults before applying any other edit.
        #[arg(long)]
        reset: bool,
    },
    /// Study in the browser.
    Drill {
        /// The port to use for the web server.
        #[arg(long, default_value_t = 8000)]
        port: u16,
        /// Don't open the browser automatically.
        #[arg(long)]
        no_open: bool,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Cli = Cli::parse();
    let directory = cli.data_dir;
    match cli.command {
        Command::Check { source } => check_deck(&source).await,
        Command::Import { source } => import_deck(directory, &source).await,
        Command::Session { size, temperature } => print_session(directory, size, temperature),
        Command::Stats { format } => print_deck_stats(directory, format),
        Command::Settings {
            temperature,
            size,
            speech_rate,
            mode,
            reset,
        } => {
            let edit = SettingsEdit {
                temperature,
                session_size: size,
                speech_rate,
                mode,
                reset,
            };
            edit_settings(directory, edit)
        }
        Command::Drill { port, no_open } => {
            let collection = Collection::open(directory)?;
            start_server(collection, port, !no_open).await
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_settings() {
        let cli = Cli::parse_from([
            "flashdeck",
            "--data-dir",
            "/tmp/decks",
            "settings",
            "--temperature",
            "0.5",
            "--mode",
            "streaming",
        ]);
        assert_eq!(cli.data_dir, Some("/tmp/decks".to_string()));
        match cli.command {
            Command::Settings {
                temperature, mode, ..
            } => {
                assert_eq!(temperature, Some(0.5));
                assert_eq!(mode, Some(SessionMode::Streaming));
            }
            _ => panic!("expected the settings command"),
        }
    }

    #[test]
    fn test_drill_defaults() {
        let cli = Cli::parse_from(["flashdeck", "drill"]);
        match cli.command {
            Command::Drill { port, no_open } => {
                assert_eq!(port, 8000);
                assert!(!no_open);
            }
            _ => panic!("expected the drill command"),
        }
    }
}
