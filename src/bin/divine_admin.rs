//! divine-admin - operator command line for the gods/songs catalog.
//!
//! Paths come from `--json-path`/`--assets-path`, then `DIVINE_JSON_PATH`/
//! `DIVINE_ASSETS_PATH`, then an optional `--config` TOML file, then
//! `./assets`. Results are printed as JSON on stdout; failures print the
//! error and exit with status 1.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, info};
use serde::Serialize;

use divine_catalog_core::app_response::AppResponse;
use divine_catalog_core::asset_manager::AssetSource;
use divine_catalog_core::catalog_config::{CatalogConfig, ConfigOverrides, ASSETS_PATH_ENV, JSON_PATH_ENV};
use divine_catalog_core::catalog_error::{CatalogError, Result};
use divine_catalog_core::catalog_model::Language;
use divine_catalog_core::catalog_state::{CatalogState, NewGod, NewSong};

#[derive(Parser, Debug)]
#[command(name = "divine-admin")]
#[command(about = "Curate the gods and songs catalog used by the Divine Blessing app")]
#[command(version)]
struct Cli {
    /// Catalog JSON document
    #[arg(long, global = true, env = JSON_PATH_ENV, value_name = "FILE")]
    json_path: Option<String>,

    /// Root of the images/, audio/ and lyrics/ directories
    #[arg(long, global = true, env = ASSETS_PATH_ENV, value_name = "DIR")]
    assets_path: Option<String>,

    /// TOML file providing json_path and assets_path
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the catalog document with an empty god list if it is missing
    Init,
    /// Check that the configured document and assets directory are usable
    Check,
    /// Print the whole catalog
    Show,
    /// Add a god; its id and "Lord" name are generated
    AddGod {
        name: String,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        display_order: i64,
        /// Image to copy into images/ (the original is kept)
        #[arg(long, value_name = "FILE")]
        image: Option<PathBuf>,
    },
    /// Add a song under an existing god
    AddSong {
        title: String,
        #[arg(long)]
        god_id: String,
        #[arg(long, default_value = "telugu")]
        language: String,
        #[arg(long, value_name = "FILE")]
        audio: Option<PathBuf>,
        #[arg(long, value_name = "FILE")]
        lyrics_telugu: Option<PathBuf>,
        #[arg(long, value_name = "FILE")]
        lyrics_english: Option<PathBuf>,
        /// Length in milliseconds
        #[arg(long, default_value = "0")]
        duration: u64,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        display_order: i64,
    },
    /// Delete a god with all of its songs and asset files
    DeleteGod { god_id: String },
    /// Delete a song and its asset files
    DeleteSong { song_id: String },
    /// Show the id and name a new god would get
    PreviewGod { name: String },
    /// Show the id a new song under the given god would get
    PreviewSong { god_id: String },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let response = AppResponse::from(e);
            error!("{response}");
            eprintln!("{response}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // clap already folded the environment variables into these values.
    let explicit = ConfigOverrides {
        json_path: cli.json_path,
        assets_path: cli.assets_path,
    };
    let config = CatalogConfig::load(explicit, cli.config.as_deref())?;
    info!(
        "Catalog document {}, assets {}",
        config.json_path.display(),
        config.assets_path.display()
    );

    let state = CatalogState::init(config);
    match cli.command {
        Command::Init => {
            if state.init_document()? {
                println!("Catalog created at {}", state.config().json_path.display());
            } else {
                println!("Catalog already exists at {}", state.config().json_path.display());
            }
            Ok(())
        }
        Command::Check => {
            state.config().validate()?;
            print_json(state.config())
        }
        Command::Show => print_json(&state.document()?),
        Command::AddGod { name, display_order, image } => {
            let god = state.add_god(NewGod {
                name,
                display_order,
                image: image.map(AssetSource::keep),
            })?;
            print_json(&god)
        }
        Command::AddSong {
            title,
            god_id,
            language,
            audio,
            lyrics_telugu,
            lyrics_english,
            duration,
            display_order,
        } => {
            let song = state.add_song(NewSong {
                title,
                god_id,
                language_default: language.parse::<Language>()?,
                audio: audio.map(AssetSource::keep),
                lyrics_telugu: lyrics_telugu.map(AssetSource::keep),
                lyrics_english: lyrics_english.map(AssetSource::keep),
                duration,
                display_order,
            })?;
            print_json(&song)
        }
        Command::DeleteGod { god_id } => {
            let god = state.delete_god(&god_id)?;
            println!("Deleted god {} and {} song(s)", god.id, god.songs.len());
            Ok(())
        }
        Command::DeleteSong { song_id } => {
            let song = state.delete_song(&song_id)?;
            println!("Deleted song {}", song.id);
            Ok(())
        }
        Command::PreviewGod { name } => print_json(&state.preview_god(&name)),
        Command::PreviewSong { god_id } => {
            println!("{}", state.preview_song_id(&god_id));
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CatalogError::MalformedDocument(e.to_string()))?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_negative_display_order() {
        let cli = Cli::try_parse_from([
            "divine-admin",
            "--json-path",
            "/srv/assets/gods_songs.json",
            "add-god",
            "Hanuman Ji",
            "--display-order",
            "-2",
        ])
        .unwrap();

        assert_eq!(cli.json_path.as_deref(), Some("/srv/assets/gods_songs.json"));
        match cli.command {
            Command::AddGod { name, display_order, image } => {
                assert_eq!(name, "Hanuman Ji");
                assert_eq!(display_order, -2);
                assert!(image.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
