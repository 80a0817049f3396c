//! asrc-export - RE Engine .asrc audio tool
//!
//! Converts Ogg/Vorbis files to .asrc.26 containers (encode) and extracts the
//! Ogg stream back out (decode).
//!
//! ```bash
//! # Looping bgm, audio source id 7
//! asrc-export encode --bgm --ls 100 7 title.ogg
//!
//! # Back to title.ogg
//! asrc-export decode title.asrc.26
//! ```

use anyhow::Result;
use clap::Parser;

use asrc_export::cli::{normalize_args, Cli, Commands};
use asrc_export::{convert, manifest};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    match &cli.command {
        Commands::Encode { .. } | Commands::Decode { .. } => {
            if let Some(conversion) = cli.command.conversion() {
                conversion.run()?;
                tracing::info!("Done!");
            }
        }

        Commands::Info { input } => {
            let header = convert::inspect_file(input)?;
            convert::log_header(input, &header);
        }

        Commands::Build { manifest, output } => {
            tracing::info!("Building sounds from {:?}", manifest);
            let config = manifest::load_manifest(manifest)?;
            let base_dir = manifest::base_dir(manifest);
            manifest::build_all(&config, &base_dir, output.as_deref())?;
            tracing::info!("Build complete!");
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(manifest)?;
            manifest::validate(&config, &manifest::base_dir(manifest))?;
            tracing::info!("Manifest is valid!");
        }
    }

    Ok(())
}
