//! Command-line definitions

use asrc_format::{EncodeRequest, ASRC_VERSION};
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::convert::{Conversion, DecodeJob, EncodeJob};

/// Encode and decode RE Engine .asrc audio files (srcd).
/// Only supports version 26 (Ghost Trick's Nintendo Switch port).
#[derive(Parser)]
#[command(name = "asrc-export")]
#[command(about = format!(
    "Encode and decode RE Engine .asrc audio files (srcd, version {})",
    ASRC_VERSION
))]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Wrap an Ogg/Vorbis file in an .asrc.26 container
    #[command(alias = "e")]
    Encode {
        /// Audio source id
        id: u32,

        /// Input .ogg file
        input: PathBuf,

        /// Output file (default: <input stem>.asrc.26)
        output: Option<PathBuf>,

        /// Mark audio as bgm/streaming
        #[arg(long)]
        bgm: bool,

        /// Loop start position/sample
        #[arg(long, value_name = "POS")]
        ls: Option<u32>,
    },

    /// Extract the Ogg/Vorbis payload of an .asrc container
    #[command(alias = "d")]
    Decode {
        /// Input .asrc file
        input: PathBuf,

        /// Output file (default: <input stem>.ogg)
        output: Option<PathBuf>,
    },

    /// Print the header fields of an .asrc container
    Info {
        /// Input .asrc file
        input: PathBuf,
    },

    /// Encode every sound listed in a manifest
    Build {
        /// Path to asrc.toml manifest
        #[arg(default_value = "asrc.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate manifest without building
    Check {
        /// Path to asrc.toml manifest
        #[arg(default_value = "asrc.toml")]
        manifest: PathBuf,
    },
}

impl Commands {
    /// The single-file conversion this command describes, if any
    pub fn conversion(&self) -> Option<Conversion> {
        match self {
            Commands::Encode {
                id,
                input,
                output,
                bgm,
                ls,
            } => Some(Conversion::Encode(EncodeJob {
                input: input.clone(),
                output: output.clone(),
                request: EncodeRequest {
                    is_bgm: *bgm,
                    audio_source_id: *id,
                    loop_start: *ls,
                },
            })),
            Commands::Decode { input, output } => Some(Conversion::Decode(DecodeJob {
                input: input.clone(),
                output: output.clone(),
            })),
            _ => None,
        }
    }
}

/// Accept the single-dash `-bgm` and `-ls` spellings of the original tool
///
/// Only arguments between the subcommand and its first positional are
/// rewritten, so file names such as `-bgm` stay intact after it or after `--`.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter();
    let mut normalized: Vec<OsString> = args.by_ref().take(1).collect();

    let mut seen_subcommand = false;
    let mut takes_value = false;
    let mut in_flags = true;

    for arg in args {
        if !in_flags {
            normalized.push(arg);
            continue;
        }

        let arg = match arg.to_str() {
            _ if takes_value => {
                takes_value = false;
                arg
            }
            Some("--") => {
                in_flags = false;
                arg
            }
            Some("-bgm") => OsString::from("--bgm"),
            Some("-ls") | Some("--ls") => {
                takes_value = true;
                OsString::from("--ls")
            }
            Some(s) if s.starts_with("-ls=") => OsString::from(format!("-{}", s)),
            Some(s) if s.starts_with('-') => arg,
            _ if !seen_subcommand => {
                seen_subcommand = true;
                arg
            }
            _ => {
                in_flags = false;
                arg
            }
        };
        normalized.push(arg);
    }

    normalized
}
