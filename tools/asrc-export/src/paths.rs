//! Output path derivation
//!
//! `music/title.ogg` encodes to `music/title.asrc.26`, and
//! `music/title.asrc.26` decodes back to `music/title.ogg`. Every suffix is
//! stripped, not just the last one.

use asrc_format::{ASRC_EXT, OGG_EXT};
use std::path::{Path, PathBuf};

/// Conversion direction, selects the output extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encode,
    Decode,
}

impl Direction {
    pub fn extension(self) -> &'static str {
        match self {
            Direction::Encode => ASRC_EXT,
            Direction::Decode => OGG_EXT,
        }
    }
}

/// File name with all suffixes removed.
///
/// Leading dots belong to the stem (`.hidden.ogg` -> `.hidden`) and a name
/// ending in a dot has no suffixes at all.
pub fn strip_suffixes(file_name: &str) -> &str {
    if file_name.ends_with('.') {
        return file_name;
    }
    let leading = file_name.len() - file_name.trim_start_matches('.').len();
    match file_name[leading..].find('.') {
        Some(idx) => &file_name[..leading + idx],
        None => file_name,
    }
}

/// Default output path next to `input`
pub fn default_output(input: &Path, direction: Direction) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = strip_suffixes(&name);
    input.with_file_name(format!("{}.{}", stem, direction.extension()))
}
