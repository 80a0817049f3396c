//! Manifest parsing and batch encoding
//!
//! Parses asrc.toml and encodes every listed sound.
//!
//! ```toml
//! [output]
//! dir = "out/"
//!
//! [sounds.title]
//! path = "music/title.ogg"
//! id = 12
//! bgm = true
//! loop_start = 44100
//!
//! [sounds.click]
//! path = "sfx/click.ogg"
//! id = 3
//! ```

use anyhow::{bail, Context, Result};
use asrc_format::EncodeRequest;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::convert::encode_file;
use crate::paths::{default_output, Direction};

/// Root manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub output: OutputConfig,
    /// Sounds keyed by name; sorted so builds are deterministic
    #[serde(default)]
    pub sounds: BTreeMap<String, SoundEntry>,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("asrc/")
}

/// Single sound entry
#[derive(Debug, Deserialize)]
pub struct SoundEntry {
    /// Ogg/Vorbis source, relative to the manifest
    pub path: PathBuf,
    /// Engine audio source id
    pub id: u32,
    /// Background/streaming music
    #[serde(default)]
    pub bgm: bool,
    /// Loop start sample (no loop when absent)
    #[serde(default)]
    pub loop_start: Option<u32>,
}

impl SoundEntry {
    /// Container file name inside the output directory
    pub fn output_name(&self) -> PathBuf {
        let derived = default_output(&self.path, Direction::Encode);
        derived
            .file_name()
            .map(PathBuf::from)
            .unwrap_or(derived)
    }

    pub fn request(&self) -> EncodeRequest {
        EncodeRequest {
            is_bgm: self.bgm,
            audio_source_id: self.id,
            loop_start: self.loop_start,
        }
    }
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    parse_manifest(&content).with_context(|| format!("Failed to parse manifest: {:?}", path))
}

/// Parse manifest from string
pub fn parse_manifest(content: &str) -> Result<Manifest> {
    Ok(toml::from_str(content)?)
}

/// Directory that relative manifest paths resolve against
pub fn base_dir(manifest_path: &Path) -> PathBuf {
    manifest_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

/// Validate a manifest without building
pub fn validate(manifest: &Manifest, base_dir: &Path) -> Result<()> {
    let mut ids: HashMap<u32, &str> = HashMap::new();
    // All outputs share one directory, so equal file names overwrite each other
    let mut outputs: HashMap<PathBuf, &str> = HashMap::new();

    for (name, entry) in &manifest.sounds {
        let source = base_dir.join(&entry.path);
        if !source.exists() {
            bail!("Sound '{}' source not found: {:?}", name, source);
        }
        if let Some(other) = ids.insert(entry.id, name) {
            bail!(
                "Sounds '{}' and '{}' share audio source id {}",
                other,
                name,
                entry.id
            );
        }
        let output = entry.output_name();
        if let Some(other) = outputs.get(&output) {
            bail!("Sounds '{}' and '{}' both write {:?}", other, name, output);
        }
        outputs.insert(output, name);
    }

    tracing::debug!("{} sounds validated", manifest.sounds.len());
    Ok(())
}

/// Encode every sound in the manifest
///
/// # Returns
/// Paths of the written containers, in name order
pub fn build_all(
    manifest: &Manifest,
    base_dir: &Path,
    output_override: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    validate(manifest, base_dir)?;

    let out_dir = match output_override {
        Some(dir) => dir.to_path_buf(),
        None => base_dir.join(&manifest.output.dir),
    };
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", out_dir))?;

    let mut written = Vec::with_capacity(manifest.sounds.len());
    for (name, entry) in &manifest.sounds {
        let source = base_dir.join(&entry.path);
        let output = out_dir.join(entry.output_name());

        tracing::info!("Encoding '{}': {:?} -> {:?}", name, source, output);
        encode_file(&source, &output, &entry.request())
            .with_context(|| format!("Failed to encode sound '{}'", name))?;
        written.push(output);
    }

    tracing::info!("Encoded {} sounds into {:?}", written.len(), out_dir);
    Ok(written)
}
