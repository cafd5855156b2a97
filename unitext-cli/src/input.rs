//! Input handling for the CLI: reading documents, choosing the format tag,
//! building the transport payload and locating the config file.

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io::Read;
use std::path::{Path, PathBuf};
use unitext_core::{ExtractionConfig, FileFormat};

/// Path that stands for standard input.
pub const STDIN_PATH: &str = "-";

/// Read the whole input, from a file or from stdin.
pub fn read_input(path: &str) -> Result<Vec<u8>> {
    if path == STDIN_PATH {
        let mut buffer = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buffer)
            .context("failed to read stdin")?;
        return Ok(buffer);
    }
    std::fs::read(path).with_context(|| format!("failed to read {path}"))
}

/// Format tag to send: the explicit one if given, otherwise inferred from
/// the input's extension. Explicit tags are passed through unvalidated so the
/// pipeline reports unsupported ones.
pub fn resolve_file_type(explicit: Option<&str>, input: &str) -> Result<String> {
    if let Some(tag) = explicit {
        return Ok(tag.to_string());
    }
    if input == STDIN_PATH {
        bail!("--file-type is required when reading from stdin");
    }
    match FileFormat::from_path(Path::new(input)) {
        Some(format) => Ok(format.to_string()),
        None => bail!(
            "cannot infer the file type of {input}; pass --file-type ({})",
            FileFormat::list_formats()
        ),
    }
}

/// Transport payload for the pipeline. Raw bytes are encoded; base64 input is
/// passed through as text.
pub fn to_payload(contents: &[u8], already_base64: bool) -> Result<String> {
    if already_base64 {
        let text = std::str::from_utf8(contents).context("base64 input is not text")?;
        Ok(text.trim().to_string())
    } else {
        Ok(STANDARD.encode(contents))
    }
}

/// `<config_dir>/unitext/config.yaml`, if it exists.
pub fn default_config_path() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("unitext").join("config.yaml");
    path.exists().then_some(path)
}

/// Explicit config path, then the default location, then built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> (ExtractionConfig, Option<PathBuf>) {
    let path = explicit.map(Path::to_path_buf).or_else(default_config_path);
    (ExtractionConfig::load_with_fallback(path.as_deref()), path)
}
