//! Input collaborator: file upload, pasted text, or the bundled sample
//!
//! Only plain text is decoded; binary document formats are rejected with a
//! clear error instead of being summarized as garbage.

use crate::error::InputError;
use std::path::{Path, PathBuf};

/// Bundled sample contract for demos
pub const SAMPLE_CONTRACT: &str = include_str!("../assets/sample_contract.txt");

const TEXT_EXTENSIONS: &[&str] = &["txt", "text", "md"];

/// Where the contract text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    File(PathBuf),
    Text(String),
    Sample,
}

impl InputSource {
    /// Produce the raw text; empty or whitespace-only input is an error
    pub fn load(&self) -> Result<String, InputError> {
        let text = match self {
            InputSource::File(path) => read_text_file(path)?,
            InputSource::Text(text) => text.clone(),
            InputSource::Sample => SAMPLE_CONTRACT.to_string(),
        };

        if text.trim().is_empty() {
            return Err(InputError::Empty);
        }
        Ok(text)
    }

    /// Short label for progress messages
    pub fn describe(&self) -> String {
        match self {
            InputSource::File(path) => path.display().to_string(),
            InputSource::Text(text) => format!("pasted text ({} chars)", text.chars().count()),
            InputSource::Sample => "sample contract".to_string(),
        }
    }
}

fn read_text_file(path: &Path) -> Result<String, InputError> {
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        let ext = ext.to_ascii_lowercase();
        if !TEXT_EXTENSIONS.contains(&ext.as_str()) {
            return Err(InputError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: ext,
            });
        }
    }

    let bytes = std::fs::read(path).map_err(|source| InputError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let text = String::from_utf8(bytes).map_err(|_| InputError::NotUtf8 {
        path: path.to_path_buf(),
    })?;

    // Editors on Windows like to prepend a BOM
    Ok(text.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(text))
}
