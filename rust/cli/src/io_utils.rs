//! File I/O utilities for reading hand files and hand logs.
//!
//! - Reading text files with automatic .zst decompression
//! - Ensuring parent directories exist before file writes
//!
//! ## Error Handling
//!
//! I/O errors are converted to `String` so command handlers can fold them
//! into [`crate::CliError::InvalidInput`] with `?`.

use std::path::Path;

/// Largest decompressed hand log accepted from a `.zst` file.
const MAX_DECOMPRESSED: usize = 64 * 1024 * 1024;

/// Read text file with automatic .zst decompression detection.
///
/// A UTF-8 BOM is stripped if present, so hand files saved by editors that
/// add one still start with their `Hand (N)` header.
///
/// # Example
///
/// ```rust,no_run
/// # use potsettle_cli::io_utils::read_text_auto;
/// let hand = read_text_auto("hands/final_table.txt").unwrap();
/// let log = read_text_auto("logs/hands.jsonl.zst").unwrap();
/// ```
pub fn read_text_auto(path: &str) -> Result<String, String> {
    let mut content = if path.ends_with(".zst") {
        let comp = std::fs::read(path).map_err(|e| format!("{}: {}", path, e))?;
        let dec = zstd::bulk::decompress(&comp, MAX_DECOMPRESSED)
            .map_err(|e| format!("{}: {}", path, e))?;
        String::from_utf8(dec).map_err(|e| format!("{}: {}", path, e))?
    } else {
        std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?
    };
    strip_utf8_bom(&mut content);
    Ok(content)
}

/// Ensure parent directory exists for given path, creating if needed.
pub fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create directory {}: {}", parent.display(), e))?;
    }
    Ok(())
}

fn strip_utf8_bom(s: &mut String) {
    const UTF8_BOM: &str = "\u{feff}";
    if s.starts_with(UTF8_BOM) {
        s.drain(..UTF8_BOM.len());
    }
}
