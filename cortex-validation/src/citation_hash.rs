//! Citation region hashing.
//!
//! The hash covers the cited line range plus a small context window, so an
//! edit just above or below the region is caught too. SHA-256, first 16 hex
//! characters.

use std::path::Path;

use sha2::{Digest, Sha256};

use cortex_core::constants::{CITATION_CONTEXT_LINES, CITATION_HASH_LEN};
use cortex_core::errors::{CortexError, ValidationError};
use cortex_core::memory::Citation;
use cortex_core::CortexResult;

/// Compute the hash of a citation's region in the current source tree.
/// Paths are project-relative under `root`.
pub fn hash_region(root: &Path, citation: &Citation) -> CortexResult<String> {
    let path = root.join(&citation.file_path);
    let text = std::fs::read_to_string(&path).map_err(|e| {
        CortexError::ValidationError(ValidationError::FileUnreadable {
            path: citation.file_path.clone(),
            reason: e.to_string(),
        })
    })?;
    Ok(hash_text_region(
        &text,
        citation.line_start,
        citation.line_end,
    ))
}

/// Hash a region of already-loaded text. Lines are 1-indexed; the window is
/// clamped to the file bounds.
pub fn hash_text_region(text: &str, line_start: u32, line_end: u32) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = line_start.saturating_sub(CITATION_CONTEXT_LINES).max(1) as usize - 1;
    let end = ((line_end + CITATION_CONTEXT_LINES) as usize).min(lines.len());
    let region = if start < end {
        lines[start..end].join("\n")
    } else {
        String::new()
    };

    let digest = Sha256::digest(region.as_bytes());
    let hex = format!("{digest:x}");
    hex[..CITATION_HASH_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "line one\nline two\nline three\nline four\nline five\nline six\n";

    #[test]
    fn hash_is_sixteen_hex_chars() {
        let hash = hash_text_region(SOURCE, 2, 4);
        assert_eq!(hash.len(), 16);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn hash_is_stable() {
        assert_eq!(hash_text_region(SOURCE, 2, 4), hash_text_region(SOURCE, 2, 4));
    }

    #[test]
    fn edit_inside_region_changes_hash() {
        let edited = SOURCE.replace("line three", "line 3");
        assert_ne!(hash_text_region(SOURCE, 2, 4), hash_text_region(&edited, 2, 4));
    }

    #[test]
    fn edit_in_context_window_changes_hash() {
        // Line 6 sits inside the +2 context window of lines 2-4.
        let edited = SOURCE.replace("line six", "line 6");
        assert_ne!(hash_text_region(SOURCE, 2, 4), hash_text_region(&edited, 2, 4));
    }

    #[test]
    fn edit_far_outside_region_keeps_hash() {
        let long: String = (1..=50).map(|i| format!("line {i}\n")).collect();
        let edited = long.replace("line 49", "changed");
        assert_eq!(hash_text_region(&long, 2, 4), hash_text_region(&edited, 2, 4));
    }

    #[test]
    fn out_of_range_region_hashes_empty() {
        let hash = hash_text_region("only one line", 100, 120);
        assert_eq!(hash, hash_text_region("", 1, 1));
    }
}
