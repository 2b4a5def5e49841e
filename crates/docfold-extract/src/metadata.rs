//! File-level metadata extraction.

use crate::error::{ExtractError, ExtractResult};
use chrono::{DateTime, Utc};
use docfold_core::FileMetadata;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const HASH_BLOCK_SIZE: usize = 8192;

/// Extract identity and integrity attributes for a file.
///
/// Computed once per extraction pass; the content hash streams the file in
/// fixed-size blocks so memory use stays constant regardless of file size.
pub fn extract_metadata(path: &Path) -> ExtractResult<FileMetadata> {
    if !path.exists() {
        return Err(ExtractError::NotFound(path.to_path_buf()));
    }

    let meta = std::fs::metadata(path)?;
    if !meta.is_file() {
        return Err(ExtractError::NotAFile(path.to_path_buf()));
    }

    let abs_path = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let file_type = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default();

    let mime_type = mime_guess::from_path(path)
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let modified_at = meta
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());
    // Creation time is unavailable on some filesystems
    let created_at = meta
        .created()
        .map(DateTime::<Utc>::from)
        .unwrap_or(modified_at);

    let owner = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_default();

    Ok(FileMetadata {
        file_id: abs_path.to_string_lossy().to_string(),
        filename,
        path: abs_path.to_string_lossy().to_string(),
        file_type,
        size: meta.len(),
        content_hash: hash_file(path)?,
        mime_type,
        created_at,
        modified_at,
        owner,
    })
}

/// SHA-256 of the file contents, hex-encoded, streamed in 8 KiB blocks.
pub fn hash_file(path: &Path) -> ExtractResult<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; HASH_BLOCK_SIZE];

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_for_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        std::fs::write(&path, "hello world").unwrap();

        let meta = extract_metadata(&path).unwrap();
        assert_eq!(meta.filename, "report.txt");
        assert_eq!(meta.file_type, ".txt");
        assert_eq!(meta.size, 11);
        assert_eq!(meta.mime_type, "text/plain");
        // sha256 of "hello world"
        assert_eq!(
            meta.content_hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_missing_file() {
        let err = extract_metadata(Path::new("/no/such/file.txt")).unwrap_err();
        assert!(matches!(err, ExtractError::NotFound(_)));
    }

    #[test]
    fn test_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_metadata(dir.path()).unwrap_err();
        assert!(matches!(err, ExtractError::NotAFile(_)));
    }

    #[test]
    fn test_unknown_extension_mime_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.zzz");
        std::fs::write(&path, b"\x00\x01").unwrap();

        let meta = extract_metadata(&path).unwrap();
        assert_eq!(meta.mime_type, "application/octet-stream");
    }
}
