use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

const FALLBACK_STEM: &str = "upload";

/// Reduces a client-supplied file name to a safe single path component.
pub fn sanitize_filename(name: &str) -> Option<String> {
    // Browsers on Windows may send the full client path.
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let mapped: String = base
        .trim()
        .chars()
        .filter_map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_') {
                Some(ch)
            } else if ch.is_whitespace() {
                Some('_')
            } else {
                None
            }
        })
        .collect();

    let cleaned = mapped.trim_start_matches(['.', '_']).trim_end_matches('.');
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

pub async fn save_upload(dir: &Path, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    fs::create_dir_all(dir).await?;
    let name = sanitize_filename(file_name).unwrap_or_else(|| FALLBACK_STEM.to_string());
    let path = dir.join(name);
    fs::write(&path, bytes).await?;
    debug!("Stored upload of {} bytes at {}", bytes.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::scratch_dir;

    #[test]
    fn keeps_ordinary_names() {
        assert_eq!(sanitize_filename("selfie.jpg").as_deref(), Some("selfie.jpg"));
        assert_eq!(
            sanitize_filename("My Photo 01.PNG").as_deref(),
            Some("My_Photo_01.PNG")
        );
    }

    #[test]
    fn strips_directories_and_traversal() {
        assert_eq!(
            sanitize_filename("../../etc/passwd").as_deref(),
            Some("passwd")
        );
        assert_eq!(
            sanitize_filename(r"C:\Users\me\face.webp").as_deref(),
            Some("face.webp")
        );
        assert_eq!(sanitize_filename(".hidden").as_deref(), Some("hidden"));
    }

    #[test]
    fn rejects_names_without_safe_characters() {
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename(".."), None);
        assert_eq!(sanitize_filename("照片"), None);
    }

    #[tokio::test]
    async fn saves_into_created_directory() {
        let root = scratch_dir("uploads-save");
        let dir = root.join("nested").join("uploads");

        let path = save_upload(&dir, "../face.png", b"bytes").await.unwrap();
        assert_eq!(path, dir.join("face.png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"bytes");

        let fallback = save_upload(&dir, "??", b"x").await.unwrap();
        assert_eq!(fallback, dir.join("upload"));

        let _ = std::fs::remove_dir_all(root);
    }
}
