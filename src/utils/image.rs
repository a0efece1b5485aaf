//! Loading image attachments from disk.

use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::core::message::ImageRef;

/// Attachments above this size are rejected before encoding.
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug)]
pub enum ImageError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    UnsupportedType(PathBuf),
    TooLarge {
        path: PathBuf,
        bytes: usize,
    },
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::Read { path, source } => {
                write!(f, "Failed to read image {}: {}", path.display(), source)
            }
            ImageError::UnsupportedType(path) => write!(
                f,
                "Unsupported image type for {} (expected png, jpg, gif or webp)",
                path.display()
            ),
            ImageError::TooLarge { path, bytes } => write!(
                f,
                "Image {} is too large ({} bytes, limit {})",
                path.display(),
                bytes,
                MAX_IMAGE_BYTES
            ),
        }
    }
}

impl Error for ImageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ImageError::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    Some(match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => return None,
    })
}

/// Encode raw bytes as an inline attachment. The id is derived from the
/// payload, so attaching the same bytes twice yields the same id.
pub fn image_from_bytes(bytes: &[u8], mime: &str) -> ImageRef {
    let checksum = crc32fast::hash(bytes);
    ImageRef {
        id: format!("img-{checksum:08x}"),
        data_url: format!("data:{mime};base64,{}", STANDARD.encode(bytes)),
        mime_hint: mime.to_string(),
    }
}

pub fn load_image(path: &Path) -> Result<ImageRef, ImageError> {
    let mime = mime_for_path(path).ok_or_else(|| ImageError::UnsupportedType(path.to_path_buf()))?;
    let bytes = fs::read(path).map_err(|source| ImageError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ImageError::TooLarge {
            path: path.to_path_buf(),
            bytes: bytes.len(),
        });
    }
    Ok(image_from_bytes(&bytes, mime))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for_path(Path::new("a.PNG")), Some("image/png"));
        assert_eq!(mime_for_path(Path::new("b.jpeg")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("c.txt")), None);
        assert_eq!(mime_for_path(Path::new("noext")), None);
    }

    #[test]
    fn encodes_payload_as_data_url() {
        let image = image_from_bytes(b"abc", "image/png");
        assert_eq!(image.data_url, "data:image/png;base64,YWJj");
        assert_eq!(image.mime_hint, "image/png");
        assert_eq!(image.id, image_from_bytes(b"abc", "image/png").id);
        assert_ne!(image.id, image_from_bytes(b"abd", "image/png").id);
    }

    #[test]
    fn loads_from_disk() {
        let mut file = Builder::new().suffix(".gif").tempfile().unwrap();
        file.write_all(b"GIF89a").unwrap();

        let image = load_image(file.path()).unwrap();
        assert!(image.data_url.starts_with("data:image/gif;base64,"));
    }

    #[test]
    fn rejects_unknown_types_and_missing_files() {
        assert!(matches!(
            load_image(Path::new("notes.txt")),
            Err(ImageError::UnsupportedType(_))
        ));
        assert!(matches!(
            load_image(Path::new("/definitely/missing.png")),
            Err(ImageError::Read { .. })
        ));
    }
}
