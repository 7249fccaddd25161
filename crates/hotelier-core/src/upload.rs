//! Upload admission rules for hotel pictures.
//!
//! The content is sniffed from its magic bytes; the declared MIME type and
//! client-side extension are only trusted when they agree with it.

use image::ImageFormat;

use crate::{Error, Result};

/// Picture formats accepted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PictureFormat {
    Jpeg,
    Png,
    WebP,
}

impl PictureFormat {
    /// Detect the format from the leading bytes of `data`.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        match image::guess_format(data).ok()? {
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::WebP => Some(Self::WebP),
            _ => None,
        }
    }

    /// Map a MIME type (parameters ignored) to a format.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
        }
    }

    pub fn canonical_extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
        }
    }

    fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Jpeg => &["jpg", "jpeg", "jpe"],
            Self::Png => &["png"],
            Self::WebP => &["webp"],
        }
    }

    /// Pick the extension for a stored blob: the client's, if it names this
    /// format, otherwise the canonical one.
    pub fn choose_extension(self, original: Option<&str>) -> &'static str {
        let Some(original) = original else {
            return self.canonical_extension();
        };
        let lowered = original.trim_start_matches('.').to_ascii_lowercase();
        self.extensions()
            .iter()
            .find(|ext| **ext == lowered)
            .copied()
            .unwrap_or_else(|| self.canonical_extension())
    }
}

/// An upload that passed every admission rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedUpload {
    pub format: PictureFormat,
    pub extension: &'static str,
    pub size: u64,
}

/// Check an upload against the admission rules without touching storage.
///
/// * `data` - the raw file body
/// * `declared_mime` - the part's `Content-Type`, if the client sent one
/// * `original_extension` - extension of the client-side file name
/// * `max_bytes` - inclusive size limit
pub fn admit(
    data: &[u8],
    declared_mime: Option<&str>,
    original_extension: Option<&str>,
    max_bytes: u64,
) -> Result<AcceptedUpload> {
    let size = data.len() as u64;
    if size == 0 {
        return Err(Error::validation("picture is empty"));
    }
    if size > max_bytes {
        return Err(Error::validation(format!(
            "picture is {size} bytes; the limit is {max_bytes} bytes"
        )));
    }

    let format = PictureFormat::sniff(data).ok_or_else(|| {
        Error::validation("picture must be a jpeg, png, or webp image")
    })?;

    // application/octet-stream and friends carry no claim worth checking.
    if let Some(declared) = declared_mime.and_then(PictureFormat::from_mime) {
        if declared != format {
            return Err(Error::validation(format!(
                "declared type {} does not match {} content",
                declared.mime_type(),
                format.mime_type()
            )));
        }
    } else if let Some(mime) = declared_mime {
        if mime.starts_with("image/") {
            return Err(Error::validation(format!("unsupported image type {mime}")));
        }
    }

    Ok(AcceptedUpload {
        format,
        extension: format.choose_extension(original_extension),
        size,
    })
}
