/// Image formats recognised from their leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Webp,
    Svg,
}

/// How far into a file to look for an `<svg` root element.
const SVG_SNIFF_LEN: usize = 1024;

impl ImageKind {
    /// Detect the image format from file content. Returns `None` for
    /// anything that is not a recognised image.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            return Some(Self::Png);
        }
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }
        if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            return Some(Self::Gif);
        }
        if bytes.starts_with(b"BM") && bytes.len() >= 14 {
            return Some(Self::Bmp);
        }
        if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            return Some(Self::Webp);
        }
        if is_svg(bytes) {
            return Some(Self::Svg);
        }
        None
    }

    /// Canonical file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Webp => "webp",
            Self::Svg => "svg",
        }
    }

    /// Every extension/`mimes` token naming this format.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Png => &["png"],
            Self::Jpeg => &["jpeg", "jpg", "jpe"],
            Self::Gif => &["gif"],
            Self::Bmp => &["bmp"],
            Self::Webp => &["webp"],
            Self::Svg => &["svg"],
        }
    }

    pub fn matches(self, token: &str) -> bool {
        self.aliases().iter().any(|a| a.eq_ignore_ascii_case(token))
    }

    /// Extension for a stored file: the client's own when it agrees with the
    /// detected format, otherwise the canonical one.
    pub fn storage_extension(self, client_extension: Option<&str>) -> String {
        match client_extension {
            Some(ext) if self.matches(ext) => ext.to_ascii_lowercase(),
            _ => self.extension().to_string(),
        }
    }
}

fn is_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(SVG_SNIFF_LEN)];
    let head = head.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(head);
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start();
    text.starts_with('<') && text.to_ascii_lowercase().contains("<svg")
}
