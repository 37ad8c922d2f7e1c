//! Byte-level helpers: text decoding, media sniffing and JPEG headers.

use std::borrow::Cow;

/// Decode a saved HTML page to a string.
///
/// 1. UTF-8 first (BOM handled by encoding_rs)
/// 2. then the `<meta charset>` declared in the first kilobyte
/// 3. then Windows-1252
pub fn decode_html(bytes: &[u8]) -> Cow<'_, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return result;
    }

    if let Some(name) = extract_meta_charset(bytes)
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Find `charset=...` in the head of an HTML document, covering both
/// `<meta charset="x">` and the `http-equiv` content form.
pub fn extract_meta_charset(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(1024)];
    let pos = prefix
        .windows(8)
        .position(|w| w.eq_ignore_ascii_case(b"charset="))?;
    let rest = &prefix[pos + 8..];
    let rest = match rest.first() {
        Some(b'"' | b'\'') => &rest[1..],
        _ => rest,
    };
    let end = rest
        .iter()
        .position(|&b| matches!(b, b'"' | b'\'' | b';' | b'>' | b' ' | b'/'))
        .unwrap_or(rest.len());
    std::str::from_utf8(&rest[..end]).ok().filter(|s| !s.is_empty())
}

/// Geometry of a JPEG's first start-of-frame segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegFrame {
    pub width: u32,
    pub height: u32,
    pub components: u8,
}

/// Parse SOF markers. `components` is 1 (grey), 3 (YCbCr) or 4 (CMYK).
pub fn jpeg_frame(data: &[u8]) -> Option<JpegFrame> {
    let mut i = 2;
    while i + 4 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];

        if matches!(
            marker,
            0xC0 | 0xC1
                | 0xC2
                | 0xC3
                | 0xC5
                | 0xC6
                | 0xC7
                | 0xC9
                | 0xCA
                | 0xCB
                | 0xCD
                | 0xCE
                | 0xCF
        ) && i + 9 < data.len()
        {
            let height = u32::from(u16::from_be_bytes([data[i + 5], data[i + 6]]));
            let width = u32::from(u16::from_be_bytes([data[i + 7], data[i + 8]]));
            return Some(JpegFrame {
                width,
                height,
                components: data[i + 9],
            });
        }

        let length = usize::from(u16::from_be_bytes([data[i + 2], data[i + 3]]));
        i += 2 + length;
    }
    None
}

/// Media formats an exported course can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    Jpeg,
    Png,
    Gif,
    Svg,
    WebP,
    Mp4,
    WebM,
    Binary,
}

impl MediaFormat {
    /// Raster formats that can be placed on a PDF page.
    pub fn is_raster(self) -> bool {
        matches!(
            self,
            MediaFormat::Jpeg | MediaFormat::Png | MediaFormat::Gif | MediaFormat::WebP
        )
    }
}

/// Detect a format from magic bytes, falling back to the file extension.
///
/// Course CDNs regularly serve images under misleading names, so the bytes
/// win when they are recognizable.
pub fn detect_media_format(path: &str, data: &[u8]) -> MediaFormat {
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return MediaFormat::Jpeg;
    }
    if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        return MediaFormat::Png;
    }
    if data.starts_with(b"GIF8") {
        return MediaFormat::Gif;
    }
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return MediaFormat::WebP;
    }
    if data.len() >= 12 && &data[4..8] == b"ftyp" {
        return MediaFormat::Mp4;
    }
    if data.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return MediaFormat::WebM;
    }

    let lower = path.to_ascii_lowercase();
    let ext = lower.rsplit_once('.').map_or("", |(_, ext)| ext);
    match ext {
        "jpg" | "jpeg" => MediaFormat::Jpeg,
        "png" => MediaFormat::Png,
        "gif" => MediaFormat::Gif,
        "svg" => MediaFormat::Svg,
        "webp" => MediaFormat::WebP,
        "mp4" | "m4v" => MediaFormat::Mp4,
        "webm" => MediaFormat::WebM,
        _ => MediaFormat::Binary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode_html("héllo".as_bytes()), "héllo");
    }

    #[test]
    fn test_decode_meta_charset() {
        let mut bytes = b"<meta charset=\"iso-8859-2\"><p>".to_vec();
        bytes.push(0xB1); // 'ą' in ISO-8859-2
        assert!(decode_html(&bytes).ends_with('ą'));
    }

    #[test]
    fn test_decode_falls_back_to_windows_1252() {
        let bytes = [b'c', b'a', b'f', 0xE9];
        assert_eq!(decode_html(&bytes), "café");
    }

    #[test]
    fn test_extract_meta_charset_forms() {
        assert_eq!(
            extract_meta_charset(b"<meta charset='windows-1251'>"),
            Some("windows-1251")
        );
        assert_eq!(
            extract_meta_charset(
                b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=koi8-r\">"
            ),
            Some("koi8-r")
        );
        assert_eq!(extract_meta_charset(b"<p>none</p>"), None);
    }

    #[test]
    fn test_jpeg_frame() {
        let mut jpeg = vec![0xFF, 0xD8];
        // APP0 segment of length 16
        jpeg.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
        jpeg.extend_from_slice(&[0; 14]);
        // SOF0: length, precision, height 200, width 300, 3 components
        jpeg.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0xC8, 0x01, 0x2C, 0x03]);
        jpeg.extend_from_slice(&[0; 12]);
        assert_eq!(
            jpeg_frame(&jpeg),
            Some(JpegFrame {
                width: 300,
                height: 200,
                components: 3
            })
        );
    }

    #[test]
    fn test_detect_media_format() {
        assert_eq!(detect_media_format("x.bin", &[0xFF, 0xD8, 0xFF, 0xE0]), MediaFormat::Jpeg);
        assert_eq!(detect_media_format("photo.JPG", &[]), MediaFormat::Jpeg);
        assert_eq!(detect_media_format("clip.mp4", &[]), MediaFormat::Mp4);
        assert_eq!(detect_media_format("unknown", &[]), MediaFormat::Binary);
        assert!(MediaFormat::Png.is_raster());
        assert!(!MediaFormat::Svg.is_raster());
    }
}
