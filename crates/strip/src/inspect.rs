//! Read-only scan for metadata-bearing chunks and segments.
//!
//! This walks the container structure of a PNG or JPEG and reports what it
//! finds. It never feeds the strip path; it exists so callers (and tests)
//! can show what was in a file and confirm the cleaned output has none of it.

use crate::{classify, FormatKind};
use serde::Serialize;

const PNG_SIGNATURE_LEN: usize = 8;
const XMP_KEYWORD: &[u8] = b"XML:com.adobe.xmp";
const EXIF_HEADER: &[u8] = b"Exif\0\0";
const XMP_NAMESPACE: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";
const ICC_HEADER: &[u8] = b"ICC_PROFILE\0";
const PHOTOSHOP_HEADER: &[u8] = b"Photoshop 3.0\0";

/// What a chunk or segment carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// EXIF block (JPEG APP1, PNG eXIf)
    Exif,
    /// XMP packet (JPEG APP1, PNG iTXt)
    Xmp,
    /// IPTC / Photoshop resources (JPEG APP13)
    Iptc,
    /// Embedded ICC color profile
    IccProfile,
    /// C2PA / JUMBF provenance store (JPEG APP11, PNG caBX)
    C2pa,
    /// Free text (PNG tEXt/zTXt/iTXt)
    Text,
    /// JPEG COM segment
    Comment,
    /// JFIF APP0 header written by every JPEG encoder
    Jfif,
    /// Any other ancillary chunk or application segment
    Other,
}

impl SegmentKind {
    /// Whether the segment carries metadata rather than required structure.
    pub fn is_metadata(&self) -> bool {
        !matches!(self, SegmentKind::Jfif)
    }
}

/// One chunk or segment found by the scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// Chunk type (`iTXt`) or marker name (`APP1`)
    pub name: String,
    /// Classification
    pub kind: SegmentKind,
    /// Byte offset of the chunk/marker start
    pub offset: usize,
    /// Payload length in bytes
    pub length: usize,
}

/// Scan result for one image.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataReport {
    /// Detected format
    pub format: FormatKind,
    /// Image width in pixels, when the header was readable
    pub width: Option<u32>,
    /// Image height in pixels, when the header was readable
    pub height: Option<u32>,
    /// File size in bytes
    pub size_bytes: usize,
    /// Ancillary chunks / application segments in file order
    pub segments: Vec<Segment>,
}

impl MetadataReport {
    /// Segments that carry metadata.
    pub fn metadata_segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| s.kind.is_metadata())
    }

    /// Whether any metadata was found.
    pub fn has_metadata(&self) -> bool {
        self.metadata_segments().next().is_some()
    }

    /// Whether a segment with this name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.segments.iter().any(|s| s.name == name)
    }
}

/// Scan image bytes for metadata.
///
/// Returns `None` for unsupported formats. Truncated or malformed streams
/// yield whatever was found before the damage.
pub fn inspect(data: &[u8]) -> Option<MetadataReport> {
    let format = classify(data, None);

    let mut report = MetadataReport {
        format,
        width: None,
        height: None,
        size_bytes: data.len(),
        segments: Vec::new(),
    };

    match format {
        FormatKind::Png => scan_png(data, &mut report),
        FormatKind::Jpeg => scan_jpeg(data, &mut report),
        FormatKind::Unsupported => return None,
    }

    Some(report)
}

fn read_u32_be(data: &[u8], at: usize) -> Option<u32> {
    let bytes = data.get(at..at + 4)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn read_u16_be(data: &[u8], at: usize) -> Option<u16> {
    let bytes = data.get(at..at + 2)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

fn scan_png(data: &[u8], report: &mut MetadataReport) {
    let mut i = PNG_SIGNATURE_LEN;

    // Each chunk: 4 bytes length, 4 bytes type, payload, 4 bytes CRC
    while let (Some(length), Some(chunk_type)) = (read_u32_be(data, i), data.get(i + 4..i + 8)) {
        let length = length as usize;
        let payload_start = i + 8;
        let payload = data.get(payload_start..payload_start.saturating_add(length));

        if chunk_type == b"IHDR" {
            if let Some(p) = payload {
                report.width = read_u32_be(p, 0);
                report.height = read_u32_be(p, 4);
            }
        }

        // Lowercase first letter marks an ancillary chunk
        if chunk_type[0] & 0x20 != 0 {
            report.segments.push(Segment {
                name: String::from_utf8_lossy(chunk_type).into_owned(),
                kind: classify_png_chunk(chunk_type, payload.unwrap_or_default()),
                offset: i,
                length,
            });
        }

        if chunk_type == b"IEND" || payload.is_none() {
            break;
        }
        i = payload_start + length + 4;
    }
}

fn classify_png_chunk(chunk_type: &[u8], payload: &[u8]) -> SegmentKind {
    match chunk_type {
        b"eXIf" => SegmentKind::Exif,
        b"iCCP" => SegmentKind::IccProfile,
        b"caBX" => SegmentKind::C2pa,
        b"iTXt" if payload.starts_with(XMP_KEYWORD) => SegmentKind::Xmp,
        b"tEXt" | b"zTXt" | b"iTXt" => SegmentKind::Text,
        _ => SegmentKind::Other,
    }
}

fn scan_jpeg(data: &[u8], report: &mut MetadataReport) {
    // Skip SOI marker
    let mut i = 2;

    while i + 1 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];

        // Fill bytes, standalone markers
        if marker == 0xFF {
            i += 1;
            continue;
        }
        if marker == 0x01 || marker == 0xD8 || (0xD0..=0xD7).contains(&marker) {
            i += 2;
            continue;
        }
        // Entropy-coded data follows SOS; metadata never appears after it
        if marker == 0xD9 || marker == 0xDA {
            break;
        }

        let Some(length) = read_u16_be(data, i + 2) else {
            break;
        };
        let length = length as usize;
        let payload = data
            .get(i + 4..i + 2 + length.max(2))
            .unwrap_or_else(|| data.get(i + 4..).unwrap_or_default());

        // SOF markers contain dimensions
        if matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF) {
            report.height = read_u16_be(payload, 1).map(u32::from);
            report.width = read_u16_be(payload, 3).map(u32::from);
        }

        if let Some((name, kind)) = classify_jpeg_segment(marker, payload) {
            report.segments.push(Segment {
                name,
                kind,
                offset: i,
                length: length.saturating_sub(2),
            });
        }

        i += 2 + length;
    }
}

fn classify_jpeg_segment(marker: u8, payload: &[u8]) -> Option<(String, SegmentKind)> {
    let kind = match marker {
        0xE0 if payload.starts_with(b"JFIF\0") => SegmentKind::Jfif,
        0xE1 if payload.starts_with(EXIF_HEADER) => SegmentKind::Exif,
        0xE1 if payload.starts_with(XMP_NAMESPACE) => SegmentKind::Xmp,
        0xE2 if payload.starts_with(ICC_HEADER) => SegmentKind::IccProfile,
        0xEB => SegmentKind::C2pa,
        0xED if payload.starts_with(PHOTOSHOP_HEADER) => SegmentKind::Iptc,
        0xE0..=0xEF => SegmentKind::Other,
        0xFE => return Some(("COM".to_string(), SegmentKind::Comment)),
        _ => return None,
    };

    Some((format!("APP{}", marker - 0xE0), kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_chunk(out: &mut Vec<u8>, chunk_type: &[u8; 4], payload: &[u8]) {
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(chunk_type);
        out.extend_from_slice(payload);
        out.extend_from_slice(&[0, 0, 0, 0]);
    }

    fn jpeg_segment(out: &mut Vec<u8>, marker: u8, payload: &[u8]) {
        out.extend_from_slice(&[0xFF, marker]);
        out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        out.extend_from_slice(payload);
    }

    #[test]
    fn test_png_chunks() {
        let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let mut ihdr = Vec::new();
        ihdr.extend_from_slice(&10u32.to_be_bytes());
        ihdr.extend_from_slice(&20u32.to_be_bytes());
        ihdr.extend_from_slice(&[8, 6, 0, 0, 0]);
        png_chunk(&mut data, b"IHDR", &ihdr);
        png_chunk(&mut data, b"iTXt", b"XML:com.adobe.xmp\0\0\0\0\0<x:xmpmeta/>");
        png_chunk(&mut data, b"tEXt", b"Comment\0hello");
        png_chunk(&mut data, b"caBX", b"jumb");
        png_chunk(&mut data, b"IDAT", &[0; 4]);
        png_chunk(&mut data, b"IEND", &[]);

        let report = inspect(&data).unwrap();

        assert_eq!(report.format, FormatKind::Png);
        assert_eq!((report.width, report.height), (Some(10), Some(20)));
        let kinds: Vec<_> = report.segments.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SegmentKind::Xmp, SegmentKind::Text, SegmentKind::C2pa]);
        assert!(report.has_metadata());
        assert!(!report.contains("IDAT"));
    }

    #[test]
    fn test_jpeg_segments() {
        let mut data = vec![0xFF, 0xD8];
        jpeg_segment(&mut data, 0xE0, b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0");
        jpeg_segment(&mut data, 0xE1, b"Exif\0\0MM\0*");
        jpeg_segment(&mut data, 0xEB, b"JP\0\0");
        jpeg_segment(&mut data, 0xFE, b"made with love");
        jpeg_segment(&mut data, 0xC0, &[8, 0, 6, 0, 9, 3]);
        data.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02, 0x12, 0x34, 0xFF, 0xD9]);

        let report = inspect(&data).unwrap();

        assert_eq!((report.width, report.height), (Some(9), Some(6)));
        let names: Vec<_> = report.segments.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["APP0", "APP1", "APP11", "COM"]);
        assert_eq!(report.metadata_segments().count(), 3);
    }

    #[test]
    fn test_jfif_only_is_clean() {
        let mut data = vec![0xFF, 0xD8];
        jpeg_segment(&mut data, 0xE0, b"JFIF\0\x01\x02");
        data.extend_from_slice(&[0xFF, 0xD9]);

        let report = inspect(&data).unwrap();
        assert!(report.contains("APP0"));
        assert!(!report.has_metadata());
    }

    #[test]
    fn test_truncated_input_does_not_panic() {
        let report = inspect(&[0x89, 0x50, 0x4E, 0x47, 0, 0, 0, 0, 0, 0, 0, 99, b'i']).unwrap();
        assert!(report.segments.is_empty());

        let report = inspect(&[0xFF, 0xD8, 0xFF, 0xE1, 0x40]).unwrap();
        assert!(report.segments.is_empty());
    }

    #[test]
    fn test_unsupported_returns_none() {
        assert!(inspect(b"GIF89a").is_none());
        assert!(inspect(&[]).is_none());
    }
}
