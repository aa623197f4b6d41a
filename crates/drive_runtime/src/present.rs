//! Text and glyph helpers shared by the drive views.

use chrono::{DateTime, Utc};
use drive_host::ItemKind;

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Human-readable size in base-1024 units with up to two decimals; `0 B` for zero or absent.
pub fn format_file_size(bytes: Option<u64>) -> String {
    let Some(bytes) = bytes.filter(|bytes| *bytes > 0) else {
        return "0 B".to_string();
    };
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{:.2}", (value * 100.0).round() / 100.0);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", SIZE_UNITS[unit])
}

/// Date like `May 1, 2024` (UTC); empty when absent or out of range.
pub fn date_label(unix_ms: Option<i64>) -> String {
    unix_ms
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|date| date.format("%b %-d, %Y").to_string())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Icon family for an item row.
pub enum FileGlyph {
    /// Folder.
    Folder,
    /// Spreadsheet-like file.
    Spreadsheet,
    /// Image.
    Image,
    /// Text or office document.
    Document,
    /// Anything else.
    Generic,
}

impl FileGlyph {
    /// Stable token used as a CSS modifier.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::Spreadsheet => "spreadsheet",
            Self::Image => "image",
            Self::Document => "document",
            Self::Generic => "file",
        }
    }
}

/// Picks a glyph by kind and file extension.
pub fn file_glyph(kind: ItemKind, name: &str) -> FileGlyph {
    if kind == ItemKind::Folder {
        return FileGlyph::Folder;
    }
    let extension = name
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "xlsx" | "xls" | "csv" => FileGlyph::Spreadsheet,
        "png" | "jpg" | "jpeg" | "gif" | "svg" => FileGlyph::Image,
        "doc" | "docx" | "pdf" | "txt" | "ppt" | "pptx" => FileGlyph::Document,
        _ => FileGlyph::Generic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_use_binary_units() {
        assert_eq!(format_file_size(None), "0 B");
        assert_eq!(format_file_size(Some(0)), "0 B");
        assert_eq!(format_file_size(Some(500)), "500 B");
        assert_eq!(format_file_size(Some(1024)), "1 KB");
        assert_eq!(format_file_size(Some(1536)), "1.5 KB");
        assert_eq!(format_file_size(Some(10 * 1024 * 1024)), "10 MB");
        assert_eq!(format_file_size(Some(1_234_567)), "1.18 MB");
        assert_eq!(format_file_size(Some(5 * 1024 * 1024 * 1024 * 1024)), "5120 GB");
    }

    #[test]
    fn dates_render_in_short_month_form() {
        assert_eq!(date_label(Some(1_714_557_600_000)), "May 1, 2024");
        assert_eq!(date_label(None), "");
    }

    #[test]
    fn glyphs_follow_extension() {
        assert_eq!(file_glyph(ItemKind::Folder, "x.pdf"), FileGlyph::Folder);
        assert_eq!(file_glyph(ItemKind::File, "Budget.XLSX"), FileGlyph::Spreadsheet);
        assert_eq!(file_glyph(ItemKind::File, "cat.jpeg"), FileGlyph::Image);
        assert_eq!(file_glyph(ItemKind::File, "notes.txt"), FileGlyph::Document);
        assert_eq!(file_glyph(ItemKind::File, "README"), FileGlyph::Generic);
        assert_eq!(file_glyph(ItemKind::File, "archive.zip").token(), "file");
    }
}
