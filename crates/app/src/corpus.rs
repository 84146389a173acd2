//! Input discovery for a benchmark run.

use std::io;
use std::path::{Path, PathBuf};

/// Coarse content class, used only as a report column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Image,
    Audio,
    Binary,
}

impl FileKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FileKind::Text => "text",
            FileKind::Image => "image",
            FileKind::Audio => "audio",
            FileKind::Binary => "binary",
        }
    }
}

/// Guess the kind of a file from its extension.
pub fn file_kind(path: &Path) -> FileKind {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "txt" | "md" | "csv" | "json" | "xml" | "html" | "htm" | "rs" | "py" | "log" => FileKind::Text,
        "pgm" | "ppm" | "pbm" | "bmp" | "png" | "jpg" | "jpeg" | "gif" | "tif" | "tiff" => FileKind::Image,
        "pcm" | "wav" | "raw" | "mp3" | "flac" | "ogg" | "aiff" => FileKind::Audio,
        _ => FileKind::Binary,
    }
}

/// Regular files directly under `dir`, sorted by name.
///
/// Subdirectories and `desktop.ini` (any case) are skipped.
pub fn discover_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let skip = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.eq_ignore_ascii_case("desktop.ini"))
            .unwrap_or(false);
        if !skip {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
