//! Output artifacts: the plain .kml file and its zipped .kmz form.

use std::fmt;
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Entry name map applications expect at the root of a KMZ archive.
pub const KMZ_ENTRY_NAME: &str = "doc.kml";

#[derive(Debug)]
pub enum OutputError {
    Io(std::io::Error),
    Zip(zip::result::ZipError),
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Zip(e) => write!(f, "archive error: {}", e),
        }
    }
}

impl std::error::Error for OutputError {}

impl From<std::io::Error> for OutputError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<zip::result::ZipError> for OutputError {
    fn from(e: zip::result::ZipError) -> Self {
        Self::Zip(e)
    }
}

/// Base file name (without extension) for a destination's output.
pub fn output_basename(destination: &str, language: &str) -> String {
    format!("{} ({})", destination, language)
}

/// Write the KML document as-is.
pub fn write_kml(kml: &str, path: &Path) -> Result<(), OutputError> {
    fs::write(path, kml)?;
    Ok(())
}

/// Package the KML document into KMZ archive bytes.
pub fn package_kmz(kml: &str) -> Result<Vec<u8>, OutputError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(KMZ_ENTRY_NAME, options)?;
    zip.write_all(kml.as_bytes())?;
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// Write the KMZ archive for the document.
pub fn write_kmz(kml: &str, path: &Path) -> Result<(), OutputError> {
    let bytes = package_kmz(kml)?;
    fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    const SAMPLE: &str = "<?xml version=\"1.0\"?><kml><Document/></kml>";

    #[test]
    fn test_output_basename() {
        assert_eq!(output_basename("Paris", "en"), "Paris (en)");
        assert_eq!(output_basename("Sevilla", "es"), "Sevilla (es)");
    }

    #[test]
    fn test_write_kml_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.kml");
        write_kml(SAMPLE, &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE);
    }

    #[test]
    fn test_kmz_contains_doc_kml_entry() {
        let bytes = package_kmz(SAMPLE).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 1);

        let mut entry = archive.by_name(KMZ_ENTRY_NAME).unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, SAMPLE);
    }

    #[test]
    fn test_write_kmz_creates_readable_archive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.kmz");
        write_kmz(SAMPLE, &path).unwrap();

        let file = fs::File::open(&path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        assert!(archive.by_name(KMZ_ENTRY_NAME).is_ok());
    }
}
