//! Named-entry binary containers
//!
//! Packaging logic reads and writes archives through the `EntryReader` and
//! `EntryWriter` traits, so it can run against an in-memory container in
//! tests and against ZIP archives in production.

use super::{TemplateError, TemplateResult};
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use zip::read::ZipArchive;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Largest uncompressed entry accepted when reading an archive
pub const MAX_ENTRY_SIZE: u64 = 100 * 1024 * 1024;

/// Read access to named entries
pub trait EntryReader {
    /// Read an entry, `None` if it does not exist
    fn read(&mut self, path: &str) -> TemplateResult<Option<Vec<u8>>>;

    /// Names of all file entries starting with `prefix`
    fn list(&self, prefix: &str) -> Vec<String>;
}

/// Write access to named entries
pub trait EntryWriter {
    fn write(&mut self, path: &str, data: &[u8]) -> TemplateResult<()>;
}

/// Ordered in-memory container
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryContainer {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.entries.remove(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all entry sizes
    pub fn total_size(&self) -> u64 {
        self.entries.values().map(|data| data.len() as u64).sum()
    }

    /// Pack all entries into a ZIP archive
    pub fn to_zip(&self) -> TemplateResult<Vec<u8>> {
        let mut writer = ZipEntryWriter::new();
        for (path, data) in &self.entries {
            writer.write(path, data)?;
        }
        writer.finish()
    }

    /// Unpack every file entry of a ZIP archive
    pub fn from_zip(data: &[u8]) -> TemplateResult<Self> {
        let mut reader = ZipEntryReader::new(data)?;
        let mut container = Self::new();
        for path in reader.list("") {
            if let Some(bytes) = reader.read(&path)? {
                container.entries.insert(path, bytes);
            }
        }
        Ok(container)
    }
}

impl EntryReader for MemoryContainer {
    fn read(&mut self, path: &str) -> TemplateResult<Option<Vec<u8>>> {
        Ok(self.entries.get(path).cloned())
    }

    fn list(&self, prefix: &str) -> Vec<String> {
        self.entries
            .keys()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect()
    }
}

impl EntryWriter for MemoryContainer {
    fn write(&mut self, path: &str, data: &[u8]) -> TemplateResult<()> {
        self.entries.insert(path.to_string(), data.to_vec());
        Ok(())
    }
}

/// Writes entries into a deflate-compressed ZIP archive held in memory
pub struct ZipEntryWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl ZipEntryWriter {
    pub fn new() -> Self {
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .compression_level(Some(6));
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            options,
        }
    }

    /// Finish the archive and return its bytes
    pub fn finish(self) -> TemplateResult<Vec<u8>> {
        let cursor = self.zip.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for ZipEntryWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ZipEntryWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipEntryWriter").finish_non_exhaustive()
    }
}

impl EntryWriter for ZipEntryWriter {
    fn write(&mut self, path: &str, data: &[u8]) -> TemplateResult<()> {
        self.zip.start_file(path, self.options)?;
        self.zip.write_all(data)?;
        Ok(())
    }
}

/// Reads entries lazily from ZIP archive bytes
pub struct ZipEntryReader<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> ZipEntryReader<'a> {
    pub fn new(data: &'a [u8]) -> TemplateResult<Self> {
        let archive = ZipArchive::new(Cursor::new(data))?;
        Ok(Self { archive })
    }
}

impl std::fmt::Debug for ZipEntryReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipEntryReader")
            .field("entries", &self.archive.len())
            .finish()
    }
}

impl EntryReader for ZipEntryReader<'_> {
    fn read(&mut self, path: &str) -> TemplateResult<Option<Vec<u8>>> {
        let mut file = match self.archive.by_name(path) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if file.is_dir() {
            return Ok(None);
        }
        if file.size() > MAX_ENTRY_SIZE {
            return Err(TemplateError::InvalidFormat(format!(
                "archive entry {} is too large ({} bytes)",
                path,
                file.size()
            )));
        }

        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        Ok(Some(data))
    }

    fn list(&self, prefix: &str) -> Vec<String> {
        self.archive
            .file_names()
            .filter(|name| name.starts_with(prefix) && !name.ends_with('/'))
            .map(String::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_container_read_write_list() {
        let mut container = MemoryContainer::new();
        container.write("manifest.json", b"{}").unwrap();
        container.write("assets/a.png", b"png").unwrap();
        container.write("assets/b.png", b"png2").unwrap();

        assert_eq!(container.read("manifest.json").unwrap(), Some(b"{}".to_vec()));
        assert_eq!(container.read("missing").unwrap(), None);
        assert_eq!(container.list("assets/"), vec!["assets/a.png", "assets/b.png"]);
        assert_eq!(container.total_size(), 9);
    }

    #[test]
    fn test_zip_round_trip() {
        let mut writer = ZipEntryWriter::new();
        writer.write("manifest.json", br#"{"version":"1.1.0"}"#).unwrap();
        writer.write("screenshots/preview-1.png", &[0x89, 0x50, 0x4E, 0x47]).unwrap();
        let bytes = writer.finish().unwrap();

        let mut reader = ZipEntryReader::new(&bytes).unwrap();
        assert_eq!(
            reader.read("manifest.json").unwrap(),
            Some(br#"{"version":"1.1.0"}"#.to_vec())
        );
        assert_eq!(reader.read("template.json").unwrap(), None);
        assert_eq!(reader.list("screenshots/"), vec!["screenshots/preview-1.png"]);
    }

    #[test]
    fn test_memory_container_zip_conversion() {
        let mut container = MemoryContainer::new();
        container.write("a.txt", b"alpha").unwrap();
        container.write("dir/b.txt", b"beta").unwrap();

        let zip = container.to_zip().unwrap();
        let restored = MemoryContainer::from_zip(&zip).unwrap();
        assert_eq!(restored, container);
    }

    #[test]
    fn test_invalid_zip_is_rejected() {
        assert!(matches!(
            ZipEntryReader::new(b"not a zip archive"),
            Err(TemplateError::Zip(_))
        ));
    }
}
