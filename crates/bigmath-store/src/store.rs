//! Stores holding one persisted constant each.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use bigmath_core::{BigFloat, RoundingMode};
use parking_lot::Mutex;
use tempfile::NamedTempFile;

use crate::codec::{self, Encoding};
use crate::error::StoreError;

/// File name of the persisted π.
pub const PI_FILE: &str = "pi.bf";

/// File name of the persisted ln 2.
pub const LN2_FILE: &str = "ln2.bf";

/// Persistence of a single constant.
///
/// Consulted before recomputing; any failure just means the caller
/// recomputes.
pub trait ConstantStore: Send + Sync {
    /// The stored value truncated to `min_precision` bits, or
    /// [`StoreError::NotFound`] if nothing at least that precise is stored.
    fn load_constant(&self, min_precision: i64) -> Result<BigFloat, StoreError>;

    /// Replace the stored value. Its exponent is the stored precision.
    fn save_constant(&self, value: &BigFloat) -> Result<(), StoreError>;

    /// Precision of the stored value, if any.
    fn stored_precision(&self) -> Option<i64>;
}

fn check_available(stored: i64, min_precision: i64) -> Result<(), StoreError> {
    if stored < min_precision {
        tracing::debug!(stored, requested = min_precision, "stored constant not precise enough");
        return Err(StoreError::NotFound);
    }
    Ok(())
}

/// Keeps one constant in a file, binary by default.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    encoding: Encoding,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            encoding: Encoding::Binary,
        }
    }

    /// Store for π inside `dir`.
    #[must_use]
    pub fn pi(dir: &Path) -> Self {
        Self::new(dir.join(PI_FILE))
    }

    /// Store for ln 2 inside `dir`.
    #[must_use]
    pub fn ln2(dir: &Path) -> Self {
        Self::new(dir.join(LN2_FILE))
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<BufReader<File>, StoreError> {
        match File::open(&self.path) {
            Ok(file) => Ok(BufReader::new(file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound),
            Err(e) => Err(e.into()),
        }
    }
}

impl ConstantStore for FileStore {
    fn load_constant(&self, min_precision: i64) -> Result<BigFloat, StoreError> {
        let mut reader = self.open()?;
        let header = codec::read_header(&mut reader)?;
        check_available(header.precision, min_precision)?;
        let value = codec::read_value(&mut reader, &header, Some(min_precision))?;
        tracing::debug!(path = %self.path.display(), stored = header.precision, "loaded constant");
        Ok(value.round(min_precision, RoundingMode::Truncate))
    }

    /// Writes a uniquely named temporary file next to the target and renames
    /// it over the target, so readers never see a partial value.
    fn save_constant(&self, value: &BigFloat) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let mut temporary = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(&mut temporary);
            codec::write_value(&mut writer, value, self.encoding)?;
            writer.flush()?;
        }
        temporary.persist(&self.path).map_err(|e| e.error)?;
        tracing::debug!(path = %self.path.display(), precision = value.exponent(), "saved constant");
        Ok(())
    }

    fn stored_precision(&self) -> Option<i64> {
        let mut reader = self.open().ok()?;
        codec::read_header(&mut reader).ok().map(|header| header.precision)
    }
}

/// Keeps one encoded constant in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    bytes: Mutex<Option<Vec<u8>>>,
    encoding: Encoding,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_encoding(encoding: Encoding) -> Self {
        Self {
            bytes: Mutex::new(None),
            encoding,
        }
    }

    /// Replace the raw bytes, bypassing the encoder.
    pub fn set_raw(&self, bytes: Vec<u8>) {
        *self.bytes.lock() = Some(bytes);
    }

    /// Copy of the raw bytes.
    #[must_use]
    pub fn raw(&self) -> Option<Vec<u8>> {
        self.bytes.lock().clone()
    }
}

impl ConstantStore for MemoryStore {
    fn load_constant(&self, min_precision: i64) -> Result<BigFloat, StoreError> {
        let guard = self.bytes.lock();
        let bytes = guard.as_deref().ok_or(StoreError::NotFound)?;
        let mut reader = bytes;
        let header = codec::read_header(&mut reader)?;
        check_available(header.precision, min_precision)?;
        let value = codec::read_value(&mut reader, &header, Some(min_precision))?;
        Ok(value.round(min_precision, RoundingMode::Truncate))
    }

    fn save_constant(&self, value: &BigFloat) -> Result<(), StoreError> {
        let bytes = codec::encode(value, self.encoding)?;
        *self.bytes.lock() = Some(bytes);
        Ok(())
    }

    fn stored_precision(&self) -> Option<i64> {
        let guard = self.bytes.lock();
        let mut reader = guard.as_deref()?;
        codec::read_header(&mut reader).ok().map(|header| header.precision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> BigFloat {
        // 0x3.243F6A8885A308D3 is π to 64 bits
        BigFloat::new(0x3_243F_6A88_85A3_08D3_i128, 64)
    }

    #[test]
    fn file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::pi(dir.path());
        assert_eq!(store.stored_precision(), None);
        assert!(store.load_constant(10).unwrap_err().is_not_found());

        store.save_constant(&sample()).unwrap();
        assert_eq!(store.stored_precision(), Some(64));
        assert_eq!(store.load_constant(64).unwrap(), sample());
        assert!(store.path().ends_with(PI_FILE));
    }

    #[test]
    fn file_store_truncated_load() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::ln2(dir.path());
        store.save_constant(&sample()).unwrap();
        let short = store.load_constant(16).unwrap();
        assert_eq!(short, sample().round(16, RoundingMode::Truncate));
        assert!(store.load_constant(65).unwrap_err().is_not_found());
    }

    #[test]
    fn file_store_text_encoding() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("pi.txt"))
            .with_encoding(Encoding::Text { radix: 16 });
        store.save_constant(&sample()).unwrap();
        assert_eq!(store.load_constant(64).unwrap(), sample());
        assert_eq!(store.load_constant(8).unwrap(), sample().round(8, RoundingMode::Truncate));
    }

    #[test]
    fn concurrent_saves_leave_one_complete_file() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::pi(dir.path());
        std::thread::scope(|scope| {
            for bits in [40, 48, 56, 64] {
                let store = &store;
                scope.spawn(move || {
                    for _ in 0..20 {
                        store.save_constant(&sample().round(bits, RoundingMode::Truncate)).unwrap();
                    }
                });
            }
        });
        let stored = store.stored_precision().unwrap();
        assert_eq!(store.load_constant(stored).unwrap(), sample().round(stored, RoundingMode::Truncate));
        let files = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, 1);
    }

    #[test]
    fn file_store_reports_corruption() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::pi(dir.path());
        fs::write(store.path(), b"\x00\x01\x02").unwrap();
        assert!(matches!(store.load_constant(1), Err(StoreError::Format(_))));
        assert_eq!(store.stored_precision(), None);
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load_constant(0).unwrap_err().is_not_found());
        store.save_constant(&sample()).unwrap();
        assert_eq!(store.stored_precision(), Some(64));
        assert_eq!(store.load_constant(64).unwrap(), sample());
        assert!(store.raw().is_some());
    }

    #[test]
    fn memory_store_corrupt_bytes() {
        let store = MemoryStore::with_encoding(Encoding::Text { radix: 10 });
        store.save_constant(&sample()).unwrap();
        let mut bytes = store.raw().unwrap();
        bytes.truncate(bytes.len() - 3);
        store.set_raw(bytes);
        assert!(matches!(store.load_constant(64), Err(StoreError::Format(_))));
    }
}
