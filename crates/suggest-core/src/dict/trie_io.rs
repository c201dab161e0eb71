//! Binary blob format for compiled dictionaries.
//!
//! Layout: `KSDX` magic, 1-byte version, little-endian CRC32 of the body,
//! then the bincode-encoded node arena.

use std::fs::{self, File};
use std::path::Path;

use memmap2::Mmap;

use super::trie::Trie;
use super::DictError;

const MAGIC: &[u8; 4] = b"KSDX";
const VERSION: u8 = 1;
const HEADER_SIZE: usize = 9; // 4 bytes magic + 1 byte version + 4 bytes crc

impl Trie {
    pub fn to_bytes(&self) -> Result<Vec<u8>, DictError> {
        let body = bincode::serialize(self).map_err(DictError::Serialize)?;
        let mut buf = Vec::with_capacity(HEADER_SIZE + body.len());
        buf.extend_from_slice(MAGIC);
        buf.push(VERSION);
        buf.extend_from_slice(&crc32fast::hash(&body).to_le_bytes());
        buf.extend_from_slice(&body);
        Ok(buf)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, DictError> {
        if data.len() < HEADER_SIZE {
            return Err(DictError::InvalidHeader);
        }
        if &data[..4] != MAGIC {
            return Err(DictError::InvalidMagic);
        }
        if data[4] != VERSION {
            return Err(DictError::UnsupportedVersion(data[4]));
        }
        let expected = u32::from_le_bytes([data[5], data[6], data[7], data[8]]);
        let body = &data[HEADER_SIZE..];
        let actual = crc32fast::hash(body);
        if actual != expected {
            return Err(DictError::ChecksumMismatch { expected, actual });
        }
        let mut trie: Trie = bincode::deserialize(body).map_err(DictError::Deserialize)?;
        trie.check_links()?;
        trie.blob_size = data.len();
        Ok(trie)
    }

    /// Memory-map and decode a blob file.
    pub fn open(path: &Path) -> Result<Self, DictError> {
        let file = File::open(path)?;
        // SAFETY: the map is read-only and dropped before this function
        // returns; the decoded trie owns all of its data.
        let mmap = unsafe { Mmap::map(&file)? };
        Self::from_bytes(&mmap)
    }

    /// Atomic write: write to .tmp then rename.
    pub fn save(&self, path: &Path) -> Result<(), DictError> {
        let bytes = self.to_bytes()?;
        let tmp = path.with_extension("tmp");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}
