//! On-disk format: two sibling files that are always read and written together.
//!
//! `vectors.bin` holds the matrix (`LMV1`, rows: u64 LE, dim: u64 LE, then
//! rows * dim f32 LE values). `metadata.json` holds a JSON array with one
//! object per row. Both files are written to `.tmp` siblings first and only
//! renamed over the targets once both writes succeeded. The pair is still not
//! atomic: a crash between the two renames leaves them out of step, which
//! `load` reports as corruption.

use super::snapshot::Snapshot;
use crate::domain::entities::document::DocumentMetadata;
use crate::domain::error::DomainError;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const VECTORS_FILE: &str = "vectors.bin";
pub const METADATA_FILE: &str = "metadata.json";

const MAGIC: &[u8; 4] = b"LMV1";
const HEADER_LEN: usize = 4 + 8 + 8;

/// What to do when the persisted pair exists but cannot be trusted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptionPolicy {
    /// Refuse to start.
    #[default]
    Fail,
    /// Log the problem and start with an empty store.
    Reset,
}

impl fmt::Display for CorruptionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fail => write!(f, "fail"),
            Self::Reset => write!(f, "reset"),
        }
    }
}

impl FromStr for CorruptionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "reset" => Ok(Self::Reset),
            _ => Err(format!("Invalid corruption policy: '{s}'. Use 'fail' or 'reset'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreFiles {
    dir: PathBuf,
}

impl StoreFiles {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn vectors_path(&self) -> PathBuf {
        self.dir.join(VECTORS_FILE)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE)
    }
}

pub fn encode_vectors(snapshot: &Snapshot) -> Vec<u8> {
    let rows = snapshot.len() as u64;
    let dim = snapshot.dimension().unwrap_or(0) as u64;
    let mut bytes = Vec::with_capacity(HEADER_LEN + snapshot.vectors().len() * 4);
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&rows.to_le_bytes());
    bytes.extend_from_slice(&dim.to_le_bytes());
    for v in snapshot.vectors() {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Returns `(rows, dim, values)`.
pub fn decode_vectors(bytes: &[u8]) -> Result<(usize, usize, Vec<f32>), DomainError> {
    if bytes.len() < HEADER_LEN {
        return Err(DomainError::Corrupt(format!(
            "{VECTORS_FILE} is truncated ({} bytes)",
            bytes.len()
        )));
    }
    if bytes[0..4] != MAGIC[..] {
        return Err(DomainError::Corrupt(format!("{VECTORS_FILE} has an unknown header")));
    }
    let rows = read_u64(&bytes[4..12]) as usize;
    let dim = read_u64(&bytes[12..20]) as usize;

    let expected = rows
        .checked_mul(dim)
        .and_then(|n| n.checked_mul(4))
        .and_then(|n| n.checked_add(HEADER_LEN))
        .ok_or_else(|| DomainError::Corrupt(format!("{VECTORS_FILE} header overflows")))?;
    if bytes.len() != expected {
        return Err(DomainError::Corrupt(format!(
            "{VECTORS_FILE} holds {} bytes, header promises {expected}",
            bytes.len()
        )));
    }

    let values = bytes[HEADER_LEN..]
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    Ok((rows, dim, values))
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

/// Loads the persisted pair. `Ok(None)` means there is no database yet: at
/// least one of the two files is missing.
pub async fn load(files: &StoreFiles) -> Result<Option<Snapshot>, DomainError> {
    let vectors_path = files.vectors_path();
    let metadata_path = files.metadata_path();
    let has_vectors = exists(&vectors_path).await?;
    let has_metadata = exists(&metadata_path).await?;

    if !(has_vectors && has_metadata) {
        if has_vectors || has_metadata {
            tracing::warn!(
                dir = %files.dir().display(),
                "Only one of {VECTORS_FILE}/{METADATA_FILE} exists, treating as no database"
            );
        }
        return Ok(None);
    }

    let vector_bytes = tokio::fs::read(&vectors_path)
        .await
        .map_err(|e| DomainError::Persistence(format!("read {}: {e}", vectors_path.display())))?;
    let (rows, dim, values) = decode_vectors(&vector_bytes)?;

    let metadata_bytes = tokio::fs::read(&metadata_path)
        .await
        .map_err(|e| DomainError::Persistence(format!("read {}: {e}", metadata_path.display())))?;
    let metadata: Vec<DocumentMetadata> = serde_json::from_slice(&metadata_bytes)
        .map_err(|e| DomainError::Corrupt(format!("{METADATA_FILE}: {e}")))?;

    if metadata.len() != rows {
        return Err(DomainError::Corrupt(format!(
            "{VECTORS_FILE} has {rows} rows but {METADATA_FILE} has {} records",
            metadata.len()
        )));
    }

    Snapshot::from_parts(dim, values, metadata).map(Some)
}

/// Overwrites both files with `snapshot`. An empty snapshot writes nothing and returns `false`.
pub async fn save(files: &StoreFiles, snapshot: &Snapshot) -> Result<bool, DomainError> {
    if snapshot.is_empty() {
        return Ok(false);
    }

    tokio::fs::create_dir_all(files.dir())
        .await
        .map_err(|e| DomainError::Persistence(format!("create {}: {e}", files.dir().display())))?;

    let vector_bytes = encode_vectors(snapshot);
    let metadata_bytes = serde_json::to_vec(snapshot.metadata())
        .map_err(|e| DomainError::Persistence(format!("serialize metadata: {e}")))?;

    let vectors_path = files.vectors_path();
    let metadata_path = files.metadata_path();
    let vectors_tmp = tmp_path(&vectors_path);
    let metadata_tmp = tmp_path(&metadata_path);

    // Both files are staged before either target is touched.
    let staged = async {
        write_file(&vectors_tmp, &vector_bytes).await?;
        write_file(&metadata_tmp, &metadata_bytes).await
    };
    if let Err(e) = staged.await {
        discard(&[&vectors_tmp, &metadata_tmp]).await;
        return Err(e);
    }

    if let Err(e) = tokio::fs::rename(&vectors_tmp, &vectors_path).await {
        discard(&[&vectors_tmp, &metadata_tmp]).await;
        return Err(DomainError::Persistence(format!("replace {}: {e}", vectors_path.display())));
    }
    if let Err(e) = tokio::fs::rename(&metadata_tmp, &metadata_path).await {
        discard(&[&metadata_tmp]).await;
        return Err(DomainError::Persistence(format!("replace {}: {e}", metadata_path.display())));
    }
    Ok(true)
}

async fn exists(path: &Path) -> Result<bool, DomainError> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|e| DomainError::Persistence(format!("stat {}: {e}", path.display())))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), DomainError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| DomainError::Persistence(format!("write {}: {e}", path.display())))
}

async fn discard(paths: &[&Path]) {
    for path in paths {
        let _ = tokio::fs::remove_file(path).await;
    }
}
