// Loading flat torrent file listings.
// The client hands over a JSON array of file records; these helpers read one
// from a string or a file on disk.

pub mod types;

use std::path::Path;

use crate::error::LoadError;
use self::types::TorrentFile;

/// Parse a JSON array of file records.
pub fn parse_records(json: &str) -> Result<Vec<TorrentFile>, LoadError> {
    let records: Vec<TorrentFile> = serde_json::from_str(json)?;
    tracing::debug!("Parsed {} file records", records.len());
    Ok(records)
}

/// Read and parse a JSON record file.
pub fn load_records(path: &Path) -> Result<Vec<TorrentFile>, LoadError> {
    let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_records(&json)
}
