//! Reading and writing catalog snapshots.
//!
//! A snapshot is a single JSON document:
//!
//! ```json
//! {
//!   "categories": [{ "id": "dev-tools", "name": "Developer Tools" }],
//!   "products": [{
//!     "id": "hobbyrider", "name": "hobbyrider",
//!     "createdAt": "2025-01-20T12:00:00Z",
//!     "upvotes": 42, "views": 900, "commentCount": 7,
//!     "categoryIds": ["dev-tools"]
//!   }]
//! }
//! ```

use crate::error::{CatalogError, Result};
use crate::types::CatalogSnapshot;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Parse a snapshot file.
///
/// Only checks the JSON shape; referential checks happen when the
/// catalog index is built.
pub fn parse_snapshot(path: &Path) -> Result<CatalogSnapshot> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CatalogError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => CatalogError::IoError(e),
    })?;

    parse_snapshot_reader(BufReader::new(file), &path.display().to_string())
}

/// Parse a snapshot from any reader. `name` is used in error messages.
pub fn parse_snapshot_reader<R: std::io::Read>(reader: R, name: &str) -> Result<CatalogSnapshot> {
    serde_json::from_reader(reader).map_err(|source| CatalogError::ParseError {
        file: name.to_string(),
        source,
    })
}

/// Write a snapshot as pretty-printed JSON, replacing any existing file.
pub fn write_snapshot(path: &Path, snapshot: &CatalogSnapshot) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, snapshot).map_err(|source| {
        CatalogError::ParseError {
            file: path.display().to_string(),
            source,
        }
    })?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
