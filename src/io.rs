//! Verbosity control and file access for persisted tables.

use crate::error::TransportResult;
use serde::{de::DeserializeOwned, Serialize};
use std::{fs, io::Write, path::Path};
use tempfile::NamedTempFile;

/// Whether or not to print non-critical status messages.
#[derive(Clone, Copy, Debug)]
pub enum Verbose {
    Yes,
    No,
}

impl Verbose {
    pub fn is_yes(&self) -> bool {
        match self {
            Verbose::Yes => true,
            Verbose::No => false,
        }
    }
}

/// Reads a JSON-serialized value from the given file.
pub fn read_json_file<T>(path: &Path) -> TransportResult<T>
where
    T: DeserializeOwned,
{
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Writes a JSON-serialized value to the given file, replacing it
/// atomically so that readers never observe a partial write.
pub fn write_json_file<T>(path: &Path, value: &T) -> TransportResult<()>
where
    T: Serialize,
{
    let directory = path.parent().unwrap_or_else(|| Path::new("."));
    let bytes = serde_json::to_vec(value)?;
    let mut file = NamedTempFile::new_in(directory)?;
    file.write_all(&bytes)?;
    file.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn written_values_read_back_unchanged() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("values.json");
        write_json_file(&path, &vec![1.5f64, 2.5, -3.0]).unwrap();
        let read: Vec<f64> = read_json_file(&path).unwrap();
        assert_eq!(read, vec![1.5, 2.5, -3.0]);
    }

    #[test]
    fn reading_a_missing_file_fails() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("absent.json");
        assert!(read_json_file::<Vec<f64>>(&path).is_err());
    }
}
