//! Hash-keyed construction and persistence of interpolation tables.

use super::{Interpolant1, Interpolant2};
use crate::io::{read_json_file, write_json_file, Verbose};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

/// Folds a value into a running hash state with the golden ratio
/// mixing constant.
pub fn hash_combine(state: &mut u64, value: u64) {
    *state ^= value
        .wrapping_add(0x9e37_79b9_7f4a_7c15)
        .wrapping_add(*state << 6)
        .wrapping_add(*state >> 2);
}

/// Folds a string into a running hash state byte by byte.
pub fn hash_str(state: &mut u64, text: &str) {
    for byte in text.bytes() {
        hash_combine(state, u64::from(byte));
    }
}

/// Store of built interpolation tables, keyed by a hash of everything
/// that determines their content.
///
/// Tables are built at most once per key. While one caller builds a
/// table, other callers asking for the same key block until it is
/// ready. With a directory configured, built tables are also written
/// to disk and read back on the next run.
#[derive(Debug, Default)]
pub struct TableCache {
    directory: Option<PathBuf>,
    tables_1d: Mutex<HashMap<u64, Arc<Interpolant1>>>,
    tables_2d: Mutex<HashMap<u64, Arc<Interpolant2>>>,
}

impl TableCache {
    /// Creates a cache persisting tables to the given directory, or a
    /// purely in-memory cache if no directory is given.
    ///
    /// The directory must already exist.
    pub fn new(directory: Option<PathBuf>) -> Self {
        Self {
            directory,
            tables_1d: Mutex::new(HashMap::new()),
            tables_2d: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the file a table with the given label and hash is
    /// persisted to, if a directory is configured.
    pub fn table_path(&self, label: &str, hash: u64) -> Option<PathBuf> {
        self.directory
            .as_ref()
            .map(|directory| directory.join(format!("{}_{:016x}.json", label, hash)))
    }

    /// Returns the one-dimensional table with the given hash, building
    /// it with the given closure if it is in neither memory nor on
    /// disk.
    pub fn get_or_build_1d<F>(&self, label: &str, hash: u64, verbose: Verbose, build: F) -> Arc<Interpolant1>
    where
        F: FnOnce() -> Interpolant1,
    {
        Self::get_or_build(&self.tables_1d, self.table_path(label, hash), label, hash, verbose, build)
    }

    /// Returns the two-dimensional table with the given hash, building
    /// it with the given closure if it is in neither memory nor on
    /// disk.
    pub fn get_or_build_2d<F>(&self, label: &str, hash: u64, verbose: Verbose, build: F) -> Arc<Interpolant2>
    where
        F: FnOnce() -> Interpolant2,
    {
        Self::get_or_build(&self.tables_2d, self.table_path(label, hash), label, hash, verbose, build)
    }

    fn get_or_build<T, F>(
        tables: &Mutex<HashMap<u64, Arc<T>>>,
        path: Option<PathBuf>,
        label: &str,
        hash: u64,
        verbose: Verbose,
        build: F,
    ) -> Arc<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        // Holding the lock across the build serializes concurrent
        // requests for the same table.
        let mut tables = match tables.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(table) = tables.get(&hash) {
            return Arc::clone(table);
        }
        if let Some(ref path) = path {
            if let Some(table) = read_table(path, verbose) {
                let table = Arc::new(table);
                tables.insert(hash, Arc::clone(&table));
                return table;
            }
        }
        if verbose.is_yes() {
            println!("Building {} table {:016x}", label, hash);
        }
        let table = Arc::new(build());
        if let Some(ref path) = path {
            if let Err(err) = write_json_file(path, table.as_ref()) {
                eprintln!(
                    "Warning: could not write table file {}: {}",
                    path.display(),
                    err
                );
            }
        }
        tables.insert(hash, Arc::clone(&table));
        table
    }
}

fn read_table<T>(path: &Path, verbose: Verbose) -> Option<T>
where
    T: DeserializeOwned,
{
    if !path.exists() {
        return None;
    }
    match read_json_file(path) {
        Ok(table) => {
            if verbose.is_yes() {
                println!("Read table from {}", path.display());
            }
            Some(table)
        }
        Err(err) => {
            eprintln!(
                "Warning: could not read table file {} ({}), rebuilding",
                path.display(),
                err
            );
            None
        }
    }
}
