//! Record store for meals and user profiles.
//!
//! Records live in per-kind tables keyed by a monotonically increasing id.
//! A store is either purely in-memory or backed by a JSON file. Every
//! mutation builds the next table state, writes it to disk when a file is
//! attached, and only then swaps it into memory, so a failed write leaves
//! the store exactly as it was.

use crate::{Error, Meal, Result, UserProfile};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Identifier assigned by the store on insert
pub type RecordId = u64;

/// The record kinds the store knows about
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Meal,
    UserProfile,
}

/// A record together with its store metadata
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Stored<T> {
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    pub record: T,
}

/// One table of records, ordered by id
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Table<T> {
    next_id: RecordId,
    rows: Vec<Stored<T>>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: Vec::new(),
        }
    }
}

impl<T> Table<T> {
    fn push(&mut self, record: T) -> RecordId {
        let id = self.next_id;
        self.next_id += 1;
        self.rows.push(Stored {
            id,
            created_at: Utc::now(),
            record,
        });
        id
    }
}

/// All tables, as persisted
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Tables {
    #[serde(default)]
    meals: Table<Meal>,
    #[serde(default)]
    profiles: Table<UserProfile>,
}

/// A record type that has a table in the store
pub trait Entity: Clone + Serialize + DeserializeOwned {
    const KIND: EntityKind;

    fn table(tables: &Tables) -> &Table<Self>;
    fn table_mut(tables: &mut Tables) -> &mut Table<Self>;
}

impl Entity for Meal {
    const KIND: EntityKind = EntityKind::Meal;

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.meals
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.meals
    }
}

impl Entity for UserProfile {
    const KIND: EntityKind = EntityKind::UserProfile;

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.profiles
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.profiles
    }
}

/// Keyed record store
///
/// Single writer: concurrent processes sharing one file are serialized by
/// file locks, but a reader may see the store between two separate
/// mutations (e.g. after a delete and before the following insert).
#[derive(Debug, Default)]
pub struct RecordStore {
    path: Option<PathBuf>,
    tables: Tables,
}

impl RecordStore {
    /// Create an empty store that lives only in memory
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a file-backed store
    ///
    /// A missing file yields an empty store; the file is created on the
    /// first mutation. An unreadable or corrupt file is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let tables = if path.exists() {
            load_tables(&path)?
        } else {
            tracing::info!("No store file at {:?}, starting empty", path);
            Tables::default()
        };

        Ok(Self {
            path: Some(path),
            tables,
        })
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Insert a record and return its id
    pub fn insert<E: Entity>(&mut self, record: E) -> Result<RecordId> {
        let mut next = self.tables.clone();
        let id = E::table_mut(&mut next).push(record);
        self.commit(next)?;
        tracing::debug!("Inserted {:?} record {}", E::KIND, id);
        Ok(id)
    }

    /// Remove every record of one kind, returning how many were removed
    ///
    /// Ids keep increasing afterwards; they are never reused.
    pub fn delete_all<E: Entity>(&mut self) -> Result<usize> {
        let mut next = self.tables.clone();
        let removed = std::mem::take(&mut E::table_mut(&mut next).rows).len();
        self.commit(next)?;
        tracing::debug!("Deleted {} {:?} records", removed, E::KIND);
        Ok(removed)
    }

    /// Delete every record of one kind and insert `records` in one commit
    pub fn replace_all<E: Entity>(
        &mut self,
        records: impl IntoIterator<Item = E>,
    ) -> Result<Vec<RecordId>> {
        let mut next = self.tables.clone();
        let table = E::table_mut(&mut next);
        table.rows.clear();
        let ids: Vec<_> = records.into_iter().map(|r| table.push(r)).collect();
        self.commit(next)?;
        tracing::debug!("Replaced {:?} table with {} records", E::KIND, ids.len());
        Ok(ids)
    }

    /// Most recently inserted record of one kind
    pub fn get_latest<E: Entity>(&self) -> Option<&Stored<E>> {
        E::table(&self.tables).rows.last()
    }

    pub fn get<E: Entity>(&self, id: RecordId) -> Option<&Stored<E>> {
        let rows = &E::table(&self.tables).rows;
        rows.binary_search_by_key(&id, |row| row.id)
            .ok()
            .map(|idx| &rows[idx])
    }

    /// Every record of one kind satisfying `predicate`, in id order
    pub fn query<E, P>(&self, predicate: P) -> Vec<&Stored<E>>
    where
        E: Entity,
        P: Fn(&E) -> bool,
    {
        E::table(&self.tables)
            .rows
            .iter()
            .filter(|row| predicate(&row.record))
            .collect()
    }

    pub fn len<E: Entity>(&self) -> usize {
        E::table(&self.tables).rows.len()
    }

    pub fn is_empty<E: Entity>(&self) -> bool {
        self.len::<E>() == 0
    }

    /// Persist `next` (if file-backed) and then make it current
    fn commit(&mut self, next: Tables) -> Result<()> {
        if let Some(path) = &self.path {
            save_tables(path, &next)?;
        }
        self.tables = next;
        Ok(())
    }
}

/// Lock file guarding a store file; a sibling so it survives the rename
fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".lock");
    path.with_file_name(name)
}

fn open_lock(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(lock_path(path))
}

fn store_error(action: &str, path: &Path, err: impl std::fmt::Display) -> Error {
    Error::Store(format!("{} {:?}: {}", action, path, err))
}

/// Read tables under a shared lock
fn load_tables(path: &Path) -> Result<Tables> {
    let lock = open_lock(path).map_err(|e| store_error("Failed to lock", path, e))?;
    lock.lock_shared()
        .map_err(|e| store_error("Failed to lock", path, e))?;

    let mut contents = String::new();
    let read = File::open(path).and_then(|file| {
        std::io::BufReader::new(file).read_to_string(&mut contents)
    });
    let _ = lock.unlock();
    read.map_err(|e| store_error("Failed to read", path, e))?;

    let tables: Tables = serde_json::from_str(&contents)
        .map_err(|e| store_error("Corrupt store file", path, e))?;
    tracing::debug!(
        "Loaded store from {:?} ({} meals, {} profiles)",
        path,
        tables.meals.rows.len(),
        tables.profiles.rows.len()
    );
    Ok(tables)
}

/// Write tables atomically under an exclusive lock: temp file, fsync,
/// rename over the previous file
fn save_tables(path: &Path, tables: &Tables) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)
        .map_err(|e| store_error("Failed to create directory for", path, e))?;

    let contents =
        serde_json::to_string(tables).map_err(|e| store_error("Failed to serialize", path, e))?;

    let lock = open_lock(path).map_err(|e| store_error("Failed to lock", path, e))?;
    lock.lock_exclusive()
        .map_err(|e| store_error("Failed to lock", path, e))?;
    let written = write_atomically(path, parent, contents.as_bytes());
    let _ = lock.unlock();
    written?;

    tracing::debug!("Saved store to {:?}", path);
    Ok(())
}

fn write_atomically(path: &Path, parent: &Path, contents: &[u8]) -> Result<()> {
    let temp = NamedTempFile::new_in(parent)
        .map_err(|e| store_error("Failed to create temp file for", path, e))?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        writer
            .write_all(contents)
            .and_then(|_| writer.flush())
            .map_err(|e| store_error("Failed to write", path, e))?;
    }

    temp.as_file()
        .sync_all()
        .map_err(|e| store_error("Failed to sync", path, e))?;

    temp.persist(path)
        .map_err(|e| store_error("Failed to replace", path, e.error))?;
    Ok(())
}
