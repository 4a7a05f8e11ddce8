//! File-backed vector index storing one JSONL file per collection.

use super::{CollectionHandle, CollectionStatus, IndexEntry, VectorIndex, nearest};
use crate::error::IndexError;
use async_trait::async_trait;
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::Deserialize;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// File-backed index; every collection is an append-only JSONL file.
#[derive(Debug)]
pub struct FileIndex {
    /// Root directory for collection files.
    root: PathBuf,
    /// Ids per collection, read from disk on the first append.
    ///
    /// The lock also serializes appends against whole-file rewrites.
    known_ids: Mutex<HashMap<String, HashSet<String>>>,
}

/// Just the id of a stored line.
#[derive(Deserialize)]
struct StoredId {
    id: String,
}

impl FileIndex {
    /// Open (creating if needed) an index rooted at the given directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, IndexError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        info!("opened file index (root={})", root.display());
        Ok(Self {
            root,
            known_ids: Mutex::new(HashMap::new()),
        })
    }

    /// Path to a collection's JSONL file.
    fn collection_path(&self, name: &str) -> Result<PathBuf, IndexError> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\'])
            && !name.starts_with('.');
        if !valid {
            return Err(IndexError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(format!("{name}.jsonl")))
    }

    /// Path to the temporary rewrite file for a collection.
    fn temp_path(&self, name: &str) -> Result<PathBuf, IndexError> {
        let path = self.collection_path(name)?;
        Ok(path.with_extension("jsonl.tmp"))
    }

    /// Path of an existing collection, failing when it is absent.
    fn existing_path(&self, name: &str) -> Result<PathBuf, IndexError> {
        let path = self.collection_path(name)?;
        if !path.exists() {
            return Err(IndexError::CollectionNotFound(name.to_string()));
        }
        Ok(path)
    }

    /// Load all entries for a collection.
    fn load_entries(&self, path: &Path) -> Result<Vec<IndexEntry>, IndexError> {
        let file = OpenOptions::new().read(true).open(path)?;
        let reader = BufReader::new(file);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: IndexEntry = serde_json::from_str(&line)?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Collect the ids of a collection file. Unreadable lines are skipped.
    fn load_ids(&self, path: &Path) -> Result<HashSet<String>, IndexError> {
        let file = OpenOptions::new().read(true).open(path)?;
        let mut ids = HashSet::new();
        for (number, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<StoredId>(&line) {
                Ok(stored) => {
                    ids.insert(stored.id);
                }
                Err(err) => warn!(
                    "skipping unreadable index line (path={}, line={}, error={})",
                    path.display(),
                    number + 1,
                    err
                ),
            }
        }
        Ok(ids)
    }

    /// Rewrite a collection's entries atomically.
    fn write_entries(&self, name: &str, entries: &[IndexEntry]) -> Result<(), IndexError> {
        let path = self.collection_path(name)?;
        let temp_path = self.temp_path(name)?;
        {
            let mut file = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&temp_path)?;
            for entry in entries {
                let line = serde_json::to_string(entry)?;
                writeln!(file, "{line}")?;
            }
        }
        std::fs::rename(temp_path, path)?;
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for FileIndex {
    async fn create_collection_if_absent(
        &self,
        name: &str,
    ) -> Result<(CollectionHandle, CollectionStatus), IndexError> {
        let path = self.collection_path(name)?;
        let mut known_ids = self.known_ids.lock();
        let status = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => {
                info!("created collection file (path={})", path.display());
                known_ids.insert(name.to_string(), HashSet::new());
                CollectionStatus::Created
            }
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                CollectionStatus::AlreadyExists
            }
            Err(err) => return Err(IndexError::Unreachable(err.to_string())),
        };
        Ok((CollectionHandle::new(name), status))
    }

    /// Store an entry by appending to the collection file.
    async fn add(
        &self,
        collection: &CollectionHandle,
        entry: IndexEntry,
    ) -> Result<(), IndexError> {
        let path = self.existing_path(collection.name())?;
        let mut known_ids = self.known_ids.lock();
        let ids = match known_ids.entry(collection.name().to_string()) {
            Entry::Occupied(ids) => ids.into_mut(),
            Entry::Vacant(slot) => slot.insert(self.load_ids(&path)?),
        };
        if ids.contains(&entry.id) {
            return Err(IndexError::DuplicateId(entry.id));
        }
        let mut file = OpenOptions::new().append(true).open(&path)?;
        let line = serde_json::to_string(&entry)?;
        writeln!(file, "{line}")?;
        ids.insert(entry.id.clone());
        debug!(
            "appended index entry (collection={}, id={}, document_len={})",
            collection.name(),
            entry.id,
            entry.document.len()
        );
        Ok(())
    }

    async fn query(
        &self,
        collection: &CollectionHandle,
        query: &[f32],
        top_k: usize,
    ) -> Result<Vec<IndexEntry>, IndexError> {
        let path = self.existing_path(collection.name())?;
        let entries = {
            let _guard = self.known_ids.lock();
            self.load_entries(&path)?
        };
        let results = nearest(&entries, query, top_k);
        debug!(
            "file query (collection={}, size={}, returned={})",
            collection.name(),
            entries.len(),
            results.len()
        );
        Ok(results)
    }

    /// Delete an entry by rewriting the collection without it.
    async fn delete(&self, collection: &CollectionHandle, id: &str) -> Result<(), IndexError> {
        let path = self.existing_path(collection.name())?;
        let mut known_ids = self.known_ids.lock();
        let mut entries = self.load_entries(&path)?;
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() == before {
            return Err(IndexError::RecordNotFound(id.to_string()));
        }
        self.write_entries(collection.name(), &entries)?;
        if let Some(ids) = known_ids.get_mut(collection.name()) {
            ids.remove(id);
        }
        debug!(
            "deleted index entry (collection={}, id={}, remaining={})",
            collection.name(),
            id,
            entries.len()
        );
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<bool, IndexError> {
        let path = self.collection_path(name)?;
        let mut known_ids = self.known_ids.lock();
        known_ids.remove(name);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                info!("deleted collection file (path={})", path.display());
                Ok(true)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(IndexError::Io(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn entry(id: &str, embedding: Vec<f32>) -> IndexEntry {
        let mut metadata = BTreeMap::new();
        metadata.insert("id".to_string(), id.to_string());
        IndexEntry {
            id: id.to_string(),
            document: format!("doc {id}"),
            embedding,
            metadata,
        }
    }

    #[tokio::test]
    async fn entries_survive_reopen() {
        let temp = tempdir().expect("tempdir");
        {
            let index = FileIndex::open(temp.path()).expect("index");
            let (handle, status) = index
                .create_collection_if_absent("agent")
                .await
                .expect("create");
            assert_eq!(status, CollectionStatus::Created);
            index.add(&handle, entry("a", vec![1.0, 0.0])).await.expect("add");
            index.add(&handle, entry("b", vec![0.0, 1.0])).await.expect("add");
        }

        let index = FileIndex::open(temp.path()).expect("reopen");
        let (handle, status) = index
            .create_collection_if_absent("agent")
            .await
            .expect("create again");
        assert_eq!(status, CollectionStatus::AlreadyExists);
        let results = index.query(&handle, &[0.0, 1.0], 10).await.expect("query");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0], entry("b", vec![0.0, 1.0]));
    }

    #[tokio::test]
    async fn delete_rewrites_collection() {
        let temp = tempdir().expect("tempdir");
        let index = FileIndex::open(temp.path()).expect("index");
        let (handle, _) = index.create_collection_if_absent("c").await.expect("create");
        index.add(&handle, entry("a", vec![1.0])).await.expect("add");
        index.add(&handle, entry("b", vec![2.0])).await.expect("add");

        index.delete(&handle, "a").await.expect("delete");
        let err = index.delete(&handle, "a").await.unwrap_err();
        assert!(matches!(err, IndexError::RecordNotFound(_)));

        let results = index.query(&handle, &[1.0], 10).await.expect("query");
        let ids: Vec<&str> = results.iter().map(|entry| entry.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
        assert!(!temp.path().join("c.jsonl.tmp").exists());
    }

    #[tokio::test]
    async fn delete_collection_removes_file() {
        let temp = tempdir().expect("tempdir");
        let index = FileIndex::open(temp.path()).expect("index");
        let (handle, _) = index.create_collection_if_absent("c").await.expect("create");
        assert!(temp.path().join("c.jsonl").exists());

        assert!(index.delete_collection("c").await.expect("delete"));
        assert!(!temp.path().join("c.jsonl").exists());
        assert!(!index.delete_collection("c").await.expect("delete again"));

        let err = index.add(&handle, entry("a", vec![1.0])).await.unwrap_err();
        assert!(matches!(err, IndexError::CollectionNotFound(_)));
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected_after_reopen() {
        let temp = tempdir().expect("tempdir");
        {
            let index = FileIndex::open(temp.path()).expect("index");
            let (handle, _) = index.create_collection_if_absent("c").await.expect("create");
            index.add(&handle, entry("a", vec![1.0])).await.expect("add");
            let err = index.add(&handle, entry("a", vec![1.0])).await.unwrap_err();
            assert!(matches!(err, IndexError::DuplicateId(_)));
        }

        let index = FileIndex::open(temp.path()).expect("reopen");
        let (handle, _) = index.create_collection_if_absent("c").await.expect("create");
        let err = index.add(&handle, entry("a", vec![2.0])).await.unwrap_err();
        assert!(matches!(err, IndexError::DuplicateId(_)));
        index.add(&handle, entry("b", vec![2.0])).await.expect("add");
    }

    #[tokio::test]
    async fn deleted_ids_can_be_added_again() {
        let temp = tempdir().expect("tempdir");
        let index = FileIndex::open(temp.path()).expect("index");
        let (handle, _) = index.create_collection_if_absent("c").await.expect("create");
        index.add(&handle, entry("a", vec![1.0])).await.expect("add");
        index.delete(&handle, "a").await.expect("delete");
        index.add(&handle, entry("a", vec![1.0])).await.expect("re-add");
    }

    #[tokio::test]
    async fn unreadable_lines_do_not_block_appends() {
        let temp = tempdir().expect("tempdir");
        {
            let index = FileIndex::open(temp.path()).expect("index");
            let (handle, _) = index.create_collection_if_absent("c").await.expect("create");
            index.add(&handle, entry("a", vec![1.0])).await.expect("add");
        }
        let path = temp.path().join("c.jsonl");
        let mut file = OpenOptions::new().append(true).open(&path).expect("open");
        writeln!(file, "{{not json").expect("corrupt");

        let index = FileIndex::open(temp.path()).expect("reopen");
        let handle = CollectionHandle::new("c");
        index.add(&handle, entry("b", vec![2.0])).await.expect("add");
        let err = index.add(&handle, entry("a", vec![3.0])).await.unwrap_err();
        assert!(matches!(err, IndexError::DuplicateId(_)));
        let contents = std::fs::read_to_string(&path).expect("read");
        assert_eq!(contents.lines().count(), 3);
    }

    #[tokio::test]
    async fn rejects_path_like_collection_names() {
        let temp = tempdir().expect("tempdir");
        let index = FileIndex::open(temp.path()).expect("index");
        let err = index
            .create_collection_if_absent("../escape")
            .await
            .unwrap_err();
        assert!(matches!(err, IndexError::InvalidName(_)));
    }
}
