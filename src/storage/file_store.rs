use std::{
    collections::BTreeMap,
    fs::File,
    io::{ErrorKind, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use anyhow::Result;
use fs4::fs_std::FileExt;
use tracing::{debug, warn};

use super::KeyValueStore;

pub const STORE_FILE_NAME: &str = "store.json";

/// The main realization of [KeyValueStore]. Keys live in memory and every change is written
/// through to a single JSON file.
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store inside `dir`. A missing or corrupted file opens as an empty store.
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(STORE_FILE_NAME);
        let values = read_values(&path)?;
        debug!("Opened store {path:?} with {} keys", values.len());
        Ok(Self { path, values })
    }

    /// Applies `change` to the latest on-disk state and writes it back, so that keys changed by
    /// another process in the meantime are kept.
    fn write_through(&mut self, change: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let mut file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;
        // Released when the file is closed.
        file.lock_exclusive()?;

        let mut content = String::new();
        file.read_to_string(&mut content)?;
        let mut values = parse_values(&self.path, &content);
        change(&mut values);

        let serialized = serde_json::to_vec_pretty(&values)?;
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&serialized)?;
        file.flush()?;

        self.values = values;
        Ok(())
    }
}

fn read_values(path: &Path) -> Result<BTreeMap<String, String>> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => Err(e)?,
    };
    file.lock_shared()?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(parse_values(path, &content))
}

fn parse_values(path: &Path, content: &str) -> BTreeMap<String, String> {
    if content.trim().is_empty() {
        return BTreeMap::new();
    }
    match serde_json::from_str(content) {
        Ok(values) => values,
        Err(e) => {
            // Starting over is better than refusing to track time at all.
            warn!("Store {path:?} is corrupted, starting with an empty one: {e}");
            BTreeMap::new()
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.write_through(|values| {
            values.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if !self.values.contains_key(key) {
            return Ok(());
        }
        self.write_through(|values| {
            values.remove(key);
        })
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.values.keys().cloned().collect())
    }
}
