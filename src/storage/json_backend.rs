use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{config, errors::LedgerError, ledger::Ledger};

use super::{Result, StorageBackend};

const TMP_SUFFIX: &str = "tmp";

/// Stores the whole ledger as one pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at `$BUDGET_LEDGER_HOME/data.json` (or `~/.budget_ledger/data.json`).
    pub fn new_default() -> Self {
        Self::new(config::data_file())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for JsonStorage {
    fn load(&self) -> Result<Option<Ledger>> {
        if !self.path.exists() {
            return Ok(None);
        }
        load_ledger_from_path(&self.path).map(Some)
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        save_ledger_to_path(ledger, &self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Writes the ledger by staging to `<file>.tmp` and renaming over the target,
/// so readers see either the previous document or the new one.
pub fn save_ledger_to_path(ledger: &Ledger, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(ledger)?;
    let tmp = tmp_path(path);
    write_file(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load_ledger_from_path(path: &Path) -> Result<Ledger> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| {
        LedgerError::Persistence(format!("cannot parse `{}`: {}", path.display(), err))
    })
}

pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_file(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage_with_temp_dir() -> (JsonStorage, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let storage = JsonStorage::new(temp.path().join("nested").join("data.json"));
        (storage, temp)
    }

    #[test]
    fn missing_file_loads_as_none() {
        let (storage, _guard) = storage_with_temp_dir();
        assert!(storage.load().expect("load").is_none());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let (storage, _guard) = storage_with_temp_dir();
        let ledger = Ledger::new();
        storage.save(&ledger).expect("save ledger");
        let loaded = storage.load().expect("load ledger").expect("present");
        assert_eq!(loaded, ledger);
        assert!(!tmp_path(storage.path()).exists());
    }

    #[test]
    fn corrupt_file_is_a_persistence_error() {
        let (storage, _guard) = storage_with_temp_dir();
        fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
        fs::write(storage.path(), "{ not json").unwrap();
        let err = storage.load().expect_err("corrupt file must fail");
        assert!(err.is_persistence());
    }

    #[test]
    fn tmp_path_appends_suffix() {
        assert_eq!(
            tmp_path(Path::new("/x/data.json")),
            PathBuf::from("/x/data.json.tmp")
        );
    }
}
