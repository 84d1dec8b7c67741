//! Manifest persistence
//!
//! The manifest is a pretty-printed JSON snapshot of the module set, keyed by
//! module id. It is the registry's boot cache: loading is deliberately
//! tolerant (a broken manifest never takes the registry down), while writing
//! goes through a temp file so a crash mid-write cannot leave a torn file.

use crate::descriptor::{ModuleDescriptor, ModuleRecord};
use crate::errors::RegistryError;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ManifestStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read every usable record out of the manifest.
    ///
    /// A missing or unparseable manifest is treated as empty. Records that
    /// fail to deserialize, or that carry an empty id, are skipped one by one
    /// so a single bad entry cannot poison the rest.
    pub fn load(&self) -> Vec<ModuleRecord> {
        if !self.exists() {
            return Vec::new();
        }
        let Ok(content) = fs::read_to_string(&self.path) else {
            warn!("Unreadable module manifest at {}", self.path.display());
            return Vec::new();
        };
        let Ok(value) = serde_json::from_str::<Value>(&content) else {
            warn!(
                "Malformed module manifest at {}; treating it as empty",
                self.path.display()
            );
            return Vec::new();
        };

        let entries: Vec<Value> = match value {
            Value::Object(map) => map.into_iter().map(|(_, entry)| entry).collect(),
            Value::Array(list) => list,
            _ => {
                warn!(
                    "Module manifest at {} is not a map or list; treating it as empty",
                    self.path.display()
                );
                return Vec::new();
            }
        };

        let mut records = Vec::new();
        for entry in entries {
            match serde_json::from_value::<ModuleRecord>(entry) {
                Ok(record) if !record.id.is_empty() => records.push(record),
                Ok(_) => debug!("Skipping manifest record with an empty id"),
                Err(err) => debug!("Skipping malformed manifest record: {}", err),
            }
        }
        records
    }

    /// Write the full module set, replacing whatever was there.
    pub fn write(&self, modules: &BTreeMap<String, ModuleDescriptor>) -> Result<(), RegistryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| RegistryError::ManifestDir {
                    path: parent.display().to_string(),
                    source,
                })?;
            }
        }

        let content = serde_json::to_string_pretty(modules)?;

        let temp_path = self.path.with_extension("json.tmp");
        {
            let file = fs::File::create(&temp_path)?;
            let mut writer = std::io::BufWriter::new(file);
            writer.write_all(content.as_bytes())?;
            writer.flush()?;
        }
        fs::rename(&temp_path, &self.path)?;

        debug!(
            "Wrote {} module(s) to manifest {}",
            modules.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Remove the manifest file. Deleting an absent manifest is a no-op.
    pub fn delete(&self) -> Result<(), RegistryError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(RegistryError::Io(err)),
        }
    }
}
