//! Contact source.
//!
//! The engine only needs `(name, date string)` pairs. [`ContactSource`] is
//! the seam; [`ContactBook`] is a TOML file implementation stored next to
//! the config:
//!
//! ```toml
//! [[contact]]
//! name = "Ada"
//! birthday = "1990-03-15"
//!
//! [[contact]]
//! name = "Grace"
//! birthday = "--12-09"
//! ```
//!
//! Long-running callers use [`ConfiguredContactBook`], which follows a
//! `contacts_file` change without a restart.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::anniversary::RawDate;
use crate::error::{CoreError, Result};
use crate::storage::{data_dir, Config};

/// A raw record as supplied by the contact store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub name: String,
    /// `YYYY-MM-DD` or `--MM-DD`; anything else is skipped downstream.
    pub birthday: String,
}

impl ContactRecord {
    pub fn new(name: impl Into<String>, birthday: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            birthday: birthday.into(),
        }
    }
}

/// Anything that can list tracked people.
pub trait ContactSource: Send + Sync {
    /// Fetch every record with a birthday.
    ///
    /// Callers treat an error as "no records".
    fn query(&self) -> Result<Vec<ContactRecord>>;
}

impl ContactSource for Vec<ContactRecord> {
    fn query(&self) -> Result<Vec<ContactRecord>> {
        Ok(self.clone())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ContactFile {
    #[serde(default, rename = "contact")]
    contacts: Vec<ContactRecord>,
}

/// TOML-backed contact list.
#[derive(Debug, Clone)]
pub struct ContactBook {
    path: PathBuf,
}

impl ContactBook {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Open `contacts.toml` in the data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(data_dir()?.join("contacts.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn error(&self, message: impl ToString) -> CoreError {
        CoreError::Contacts {
            path: self.path.clone(),
            message: message.to_string(),
        }
    }

    fn read(&self) -> Result<ContactFile> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| self.error(e))?;
        toml::from_str(&content).map_err(|e| self.error(e))
    }

    fn read_or_default(&self) -> Result<ContactFile> {
        if self.path.exists() {
            self.read()
        } else {
            Ok(ContactFile::default())
        }
    }

    fn write(&self, file: &ContactFile) -> Result<()> {
        let content = toml::to_string_pretty(file).map_err(|e| self.error(e))?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    /// Add a contact, replacing any existing entry with the same name.
    ///
    /// Returns `true` if an entry was replaced.
    ///
    /// # Errors
    /// Returns [`CoreError::MalformedDate`] if `birthday` is not a valid raw
    /// date, or an error if the file cannot be read or written.
    pub fn add(&self, name: &str, birthday: &str) -> Result<bool> {
        let raw: RawDate = birthday.parse()?;
        let mut file = self.read_or_default()?;
        let record = ContactRecord::new(name, raw.to_string());

        let replaced = match file.contacts.iter_mut().find(|c| c.name == name) {
            Some(existing) => {
                *existing = record;
                true
            }
            None => {
                file.contacts.push(record);
                false
            }
        };
        self.write(&file)?;
        Ok(replaced)
    }

    /// Remove every contact named `name`. Returns `true` if any was removed.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or written.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let mut file = self.read_or_default()?;
        let before = file.contacts.len();
        file.contacts.retain(|c| c.name != name);
        if file.contacts.len() == before {
            return Ok(false);
        }
        self.write(&file)?;
        Ok(true)
    }
}

impl ContactSource for ContactBook {
    fn query(&self) -> Result<Vec<ContactRecord>> {
        Ok(self.read()?.contacts)
    }
}

/// The contact book named by the config file, looked up on every query.
#[derive(Debug, Clone)]
pub struct ConfiguredContactBook {
    config_path: PathBuf,
}

impl ConfiguredContactBook {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Follow the config file at its default location.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Config::default_path()?))
    }

    /// The book the config currently points at.
    ///
    /// # Errors
    /// Returns an error if the config cannot be loaded.
    pub fn current(&self) -> Result<ContactBook> {
        let config = Config::load_from(&self.config_path)?;
        Ok(ContactBook::new(config.contacts_path()?))
    }
}

impl ContactSource for ConfiguredContactBook {
    fn query(&self) -> Result<Vec<ContactRecord>> {
        self.current()?.query()
    }
}
