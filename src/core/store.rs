use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::config::SwitchConfig;
use crate::core::lock::{self, LockManager, LockOptions, LOCK_FILE};
use crate::core::validate::{self, DeleteTarget, Target};
use crate::error::{Result, SwitchError, ErrorContext};

/// Marker line written above every stored snapshot
pub const TAG: &str = "# npmrc-switch generated";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub name: String,
    /// Content with the tag line removed
    pub content: String,
}

/// Outcome of a delete, one entry per snapshot touched
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Set when every snapshot was targeted (`all`)
    pub bulk: bool,
    pub removed: Vec<String>,
    pub failed: Vec<SwitchError>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A file is a snapshot iff it exists and starts with the tag
pub fn is_valid_snapshot(path: &Path) -> bool {
    path.is_file()
        && fs::read(path)
            .map(|bytes| bytes.starts_with(TAG.as_bytes()))
            .unwrap_or(false)
}

/// Drop the leading tag line, leaving everything else untouched
pub fn strip_tag(contents: &str) -> &str {
    match contents.strip_prefix(TAG) {
        Some(rest) => rest
            .strip_prefix("\r\n")
            .or_else(|| rest.strip_prefix('\n'))
            .unwrap_or(rest),
        None => contents,
    }
}

pub struct SnapshotStore {
    directory: PathBuf,
    npmrc: PathBuf,
    lock: LockManager,
}

impl SnapshotStore {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(directory: P, npmrc: Q, options: LockOptions) -> Self {
        let directory = directory.as_ref().to_path_buf();
        Self {
            lock: LockManager::new(&directory, options),
            npmrc: npmrc.as_ref().to_path_buf(),
            directory,
        }
    }

    pub fn from_config(config: &SwitchConfig) -> Result<Self> {
        Ok(Self::new(
            config.directory_path()?,
            config.npmrc_path()?,
            config.lock_options(),
        ))
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn npmrc(&self) -> &Path {
        &self.npmrc
    }

    pub fn lock(&self) -> &LockManager {
        &self.lock
    }

    pub fn snapshot_path(&self, name: &str) -> PathBuf {
        self.directory.join(name)
    }

    /// Store the active configuration under `name`
    pub fn save(&self, name: &str) -> Result<()> {
        let name = validate::snapshot_name(name)?;
        lock::ensure_initialized(&self.directory)?;

        self.lock.with_lock(|| {
            let content = self.read_active()?;
            let content = validate::snapshot_content(name, &content)?;
            self.write_snapshot(name, content)
        })
    }

    /// Store `content` under `name`
    pub fn save_content(&self, name: &str, content: &str) -> Result<()> {
        let name = validate::snapshot_name(name)?;
        let content = validate::snapshot_content(name, content)?;
        lock::ensure_initialized(&self.directory)?;

        self.lock.with_lock(|| self.write_snapshot(name, content))
    }

    /// Replace the active configuration with the snapshot `name`
    pub fn load(&self, name: &str) -> Result<()> {
        let name = validate::snapshot_name(name)?;
        lock::ensure_initialized(&self.directory)?;

        self.lock.with_lock(|| {
            let snapshot = self.read_snapshot(name)?;
            self.write_active(&snapshot.content)?;
            debug!("loaded {} into {}", name, self.npmrc.display());
            Ok(())
        })
    }

    /// Delete one snapshot, or every snapshot for `all`
    pub fn delete(&self, name: &str) -> Result<BatchReport> {
        let target = validate::delete_target(name)?;
        lock::ensure_initialized(&self.directory)?;

        self.lock.with_lock(|| {
            let mut report = BatchReport::default();
            match target {
                DeleteTarget::Named(name) => {
                    let path = self.snapshot_path(name);
                    if !is_valid_snapshot(&path) {
                        return Err(SwitchError::not_found("configuration", name));
                    }
                    remove_snapshot(&path)?;
                    report.removed.push(name.to_string());
                }
                DeleteTarget::All => {
                    report.bulk = true;
                    for entry in self.sorted_snapshots()? {
                        match entry.and_then(|name| {
                            remove_snapshot(&self.snapshot_path(&name)).map(|_| name)
                        }) {
                            Ok(name) => report.removed.push(name),
                            Err(e) => {
                                debug!("delete all: {}", e);
                                report.failed.push(e);
                            }
                        }
                    }
                }
            }
            Ok(report)
        })
    }

    /// Untagged content for a snapshot, every snapshot (`all`) or the
    /// active configuration (`current`).
    pub fn view(&self, name: &str) -> Result<Vec<Result<Snapshot>>> {
        let target = validate::view_target(name)?;
        lock::ensure_initialized(&self.directory)?;

        self.lock.with_lock(|| match target {
            Target::All => Ok(self
                .sorted_snapshots()?
                .into_iter()
                .map(|entry| entry.and_then(|name| self.read_snapshot(&name)))
                .collect()),
            Target::Current => {
                let content = self.read_active()?;
                let name = self
                    .npmrc
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| self.npmrc.display().to_string());
                Ok(vec![Ok(Snapshot { name, content })])
            }
            Target::Named(name) => Ok(vec![Ok(self.read_snapshot(name)?)]),
        })
    }

    /// Empty the active configuration. Stored snapshots are kept.
    pub fn clear(&self) -> Result<()> {
        lock::ensure_initialized(&self.directory)?;
        self.lock.with_lock(|| self.write_active(""))
    }

    /// Names of valid snapshots, read straight from the directory on each call
    pub fn snapshots(&self) -> Result<impl Iterator<Item = Result<String>> + '_> {
        let entries = fs::read_dir(&self.directory)
            .with_io_context(|| format!("reading directory {}", self.directory.display()))?;

        Ok(entries.filter_map(move |entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    return Some(Err(SwitchError::Io {
                        source: e,
                        context: format!("reading entry in {}", self.directory.display()),
                    }))
                }
            };
            let name = entry.file_name().into_string().ok()?;
            if name == LOCK_FILE || !is_valid_snapshot(&entry.path()) {
                return None;
            }
            Some(Ok(name))
        }))
    }

    fn sorted_snapshots(&self) -> Result<Vec<Result<String>>> {
        let mut entries: Vec<_> = self.snapshots()?.collect();
        entries.sort_by(|a, b| match (a, b) {
            (Ok(a), Ok(b)) => a.cmp(b),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => std::cmp::Ordering::Equal,
        });
        Ok(entries)
    }

    fn read_snapshot(&self, name: &str) -> Result<Snapshot> {
        let path = self.snapshot_path(name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SwitchError::not_found("configuration", name));
            }
            Err(e) => {
                return Err(SwitchError::Io {
                    source: e,
                    context: format!("reading snapshot {}", path.display()),
                })
            }
        };
        if !bytes.starts_with(TAG.as_bytes()) {
            return Err(SwitchError::not_found("configuration", name));
        }
        let contents = String::from_utf8(bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
            .with_io_context(|| format!("decoding snapshot {}", path.display()))?;

        Ok(Snapshot {
            name: name.to_string(),
            content: strip_tag(&contents).to_string(),
        })
    }

    fn write_snapshot(&self, name: &str, content: &str) -> Result<()> {
        let path = self.snapshot_path(name);
        fs::write(&path, format!("{}\n{}", TAG, content))
            .with_io_context(|| format!("writing snapshot {}", path.display()))?;
        debug!("saved {} ({} bytes)", path.display(), content.len());
        Ok(())
    }

    fn read_active(&self) -> Result<String> {
        match fs::read_to_string(&self.npmrc) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(SwitchError::not_found(
                "current configuration",
                self.npmrc.display().to_string(),
            )),
            Err(e) => Err(SwitchError::Io {
                source: e,
                context: format!("reading {}", self.npmrc.display()),
            }),
        }
    }

    fn write_active(&self, content: &str) -> Result<()> {
        if let Some(parent) = self.npmrc.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_io_context(|| format!("creating directory {}", parent.display()))?;
        }
        fs::write(&self.npmrc, content)
            .with_io_context(|| format!("writing {}", self.npmrc.display()))
    }
}

fn remove_snapshot(path: &Path) -> Result<()> {
    fs::remove_file(path)
        .with_io_context(|| format!("removing snapshot {}", path.display()))?;
    debug!("removed {}", path.display());
    Ok(())
}
