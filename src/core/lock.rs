//! Cooperative lock token shared by every invocation using one storage directory.
//!
//! The token is a plain file holding either nothing (free) or the decimal id
//! of the owning process. Acquisition polls the token and writes its own id
//! once the value reads as free. The read and the write are separate steps,
//! so two processes polling on the same tick can both believe they won.
//! Release only clears the token when it still carries the caller's id.
//!
//! Lock file path: <directory>/switch-lock
//! Lock is released on Drop.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use log::{debug, error, warn};

use crate::error::{Result, SwitchError, ErrorContext};

pub const LOCK_FILE: &str = "switch-lock";

const FREE: u32 = 0;

#[derive(Debug, Clone)]
pub struct LockOptions {
    /// Value written into the token while held
    pub owner: u32,
    pub poll_interval: Duration,
    /// Attempts before the "still waiting" notice
    pub warn_after: u32,
    /// Attempts before giving up with `LockTimeout`
    pub max_attempts: u32,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            owner: std::process::id(),
            poll_interval: Duration::from_millis(200),
            warn_after: 10,
            max_attempts: 20,
        }
    }
}

pub fn lock_file_path(directory: &Path) -> PathBuf {
    directory.join(LOCK_FILE)
}

/// Create the storage directory and an empty token if either is missing.
/// An existing token is left as is.
pub fn ensure_initialized(directory: &Path) -> Result<()> {
    fs::create_dir_all(directory)
        .with_io_context(|| format!("creating directory {}", directory.display()))?;

    let path = lock_file_path(directory);
    OpenOptions::new()
        .create(true)
        .write(true)
        .open(&path)
        .with_io_context(|| format!("creating lock file {}", path.display()))?;
    Ok(())
}

/// Leading decimal digits of the token, `0` when there are none
pub fn parse_owner(contents: &str) -> u32 {
    let digits: String = contents
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(FREE)
}

fn read_owner(path: &Path) -> Result<u32> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(parse_owner(&contents)),
        Err(e) if e.kind() == ErrorKind::NotFound || e.kind() == ErrorKind::InvalidData => Ok(FREE),
        Err(e) => Err(SwitchError::Io {
            source: e,
            context: format!("reading lock file {}", path.display()),
        }),
    }
}

pub struct LockManager {
    directory: PathBuf,
    options: LockOptions,
}

impl LockManager {
    pub fn new<P: AsRef<Path>>(directory: P, options: LockOptions) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            options,
        }
    }

    pub fn path(&self) -> PathBuf {
        lock_file_path(&self.directory)
    }

    pub fn options(&self) -> &LockOptions {
        &self.options
    }

    /// Current owner id, `None` when the token is free
    pub fn holder(&self) -> Result<Option<u32>> {
        let owner = read_owner(&self.path())?;
        Ok((owner != FREE).then_some(owner))
    }

    /// Wait for the token to become free and claim it.
    pub fn acquire(&self) -> Result<LockGuard<'_>> {
        let path = self.path();

        if read_owner(&path)? == FREE {
            return self.claim();
        }

        let mut attempts = 0;
        loop {
            thread::sleep(self.options.poll_interval);
            attempts += 1;

            if read_owner(&path)? == FREE {
                return self.claim();
            }
            if attempts >= self.options.max_attempts {
                return Err(SwitchError::LockTimeout { path, attempts });
            }
            if attempts == self.options.warn_after {
                warn!("Still waiting to acquire lockfile {}...", path.display());
            }
        }
    }

    /// Clear the token if this owner holds it; otherwise do nothing.
    pub fn release(&self) -> Result<()> {
        let path = self.path();
        let owner = read_owner(&path)?;
        if owner != self.options.owner {
            debug!("lock {} held by {}, not releasing", path.display(), owner);
            return Ok(());
        }
        fs::write(&path, "")
            .with_io_context(|| format!("clearing lock file {}", path.display()))?;
        debug!("released lock {} (owner {})", path.display(), self.options.owner);
        Ok(())
    }

    /// Run `f` while holding the lock. The lock is released on every exit path.
    pub fn with_lock<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let guard = self.acquire()?;
        let result = f();
        let released = guard.release();
        let value = result?;
        released?;
        Ok(value)
    }

    fn claim(&self) -> Result<LockGuard<'_>> {
        let path = self.path();
        fs::write(&path, self.options.owner.to_string())
            .with_io_context(|| format!("writing lock file {}", path.display()))?;
        debug!("acquired lock {} (owner {})", path.display(), self.options.owner);
        Ok(LockGuard { manager: self, released: false })
    }
}

pub struct LockGuard<'a> {
    manager: &'a LockManager,
    released: bool,
}

impl LockGuard<'_> {
    pub fn path(&self) -> PathBuf {
        self.manager.path()
    }

    /// Release now and report any error, instead of waiting for Drop.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.manager.release()
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.manager.release() {
            error!("failed to release lock: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn options(owner: u32, max_attempts: u32) -> LockOptions {
        LockOptions {
            owner,
            poll_interval: Duration::from_millis(10),
            warn_after: 2,
            max_attempts,
        }
    }

    #[test]
    fn init_creates_empty_token_and_keeps_existing() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("nested").join("store");

        ensure_initialized(&dir).unwrap();
        assert_eq!(fs::read_to_string(lock_file_path(&dir)).unwrap(), "");

        fs::write(lock_file_path(&dir), "4242").unwrap();
        ensure_initialized(&dir).unwrap();
        assert_eq!(fs::read_to_string(lock_file_path(&dir)).unwrap(), "4242");
    }

    #[test]
    fn parse_owner_is_lenient() {
        assert_eq!(parse_owner(""), 0);
        assert_eq!(parse_owner("  \n"), 0);
        assert_eq!(parse_owner("garbage"), 0);
        assert_eq!(parse_owner("123"), 123);
        assert_eq!(parse_owner("123abc"), 123);
        assert_eq!(parse_owner(" 77\n"), 77);
        assert_eq!(parse_owner("99999999999999"), 0);
    }

    #[test]
    fn acquire_and_release() {
        let tmp = tempdir().unwrap();
        ensure_initialized(tmp.path()).unwrap();
        let lock = LockManager::new(tmp.path(), options(11, 5));

        let guard = lock.acquire().unwrap();
        assert_eq!(lock.holder().unwrap(), Some(11));
        assert_eq!(fs::read_to_string(guard.path()).unwrap(), "11");

        guard.release().unwrap();
        assert_eq!(lock.holder().unwrap(), None);
    }

    #[test]
    fn guard_releases_on_drop() {
        let tmp = tempdir().unwrap();
        ensure_initialized(tmp.path()).unwrap();
        let lock = LockManager::new(tmp.path(), options(12, 5));
        {
            let _guard = lock.acquire().unwrap();
            assert_eq!(lock.holder().unwrap(), Some(12));
        }
        assert_eq!(lock.holder().unwrap(), None);
    }

    #[test]
    fn missing_or_garbage_token_counts_as_free() {
        let tmp = tempdir().unwrap();
        fs::create_dir_all(tmp.path()).unwrap();
        let lock = LockManager::new(tmp.path(), options(13, 1));

        // no token file at all
        lock.acquire().unwrap().release().unwrap();

        fs::write(lock.path(), "not a pid").unwrap();
        let guard = lock.acquire().unwrap();
        assert_eq!(lock.holder().unwrap(), Some(13));
        drop(guard);
    }

    #[test]
    fn release_by_other_owner_is_noop() {
        let tmp = tempdir().unwrap();
        ensure_initialized(tmp.path()).unwrap();
        let owner = LockManager::new(tmp.path(), options(21, 5));
        let other = LockManager::new(tmp.path(), options(22, 5));

        let _guard = owner.acquire().unwrap();
        other.release().unwrap();
        assert_eq!(owner.holder().unwrap(), Some(21));
    }

    #[test]
    fn second_acquirer_waits_for_release() {
        let tmp = tempdir().unwrap();
        ensure_initialized(tmp.path()).unwrap();
        let dir = tmp.path().to_path_buf();

        let first = LockManager::new(&dir, options(31, 5));
        let guard = first.acquire().unwrap();

        let waiter = thread::spawn(move || {
            let second = LockManager::new(&dir, options(32, 500));
            let guard = second.acquire()?;
            let holder = second.holder()?;
            guard.release()?;
            Ok::<_, SwitchError>(holder)
        });

        thread::sleep(Duration::from_millis(100));
        assert_eq!(first.holder().unwrap(), Some(31));
        guard.release().unwrap();

        assert_eq!(waiter.join().unwrap().unwrap(), Some(32));
        assert_eq!(first.holder().unwrap(), None);
    }

    #[test]
    fn times_out_when_never_released() {
        let tmp = tempdir().unwrap();
        ensure_initialized(tmp.path()).unwrap();
        let first = LockManager::new(tmp.path(), options(41, 5));
        let second = LockManager::new(tmp.path(), options(42, 4));

        let _guard = first.acquire().unwrap();
        match second.acquire() {
            Err(SwitchError::LockTimeout { path, attempts }) => {
                assert_eq!(path, lock_file_path(tmp.path()));
                assert_eq!(attempts, 4);
            }
            other => panic!("expected timeout, got {:?}", other.map(|_| ())),
        }
        assert_eq!(first.holder().unwrap(), Some(41));
    }

    #[test]
    fn same_owner_does_not_reenter() {
        let tmp = tempdir().unwrap();
        ensure_initialized(tmp.path()).unwrap();
        let lock = LockManager::new(tmp.path(), options(51, 2));

        let _guard = lock.acquire().unwrap();
        assert!(matches!(lock.acquire(), Err(SwitchError::LockTimeout { .. })));
    }

    #[test]
    fn with_lock_releases_on_error() {
        let tmp = tempdir().unwrap();
        ensure_initialized(tmp.path()).unwrap();
        let lock = LockManager::new(tmp.path(), options(61, 5));

        let result: Result<()> = lock.with_lock(|| {
            assert_eq!(lock.holder()?, Some(61));
            Err(SwitchError::not_found("configuration", "x"))
        });
        assert!(matches!(result, Err(SwitchError::NotFound { .. })));
        assert_eq!(lock.holder().unwrap(), None);

        let value = lock.with_lock(|| Ok(7)).unwrap();
        assert_eq!(value, 7);
        assert_eq!(lock.holder().unwrap(), None);
    }

    #[test]
    fn racing_claims_last_writer_wins() {
        // Both contenders saw a free token before either wrote it.
        let tmp = tempdir().unwrap();
        ensure_initialized(tmp.path()).unwrap();
        let a = LockManager::new(tmp.path(), options(71, 5));
        let b = LockManager::new(tmp.path(), options(72, 5));
        assert_eq!(a.holder().unwrap(), None);
        assert_eq!(b.holder().unwrap(), None);

        let guard_a = a.claim().unwrap();
        let guard_b = b.claim().unwrap();
        assert_eq!(a.holder().unwrap(), Some(72));

        // a no longer owns the token, so its release must not clear b's claim
        guard_a.release().unwrap();
        assert_eq!(b.holder().unwrap(), Some(72));

        guard_b.release().unwrap();
        assert_eq!(b.holder().unwrap(), None);
    }
}
