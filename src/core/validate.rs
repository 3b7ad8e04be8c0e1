//! Name and content checks shared by every command.
//!
//! Each check is a pure function returning a typed result, so handlers can
//! reject bad input before any file or the lock token is touched.

use crate::core::lock::LOCK_FILE;
use crate::error::{Result, SwitchError};

/// Selects every stored snapshot in bulk operations
pub const ALL: &str = "all";
/// Selects the active configuration in `view`
pub const CURRENT: &str = "current";

/// What a view command refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    All,
    Current,
    Named(&'a str),
}

/// What a delete command refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteTarget<'a> {
    All,
    Named(&'a str),
}

/// A name that may be used as a snapshot file name
pub fn snapshot_name(name: &str) -> Result<&str> {
    let name = non_empty(name)?;
    if name == ALL {
        return Err(SwitchError::invalid_name(name, "`all` is a reserved word for configurations"));
    }
    if name == LOCK_FILE {
        return Err(SwitchError::invalid_name(name, "reserved for the lock file"));
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(SwitchError::invalid_name(name, "must be a plain file name"));
    }
    Ok(name)
}

/// `all` or a single snapshot name
pub fn delete_target(name: &str) -> Result<DeleteTarget<'_>> {
    match non_empty(name)? {
        ALL => Ok(DeleteTarget::All),
        other => snapshot_name(other).map(DeleteTarget::Named),
    }
}

/// `all`, `current` or a single snapshot name
pub fn view_target(name: &str) -> Result<Target<'_>> {
    match non_empty(name)? {
        ALL => Ok(Target::All),
        CURRENT => Ok(Target::Current),
        other => snapshot_name(other).map(Target::Named),
    }
}

/// Content that may be stored as a snapshot
pub fn snapshot_content<'a>(name: &str, content: &'a str) -> Result<&'a str> {
    if content.is_empty() {
        return Err(SwitchError::EmptyContent { name: name.to_string() });
    }
    Ok(content)
}

fn non_empty(name: &str) -> Result<&str> {
    if name.is_empty() {
        return Err(SwitchError::invalid_name(name, "name must be valid!"));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_reserved() {
        assert!(matches!(snapshot_name(""), Err(SwitchError::InvalidName { .. })));
        assert!(matches!(snapshot_name("all"), Err(SwitchError::InvalidName { .. })));
        assert!(matches!(snapshot_name(LOCK_FILE), Err(SwitchError::InvalidName { .. })));
    }

    #[test]
    fn rejects_paths() {
        for name in ["../x", "a/b", "a\\b", ".", ".."] {
            assert!(snapshot_name(name).is_err(), "{} accepted", name);
        }
    }

    #[test]
    fn accepts_plain_names() {
        assert_eq!(snapshot_name("work").unwrap(), "work");
        assert_eq!(snapshot_name("current").unwrap(), "current");
        assert_eq!(snapshot_name(".hidden").unwrap(), ".hidden");
    }

    #[test]
    fn delete_targets() {
        assert_eq!(delete_target("all").unwrap(), DeleteTarget::All);
        assert_eq!(delete_target("work").unwrap(), DeleteTarget::Named("work"));
        assert_eq!(delete_target("current").unwrap(), DeleteTarget::Named("current"));
        assert!(delete_target("").is_err());
    }

    #[test]
    fn view_targets() {
        assert_eq!(view_target("all").unwrap(), Target::All);
        assert_eq!(view_target("current").unwrap(), Target::Current);
        assert_eq!(view_target("work").unwrap(), Target::Named("work"));
        assert!(view_target("").is_err());
    }

    #[test]
    fn empty_content_is_rejected() {
        match snapshot_content("work", "") {
            Err(SwitchError::EmptyContent { name }) => assert_eq!(name, "work"),
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(snapshot_content("work", "x=1").unwrap(), "x=1");
    }
}
