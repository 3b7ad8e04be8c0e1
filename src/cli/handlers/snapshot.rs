use crate::core::{Snapshot, SnapshotStore};
use crate::core::validate::CURRENT;
use crate::error::{Result, SwitchError};
use crate::cli::ui::{print_error, print_snapshot, print_success, print_warning};

/// Handle `save <name>`
pub fn handle_save(store: &SnapshotStore, name: &str) -> Result<()> {
    store.save(name)?;
    print_success(&format!("Saved configuration '{}'", name));
    if name == CURRENT {
        print_warning("`view current` shows the live .npmrc, use `load current` to restore this one");
    }
    Ok(())
}

/// Handle `load <name>`
pub fn handle_load(store: &SnapshotStore, name: &str) -> Result<()> {
    store.load(name)?;
    print_success(&format!("Loaded configuration '{}'", name));
    Ok(())
}

/// Handle `delete <name|all>`
pub fn handle_delete(store: &SnapshotStore, name: &str) -> Result<()> {
    let report = store.delete(name)?;

    for removed in &report.removed {
        print_success(&format!("Removed the {} configuration", removed));
    }
    for failure in &report.failed {
        print_error(failure);
    }

    if report.bulk {
        if report.removed.is_empty() && report.is_clean() {
            print_warning("No saved configurations found");
        } else {
            print_success(&format!("Removed {} configuration(s)", report.removed.len()));
        }
    }

    if !report.is_clean() {
        return Err(SwitchError::PartialFailure {
            operation: "delete all".to_string(),
            failed: report.failed.len(),
        });
    }
    Ok(())
}

/// Handle `view <name|all|current>`
pub fn handle_view(store: &SnapshotStore, name: &str) -> Result<()> {
    let views = store.view(name)?;

    if views.is_empty() {
        print_warning("No saved configurations found");
        return Ok(());
    }

    let mut failed = 0;
    for view in views {
        match view {
            Ok(Snapshot { name, content }) => print_snapshot(&name, &content),
            Err(e) => {
                print_error(&e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(SwitchError::PartialFailure {
            operation: "view all".to_string(),
            failed,
        });
    }
    Ok(())
}

/// Handle `clear`
pub fn handle_clear(store: &SnapshotStore) -> Result<()> {
    store.clear()?;
    print_success(&format!("Cleared {}", store.npmrc().display()));
    Ok(())
}
