use crate::errors::{AppError, AppResult};
use crate::ui::messages::{confirm, info, warning};
use std::path::Path;

/// Check that `path` may be (over)written.
///
/// A missing file or `force` passes; otherwise the user is asked, and a
/// refusal cancels the export.
pub(crate) fn ensure_writable(path: &Path, force: bool) -> AppResult<()> {
    if !path.exists() || force {
        return Ok(());
    }

    warning(format!("The file '{}' already exists.", path.display()));

    if confirm("Overwrite?") {
        info("Existing file will be overwritten.");
        Ok(())
    } else {
        Err(AppError::Export(format!(
            "cancelled, '{}' was not overwritten",
            path.display()
        )))
    }
}
