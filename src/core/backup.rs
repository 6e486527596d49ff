use crate::config::Config;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{confirm, warning};
use std::fs;
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::FileOptions;

pub struct BackupLogic;

impl BackupLogic {
    /// Copy the database file to `dest_file`, optionally zipping it.
    ///
    /// Returns the final backup path, or `None` if the user declined to
    /// overwrite an existing file.
    pub fn backup(
        cfg: &Config,
        dest_file: &str,
        compress: bool,
        force: bool,
    ) -> AppResult<Option<PathBuf>> {
        let src = Path::new(&cfg.database);
        let dest = Path::new(dest_file);

        if !src.exists() {
            return Err(AppError::from(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Database not found: {}", src.display()),
            )));
        }

        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let final_target = if compress {
            dest.with_extension("zip")
        } else {
            dest.to_path_buf()
        };

        if final_target.exists() && !force {
            warning(format!("The file '{}' already exists.", final_target.display()));
            if !confirm("Overwrite it?") {
                return Ok(None);
            }
        }

        // the raw copy must not land on the archive path itself
        let raw_copy = if compress && dest == final_target {
            dest.with_extension("sqlite")
        } else {
            dest.to_path_buf()
        };

        fs::copy(src, &raw_copy)?;

        let final_path = if compress {
            let zipped = compress_backup(&raw_copy)?;
            if let Err(e) = fs::remove_file(&raw_copy) {
                warning(format!("Failed to remove uncompressed backup: {e}"));
            }
            zipped
        } else {
            raw_copy
        };

        tracing::info!(path = %final_path.display(), compress, "backup written");

        let pool = DbPool::new(&cfg.database)?;
        audit(
            &pool.conn,
            "backup",
            &final_path.to_string_lossy(),
            if compress {
                "Backup created and compressed"
            } else {
                "Backup created"
            },
        );

        Ok(Some(final_path))
    }
}

/// Zip a single file next to itself, returning the archive path.
fn compress_backup(path: &Path) -> AppResult<PathBuf> {
    let zip_path = path.with_extension("zip");

    let entry_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| AppError::InvalidInput(format!("not a file path: {}", path.display())))?;

    let file = fs::File::create(&zip_path)?;
    let mut zip = ZipWriter::new(file);

    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut f = fs::File::open(path)?;
    zip.start_file(entry_name, options)
        .map_err(std::io::Error::other)?;

    std::io::copy(&mut f, &mut zip)?;
    zip.finish().map_err(std::io::Error::other)?;

    Ok(zip_path)
}
