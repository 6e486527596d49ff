use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::backup::BackupLogic;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Backup {
        file,
        compress,
        force,
    } = cmd
    {
        match BackupLogic::backup(cfg, file, *compress, *force)? {
            Some(path) => success(format!("Backup created: {}", path.display())),
            None => info("Backup cancelled."),
        }
    }

    Ok(())
}
