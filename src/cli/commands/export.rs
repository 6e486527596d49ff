use crate::cli::parser::Commands;
use crate::cli::commands::open_db;
use crate::config::Config;
use crate::errors::AppResult;
use crate::export::ExportLogic;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        range,
        force,
    } = cmd
    {
        let pool = open_db(cfg)?;
        ExportLogic::export(&pool, *format, file, range.as_deref(), *force)?;
    }
    Ok(())
}
