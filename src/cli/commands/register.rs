use crate::cli::commands::open_db;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::roster::Roster;
use crate::errors::AppResult;
use crate::ui::messages::success;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Register { number, name } = cmd {
        let mut pool = open_db(cfg)?;
        let full_name = name.join(" ");

        Roster::register(&mut pool, number, &full_name)?;
        success(format!("Registered #{} {}", number.trim(), full_name.trim()));
    }
    Ok(())
}
