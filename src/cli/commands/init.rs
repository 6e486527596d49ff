use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::initialize::{init_db, seed_categories};
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};

/// Handle the `init` command
///
/// Creates (unless `--test`) the config file, the SQLite database with all
/// migrations applied, and seeds the default activity categories.
pub fn handle(cli: &Cli) -> AppResult<()> {
    let cfg = Config::init_all(cli.db.as_deref(), cli.test)?;

    println!("⚙️  Initializing fdms…");
    if !cli.test {
        println!("📄 Config file : {}", Config::config_file().display());
    }
    println!("🗄️  Database   : {}", &cfg.database);

    let pool = DbPool::new(&cfg.database)?;
    init_db(&pool.conn)?;

    let seeded = seed_categories(&pool.conn, &cfg.default_categories)?;
    if seeded > 0 {
        info(format!("Seeded {seeded} activity categories"));
    }

    audit(
        &pool.conn,
        "init",
        "Database initialized",
        &format!("Database initialized at {}", &cfg.database),
    );

    success(format!("Database initialized at {}", &cfg.database));
    Ok(())
}
