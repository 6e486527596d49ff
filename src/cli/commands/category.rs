use crate::cli::commands::open_db;
use crate::cli::parser::{CategoryAction, Commands};
use crate::config::Config;
use crate::core::categories::Categories;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::table::Table;
use crate::utils::time::format_hours;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Category { action } = cmd else {
        return Ok(());
    };

    let mut pool = open_db(cfg)?;

    match action {
        CategoryAction::Add {
            name,
            default_hours,
        } => {
            Categories::create(&mut pool, name, *default_hours)?;
            success(format!("Category '{}' created", name.trim()));
        }

        CategoryAction::Delete { name } => {
            let cat = Categories::delete(&mut pool, name)?;
            success(format!("Category '{}' deleted", cat.name));
        }

        CategoryAction::Merge { from, into } => {
            let moved = Categories::merge(&mut pool, from, into)?;
            success(format!(
                "Merged '{}' into '{}' ({} entries moved)",
                from.trim(),
                into.trim(),
                moved
            ));
        }

        CategoryAction::List => {
            let cats = Categories::list(&pool)?;
            if cats.is_empty() {
                info("No activity categories.");
                return Ok(());
            }

            let mut table = Table::new(&["Name", "Default hours", "Entries"]);
            for c in &cats {
                table.add_row(vec![
                    c.name.clone(),
                    c.default_hours.map(format_hours).unwrap_or_default(),
                    c.entry_count.to_string(),
                ]);
            }
            print!("{}", table.render());
        }

        CategoryAction::SetDefault { name, hours, clear } => {
            let value = if *clear { None } else { *hours };
            let cat = Categories::set_default_hours(&mut pool, name, value)?;
            match cat.default_hours {
                Some(h) => success(format!(
                    "'{}' now credits {} hours on auto checkout",
                    cat.name,
                    format_hours(h)
                )),
                None => success(format!("'{}' has no default hours", cat.name)),
            }
        }
    }

    Ok(())
}
