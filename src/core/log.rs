use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::info;
use ansi_term::Colour;
use regex::Regex;
use std::sync::OnceLock;

const OP_WIDTH_MAX: usize = 60;

fn strip_ansi(s: &str) -> String {
    static ANSI: OnceLock<Option<Regex>> = OnceLock::new();
    match ANSI.get_or_init(|| Regex::new(r"\x1B\[[0-9;]*[mK]").ok()) {
        Some(re) => re.replace_all(s, "").into_owned(),
        None => s.to_string(),
    }
}

fn color_for_operation(op: &str) -> Colour {
    match op {
        "register" | "clock_in" | "manual" | "category_add" => Colour::Green,
        "clock_out" => Colour::Cyan,
        "del" | "clear" | "category_del" => Colour::Red,
        "edit" | "category_edit" | "category_merge" => Colour::Yellow,
        "auto_checkout" | "recompute" => Colour::RGB(255, 153, 51),
        "migration_applied" => Colour::Purple,
        "backup" | "export" => Colour::Blue,
        "init" => Colour::RGB(255, 153, 51),
        _ => Colour::White,
    }
}

/// One row of the internal `log` table.
#[derive(Debug, Clone)]
pub struct LogRow {
    pub id: i64,
    pub date: String,
    pub operation: String,
    pub target: String,
    pub message: String,
}

pub struct LogLogic;

impl LogLogic {
    pub fn load(pool: &DbPool) -> AppResult<Vec<LogRow>> {
        let mut stmt = pool.conn.prepare_cached(
            "SELECT id, date, operation, target, message FROM log ORDER BY id ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            let raw_date: String = row.get(1)?;
            let date = chrono::DateTime::parse_from_rfc3339(&raw_date)
                .map(|dt| dt.format("%FT%T%:z").to_string())
                .unwrap_or(raw_date);

            Ok(LogRow {
                id: row.get(0)?,
                date,
                operation: row.get(2)?,
                target: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                message: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            })
        })?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn print_log(pool: &DbPool) -> AppResult<()> {
        let entries = Self::load(pool)?;

        if entries.is_empty() {
            info("The internal log is empty.");
            return Ok(());
        }

        let op_target = |e: &LogRow| {
            if e.target.is_empty() {
                e.operation.clone()
            } else {
                format!("{} ({})", e.operation, e.target)
            }
        };

        let op_w = entries
            .iter()
            .map(|e| op_target(e).chars().count())
            .max()
            .unwrap_or(10)
            .min(OP_WIDTH_MAX);
        let id_w = entries
            .iter()
            .map(|e| e.id.to_string().len())
            .max()
            .unwrap_or(1);
        let date_w = entries.iter().map(|e| e.date.len()).max().unwrap_or(10);

        println!("📜 Internal log:\n");

        for e in &entries {
            let color = color_for_operation(&e.operation);

            let visible = op_target(e);
            let truncated = if visible.chars().count() > OP_WIDTH_MAX {
                let mut s: String = visible.chars().take(OP_WIDTH_MAX - 3).collect();
                s.push_str("...");
                s
            } else {
                visible
            };

            // only the operation word is colored
            let colored = match truncated.split_once(' ') {
                Some((op, rest)) => format!("{} {}", color.paint(op), rest),
                None => color.paint(truncated.as_str()).to_string(),
            };

            let padding = " ".repeat(op_w.saturating_sub(strip_ansi(&colored).chars().count()));

            println!(
                "{:>id_w$}: {:<date_w$} | {}{} => {}",
                e.id,
                e.date,
                colored,
                padding,
                e.message,
                id_w = id_w,
                date_w = date_w
            );
        }

        Ok(())
    }
}
