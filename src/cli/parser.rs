use crate::export::ExportFormat;
use clap::{Parser, Subcommand};

/// Command-line interface for fdms
/// Fire department records: firefighter clock-in/out and hours ledger on SQLite
#[derive(Parser, Debug)]
#[command(
    name = "fdms",
    version = env!("CARGO_PKG_VERSION"),
    about = "Fire department records: clock firefighters in and out, keep an hours ledger, export payroll",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    /// Pin the clock to a local time (YYYY-MM-DDTHH:MM[:SS])
    #[arg(global = true, long = "now", hide = true, value_name = "DATETIME")]
    pub now: Option<String>,

    /// Enable debug diagnostics on stderr
    #[arg(global = true, long, short = 'v')]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Show or edit the configuration file
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(long = "editor", help = "Editor to use with --edit")]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal audit log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Register a new firefighter
    Register {
        /// Fireman number (unique)
        number: String,

        /// Full name
        #[arg(num_args = 1.., required = true)]
        name: Vec<String>,
    },

    /// Edit, delete, list or show firefighters
    Firefighter {
        #[command(subcommand)]
        action: FirefighterAction,
    },

    /// Manage activity categories
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Start a session for a firefighter
    ClockIn {
        /// Fireman number
        number: String,

        #[arg(long, short = 'a', help = "Activity (category) label")]
        activity: String,
    },

    /// Close the open session of a firefighter
    ClockOut {
        /// Fireman number
        number: String,
    },

    /// Add a closed session from paper records
    Manual {
        /// Fireman number
        number: String,

        #[arg(long, short = 'a', help = "Activity (category) label")]
        activity: String,

        #[arg(long, help = "Date of the session (YYYY-MM-DD)")]
        date: String,

        #[arg(long = "in", help = "Start time (HH:MM)")]
        time_in: String,

        #[arg(long = "out", help = "End time (HH:MM)")]
        time_out: String,
    },

    /// Correct the times of a time log entry
    EditEntry {
        /// Entry id
        id: i64,

        #[arg(long = "in", help = "New start (YYYY-MM-DD HH:MM, local time)")]
        time_in: String,

        #[arg(long = "out", help = "New end (YYYY-MM-DD HH:MM, local time)")]
        time_out: Option<String>,
    },

    /// Delete a time log entry
    Del {
        /// Entry id
        id: i64,

        #[arg(long, short = 'y', help = "Do not ask for confirmation")]
        yes: bool,
    },

    /// Delete every time log entry and reset all totals
    Clear {
        #[arg(long, short = 'y', help = "Do not ask for confirmation")]
        yes: bool,
    },

    /// Show who is currently clocked in
    Status,

    /// Rank firefighters by total hours
    Leaderboard,

    /// Check or repair cached hour totals
    Recompute {
        #[arg(long, help = "Only report drift, change nothing")]
        check: bool,
    },

    /// Export payroll rows
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(
            long,
            value_name = "RANGE",
            help = "Filter by year/month/day or a custom range (A:B), or 'all'"
        )]
        range: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Create a backup copy of the database
    Backup {
        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long)]
        compress: bool,

        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum FirefighterAction {
    /// Change number and/or name
    Edit {
        number: String,

        #[arg(long = "number", help = "New fireman number")]
        new_number: Option<String>,

        #[arg(long = "name", help = "New full name")]
        new_name: Option<String>,
    },

    /// Remove a firefighter and all their time log entries
    Delete {
        number: String,

        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// List registered firefighters
    List,

    /// Show one firefighter with their time log entries
    Show { number: String },
}

#[derive(Subcommand, Debug)]
pub enum CategoryAction {
    /// Create a category
    Add {
        name: String,

        #[arg(long = "default-hours", help = "Hours credited when auto checked out")]
        default_hours: Option<f64>,
    },

    /// Delete an unused category
    Delete { name: String },

    /// Move every entry of FROM into INTO and delete FROM
    Merge { from: String, into: String },

    /// List categories with their entry counts
    List,

    /// Set or clear the default hours of a category
    SetDefault {
        name: String,

        #[arg(required_unless_present = "clear")]
        hours: Option<f64>,

        #[arg(long, conflicts_with = "hours")]
        clear: bool,
    },
}
