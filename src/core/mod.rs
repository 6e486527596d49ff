pub mod backup;
pub mod categories;
pub mod ledger;
pub mod log;
pub mod roster;
