pub mod category;
pub mod firefighter;
pub mod time_entry;
