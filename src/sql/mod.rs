//! SQL module - statement assembly and SQLite execution

mod database;
mod select;

pub use database::{Database, Page};
pub use select::{RenderedSql, Select};
