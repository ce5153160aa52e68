use std::sync::LazyLock;

use time::{format_description::BorrowedFormatItem, macros::format_description};

pub mod version;

/// quotes shown per page on the popular and all-quotes listings.
pub const PAGE_SIZE: i64 = 10;

/// a source can never hold more quotes than this.
pub const MAX_QUOTES_PER_SOURCE: i64 = 3;

pub const MAX_SOURCE_TITLE_LEN: usize = 200;

pub const TOP_SOURCES_LIMIT: i64 = 5;

pub const SUMMARY_LEN: usize = 50;

pub static STARTUP_TIME: LazyLock<std::time::SystemTime> =
    LazyLock::new(std::time::SystemTime::now);

pub static DISPLAY_DATETIME: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");
