pub mod quotes;
pub mod sources;
pub mod stats;
