pub mod clip;
pub mod query;
pub mod sweep;
