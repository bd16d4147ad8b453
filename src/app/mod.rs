pub mod checks;
pub mod start;
