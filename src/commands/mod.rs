pub mod board;
pub mod common;
pub mod deals;
pub mod stages;
