pub mod clear;
pub mod delete;
pub mod export;
pub mod list;
pub mod scan;
