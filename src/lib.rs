pub mod config;
pub mod console;
pub mod docker;
pub mod launcher;
