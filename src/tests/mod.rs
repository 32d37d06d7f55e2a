#[cfg(test)]
pub mod common;

pub mod config_loading;
