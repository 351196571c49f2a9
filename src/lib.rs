//! Backend for user accounts and legal text analysis.

pub mod analysis;
pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod state;
pub mod users;

#[cfg(test)]
mod test_utils;
