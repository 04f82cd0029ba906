pub mod accounts;
pub mod app;
pub mod auth;
pub mod config;
pub mod credits;
pub mod error;
pub mod images;
pub mod payments;
pub mod state;

#[cfg(test)]
mod test_support;
