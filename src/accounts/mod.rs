#[cfg(test)]
pub mod memory;
pub mod repo;
pub mod repo_types;

pub use repo::{AccountStore, PgAccountStore, StoreError};
pub use repo_types::{NewTransaction, NewUser, Transaction, User};
