//! Account and key management

pub mod account;

pub use account::{Account, AccountError, Wallet};
