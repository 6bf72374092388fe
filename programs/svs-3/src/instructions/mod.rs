#![allow(ambiguous_glob_reexports)]

pub mod admin;
pub mod allocation;
pub mod deposit;
pub mod harvest;
pub mod initialize;
pub mod mint;
pub mod rebalance;
pub mod redeem;
pub mod strategy;
pub mod view;
pub mod withdraw;

pub use admin::*;
pub use allocation::*;
pub use deposit::*;
pub use harvest::*;
pub use initialize::*;
pub use mint::*;
pub use rebalance::*;
pub use redeem::*;
pub use strategy::*;
pub use view::*;
pub use withdraw::*;
