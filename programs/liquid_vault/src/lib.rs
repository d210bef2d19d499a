use anchor_lang::prelude::*;

pub mod constants;
pub mod curves;
pub mod errors;
pub mod fixed_point;
pub mod instructions;
pub mod interfaces;
pub mod ledger;
pub mod oracle;
pub mod state;
pub mod vault;

#[cfg(test)]
mod mocks;

pub use constants::*;
pub use errors::*;
pub use fixed_point::Fixed;
pub use instructions::*;
pub use interfaces::*;
pub use ledger::*;
pub use oracle::*;
pub use state::*;
pub use vault::LiquidVault;

declare_id!("4s9ft3SJ5GXSf8TEx2W6u3escH4teuMHg9Hzv73zpokE");
