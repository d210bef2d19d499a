pub mod admin;
pub mod claim;
pub mod migration;
pub mod purchase;
pub mod rescue;

pub use admin::*;
pub use claim::*;
pub use migration::*;
pub use purchase::*;
pub use rescue::*;
