//! Principal domain entities.

pub mod lockout;
pub mod model;
pub mod role;

pub use lockout::LockoutPolicy;
pub use model::{NewPrincipal, Principal};
pub use role::UserRole;
