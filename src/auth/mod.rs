pub mod handlers;
pub mod identity;
pub mod session;

pub use identity::{GoogleIdentity, Identity, IdentityError, IdentityProvider};
