pub mod authority;
pub mod password;

pub use authority::{Scope, Session, SessionAuthority, SessionSettings};
