//! Database models for the tables owned by the auth core.

pub mod session;
pub mod setting;
pub mod user;

pub use session::*;
pub use setting::*;
pub use user::*;
