pub mod common;
pub mod user;
pub mod auth;

pub use common::*;
pub use user::*;
pub use auth::*;
