//! Operator authentication for the admin client
//!
//! `AuthSession` owns the credential token and mirrors it into durable
//! storage; `guard` decides which views a navigation may enter given that
//! token.

pub mod guard;
pub mod session;

pub use guard::{Decision, Route, RouteGuard, can_enter};
pub use session::{AuthSession, TOKEN_KEY};
