//! Fallback dispatch and the client facade.

mod client;
mod dispatcher;

pub use client::BmcClient;
pub use dispatcher::{DriverFuture, dispatch};
