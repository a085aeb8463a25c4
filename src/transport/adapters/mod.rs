//! Concrete transports.

mod http_client;
mod process;

pub use http_client::{HttpOptions, ReqwestTransport};
pub use process::ProcessExecutor;
