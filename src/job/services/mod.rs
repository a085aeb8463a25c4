//! Job polling orchestration.

mod poller;

pub use poller::{JobPoller, PollerConfig};
