//! Fire-and-forget submission of store mutations.
//!
//! The host never waits on or reacts to a gateway failure: the request is
//! logged and dropped, and the in-memory store stays authoritative.

use crate::port::{GatewayRequest, PersistencePort};
use tracing::{debug, warn};

pub struct Forwarder {
    port: Box<dyn PersistencePort>,
    submitted: usize,
    failed: usize,
}

impl Forwarder {
    pub fn new(port: Box<dyn PersistencePort>) -> Self {
        Self {
            port,
            submitted: 0,
            failed: 0,
        }
    }

    pub fn forward(&mut self, request: GatewayRequest) {
        self.submitted += 1;
        match self.port.submit(&request) {
            Ok(()) => debug!(title = request.title(), "Forwarded mutation"),
            Err(error) => {
                self.failed += 1;
                warn!(title = request.title(), %error, "Dropped failed persistence request");
            }
        }
    }

    pub fn port(&self) -> &dyn PersistencePort {
        self.port.as_ref()
    }

    pub fn submitted(&self) -> usize {
        self.submitted
    }

    pub fn failed(&self) -> usize {
        self.failed
    }
}

impl std::fmt::Debug for Forwarder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forwarder")
            .field("submitted", &self.submitted)
            .field("failed", &self.failed)
            .finish()
    }
}
