// Copyright 2013 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Logging/identity context threaded through a [`Surface`](crate::surface::Surface).
//!
//! A `Client` carries no behavior of its own beyond a name used as a log
//! target: an opaque handle the surface logs through, never a thing the
//! surface owns or tears down.

use std::sync::Arc;

/// Cheaply cloneable logging context for a surface.
#[derive(Clone)]
pub struct Client {
    name: Arc<str>,
}

impl Client {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Client { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Logs an advisory message for a placeholder surface operation.
    pub(crate) fn advisory(&self, operation: &str) {
        log::info!(target: "gatesurf::stub", "{}: stub operation `{}`", self.name, operation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advisory_logs_without_panicking() {
        let _ = env_logger::builder().is_test(true).try_init();
        let client = Client::new("test-client");
        client.advisory("paint");
        assert_eq!(client.name(), "test-client");
    }
}
