// Copyright 2013 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error types for the surface core.
//!
//! Only two failure modes exist: a rejected resize and a poisoned lock.
//! Everything else the core does either succeeds or is a silent no-op
//! (out-of-bounds draw origin, empty tile overlap, ...).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error(
        "requested size {width}x{height} exceeds configured maximum {max_width}x{max_height}"
    )]
    Oversized {
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    },

    #[error("surface lock was poisoned by a panicking thread")]
    Poisoned,
}
