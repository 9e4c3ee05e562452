// Copyright 2013 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tiled dirty-tracking RGBA surface encoder.
//!
//! A [`Surface`] is a W×H canvas backed by a grid of fixed-size [`Tile`]s.
//! Callers write rectangular pixel updates via [`Surface::draw`];
//! [`Surface::flush`] walks the grid and streams only the tiles that
//! actually changed to an [`InstructionSink`], keeping a remote viewer
//! re-synchronized at a cost proportional to true change rather than
//! canvas size.
//!
//! [`hash`] and [`compare`] are independent utilities used by surrounding
//! cache/deduplication code to fingerprint and locate image rectangles; they
//! are not called by [`tile`] or [`surface`] themselves.

pub mod client;
pub mod compare;
pub mod error;
pub mod hash;
pub mod image;
pub mod sink;
pub mod surface;
pub mod tile;

pub use client::Client;
pub use error::SurfaceError;
pub use image::PixelImage;
pub use sink::{CompositeOperator, InstructionSink, LayerId};
pub use surface::{Limits, Surface};
pub use tile::Tile;
