// Copyright 2013 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The instruction sink: the only polymorphic collaborator this crate talks to.
//!
//! A [`Surface`](crate::surface::Surface) never touches a socket itself. It
//! hands finished pixel rectangles to whatever implements [`InstructionSink`],
//! which owns PNG encoding, wire framing, and transport retries.

use crate::image::PixelImage;

/// Opaque identity of a layer on the wire. The core never interprets this;
/// it is only ever passed straight through to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(pub u64);

/// The Porter-Duff compositing operator accompanying a `stream_png`
/// instruction. Tiles are always composited with `Over`; the type exists so
/// the sink's signature documents the parameter rather than hard-coding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeOperator {
    Over,
}

/// The narrow capability a [`Surface`](crate::surface::Surface) needs from
/// its transport: the ability to announce a size change and to push an
/// encoded image rectangle.
///
/// Both methods are infallible from the core's point of view: a sink that
/// wants to report a transmission failure does so out of band (a channel, a
/// shared flag, its own logging), never by unwinding out of these calls.
pub trait InstructionSink: Send + Sync {
    /// Announces a change to the layer's canvas size.
    fn send_size(&self, layer: LayerId, width: u32, height: u32);

    /// Streams an image rectangle for `layer` at `(x, y)`, composited with
    /// `op`. `image` borrows the pixels for the duration of the call only.
    fn stream_png(
        &self,
        layer: LayerId,
        op: CompositeOperator,
        x: u32,
        y: u32,
        image: PixelImage<'_>,
    );
}
