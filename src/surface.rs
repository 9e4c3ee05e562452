// Copyright 2013 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The tile grid presenting a W×H canvas to drawing callers.
//!
//! A mutex-guarded row-major grid of [`Tile`]s, dispatching draws to the
//! tiles they overlap and flushing dirty tiles to an [`InstructionSink`] in
//! row-major order.

use std::sync::{Arc, Mutex, MutexGuard};

use euclid::default::{Point2D, Size2D};

use crate::client::Client;
use crate::error::SurfaceError;
use crate::image::PixelImage;
use crate::sink::{InstructionSink, LayerId};
use crate::tile::{Tile, TILE_SIZE};

/// Configured ceiling on canvas dimensions, checked by [`Surface::resize`].
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_width: 8192,
            max_height: 8192,
        }
    }
}

/// An opaque, unvalidated RGB triple for the `paint`/`set` placeholder
/// operations. Alpha is not represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

/// Placeholder for a pixel-combining function used by `transfer`. No
/// variant is currently interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferFunction(pub u8);

struct SurfaceState {
    width: u32,
    height: u32,
    rows: u32,
    columns: u32,
    tiles: Vec<Tile>,
    content_dirty: bool,
    size_dirty: bool,
}

fn grid_dims(width: u32, height: u32) -> (u32, u32) {
    (height.div_ceil(TILE_SIZE), width.div_ceil(TILE_SIZE))
}

fn build_tiles(rows: u32, columns: u32) -> Vec<Tile> {
    let mut tiles = Vec::with_capacity((rows * columns) as usize);
    for row in 0..rows {
        for column in 0..columns {
            tiles.push(Tile::alloc(column * TILE_SIZE, row * TILE_SIZE));
        }
    }
    tiles
}

/// A W×H canvas backed by a grid of 64×64 tiles, dispatching draws and
/// streaming dirty tiles through an [`InstructionSink`].
///
/// `client`, `sink`, and `layer` are immutable for the surface's lifetime;
/// everything else lives behind `inner`'s mutex.
pub struct Surface {
    client: Client,
    sink: Arc<dyn InstructionSink>,
    layer: LayerId,
    limits: Limits,
    inner: Mutex<SurfaceState>,
}

impl Surface {
    /// Allocates a surface of the given size with the default [`Limits`].
    pub fn alloc(client: Client, sink: Arc<dyn InstructionSink>, layer: LayerId, size: Size2D<u32>) -> Self {
        Self::with_limits(client, sink, layer, size, Limits::default())
    }

    /// Allocates a surface of the given size, enforcing `limits` on future
    /// resizes.
    pub fn with_limits(
        client: Client,
        sink: Arc<dyn InstructionSink>,
        layer: LayerId,
        size: Size2D<u32>,
        limits: Limits,
    ) -> Self {
        let (rows, columns) = grid_dims(size.width, size.height);
        let tiles = build_tiles(rows, columns);
        Surface {
            client,
            sink,
            layer,
            limits,
            inner: Mutex::new(SurfaceState {
                width: size.width,
                height: size.height,
                rows,
                columns,
                tiles,
                content_dirty: false,
                size_dirty: true,
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, SurfaceState>, SurfaceError> {
        self.inner.lock().map_err(|_| SurfaceError::Poisoned)
    }

    /// Current canvas size.
    pub fn size(&self) -> Result<Size2D<u32>, SurfaceError> {
        let inner = self.lock()?;
        Ok(Size2D::new(inner.width, inner.height))
    }

    /// Resizes the canvas. Rejected (surface left unchanged) if either
    /// dimension exceeds the configured [`Limits`]; the check happens
    /// before the lock is taken.
    ///
    /// Tiles whose `(row, column)` lies in both the old and new grid are
    /// preserved, along with their dirty state and pixel contents. Tiles
    /// only in the new grid are freshly allocated; tiles only in the old
    /// grid are dropped. `size_dirty` is set; `content_dirty` is untouched.
    pub fn resize(&self, size: Size2D<u32>) -> Result<(), SurfaceError> {
        if size.width > self.limits.max_width || size.height > self.limits.max_height {
            return Err(SurfaceError::Oversized {
                width: size.width,
                height: size.height,
                max_width: self.limits.max_width,
                max_height: self.limits.max_height,
            });
        }

        let mut inner = self.lock()?;
        let (new_rows, new_columns) = grid_dims(size.width, size.height);
        let old_rows = inner.rows;
        let old_columns = inner.columns;
        let max_rows = new_rows.max(old_rows);
        let max_columns = new_columns.max(old_columns);

        let mut old_tiles = std::mem::take(&mut inner.tiles).into_iter();
        let mut new_tiles = Vec::with_capacity((new_rows * new_columns) as usize);

        for row in 0..max_rows {
            for column in 0..max_columns {
                let in_new = row < new_rows && column < new_columns;
                let in_old = row < old_rows && column < old_columns;

                if in_new {
                    if in_old {
                        new_tiles.push(old_tiles.next().expect("tile grid accounting"));
                    } else {
                        new_tiles.push(Tile::alloc(column * TILE_SIZE, row * TILE_SIZE));
                    }
                } else if in_old {
                    // Only in the old grid: consume and drop it.
                    old_tiles.next();
                }
            }
        }

        inner.tiles = new_tiles;
        inner.rows = new_rows;
        inner.columns = new_columns;
        inner.width = size.width;
        inner.height = size.height;
        inner.size_dirty = true;

        Ok(())
    }

    /// Writes `image` into the canvas at `origin`, dispatching the write to
    /// every tile it overlaps. A no-op if `origin` falls outside the
    /// canvas. Marks the surface content-dirty whenever `origin` is in
    /// bounds, even if `image` has zero area.
    pub fn draw(&self, origin: Point2D<u32>, image: PixelImage<'_>) -> Result<(), SurfaceError> {
        let mut inner = self.lock()?;
        if origin.x >= inner.width || origin.y >= inner.height {
            return Ok(());
        }
        if image.width() == 0 || image.height() == 0 {
            inner.content_dirty = true;
            return Ok(());
        }

        let first_row = origin.y / TILE_SIZE;
        let first_column = origin.x / TILE_SIZE;
        let last_row = (((u64::from(origin.y) + u64::from(image.height()) - 1) / u64::from(TILE_SIZE)) as u32)
            .min(inner.rows - 1);
        let last_column = (((u64::from(origin.x) + u64::from(image.width()) - 1) / u64::from(TILE_SIZE)) as u32)
            .min(inner.columns - 1);

        let columns = inner.columns;
        for row in first_row..=last_row {
            for column in first_column..=last_column {
                let index = (row * columns + column) as usize;
                inner.tiles[index].put(origin.x, origin.y, image.data(), image.width(), image.height(), image.stride());
            }
        }

        inner.content_dirty = true;
        Ok(())
    }

    /// Emits a `send_size` instruction if the size changed since the last
    /// flush, then streams every dirty tile in row-major order and clears
    /// their dirty flags.
    pub fn flush(&self) -> Result<(), SurfaceError> {
        let mut inner = self.lock()?;

        if inner.size_dirty {
            self.sink.send_size(self.layer, inner.width, inner.height);
            inner.size_dirty = false;
        }

        if inner.content_dirty {
            for tile in inner.tiles.iter_mut() {
                tile.flush(self.sink.as_ref(), self.layer);
            }
            inner.content_dirty = false;
        }

        Ok(())
    }

    // -- Placeholder operations -----------------------------------------
    //
    // None of these have a specified observable effect beyond serializing
    // with other operations and logging that they were invoked. `move` is
    // renamed `reposition` since `move` is a reserved word.

    pub fn paint(&self, _origin: Point2D<u32>, _mask: PixelImage<'_>, _color: Rgb) -> Result<(), SurfaceError> {
        let _guard = self.lock()?;
        self.client.advisory("paint");
        Ok(())
    }

    /// Copies a rectangle from `src` onto `dst`. Locks only `dst`, since the
    /// observable effect (and hence the serialization this placeholder owes
    /// callers) is entirely on the destination; this also sidesteps any
    /// two-surface lock-ordering hazard a stub has no reason to risk.
    pub fn copy(
        _src: &Surface,
        _src_origin: Point2D<u32>,
        _size: Size2D<u32>,
        dst: &Surface,
        _dst_origin: Point2D<u32>,
    ) -> Result<(), SurfaceError> {
        let _guard = dst.lock()?;
        dst.client.advisory("copy");
        Ok(())
    }

    pub fn transfer(
        _src: &Surface,
        _src_origin: Point2D<u32>,
        _size: Size2D<u32>,
        dst: &Surface,
        _dst_origin: Point2D<u32>,
        _function: TransferFunction,
    ) -> Result<(), SurfaceError> {
        let _guard = dst.lock()?;
        dst.client.advisory("transfer");
        Ok(())
    }

    pub fn set(&self, _origin: Point2D<u32>, _size: Size2D<u32>, _color: Rgb) -> Result<(), SurfaceError> {
        let _guard = self.lock()?;
        self.client.advisory("set");
        Ok(())
    }

    pub fn clip(&self, _origin: Point2D<u32>, _size: Size2D<u32>) -> Result<(), SurfaceError> {
        let _guard = self.lock()?;
        self.client.advisory("clip");
        Ok(())
    }

    pub fn reset_clip(&self) -> Result<(), SurfaceError> {
        let _guard = self.lock()?;
        self.client.advisory("reset_clip");
        Ok(())
    }

    pub fn reposition(&self, _origin: Point2D<i32>) -> Result<(), SurfaceError> {
        let _guard = self.lock()?;
        self.client.advisory("move");
        Ok(())
    }

    pub fn stack(&self, _index: i32) -> Result<(), SurfaceError> {
        let _guard = self.lock()?;
        self.client.advisory("stack");
        Ok(())
    }

    pub fn set_parent(&self, _parent: Option<LayerId>) -> Result<(), SurfaceError> {
        let _guard = self.lock()?;
        self.client.advisory("set_parent");
        Ok(())
    }

    pub fn set_opacity(&self, _opacity: f32) -> Result<(), SurfaceError> {
        let _guard = self.lock()?;
        self.client.advisory("set_opacity");
        Ok(())
    }

    /// Duplicates the surface's contents to a late-joining viewer's sink.
    /// Unlike [`Tile::dup`], the surface-level operation is itself one of
    /// the unspecified placeholders.
    pub fn dup(&self, _to: &dyn InstructionSink) -> Result<(), SurfaceError> {
        let _guard = self.lock()?;
        self.client.advisory("dup");
        Ok(())
    }

    pub fn set_multitouch(&self, _touches: u32) -> Result<(), SurfaceError> {
        let _guard = self.lock()?;
        self.client.advisory("set_multitouch");
        Ok(())
    }

    pub fn set_lossless(&self, _lossless: bool) -> Result<(), SurfaceError> {
        let _guard = self.lock()?;
        self.client.advisory("set_lossless");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::sync::Mutex as StdMutex;

    use crate::sink::CompositeOperator;

    #[derive(Debug, Clone, PartialEq)]
    enum Instruction {
        Size(LayerId, u32, u32),
        Tile(LayerId, u32, u32),
    }

    #[derive(Default)]
    struct RecordingSink {
        calls: StdMutex<RefCell<Vec<Instruction>>>,
    }

    impl RecordingSink {
        fn calls(&self) -> Vec<Instruction> {
            self.calls.lock().unwrap().borrow().clone()
        }
    }

    impl InstructionSink for RecordingSink {
        fn send_size(&self, layer: LayerId, width: u32, height: u32) {
            self.calls
                .lock()
                .unwrap()
                .borrow_mut()
                .push(Instruction::Size(layer, width, height));
        }

        fn stream_png(&self, layer: LayerId, _op: CompositeOperator, x: u32, y: u32, _image: PixelImage<'_>) {
            self.calls.lock().unwrap().borrow_mut().push(Instruction::Tile(layer, x, y));
        }
    }

    fn solid_image(width: u32, height: u32, pixel: u32) -> Vec<u8> {
        let mut out = vec![0u8; width as usize * height as usize * crate::image::BYTES_PER_PIXEL];
        for chunk in out.chunks_exact_mut(crate::image::BYTES_PER_PIXEL) {
            chunk.copy_from_slice(&pixel.to_ne_bytes());
        }
        out
    }

    fn make_surface(sink: Arc<RecordingSink>, width: u32, height: u32) -> Surface {
        Surface::alloc(Client::new("test"), sink, LayerId(1), Size2D::new(width, height))
    }

    #[test]
    fn s1_single_tile_write() {
        let sink = Arc::new(RecordingSink::default());
        let surface = make_surface(sink.clone(), 128, 128);

        let data = solid_image(10, 10, 0xFF0000FF);
        let stride = 10 * crate::image::BYTES_PER_PIXEL;
        let image = PixelImage::new(&data, 10, 10, stride);
        surface.draw(Point2D::new(5, 5), image).unwrap();
        surface.flush().unwrap();

        let calls = sink.calls();
        assert_eq!(calls[0], Instruction::Size(LayerId(1), 128, 128));
        let tiles: Vec<_> = calls.iter().filter(|c| matches!(c, Instruction::Tile(..))).collect();
        assert_eq!(tiles, vec![&Instruction::Tile(LayerId(1), 0, 0)]);
    }

    #[test]
    fn s2_straddle_touches_four_tiles() {
        let sink = Arc::new(RecordingSink::default());
        let surface = make_surface(sink.clone(), 128, 128);

        let data = solid_image(10, 10, 0x00FF00FF);
        let stride = 10 * crate::image::BYTES_PER_PIXEL;
        let image = PixelImage::new(&data, 10, 10, stride);
        surface.draw(Point2D::new(60, 60), image).unwrap();
        surface.flush().unwrap();

        let tile_calls: Vec<_> = sink
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Instruction::Tile(..)))
            .collect();
        assert_eq!(tile_calls.len(), 4);
    }

    #[test]
    fn s3_idempotent_redraw_emits_nothing() {
        let sink = Arc::new(RecordingSink::default());
        let surface = make_surface(sink.clone(), 128, 128);

        let data = solid_image(10, 10, 0x123456AA);
        let stride = 10 * crate::image::BYTES_PER_PIXEL;
        let image = PixelImage::new(&data, 10, 10, stride);

        surface.draw(Point2D::new(5, 5), image).unwrap();
        surface.flush().unwrap();

        let image_again = PixelImage::new(&data, 10, 10, stride);
        surface.draw(Point2D::new(5, 5), image_again).unwrap();
        surface.flush().unwrap();

        let calls = sink.calls();
        let tile_calls = calls.iter().filter(|c| matches!(c, Instruction::Tile(..))).count();
        assert_eq!(tile_calls, 1);
    }

    #[test]
    fn s5_resize_grow_and_shrink_preserves_origin_tile() {
        let sink = Arc::new(RecordingSink::default());
        let surface = make_surface(sink.clone(), 64, 64);

        let data = solid_image(4, 4, 0xDEADBEEF);
        let stride = 4 * crate::image::BYTES_PER_PIXEL;
        let image = PixelImage::new(&data, 4, 4, stride);
        surface.draw(Point2D::new(0, 0), image).unwrap();

        surface.resize(Size2D::new(192, 192)).unwrap();
        {
            let inner = surface.inner.lock().unwrap();
            assert_eq!(inner.tiles.len(), 9);
            assert!(inner.tiles[0].is_dirty());
        }

        surface.resize(Size2D::new(64, 64)).unwrap();
        let inner = surface.inner.lock().unwrap();
        assert_eq!(inner.tiles.len(), 1);
        assert!(inner.tiles[0].is_dirty());
    }

    #[test]
    fn resize_rejects_oversized_request() {
        let sink = Arc::new(RecordingSink::default());
        let surface = make_surface(sink, 64, 64);
        let err = surface.resize(Size2D::new(100_000, 64)).unwrap_err();
        assert!(matches!(err, SurfaceError::Oversized { .. }));
    }

    #[test]
    fn draw_outside_canvas_is_noop() {
        let sink = Arc::new(RecordingSink::default());
        let surface = make_surface(sink.clone(), 64, 64);
        let data = solid_image(4, 4, 1);
        let stride = 4 * crate::image::BYTES_PER_PIXEL;
        let image = PixelImage::new(&data, 4, 4, stride);
        surface.draw(Point2D::new(1000, 1000), image).unwrap();
        surface.flush().unwrap();
        let tile_calls = sink.calls().into_iter().filter(|c| matches!(c, Instruction::Tile(..))).count();
        assert_eq!(tile_calls, 0);
    }
}
