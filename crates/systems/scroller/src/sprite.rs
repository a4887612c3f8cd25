//! Draw-list builder: priority buckets in, sprite attribute table out.
//!
//! Behaviors queue themselves into one of 8 priority buckets during the
//! simulation pass; once per displayed frame [`build_sprites`] drains the
//! buckets in ascending order (hardware draws later entries on top) and
//! converts each queued actor into hardware sprite pieces.

use crate::object::{Kind, Object, RenderFlags};
use crate::world::World;
use rush_core::logging::{log, LogCategory, LogLevel};
use rush_core::vdp::{
    SpriteTable, SCREEN_HEIGHT, SCREEN_TALLADD, SCREEN_WIDTH, SPRITE_ORIGIN, TILE_X_FLIP,
    TILE_Y_FLIP,
};

/// Queued draw requests per priority bucket and frame; excess is dropped.
pub const QUEUE_CAPACITY: usize = 0x3F;

/// One priority bucket of actor slot indices, FIFO within a frame.
#[derive(Debug, Clone)]
pub struct SpriteQueue {
    size: usize,
    slots: [usize; QUEUE_CAPACITY],
}

impl SpriteQueue {
    fn new() -> Self {
        Self {
            size: 0,
            slots: [0; QUEUE_CAPACITY],
        }
    }
}

/// The 8 per-priority draw queues, refilled every frame.
#[derive(Debug, Clone)]
pub struct DrawQueues {
    buckets: [SpriteQueue; 8],
}

impl DrawQueues {
    pub fn new() -> Self {
        Self {
            buckets: std::array::from_fn(|_| SpriteQueue::new()),
        }
    }

    /// Queue an actor slot into a bucket. A full bucket silently drops the
    /// request; that is policy, not an error.
    pub fn push(&mut self, priority: u8, index: usize) {
        let bucket = &mut self.buckets[(priority & 7) as usize];
        if bucket.size >= QUEUE_CAPACITY {
            return;
        }
        bucket.slots[bucket.size] = index;
        bucket.size += 1;
    }

    pub fn bucket_len(&self, priority: usize) -> usize {
        self.buckets[priority].size
    }

    fn entry(&self, priority: usize, at: usize) -> usize {
        self.buckets[priority].slots[at]
    }

    fn clear_bucket(&mut self, priority: usize) {
        self.buckets[priority].size = 0;
    }

    pub fn clear(&mut self) {
        for priority in 0..8 {
            self.clear_bucket(priority);
        }
    }
}

impl Default for DrawQueues {
    fn default() -> Self {
        Self::new()
    }
}

/// Drain the draw queues into the sprite attribute table for this frame.
pub fn build_sprites(world: &mut World) {
    world.table.clear();

    for priority in 0..8 {
        let queued = world.queues.bucket_len(priority);
        for at in 0..queued {
            let index = world.queues.entry(priority, at);

            // An actor can legitimately arrive here before its spawner
            // assigned mappings; it is skipped, not faulted
            let Some(handle) = world.pool[index].mappings else {
                log(LogCategory::Sprite, LogLevel::Debug, || {
                    format!("slot {} queued with null mappings", index)
                });
                continue;
            };
            if world.pool[index].kind == Kind::Null {
                continue;
            }

            world.pool[index].render.remove(RenderFlags::ON_SCREEN);
            let obj = world.pool[index].clone();

            // Resolve screen position, culling as the hardware would
            let (x, y): (u16, u16);
            if obj
                .render
                .intersects(RenderFlags::ALIGN_BG | RenderFlags::ALIGN_FG)
            {
                let (scroll_x, scroll_y) = world.scroll.layer(obj.render);

                let ox = obj.x.pixels().wrapping_sub(scroll_x);
                let width = obj.width_pixels as i32;
                if (ox as i32 + width) < 0 || (ox as i32 - width) >= SCREEN_WIDTH as i32 {
                    continue;
                }
                x = (SPRITE_ORIGIN as i32 + ox as i32) as u16;

                if obj.render.contains(RenderFlags::YRAD_HEIGHT) {
                    let oy = obj.y.pixels().wrapping_sub(scroll_y);
                    let y_rad = obj.y_rad as i32;
                    if (oy as i32 + y_rad) < 0 || (oy as i32 - y_rad) >= SCREEN_HEIGHT as i32 {
                        continue;
                    }
                    y = (SPRITE_ORIGIN as i32 + oy as i32) as u16;
                } else {
                    let oy = obj
                        .y
                        .pixels()
                        .wrapping_sub(scroll_y)
                        .wrapping_add(SPRITE_ORIGIN);
                    if oy < 0x60 || oy >= 0x180 + SCREEN_TALLADD {
                        continue;
                    }
                    y = oy as u16;
                }
            } else {
                // Position already holds screen coordinates
                x = obj.x.pixels() as u16;
                y = obj.y.pixels() as u16;
            }

            // Resolve the piece list
            let bank = world.assets.mappings(handle);
            let (pieces, count): (&[u8], u8);
            if !obj.render.contains(RenderFlags::RAW_MAPPINGS) {
                let at = (obj.frame as usize) << 1;
                let (Some(&hi), Some(&lo)) = (bank.get(at), bank.get(at + 1)) else {
                    log(LogCategory::Sprite, LogLevel::Warn, || {
                        format!("slot {} frame {} outside mapping table", index, obj.frame)
                    });
                    continue;
                };
                let offset = ((hi as usize) << 8) | lo as usize;
                let Some((&n, list)) = bank.get(offset..).and_then(|s| s.split_first()) else {
                    log(LogCategory::Sprite, LogLevel::Warn, || {
                        format!("slot {} mapping offset {:#06x} outside bank", index, offset)
                    });
                    continue;
                };
                pieces = list;
                count = n;
            } else {
                // Raw piece list with an externally-determined count of zero
                pieces = bank;
                count = 0;
            }

            draw_pieces(&mut world.table, x, y, &obj, pieces, count);
            world.pool[index].render.insert(RenderFlags::ON_SCREEN);
        }
        world.queues.clear_bucket(priority);
    }

    world.table.terminate();
}

/// Emit the hardware sprites for one actor's piece list.
///
/// Each piece is five bytes: signed Y offset, size byte, big-endian tile
/// word, signed X offset. The four flip branches each have their own
/// size-derived centering arithmetic; the size byte encodes width/height in
/// tiles, so `(size << 1) & 0x18` recovers the pixel width correction and
/// `(size << 3) & 0x18` the height correction.
pub(crate) fn draw_pieces(
    table: &mut SpriteTable,
    x: u16,
    y: u16,
    obj: &Object,
    pieces: &[u8],
    count: u8,
) {
    let x_flip = obj.render.contains(RenderFlags::X_FLIP);
    let y_flip = obj.render.contains(RenderFlags::Y_FLIP);

    let mut cursor = pieces;
    for _ in 0..count {
        // Never overflow the hardware sprite budget
        if table.is_full() {
            break;
        }
        let Some(chunk) = cursor.get(..5) else {
            log(LogCategory::Sprite, LogLevel::Warn, || {
                "piece list truncated mid-piece".to_string()
            });
            break;
        };
        cursor = &cursor[5..];

        let map_y = chunk[0] as i8 as i32;
        let map_size = chunk[1];
        let map_tile = ((chunk[2] as u16) << 8) | chunk[3] as u16;
        let map_x = chunk[4] as i8 as i32;

        let tile = map_tile.wrapping_add(obj.tile);
        let width_fix = (((map_size as i32) << 1) & 0x18) + 8;
        let height_fix = (((map_size as i32) << 3) & 0x18) + 8;

        let (py, tile, px) = match (x_flip, y_flip) {
            (true, true) => (
                y as i32 - map_y - height_fix,
                tile ^ (TILE_X_FLIP | TILE_Y_FLIP),
                x as i32 - map_x - width_fix,
            ),
            (true, false) => (
                y as i32 + map_y,
                tile ^ TILE_X_FLIP,
                x as i32 - map_x - width_fix,
            ),
            (false, true) => (
                y as i32 - map_y - height_fix,
                tile ^ TILE_Y_FLIP,
                x as i32 + map_x,
            ),
            (false, false) => (y as i32 + map_y, tile, x as i32 + map_x),
        };

        let mut px = (px as u16) & 0x1FF;
        if px == 0 {
            px += 1; // X=0 acts as a hardware masking sentinel
        }
        table.push(py as u16, map_size, tile, px);
    }
}
