//! The owned simulation context.
//!
//! Everything the original kept as globals — the actor pool, the player
//! record, scroll positions, the draw queues, the sprite buffer, the
//! object-state table and the lock/debug flags — lives on [`World`] and is
//! passed explicitly to every behavior call. The single-pass, no-locking
//! semantics are unchanged because the context is never accessed
//! concurrently.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::assets::{Assets, MapHandle};
use crate::data;
use crate::exec::execute_objects;
use crate::object::{Kind, Object, Pool, RenderFlags, Scratch, Status, OBJECTS};
use crate::sprite::{build_sprites, DrawQueues};
use rush_core::fixed::Fixed;
use rush_core::logging::{log, LogCategory, LogLevel};
use rush_core::vdp::SpriteTable;
use rush_core::Machine;

/// The player always occupies the first reserved slot.
pub const PLAYER_SLOT: usize = 0;

/// Entries in the external object-state table; index 0 means "no entry".
pub const OBJSTATE_ENTRIES: usize = 0x100;

/// The bit marking a respawn entry as currently loaded.
pub const OBJSTATE_LOADED: u8 = 0x80;

const SAVE_VERSION: u32 = 1;

/// Simulation errors surfaced to callers.
#[derive(Debug, Error)]
pub enum ScrollerError {
    #[error("no free slot in the level object range")]
    PoolExhausted,
}

/// Fixed-point scroll positions for the three scrolling layers, fed in by
/// the external level/camera code every frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollState {
    pub fg_x: Fixed,
    pub fg_y: Fixed,
    pub bg_x: Fixed,
    pub bg_y: Fixed,
    pub bg3_x: Fixed,
    pub bg3_y: Fixed,
}

impl ScrollState {
    /// Scroll offsets for the layer an actor is aligned to, selected the
    /// way the original indexed its screen-position table.
    pub(crate) fn layer(&self, render: RenderFlags) -> (i16, i16) {
        let selector = ((render.contains(RenderFlags::ALIGN_BG) as u8) << 1)
            | render.contains(RenderFlags::ALIGN_FG) as u8;
        match selector {
            2 => (self.bg_x.pixels(), self.bg_y.pixels()),
            3 => (self.bg3_x.pixels(), self.bg3_y.pixels()),
            _ => (self.fg_x.pixels(), self.fg_y.pixels()),
        }
    }
}

/// Mapping and script banks for the stock actors.
#[derive(Debug, Clone, Copy)]
pub struct StageHandles {
    pub player: MapHandle,
    pub platform: MapHandle,
    pub block: MapHandle,
    pub spinner: MapHandle,
    pub spinner_anim: crate::assets::AnimHandle,
}

/// The simulation context.
#[derive(Debug)]
pub struct World {
    pub pool: Pool,
    /// External persistence bitfield indexed by `respawn_index`; bit 7 is
    /// the "currently loaded" mark spawners check to suppress respawning.
    pub objstate: [u8; OBJSTATE_ENTRIES],
    pub scroll: ScrollState,
    pub queues: DrawQueues,
    pub table: SpriteTable,
    pub assets: Assets,
    pub handles: StageHandles,
    /// Bit 7 freezes all player-object interaction (multiplayer lock).
    pub lock_multi: u8,
    /// Debug placement mode bypasses collision entirely.
    pub debug_use: bool,
    pub frame_counter: u32,
}

impl World {
    pub fn new() -> Self {
        let mut assets = Assets::new();
        let handles = StageHandles {
            player: assets
                .register_mappings(&data::PLAYER_MAPPINGS)
                .expect("built-in bank"),
            platform: assets
                .register_mappings(&data::PLATFORM_MAPPINGS)
                .expect("built-in bank"),
            block: assets
                .register_mappings(&data::BLOCK_MAPPINGS)
                .expect("built-in bank"),
            spinner: assets
                .register_mappings(&data::SPINNER_MAPPINGS)
                .expect("built-in bank"),
            spinner_anim: assets
                .register_anim(&data::SPINNER_ANIM)
                .expect("built-in bank"),
        };

        let mut world = Self {
            pool: Pool::new(),
            objstate: [0; OBJSTATE_ENTRIES],
            scroll: ScrollState::default(),
            queues: DrawQueues::new(),
            table: SpriteTable::new(),
            assets,
            handles,
            lock_multi: 0,
            debug_use: false,
            frame_counter: 0,
        };
        world.place_player();
        world
    }

    /// Seed the player record at its power-on position.
    fn place_player(&mut self) {
        let p = &mut self.pool[PLAYER_SLOT];
        p.kind = Kind::Player;
        p.x = Fixed::from_pixels(0x50);
        p.y = Fixed::from_pixels(0x100);
    }

    pub fn player(&self) -> &Object {
        &self.pool[PLAYER_SLOT]
    }

    pub fn player_mut(&mut self) -> &mut Object {
        &mut self.pool[PLAYER_SLOT]
    }

    /// Spawn an actor into the first free level slot.
    pub fn spawn(&mut self, kind: Kind, x: i16, y: i16) -> Result<usize, ScrollerError> {
        let index = self.pool.find_free().ok_or(ScrollerError::PoolExhausted)?;
        log(LogCategory::Pool, LogLevel::Debug, || {
            format!("spawn {:?} into slot {} at ({:#x}, {:#x})", kind, index, x, y)
        });
        let obj = &mut self.pool[index];
        obj.kind = kind;
        obj.x = Fixed::from_pixels(x);
        obj.y = Fixed::from_pixels(y);
        Ok(index)
    }

    /// Spawn with a persistence entry, marking it loaded so the spawner
    /// will not place the actor again while it lives.
    pub fn spawn_with_respawn(
        &mut self,
        kind: Kind,
        x: i16,
        y: i16,
        respawn_index: u8,
    ) -> Result<usize, ScrollerError> {
        let index = self.spawn(kind, x, y)?;
        self.pool[index].respawn_index = respawn_index;
        self.objstate[respawn_index as usize] |= OBJSTATE_LOADED;
        Ok(index)
    }

    /// Whether a respawn entry is currently loaded (spawners must skip it).
    pub fn respawn_loaded(&self, respawn_index: u8) -> bool {
        self.objstate[respawn_index as usize] & OBJSTATE_LOADED != 0
    }

    /// Queue an actor for drawing this frame. Silently dropped when the
    /// priority bucket is full.
    pub fn display_sprite(&mut self, index: usize) {
        let priority = self.pool[index].priority;
        self.queues.push(priority, index);
    }

    /// Off-screen handling for level actors: despawn and release the
    /// persistence entry once the actor leaves the horizontal window,
    /// otherwise queue it for drawing.
    pub fn remember_state(&mut self, index: usize) {
        if is_offscreen(self.pool[index].x.pixels(), self.scroll.fg_x.pixels()) {
            let respawn_index = self.pool[index].respawn_index;
            if respawn_index != 0 {
                self.objstate[respawn_index as usize] &= !OBJSTATE_LOADED;
            }
            log(LogCategory::Pool, LogLevel::Debug, || {
                format!("slot {} despawned off-screen", index)
            });
            self.pool.delete(index);
        } else {
            self.display_sprite(index);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// The original's off-screen window test: both coordinates are snapped to
/// 128-pixel columns and compared unsigned against a 0x280 window around
/// the camera.
fn is_offscreen(x: i16, camera_x: i16) -> bool {
    let x = (x as u16) & 0xFF80;
    let window = ((camera_x.wrapping_sub(0x80)) as u16) & 0xFF80;
    x.wrapping_sub(window) > 0x280
}

impl Machine for World {
    type Error = ScrollerError;

    fn reset(&mut self) {
        self.pool = Pool::new();
        self.objstate = [0; OBJSTATE_ENTRIES];
        self.scroll = ScrollState::default();
        self.queues.clear();
        self.table.clear();
        self.lock_multi = 0;
        self.debug_use = false;
        self.frame_counter = 0;
        self.place_player();
    }

    fn step_frame(&mut self) -> Result<SpriteTable, Self::Error> {
        execute_objects(self);
        build_sprites(self);
        self.frame_counter = self.frame_counter.wrapping_add(1);
        Ok(self.table.clone())
    }

    fn save_state(&self) -> Value {
        let objects = (0..OBJECTS)
            .filter(|&i| self.pool[i].kind != Kind::Null)
            .map(|i| SavedObject::capture(i, &self.pool[i]))
            .collect();
        let saved = SavedState {
            version: SAVE_VERSION,
            frame_counter: self.frame_counter,
            lock_multi: self.lock_multi,
            debug_use: self.debug_use,
            scroll: [
                self.scroll.fg_x.raw(),
                self.scroll.fg_y.raw(),
                self.scroll.bg_x.raw(),
                self.scroll.bg_y.raw(),
                self.scroll.bg3_x.raw(),
                self.scroll.bg3_y.raw(),
            ],
            objstate: self.objstate.to_vec(),
            objects,
        };
        serde_json::to_value(&saved).unwrap_or(Value::Null)
    }

    fn load_state(&mut self, v: &Value) -> Result<(), serde_json::Error> {
        let saved: SavedState = serde_json::from_value(v.clone())?;
        if saved.version != SAVE_VERSION {
            return Err(serde::de::Error::custom(format!(
                "unsupported save version {}",
                saved.version
            )));
        }

        self.pool = Pool::new();
        self.objstate = [0; OBJSTATE_ENTRIES];
        for (slot, byte) in self
            .objstate
            .iter_mut()
            .zip(saved.objstate.iter().copied())
        {
            *slot = byte;
        }

        for saved_obj in &saved.objects {
            if saved_obj.slot as usize >= OBJECTS {
                log(LogCategory::Pool, LogLevel::Warn, || {
                    format!("save state slot {} out of range, dropped", saved_obj.slot)
                });
                continue;
            }
            saved_obj.restore(&mut self.pool[saved_obj.slot as usize], &self.assets);
        }

        self.scroll.fg_x = Fixed::from_raw(saved.scroll[0]);
        self.scroll.fg_y = Fixed::from_raw(saved.scroll[1]);
        self.scroll.bg_x = Fixed::from_raw(saved.scroll[2]);
        self.scroll.bg_y = Fixed::from_raw(saved.scroll[3]);
        self.scroll.bg3_x = Fixed::from_raw(saved.scroll[4]);
        self.scroll.bg3_y = Fixed::from_raw(saved.scroll[5]);
        self.lock_multi = saved.lock_multi;
        self.debug_use = saved.debug_use;
        self.frame_counter = saved.frame_counter;
        self.queues.clear();
        self.table.clear();
        Ok(())
    }
}

/// Serialized form of the whole simulation.
#[derive(Debug, Serialize, Deserialize)]
struct SavedState {
    version: u32,
    frame_counter: u32,
    lock_multi: u8,
    debug_use: bool,
    scroll: [i32; 6],
    objstate: Vec<u8>,
    objects: Vec<SavedObject>,
}

/// Serialized form of one live actor.
#[derive(Debug, Serialize, Deserialize)]
struct SavedObject {
    slot: u8,
    kind: u8,
    routine: u8,
    routine_sec: u8,
    x: i32,
    y: i32,
    xsp: i16,
    ysp: i16,
    inertia: i16,
    angle: u8,
    width_pixels: u8,
    x_rad: u8,
    y_rad: u8,
    priority: u8,
    tile: u16,
    mappings: Option<u16>,
    frame: u8,
    anim: u8,
    prev_anim: u8,
    anim_frame: u8,
    frame_time: i8,
    render: u8,
    status: u8,
    respawn_index: u8,
    scratch: Scratch,
}

impl SavedObject {
    fn capture(slot: usize, obj: &Object) -> Self {
        Self {
            slot: slot as u8,
            kind: obj.kind as u8,
            routine: obj.routine,
            routine_sec: obj.routine_sec,
            x: obj.x.raw(),
            y: obj.y.raw(),
            xsp: obj.xsp,
            ysp: obj.ysp,
            inertia: obj.inertia,
            angle: obj.angle,
            width_pixels: obj.width_pixels,
            x_rad: obj.x_rad,
            y_rad: obj.y_rad,
            priority: obj.priority,
            tile: obj.tile,
            mappings: obj.mappings.map(|h| h.index()),
            frame: obj.frame,
            anim: obj.anim,
            prev_anim: obj.prev_anim,
            anim_frame: obj.anim_frame,
            frame_time: obj.frame_time,
            render: obj.render.bits(),
            status: obj.status.bits(),
            respawn_index: obj.respawn_index,
            scratch: obj.scratch,
        }
    }

    fn restore(&self, obj: &mut Object, assets: &Assets) {
        let Some(kind) = Kind::from_u8(self.kind) else {
            log(LogCategory::Pool, LogLevel::Warn, || {
                format!("save state kind {} unknown, slot dropped", self.kind)
            });
            return;
        };
        obj.kind = kind;
        obj.routine = self.routine;
        obj.routine_sec = self.routine_sec;
        obj.x = Fixed::from_raw(self.x);
        obj.y = Fixed::from_raw(self.y);
        obj.xsp = self.xsp;
        obj.ysp = self.ysp;
        obj.inertia = self.inertia;
        obj.angle = self.angle;
        obj.width_pixels = self.width_pixels;
        obj.x_rad = self.x_rad;
        obj.y_rad = self.y_rad;
        obj.priority = self.priority;
        obj.tile = self.tile;
        obj.mappings = match self.mappings {
            Some(raw) if assets.mapping_handle_valid(raw) => Some(MapHandle(raw)),
            Some(raw) => {
                log(LogCategory::Pool, LogLevel::Warn, || {
                    format!("save state mapping handle {} unknown, cleared", raw)
                });
                None
            }
            None => None,
        };
        obj.frame = self.frame;
        obj.anim = self.anim;
        obj.prev_anim = self.prev_anim;
        obj.anim_frame = self.anim_frame;
        obj.frame_time = self.frame_time;
        obj.render = RenderFlags::from_bits_truncate(self.render);
        obj.status = Status::from_bits_truncate(self.status);
        obj.respawn_index = self.respawn_index;
        obj.scratch = self.scratch;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offscreen_window() {
        assert!(!is_offscreen(0x90, 0));
        assert!(!is_offscreen(0x240, 0x80));
        assert!(is_offscreen(0x500, 0));
        // The window extends one column left of the camera
        assert!(!is_offscreen(0x00, 0x80));
        assert!(is_offscreen(-0x100, 0x80));
    }

    #[test]
    fn test_spawn_uses_level_range() {
        let mut world = World::new();
        let index = world.spawn(Kind::Block, 0x200, 0x100).unwrap();
        assert!(index >= crate::object::RESERVED_OBJECTS);
        assert_eq!(world.pool[index].kind, Kind::Block);
        assert_eq!(world.pool[index].x.pixels(), 0x200);
    }

    #[test]
    fn test_spawn_exhaustion_is_an_error() {
        let mut world = World::new();
        while world.spawn(Kind::Spinner, 0x90, 0x90).is_ok() {}
        assert!(matches!(
            world.spawn(Kind::Spinner, 0x90, 0x90),
            Err(ScrollerError::PoolExhausted)
        ));
    }

    #[test]
    fn test_respawn_entry_lifecycle() {
        let mut world = World::new();
        let index = world
            .spawn_with_respawn(Kind::Spinner, 0x600, 0x90, 0x21)
            .unwrap();
        assert!(world.respawn_loaded(0x21));
        // Way right of the camera: despawns and releases the entry
        world.remember_state(index);
        assert_eq!(world.pool[index].kind, Kind::Null);
        assert!(!world.respawn_loaded(0x21));
    }

    #[test]
    fn test_save_load_roundtrip_preserves_actors() {
        let mut world = World::new();
        let index = world.spawn(Kind::Platform, 0x300, 0x140).unwrap();
        world.pool[index].xsp = 0x100;
        world.scroll.fg_x = Fixed::from_pixels(0x40);
        world.frame_counter = 77;

        let state = world.save_state();
        let mut restored = World::new();
        restored.load_state(&state).unwrap();

        assert_eq!(restored.frame_counter, 77);
        assert_eq!(restored.scroll.fg_x.pixels(), 0x40);
        assert_eq!(restored.pool[index].kind, Kind::Platform);
        assert_eq!(restored.pool[index].xsp, 0x100);
        assert_eq!(restored.pool[index].x.pixels(), 0x300);
        assert_eq!(restored.player().kind, Kind::Player);
    }

    #[test]
    fn test_load_state_rejects_unknown_version() {
        let mut world = World::new();
        let mut state = world.save_state();
        state["version"] = serde_json::json!(999);
        assert!(world.load_state(&state).is_err());
    }

    #[test]
    fn test_step_frame_produces_terminated_table() {
        let mut world = World::new();
        world.spawn(Kind::Block, 0x90, 0xC0).unwrap();
        let table = world.step_frame().unwrap();
        let emitted = table.link_count();
        assert!(emitted > 0);
        let words = table.words();
        assert_eq!(words[emitted as usize * 4], 0);
        assert_eq!(words[emitted as usize * 4 + 1], 0);
    }
}
