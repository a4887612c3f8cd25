//! Actor records and the fixed-capacity object pool.
//!
//! The pool is two contiguous ranges of preallocated slots: a small
//! "reserved" range that is always simulated (the player lives in slot 0)
//! and a larger "level" range that is only simulated during active gameplay.
//! A slot with [`Kind::Null`] is free; deleting an actor resets the whole
//! record synchronously, with `mappings` explicitly back to the `None`
//! sentinel (which is a distinct state, not a zero bit pattern).

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::assets::MapHandle;
use rush_core::fixed::{Fixed, Speed};

/// Always-simulated slots; slot 0 is the player.
pub const RESERVED_OBJECTS: usize = 0x20;
/// Slots simulated only during active gameplay.
pub const LEVEL_OBJECTS: usize = 0x60;
/// Total pool capacity.
pub const OBJECTS: usize = RESERVED_OBJECTS + LEVEL_OBJECTS;

/// Gravity applied by [`Object::object_fall`], in 8.8 units per frame.
pub const GRAVITY: Speed = 0x38;

/// Behavior selector. `Null` marks a free slot and is never dispatched;
/// the scheduler's dispatch table reserves index 0 as an explicit invariant.
/// Being a sealed enum, undefined selector values are unrepresentable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Kind {
    #[default]
    Null = 0,
    Player = 1,
    Platform = 2,
    Block = 3,
    Spinner = 4,
    /// Placeholder for actor ids with no behavior yet: releases its respawn
    /// entry and frees the slot.
    Fallback = 5,
}

impl Kind {
    pub fn from_u8(v: u8) -> Option<Kind> {
        match v {
            0 => Some(Kind::Null),
            1 => Some(Kind::Player),
            2 => Some(Kind::Platform),
            3 => Some(Kind::Block),
            4 => Some(Kind::Spinner),
            5 => Some(Kind::Fallback),
            _ => None,
        }
    }
}

bitflags! {
    /// Render control bits, in the original hardware layout.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct RenderFlags: u8 {
        const X_FLIP = 0x01;
        const Y_FLIP = 0x02;
        /// Position is world-relative to the foreground (primary) layer.
        const ALIGN_FG = 0x04;
        /// Position is world-relative to a background layer.
        const ALIGN_BG = 0x08;
        /// `mappings` points directly at a piece list instead of a
        /// frame-indexed offset table.
        const RAW_MAPPINGS = 0x10;
        /// Vertical culling uses `y_rad` instead of the fixed default band.
        const YRAD_HEIGHT = 0x20;
        /// Set by the draw-list builder only when the actor was actually
        /// emitted this frame.
        const ON_SCREEN = 0x80;
    }
}

bitflags! {
    /// Status bits. The byte is shared between a player view and an object
    /// view, so several names deliberately alias the same bit exactly as the
    /// original actors overlaid them.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct Status: u8 {
        /// Facing (player) / inherent horizontal flip (object).
        const X_FLIP = 0x01;
        /// Inherent vertical flip (object view of bit 1).
        const Y_FLIP = 0x02;
        /// Airborne (player view of bit 1).
        const IN_AIR = 0x02;
        /// Rolling (player).
        const ROLLING = 0x04;
        /// Player view of bit 3: standing on an object.
        const OBJECT_STAND = 0x08;
        /// Object view of bit 3: the player stands on this actor.
        const PLAYER_STAND = 0x08;
        /// Jump started from a roll (player).
        const ROLL_JUMP = 0x10;
        /// Player view of bit 5: pushing against a solid.
        const PUSHING = 0x20;
        /// Object view of bit 5: the player pushes this actor.
        const PLAYER_PUSH = 0x20;
    }
}

/// Player-behavior scratch fields exposed to the collision resolver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScratch {
    /// Pool index of the object the player stands on (valid while the
    /// player's `OBJECT_STAND` bit is set).
    pub standing_obj: u8,
}

/// Platform-behavior scratch fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformScratch {
    /// Patrol anchor, integer pixels.
    pub origin_x: i16,
}

/// Per-behavior scratch area. A free slot always holds `Scratch::None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scratch {
    #[default]
    None,
    Player(PlayerScratch),
    Platform(PlatformScratch),
}

impl Scratch {
    /// Player view; defaults when the slot holds something else.
    pub fn player(&self) -> PlayerScratch {
        match self {
            Scratch::Player(s) => *s,
            _ => PlayerScratch::default(),
        }
    }

    pub fn player_mut(&mut self) -> &mut PlayerScratch {
        if !matches!(self, Scratch::Player(_)) {
            *self = Scratch::Player(PlayerScratch::default());
        }
        match self {
            Scratch::Player(s) => s,
            _ => unreachable!(),
        }
    }

    pub fn platform(&self) -> PlatformScratch {
        match self {
            Scratch::Platform(s) => *s,
            _ => PlatformScratch::default(),
        }
    }

    pub fn platform_mut(&mut self) -> &mut PlatformScratch {
        if !matches!(self, Scratch::Platform(_)) {
            *self = Scratch::Platform(PlatformScratch::default());
        }
        match self {
            Scratch::Platform(s) => s,
            _ => unreachable!(),
        }
    }
}

/// One actor record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Object {
    pub kind: Kind,
    /// Coarse state-machine counter, meaning defined per behavior.
    pub routine: u8,
    /// Secondary counter; nonzero on solids marks an active standing link.
    pub routine_sec: u8,
    pub x: Fixed,
    pub y: Fixed,
    pub xsp: Speed,
    pub ysp: Speed,
    /// Ground velocity (player only).
    pub inertia: Speed,
    pub angle: u8,
    /// Horizontal radius used for draw culling and top-landing alignment.
    pub width_pixels: u8,
    /// Horizontal collision radius (player).
    pub x_rad: u8,
    /// Vertical collision radius.
    pub y_rad: u8,
    /// Draw bucket, 0 (bottom) to 7 (top).
    pub priority: u8,
    /// Base tile index added to every sprite piece.
    pub tile: u16,
    /// Mapping bank, or `None` while the actor is not ready to draw.
    pub mappings: Option<MapHandle>,
    pub frame: u8,
    pub anim: u8,
    pub prev_anim: u8,
    pub anim_frame: u8,
    /// Signed frame-hold countdown for the animation interpreter.
    pub frame_time: i8,
    pub render: RenderFlags,
    pub status: Status,
    /// Back-reference into the external object-state table; 0 = no entry.
    pub respawn_index: u8,
    pub scratch: Scratch,
}

impl Object {
    /// Apply one frame of velocity.
    pub fn speed_to_pos(&mut self) {
        self.x.advance(self.xsp);
        self.y.advance(self.ysp);
    }

    /// Apply one frame of velocity, then gravity.
    pub fn object_fall(&mut self) {
        self.x.advance(self.xsp);
        self.y.advance(self.ysp);
        self.ysp = self.ysp.wrapping_add(GRAVITY);
    }
}

/// The preallocated actor pool.
#[derive(Debug, Clone)]
pub struct Pool {
    slots: Vec<Object>,
}

impl Pool {
    pub fn new() -> Self {
        Self {
            slots: vec![Object::default(); OBJECTS],
        }
    }

    /// Linear scan of the level range for a free slot.
    pub fn find_free(&self) -> Option<usize> {
        (RESERVED_OBJECTS..OBJECTS).find(|&i| self.slots[i].kind == Kind::Null)
    }

    /// Scan onward from `from` (inclusive) for a free slot.
    pub fn find_next_free(&self, from: usize) -> Option<usize> {
        (from..OBJECTS).find(|&i| self.slots[i].kind == Kind::Null)
    }

    /// Free a slot immediately. The record is fully reset; `mappings` ends
    /// up as the `None` sentinel.
    pub fn delete(&mut self, index: usize) {
        self.slots[index] = Object::default();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Object> {
        self.slots.iter()
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for Pool {
    type Output = Object;

    fn index(&self, index: usize) -> &Object {
        &self.slots[index]
    }
}

impl std::ops::IndexMut<usize> for Pool {
    fn index_mut(&mut self, index: usize) -> &mut Object {
        &mut self.slots[index]
    }
}
