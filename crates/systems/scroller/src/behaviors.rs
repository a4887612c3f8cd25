//! Stock actor behaviors.
//!
//! Every behavior is a plain function over the world context and the actor's
//! slot index; the scheduler dispatches on [`crate::object::Kind`]. Routines
//! follow the original convention of even-numbered coarse states: 0 is
//! one-shot init, 2 is the main state, platforms use 4 while stood on.

use crate::anim::animate_sprite;
use crate::object::{Kind, PlatformScratch, RenderFlags, Scratch, Status};
use crate::player;
use crate::solid::{exit_platform, move_player_on_platform, platform_object, solid_object};
use crate::world::World;

/// Half-width of the platform's landable span.
const PLATFORM_X_RAD: u16 = 0x20;
/// Patrol distance from the spawn anchor, in pixels.
const PLATFORM_SWAY: i16 = 0x40;

/// Solid radii of the block.
const BLOCK_X_RAD: u16 = 0x1B;
const BLOCK_Y_RAD: u16 = 0x10;

/// The player's own behavior: minimal movement so the resolver has
/// something to act against. The full state machine lives outside this core.
pub fn player(world: &mut World, index: usize) {
    match world.pool[index].routine {
        0 => {
            let mappings = world.handles.player;
            let obj = &mut world.pool[index];
            obj.routine = 2;
            obj.priority = 2;
            obj.width_pixels = 0x18;
            obj.x_rad = player::STAND_X_RAD;
            obj.y_rad = player::STAND_Y_RAD;
            obj.render.insert(RenderFlags::ALIGN_FG);
            obj.mappings = Some(mappings);
            obj.scratch = Scratch::Player(Default::default());
        }
        2 => {
            let obj = &mut world.pool[index];
            if obj.status.contains(Status::IN_AIR) {
                obj.object_fall();
            } else {
                obj.speed_to_pos();
            }
            world.display_sprite(index);
        }
        _ => {
            // Dead: plunge off the screen
            world.pool[index].object_fall();
            world.display_sprite(index);
        }
    }
}

/// Swaying platform the player can stand on from above.
pub fn platform(world: &mut World, index: usize) {
    match world.pool[index].routine {
        0 => {
            let mappings = world.handles.platform;
            let obj = &mut world.pool[index];
            let anchor = obj.x.pixels();
            obj.routine = 2;
            obj.priority = 4;
            obj.width_pixels = 0x20;
            obj.y_rad = 8;
            obj.xsp = 0x100;
            obj.render.insert(RenderFlags::ALIGN_FG);
            obj.mappings = Some(mappings);
            obj.scratch = Scratch::Platform(PlatformScratch { origin_x: anchor });
        }
        2 => {
            patrol(world, index);
            platform_object(world, index, PLATFORM_X_RAD);
            world.remember_state(index);
        }
        4 => {
            // Player on top: keep moving, carry them, watch for the exit
            let prev_x = world.pool[index].x.pixels();
            patrol(world, index);
            let (exited, _) = exit_platform(world, index, PLATFORM_X_RAD, PLATFORM_X_RAD);
            if !exited {
                let top = world.pool[index].y.pixels().wrapping_sub(8);
                move_player_on_platform(world, index, top, prev_x);
            }
            world.remember_state(index);
        }
        _ => world.remember_state(index),
    }
}

fn patrol(world: &mut World, index: usize) {
    let anchor = world.pool[index].scratch.platform().origin_x;
    let obj = &mut world.pool[index];
    obj.speed_to_pos();
    let offset = obj.x.pixels().wrapping_sub(anchor);
    if (offset >= PLATFORM_SWAY && obj.xsp > 0) || (offset <= -PLATFORM_SWAY && obj.xsp < 0) {
        obj.xsp = obj.xsp.wrapping_neg();
    }
}

/// Immovable solid block.
pub fn block(world: &mut World, index: usize) {
    if world.pool[index].routine == 0 {
        let mappings = world.handles.block;
        let obj = &mut world.pool[index];
        obj.routine = 2;
        obj.priority = 4;
        obj.width_pixels = BLOCK_X_RAD as u8;
        obj.y_rad = BLOCK_Y_RAD as u8;
        obj.render.insert(RenderFlags::ALIGN_FG);
        obj.mappings = Some(mappings);
    }
    let prev_x = world.pool[index].x.pixels();
    solid_object(world, index, BLOCK_X_RAD, BLOCK_Y_RAD, BLOCK_Y_RAD, prev_x);
    world.remember_state(index);
}

/// Script-animated pickup that despawns off-screen.
pub fn spinner(world: &mut World, index: usize) {
    if world.pool[index].routine == 0 {
        let mappings = world.handles.spinner;
        let obj = &mut world.pool[index];
        obj.routine = 2;
        obj.priority = 2;
        obj.width_pixels = 8;
        obj.render.insert(RenderFlags::ALIGN_FG);
        obj.mappings = Some(mappings);
    }
    let script = world.assets.anim(world.handles.spinner_anim);
    animate_sprite(&mut world.pool[index], &script);
    world.remember_state(index);
}

/// Behavior for actor ids that have no implementation: release the respawn
/// entry and free the slot so the spawner does not reload it every frame.
pub fn fallback(world: &mut World, index: usize) {
    let respawn_index = world.pool[index].respawn_index;
    if respawn_index != 0 {
        world.objstate[respawn_index as usize] &= 0x7F;
    }
    world.pool.delete(index);
    debug_assert_eq!(world.pool[index].kind, Kind::Null);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_patrol_reverses_at_sway_limit() {
        let mut world = World::new();
        let index = world.spawn(Kind::Platform, 0x100, 0x120).unwrap();
        platform(&mut world, index); // init
        assert_eq!(world.pool[index].routine, 2);
        let mut reversed = false;
        for _ in 0..0x100 {
            platform(&mut world, index);
            if world.pool[index].xsp < 0 {
                reversed = true;
                break;
            }
        }
        assert!(reversed);
        assert!(world.pool[index].x.pixels() <= 0x100 + PLATFORM_SWAY + 1);
    }

    #[test]
    fn test_spinner_cycles_frames() {
        let mut world = World::new();
        let index = world.spawn(Kind::Spinner, 0x90, 0x90).unwrap();
        spinner(&mut world, index); // init + first tick
        let mut seen = [false; 4];
        for _ in 0..40 {
            spinner(&mut world, index);
            seen[world.pool[index].frame as usize] = true;
        }
        assert_eq!(seen, [true; 4]);
    }

    #[test]
    fn test_fallback_releases_respawn_entry() {
        let mut world = World::new();
        let index = world
            .spawn_with_respawn(Kind::Fallback, 0x90, 0x90, 0x11)
            .unwrap();
        assert_eq!(world.objstate[0x11] & 0x80, 0x80);
        fallback(&mut world, index);
        assert_eq!(world.objstate[0x11] & 0x80, 0);
        assert_eq!(world.pool[index].kind, Kind::Null);
    }

    #[test]
    fn test_player_init_then_walks() {
        let mut world = World::new();
        player(&mut world, crate::world::PLAYER_SLOT);
        assert_eq!(world.player().routine, 2);
        let start = world.player().x.pixels();
        world.player_mut().xsp = 0x200;
        player(&mut world, crate::world::PLAYER_SLOT);
        assert_eq!(world.player().x.pixels(), start + 2);
        assert!(!world.player().status.contains(Status::IN_AIR));
    }
}
