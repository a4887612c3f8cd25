//! Minimal player surface exposed to the collision resolver.
//!
//! The full player state machine lives outside this core; the resolver only
//! needs the landing and death transitions plus a couple of animation ids.

use crate::object::{RenderFlags, Status};
use crate::world::World;
use rush_core::logging::{log, LogCategory, LogLevel};

/// Standing collision radii.
pub const STAND_X_RAD: u8 = 0x09;
pub const STAND_Y_RAD: u8 = 0x13;

/// Animation ids the resolver writes directly.
pub const ANIM_WALK: u8 = 0;
pub const ANIM_RUN: u8 = 1;

/// Gravity pull applied while falling during the death plunge, 8.8 units.
const DEATH_BOUNCE: i16 = -0x700;

/// Put an airborne player back on their feet after landing on an object.
pub fn reset_on_floor(world: &mut World) {
    let p = world.player_mut();
    let was_rolling = p.status.contains(Status::ROLLING);
    p.status.remove(Status::IN_AIR);
    p.status.remove(Status::ROLL_JUMP);
    if was_rolling {
        p.status.remove(Status::ROLLING);
        p.anim = ANIM_WALK;
        p.y_rad = STAND_Y_RAD;
        p.x_rad = STAND_X_RAD;
    }
}

/// Kill the player (squashed by a solid's underside, or equivalent).
///
/// Switching `routine` to 6 is what flips the scheduler into its
/// reserved-only mode on the next frame.
pub fn kill_player(world: &mut World, source: usize) {
    if world.player().routine >= 6 {
        return;
    }
    log(LogCategory::Collide, LogLevel::Info, || {
        format!("player killed by slot {}", source)
    });
    let p = world.player_mut();
    p.routine = 6;
    p.status.insert(Status::IN_AIR);
    p.status.remove(Status::OBJECT_STAND);
    p.render.remove(RenderFlags::ON_SCREEN);
    p.ysp = DEATH_BOUNCE;
    p.xsp = 0;
    p.inertia = 0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_on_floor_clears_air_state() {
        let mut world = World::new();
        world.player_mut().status.insert(Status::IN_AIR);
        world.player_mut().status.insert(Status::ROLL_JUMP);
        reset_on_floor(&mut world);
        assert!(!world.player().status.contains(Status::IN_AIR));
        assert!(!world.player().status.contains(Status::ROLL_JUMP));
    }

    #[test]
    fn test_reset_on_floor_uncurls() {
        let mut world = World::new();
        world.player_mut().status.insert(Status::IN_AIR | Status::ROLLING);
        world.player_mut().y_rad = 0x0E;
        reset_on_floor(&mut world);
        assert!(!world.player().status.contains(Status::ROLLING));
        assert_eq!(world.player().y_rad, STAND_Y_RAD);
        assert_eq!(world.player().anim, ANIM_WALK);
    }

    #[test]
    fn test_kill_switches_to_dead_routine() {
        let mut world = World::new();
        world.player_mut().xsp = 0x400;
        kill_player(&mut world, 5);
        assert_eq!(world.player().routine, 6);
        assert_eq!(world.player().xsp, 0);
        assert_eq!(world.player().ysp, DEATH_BOUNCE);
        assert!(world.player().status.contains(Status::IN_AIR));
    }

    #[test]
    fn test_kill_is_idempotent_once_dead() {
        let mut world = World::new();
        kill_player(&mut world, 5);
        world.player_mut().ysp = 0x123;
        kill_player(&mut world, 6);
        assert_eq!(world.player().ysp, 0x123);
    }
}
