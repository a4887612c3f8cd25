//! Object scheduler: one pass over the pool per simulation frame.
//!
//! Actors run in slot order, which is semantically significant: later actors
//! observe earlier actors' same-frame mutations, including writes to the
//! shared player record. While the player is in a non-playable state
//! (`routine >= 6`) only the reserved range is simulated and the level range
//! is display-only.

use crate::behaviors;
use crate::object::{Kind, RenderFlags, OBJECTS, RESERVED_OBJECTS};
use crate::world::World;

/// Run every live actor for this frame.
pub fn execute_objects(world: &mut World) {
    if world.player().routine < 6 {
        // Active gameplay: the whole pool runs
        for index in 0..OBJECTS {
            let kind = world.pool[index].kind;
            if kind != Kind::Null {
                dispatch(world, index, kind);
            }
        }
    } else {
        // Cutscene/menu/death: simulate only the always-active range
        for index in 0..RESERVED_OBJECTS {
            let kind = world.pool[index].kind;
            if kind != Kind::Null {
                dispatch(world, index, kind);
            }
        }

        // Level actors keep displaying where they stood, without running
        for index in RESERVED_OBJECTS..OBJECTS {
            let obj = &world.pool[index];
            if obj.kind != Kind::Null && obj.render.contains(RenderFlags::ON_SCREEN) {
                world.display_sprite(index);
            }
        }
    }
}

/// Behavior dispatch table. Entry 0 is reserved: a free slot is filtered out
/// before dispatch, so reaching it is an invariant violation.
fn dispatch(world: &mut World, index: usize, kind: Kind) {
    match kind {
        Kind::Null => debug_assert!(false, "dispatched a free slot"),
        Kind::Player => behaviors::player(world, index),
        Kind::Platform => behaviors::platform(world, index),
        Kind::Block => behaviors::block(world, index),
        Kind::Spinner => behaviors::spinner(world, index),
        Kind::Fallback => behaviors::fallback(world, index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_slots_are_never_dispatched() {
        let mut world = World::new();
        // A free slot with stale-looking data must stay untouched
        world.pool[0x30].routine = 0;
        execute_objects(&mut world);
        assert_eq!(world.pool[0x30].kind, Kind::Null);
        assert_eq!(world.pool[0x30].routine, 0);
    }

    #[test]
    fn test_active_mode_runs_level_range() {
        let mut world = World::new();
        let index = world.spawn(Kind::Spinner, 0x90, 0x90).unwrap();
        execute_objects(&mut world);
        // Behavior ran: one-shot init moved the routine forward
        assert_eq!(world.pool[index].routine, 2);
    }

    #[test]
    fn test_inactive_mode_displays_level_range_without_running() {
        let mut world = World::new();
        let index = world.spawn(Kind::Spinner, 0x90, 0x90).unwrap();
        execute_objects(&mut world); // init + first display pass
        world.pool[index].render.insert(RenderFlags::ON_SCREEN);
        let routine = world.pool[index].routine;
        let frame = world.pool[index].frame;

        world.player_mut().routine = 6;
        execute_objects(&mut world);
        // Not simulated, but queued for display
        assert_eq!(world.pool[index].routine, routine);
        assert_eq!(world.pool[index].frame, frame);
        assert!(world.queues.bucket_len(world.pool[index].priority as usize) > 0);
    }

    #[test]
    fn test_inactive_mode_skips_offscreen_level_actors() {
        let mut world = World::new();
        let index = world.spawn(Kind::Block, 0x90, 0x90).unwrap();
        execute_objects(&mut world); // block picks up its priority on init
        world.queues.clear();
        world.player_mut().routine = 6;
        execute_objects(&mut world);
        // Never actually drawn, so the display-only pass must skip it
        assert!(!world.pool[index].render.contains(RenderFlags::ON_SCREEN));
        assert_eq!(world.queues.bucket_len(world.pool[index].priority as usize), 0);
    }
}
