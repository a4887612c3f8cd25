//! Platform and solid-object collision against the player.
//!
//! Two protocols: pass-through platforms (landable from above only) and
//! solid objects (block on all four sides). Both mutate the shared player
//! record directly; the single-pass slot ordering of the scheduler is what
//! makes that sound. All offset arithmetic is 16-bit wrapping with the
//! original's unsigned clip comparisons.

use crate::object::Status;
use crate::player;
use crate::world::World;
use rush_core::logging::{log, LogCategory, LogLevel};

/// Outcome of a solid-object check, for the calling behavior to branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// No interaction this frame.
    None,
    /// Resolved as a top landing (takes priority over the other faces).
    Top,
    /// Resolved against a side (or cleared push state).
    Side,
}

impl Contact {
    /// The original's return convention: 0 none, -1 top, 1 side.
    pub fn code(self) -> i8 {
        match self {
            Contact::None => 0,
            Contact::Top => -1,
            Contact::Side => 1,
        }
    }
}

/// Carry the player along with a moving platform and pin them to its top.
pub fn move_player_on_platform(world: &mut World, index: usize, top: i16, prev_x: i16) {
    if world.lock_multi & 0x80 != 0 {
        return;
    }
    if world.player().routine >= 6 {
        return;
    }
    if world.debug_use {
        return;
    }

    let y_rad = world.player().y_rad as i16;
    let delta_x = world.pool[index].x.pixels().wrapping_sub(prev_x);
    let p = world.player_mut();
    p.y.set_pixels(top.wrapping_sub(y_rad));
    p.x.add_pixels(delta_x);
}

/// Pass-through platform entry: horizontal span test while falling, then
/// the vertical proximity check against the platform top.
pub fn platform_object(world: &mut World, index: usize, x_rad: u16) {
    // Only meaningful while falling
    if world.player().ysp < 0 {
        return;
    }

    let x_off = world
        .player()
        .x
        .pixels()
        .wrapping_sub(world.pool[index].x.pixels())
        .wrapping_add(x_rad as i16);
    if x_off < 0 || (x_off as i32) >= ((x_rad as i32) << 1) {
        return;
    }

    let top = world.pool[index].y.pixels().wrapping_sub(8);
    platform3(world, index, top);
}

/// Land the player on a platform top within the tolerance band, moving the
/// standing attachment from any previously-attached object to this one.
pub fn platform3(world: &mut World, index: usize, top: i16) {
    // Vertical proximity against the player's bottom edge
    let py = world.player().y.pixels();
    let by = py
        .wrapping_add(world.player().y_rad as i16)
        .wrapping_add(4);
    if top > by {
        return;
    }
    let gap = top.wrapping_sub(by);
    if gap < -16 {
        return;
    }

    if (world.lock_multi & 0x80) != 0 || world.player().routine >= 6 {
        return;
    }

    log(LogCategory::Collide, LogLevel::Trace, || {
        format!("player lands on platform in slot {}", index)
    });

    // Clip on top of the platform
    let clipped = gap.wrapping_add(py).wrapping_add(3);
    world.player_mut().y.set_pixels(clipped);

    world.pool[index].routine = world.pool[index].routine.wrapping_add(2);

    detach_previous_standing(world, true);
    attach_player(world, index);
}

/// Detach check for a platform the player currently stands on: leaving the
/// horizontal span or going airborne releases both records.
///
/// Returns whether the player left, plus the walked horizontal offset for
/// callers that keep carrying the player.
pub fn exit_platform(world: &mut World, index: usize, x_rad: u16, x_dia2: u16) -> (bool, i16) {
    let x_dia = (x_dia2 as i32) << 1;

    if !world.player().status.contains(Status::IN_AIR) {
        let x_off = world
            .player()
            .x
            .pixels()
            .wrapping_sub(world.pool[index].x.pixels())
            .wrapping_add(x_rad as i16);
        if x_off >= 0 && (x_off as i32) < x_dia {
            return (false, x_off);
        }
    }

    // Release the player from the platform
    world.player_mut().status.remove(Status::OBJECT_STAND);
    world.pool[index].routine = 2;
    world.pool[index].status.remove(Status::PLAYER_STAND);
    (true, 0)
}

/// Umbrella entry point for solid objects.
///
/// While the object carries an active standing link (`routine_sec` nonzero)
/// this re-runs the ride/exit check instead of the entry test. Returns the
/// contact outcome plus the clip offsets from the entry test.
pub fn solid_object(
    world: &mut World,
    index: usize,
    x_rad: u16,
    y_rad: u16,
    y_rad_stand: u16,
    prev_x: i16,
) -> (Contact, i16, i16) {
    if world.pool[index].routine_sec != 0 {
        let x_dia = (x_rad as i32) << 1;

        if !world.player().status.contains(Status::IN_AIR) {
            let x_off = world
                .player()
                .x
                .pixels()
                .wrapping_sub(world.pool[index].x.pixels())
                .wrapping_add(x_rad as i16);
            if x_off >= 0 && (x_off as i32) <= x_dia {
                // Still on top: ride along
                let top = world.pool[index]
                    .y
                    .pixels()
                    .wrapping_sub(y_rad_stand as i16);
                move_player_on_platform(world, index, top, prev_x);
                return (Contact::None, 0, 0);
            }
        }

        // Walked or jumped off
        world.player_mut().status.remove(Status::OBJECT_STAND);
        world.pool[index].status.remove(Status::PLAYER_STAND);
        world.pool[index].routine_sec = 0;
        return (Contact::None, 0, 0);
    }

    solid_chk_enter(world, index, x_rad, y_rad)
}

/// Entry test: penetration offsets against the combined bounding boxes, then
/// side / bottom / top resolution by smallest clip distance.
fn solid_chk_enter(world: &mut World, index: usize, x_rad: u16, y_rad: u16) -> (Contact, i16, i16) {
    let mut x_off = world
        .player()
        .x
        .pixels()
        .wrapping_sub(world.pool[index].x.pixels())
        .wrapping_add(x_rad as i16);
    let x_dia = x_rad << 1;
    let mut y_off = 0i16;

    if x_off >= 0 && (x_off as i32) <= (x_dia as i32) {
        let y_rad = y_rad.wrapping_add(world.player().y_rad as u16);
        y_off = world
            .player()
            .y
            .pixels()
            .wrapping_sub(world.pool[index].y.pixels())
            .wrapping_add(4)
            .wrapping_add(y_rad as i16);
        let y_dia = y_rad << 1;

        if y_off >= 0 && (y_off as i32) < (y_dia as i32) {
            if world.lock_multi & 0x80 == 0 {
                if world.player().routine >= 6 || world.debug_use {
                    return (Contact::None, x_off, y_off);
                }

                // X clip: distance to the nearer vertical face
                let mut x_clip = x_off as u16;
                if (x_rad as i32) < (x_off as i32) {
                    x_off = x_off.wrapping_sub(x_dia as i16);
                    x_clip = x_off.wrapping_neg() as u16;
                }

                // Y clip: distance to the nearer horizontal face
                let mut y_clip = y_off as u16;
                if (y_rad as i32) < (y_off as i32) {
                    y_off = y_off.wrapping_sub(4).wrapping_sub(y_dia as i16);
                    y_clip = y_off.wrapping_neg() as u16;
                }

                if x_clip <= y_clip {
                    return solid_hit_side(world, index, x_off, y_off, y_clip);
                } else if y_off < 0 {
                    return solid_hit_bottom(world, index, x_off, y_off);
                } else if y_off < 16 {
                    return solid_hit_top(world, index, x_off, y_off);
                }
                // Too deep below the top band: fall through to the miss path
            }
        }
    }

    clear_push_state(world, index);
    (Contact::None, x_off, y_off)
}

/// Side contact: stop motion toward the object, push the player out, and
/// maintain the mutual pushing flags (ground only).
fn solid_hit_side(
    world: &mut World,
    index: usize,
    x_off: i16,
    y_off: i16,
    y_clip: u16,
) -> (Contact, i16, i16) {
    if y_clip > 4 {
        // Stop speed going towards the object
        if x_off > 0 {
            if world.player().xsp > 0 {
                let p = world.player_mut();
                p.xsp = 0;
                p.inertia = 0;
            }
        } else if x_off < 0 && world.player().xsp < 0 {
            let p = world.player_mut();
            p.xsp = 0;
            p.inertia = 0;
        }

        // Clip out and update push flags
        world.player_mut().x.add_pixels(x_off.wrapping_neg());
        if !world.player().status.contains(Status::IN_AIR) {
            world.pool[index].status.insert(Status::PLAYER_PUSH);
            world.player_mut().status.insert(Status::PUSHING);
            return (Contact::Side, x_off, y_off);
        }
    }

    // Mid-air or near the edges: clear the push link
    world.pool[index].status.remove(Status::PLAYER_PUSH);
    world.player_mut().status.remove(Status::PUSHING);
    (Contact::Side, x_off, y_off)
}

/// Bottom contact: clip out while moving upward; a grounded player with no
/// vertical speed is being squashed.
fn solid_hit_bottom(world: &mut World, index: usize, x_off: i16, y_off: i16) -> (Contact, i16, i16) {
    if world.player().ysp != 0 {
        if world.player().ysp < 0 && y_off < 0 {
            let p = world.player_mut();
            p.y.add_pixels(y_off.wrapping_neg());
            p.ysp = 0;
        }
    } else if !world.player().status.contains(Status::IN_AIR) {
        log(LogCategory::Collide, LogLevel::Debug, || {
            format!("player squashed by slot {}", index)
        });
        player::kill_player(world, index);
    }
    (Contact::Top, x_off, y_off)
}

/// Top contact: land within the tolerance band when horizontally aligned
/// and moving downward.
fn solid_hit_top(world: &mut World, index: usize, x_off: i16, mut y_off: i16) -> (Contact, i16, i16) {
    y_off = y_off.wrapping_sub(4);

    let land_rad = world.pool[index].width_pixels as u16;
    let land_dia = (land_rad as i32) << 1;
    let land_off = world
        .player()
        .x
        .pixels()
        .wrapping_sub(world.pool[index].x.pixels())
        .wrapping_add(land_rad as i16);
    if land_off >= 0 && (land_off as i32) < land_dia && world.player().ysp >= 0 {
        // Land on the object
        world.player_mut().y.add_pixels(y_off.wrapping_neg());
        solid_reset_floor(world, index);
        world.pool[index].routine_sec = 2;
        world.pool[index].status.insert(Status::PLAYER_STAND);
        return (Contact::Top, x_off, y_off);
    }
    (Contact::None, x_off, y_off)
}

/// Attach bookkeeping shared by the top-landing path.
fn solid_reset_floor(world: &mut World, index: usize) {
    detach_previous_standing(world, false);
    attach_player(world, index);
}

/// Release the object the player previously stood on, if any.
///
/// The platform path additionally steps a stood platform's routine back from
/// 4 to 2; the solid path does not.
fn detach_previous_standing(world: &mut World, step_routine_back: bool) {
    if !world.player().status.contains(Status::OBJECT_STAND) {
        return;
    }
    let previous = world.player().scratch.player().standing_obj as usize;
    let prev_obj = &mut world.pool[previous];
    prev_obj.status.remove(Status::PLAYER_STAND);
    prev_obj.routine_sec = 0;
    if step_routine_back && prev_obj.routine == 4 {
        prev_obj.routine = 2;
    }
}

/// Stand the player on `index`: reset angle and fall speed, convert ground
/// speed to inertia, and link both records.
fn attach_player(world: &mut World, index: usize) {
    let was_airborne = world.player().status.contains(Status::IN_AIR);
    {
        let p = world.player_mut();
        p.scratch.player_mut().standing_obj = index as u8;
        p.angle = 0;
        p.ysp = 0;
        p.inertia = p.xsp;
    }
    if was_airborne {
        player::reset_on_floor(world);
    }
    world.player_mut().status.insert(Status::OBJECT_STAND);
    world.pool[index].status.insert(Status::PLAYER_STAND);
}

/// Stale push flags are cleared on any miss, switching the player's
/// animation to the run id (not walk - preserved quirk).
fn clear_push_state(world: &mut World, index: usize) {
    if world.pool[index].status.contains(Status::PLAYER_PUSH) {
        world.player_mut().anim = player::ANIM_RUN;
        world.pool[index].status.remove(Status::PLAYER_PUSH);
        world.player_mut().status.remove(Status::PUSHING);
    }
}
