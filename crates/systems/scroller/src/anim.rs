//! Animation script interpreter.
//!
//! One call advances an actor's animation state by exactly one frame-tick.
//! A script bank starts with a big-endian 2-byte offset table indexed by
//! animation id; each segment is a frame-hold duration byte followed by
//! command bytes.
//!
//! A command byte with the high bit clear is a direct frame: bits 0-4 select
//! the sprite frame, bit 5 toggles X flip against the actor's inherent
//! facing, bit 6 toggles Y flip. A command byte with the high bit set is a
//! control opcode resolved by incrementing the byte through an ordered guard
//! chain (0xFF, 0xFE, ... 0xFA). The chain order and its fallthrough are
//! load-bearing: 0xFD changes the animation and then falls through the
//! routine-counter guards before returning, and the bytes reached by the
//! 0xFF/0xFE paths are re-read as direct frames without re-dispatch.

use crate::assets::AnimScript;
use crate::object::{Object, RenderFlags, Status};
use rush_core::logging::{log, LogCategory, LogLevel};

/// Advance `obj`'s animation by one tick against `script`.
pub fn animate_sprite(obj: &mut Object, script: &AnimScript<'_>) {
    // Animation change restarts the script
    let anim = obj.anim;
    if anim != obj.prev_anim {
        obj.prev_anim = anim;
        obj.anim_frame = 0;
        obj.frame_time = 0;
    }

    // Wait for the current animation frame to end
    obj.frame_time = obj.frame_time.wrapping_sub(1);
    if obj.frame_time >= 0 {
        return;
    }

    let Some(seg) = script.segment(anim) else {
        return;
    };
    let Some(&duration) = seg.first() else {
        log(LogCategory::Anim, LogLevel::Warn, || {
            format!("animation {} segment has no header", anim)
        });
        return;
    };
    obj.frame_time = duration as i8;

    let Some(&cmd) = seg.get(1 + obj.anim_frame as usize) else {
        log(LogCategory::Anim, LogLevel::Warn, || {
            format!("animation {} command {} outside segment", anim, obj.anim_frame)
        });
        return;
    };

    if cmd & 0x80 == 0 {
        apply_frame(obj, cmd);
        return;
    }

    let mut probe = cmd;
    probe = probe.wrapping_add(1);
    if probe == 0 {
        // 0xFF: restart animation and re-read frame 0 within this call
        obj.anim_frame = 0;
        let Some(&first) = seg.get(1) else {
            return;
        };
        apply_frame(obj, first);
        return;
    }
    probe = probe.wrapping_add(1);
    if probe == 0 {
        // 0xFE: jump back by the count in the following byte, reinterpret
        let Some(&back) = seg.get(2 + obj.anim_frame as usize) else {
            return;
        };
        obj.anim_frame = obj.anim_frame.wrapping_sub(back);
        let Some(&target) = seg.get(1 + obj.anim_frame as usize) else {
            return;
        };
        apply_frame(obj, target);
        return;
    }
    probe = probe.wrapping_add(1);
    if probe == 0 {
        // 0xFD: switch animation, then fall through the routine guards
        if let Some(&next) = seg.get(2 + obj.anim_frame as usize) {
            obj.anim = next;
        }
    }
    probe = probe.wrapping_add(1);
    if probe == 0 {
        // 0xFC: advance primary routine
        obj.routine = obj.routine.wrapping_add(2);
    }
    probe = probe.wrapping_add(1);
    if probe == 0 {
        // 0xFB: clear secondary routine
        obj.routine_sec = 0;
    }
    probe = probe.wrapping_add(1);
    if probe == 0 {
        // 0xFA: advance secondary routine
        obj.routine_sec = obj.routine_sec.wrapping_add(2);
    }
}

/// Set the sprite frame and flips from a direct frame command.
fn apply_frame(obj: &mut Object, cmd: u8) {
    obj.frame = cmd & 0x1F;
    obj.render.set(
        RenderFlags::X_FLIP,
        obj.status.contains(Status::X_FLIP) ^ (cmd & 0x20 != 0),
    );
    obj.render.set(
        RenderFlags::Y_FLIP,
        obj.status.contains(Status::Y_FLIP) ^ (cmd & 0x40 != 0),
    );
    obj.anim_frame = obj.anim_frame.wrapping_add(1);
}
