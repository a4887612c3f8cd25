//! Built-in asset tables for the stock actors.
//!
//! Mapping banks: big-endian 2-byte offsets indexed by frame, each pointing
//! at a piece list (count byte, then 5 bytes per piece: Y offset, size,
//! tile word, X offset). The size byte packs width/height in tiles as
//! `((w - 1) << 2) | (h - 1)`.

/// Player: one 24x32 frame.
pub const PLAYER_MAPPINGS: [u8; 8] = [
    0x00, 0x02, // frame 0
    0x01, // 1 piece
    0xF0, 0x0B, 0x00, 0x00, 0xF4,
];

/// Platform: one 64x16 frame, two 32x16 pieces.
pub const PLATFORM_MAPPINGS: [u8; 13] = [
    0x00, 0x02, // frame 0
    0x02, // 2 pieces
    0xF8, 0x0D, 0x00, 0x00, 0xE0, // left half
    0xF8, 0x0D, 0x00, 0x08, 0x00, // right half
];

/// Block: one 32x32 frame.
pub const BLOCK_MAPPINGS: [u8; 8] = [
    0x00, 0x02, // frame 0
    0x01, // 1 piece
    0xF0, 0x0F, 0x00, 0x00, 0xF0,
];

/// Spinner: four 16x16 frames, tile stride 4.
pub const SPINNER_MAPPINGS: [u8; 32] = [
    0x00, 0x08, // frame 0
    0x00, 0x0E, // frame 1
    0x00, 0x14, // frame 2
    0x00, 0x1A, // frame 3
    0x01, 0xF8, 0x05, 0x00, 0x00, 0xF8,
    0x01, 0xF8, 0x05, 0x00, 0x04, 0xF8,
    0x01, 0xF8, 0x05, 0x00, 0x08, 0xF8,
    0x01, 0xF8, 0x05, 0x00, 0x0C, 0xF8,
];

/// Spinner animation: cycle all four frames, five ticks each.
pub const SPINNER_ANIM: [u8; 8] = [
    0x00, 0x02, // animation 0
    0x05, // frame hold
    0x00, 0x01, 0x02, 0x03, 0xFF,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AnimScript;

    #[test]
    fn test_spinner_mapping_offsets_resolve() {
        for frame in 0..4usize {
            let at = frame << 1;
            let offset =
                ((SPINNER_MAPPINGS[at] as usize) << 8) | SPINNER_MAPPINGS[at + 1] as usize;
            let count = SPINNER_MAPPINGS[offset] as usize;
            assert_eq!(count, 1);
            assert!(offset + 1 + count * 5 <= SPINNER_MAPPINGS.len());
        }
    }

    #[test]
    fn test_spinner_anim_segment_resolves() {
        let script = AnimScript::new(&SPINNER_ANIM);
        let seg = script.segment(0).unwrap();
        assert_eq!(seg[0], 0x05);
        assert_eq!(seg[seg.len() - 1], 0xFF);
    }
}
