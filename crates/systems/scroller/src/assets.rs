//! Asset banks: packed-byte animation scripts and sprite mapping tables.
//!
//! The original walks raw pointers into these tables and trusts them
//! completely. Here every bank is registered up front and all reads go
//! through bounds-checked cursors; the arithmetic on valid data is identical,
//! malformed data degrades silently with a log instead of crashing.

use rush_core::logging::{log, LogCategory, LogLevel};
use thiserror::Error;

/// Asset registration errors
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("empty asset bank")]
    EmptyBank,
    #[error("animation script too short for its offset table")]
    TruncatedScript,
    #[error("asset bank limit exceeded")]
    BankLimitExceeded,
}

/// Handle into the mapping-bank store.
///
/// `None` at the actor level is the null sentinel meaning "not yet ready to
/// draw" — it is a distinct state, not the bit pattern of handle 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapHandle(pub(crate) u16);

impl MapHandle {
    pub fn index(self) -> u16 {
        self.0
    }
}

/// Handle into the animation-script store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimHandle(pub(crate) u16);

/// Immutable store of all registered asset banks.
#[derive(Debug, Default)]
pub struct Assets {
    mapping_banks: Vec<Box<[u8]>>,
    anim_banks: Vec<Box<[u8]>>,
}

impl Assets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sprite mapping bank: a big-endian 2-byte offset table
    /// indexed by frame, each offset pointing at a piece list whose first
    /// byte is the piece count.
    pub fn register_mappings(&mut self, data: &[u8]) -> Result<MapHandle, AssetError> {
        if data.is_empty() {
            return Err(AssetError::EmptyBank);
        }
        let index = u16::try_from(self.mapping_banks.len()).map_err(|_| AssetError::BankLimitExceeded)?;
        self.mapping_banks.push(data.into());
        Ok(MapHandle(index))
    }

    /// Register an animation script bank: a big-endian 2-byte offset table
    /// indexed by animation id, each segment starting with the frame-hold
    /// duration byte.
    pub fn register_anim(&mut self, data: &[u8]) -> Result<AnimHandle, AssetError> {
        if data.len() < 2 {
            return Err(AssetError::TruncatedScript);
        }
        let index = u16::try_from(self.anim_banks.len()).map_err(|_| AssetError::BankLimitExceeded)?;
        self.anim_banks.push(data.into());
        Ok(AnimHandle(index))
    }

    /// Raw bytes of a mapping bank.
    pub fn mappings(&self, handle: MapHandle) -> &[u8] {
        &self.mapping_banks[handle.0 as usize]
    }

    /// Animation script view for the interpreter.
    pub fn anim(&self, handle: AnimHandle) -> AnimScript<'_> {
        AnimScript::new(&self.anim_banks[handle.0 as usize])
    }

    /// Whether a deserialized handle refers to a registered bank.
    pub fn mapping_handle_valid(&self, raw: u16) -> bool {
        (raw as usize) < self.mapping_banks.len()
    }
}

/// Byte-cursor view of one animation script bank.
#[derive(Debug, Clone, Copy)]
pub struct AnimScript<'a> {
    data: &'a [u8],
}

impl<'a> AnimScript<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Locate the script segment for an animation id via the offset table.
    ///
    /// Returns `None` (with a log) when the table or the offset it holds
    /// falls outside the bank.
    pub fn segment(&self, anim: u8) -> Option<&'a [u8]> {
        let table_at = (anim as usize) << 1;
        let (Some(&hi), Some(&lo)) = (self.data.get(table_at), self.data.get(table_at + 1)) else {
            log(LogCategory::Anim, LogLevel::Warn, || {
                format!("animation {} outside script offset table", anim)
            });
            return None;
        };
        let offset = ((hi as usize) << 8) | lo as usize;
        if offset >= self.data.len() {
            log(LogCategory::Anim, LogLevel::Warn, || {
                format!("animation {} offset {:#06x} outside bank", anim, offset)
            });
            return None;
        }
        Some(&self.data[offset..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_fetch_mappings() {
        let mut assets = Assets::new();
        let handle = assets.register_mappings(&[0x00, 0x02, 0x00]).unwrap();
        assert_eq!(assets.mappings(handle), &[0x00, 0x02, 0x00]);
    }

    #[test]
    fn test_empty_bank_rejected() {
        let mut assets = Assets::new();
        assert!(matches!(
            assets.register_mappings(&[]),
            Err(AssetError::EmptyBank)
        ));
    }

    #[test]
    fn test_segment_lookup() {
        // Two animations: anim 0 at 0x04, anim 1 at 0x07
        let bank = [0x00, 0x04, 0x00, 0x07, 0x05, 0x00, 0xFF, 0x03, 0x01, 0xFF];
        let script = AnimScript::new(&bank);
        assert_eq!(script.segment(0).unwrap()[0], 0x05);
        assert_eq!(script.segment(1).unwrap()[0], 0x03);
    }

    #[test]
    fn test_segment_out_of_table_is_none() {
        let bank = [0x00, 0x02, 0x05];
        let script = AnimScript::new(&bank);
        assert!(script.segment(9).is_none());
    }

    #[test]
    fn test_segment_bad_offset_is_none() {
        let bank = [0x7F, 0xFF, 0x05];
        let script = AnimScript::new(&bank);
        assert!(script.segment(0).is_none());
    }
}
