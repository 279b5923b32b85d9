//! 1/16-resolution fixed-point fields.
//!
//! Every temperature on the wire is `round(value * 16)` stored as an
//! unsigned little-endian 16-bit integer, so the representable range is
//! `0.0 ..= 4095.9375`.

use crate::error::EncodeError;

/// Fractional steps per unit.
pub const SCALE: f32 = 16.0;

/// Width of an encoded field in bytes.
pub const FIELD_LEN: usize = 2;

/// Encode `value` as a little-endian 16-bit fixed-point field.
pub fn encode_fixed_point(value: f32) -> Result<[u8; FIELD_LEN], EncodeError> {
    let scaled = (value * SCALE).round();
    if !(0.0..=f32::from(u16::MAX)).contains(&scaled) {
        // Also catches NaN.
        return Err(EncodeError::OutOfRange);
    }
    Ok((scaled as u16).to_le_bytes())
}

/// Decode a little-endian 16-bit fixed-point field.
pub fn decode_fixed_point(bytes: [u8; FIELD_LEN]) -> f32 {
    f32::from(u16::from_le_bytes(bytes)) / SCALE
}

/// Raw unsigned byte at a fixed offset.
#[inline]
pub const fn decode_byte(byte: u8) -> u8 {
    byte
}
