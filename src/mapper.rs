use crate::constants::{CC_MAX, CC_MIN};

/// Maps a heart rate onto a 0..=127 controller value, offset by the
/// configured minimum tempo.
pub fn map_to_cc(hr: i32, min_tempo: i32) -> u8 {
    let cc = (hr as i64 - min_tempo as i64).clamp(CC_MIN as i64, CC_MAX as i64);
    cc as u8
}
