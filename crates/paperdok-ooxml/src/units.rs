//! WordprocessingML unit conversions
//!
//! The model measures everything in twips. Most `w:` attributes take twips
//! directly; the few that don't are converted here, at emission time.

use paperdok_model::Twips;

/// EMUs per twip (914400 per inch / 1440 per inch)
pub const EMU_PER_TWIP: i64 = 635;

/// Font size in half-points, as used by `w:sz`
pub fn half_points(size: Twips) -> i64 {
    size.get() / 10
}

/// Border width in eighths of a point, as used by border `w:sz`
pub fn border_eighths(width: Twips) -> i64 {
    width.get() * 8 / 20
}

/// Drawing extent in EMUs
pub fn emu(length: Twips) -> i64 {
    length.get() * EMU_PER_TWIP
}

/// Inverse of [`emu`], rounding to the nearest twip
pub fn twips_from_emu(emu: i64) -> Twips {
    Twips((emu + EMU_PER_TWIP / 2) / EMU_PER_TWIP)
}

/// Inverse of [`half_points`]
pub fn twips_from_half_points(half_points: i64) -> Twips {
    Twips(half_points * 10)
}
