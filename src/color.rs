//! Packed `0xRRGGBBAA` color helpers
//!
//! Colors travel through the pipeline as packed 32-bit values; modulation is
//! channel-wise with `0xFF` as the identity, so an unset tint leaves vertex
//! colors untouched.

/// Opaque white, the multiplicative identity.
pub const WHITE: u32 = 0xFFFF_FFFF;

/// Pack four channels into `0xRRGGBBAA`.
pub const fn pack(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (r as u32) << 24 | (g as u32) << 16 | (b as u32) << 8 | a as u32
}

/// Channel-wise multiply of two packed colors, scaled back into `0..=255`.
pub fn multiply(a: u32, b: u32) -> u32 {
    if a == WHITE {
        return b;
    }
    if b == WHITE {
        return a;
    }
    let mut out = 0u32;
    for shift in [24u32, 16, 8, 0] {
        let ca = (a >> shift) & 0xFF;
        let cb = (b >> shift) & 0xFF;
        out |= (ca * cb / 0xFF) << shift;
    }
    out
}

/// Replace the alpha channel of a packed color.
pub const fn with_alpha(color: u32, alpha: u8) -> u32 {
    (color & 0xFFFF_FF00) | alpha as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_is_the_identity() {
        let c = pack(0x12, 0x34, 0x56, 0x78);
        assert_eq!(multiply(WHITE, c), c);
        assert_eq!(multiply(c, WHITE), c);
    }

    #[test]
    fn black_absorbs() {
        assert_eq!(multiply(0, pack(0x12, 0x34, 0x56, 0x78)), 0);
    }

    #[test]
    fn halves_compose_channel_wise() {
        let half = pack(0x80, 0x80, 0x80, 0xFF);
        let out = multiply(half, half);
        assert_eq!(out, pack(0x40, 0x40, 0x40, 0xFF));
    }

    #[test]
    fn alpha_replacement_preserves_rgb() {
        let c = pack(0x12, 0x34, 0x56, 0x78);
        assert_eq!(with_alpha(c, 0xFF), pack(0x12, 0x34, 0x56, 0xFF));
    }
}
