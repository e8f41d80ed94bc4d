pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Truncating variant of [`mul_div255_u8`]; `x * y / 255 < x` whenever `x > 0` and `y < 255`.
pub(crate) fn mul_div255_floor_u8(x: u16, y: u16) -> u8 {
    ((u32::from(x) * u32::from(y)) / 255) as u8
}

/// Linearly map `v` from `[in_lo, in_hi]` onto `[out_lo, out_hi]`, clamping at the domain edges.
pub fn map_range_clamped(v: f64, in_lo: f64, in_hi: f64, out_lo: f64, out_hi: f64) -> f64 {
    if in_hi <= in_lo {
        return out_lo;
    }
    let t = ((v - in_lo) / (in_hi - in_lo)).clamp(0.0, 1.0);
    out_lo + (out_hi - out_lo) * t
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Rng64 {
    state: u64,
}

impl Rng64 {
    pub(crate) fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub(crate) fn next_u64(&mut self) -> u64 {
        // SplitMix64
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    pub(crate) fn next_f64_01(&mut self) -> f64 {
        // 53 bits of precision.
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
