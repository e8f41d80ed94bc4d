//! Coherent 3D value noise.
//!
//! A lattice of pseudo-random values is sampled with cosine interpolation and summed over a few
//! octaves. The lattice is filled from a fixed seed, so the same `(x, y, z)` always yields the
//! same value. Output lies in `[0, 1)`.

use crate::foundation::math::Rng64;

const TABLE_BITS_MASK: usize = 4095;
const Y_WRAP_BITS: u32 = 4;
const Y_WRAP: usize = 1 << Y_WRAP_BITS;
const Z_WRAP_BITS: u32 = 8;
const Z_WRAP: usize = 1 << Z_WRAP_BITS;

/// Default number of octaves summed per sample.
pub const DEFAULT_OCTAVES: u32 = 4;
/// Default amplitude falloff between successive octaves.
pub const DEFAULT_FALLOFF: f64 = 0.5;

#[derive(Clone, Debug)]
pub struct ValueNoise3 {
    table: Vec<f64>,
    octaves: u32,
    falloff: f64,
}

impl ValueNoise3 {
    pub fn new(seed: u64) -> Self {
        Self::with_octaves(seed, DEFAULT_OCTAVES, DEFAULT_FALLOFF)
    }

    pub fn with_octaves(seed: u64, octaves: u32, falloff: f64) -> Self {
        let mut rng = Rng64::new(seed);
        let table = (0..=TABLE_BITS_MASK).map(|_| rng.next_f64_01()).collect();
        Self {
            table,
            octaves: octaves.max(1),
            falloff: falloff.clamp(0.0, 1.0),
        }
    }

    /// Sample the field. Negative coordinates are folded onto their absolute value.
    pub fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        let (x, y, z) = (x.abs(), y.abs(), z.abs());

        let mut xi = x.floor() as usize;
        let mut yi = y.floor() as usize;
        let mut zi = z.floor() as usize;
        let mut xf = x - x.floor();
        let mut yf = y - y.floor();
        let mut zf = z - z.floor();

        let mut r = 0.0;
        let mut amp = 0.5;

        for _ in 0..self.octaves {
            let mut of = xi
                .wrapping_add(yi << Y_WRAP_BITS)
                .wrapping_add(zi << Z_WRAP_BITS);

            let rxf = scaled_cosine(xf);
            let ryf = scaled_cosine(yf);

            let mut n1 = self.at(of);
            n1 += rxf * (self.at(of.wrapping_add(1)) - n1);
            let mut n2 = self.at(of.wrapping_add(Y_WRAP));
            n2 += rxf * (self.at(of.wrapping_add(Y_WRAP + 1)) - n2);
            n1 += ryf * (n2 - n1);

            of = of.wrapping_add(Z_WRAP);
            n2 = self.at(of);
            n2 += rxf * (self.at(of.wrapping_add(1)) - n2);
            let mut n3 = self.at(of.wrapping_add(Y_WRAP));
            n3 += rxf * (self.at(of.wrapping_add(Y_WRAP + 1)) - n3);
            n2 += ryf * (n3 - n2);

            n1 += scaled_cosine(zf) * (n2 - n1);

            r += n1 * amp;
            amp *= self.falloff;

            xi <<= 1;
            xf *= 2.0;
            yi <<= 1;
            yf *= 2.0;
            zi <<= 1;
            zf *= 2.0;

            if xf >= 1.0 {
                xi = xi.wrapping_add(1);
                xf -= 1.0;
            }
            if yf >= 1.0 {
                yi = yi.wrapping_add(1);
                yf -= 1.0;
            }
            if zf >= 1.0 {
                zi = zi.wrapping_add(1);
                zf -= 1.0;
            }
        }

        r
    }

    fn at(&self, i: usize) -> f64 {
        self.table[i & TABLE_BITS_MASK]
    }
}

fn scaled_cosine(t: f64) -> f64 {
    0.5 * (1.0 - (t * std::f64::consts::PI).cos())
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/noise.rs"]
mod tests;
