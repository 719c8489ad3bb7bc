//! Network units: a bias plus a `[channel][width][width]` weight cube.
//!
//! Plain units take one dot product per window. Rotation-invariant units take
//! the dot product under all 8 reorientations of their weights and keep the
//! largest, which makes their features invariant to board rotations and
//! reflections without any training.

use rand::Rng;

use super::plane::Plane;

/// Number of square symmetries tried by a rotation-invariant unit.
pub const ORIENTATIONS: usize = 8;

/// How a unit combines its weights with an input window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Plain,
    RotationInvariant,
}

/// Result of applying a unit at one window position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitValue {
    pub value: f64,
    /// Winning orientation; always 0 for plain units.
    pub orientation: u8,
}

/// One unit of a layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    kind: UnitKind,
    channels: usize,
    width: usize,
    bias: f64,
    weights: Vec<f64>,
}

/// Standard normal sample via Box-Muller.
fn gaussian<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-300);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

impl Unit {
    /// Number of parameters a unit of this shape holds.
    pub fn parameter_count(channels: usize, width: usize) -> Option<usize> {
        channels.checked_mul(width)?.checked_mul(width)?.checked_add(1)
    }

    /// Draws bias and weights from N(0, 1) scaled by `1/sqrt(channels*width^2)`.
    ///
    /// `weights` must be an empty buffer with room for the cube; the caller
    /// reserves it so allocation failure can be reported instead of aborting.
    pub(crate) fn random<R: Rng>(
        kind: UnitKind,
        channels: usize,
        width: usize,
        mut weights: Vec<f64>,
        rng: &mut R,
    ) -> Unit {
        let fan_in = channels * width * width;
        let scale = 1.0 / (fan_in as f64).sqrt();
        let bias = gaussian(rng) * scale;
        weights.clear();
        weights.extend((0..fan_in).map(|_| gaussian(rng) * scale));
        Unit {
            kind,
            channels,
            width,
            bias,
            weights,
        }
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Weight at `(channel, row, column)` of the cube.
    pub fn weight(&self, channel: usize, row: usize, column: usize) -> f64 {
        self.weights[(channel * self.width + row) * self.width + column]
    }

    #[inline]
    fn channel_weights(&self, channel: usize) -> &[f64] {
        let size = self.width * self.width;
        &self.weights[channel * size..(channel + 1) * size]
    }

    /// Applies the unit to the window whose top-left cell is `(row, column)`.
    pub fn apply(&self, input: &[Plane], row: usize, column: usize) -> UnitValue {
        match self.kind {
            UnitKind::Plain => UnitValue {
                value: self.dot(input, row, column),
                orientation: 0,
            },
            UnitKind::RotationInvariant => self.best_orientation(input, row, column),
        }
    }

    fn dot(&self, input: &[Plane], start_row: usize, start_column: usize) -> f64 {
        let w = self.width;
        let mut result = self.bias;
        for (channel, plane) in input.iter().enumerate().take(self.channels) {
            let weights = self.channel_weights(channel);
            for i in 0..w {
                let input_row = &plane.row(start_row + i)[start_column..start_column + w];
                let weight_row = &weights[i * w..(i + 1) * w];
                for (x, k) in input_row.iter().zip(weight_row) {
                    result += x * k;
                }
            }
        }
        result
    }

    fn best_orientation(&self, input: &[Plane], start_row: usize, start_column: usize) -> UnitValue {
        let w = self.width;
        let mut results = [self.bias; ORIENTATIONS];

        for (channel, plane) in input.iter().enumerate().take(self.channels) {
            let k = self.channel_weights(channel);
            for i in 0..w {
                let oi = w - 1 - i;
                let input_row = &plane.row(start_row + i)[start_column..start_column + w];
                for (j, &x) in input_row.iter().enumerate() {
                    let oj = w - 1 - j;
                    results[0] += x * k[i * w + j];
                    results[1] += x * k[i * w + oj];
                    results[2] += x * k[oi * w + j];
                    results[3] += x * k[oi * w + oj];
                    results[4] += x * k[j * w + i];
                    results[5] += x * k[j * w + oi];
                    results[6] += x * k[oj * w + i];
                    results[7] += x * k[oj * w + oi];
                }
            }
        }

        let mut best = UnitValue {
            value: results[0],
            orientation: 0,
        };
        for (orientation, &value) in results.iter().enumerate().skip(1) {
            if value > best.value {
                best = UnitValue {
                    value,
                    orientation: orientation as u8,
                };
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit(kind: UnitKind, channels: usize, width: usize, seed: u64) -> Unit {
        let mut rng = StdRng::seed_from_u64(seed);
        Unit::random(kind, channels, width, Vec::new(), &mut rng)
    }

    fn plane_from(breadth: usize, values: &[f64]) -> Plane {
        let mut plane = Plane::zeros(breadth);
        for (i, &v) in values.iter().enumerate() {
            plane.set(i / breadth, i % breadth, v);
        }
        plane
    }

    #[test]
    fn same_seed_same_weights() {
        let a = unit(UnitKind::Plain, 3, 3, 42);
        let b = unit(UnitKind::Plain, 3, 3, 42);
        let c = unit(UnitKind::Plain, 3, 3, 43);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn plain_unit_is_bias_plus_dot_product() {
        let u = unit(UnitKind::Plain, 1, 2, 7);
        let plane = plane_from(3, &[1.0, 2.0, 0.0, 3.0, 4.0, 0.0, 0.0, 0.0, 0.0]);
        let expected = u.bias()
            + u.weight(0, 0, 0)
            + 2.0 * u.weight(0, 0, 1)
            + 3.0 * u.weight(0, 1, 0)
            + 4.0 * u.weight(0, 1, 1);
        let got = u.apply(std::slice::from_ref(&plane), 0, 0);
        assert!((got.value - expected).abs() < 1e-12);
        assert_eq!(got.orientation, 0);
    }

    #[test]
    fn rotation_invariant_unit_ignores_reflection() {
        let u = unit(UnitKind::RotationInvariant, 2, 3, 11);
        let original = [
            plane_from(3, &[0.3, 1.0, 0.0, 0.5, 0.2, 0.9, 0.0, 0.7, 0.1]),
            plane_from(3, &[1.0, 0.0, 0.4, 0.0, 0.6, 0.0, 0.8, 0.0, 0.0]),
        ];
        let transforms: [fn(usize, usize) -> (usize, usize); 4] = [
            |r, c| (r, 2 - c),
            |r, c| (2 - r, c),
            |r, c| (c, r),
            |r, c| (c, 2 - r),
        ];
        let base = u.apply(&original, 0, 0).value;
        for transform in transforms {
            let moved: Vec<Plane> = original
                .iter()
                .map(|p| {
                    let mut out = Plane::zeros(3);
                    for r in 0..3 {
                        for c in 0..3 {
                            let (nr, nc) = transform(r, c);
                            out.set(nr, nc, p.get(r, c).unwrap());
                        }
                    }
                    out
                })
                .collect();
            let value = u.apply(&moved, 0, 0).value;
            assert!((value - base).abs() < 1e-12, "{} vs {}", value, base);
        }
    }

    #[test]
    fn rotation_invariant_value_is_max_of_plain_orientations() {
        let u = unit(UnitKind::RotationInvariant, 1, 3, 5);
        let plane = plane_from(3, &[0.1, 0.9, 0.2, 0.0, 0.4, 0.8, 0.3, 0.0, 0.6]);
        let best = u.apply(std::slice::from_ref(&plane), 0, 0);
        let identity = Unit {
            kind: UnitKind::Plain,
            ..u.clone()
        };
        let plain = identity.apply(std::slice::from_ref(&plane), 0, 0).value;
        assert!(best.value >= plain - 1e-12);
        assert!((best.orientation as usize) < ORIENTATIONS);
    }

    #[test]
    fn parameter_count_overflow() {
        assert_eq!(Unit::parameter_count(2, 3), Some(19));
        assert_eq!(Unit::parameter_count(usize::MAX, 2), None);
    }
}
