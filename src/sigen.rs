// Copyright 2023-2024 Google LLC
// Copyright 2025- flacenc-rs developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Synthetic sensor signals.
//!
//! Used by the tests of this crate, and exported with the `__export_sigen`
//! feature so that external harnesses (the fuzzer, the CLI tests) can feed
//! the same windows.

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

/// Deterministic sample generator.
pub trait Signal: std::fmt::Debug {
    /// Writes samples `t = offset .. offset + dest.len()` into `dest`.
    fn fill_buffer(&self, offset: usize, dest: &mut [f32]);

    /// Returns the first `len` samples.
    fn to_vec(&self, len: usize) -> Vec<f32> {
        let mut ret = vec![0.0f32; len];
        self.fill_buffer(0, &mut ret);
        ret
    }

    /// Adds `other` sample-by-sample.
    fn plus<T: Signal>(self, other: T) -> Sum<Self, T>
    where
        Self: Sized,
    {
        Sum { lhs: self, rhs: other }
    }

    /// Adds seeded white noise of the given amplitude.
    fn with_noise(self, seed: u64, amplitude: f32) -> Sum<Self, Noise>
    where
        Self: Sized,
    {
        self.plus(Noise::new(seed, amplitude))
    }
}

/// Constant output, e.g. a stuck sensor.
#[derive(Clone, Debug)]
pub struct Dc {
    level: f32,
}

impl Dc {
    pub fn new(level: f32) -> Self {
        Self { level }
    }
}

impl Signal for Dc {
    fn fill_buffer(&self, _offset: usize, dest: &mut [f32]) {
        dest.fill(self.level);
    }
}

/// Sinusoid with an integer period in samples.
#[derive(Clone, Debug)]
pub struct Sine {
    period: usize,
    amplitude: f32,
    phase: f64,
}

impl Sine {
    pub fn new(period: usize, amplitude: f32) -> Self {
        Self::with_phase(period, amplitude, 0.0)
    }

    /// Constructs a sinusoid starting at `phase` radians.
    pub fn with_phase(period: usize, amplitude: f32, phase: f64) -> Self {
        Self {
            period,
            amplitude,
            phase,
        }
    }
}

impl Signal for Sine {
    fn fill_buffer(&self, offset: usize, dest: &mut [f32]) {
        let omega = std::f64::consts::TAU / self.period as f64;
        for (t, p) in (offset..).zip(dest.iter_mut()) {
            *p = self.amplitude * omega.mul_add(t as f64, self.phase).sin() as f32;
        }
    }
}

/// Uniform white noise in `[-amplitude, amplitude]`.
///
/// The stream is keyed by `(seed, offset)`, so only calls with the same
/// offset reproduce the same samples.
#[derive(Clone, Debug)]
pub struct Noise {
    seed: u64,
    amplitude: f32,
}

impl Noise {
    pub fn new(seed: u64, amplitude: f32) -> Self {
        Self { seed, amplitude }
    }
}

impl Signal for Noise {
    fn fill_buffer(&self, offset: usize, dest: &mut [f32]) {
        let mut rng = StdRng::seed_from_u64(self.seed ^ (offset as u64).rotate_left(32));
        for p in dest {
            *p = self.amplitude * rng.gen_range(-1.0f32..=1.0);
        }
    }
}

/// Stationary autoregressive process driven by [`Noise`].
///
/// `x[t] = sum_k coefs[k] * x[t - 1 - k] + e[t]`. The first
/// [`ArProcess::DEFAULT_BURN_IN`] samples of the recursion are discarded.
#[derive(Clone, Debug)]
pub struct ArProcess {
    coefs: Vec<f32>,
    innovation: Noise,
    burn_in: usize,
}

impl ArProcess {
    pub const DEFAULT_BURN_IN: usize = 1024;

    pub fn new(coefs: &[f32], seed: u64, amplitude: f32) -> Self {
        Self {
            coefs: coefs.to_vec(),
            innovation: Noise::new(seed, amplitude),
            burn_in: Self::DEFAULT_BURN_IN,
        }
    }

    pub fn coefs(&self) -> &[f32] {
        &self.coefs
    }
}

impl Signal for ArProcess {
    /// Runs the recursion from the start on every call so that `offset`
    /// addresses the same trajectory.
    fn fill_buffer(&self, offset: usize, dest: &mut [f32]) {
        let total = self.burn_in + offset + dest.len();
        let drive = self.innovation.to_vec(total);

        let mut history = vec![0.0f64; total];
        for t in 0..total {
            let feedback: f64 = self
                .coefs
                .iter()
                .enumerate()
                .take(t)
                .map(|(k, &a)| f64::from(a) * history[t - 1 - k])
                .sum();
            history[t] = feedback + f64::from(drive[t]);
        }
        for (p, x) in dest.iter_mut().zip(&history[self.burn_in + offset..]) {
            *p = *x as f32;
        }
    }
}

/// Sample-wise sum of two signals.
#[derive(Clone, Debug)]
pub struct Sum<A, B> {
    lhs: A,
    rhs: B,
}

impl<A: Signal, B: Signal> Signal for Sum<A, B> {
    fn fill_buffer(&self, offset: usize, dest: &mut [f32]) {
        self.lhs.fill_buffer(offset, dest);
        let mut buf = vec![0.0f32; dest.len()];
        self.rhs.fill_buffer(offset, &mut buf);
        for (p, x) in dest.iter_mut().zip(&buf) {
            *p += *x;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dc_and_sine() {
        assert_eq!(Dc::new(0.25).to_vec(4), vec![0.25; 4]);
        let sine = Sine::new(4, 2.0).to_vec(4);
        assert!(sine[0].abs() < 1e-6);
        assert!((sine[1] - 2.0).abs() < 1e-6);
        assert!(sine[2].abs() < 1e-5);
        assert!((sine[3] + 2.0).abs() < 1e-5);
    }

    #[test]
    fn seeded_noise_is_reproducible() {
        let a = Noise::new(42, 1.0).to_vec(64);
        let b = Noise::new(42, 1.0).to_vec(64);
        assert_eq!(a, b);
        assert!(a.iter().all(|x| x.abs() <= 1.0));
        assert_ne!(a, Noise::new(43, 1.0).to_vec(64));
    }

    #[test]
    fn ar_process_offset_is_consistent() {
        let process = ArProcess::new(&[0.5, -0.25], 1, 1.0);
        let whole = process.to_vec(32);
        let mut tail = vec![0.0f32; 16];
        process.fill_buffer(16, &mut tail);
        assert_eq!(&whole[16..], tail.as_slice());
    }

    #[test]
    fn sum_adds_samples() {
        let sine = Sine::new(8, 1.0).to_vec(8);
        let lifted = Sine::new(8, 1.0).plus(Dc::new(1.0)).to_vec(8);
        for (m, s) in lifted.iter().zip(&sine) {
            assert!((m - s - 1.0).abs() < 1e-6);
        }
        let noisy = Sine::new(8, 1.0).with_noise(3, 0.01).to_vec(8);
        for (n, s) in noisy.iter().zip(&sine) {
            assert!((n - s).abs() <= 0.01 + 1e-6);
        }
    }
}
