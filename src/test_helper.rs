// Copyright 2022-2024 Google LLC
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

#![allow(clippy::missing_panics_doc)]

use std::collections::BTreeMap;

use super::channel::ChannelId;
use super::config;
use super::sigen::ArProcess;
use super::sigen::Noise;
use super::sigen::Signal;

#[macro_export]
macro_rules! assert_close {
    ($actual:expr, $expected:expr, rtol = $rtol:expr, atol = $atol:expr) => {{
        let err = ($actual - $expected).abs();
        #[allow(clippy::suboptimal_flops)]
        let tol = $rtol * ($expected).abs() + $atol;
        assert!(
            err < tol,
            "actual={:?}, expected={:?}",
            $actual,
            $expected
        );
    }};
    ($actual:expr, $expected:expr) => {{
        assert_close!($actual, $expected, rtol = 0.00001, atol = 0.00001);
    }};
}

#[macro_export]
macro_rules! assert_finite {
    ($result:expr) => {{
        for (i, &value) in $result.iter().enumerate() {
            assert!(
                value.is_normal() || value == 0.0,
                "{}-th element in a vector is not finite ({}), x={:?}.",
                i,
                value,
                $result
            );
        }
    }};
}

/// Makes `[1, 0, -1, 0, 1, 0, -1, 0, ...]` of length `len`.
pub fn period_four_window(len: usize) -> Vec<f32> {
    const CYCLE: [f32; 4] = [1.0, 0.0, -1.0, 0.0];
    (0..len).map(|t| CYCLE[t % 4]).collect()
}

/// Makes uniform white noise in `[-1, 1]` from `seed`.
pub fn seeded_noise(len: usize, seed: u64) -> Vec<f32> {
    Noise::new(seed, 1.0).to_vec(len)
}

/// Makes a stationary realization of the AR process with `coefs`.
pub fn ar_signal(coefs: &[f32], len: usize, seed: u64) -> Vec<f32> {
    ArProcess::new(coefs, seed, 1.0).to_vec(len)
}

/// Makes one window per channel, each driven by a different AR process.
pub fn multichannel_windows(
    models: &[&[f32]],
    len: usize,
    seed: u64,
) -> BTreeMap<ChannelId, Vec<f32>> {
    models
        .iter()
        .enumerate()
        .map(|(ch, coefs)| (ChannelId::new(ch), ar_signal(coefs, len, seed + ch as u64)))
        .collect()
}

/// Makes a config that forces a specific execution path.
pub fn estimator_config(channels: usize, order: usize, window_len: usize) -> config::Estimator {
    config::Estimator {
        channels,
        order,
        window_len,
        ..config::Estimator::default()
    }
}
