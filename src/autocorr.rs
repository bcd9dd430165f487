// Copyright 2022 Google LLC
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

//! Biased auto-correlation estimator.

#[cfg(feature = "serde")]
use serde::Deserialize;
#[cfg(feature = "serde")]
use serde::Serialize;

use super::constant::MAX_ORDER;
use super::constant::panic_msg;
use super::error::EstimateError;

/// Auto-correlation sequence `R[0..=p]` estimated from a sample window.
///
/// Values are normalized by the full window length, so the Toeplitz matrix
/// built from them is positive semi-definite.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct AutocorrelationVector {
    lags: heapless::Vec<f32, { MAX_ORDER + 1 }>,
    variance: f32,
    window_len: usize,
}

impl AutocorrelationVector {
    /// Constructs `AutocorrelationVector` directly from lag values.
    ///
    /// `variance` is the (biased) sample variance of the window the values
    /// were computed from.
    ///
    /// # Panics
    ///
    /// Panics if `lags` is empty or longer than `MAX_ORDER + 1`.
    pub fn from_lags(lags: &[f32], variance: f32, window_len: usize) -> Self {
        assert!(!lags.is_empty());
        let lags = heapless::Vec::from_slice(lags)
            .expect("INTERNAL ERROR: number of lags exceeded MAX_ORDER + 1.");
        Self {
            lags,
            variance,
            window_len,
        }
    }

    /// Returns the AR order this sequence supports (number of lags minus one).
    pub fn order(&self) -> usize {
        self.lags.len().saturating_sub(1)
    }

    /// Returns the lag values as a slice.
    pub fn as_slice(&self) -> &[f32] {
        &self.lags
    }

    /// Returns `R[lag]`.
    ///
    /// # Panics
    ///
    /// Panics if `lag > self.order()`.
    pub fn lag(&self, lag: usize) -> f32 {
        self.lags[lag]
    }

    /// Returns the biased sample variance of the source window.
    pub const fn variance(&self) -> f32 {
        self.variance
    }

    /// Returns the number of samples the estimate was computed from.
    pub const fn window_len(&self) -> usize {
        self.window_len
    }

    /// Returns true if every value is finite.
    pub fn is_finite(&self) -> bool {
        self.variance.is_finite() && self.lags.iter().all(|x| x.is_finite())
    }

    /// Returns true if the window is (numerically) constant.
    ///
    /// The variance is compared with `tolerance * R[0]`. A zero window is
    /// always degenerate.
    pub fn is_degenerate(&self, tolerance: f32) -> bool {
        let r0 = self.lags.first().copied().unwrap_or(0.0);
        r0 <= 0.0 || self.variance <= tolerance * r0
    }
}

/// Computes the biased auto-correlation of `window` for lags `0..=order`.
///
/// `R[k] = (1/W) * sum_{i=0}^{W-k-1} window[i] * window[i+k]` where `W` is
/// `window.len()`. Products are accumulated in `f64`.
///
/// # Errors
///
/// Returns `EstimateError::InsufficientData` if `window.len() <= order`.
///
/// # Panics
///
/// Panics if `order` exceeds `MAX_ORDER`.
pub fn compute(window: &[f32], order: usize) -> Result<AutocorrelationVector, EstimateError> {
    assert!(order <= MAX_ORDER);
    let window_len = window.len();
    if window_len <= order {
        return Err(EstimateError::InsufficientData { window_len, order });
    }

    let denom = window_len as f64;
    let mut lags = heapless::Vec::new();
    for tau in 0..=order {
        let sum: f64 = window[..window_len - tau]
            .iter()
            .zip(&window[tau..])
            .map(|(&x, &y)| f64::from(x) * f64::from(y))
            .sum();
        lags.push((sum / denom) as f32)
            .expect(panic_msg::DATA_INCONSISTENT);
    }

    let mean: f64 = window.iter().copied().map(f64::from).sum::<f64>() / denom;
    let energy: f64 = window
        .iter()
        .map(|&x| (f64::from(x) - mean) * (f64::from(x) - mean))
        .sum();
    let variance = (energy / denom) as f32;

    Ok(AutocorrelationVector {
        lags,
        variance,
        window_len,
    })
}

#[cfg(test)]
#[allow(clippy::pedantic, clippy::nursery, clippy::needless_range_loop)]
mod tests {
    use super::*;
    use crate::assert_close;
    use crate::test_helper;

    use rstest::rstest;
    use std::f32::consts::PI;

    #[test]
    fn auto_correlation_computation() {
        let mut signal = [0f32; 128];
        for t in 0..signal.len() {
            signal[t] = (t as f32 / 32.0 * 2.0 * PI).sin() * 1024.0;
        }
        let corr = compute(&signal, 31).expect("window is long enough");

        let mut max_corr: f32 = 0.0;
        let mut min_corr: f32 = 0.0;
        let mut argmax_corr: usize = 0;
        let mut argmin_corr: usize = 0;
        for t in 0..32 {
            if corr.lag(t) > max_corr {
                argmax_corr = t;
                max_corr = corr.lag(t);
            }
            if corr.lag(t) < min_corr {
                argmin_corr = t;
                min_corr = corr.lag(t);
            }
        }
        assert_eq!(argmax_corr, 0);
        assert_eq!(argmin_corr, 16);
    }

    #[test]
    fn period_four_oscillation() {
        let window = test_helper::period_four_window(16);
        let corr = compute(&window, 4).unwrap();
        assert_eq!(corr.order(), 4);
        // normalized by W = 16, not by the overlap length.
        assert_eq!(corr.as_slice(), &[0.5, 0.0, -7.0 / 16.0, 0.0, 3.0 / 8.0]);
        assert_close!(corr.variance(), 0.5f32);
    }

    #[test]
    fn normalized_by_full_window_length() {
        let window = [1.0f32, 2.0, 3.0, 4.0];
        let corr = compute(&window, 2).unwrap();
        assert_close!(corr.lag(0), 30.0f32 / 4.0);
        assert_close!(corr.lag(1), 20.0f32 / 4.0);
        assert_close!(corr.lag(2), 11.0f32 / 4.0);
        assert_close!(corr.variance(), 1.25f32);
    }

    #[rstest]
    fn insufficient_window(#[values(0, 1, 4)] window_len: usize) {
        let window = vec![1.0f32; window_len];
        let err = compute(&window, 4).unwrap_err();
        assert_eq!(
            err,
            EstimateError::InsufficientData {
                window_len,
                order: 4
            }
        );
    }

    #[test]
    fn shortest_valid_window() {
        let window = [1.0f32, -1.0, 1.0, -1.0, 1.0];
        let corr = compute(&window, 4).unwrap();
        assert_eq!(corr.as_slice().len(), 5);
        assert_close!(corr.lag(4), 1.0f32 / 5.0);
    }

    #[test]
    fn zero_lag_dominates() {
        let signal = test_helper::seeded_noise(512, 7);
        let corr = compute(&signal, 12).unwrap();
        for k in 1..=12 {
            assert!(corr.lag(k).abs() <= corr.lag(0));
        }
    }

    #[test]
    fn constant_window_is_degenerate() {
        let corr = compute(&[3.0f32; 32], 4).unwrap();
        assert!(corr.is_degenerate(1e-6));
        let corr = compute(&[0.0f32; 32], 4).unwrap();
        assert!(corr.is_degenerate(1e-6));

        let corr = compute(&test_helper::period_four_window(32), 4).unwrap();
        assert!(!corr.is_degenerate(1e-6));
    }

    #[test]
    fn non_finite_input_is_detected() {
        let mut window = [1.0f32; 16];
        window[3] = f32::INFINITY;
        let corr = compute(&window, 2).unwrap();
        assert!(!corr.is_finite());
    }
}
