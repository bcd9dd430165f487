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

//! Per-channel AR estimation pipeline and its persisted state.

use std::fmt;

#[cfg(feature = "log")]
use log::debug;
#[cfg(feature = "serde")]
use serde::Deserialize;
#[cfg(feature = "serde")]
use serde::Serialize;

use super::autocorr;
use super::autocorr::AutocorrelationVector;
use super::config;
use super::constant::MAX_ORDER;
use super::constant::panic_msg;
use super::error::EstimateError;
use super::error::Verified;
use super::solver::CoefficientVector;
use super::solver::Method;
use super::toeplitz;

/// Identifier of an acquisition channel (index into the channel arena).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct ChannelId(usize);

impl ChannelId {
    /// Constructs `ChannelId` from an arena index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the arena index.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of the latest recompute of a channel.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum Status {
    /// No recompute has run yet.
    #[default]
    Uninitialized,
    /// Coefficients were updated.
    Success,
    /// The window was not longer than the model order.
    InsufficientData,
    /// The Yule-Walker system was not invertible.
    SingularMatrix,
    /// Non-finite values were found in the estimate.
    NumericInvalid,
}

impl Status {
    /// Returns true if the latest recompute committed new coefficients.
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<&EstimateError> for Status {
    fn from(e: &EstimateError) -> Self {
        match e {
            EstimateError::InsufficientData { .. } => Self::InsufficientData,
            EstimateError::SingularMatrix => Self::SingularMatrix,
            EstimateError::NumericInvalid => Self::NumericInvalid,
        }
    }
}

impl From<EstimateError> for Status {
    fn from(e: EstimateError) -> Self {
        Self::from(&e)
    }
}

/// Persisted state of a channel.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[allow(clippy::module_name_repetitions)]
pub struct ChannelState {
    id: ChannelId,
    autocorr: AutocorrelationVector,
    coefs: CoefficientVector,
    prediction_error: f32,
    status: Status,
}

impl ChannelState {
    fn new(id: ChannelId, order: usize) -> Self {
        let zeros = [0.0f32; MAX_ORDER + 1];
        let mut coefs = CoefficientVector::new();
        coefs
            .extend_from_slice(&zeros[..order])
            .expect(panic_msg::DATA_INCONSISTENT);
        Self {
            id,
            autocorr: AutocorrelationVector::from_lags(&zeros[..=order], 0.0, 0),
            coefs,
            prediction_error: 0.0,
            status: Status::Uninitialized,
        }
    }

    /// Returns the channel identifier.
    pub const fn id(&self) -> ChannelId {
        self.id
    }

    /// Returns the latest auto-correlation estimate.
    ///
    /// This is overwritten whenever the auto-correlation stage succeeds, even
    /// if the solve stage fails afterwards.
    pub const fn autocorrelation(&self) -> &AutocorrelationVector {
        &self.autocorr
    }

    /// Returns the last committed coefficients.
    pub fn coefficients(&self) -> &[f32] {
        &self.coefs
    }

    /// Returns the residual variance of the last committed model.
    pub const fn prediction_error(&self) -> f32 {
        self.prediction_error
    }

    /// Returns the status of the latest recompute.
    pub const fn status(&self) -> Status {
        self.status
    }
}

/// AR estimator for a single acquisition channel.
///
/// Runs auto-correlation, Toeplitz assembly and the solve in sequence, and
/// commits coefficients only when every stage succeeds.
#[derive(Clone, Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct ChannelEstimator {
    state: ChannelState,
    order: usize,
    window_len: usize,
    method: Method,
    tolerance: f32,
    check_finite: bool,
}

impl ChannelEstimator {
    /// Constructs an estimator in `Uninitialized` state.
    ///
    /// A `Verified` config guarantees `1 <= order <= MAX_ORDER`, which every
    /// later stage relies on.
    pub fn new(id: ChannelId, config: &Verified<config::Estimator>) -> Self {
        Self {
            state: ChannelState::new(id, config.order),
            order: config.order,
            window_len: config.window_len,
            method: config.solver.method,
            tolerance: config.solver.singular_tolerance,
            check_finite: config.check_finite,
        }
    }

    /// Returns the channel identifier.
    pub const fn id(&self) -> ChannelId {
        self.state.id
    }

    /// Returns the AR order.
    pub const fn order(&self) -> usize {
        self.order
    }

    /// Returns the persisted state.
    pub const fn state(&self) -> &ChannelState {
        &self.state
    }

    /// Returns the status of the latest recompute.
    pub const fn status(&self) -> Status {
        self.state.status
    }

    /// Returns a snapshot of the last committed coefficients.
    ///
    /// The length is always equal to the order.
    pub fn coefficients(&self) -> CoefficientVector {
        self.state.coefs.clone()
    }

    /// Runs one estimation cycle over `window`.
    ///
    /// Only the first `window_len` samples are read, and nothing refers to
    /// `window` after this returns. On failure the previously committed
    /// coefficients are kept.
    pub fn recompute(&mut self, window: &[f32]) -> Status {
        let status = match self.estimate(window) {
            Ok(()) => Status::Success,
            Err(e) => {
                #[cfg(feature = "log")]
                debug!("channel {}: {}", self.state.id, e);
                Status::from(e)
            }
        };
        self.state.status = status;
        status
    }

    fn estimate(&mut self, window: &[f32]) -> Result<(), EstimateError> {
        let window = &window[..window.len().min(self.window_len)];
        let autocorr = autocorr::compute(window, self.order)?;
        if self.check_finite && !autocorr.is_finite() {
            return Err(EstimateError::NumericInvalid);
        }
        self.state.autocorr = autocorr;
        if self.state.autocorr.is_degenerate(self.tolerance) {
            return Err(EstimateError::SingularMatrix);
        }

        let system = toeplitz::build(&self.state.autocorr, self.order);
        let solution = self.method.solve(&system, self.tolerance)?;
        if self.check_finite && !solution.is_finite() {
            return Err(EstimateError::NumericInvalid);
        }

        self.state.prediction_error = solution.prediction_error();
        self.state.coefs = solution.into_coefs();
        Ok(())
    }
}
