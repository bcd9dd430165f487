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

//! Estimator configuration structs.

use std::num::NonZeroUsize;

#[cfg(feature = "serde")]
use serde::Deserialize;
#[cfg(feature = "serde")]
use serde::Serialize;

use super::constant::solver::DEFAULT_SINGULAR_TOLERANCE;
use super::constant::DEFAULT_CHANNELS;
use super::constant::DEFAULT_ORDER;
use super::constant::DEFAULT_WINDOW_LEN;
use super::constant::MAX_ORDER;
use super::error::verify_range;
use super::error::verify_true;
use super::error::Verify;
use super::error::VerifyError;
use super::solver::Method;

/// Configuration for the multi-channel estimator.
///
/// Everything here is fixed at initialization; there is no per-call
/// configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Estimator {
    /// AR model order `p`, shared by all channels.
    pub order: usize,
    /// Number of samples `W` consumed from each window.
    ///
    /// Samples beyond this length are ignored. `window_len <= order` is
    /// accepted, but then every recompute ends with `InsufficientData`.
    pub window_len: usize,
    /// Number of acquisition channels.
    pub channels: usize,
    /// Human-readable channel names used in logs and reports.
    ///
    /// Either empty or exactly `channels` long.
    pub labels: Vec<String>,
    /// If set, non-finite autocorrelation or coefficients are reported as
    /// `NumericInvalid`.
    pub check_finite: bool,
    /// If set, `recompute_all` fans channels out to worker threads.
    pub multithread: bool,
    /// The number of worker threads. Machine parallelism is used if unset.
    pub workers: Option<NonZeroUsize>,
    /// Configuration for the linear solver.
    pub solver: Solver,
}

impl Default for Estimator {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER,
            window_len: DEFAULT_WINDOW_LEN,
            channels: DEFAULT_CHANNELS,
            labels: vec![],
            check_finite: true,
            multithread: cfg!(feature = "par"),
            workers: None,
            solver: Solver::default(),
        }
    }
}

impl Estimator {
    /// Returns the label of the `n`-th channel.
    pub fn label(&self, n: usize) -> String {
        self.labels
            .get(n)
            .map_or_else(|| format!("ch{n}"), Clone::clone)
    }
}

impl Verify for Estimator {
    fn verify(&self) -> Result<(), VerifyError> {
        verify_range!("order", self.order, 1..=MAX_ORDER)?;
        verify_range!("window_len", self.window_len, 1..)?;
        verify_range!("channels", self.channels, 1..)?;
        verify_true!(
            "labels",
            self.labels.is_empty() || self.labels.len() == self.channels,
            "must be empty or have one entry per channel"
        )?;
        self.solver.verify().map_err(|e| e.within("solver"))?;
        Ok(())
    }
}

/// Configuration for the Yule-Walker solver.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Solver {
    /// Algorithm used for solving the normal equations.
    pub method: Method,
    /// Relative tolerance used in singularity tests.
    pub singular_tolerance: f32,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            method: Method::default(),
            singular_tolerance: DEFAULT_SINGULAR_TOLERANCE,
        }
    }
}

impl Verify for Solver {
    fn verify(&self) -> Result<(), VerifyError> {
        verify_true!(
            "singular_tolerance",
            self.singular_tolerance > 0.0 && self.singular_tolerance < 1.0,
            "must be in the open interval (0, 1)"
        )
    }
}
