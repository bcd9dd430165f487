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

//! Solvers for the Yule-Walker normal equations.

#[cfg(feature = "serde")]
use serde::Deserialize;
#[cfg(feature = "serde")]
use serde::Serialize;

use super::constant::MAX_ORDER;
use super::constant::panic_msg;
use super::error::EstimateError;
use super::toeplitz::YuleWalkerSystem;

/// AR coefficients `a[1..=p]`, stored without heap allocation.
pub type CoefficientVector = heapless::Vec<f32, MAX_ORDER>;

/// Algorithm used for solving `M a = r`.
///
/// This enum is `Serializable` and `Deserializable` because this will be
/// directly used in config structs.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum Method {
    /// Levinson-Durbin recursion exploiting the Toeplitz structure.
    #[default]
    LevinsonDurbin,
    /// Explicit inversion of `M` (pivoted LU) followed by `M^-1 r`.
    Inverse,
}

impl Method {
    /// Solves `system` with the selected algorithm.
    ///
    /// `tolerance` is relative; see [`levinson_durbin`] and
    /// [`inverse_and_multiply`] for what it is compared with.
    ///
    /// # Errors
    ///
    /// Returns `EstimateError::SingularMatrix` if the system is not
    /// invertible within `tolerance`.
    pub fn solve(self, system: &YuleWalkerSystem, tolerance: f32) -> Result<Solution, EstimateError> {
        match self {
            Self::LevinsonDurbin => levinson_durbin(system, tolerance),
            Self::Inverse => inverse_and_multiply(system, tolerance),
        }
    }
}

/// Result of a successful solve.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    coefs: CoefficientVector,
    prediction_error: f32,
}

impl Solution {
    /// Returns the AR coefficients.
    pub fn coefs(&self) -> &[f32] {
        &self.coefs
    }

    /// Consumes `self` and returns the coefficient vector.
    pub fn into_coefs(self) -> CoefficientVector {
        self.coefs
    }

    /// Returns the residual variance `R[0] - sum_k a[k] R[k]` of the model.
    pub const fn prediction_error(&self) -> f32 {
        self.prediction_error
    }

    /// Returns true if the coefficients and the error are finite.
    pub fn is_finite(&self) -> bool {
        self.prediction_error.is_finite() && self.coefs.iter().all(|x| x.is_finite())
    }

    fn from_f64s(coefs: &[f64], prediction_error: f64) -> Self {
        let mut ret = CoefficientVector::new();
        for &c in coefs {
            ret.push(c as f32).expect(panic_msg::DATA_INCONSISTENT);
        }
        Self {
            coefs: ret,
            prediction_error: prediction_error as f32,
        }
    }
}

/// Returns `R[k]` of the autocorrelation sequence `system` was built from.
#[inline]
fn lag(system: &YuleWalkerSystem, k: usize) -> f64 {
    if k == 0 {
        f64::from(system.get(0, 0))
    } else {
        f64::from(system.rhs()[k - 1])
    }
}

/// Solves the Yule-Walker system with Levinson-Durbin recursion.
///
/// Only the first row of `M` and `r` are read; `r` must continue the first
/// row (`r[i] = R[i + 1]`), which holds for systems made by
/// [`toeplitz::build`].
///
/// The system is reported as singular if `R[0]` is not positive, if a
/// reflection coefficient reaches magnitude one, or if the prediction error
/// drops to `tolerance * R[0]` or below.
///
/// [`toeplitz::build`]: crate::toeplitz::build
///
/// # Errors
///
/// Returns `EstimateError::SingularMatrix` as described above.
///
/// # Panics
///
/// Panics if the order of `system` is zero.
pub fn levinson_durbin(system: &YuleWalkerSystem, tolerance: f32) -> Result<Solution, EstimateError> {
    let order = system.order();
    assert!(order > 0);

    let r0 = lag(system, 0);
    if !(r0 > 0.0 && r0.is_finite()) {
        return Err(EstimateError::SingularMatrix);
    }
    let floor = f64::from(tolerance) * r0;

    let mut coefs = [0f64; MAX_ORDER];
    let mut prev = [0f64; MAX_ORDER];
    let mut error = r0;

    for i in 0..order {
        let mut acc = lag(system, i + 1);
        for j in 0..i {
            acc -= coefs[j] * lag(system, i - j);
        }
        let reflection = acc / error;
        if !(reflection.abs() < 1.0) {
            return Err(EstimateError::SingularMatrix);
        }

        prev[..i].copy_from_slice(&coefs[..i]);
        coefs[i] = reflection;
        for j in 0..i {
            coefs[j] = reflection.mul_add(-prev[i - 1 - j], prev[j]);
        }

        error *= reflection.mul_add(-reflection, 1.0);
        if error <= floor {
            return Err(EstimateError::SingularMatrix);
        }
    }
    Ok(Solution::from_f64s(&coefs[..order], error))
}

/// Square buffer holding `M` in its leading `p x p` block.
///
/// The rest is filled with the identity so that the block-diagonal whole is
/// inverted together with `M` without heap allocation.
type PaddedMatrix = nalgebra::SMatrix<f64, MAX_ORDER, MAX_ORDER>;
type PaddedVector = nalgebra::SVector<f64, MAX_ORDER>;

/// Inverts `M` of `system` through a partially pivoted LU decomposition.
///
/// `M` is regarded as singular if a pivot magnitude (a diagonal element of
/// `U`) is `tolerance * max|M|` or below. Only the leading `p x p` block of
/// the returned matrix is meaningful.
fn invert(system: &YuleWalkerSystem, tolerance: f32) -> Result<PaddedMatrix, EstimateError> {
    let order = system.order();
    let mut mat = PaddedMatrix::identity();
    let mut scale = 0f64;
    for i in 0..order {
        for (j, &v) in system.row(i).iter().enumerate() {
            mat[(i, j)] = f64::from(v);
            scale = scale.max(f64::from(v).abs());
        }
    }
    if !(scale > 0.0 && scale.is_finite()) {
        return Err(EstimateError::SingularMatrix);
    }
    let floor = f64::from(tolerance) * scale;

    let lu = mat.lu();
    let upper = lu.u();
    if (0..order).any(|i| !(upper[(i, i)].abs() > floor)) {
        return Err(EstimateError::SingularMatrix);
    }
    lu.try_inverse().ok_or(EstimateError::SingularMatrix)
}

/// Computes `M^-1 r` for the given inverse.
fn multiply(inv: &PaddedMatrix, rhs: &[f32]) -> PaddedVector {
    let mut padded = PaddedVector::zeros();
    for (p, &r) in padded.iter_mut().zip(rhs) {
        *p = f64::from(r);
    }
    inv * padded
}

/// Solves the system by explicit inversion, `a = M^-1 r`.
///
/// The system is reported as singular if the LU decomposition meets a pivot
/// whose magnitude is `tolerance * max|M|` or below, or if the resulting
/// prediction error is `tolerance * R[0]` or below.
///
/// # Errors
///
/// Returns `EstimateError::SingularMatrix` as described above.
///
/// # Panics
///
/// Panics if the order of `system` is zero.
pub fn inverse_and_multiply(
    system: &YuleWalkerSystem,
    tolerance: f32,
) -> Result<Solution, EstimateError> {
    let order = system.order();
    assert!(order > 0);

    let inv = invert(system, tolerance)?;
    let rhs = system.rhs();
    let coefs = multiply(&inv, rhs);
    let coefs = &coefs.as_slice()[..order];

    let r0 = lag(system, 0);
    let explained: f64 = coefs
        .iter()
        .zip(rhs)
        .map(|(&a, &r)| a * f64::from(r))
        .sum();
    let error = r0 - explained;
    if !(error > f64::from(tolerance) * r0) {
        return Err(EstimateError::SingularMatrix);
    }
    Ok(Solution::from_f64s(coefs, error))
}
