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

//! Yule-Walker normal equations.

use super::autocorr::AutocorrelationVector;
use super::constant::MAX_ORDER;

/// Symmetric Toeplitz system `M a = r` of order `p`.
///
/// The (i, j)-th element of `M` is `R[|i - j|]` and the i-th element of `r`
/// is `R[i + 1]`. Storage is fixed-size; only the leading `p x p` block is
/// meaningful.
#[derive(Clone, Debug, PartialEq)]
pub struct YuleWalkerSystem {
    matrix: [[f32; MAX_ORDER]; MAX_ORDER],
    rhs: [f32; MAX_ORDER],
    order: usize,
}

impl YuleWalkerSystem {
    /// Returns the order `p` (dimension of the system).
    pub const fn order(&self) -> usize {
        self.order
    }

    /// Returns `M[i][j]`.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is not smaller than `MAX_ORDER`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.matrix[i][j]
    }

    /// Returns the `i`-th row of `M`.
    pub fn row(&self, i: usize) -> &[f32] {
        &self.matrix[i][..self.order]
    }

    /// Returns the right-hand side vector `r`.
    pub fn rhs(&self) -> &[f32] {
        &self.rhs[..self.order]
    }

    /// Makes a system from the first row of `M` and an arbitrary `r`.
    #[cfg(test)]
    pub(crate) fn from_toeplitz(first_row: &[f32], rhs: &[f32]) -> Self {
        let order = rhs.len();
        let mut matrix = [[0.0f32; MAX_ORDER]; MAX_ORDER];
        let mut rhs_buf = [0.0f32; MAX_ORDER];
        for i in 0..order {
            for j in 0..order {
                matrix[i][j] = first_row[i.abs_diff(j)];
            }
        }
        rhs_buf[..order].copy_from_slice(rhs);
        Self {
            matrix,
            rhs: rhs_buf,
            order,
        }
    }

    /// Returns true if `M` is symmetric.
    pub fn is_symmetric(&self) -> bool {
        (0..self.order).all(|i| (0..i).all(|j| self.matrix[i][j] == self.matrix[j][i]))
    }
}

/// Assembles the Yule-Walker system of order `order` from `autocorr`.
///
/// # Panics
///
/// Panics if `autocorr` has fewer than `order + 1` lags, or `order` exceeds
/// `MAX_ORDER`. Both are precondition violations of the pipeline.
pub fn build(autocorr: &AutocorrelationVector, order: usize) -> YuleWalkerSystem {
    assert!(order <= MAX_ORDER);
    assert!(autocorr.order() >= order);
    let lags = autocorr.as_slice();

    let mut matrix = [[0.0f32; MAX_ORDER]; MAX_ORDER];
    let mut rhs = [0.0f32; MAX_ORDER];
    for i in 0..order {
        for j in 0..order {
            matrix[i][j] = lags[i.abs_diff(j)];
        }
        rhs[i] = lags[i + 1];
    }
    YuleWalkerSystem { matrix, rhs, order }
}

#[cfg(test)]
#[allow(clippy::pedantic, clippy::nursery, clippy::needless_range_loop)]
mod tests {
    use super::*;

    #[test]
    fn toeplitz_layout() {
        let corr = AutocorrelationVector::from_lags(&[4.0, 3.0, 2.0, 1.0], 1.0, 16);
        let system = build(&corr, 3);
        assert_eq!(system.order(), 3);
        assert_eq!(system.row(0), &[4.0, 3.0, 2.0]);
        assert_eq!(system.row(1), &[3.0, 4.0, 3.0]);
        assert_eq!(system.row(2), &[2.0, 3.0, 4.0]);
        assert_eq!(system.rhs(), &[3.0, 2.0, 1.0]);
        assert!(system.is_symmetric());
    }

    #[test]
    fn lower_order_than_autocorr() {
        let corr = AutocorrelationVector::from_lags(&[4.0, 3.0, 2.0, 1.0], 1.0, 16);
        let system = build(&corr, 2);
        assert_eq!(system.row(1), &[3.0, 4.0]);
        assert_eq!(system.rhs(), &[3.0, 2.0]);
    }

    #[test]
    fn period_four_system() {
        let corr = AutocorrelationVector::from_lags(
            &[0.5, 0.0, -0.4375, 0.0, 0.375],
            0.5,
            16,
        );
        let system = build(&corr, 4);
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(system.get(i, j), corr.lag(i.abs_diff(j)));
            }
        }
        assert_eq!(system.rhs(), &[0.0, -0.4375, 0.0, 0.375]);
    }

    #[test]
    #[should_panic]
    fn malformed_autocorr_is_a_precondition_violation() {
        let corr = AutocorrelationVector::from_lags(&[1.0, 0.5], 1.0, 16);
        let _system = build(&corr, 2);
    }
}
