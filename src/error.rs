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

//! Error and verification traits

use std::error::Error;
use std::fmt;

#[cfg(feature = "serde")]
use serde::Deserialize;
#[cfg(feature = "serde")]
use serde::Serialize;

use super::channel::ChannelId;

/// Error object returned when config integrity verification failed.
///
/// This error maintains a path to the component that is actually erroneous
/// in the nested components.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[allow(clippy::module_name_repetitions)]
pub struct VerifyError {
    components: Vec<String>,
    reason: String,
}

impl VerifyError {
    /// Makes verification error for an invalid variable `component`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use yulewalk::error::*;
    /// let err = VerifyError::new("order", "must be non-negative");
    /// assert_eq!(
    ///     format!("{}", err),
    ///     "verification error: `order` is not valid. reason: must be non-negative"
    /// );
    /// ```
    pub fn new(component: &str, reason: &str) -> Self {
        Self {
            components: vec![component.to_owned()],
            reason: reason.to_owned(),
        }
    }

    /// Prepends the name of an enclosing component to the error location.
    ///
    /// # Examples
    ///
    /// ```
    /// # use yulewalk::error::*;
    /// let err = VerifyError::new("order", "must be non-negative");
    /// let err = err.within("estimator");
    /// assert_eq!(
    ///     format!("{}", err),
    ///     "verification error: `estimator.order` is not valid. reason: must be non-negative"
    /// );
    /// ```
    #[must_use]
    pub fn within(self, component: &str) -> Self {
        let mut components = self.components;
        let reason = self.reason;
        components.push(component.to_owned());
        Self { components, reason }
    }

    /// Gets dot-separated path string for the error location.
    ///
    /// # Examples
    ///
    /// ```
    /// # use yulewalk::error::*;
    /// let err = VerifyError::new("order", "must be non-negative");
    /// let err = err.within("estimator");
    /// assert_eq!(err.path(), "estimator.order");
    /// ```
    pub fn path(&self) -> String {
        let mut path = String::new();
        for (i, name) in self.components.iter().rev().enumerate() {
            if i != 0 {
                path.push('.');
            }
            path.push_str(name);
        }
        path
    }
}

impl Error for VerifyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "verification error: `{}` is not valid. reason: {}",
            self.path(),
            self.reason
        )
    }
}

/// A wrapper that ensures that the inner `T` is verified and unchanged.
///
/// `Verified<T>` can be obtained via [`Verify::into_verified`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct Verified<T>(T);

impl<T> std::ops::Deref for Verified<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.0
    }
}

/// Trait for verifiable structs.
pub trait Verify: Sized + seal_verify::Sealed {
    /// Verifies there's no internal data inconsistency.
    ///
    /// # Errors
    ///
    /// Returns `VerifyError` if there's an invalid variable.
    ///
    /// # Examples
    ///
    /// [`config::Estimator`] implements `Verify`.
    ///
    /// [`config::Estimator`]: crate::config::Estimator
    ///
    /// ```
    /// # use yulewalk::error::*;
    /// # use yulewalk::config::Estimator;
    /// let mut config = Estimator::default();
    /// config.order = 0;  // invalid setting
    /// assert!(config.verify().is_err());
    ///
    /// config.order = 4; // valid setting
    /// assert!(config.verify().is_ok());
    /// ```
    fn verify(&self) -> Result<(), VerifyError>;

    /// Wraps into `Verified` to indicate that the data is already verified.
    ///
    /// # Errors
    ///
    /// Returns the original input and `VerifyError` if `verify` failed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use yulewalk::error::*;
    /// # use yulewalk::config::Estimator;
    /// let mut config = Estimator::default();
    /// config.window_len = 0;
    /// assert!(config.into_verified().is_err());
    /// ```
    fn into_verified(self) -> Result<Verified<Self>, (Self, VerifyError)> {
        let result = self.verify();
        if let Err(e) = result {
            Err((self, e))
        } else {
            Ok(Verified(self))
        }
    }
}

/// A wrapping function to make it compatible with "?" operator.
pub(crate) fn verify_macro_impl(cond: bool, varname: &str, msg: &str) -> Result<(), VerifyError> {
    if !cond {
        return Err(VerifyError::new(varname, msg));
    }
    Ok(())
}

/// Checks if `$cond` is true and do `return Err(...)` if so.
///
/// An error object `VerifyErr` is constructed using `$varname` and
/// `$msg` that are formatted using the extra args (`$args`).
macro_rules! verify_true {
    ($varname:literal, $cond:expr, $msg:literal, $($args: expr),*) => {
        crate::error::verify_macro_impl(
            $cond,
            &format!($varname, $($args),*),
            &format!($msg, $($args),*),
        )
    };
    ($varname:literal, $cond:expr, $msg:literal) => {
        verify_true!($varname, $cond, $msg,)
    }
}
pub(crate) use verify_true;

/// Checks if `$actual` is in the range, and emits err with default msgs if not.
///
/// An error is constructed using the same way as [`verify_true`].
macro_rules! verify_range {
    ($varname: literal, $actual:expr, $lowlimit:tt ..= $highlimit:tt) => {
        verify_range!($varname, $actual, ($lowlimit)..)
            .and_then(|()| verify_range!($varname, $actual, ..=($highlimit)))
    };
    ($varname: literal, $actual:expr, $lowlimit:tt ..) => {{
        #[allow(unused_parens)]
        let limit = $lowlimit;
        verify_true!(
            $varname,
            $actual >= limit,
            "must be greater than or equal to {limit}"
        )
    }};
    ($varname: literal, $actual:expr, ..= $highlimit:tt) => {{
        #[allow(unused_parens)]
        let limit = $highlimit;
        verify_true!(
            $varname,
            $actual <= limit,
            "must be less than or equal to {limit}"
        )
    }};
}
pub(crate) use verify_range;

/// Enum of failures that a single recompute cycle can end with.
///
/// None of them is fatal: the channel keeps its last committed coefficients
/// and the next cycle starts over.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[allow(clippy::module_name_repetitions)]
#[non_exhaustive]
pub enum EstimateError {
    /// The window does not contain more samples than the model order.
    InsufficientData {
        /// Number of samples actually available.
        window_len: usize,
        /// Configured AR order.
        order: usize,
    },
    /// The Yule-Walker system is not invertible within the tolerance.
    SingularMatrix,
    /// Autocorrelation or solved coefficients contain non-finite values.
    NumericInvalid,
}

impl Error for EstimateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

impl fmt::Display for EstimateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientData { window_len, order } => write!(
                f,
                "insufficient data: {window_len} samples given for AR({order}) (needs at least {})",
                order + 1
            ),
            Self::SingularMatrix => write!(f, "Yule-Walker matrix is singular"),
            Self::NumericInvalid => write!(f, "non-finite value found in the estimate"),
        }
    }
}

/// Error returned when a channel identifier is out of the configured arena.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[allow(clippy::module_name_repetitions)]
#[non_exhaustive]
pub enum ChannelError {
    /// No channel with the given id is configured.
    Unknown {
        /// Requested identifier.
        id: ChannelId,
        /// Number of channels configured.
        channels: usize,
    },
}

impl Error for ChannelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown { id, channels } => write!(
                f,
                "channel {} is not configured (channels={channels})",
                id.index()
            ),
        }
    }
}

mod seal_verify {
    pub trait Sealed {}

    impl Sealed for crate::config::Estimator {}
    impl Sealed for crate::config::Solver {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_verify_error_path() {
        let err = VerifyError::new("method", "unknown").within("solver");
        let err = err.within("estimator");
        assert_eq!(err.path(), "estimator.solver.method");
    }

    #[test]
    fn estimate_error_messages() {
        let err = EstimateError::InsufficientData {
            window_len: 4,
            order: 4,
        };
        assert_eq!(
            format!("{err}"),
            "insufficient data: 4 samples given for AR(4) (needs at least 5)"
        );
        assert_eq!(
            format!("{}", EstimateError::SingularMatrix),
            "Yule-Walker matrix is singular"
        );
    }

    #[test]
    fn unknown_channel_message() {
        let err = ChannelError::Unknown {
            id: ChannelId::new(7),
            channels: 6,
        };
        assert_eq!(
            format!("{err}"),
            "channel 7 is not configured (channels=6)"
        );
    }
}
