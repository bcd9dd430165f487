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

//! Configuration constants

// Constance sorted in an alphabetical-order.  Top-level constants first, and
// then sub-modules. Constants that are used only in a specific sub-module or
// its caller should be placed in the corresponding submodule.

/// Default number of acquisition channels (three ADCs with two inputs each.)
pub const DEFAULT_CHANNELS: usize = 6;

/// Default AR model order.
pub const DEFAULT_ORDER: usize = 10;

/// Default length of a sample window handed over by the acquisition side.
pub const DEFAULT_WINDOW_LEN: usize = 256;

/// Maximum AR model order supported.
///
/// All per-cycle buffers are sized with this constant so that a recompute
/// never touches the heap.
pub const MAX_ORDER: usize = 32;

/// Sub-module containing constants related to build-time information.
pub mod build_info {
    pub const CRATE_VERSION: &str = match option_env!("CARGO_PKG_VERSION") {
        Some(v) => v,
        None => "unknown",
    };
}

/// Constants related to keys for the environment variables.
pub(crate) mod envvar_key {
    /// Environment variable name for specifying the number of threads.
    #[cfg(feature = "par")]
    pub const DEFAULT_PARALLELISM: &str = "YULEWALK_WORKERS";
}

/// Constants related to the linear solvers.
pub mod solver {
    /// Default relative tolerance for singularity tests.
    ///
    /// Prediction errors, pivots and window variances are compared against
    /// this fraction of the corresponding reference magnitude.
    pub const DEFAULT_SINGULAR_TOLERANCE: f32 = 1e-6;
}

/// Module for internal error messages.
///
/// Use `panic!` and those messages only for env-related unrecoverable errors.
/// It's okay to use them in tests, but it's not okay to add another variable
/// only for test functions.
pub(crate) mod panic_msg {
    pub const DATA_INCONSISTENT: &str = "INTERNAL ERROR: Internal variable inconsistency detected.";
    #[cfg(feature = "par")]
    pub const MPMC_SEND_FAILED: &str =
        "INTERNAL ERROR: Critical error occured in multi-thread communication channel.";
    #[cfg(feature = "par")]
    pub const MUTEX_LOCK_FAILED: &str = "INTERNAL ERROR: Couldn't get lock for mutex.";
    #[cfg(feature = "par")]
    pub const MUTEX_DROP_FAILED: &str = "INTERNAL ERROR: Couldn't discard mutex.";
    #[cfg(feature = "par")]
    pub const THREAD_JOIN_FAILED: &str = "INTERNAL ERROR: Failed to wait thread termination.";
}
