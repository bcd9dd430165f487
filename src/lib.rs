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

#![doc = include_str!("../README.md")]
#![warn(clippy::all, clippy::nursery, clippy::pedantic, clippy::cargo)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::missing_const_for_fn,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::wildcard_dependencies
)]
#![warn(
    clippy::clone_on_ref_ptr,
    clippy::create_dir,
    clippy::dbg_macro,
    clippy::empty_structs_with_brackets,
    clippy::exit,
    clippy::if_then_some_else_none,
    clippy::impl_trait_in_params,
    clippy::let_underscore_must_use,
    clippy::lossy_float_literal,
    clippy::multiple_inherent_impl,
    clippy::print_stdout,
    clippy::rc_buffer,
    clippy::rc_mutex,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::separated_literal_suffix,
    clippy::str_to_string,
    clippy::string_add,
    clippy::string_to_string,
    clippy::try_err,
    clippy::unnecessary_self_imports,
    clippy::wildcard_enum_match_arm
)]

pub mod autocorr;
pub mod channel;
pub mod config;
pub mod constant;
pub mod error;
pub mod manager;
#[cfg(feature = "par")]
pub(crate) mod par;
#[cfg(any(test, feature = "__export_sigen"))]
pub mod sigen;
pub mod solver;
pub mod toeplitz;

#[cfg(test)]
pub mod test_helper;

pub use channel::ChannelEstimator;
pub use channel::ChannelId;
pub use channel::Status;
pub use manager::MultiChannelManager;
pub use solver::CoefficientVector;
pub use solver::Method;

#[cfg(test)]
mod test {
    // end-to-end, but transparent test.
    use super::*;
    #[cfg(feature = "serde")]
    use rstest::rstest;

    #[cfg(feature = "serde")]
    const E2E_CONFIGS: [&str; 4] = [
        "",
        r"
[solver]
method = 'Inverse'
        ",
        r"
multithread = false
        ",
        r"
workers = 2
check_finite = false
        ",
    ];

    #[cfg(feature = "serde")]
    #[rstest]
    fn e2e_with_generated_ar_processes(
        #[values(1, 2, 3, 6)] channels: usize,
        #[values(E2E_CONFIGS[0], E2E_CONFIGS[1], E2E_CONFIGS[2], E2E_CONFIGS[3])] config: &str,
    ) {
        const MODELS: [&[f32]; 6] = [
            &[0.75, -0.5],
            &[0.5],
            &[-0.3, 0.2],
            &[0.9, -0.2],
            &[0.0, 0.6],
            &[0.4, 0.1, -0.2],
        ];
        let mut config: config::Estimator = toml::from_str(config).expect("config parsing error");
        config.channels = channels;
        config.order = 3;
        config.window_len = 8192;

        let mut manager = MultiChannelManager::new(config).expect("config is valid");
        let windows = test_helper::multichannel_windows(&MODELS[..channels], 8192, 2024);
        let result = manager.recompute_all(&windows).expect("all ids are known");
        assert_eq!(result.len(), channels);

        for (ch, model) in MODELS[..channels].iter().enumerate() {
            let id = ChannelId::new(ch);
            assert_eq!(result[&id], Status::Success);
            let coefs = manager.coefficients(id).unwrap();
            assert_finite!(coefs);
            for k in 0..3 {
                let expected = model.get(k).copied().unwrap_or(0.0);
                assert_close!(coefs[k], expected, rtol = 0.0, atol = 0.06);
            }
        }
    }

    #[test]
    fn estimate_converges_with_window_length() {
        let truth = [0.75f32, -0.5];
        let mut errors = vec![];
        for window_len in [256, 4096, 65536] {
            let config = config::Estimator {
                channels: 1,
                order: 2,
                window_len,
                ..config::Estimator::default()
            };
            let mut manager = MultiChannelManager::new(config).expect("config is valid");
            let window = test_helper::ar_signal(&truth, window_len, 31);
            let id = ChannelId::new(0);
            assert_eq!(manager.recompute(id, &window).unwrap(), Status::Success);

            let coefs = manager.coefficients(id).unwrap();
            let err: f32 = coefs
                .iter()
                .zip(&truth)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f32::max);
            errors.push(err);
        }
        for (err, tol) in errors.iter().zip([0.3, 0.08, 0.02]) {
            assert!(*err < tol, "errors={errors:?}");
        }
    }

    #[test]
    fn repeated_cycles_with_intermittent_failures() {
        let config = config::Estimator {
            channels: 3,
            order: 4,
            window_len: 128,
            ..config::Estimator::default()
        };
        let mut manager = MultiChannelManager::new(config).expect("config is valid");
        let good = test_helper::multichannel_windows(&[&[0.5], &[0.5], &[0.5]], 128, 8);

        for cycle in 0..8u64 {
            let mut windows = good.clone();
            // channel 1 sees a stuck sensor every other cycle.
            if cycle % 2 == 1 {
                windows.insert(ChannelId::new(1), vec![0.25; 128]);
            }
            let result = manager.recompute_all(&windows).unwrap();
            assert_eq!(result[&ChannelId::new(0)], Status::Success);
            assert_eq!(result[&ChannelId::new(2)], Status::Success);
            let expected = if cycle % 2 == 1 {
                Status::SingularMatrix
            } else {
                Status::Success
            };
            assert_eq!(result[&ChannelId::new(1)], expected);
            assert_eq!(manager.coefficients(ChannelId::new(1)).unwrap().len(), 4);
        }
    }
}
