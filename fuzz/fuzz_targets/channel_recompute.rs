// Copyright 2023 Google LLC
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

#![no_main]

use arbitrary::Arbitrary;
use arbitrary::Unstructured;
use libfuzzer_sys::fuzz_target;

use yulewalk::config;
use yulewalk::constant;
use yulewalk::error::Verify;
use yulewalk::sigen;
use yulewalk::sigen::Signal;
use yulewalk::ChannelEstimator;
use yulewalk::ChannelId;
use yulewalk::Method;
use yulewalk::Status;

fn arbitrary_config(u: &mut Unstructured) -> Result<config::Estimator, arbitrary::Error> {
    let mut config = config::Estimator::default();
    config.order = u.int_in_range(1..=constant::MAX_ORDER)?;
    config.window_len = u.int_in_range(1..=1024usize)?;
    config.check_finite = bool::arbitrary(u)?;
    config.solver.method = if bool::arbitrary(u)? {
        Method::LevinsonDurbin
    } else {
        Method::Inverse
    };
    Ok(config)
}

fn arbitrary_window(u: &mut Unstructured, len: usize) -> Result<Vec<f32>, arbitrary::Error> {
    match u.int_in_range(0..=2usize)? {
        0 => {
            let period = u.int_in_range(2..=64usize)?;
            let seed = u64::arbitrary(u)?;
            Ok(sigen::Sine::new(period, 1.0)
                .with_noise(seed, 0.01)
                .to_vec(len))
        }
        1 => {
            let level = f32::arbitrary(u)?;
            Ok(sigen::Dc::new(level).to_vec(len))
        }
        2 => {
            let mut ret = Vec::with_capacity(len);
            for _t in 0..len {
                ret.push(f32::arbitrary(u)?);
            }
            Ok(ret)
        }
        _ => unreachable!(),
    }
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(config) = arbitrary_config(&mut u) else {
        return;
    };
    let config = config.into_verified().expect("arbitrary config is always valid");

    let mut est = ChannelEstimator::new(ChannelId::new(0), &config);
    for _cycle in 0..3 {
        let Ok(len) = u.int_in_range(0..=1024usize) else {
            return;
        };
        let Ok(window) = arbitrary_window(&mut u, len) else {
            return;
        };
        let before = est.coefficients();
        let status = est.recompute(&window);

        assert_eq!(est.coefficients().len(), config.order);
        assert_eq!(est.status(), status);
        if status.is_success() {
            if config.check_finite {
                assert!(est.coefficients().iter().all(|x| x.is_finite()));
            }
        } else {
            let bits = |v: &[f32]| v.iter().map(|x| x.to_bits()).collect::<Vec<u32>>();
            assert_eq!(bits(&est.coefficients()), bits(&before));
        }
        if len.min(config.window_len) <= config.order {
            assert_eq!(status, Status::InsufficientData);
        }
    }
});
