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

//! TOML report of an estimation run.

use serde::Serialize;

use yulewalk::MultiChannelManager;
use yulewalk::Status;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChannelReport {
    pub label: String,
    pub status: Status,
    pub coefficients: Vec<f32>,
    pub prediction_error: f32,
    pub autocorrelation: Vec<f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub version: String,
    pub order: usize,
    pub window_len: usize,
    pub channel: Vec<ChannelReport>,
}

impl Report {
    /// Takes a snapshot of every channel in `manager`.
    pub fn from_manager(manager: &MultiChannelManager) -> Self {
        let config = manager.config();
        let channel = manager
            .channels()
            .map(|est| {
                let state = est.state();
                ChannelReport {
                    label: config.label(est.id().index()),
                    status: state.status(),
                    coefficients: state.coefficients().to_vec(),
                    prediction_error: state.prediction_error(),
                    autocorrelation: state.autocorrelation().as_slice().to_vec(),
                }
            })
            .collect();
        Self {
            version: yulewalk::constant::build_info::CRATE_VERSION.to_owned(),
            order: config.order,
            window_len: config.window_len,
            channel,
        }
    }

    /// Returns the number of channels whose latest cycle succeeded.
    pub fn success_count(&self) -> usize {
        self.channel
            .iter()
            .filter(|ch| ch.status.is_success())
            .count()
    }
}
