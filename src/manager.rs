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

//! Owner of all per-channel estimators.

use std::collections::BTreeMap;

#[cfg(feature = "log")]
use log::info;
#[cfg(feature = "log")]
use log::warn;

use super::channel::ChannelEstimator;
use super::channel::ChannelId;
use super::channel::Status;
use super::config;
use super::error::ChannelError;
use super::error::Verified;
use super::error::Verify;
use super::error::VerifyError;
use super::solver::CoefficientVector;

/// Multi-channel AR estimator.
///
/// Holds one [`ChannelEstimator`] per configured channel, indexed by
/// [`ChannelId`]. Channels never read or write each other's state.
///
/// # Examples
///
/// ```
/// use yulewalk::config;
/// use yulewalk::ChannelId;
/// use yulewalk::MultiChannelManager;
/// use yulewalk::Status;
///
/// let config = config::Estimator {
///     channels: 2,
///     order: 2,
///     window_len: 8,
///     ..config::Estimator::default()
/// };
/// let mut manager = MultiChannelManager::new(config)?;
/// let window = [1.0, 0.5, -0.2, -0.6, 0.1, 0.8, 0.3, -0.4];
/// assert_eq!(manager.recompute(ChannelId::new(0), &window)?, Status::Success);
/// assert_eq!(manager.status(ChannelId::new(1))?, Status::Uninitialized);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct MultiChannelManager {
    config: Verified<config::Estimator>,
    channels: Vec<ChannelEstimator>,
}

impl MultiChannelManager {
    /// Constructs the manager with every channel `Uninitialized`.
    ///
    /// # Errors
    ///
    /// Returns `VerifyError` if `config` is invalid.
    pub fn new(config: config::Estimator) -> Result<Self, VerifyError> {
        let config = config.into_verified().map_err(|(_, e)| e)?;
        let channels: Vec<ChannelEstimator> = (0..config.channels)
            .map(|ch| ChannelEstimator::new(ChannelId::new(ch), &config))
            .collect();

        #[cfg(feature = "log")]
        {
            info!(
                "estimator ready: channels={}, order={}, window_len={}, method={:?}",
                config.channels, config.order, config.window_len, config.solver.method
            );
            if config.window_len <= config.order {
                warn!(
                    "window_len ({}) is not larger than order ({}); every recompute will end with InsufficientData",
                    config.window_len, config.order
                );
            }
        }

        Ok(Self { config, channels })
    }

    /// Returns the verified configuration.
    pub fn config(&self) -> &config::Estimator {
        &self.config
    }

    /// Returns the number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Returns an iterator over all channels in id order.
    pub fn channels(&self) -> impl Iterator<Item = &ChannelEstimator> {
        self.channels.iter()
    }

    /// Returns the channel with `id`.
    ///
    /// # Errors
    ///
    /// Returns `ChannelError::Unknown` if `id` is not configured.
    pub fn channel(&self, id: ChannelId) -> Result<&ChannelEstimator, ChannelError> {
        self.channels.get(id.index()).ok_or(ChannelError::Unknown {
            id,
            channels: self.channels.len(),
        })
    }

    fn channel_mut(&mut self, id: ChannelId) -> Result<&mut ChannelEstimator, ChannelError> {
        let channels = self.channels.len();
        self.channels
            .get_mut(id.index())
            .ok_or(ChannelError::Unknown { id, channels })
    }

    /// Returns the display label of the channel with `id`.
    ///
    /// # Errors
    ///
    /// Returns `ChannelError::Unknown` if `id` is not configured.
    pub fn label(&self, id: ChannelId) -> Result<String, ChannelError> {
        self.channel(id).map(|_| self.config.label(id.index()))
    }

    /// Returns a snapshot of the last committed coefficients of `id`.
    ///
    /// # Errors
    ///
    /// Returns `ChannelError::Unknown` if `id` is not configured.
    pub fn coefficients(&self, id: ChannelId) -> Result<CoefficientVector, ChannelError> {
        self.channel(id).map(ChannelEstimator::coefficients)
    }

    /// Returns the status of the latest recompute of `id`.
    ///
    /// # Errors
    ///
    /// Returns `ChannelError::Unknown` if `id` is not configured.
    pub fn status(&self, id: ChannelId) -> Result<Status, ChannelError> {
        self.channel(id).map(ChannelEstimator::status)
    }

    /// Runs one estimation cycle of the channel `id`.
    ///
    /// # Errors
    ///
    /// Returns `ChannelError::Unknown` if `id` is not configured. Estimation
    /// failures are not errors; they are reported through `Status`.
    pub fn recompute(&mut self, id: ChannelId, window: &[f32]) -> Result<Status, ChannelError> {
        Ok(self.channel_mut(id)?.recompute(window))
    }

    /// Runs one estimation cycle for every channel in `windows`.
    ///
    /// Channels not present in `windows` are left untouched. Channels are
    /// processed in parallel if `config.multithread` is set.
    ///
    /// # Errors
    ///
    /// Returns `ChannelError::Unknown` if any key is not configured. In that
    /// case no channel is recomputed.
    pub fn recompute_all<W>(
        &mut self,
        windows: &BTreeMap<ChannelId, W>,
    ) -> Result<BTreeMap<ChannelId, Status>, ChannelError>
    where
        W: AsRef<[f32]>,
    {
        for &id in windows.keys() {
            self.channel(id)?;
        }

        #[cfg(feature = "par")]
        {
            if self.config.multithread && windows.len() > 1 {
                let jobs: Vec<_> = self
                    .channels
                    .iter_mut()
                    .filter_map(|est| {
                        let id = est.id();
                        windows.get(&id).map(|w| (id, est, w.as_ref()))
                    })
                    .collect();
                return Ok(super::par::recompute_all(&self.config, jobs));
            }
        }

        Ok(self
            .channels
            .iter_mut()
            .filter_map(|est| {
                windows
                    .get(&est.id())
                    .map(|w| (est.id(), est.recompute(w.as_ref())))
            })
            .collect())
    }
}
