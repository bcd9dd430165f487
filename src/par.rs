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

//! This module is for parallel recompute. Only compiled when "par" feature is enabled.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::thread;

#[cfg(feature = "log")]
use log::info;

use super::channel::ChannelEstimator;
use super::channel::ChannelId;
use super::channel::Status;
use super::config;
use super::constant::envvar_key;
use super::constant::panic_msg;

/// Sink object that stores per-channel results.
///
/// This is currently just a `BTreeMap<K, T>` with some utility functions.
#[derive(Debug)]
struct ParSink<K, T> {
    data: Mutex<BTreeMap<K, T>>,
}

impl<K: Ord, T> ParSink<K, T> {
    /// Creates `ParSink` object.
    pub const fn new() -> Self {
        Self {
            data: Mutex::new(BTreeMap::new()),
        }
    }

    /// Stores a computation result `element` with a key `key`.
    pub fn push(&self, key: K, element: T) {
        let mut data = self.data.lock().expect(panic_msg::MUTEX_LOCK_FAILED);
        data.insert(key, element);
    }

    /// Consumes `self` and returns the results sorted by key.
    pub fn finalize(self) -> BTreeMap<K, T> {
        self.data.into_inner().expect(panic_msg::MUTEX_DROP_FAILED)
    }
}

/// A unit of work: one channel with the window it should consume.
type Job<'a> = (ChannelId, &'a mut ChannelEstimator, &'a [f32]);

/// Determines worker counts considering various cues.
///
/// `config.workers` has the highest priority, then the environment variable
/// `YULEWALK_WORKERS`, and then the machine parallelism.
fn determine_worker_count(config: &config::Estimator) -> usize {
    let default_parallelism = thread::available_parallelism().map_or(1, NonZeroUsize::get);
    let default_parallelism = std::env::var(envvar_key::DEFAULT_PARALLELISM)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default_parallelism);
    config
        .workers
        .map_or(default_parallelism, NonZeroUsize::get)
}

/// Parallel version of `MultiChannelManager::recompute_all`.
///
/// Each job owns a distinct `&mut ChannelEstimator`, so channels never share
/// state; the workers only share the job queue and the result sink. The
/// returned map is ordered by channel id regardless of completion order.
///
/// # Panics
///
/// This function panics when an internal error regarding inter-thread
/// communication.
pub fn recompute_all(config: &config::Estimator, jobs: Vec<Job<'_>>) -> BTreeMap<ChannelId, Status> {
    let job_count = jobs.len();
    let worker_count = determine_worker_count(config).min(job_count).max(1);
    let (sender, receiver) = crossbeam_channel::bounded::<Job<'_>>(job_count.max(1));
    let sink: ParSink<ChannelId, Status> = ParSink::new();

    for job in jobs {
        sender.send(job).expect(panic_msg::MPMC_SEND_FAILED);
    }
    drop(sender);

    thread::scope(|s| {
        let handles: Vec<_> = (0..worker_count)
            .map(|_n| {
                let receiver = receiver.clone();
                let sink = &sink;
                s.spawn(move || {
                    let mut processed = 0usize;
                    while let Ok((id, estimator, window)) = receiver.recv() {
                        sink.push(id, estimator.recompute(window));
                        processed += 1;
                    }
                    processed
                })
            })
            .collect();
        #[allow(unused_variables)]
        let per_worker: Vec<usize> = handles
            .into_iter()
            .map(|h| h.join().expect(panic_msg::THREAD_JOIN_FAILED))
            .collect();

        #[cfg(feature = "log")]
        info!(
            target: "yulewalk::par::jsonl",
            "{{ worker_count: {}, channel_count: {}, max_channels_per_worker: {} }}",
            worker_count,
            job_count,
            per_worker.iter().max().copied().unwrap_or(0),
        );
    });

    sink.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Verify;
    use crate::test_helper;

    use std::sync::Arc;

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_determine_worker_count() {
        // manually set by config
        let mut config = config::Estimator::default();
        config.workers = NonZeroUsize::new(8);
        assert_eq!(determine_worker_count(&config), 8);

        // default
        let config = config::Estimator::default();
        assert!(determine_worker_count(&config) >= 1);
    }

    #[test]
    fn par_sink_finalization() {
        const REFERENCE: [&str; 5] = ["ParSink", "sorts", "randomly", "ordered", "elems"];
        let sink = Arc::new(ParSink::new());
        let handles: Vec<_> = (0..REFERENCE.len())
            .rev()
            .map(|t| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || sink.push(t, REFERENCE[t]))
            })
            .collect();
        for h in handles {
            h.join().expect(panic_msg::THREAD_JOIN_FAILED);
        }
        let sink = Arc::try_unwrap(sink).expect("all clones are joined");
        let result: Vec<&str> = sink.finalize().into_values().collect();
        assert_eq!(result, REFERENCE);
    }

    #[test]
    fn parallel_matches_sequential() {
        let mut config = test_helper::estimator_config(4, 6, 512);
        config.workers = NonZeroUsize::new(3);
        let config = config.into_verified().expect("config is valid");
        let windows = test_helper::multichannel_windows(
            &[&[0.5], &[0.9, -0.4], &[0.1, 0.2, 0.3], &[-0.7]],
            512,
            99,
        );
        let make_estimators = || -> Vec<ChannelEstimator> {
            (0..4)
                .map(|ch| ChannelEstimator::new(ChannelId::new(ch), &config))
                .collect()
        };

        let mut sequential = make_estimators();
        let expected: BTreeMap<ChannelId, Status> = sequential
            .iter_mut()
            .map(|est| (est.id(), est.recompute(&windows[&est.id()])))
            .collect();

        let mut parallel = make_estimators();
        let jobs: Vec<Job<'_>> = parallel
            .iter_mut()
            .map(|est| {
                let id = est.id();
                (id, est, windows[&id].as_slice())
            })
            .collect();
        let actual = recompute_all(&config, jobs);

        assert_eq!(actual, expected);
        for (p, s) in parallel.iter().zip(&sequential) {
            assert_eq!(p.state(), s.state());
        }
    }

    #[test]
    fn empty_job_list() {
        let config = config::Estimator::default();
        assert!(recompute_all(&config, vec![]).is_empty());
    }
}
