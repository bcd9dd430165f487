// Copyright 2023-2024 Google LLC
// Copyright 2025- flacenc-rs developers
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

//! A module for window sources for "yulewalk-bin".

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::path::Path;

use yulewalk::ChannelId;

/// Error while loading a window file.
#[derive(Debug)]
pub enum InputError {
    Io(std::io::Error),
    Parse { line: usize, token: String },
    TooManyChannels { found: usize, configured: usize },
}

impl Error for InputError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse { .. } | Self::TooManyChannels { .. } => None,
        }
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "cannot read input: {e}"),
            Self::Parse { line, token } => {
                write!(f, "line {line}: \"{token}\" is not a number")
            }
            Self::TooManyChannels { found, configured } => write!(
                f,
                "input has {found} windows but only {configured} channels are configured"
            ),
        }
    }
}

/// Sample windows loaded from a text file.
///
/// Each non-empty line that does not start with `#` is one channel's
/// window. Samples are separated by whitespace or commas. The n-th window
/// line is fed to channel `n`.
#[derive(Clone, Debug, PartialEq)]
#[allow(clippy::module_name_repetitions)]
pub struct WindowSource {
    windows: Vec<Vec<f32>>,
}

impl WindowSource {
    /// Loads windows from `path`.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or contains a non-numeric token.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, InputError> {
        let src = std::fs::read_to_string(path).map_err(InputError::Io)?;
        Self::parse(&src)
    }

    /// Parses windows from `src`.
    ///
    /// # Errors
    ///
    /// Fails when `src` contains a non-numeric token.
    pub fn parse(src: &str) -> Result<Self, InputError> {
        let mut windows = vec![];
        for (lineno, line) in src.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let window = line
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|tok| !tok.is_empty())
                .map(|tok| {
                    tok.parse::<f32>().map_err(|_| InputError::Parse {
                        line: lineno + 1,
                        token: tok.to_owned(),
                    })
                })
                .collect::<Result<Vec<f32>, _>>()?;
            windows.push(window);
        }
        Ok(Self { windows })
    }

    /// Returns the number of windows.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Returns true if no window is loaded.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Converts into the per-channel map accepted by `recompute_all`.
    ///
    /// # Errors
    ///
    /// Fails if there are more windows than `channels`.
    pub fn into_channel_map(
        self,
        channels: usize,
    ) -> Result<BTreeMap<ChannelId, Vec<f32>>, InputError> {
        if self.windows.len() > channels {
            return Err(InputError::TooManyChannels {
                found: self.windows.len(),
                configured: channels,
            });
        }
        Ok(self
            .windows
            .into_iter()
            .enumerate()
            .map(|(ch, w)| (ChannelId::new(ch), w))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[test]
    fn parse_mixed_separators() {
        let src = "
# adc1
1.0, 0.0, -1.0 0.0
  0.5\t0.25

2e-1,,3
";
        let windows = WindowSource::parse(src).unwrap();
        assert_eq!(windows.len(), 3);
        let map = windows.into_channel_map(6).unwrap();
        assert_eq!(map[&ChannelId::new(0)], vec![1.0, 0.0, -1.0, 0.0]);
        assert_eq!(map[&ChannelId::new(1)], vec![0.5, 0.25]);
        assert_eq!(map[&ChannelId::new(2)], vec![0.2, 3.0]);
    }

    #[rstest]
    fn parse_error_reports_line(#[values("abc", "1.0 x", "1..0")] bad: &str) {
        let src = format!("1 2 3\n{bad}\n");
        match WindowSource::parse(&src) {
            Err(InputError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn too_many_windows() {
        let windows = WindowSource::parse("1\n2\n3\n").unwrap();
        assert!(matches!(
            windows.into_channel_map(2),
            Err(InputError::TooManyChannels {
                found: 3,
                configured: 2
            })
        ));
    }

    #[test]
    fn generated_signal_round_trips_through_text() {
        use yulewalk::sigen::Signal;
        let signal = yulewalk::sigen::Sine::new(16, 1.0).to_vec(32);
        let line = signal
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        let windows = WindowSource::parse(&line).unwrap();
        let map = windows.into_channel_map(1).unwrap();
        assert_eq!(map[&ChannelId::new(0)], signal);
    }
}
