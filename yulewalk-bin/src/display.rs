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

//! A module for a fancy output for "yulewalk-bin".

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use termcolor::Color;
use termcolor::ColorChoice;
use termcolor::ColorSpec;
use termcolor::StandardStream;
use termcolor::WriteColor;

use yulewalk::Status;

const CRATE_VERSION: &str = match option_env!("CARGO_PKG_VERSION") {
    Some(v) => v,
    None => "unknown",
};
const DEFAULT_CONFIG_NAME: &str = "[default]";
const STDOUT_NAME: &str = "[stdout]";
const UNKNOWN_NAME: &str = "[unknown]";

pub struct IoArgs {
    config_path: Option<PathBuf>,
    input_path: PathBuf,
    output_path: Option<PathBuf>,
}

fn file_name_or_unknown(path: &Path) -> String {
    path.file_name().map_or_else(
        || UNKNOWN_NAME.to_owned(),
        |s| s.to_string_lossy().to_string(),
    )
}

impl IoArgs {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>, R: AsRef<Path>>(
        config_path: &Option<P>,
        input_path: Q,
        output_path: &Option<R>,
    ) -> Self {
        Self {
            config_path: config_path.as_ref().map(|x| x.as_ref().to_path_buf()),
            input_path: input_path.as_ref().to_path_buf(),
            output_path: output_path.as_ref().map(|x| x.as_ref().to_path_buf()),
        }
    }

    pub fn output_name(&self) -> String {
        self.output_path
            .as_deref()
            .map_or_else(|| STDOUT_NAME.to_owned(), file_name_or_unknown)
    }

    pub fn input_name(&self) -> String {
        file_name_or_unknown(&self.input_path)
    }

    pub fn config_name(&self) -> String {
        self.config_path.as_ref().map_or_else(
            || DEFAULT_CONFIG_NAME.to_owned(),
            |p| {
                p.file_stem().map_or_else(
                    || UNKNOWN_NAME.to_owned(),
                    |n| n.to_string_lossy().to_string(),
                )
            },
        )
    }
}

pub enum Progress {
    Started,
    Done {
        elapsed: Duration,
        succeeded: usize,
        requested: usize,
    },
}

fn terminal_output() -> StandardStream {
    StandardStream::stderr(ColorChoice::Auto)
}

/// Show the initial banner.
pub fn show_banner() -> Result<(), std::io::Error> {
    let termout = terminal_output();
    let mut termout = termout.lock();
    termout.set_color(ColorSpec::new().set_bold(true))?;
    write!(termout, "\n{:>10} ", "yulewalk")?;
    termout.reset()?;
    writeln!(
        termout,
        "(engine v{}, CLI v{})",
        yulewalk::constant::build_info::CRATE_VERSION,
        CRATE_VERSION
    )
}

pub fn show_progress(io: &IoArgs, progress: &Progress) -> Result<(), std::io::Error> {
    let termout = terminal_output();
    let mut termout = termout.lock();
    match *progress {
        Progress::Started => {
            termout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
            write!(termout, "{:>10} ", "Fitting")?;
            termout.reset()?;
            writeln!(
                termout,
                "{} => {} [{}]",
                io.input_name(),
                io.output_name(),
                io.config_name()
            )
        }
        Progress::Done {
            elapsed,
            succeeded,
            requested,
        } => {
            termout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
            write!(termout, "{:>10} ", "Fitted")?;
            termout.reset()?;
            writeln!(
                termout,
                "{succeeded}/{requested} channels in {:.3} ms",
                elapsed.as_secs_f64() * 1000.0
            )?;
            writeln!(termout)
        }
    }
}

/// Shows a one-line summary of a channel.
pub fn show_channel(label: &str, status: Status) -> Result<(), std::io::Error> {
    let termout = terminal_output();
    let mut termout = termout.lock();
    let color = if status.is_success() {
        Color::Green
    } else {
        Color::Yellow
    };
    write!(termout, "{label:>10} ")?;
    termout.set_color(ColorSpec::new().set_fg(Some(color)))?;
    write!(termout, "{status:?}")?;
    termout.reset()?;
    writeln!(termout)
}
