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

// Note that clippy attributes should be in sync with those declared in "lib.rs"
#![warn(clippy::all, clippy::nursery, clippy::pedantic, clippy::cargo)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate
)]
// Some from restriction lint-group
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

use std::fs::File;
use std::io::Write;
use std::time::Instant;

use clap::Parser;
use log::info;
use log::warn;

use yulewalk::config;
use yulewalk::MultiChannelManager;

mod display;
mod report;
mod source;

use display::Progress;
use report::Report;
use source::WindowSource;

/// Multi-channel Yule-Walker AR estimator.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path for the output TOML report. Written to stdout if unset.
    #[clap(short, long)]
    output: Option<String>,
    /// Path for the input window file (one channel per line).
    source: String,
    /// If set, load config from the specified file.
    #[clap(short, long)]
    config: Option<String>,
    /// If set, dump the config used to the specified path.
    #[clap(long)]
    dump_config: Option<String>,
}

/// Exit codes of the estimator process.
#[repr(u8)]
enum ExitCode {
    InvalidConfig = 1,
    InputError = 2,
}

fn log_build_constants() {
    info!(
        target: "yulewalk-bin::build_info::jsonl",
        "{{ version: \"{}\" }}",
        yulewalk::constant::build_info::CRATE_VERSION,
    );
}

fn load_config(path: Option<&str>) -> Result<config::Estimator, String> {
    let Some(path) = path else {
        return Ok(config::Estimator::default());
    };
    let conf_str =
        std::fs::read_to_string(path).map_err(|e| format!("cannot read {path}: {e}"))?;
    toml::from_str(&conf_str).map_err(|e| format!("syntax error in {path}: {e}"))
}

#[allow(clippy::let_underscore_must_use, clippy::expect_used)]
fn main_body(args: Args) -> Result<(), u8> {
    let io_info = display::IoArgs::new(&args.config, &args.source, &args.output);
    let _ = display::show_banner();
    log_build_constants();

    let estimator_config = load_config(args.config.as_deref()).map_err(|e| {
        eprintln!("Error: {e}");
        ExitCode::InvalidConfig as u8
    })?;
    let mut manager = MultiChannelManager::new(estimator_config).map_err(|e| {
        eprintln!("Error: {}", e.within("estimator_config"));
        ExitCode::InvalidConfig as u8
    })?;

    if let Some(path) = args.dump_config {
        let mut file = File::create(path).expect("Failed to create a file.");
        file.write_all(
            toml::to_string(manager.config())
                .expect("Config serialization failed.")
                .as_bytes(),
        )
        .expect("File write failed.");
    }

    let _ = display::show_progress(&io_info, &Progress::Started);

    let windows = WindowSource::from_path(&args.source)
        .and_then(|src| {
            if src.is_empty() {
                warn!("no window found in {}", args.source);
            } else {
                info!("{} windows loaded from {}", src.len(), args.source);
            }
            src.into_channel_map(manager.channel_count())
        })
        .map_err(|e| {
            eprintln!("Error: {e}");
            ExitCode::InputError as u8
        })?;

    let start = Instant::now();
    let statuses = manager
        .recompute_all(&windows)
        .expect("Window ids are always within the configured channels.");
    let elapsed = start.elapsed();

    for (id, status) in &statuses {
        let label = manager
            .label(*id)
            .expect("Window ids are always within the configured channels.");
        let _ = display::show_channel(&label, *status);
    }

    let report = Report::from_manager(&manager);
    let text = toml::to_string(&report).expect("Report serialization failed.");
    match args.output {
        Some(path) => {
            let mut file = File::create(path).expect("Failed to create a file.");
            file.write_all(text.as_bytes())
                .expect("File write failed.");
        }
        None => {
            std::io::stdout()
                .write_all(text.as_bytes())
                .expect("Failed to write to stdout.");
        }
    }

    let _ = display::show_progress(
        &io_info,
        &Progress::Done {
            elapsed,
            succeeded: report.success_count(),
            requested: statuses.len(),
        },
    );
    Ok(())
}

fn main() -> std::process::ExitCode {
    env_logger::Builder::from_env("YULEWALK_LOG")
        .format_timestamp(None)
        .init();
    match main_body(Args::parse()) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(code) => std::process::ExitCode::from(code),
    }
}
