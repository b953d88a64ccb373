/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use std::{fs::OpenOptions, str::FromStr, sync::Arc};
use tracing_subscriber::{filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use odin_common::fs::ensure_parent_dir;

use crate::{LoggingConfig, errors::{Result, op_failed}};

/// map the configured level name to a filter. Also accepts the common "warning" and "critical"
/// aliases, unknown names fall back to INFO
pub fn parse_level (level: &str)->LevelFilter {
    let level = level.trim();
    if level.eq_ignore_ascii_case("warning") {
        LevelFilter::WARN
    } else if level.eq_ignore_ascii_case("critical") {
        LevelFilter::ERROR
    } else {
        LevelFilter::from_str( level).unwrap_or( LevelFilter::INFO)
    }
}

/// install the global tracing subscriber with a stdout layer and, if `log_file` is set, a
/// (non-ANSI) layer that appends to this file
pub fn init_logging (config: &LoggingConfig)->Result<()> {
    let level = parse_level( &config.level);

    let file_layer = if config.log_file.as_os_str().is_empty() {
        None
    } else {
        ensure_parent_dir( &config.log_file)?;
        let file = OpenOptions::new().create(true).append(true).open( &config.log_file)?;
        Some( fmt::layer().with_ansi(false).with_target(false).with_writer( Arc::new(file)) )
    };

    tracing_subscriber::registry()
        .with( level)
        .with( fmt::layer().with_target(false))
        .with( file_layer)
        .try_init()
        .map_err(|e| op_failed!("failed to initialize logging: {}", e))
}
