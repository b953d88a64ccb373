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

use std::{path::PathBuf, sync::Arc};
use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;
use odin_common::{datetime::minutes, process::set_ctrlc_handler};
use odin_fire_aprs::{load_config, logging::init_logging, FirePipeline, PipelineOptions, RecurrenceDriver};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "periodically broadcast VIIRS fire hotspots of a region as APRS position reports")]
struct Args {
    /// minutes between runs
    #[arg(short,long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,

    /// do not add air quality temperatures to reports
    #[arg(long)]
    no_aqi: bool,

    /// do not add news links to reports
    #[arg(long)]
    no_news: bool,

    /// config file
    #[arg(short,long, default_value = "fire_aprs.ron")]
    config: PathBuf,
}

#[tokio::main]
async fn main()->Result<()> {
    let args = Args::parse();

    let config = load_config( &args.config)?;
    init_logging( &config.logging)?;

    let cancel = CancellationToken::new();
    let token = cancel.clone();
    set_ctrlc_handler( move || {
        info!("termination signal received, shutting down");
        token.cancel();
    })?;

    let options = PipelineOptions { enable_aqi: !args.no_aqi, enable_news: !args.no_news };
    let pipeline = Arc::new( FirePipeline::from_config( &config, options, cancel.clone())?);
    info!("fire_aprs started (interval: {} min, AQI: {}, news: {})", args.interval, options.enable_aqi, options.enable_news);

    let driver = RecurrenceDriver::new( minutes(args.interval), cancel);
    driver.run( move || {
        let pipeline = pipeline.clone();
        async move {
            let _ = pipeline.run().await; // the pipeline logs its own errors, next tick retries
        }
    }).await;

    info!("fire_aprs terminated");
    Ok(())
}
