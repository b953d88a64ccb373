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

//! periodic import of VIIRS fire hotspots for a configured region, enrichment with air quality and
//! news context, and broadcast of the hotspots as APRS position reports

use std::{path::{Path,PathBuf}, time::Duration};
use serde::{Deserialize,Serialize};
use odin_common::datetime::{deserialize_duration, serialize_duration, secs};

pub mod errors;
pub use errors::{Result, OdinFireAprsError};
use errors::config_error;

pub mod logging;
pub mod viirs;
pub mod geocode;
pub mod aqi;
pub mod news;
pub mod sender;
pub mod pipeline;
pub mod scheduler;

pub use viirs::{GeoWindow, HotspotRecord, DatasetFilter};
pub use geocode::LocationResolver;
pub use aqi::{AirQuality, AqiLookup};
pub use news::{NewsMatcher, NO_LINK_FOUND};
pub use sender::{RadioSender, StationSuffix};
pub use pipeline::{FirePipeline, PipelineOptions, RunSummary, TemperatureLookup, NewsLookup};
pub use scheduler::{RecurrenceDriver, RunGuard};

#[derive(Deserialize,Serialize,Debug,Clone)]
pub struct FireAprsConfig {
    pub viirs: ViirsConfig,
    pub aprssend: AprsSendConfig,
    pub aqi: AqiConfig,
    pub newsfeed: NewsFeedConfig,
    pub logging: LoggingConfig,
}

#[derive(Deserialize,Serialize,Debug,Clone)]
pub struct ViirsConfig {
    pub url: String, // of the VIIRS CSV file to download
    pub filepath: PathBuf, // where to store the downloaded CSV
    pub latitude1: f64, // north bound
    pub latitude2: f64, // south bound
    pub longitude1: f64, // west bound
    pub longitude2: f64, // east bound

    #[serde(default="default_snapshot")]
    pub snapshot: PathBuf, // filtered hotspots as JSON

    #[serde(default="default_download_timeout", deserialize_with="deserialize_duration", serialize_with="serialize_duration")]
    pub timeout: Duration,
}

impl ViirsConfig {
    pub fn window (&self)->GeoWindow {
        GeoWindow { lat_max: self.latitude1, lat_min: self.latitude2, lon_min: self.longitude1, lon_max: self.longitude2 }
    }
}

#[derive(Deserialize,Serialize,Debug,Clone)]
pub struct AprsSendConfig {
    pub callsign: String,
    pub password: String, // APRS-IS passcode
    pub comment: String, // appended to each report, can be empty
    pub symbol: String, // prefix of the no-activity report
    pub port: u16,

    #[serde(default="default_aprs_host")]
    pub host: String,

    #[serde(default="default_send_delay", deserialize_with="deserialize_duration", serialize_with="serialize_duration")]
    pub send_delay: Duration, // APRS-IS rate limit

    #[serde(default="default_connect_timeout", deserialize_with="deserialize_duration", serialize_with="serialize_duration")]
    pub connect_timeout: Duration,
}

#[derive(Deserialize,Serialize,Debug,Clone)]
pub struct AqiConfig {
    pub authtoken: String, // WAQI API token

    #[serde(default="default_aqi_url")]
    pub url: String,

    #[serde(default="default_geocoder_url")]
    pub geocoder_url: String,

    #[serde(default="default_user_agent")]
    pub user_agent: String, // Nominatim requires an identifying user agent

    #[serde(default="default_lookup_timeout", deserialize_with="deserialize_duration", serialize_with="serialize_duration")]
    pub timeout: Duration,
}

#[derive(Deserialize,Serialize,Debug,Clone)]
pub struct NewsFeedConfig {
    pub link: String, // RSS or Atom feed URL
    pub keyword: String,

    #[serde(default="default_lookup_timeout", deserialize_with="deserialize_duration", serialize_with="serialize_duration")]
    pub timeout: Duration,
}

#[derive(Deserialize,Serialize,Debug,Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub log_file: PathBuf,
}

// serde only allows functions as defaults
fn default_snapshot()->PathBuf { PathBuf::from("viirs.json") }
fn default_download_timeout()->Duration { secs(60) }
fn default_aprs_host()->String { "rotate.aprs.net".into() }
fn default_send_delay()->Duration { secs(5) }
fn default_connect_timeout()->Duration { secs(10) }
fn default_aqi_url()->String { "http://api.waqi.info/feed".into() }
fn default_geocoder_url()->String { "https://nominatim.openstreetmap.org/reverse".into() }
fn default_user_agent()->String { "fire_aprs".into() }
fn default_lookup_timeout()->Duration { secs(10) }

pub fn parse_config (src: &str)->Result<FireAprsConfig> {
    let config: FireAprsConfig = ron::from_str(src)?;
    check_config( &config)?;
    Ok(config)
}

pub fn load_config (path: impl AsRef<Path>)->Result<FireAprsConfig> {
    let path = path.as_ref();
    let src = std::fs::read_to_string(path)
        .map_err(|e| config_error!("cannot read config file {:?}: {}", path, e))?;
    parse_config( &src)
}

fn check_config (config: &FireAprsConfig)->Result<()> {
    let w = config.viirs.window();
    if !(w.lat_min <= w.lat_max) || !(w.lon_min <= w.lon_max) {
        return Err( config_error!("empty geographic window {:?}", w))
    }
    if config.aprssend.callsign.trim().is_empty() {
        return Err( config_error!("empty aprssend.callsign"))
    }
    if config.viirs.url.is_empty() || config.newsfeed.link.is_empty() {
        return Err( config_error!("viirs.url and newsfeed.link have to be set"))
    }
    Ok(())
}
