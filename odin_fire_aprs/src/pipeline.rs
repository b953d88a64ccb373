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

use std::sync::Arc;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, error};
use odin_aprs::{AprsIsClient, AprsIsConfig, AprsLink};

use crate::{
    FireAprsConfig, DatasetFilter, AqiLookup, NewsMatcher, NO_LINK_FOUND,
    sender::{RadioSender, StationInfo, StationSuffix},
    errors::Result
};

pub const NO_DATA: &str = "N/A";
pub const DEFAULT_BODY: &str = "Fire detected";

#[async_trait]
pub trait TemperatureLookup: Send + Sync {
    async fn temperature_at (&self, lat: f64, lon: f64)->Option<String>;
}

#[async_trait]
pub trait NewsLookup: Send + Sync {
    /// a link or [`NO_LINK_FOUND`]
    async fn find_link (&self)->String;
}

#[derive(Debug,Clone,Copy)]
pub struct PipelineOptions {
    pub enable_aqi: bool,
    pub enable_news: bool,
}

impl Default for PipelineOptions {
    fn default()->Self { PipelineOptions { enable_aqi: true, enable_news: true } }
}

/// outcome of one pipeline run
#[derive(Debug,Clone,Default,PartialEq,Eq)]
pub struct RunSummary {
    pub hotspots: usize,
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
    pub no_activity: bool,
    pub cancelled: bool,
}

/// compose the report body from the available enrichment parts
pub fn compose_body (temperature: Option<&str>, news_link: Option<&str>)->String {
    let mut parts: Vec<String> = Vec::with_capacity(2);
    if let Some(t) = temperature {
        parts.push( format!("AQI Temp: {t}°C"));
    }
    if let Some(link) = news_link {
        parts.push( format!("News: {link}"));
    }

    if parts.is_empty() { DEFAULT_BODY.to_string() } else { parts.join(", ") }
}

pub type LinkFactory<L> = Box<dyn Fn()->L + Send + Sync>;

/// one complete fire processing cycle: refresh the VIIRS snapshot, then send one enriched report per
/// hotspot (or a single no-activity report) over a fresh radio connection
pub struct FirePipeline<L: AprsLink> {
    dataset: DatasetFilter,
    temperature: Option<Arc<dyn TemperatureLookup>>,
    news: Option<Arc<dyn NewsLookup>>,
    new_link: LinkFactory<L>,
    station: StationInfo,
    suffix: Arc<StationSuffix>,
    cancel: CancellationToken,
}

impl FirePipeline<AprsIsClient> {
    /// production pipeline talking to the configured APRS-IS server
    pub fn from_config (config: &FireAprsConfig, options: PipelineOptions, cancel: CancellationToken)->Result<Self> {
        let dataset = DatasetFilter::new( config.viirs.clone())?;

        let temperature: Option<Arc<dyn TemperatureLookup>> = if options.enable_aqi {
            Some( Arc::new( AqiLookup::from_config( &config.aqi)?))
        } else { None };

        let news: Option<Arc<dyn NewsLookup>> = if options.enable_news {
            Some( Arc::new( NewsMatcher::from_config( &config.newsfeed)?))
        } else { None };

        let c = &config.aprssend;
        let aprs_config = AprsIsConfig {
            host: c.host.clone(),
            port: c.port,
            callsign: c.callsign.clone(),
            passcode: c.password.clone(),
            software: "fire_aprs".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            connect_timeout: c.connect_timeout
        };
        let new_link: LinkFactory<AprsIsClient> = Box::new( move || AprsIsClient::new( aprs_config.clone()));

        Ok( FirePipeline::new( dataset, temperature, news, new_link, StationInfo::from(c), Arc::new(StationSuffix::default()), cancel) )
    }
}

impl<L: AprsLink> FirePipeline<L> {
    pub fn new (
        dataset: DatasetFilter,
        temperature: Option<Arc<dyn TemperatureLookup>>,
        news: Option<Arc<dyn NewsLookup>>,
        new_link: LinkFactory<L>,
        station: StationInfo,
        suffix: Arc<StationSuffix>,
        cancel: CancellationToken
    )->Self {
        FirePipeline { dataset, temperature, news, new_link, station, suffix, cancel }
    }

    pub fn suffix (&self)->&Arc<StationSuffix> { &self.suffix }

    /// run one cycle. Dataset and connect errors abort the cycle, per hotspot problems do not.
    /// The radio connection is closed on every path once it was created
    pub async fn run (&self)->Result<RunSummary> {
        info!("starting fire processing run");
        if let Err(e) = self.dataset.refresh().await {
            error!("fire data refresh failed: {e}");
            return Err(e)
        }

        if self.cancel.is_cancelled() {
            info!("run cancelled before connecting to APRS-IS");
            return Ok( RunSummary { cancelled: true, ..RunSummary::default() })
        }

        let mut sender = RadioSender::new( (self.new_link)(), self.station.clone(), self.suffix.clone(), self.cancel.clone());
        if let Err(e) = sender.connect().await {
            error!("failed to connect to APRS-IS: {e}");
            sender.disconnect().await;
            return Err(e)
        }

        let res = self.process( &mut sender).await;
        sender.disconnect().await;

        match &res {
            Ok(summary) => info!("fire processing run done: {summary:?}"),
            Err(e) => error!("fire processing run failed: {e}")
        }
        res
    }

    async fn process (&self, sender: &mut RadioSender<L>)->Result<RunSummary> {
        let entries = self.dataset.load_snapshot()?;
        let mut summary = RunSummary { hotspots: entries.len(), ..RunSummary::default() };

        if entries.is_empty() {
            info!("no hotspots within {:?}", self.dataset.window());
            sender.send_no_activity().await?;
            summary.no_activity = true;
            summary.sent = 1;
            return Ok(summary)
        }

        let mut news_link: Option<String> = None; // the feed does not depend on the hotspot, fetch once per run

        for (idx, entry) in entries.iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!("run cancelled before hotspot {idx}");
                summary.cancelled = true;
                break;
            }

            let Some(hotspot) = entry.hotspot() else {
                warn!("hotspot {idx} has no position, skipped");
                summary.skipped += 1;
                continue;
            };

            let temperature = match &self.temperature {
                Some(lookup) => {
                    let t = lookup.temperature_at( hotspot.latitude, hotspot.longitude).await;
                    if t.is_none() { warn!("hotspot {idx}: AQI temperature not available"); }
                    Some( t.unwrap_or_else( || NO_DATA.to_string()))
                }
                None => None
            };

            if let Some(news) = &self.news {
                if news_link.is_none() {
                    news_link = Some( news.find_link().await);
                }
            }
            if news_link.as_deref() == Some(NO_LINK_FOUND) {
                warn!("hotspot {idx}: no news link found");
            }

            let body = compose_body( temperature.as_deref(), news_link.as_deref());
            match sender.send( &hotspot, &body).await {
                Ok(()) => summary.sent += 1,
                Err(e) => {
                    warn!("hotspot {idx} not sent: {e}");
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }
}
