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

use std::{sync::{Arc, atomic::{AtomicU32, Ordering}}, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use odin_aprs::{AprsLink, AprsPosition, PositionReport};

use crate::{AprsSendConfig, HotspotRecord, errors::Result};

pub const FIRST_SUFFIX: u32 = 11;

/// fixed position of the no-activity report (34°N 31°E)
pub const NO_ACTIVITY_LAT: &str = "3400.00N";
pub const NO_ACTIVITY_LON: &str = "03100.00E";

/// process wide station id suffix. Survives sender instances so that we never re-use a suffix
/// across reconnects
#[derive(Debug)]
pub struct StationSuffix(AtomicU32);

impl StationSuffix {
    pub fn new (first: u32)->Self { StationSuffix( AtomicU32::new(first)) }

    pub fn current (&self)->u32 { self.0.load( Ordering::SeqCst) }

    fn advance (&self) { self.0.fetch_add( 1, Ordering::SeqCst); }
}

impl Default for StationSuffix {
    fn default()->Self { StationSuffix::new( FIRST_SUFFIX) }
}

/// the station specific parts of outgoing reports
#[derive(Debug,Clone)]
pub struct StationInfo {
    pub callsign: String,
    pub comment: String,
    pub symbol: String,
    pub send_delay: Duration,
}

impl From<&AprsSendConfig> for StationInfo {
    fn from (c: &AprsSendConfig)->Self {
        StationInfo { callsign: c.callsign.clone(), comment: c.comment.clone(), symbol: c.symbol.clone(), send_delay: c.send_delay }
    }
}

/// the rate limit delay after each report. Cut short if we get cancelled
async fn pause (delay: Duration, cancel: CancellationToken) {
    tokio::select! {
        _ = tokio::time::sleep( delay) => {}
        _ = cancel.cancelled() => { debug!("send delay interrupted by shutdown") }
    }
}

/// sends hotspot position reports over an [`AprsLink`], one at a time and separated by the
/// configured delay
pub struct RadioSender<L: AprsLink> {
    link: L,
    station: StationInfo,
    suffix: Arc<StationSuffix>,
    cancel: CancellationToken,
}

impl<L: AprsLink> RadioSender<L> {
    pub fn new (link: L, station: StationInfo, suffix: Arc<StationSuffix>, cancel: CancellationToken)->Self {
        RadioSender { link, station, suffix, cancel }
    }

    pub fn is_connected (&self)->bool { self.link.is_connected() }

    pub fn link (&self)->&L { &self.link }

    pub async fn connect (&mut self)->Result<()> {
        Ok( self.link.connect().await? )
    }

    fn freetext (&self, body: &str)->String {
        let comment = self.station.comment.trim();
        if comment.is_empty() { body.to_string() } else { format!("{body} {comment}") }
    }

    async fn transmit (&mut self, position: AprsPosition, freetext: String)->Result<()> {
        let report = PositionReport::new( &self.station.callsign, self.suffix.current(), position, freetext);
        let line = report.to_line()?;

        if let Err(e) = self.link.send_line( &line).await {
            error!("failed to send {}: {}", report.station_id(), e);
            return Err(e.into())
        }
        self.suffix.advance();
        info!("sent APRS report: {line}");

        pause( self.station.send_delay, self.cancel.clone()).await;
        Ok(())
    }

    pub async fn send (&mut self, hotspot: &HotspotRecord, body: &str)->Result<()> {
        let position = AprsPosition::from_degrees( hotspot.latitude, hotspot.longitude)?;
        let freetext = self.freetext( body);
        self.transmit( position, freetext).await
    }

    pub async fn send_no_activity (&mut self)->Result<()> {
        let position = AprsPosition { lat: NO_ACTIVITY_LAT.to_string(), lon: NO_ACTIVITY_LON.to_string() };
        let body = format!("{} No fires today", self.station.symbol.trim());
        let freetext = self.freetext( body.trim());
        self.transmit( position, freetext).await
    }

    pub async fn disconnect (&mut self) {
        self.link.disconnect().await
    }
}
