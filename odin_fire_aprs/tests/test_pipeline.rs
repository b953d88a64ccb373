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
#![allow(unused)]

mod common;
use common::*;

use std::{io, path::Path, sync::{Arc, Mutex, atomic::{AtomicUsize, Ordering}}, time::{Duration, Instant}};
use tracing::instrument::WithSubscriber;
use async_trait::async_trait;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use odin_fire_aprs::{
    AqiConfig, AqiLookup, DatasetFilter, FirePipeline, NewsMatcher, NewsLookup, RunSummary, StationSuffix, TemperatureLookup,
    sender::StationInfo
};

// run with "cargo test test_xx -- --nocapture"

const SEND_DELAY: Duration = Duration::from_millis(30);

struct Setup {
    viirs_path: &'static str,
    enrich: bool,
    comment: &'static str,
    fail_connect: bool,
    fail_sends: Vec<usize>,
    send_delay: Duration,
}

impl Default for Setup {
    fn default()->Self {
        Setup { viirs_path: "/viirs.csv", enrich: true, comment: "", fail_connect: false, fail_sends: Vec::new(), send_delay: SEND_DELAY }
    }
}

fn pipeline (base: &str, dir: &Path, setup: Setup, log: &LinkLog, cancel: CancellationToken)->FirePipeline<RecordingLink> {
    let dataset = DatasetFilter::new( viirs_config( base, setup.viirs_path, dir)).unwrap();

    let (temperature, news): (Option<Arc<dyn TemperatureLookup>>, Option<Arc<dyn NewsLookup>>) = if setup.enrich {
        let aqi_config = AqiConfig {
            authtoken: TOKEN.to_string(),
            url: format!("{base}/feed"),
            geocoder_url: format!("{base}/reverse"),
            user_agent: "fire_aprs-test".to_string(),
            timeout: Duration::from_secs(5),
        };
        (
            Some( Arc::new( AqiLookup::from_config( &aqi_config).unwrap()) as Arc<dyn TemperatureLookup>),
            Some( Arc::new( NewsMatcher::new( Client::new(), format!("{base}/news.rss"), "fire")) as Arc<dyn NewsLookup>)
        )
    } else {
        (None, None)
    };

    let station = StationInfo { callsign: "N0CALL".into(), comment: setup.comment.into(), symbol: "T".into(), send_delay: setup.send_delay };
    let log = log.clone();
    let fail_connect = setup.fail_connect;
    let fail_sends = setup.fail_sends.clone();
    let new_link = Box::new( move || {
        let mut link = RecordingLink::new( log.clone());
        link.fail_connect = fail_connect;
        link.fail_sends = fail_sends.clone();
        link
    });

    FirePipeline::new( dataset, temperature, news, new_link, station, Arc::new( StationSuffix::default()), cancel)
}

/// collects formatted log output of the futures it is attached to
#[derive(Clone,Default)]
struct LogCapture (Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    fn subscriber (&self)->impl tracing::Subscriber + Send + Sync + use<> {
        let capture = self.clone();
        tracing_subscriber::fmt()
            .with_max_level( tracing::Level::INFO)
            .with_ansi(false)
            .with_writer( move || capture.clone())
            .finish()
    }

    fn error_lines (&self)->Vec<String> {
        let text = String::from_utf8_lossy( &self.0.lock().unwrap()).to_string();
        text.lines().filter(|l| l.contains("ERROR")).map(|l| l.to_string()).collect()
    }
}

impl io::Write for LogCapture {
    fn write (&mut self, buf: &[u8])->io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush (&mut self)->io::Result<()> { Ok(()) }
}

fn suffix_of (line: &str)->u32 {
    let id = line.split('>').next().unwrap();
    id.rsplit('-').next().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_enriched_reports() {
    let base = spawn_services().await;
    let dir = tempfile::tempdir().unwrap();
    let log = LinkLog::default();
    let p = pipeline( &base, dir.path(), Setup::default(), &log, CancellationToken::new());

    let summary = p.run().await.unwrap();
    assert_eq!( summary, RunSummary { hotspots: 4, sent: 4, ..RunSummary::default() });

    let lines = log.lines();
    assert_eq!( lines.len(), 4);
    assert_eq!( lines[0], "N0CALL-11>APDR15,TCPIP*,qAC,T2STRAS:=3248.60N/03500.60E:AQI Temp: 21.5°C, News: https://news.example/haifa-fire");
    // AQI failed for this one (no temperature), which does not affect the others
    assert_eq!( lines[1], "N0CALL-12>APDR15,TCPIP*,qAC,T2STRAS:=3115.00N/03447.40E:AQI Temp: N/A°C, News: https://news.example/haifa-fire");
    assert!( lines[2].contains(":=3330.00N/03600.00E:AQI Temp: N/A°C"));
    assert!( lines[3].contains(":=2900.00N/03400.00E:AQI Temp: N/A°C"));

    let suffixes: Vec<u32> = lines.iter().map(|l| suffix_of(l)).collect();
    assert_eq!( suffixes, vec![11,12,13,14]);

    let times = log.line_times();
    for w in times.windows(2) {
        assert!( w[1].duration_since(w[0]) >= SEND_DELAY);
    }

    let events = log.events();
    assert_eq!( events.first(), Some(&LinkEvent::Connect));
    assert_eq!( events.last(), Some(&LinkEvent::Disconnect));
    assert_eq!( events.len(), 6);
}

#[tokio::test]
async fn test_no_activity() {
    let base = spawn_services().await;
    let dir = tempfile::tempdir().unwrap();
    let log = LinkLog::default();
    let p = pipeline( &base, dir.path(), Setup { viirs_path: "/viirs_none.csv", ..Setup::default() }, &log, CancellationToken::new());

    let summary = p.run().await.unwrap();
    assert!( summary.no_activity);
    assert_eq!( summary.sent, 1);

    assert_eq!( log.events(), vec![
        LinkEvent::Connect,
        LinkEvent::Line("N0CALL-11>APDR15,TCPIP*,qAC,T2STRAS:=3400.00N/03100.00E:T No fires today".into()),
        LinkEvent::Disconnect
    ]);
}

#[tokio::test]
async fn test_without_enrichment() {
    let base = spawn_services().await;
    let dir = tempfile::tempdir().unwrap();
    let log = LinkLog::default();
    let p = pipeline( &base, dir.path(), Setup { enrich: false, comment: "via fire_aprs", ..Setup::default() }, &log, CancellationToken::new());

    p.run().await.unwrap();
    let lines = log.lines();
    assert_eq!( lines.len(), 4);
    for line in &lines {
        assert!( line.ends_with(":Fire detected via fire_aprs"), "{line}");
    }
}

#[tokio::test]
async fn test_connect_failure() {
    let base = spawn_services().await;
    let dir = tempfile::tempdir().unwrap();
    let log = LinkLog::default();
    let p = pipeline( &base, dir.path(), Setup { fail_connect: true, ..Setup::default() }, &log, CancellationToken::new());

    assert!( p.run().await.is_err());
    assert_eq!( log.events(), vec![ LinkEvent::Disconnect ]);
    assert_eq!( p.suffix().current(), 11);
}

#[tokio::test]
async fn test_dataset_failure() {
    let base = spawn_services().await;
    let dir = tempfile::tempdir().unwrap();
    let log = LinkLog::default();
    let p = pipeline( &base, dir.path(), Setup { viirs_path: "/viirs_bad.csv", ..Setup::default() }, &log, CancellationToken::new());

    let capture = LogCapture::default();
    assert!( p.run().with_subscriber( capture.subscriber()).await.is_err());
    assert!( log.events().is_empty()); // never got to the radio

    let errors = capture.error_lines();
    assert_eq!( errors.len(), 1);
    assert!( errors[0].contains("fire data refresh failed"));
}

#[tokio::test]
async fn test_download_failure_is_logged() {
    let base = spawn_services().await;
    let dir = tempfile::tempdir().unwrap();
    let log = LinkLog::default();
    let p = pipeline( &base, dir.path(), Setup { viirs_path: "/does_not_exist.csv", ..Setup::default() }, &log, CancellationToken::new());

    let capture = LogCapture::default();
    assert!( p.run().with_subscriber( capture.subscriber()).await.is_err());
    assert!( log.events().is_empty());
    assert!( capture.error_lines().iter().any(|l| l.contains("fire data refresh failed")));
}

#[tokio::test]
async fn test_cancel_before_connect() {
    let base = spawn_services().await;
    let dir = tempfile::tempdir().unwrap();
    let log = LinkLog::default();
    let cancel = CancellationToken::new();
    let p = pipeline( &base, dir.path(), Setup { viirs_path: "/viirs_none.csv", ..Setup::default() }, &log, cancel.clone());

    cancel.cancel(); // shutdown requested while the dataset is being refreshed
    let summary = p.run().await.unwrap();
    assert!( summary.cancelled);
    assert!( !summary.no_activity);
    assert_eq!( summary.sent, 0);
    assert!( log.events().is_empty()); // no connect, no no-activity report
}

#[tokio::test]
async fn test_send_failure_continues() {
    let base = spawn_services().await;
    let dir = tempfile::tempdir().unwrap();
    let log = LinkLog::default();
    let p = pipeline( &base, dir.path(), Setup { enrich: false, fail_sends: vec![1], ..Setup::default() }, &log, CancellationToken::new());

    let summary = p.run().await.unwrap();
    assert_eq!( summary.sent, 3);
    assert_eq!( summary.failed, 1);

    // the failed send did not use up a suffix
    let suffixes: Vec<u32> = log.lines().iter().map(|l| suffix_of(l)).collect();
    assert_eq!( suffixes, vec![11,12,13]);
    assert!( log.lines()[1].contains("3330.00N")); // the one after the failed hotspot
    assert_eq!( log.events().last(), Some(&LinkEvent::Disconnect));
}

#[tokio::test]
async fn test_suffix_continues_across_runs() {
    let base = spawn_services().await;
    let dir = tempfile::tempdir().unwrap();
    let log = LinkLog::default();
    let p = pipeline( &base, dir.path(), Setup { enrich: false, send_delay: Duration::from_millis(1), ..Setup::default() }, &log, CancellationToken::new());

    p.run().await.unwrap();
    p.run().await.unwrap();

    let suffixes: Vec<u32> = log.lines().iter().map(|l| suffix_of(l)).collect();
    assert_eq!( suffixes, (11..19).collect::<Vec<u32>>());

    let n_connects = log.events().iter().filter(|e| **e == LinkEvent::Connect).count();
    let n_disconnects = log.events().iter().filter(|e| **e == LinkEvent::Disconnect).count();
    assert_eq!( (n_connects, n_disconnects), (2,2));
}

/// cancels the given token on its first call
struct CancellingLookup {
    cancel: CancellationToken,
    calls: AtomicUsize,
}

#[async_trait]
impl TemperatureLookup for CancellingLookup {
    async fn temperature_at (&self, _lat: f64, _lon: f64)->Option<String> {
        self.calls.fetch_add( 1, Ordering::SeqCst);
        self.cancel.cancel();
        Some("20".to_string())
    }
}

#[tokio::test]
async fn test_cancel_between_hotspots() {
    let base = spawn_services().await;
    let dir = tempfile::tempdir().unwrap();
    let log = LinkLog::default();
    let cancel = CancellationToken::new();

    let lookup = Arc::new( CancellingLookup { cancel: cancel.clone(), calls: AtomicUsize::new(0) });
    let dataset = DatasetFilter::new( viirs_config( &base, "/viirs.csv", dir.path())).unwrap();
    let station = StationInfo { callsign: "N0CALL".into(), comment: "".into(), symbol: "T".into(), send_delay: Duration::from_secs(30) };
    let link_log = log.clone();
    let p = FirePipeline::new(
        dataset, Some( lookup.clone() as Arc<dyn TemperatureLookup>), None, Box::new( move || RecordingLink::new( link_log.clone())),
        station, Arc::new( StationSuffix::default()), cancel
    );

    let t0 = Instant::now();
    let summary = p.run().await.unwrap();
    assert!( t0.elapsed() < Duration::from_secs(10)); // send delay was interrupted

    // the report that was already underway got sent, the rest was not processed
    assert!( summary.cancelled);
    assert_eq!( summary.sent, 1);
    assert_eq!( lookup.calls.load( Ordering::SeqCst), 1);
    assert_eq!( log.lines(), vec![ "N0CALL-11>APDR15,TCPIP*,qAC,T2STRAS:=3248.60N/03500.60E:AQI Temp: 20°C".to_string() ]);
    assert_eq!( log.events().last(), Some(&LinkEvent::Disconnect));
}
