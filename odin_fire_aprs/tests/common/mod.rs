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

//! in-process stand-ins for the external services: FIRMS download, Nominatim, WAQI, news feeds
//! and the APRS-IS link

use std::{collections::HashMap, path::Path, sync::{Arc, Mutex}, time::{Duration, Instant}};
use async_trait::async_trait;
use axum::{Router, Json, routing::get, extract::{Path as UrlPath, Query}, http::StatusCode, response::{IntoResponse, Response}};
use serde_json::json;
use odin_aprs::{AprsLink, OdinAprsError};
use odin_fire_aprs::ViirsConfig;

pub const VIIRS_CSV: &str = include_str!("../data/viirs_sample.csv");
pub const VIIRS_MALFORMED_CSV: &str = include_str!("../data/viirs_malformed.csv");
pub const NEWS_RSS: &str = include_str!("../data/news_rss.xml");
pub const NEWS_ATOM: &str = include_str!("../data/news_atom.xml");
pub const VIIRS_HEADER_ONLY: &str = "latitude,longitude,bright_ti4,acq_date\n";

pub const TOKEN: &str = "secret";

async fn reverse (Query(q): Query<HashMap<String,String>>)->Response {
    if q.get("format").map(|s| s.as_str()) != Some("jsonv2") || q.get("addressdetails").map(|s| s.as_str()) != Some("1") {
        return (StatusCode::BAD_REQUEST, "unsupported query").into_response()
    }

    match q.get("lat").map(|s| s.as_str()).unwrap_or("") {
        "32.81" => Json( json!({ "place_id": 1, "address": { "city": "Haifa", "town": "Tirat Carmel", "country": "Israel" }})).into_response(),
        "31.25" => Json( json!({ "place_id": 2, "address": { "town": "Yavne", "village": "Kfar Aviv" }})).into_response(),
        "33.5"  => Json( json!({ "place_id": 3, "address": { "hamlet": "Dafna" }})).into_response(),
        "29"    => Json( json!({ "error": "Unable to geocode" })).into_response(),
        "30.5"  => (StatusCode::INTERNAL_SERVER_ERROR, "geocoder down").into_response(),
        _       => Json( json!({ "place_id": 4, "address": { "country": "Israel" }})).into_response(),
    }
}

async fn waqi_feed (UrlPath(city): UrlPath<String>, Query(q): Query<HashMap<String,String>>)->Response {
    if q.get("token").map(|s| s.as_str()) != Some(TOKEN) {
        return Json( json!({ "status": "error", "data": "Invalid key" })).into_response()
    }

    match city.as_str() {
        "Haifa" => Json( json!({ "status": "ok", "data": { "aqi": 42, "idx": 1, "iaqi": { "t": { "v": 21.5 }, "pm25": { "v": 42 } }}})).into_response(),
        "Yavne" => Json( json!({ "status": "ok", "data": { "aqi": 17, "iaqi": { "pm25": { "v": 17 } }}})).into_response(),
        "Dafna" => Json( json!({ "status": "error", "data": "Unknown station" })).into_response(),
        "Tel Aviv" => Json( json!({ "status": "ok", "data": { "aqi": "-", "iaqi": { "t": { "v": 27 } }}})).into_response(),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
    }
}

/// all mocked HTTP services on one ephemeral port. Returns the base URL
pub async fn spawn_services ()->String {
    let router = Router::new()
        .route("/viirs.csv", get(|| async { VIIRS_CSV }))
        .route("/viirs_none.csv", get(|| async { VIIRS_HEADER_ONLY }))
        .route("/viirs_bad.csv", get(|| async { VIIRS_MALFORMED_CSV }))
        .route("/reverse", get(reverse))
        .route("/feed/{city}/", get(waqi_feed))
        .route("/news.rss", get(|| async { NEWS_RSS }))
        .route("/news.atom", get(|| async { NEWS_ATOM }))
        .route("/garbage", get(|| async { "<html><body>this is not a feed" }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn( async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{addr}")
}

pub fn viirs_config (base: &str, path: &str, dir: &Path)->ViirsConfig {
    ViirsConfig {
        url: format!("{base}{path}"),
        filepath: dir.join("viirs.csv"),
        latitude1: 33.5,
        latitude2: 29.0,
        longitude1: 34.0,
        longitude2: 36.0,
        snapshot: dir.join("viirs.json"),
        timeout: Duration::from_secs(5),
    }
}

#[derive(Debug,Clone,PartialEq)]
pub enum LinkEvent {
    Connect,
    Line(String),
    Disconnect,
}

/// shared recording of everything that happened on all links created from it
#[derive(Debug,Clone,Default)]
pub struct LinkLog {
    pub events: Arc<Mutex<Vec<(LinkEvent,Instant)>>>,
}

impl LinkLog {
    pub fn events (&self)->Vec<LinkEvent> {
        self.events.lock().unwrap().iter().map(|(e,_)| e.clone()).collect()
    }

    pub fn lines (&self)->Vec<String> {
        self.events.lock().unwrap().iter().filter_map( |(e,_)| if let LinkEvent::Line(l) = e { Some(l.clone()) } else { None }).collect()
    }

    pub fn line_times (&self)->Vec<Instant> {
        self.events.lock().unwrap().iter().filter_map( |(e,t)| if let LinkEvent::Line(_) = e { Some(*t) } else { None }).collect()
    }

    fn push (&self, e: LinkEvent) {
        self.events.lock().unwrap().push( (e, Instant::now()));
    }
}

/// an [`AprsLink`] that records instead of sending
pub struct RecordingLink {
    pub log: LinkLog,
    pub fail_connect: bool,
    pub fail_sends: Vec<usize>, // indices (per link) of send_line calls that fail
    n_sends: usize,
    connected: bool,
}

impl RecordingLink {
    pub fn new (log: LinkLog)->Self {
        RecordingLink { log, fail_connect: false, fail_sends: Vec::new(), n_sends: 0, connected: false }
    }
}

#[async_trait]
impl AprsLink for RecordingLink {
    async fn connect (&mut self)->odin_aprs::Result<()> {
        if self.fail_connect {
            return Err( OdinAprsError::ConnectTimeout("test.gateway:14580".into()))
        }
        self.log.push( LinkEvent::Connect);
        self.connected = true;
        Ok(())
    }

    async fn send_line (&mut self, line: &str)->odin_aprs::Result<()> {
        if !self.connected {
            return Err( OdinAprsError::NotConnected)
        }
        let idx = self.n_sends;
        self.n_sends += 1;
        if self.fail_sends.contains(&idx) {
            return Err( OdinAprsError::IOError( std::io::Error::new( std::io::ErrorKind::BrokenPipe, "simulated")))
        }
        self.log.push( LinkEvent::Line(line.to_string()));
        Ok(())
    }

    async fn disconnect (&mut self) {
        self.connected = false;
        self.log.push( LinkEvent::Disconnect);
    }

    fn is_connected (&self)->bool { self.connected }
}
