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

use serde::Deserialize;
use serde_json::Value;
use reqwest::{Client, Url};
use async_trait::async_trait;
use tracing::{debug, info, warn};
use odin_common::net::from_json;

use crate::{AqiConfig, LocationResolver, pipeline::TemperatureLookup, errors::{Result, op_failed, parse_error}};

/// WAQI feed response. `data` is an object if `status` is "ok" and an error message otherwise
#[derive(Deserialize,Debug)]
struct FeedResponse {
    status: String,
    #[serde(default)]
    data: Value,
}

/// current conditions reported by the World Air Quality Index station for a city
#[derive(Debug,Clone,PartialEq)]
pub struct CityConditions {
    pub aqi: Option<String>,
    pub temperature: Option<String>,
}

fn value_string (v: &Value)->Option<String> {
    match v {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() && s != "-" => Some(s.trim().to_string()),
        _ => None
    }
}

/// World Air Quality Index (waqi.info) city feed client
pub struct AirQuality {
    client: Client,
    url: String,
    token: String,
}

impl AirQuality {
    pub fn new (client: Client, url: impl ToString, token: impl ToString)->Self {
        AirQuality { client, url: url.to_string(), token: token.to_string() }
    }

    /// `<url>/<city>/?token=<token>`
    fn feed_url (&self, city: &str)->Result<Url> {
        let mut url = Url::parse( &self.url).map_err(|e| op_failed!("invalid AQI url {}: {}", self.url, e))?;
        url.path_segments_mut()
            .map_err(|_| op_failed!("AQI url cannot be a base: {}", self.url))?
            .pop_if_empty()
            .push( city)
            .push("");
        url.query_pairs_mut().append_pair("token", &self.token);
        Ok(url)
    }

    pub async fn try_conditions_for (&self, city: &str)->Result<CityConditions> {
        let response = self.client.get( self.feed_url(city)?).send().await?.error_for_status()?;
        let feed: FeedResponse = from_json( response).await?;

        if feed.status != "ok" {
            return Err( parse_error!("AQI status '{}' for {}: {}", feed.status, city, feed.data))
        }

        Ok( CityConditions {
            aqi: feed.data.get("aqi").and_then( value_string),
            temperature: feed.data.pointer("/iaqi/t/v").and_then( value_string)
        })
    }

    /// the current temperature (°C) for `city`, `None` if the service failed or has no temperature
    pub async fn temperature_for (&self, city: &str)->Option<String> {
        match self.try_conditions_for( city).await {
            Ok(cond) => {
                if let Some(aqi) = &cond.aqi {
                    info!("AQI for {city}: {aqi}");
                }
                if cond.temperature.is_none() {
                    warn!("no temperature in AQI data for {city}");
                }
                cond.temperature
            }
            Err(e) => {
                warn!("AQI lookup for {city} failed: {e}");
                None
            }
        }
    }
}

/// position based temperature lookup: reverse geocode to a city and get its air quality data
pub struct AqiLookup {
    resolver: LocationResolver,
    air_quality: AirQuality,
}

impl AqiLookup {
    pub fn new (resolver: LocationResolver, air_quality: AirQuality)->Self {
        AqiLookup { resolver, air_quality }
    }

    /// both services share one client with the configured user agent and timeout
    pub fn from_config (config: &AqiConfig)->Result<Self> {
        let client = Client::builder()
            .user_agent( &config.user_agent)
            .timeout( config.timeout)
            .build()?;

        Ok( AqiLookup {
            resolver: LocationResolver::new( client.clone(), &config.geocoder_url),
            air_quality: AirQuality::new( client, &config.url, &config.authtoken)
        })
    }

    pub async fn temperature_at (&self, lat: f64, lon: f64)->Option<String> {
        let city = self.resolver.resolve( lat, lon).await?;
        let temp = self.air_quality.temperature_for( &city).await;
        debug!("temperature at {lat},{lon} ({city}): {temp:?}");
        temp
    }
}

#[async_trait]
impl TemperatureLookup for AqiLookup {
    async fn temperature_at (&self, lat: f64, lon: f64)->Option<String> {
        AqiLookup::temperature_at( self, lat, lon).await
    }
}
