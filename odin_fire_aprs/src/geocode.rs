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
use reqwest::Client;
use tracing::{error, warn, debug};
use odin_common::net::get_json;

use crate::errors::Result;

/// the parts of a Nominatim reverse geocoding (jsonv2) response we use
#[derive(Deserialize,Debug,Default)]
pub struct ReverseResponse {
    #[serde(default)]
    pub error: Option<String>,

    #[serde(default)]
    pub address: Option<Address>,
}

#[derive(Deserialize,Debug,Default)]
pub struct Address {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub hamlet: Option<String>,
}

impl Address {
    /// the most significant locality name, in order city, town, village, hamlet
    pub fn locality (&self)->Option<&str> {
        [&self.city, &self.town, &self.village, &self.hamlet].into_iter()
            .flatten()
            .map( |s| s.trim())
            .find( |s| !s.is_empty())
    }
}

/// reverse geocoder that maps positions to locality names
pub struct LocationResolver {
    client: Client,
    url: String,
}

impl LocationResolver {
    /// `client` is expected to have the configured user agent and timeout set
    pub fn new (client: Client, url: impl ToString)->Self {
        LocationResolver { client, url: url.to_string() }
    }

    /// query the geocoder. `Ok(None)` means the service did not know a locality for this position
    pub async fn try_resolve (&self, lat: f64, lon: f64)->Result<Option<String>> {
        let lat = lat.to_string();
        let lon = lon.to_string();
        let query = [("lat", lat.as_str()), ("lon", lon.as_str()), ("format", "jsonv2"), ("addressdetails", "1")];
        let response: ReverseResponse = get_json( &self.client, &self.url, &query).await?;

        if let Some(msg) = &response.error {
            debug!("geocoder has no result for {lat},{lon}: {msg}");
            return Ok(None)
        }
        Ok( response.address.as_ref().and_then( |a| a.locality()).map( |s| s.to_string()) )
    }

    /// the locality name for the given position, or `None` if there is none or the geocoder failed
    pub async fn resolve (&self, lat: f64, lon: f64)->Option<String> {
        match self.try_resolve( lat, lon).await {
            Ok(Some(city)) => {
                debug!("resolved {lat},{lon} to {city}");
                Some(city)
            }
            Ok(None) => {
                warn!("no locality found for {lat},{lon}");
                None
            }
            Err(e) => {
                error!("geocoder failed for {lat},{lon}: {e}");
                None
            }
        }
    }
}
