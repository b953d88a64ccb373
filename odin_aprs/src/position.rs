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

//! conversion of decimal degrees into the uncompressed APRS position format, which uses degrees and
//! decimal minutes with exactly two fractional digits:
//! ```text
//!   latitude:  DDMM.mmH   (H = N|S)
//!   longitude: DDDMM.mmH  (H = E|W)
//! ```

use std::fmt;
use crate::errors::{Result, invalid_position};

/// a formatted APRS position. `lat` is always 8 and `lon` always 9 characters long
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct AprsPosition {
    pub lat: String,
    pub lon: String
}

impl AprsPosition {
    pub fn from_degrees (lat_deg: f64, lon_deg: f64)->Result<Self> {
        Ok( AprsPosition { lat: format_latitude(lat_deg)?, lon: format_longitude(lon_deg)? } )
    }
}

impl fmt::Display for AprsPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "{}/{}", self.lat, self.lon)
    }
}

pub fn format_latitude (deg: f64)->Result<String> {
    if !deg.is_finite() || deg.abs() > 90.0 {
        return Err( invalid_position!("latitude {deg}"))
    }
    let hemi = if deg >= 0.0 { 'N' } else { 'S' };
    let (d,m,h) = split_degrees(deg);
    Ok( format!("{d:02}{m:02}.{h:02}{hemi}") )
}

pub fn format_longitude (deg: f64)->Result<String> {
    if !deg.is_finite() || deg.abs() > 180.0 {
        return Err( invalid_position!("longitude {deg}"))
    }
    let hemi = if deg >= 0.0 { 'E' } else { 'W' };
    let (d,m,h) = split_degrees(deg);
    Ok( format!("{d:03}{m:02}.{h:02}{hemi}") )
}

// round once to hundredths of minutes so that we never produce "60.00" minutes
fn split_degrees (deg: f64)->(u64,u64,u64) {
    let hundredths = (deg.abs() * 6000.0).round() as u64;
    let d = hundredths / 6000;
    let rem = hundredths % 6000;
    (d, rem / 100, rem % 100)
}
