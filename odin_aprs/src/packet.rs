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

use crate::{position::AprsPosition, errors::{Result, OdinAprsError}};

/// max length of an APRS-IS line, not counting the terminating CRLF
pub const MAX_LINE_LEN: usize = 510;

pub const DEFAULT_DESTINATION: &str = "APDR15";
pub const DEFAULT_VIA: &str = "T2STRAS";

/// an uncompressed position report without timestamp and with messaging capability ('=' data type).
/// On the wire this is
/// ```text
///   <callsign>-<ssid>><destination>,TCPIP*,qAC,<via>:=<lat>/<lon>:<freetext>
/// ```
/// The '/' and ':' around the position select the primary symbol table and its fire symbol
#[derive(Debug,Clone,PartialEq)]
pub struct PositionReport {
    pub callsign: String,
    pub ssid: u32,
    pub destination: String,
    pub via: String,
    pub position: AprsPosition,
    pub freetext: String
}

impl PositionReport {
    pub fn new (callsign: impl ToString, ssid: u32, position: AprsPosition, freetext: impl ToString)->Self {
        PositionReport {
            callsign: callsign.to_string(),
            ssid,
            destination: DEFAULT_DESTINATION.to_string(),
            via: DEFAULT_VIA.to_string(),
            position,
            freetext: freetext.to_string()
        }
    }

    pub fn station_id (&self)->String {
        format!("{}-{}", self.callsign, self.ssid)
    }

    fn header (&self)->String {
        format!("{}>{},TCPIP*,qAC,{}:={}/{}:", self.station_id(), self.destination, self.via, self.position.lat, self.position.lon)
    }

    /// the line to send (without CRLF). Line breaks in the freetext are replaced by blanks and the
    /// freetext is shortened if the line would exceed [`MAX_LINE_LEN`]
    pub fn to_line (&self)->Result<String> {
        let mut line = self.header();
        if line.len() > MAX_LINE_LEN || line.contains(['\r','\n']) {
            return Err( OdinAprsError::InvalidPacket( line))
        }

        let text = sanitize_freetext( &self.freetext);
        line.push_str( truncate_to_char_boundary( &text, MAX_LINE_LEN - line.len()));
        Ok(line)
    }
}

pub fn sanitize_freetext (text: &str)->String {
    text.replace( ['\r','\n'], " ")
}

pub fn truncate_to_char_boundary (s: &str, max_len: usize)->&str {
    if s.len() <= max_len {
        s
    } else {
        let mut i = max_len;
        while !s.is_char_boundary(i) { i -= 1; }
        &s[..i]
    }
}
