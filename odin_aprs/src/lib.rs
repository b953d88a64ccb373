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

//! minimal APRS-IS client: position formatting, position report packets and a TCP connection to
//! the APRS-IS server network

use async_trait::async_trait;

pub mod errors;
pub mod position;
pub mod packet;
pub mod client;

pub use errors::{Result, OdinAprsError};
pub use position::{AprsPosition, format_latitude, format_longitude};
pub use packet::{PositionReport, MAX_LINE_LEN};
pub use client::{AprsIsClient, AprsIsConfig};

/// abstraction of a connection that can transmit APRS-IS packet lines. The trait allows users to
/// replace the network client, e.g. for testing
#[async_trait]
pub trait AprsLink: Send {
    async fn connect (&mut self)->Result<()>;

    /// send a single packet line. The line terminator is added by the link
    async fn send_line (&mut self, line: &str)->Result<()>;

    /// close the connection. Calling this on a closed link is not an error
    async fn disconnect (&mut self);

    fn is_connected (&self)->bool;
}
