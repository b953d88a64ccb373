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

use std::time::Duration;
use async_trait::async_trait;
use tokio::{net::TcpStream, io::{AsyncBufReadExt, AsyncWriteExt, BufReader}, time::timeout};
use tracing::{debug, info, warn};

use crate::{AprsLink, errors::{Result, OdinAprsError}};

#[derive(Debug,Clone)]
pub struct AprsIsConfig {
    pub host: String,
    pub port: u16,
    pub callsign: String,
    pub passcode: String,
    pub software: String,
    pub version: String,
    pub connect_timeout: Duration
}

impl AprsIsConfig {
    pub fn login_line (&self)->String {
        format!("user {} pass {} vers {} {}", self.callsign, self.passcode, self.software, self.version)
    }

    pub fn server_addr (&self)->String {
        format!("{}:{}", self.host, self.port)
    }
}

/// a client for the APRS-IS server network. The connection is a plain TCP line protocol: the server
/// sends a '#' banner, we send a login line and get a '# logresp ..' back, after which we can send
/// packet lines terminated by CRLF
pub struct AprsIsClient {
    config: AprsIsConfig,
    stream: Option<BufReader<TcpStream>>
}

impl AprsIsClient {
    pub fn new (config: AprsIsConfig)->Self {
        AprsIsClient { config, stream: None }
    }

    pub fn config (&self)->&AprsIsConfig { &self.config }

    async fn read_server_line (&self, reader: &mut BufReader<TcpStream>, what: &str)->Result<Option<String>> {
        let mut buf = String::new();
        match timeout( self.config.connect_timeout, reader.read_line(&mut buf)).await {
            Ok(Ok(0)) => Err( OdinAprsError::ConnectionClosed),
            Ok(Ok(_)) => Ok( Some( buf.trim_end().to_string()) ),
            Ok(Err(e)) => Err( e.into()),
            Err(_) => {
                warn!("no {} from APRS-IS server {} within {:?}", what, self.config.server_addr(), self.config.connect_timeout);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl AprsLink for AprsIsClient {
    async fn connect (&mut self)->Result<()> {
        if self.stream.is_some() {
            debug!("already connected to {}", self.config.server_addr());
            return Ok(())
        }

        let addr = self.config.server_addr();
        let stream = match timeout( self.config.connect_timeout, TcpStream::connect( addr.as_str())).await {
            Ok(res) => res?,
            Err(_) => return Err( OdinAprsError::ConnectTimeout(addr))
        };
        let mut reader = BufReader::new(stream);

        if let Some(banner) = self.read_server_line( &mut reader, "banner").await? {
            debug!("APRS-IS banner: {banner}");
        }

        let login = self.config.login_line();
        reader.get_mut().write_all( format!("{login}\r\n").as_bytes()).await?;
        reader.get_mut().flush().await?;

        if let Some(logresp) = self.read_server_line( &mut reader, "login response").await? {
            if logresp.contains("unverified") {
                warn!("APRS-IS login unverified: {logresp}");
            } else {
                info!("APRS-IS login response: {logresp}");
            }
        }

        info!("connected to APRS-IS server {addr} as {}", self.config.callsign);
        self.stream = Some(reader);
        Ok(())
    }

    async fn send_line (&mut self, line: &str)->Result<()> {
        let Some(reader) = self.stream.as_mut() else {
            return Err( OdinAprsError::NotConnected)
        };

        let res = async {
            let stream = reader.get_mut();
            stream.write_all( line.as_bytes()).await?;
            stream.write_all( b"\r\n").await?;
            stream.flush().await
        }.await;

        if let Err(e) = res {
            self.stream = None; // a broken connection is not reused
            return Err( e.into())
        }
        debug!("sent: {line}");
        Ok(())
    }

    async fn disconnect (&mut self) {
        if let Some(mut reader) = self.stream.take() {
            if let Err(e) = reader.get_mut().shutdown().await {
                warn!("error closing APRS-IS connection: {e}");
            }
            info!("disconnected from APRS-IS server {}", self.config.server_addr());
        } else {
            info!("APRS-IS connection already closed");
        }
    }

    fn is_connected (&self)->bool {
        self.stream.is_some()
    }
}
