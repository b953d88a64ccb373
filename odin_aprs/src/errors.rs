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

use thiserror::Error;

pub type Result<T> = std::result::Result<T,OdinAprsError>;

#[derive(Error,Debug)]
pub enum OdinAprsError {
    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("connect to {0} timed out")]
    ConnectTimeout(String),

    #[error("not connected to APRS-IS server")]
    NotConnected,

    #[error("connection closed by server")]
    ConnectionClosed,

    #[error("invalid position {0}")]
    InvalidPosition(String),

    #[error("invalid packet {0}")]
    InvalidPacket(String),
}

macro_rules! invalid_position {
    ($fmt:literal $(, $arg:expr )* ) => {
        crate::errors::OdinAprsError::InvalidPosition( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use invalid_position;
