/*
 * Copyright © 2024, United States Government, as represented by the Administrator of
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

///! common utility functions for network operations

use std::{io::Write, path::Path};
use reqwest::{header::HeaderMap, Client, StatusCode, Response};
use serde::de::DeserializeOwned;

use crate::{define_error, fs::{temp_file_for, persist_temp_file}};

define_error!{ pub OdinNetError =
    IOError(#[from] std::io::Error) : "IO error: {0}",
    NotFoundError(String) : "not found {0}",
    HttpError(#[from] reqwest::Error) : "http error: {0}",
    OpFailed(String) : "operation failed: {0}",
    ParseError(String) : "parse error: {0}",
}

pub type Result<T> = std::result::Result<T, OdinNetError>;

fn check_status (url: &str, status: StatusCode)->Result<()> {
    match status {
        StatusCode::OK => Ok(()),
        StatusCode::NOT_FOUND => Err( OdinNetError::NotFoundError(format!("{url}"))),
        other => Err( OdinNetError::OpFailed(format!("response status {other:?}")))
    }
}

/// fetch file from URL using HTTP GET method. Retrieve in chunks to support large files.
/// Data is streamed into a temp file next to `path` which is only renamed into `path` once the
/// download is complete, i.e. an existing file at `path` is not touched if the download fails
pub async fn download_url (client: &Client, url: &str, opt_headers: &Option<HeaderMap>, path: impl AsRef<Path>) -> Result<u64> {
    let path = path.as_ref();
    let mut req = client.get(url);
    if let Some(headermap) = &opt_headers {
        req = req.headers(headermap.clone())
    }

    let mut response = req.send().await?;
    check_status( url, response.status())?;

    let mut temp = temp_file_for( path)?;
    let mut len: u64 = 0;

    while let Some(chunk) = response.chunk().await? {
        len += chunk.len() as u64;
        temp.write_all(&chunk)?;
    }
    temp.flush()?;

    if len == 0 {
        return Err( OdinNetError::OpFailed(format!("empty response from {url}")))
    }

    persist_temp_file( temp, path)?;
    Ok(len)
}

/// GET `url` with the given query parameters and deserialize the JSON response body
pub async fn get_json<T> (client: &Client, url: &str, query: &[(&str,&str)]) -> Result<T> where T: DeserializeOwned {
    let response = client.get(url).query(query).send().await?;
    check_status( url, response.status())?;
    from_json( response).await
}

/// GET `url` and return the response body as text
pub async fn get_text (client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?;
    check_status( url, response.status())?;
    Ok( response.text().await? )
}

pub async fn from_json<T> (response: Response)->Result<T> where T: DeserializeOwned {
    let bytes = response.bytes().await?;
    serde_json::from_slice( &bytes).map_err(|e| OdinNetError::ParseError(e.to_string()))
}
