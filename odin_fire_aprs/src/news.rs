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
use async_trait::async_trait;
use tracing::{error, info, warn};
use odin_common::net::get_text;

use crate::{NewsFeedConfig, pipeline::NewsLookup, errors::{Result, parse_error}};

pub const NO_LINK_FOUND: &str = "No link found";

#[derive(Debug,Clone,PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub link: Option<String>,
}

#[derive(Deserialize,Debug,Default)]
struct Text {
    #[serde(rename="$text", default)]
    value: String,
}

/* #region RSS 2.0 ***************************************************************************************/

#[derive(Deserialize,Debug)]
struct Rss {
    #[serde(default)]
    channel: Option<RssChannel>,
}

#[derive(Deserialize,Debug)]
struct RssChannel {
    #[serde(rename="item", default)]
    items: Vec<RssItem>,
}

#[derive(Deserialize,Debug)]
struct RssItem {
    #[serde(default)]
    title: Text,
    #[serde(default)]
    link: Option<Text>,
}

/* #endregion RSS 2.0 */

/* #region Atom ******************************************************************************************/

#[derive(Deserialize,Debug)]
struct AtomFeed {
    #[serde(rename="entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Deserialize,Debug)]
struct AtomEntry {
    #[serde(default)]
    title: Text,
    #[serde(rename="link", default)]
    links: Vec<AtomLink>,
}

#[derive(Deserialize,Debug)]
struct AtomLink {
    #[serde(rename="@href")]
    href: String,
    #[serde(rename="@rel", default)]
    rel: Option<String>,
}

impl AtomEntry {
    fn alternate_link (&self)->Option<String> {
        self.links.iter()
            .find( |l| l.rel.as_deref().map_or( true, |r| r == "alternate"))
            .or( self.links.first())
            .map( |l| l.href.trim().to_string())
    }
}

/* #endregion Atom */

/// parse RSS 2.0 or Atom feed entries in document order
pub fn parse_feed (xml: &str)->Result<Vec<FeedEntry>> {
    if let Ok(rss) = quick_xml::de::from_str::<Rss>(xml) {
        if let Some(channel) = rss.channel {
            return Ok( channel.items.into_iter().map( |item| FeedEntry {
                title: item.title.value.trim().to_string(),
                link: item.link.map( |l| l.value.trim().to_string()).filter( |l| !l.is_empty())
            }).collect())
        }
    }

    let atom = quick_xml::de::from_str::<AtomFeed>(xml).map_err(|e| parse_error!("invalid news feed: {}", e))?;
    Ok( atom.entries.iter().map( |e| FeedEntry {
        title: e.title.value.trim().to_string(),
        link: e.alternate_link()
    }).collect())
}

/// the link of the first entry whose title contains `keyword` (case insensitive)
pub fn find_matching_link (entries: &[FeedEntry], keyword: &str)->Option<String> {
    let keyword = keyword.to_lowercase();
    entries.iter()
        .find( |e| e.title.to_lowercase().contains( &keyword))
        .map( |e| e.link.clone().unwrap_or_else( || NO_LINK_FOUND.to_string()))
}

/// keyword search in a news feed
pub struct NewsMatcher {
    client: Client,
    url: String,
    keyword: String,
}

impl NewsMatcher {
    pub fn new (client: Client, url: impl ToString, keyword: impl ToString)->Self {
        NewsMatcher { client, url: url.to_string(), keyword: keyword.to_string() }
    }

    pub fn from_config (config: &NewsFeedConfig)->Result<Self> {
        let client = Client::builder().timeout( config.timeout).build()?;
        Ok( NewsMatcher::new( client, &config.link, &config.keyword) )
    }

    pub async fn try_find_link (&self)->Result<Option<String>> {
        let xml = get_text( &self.client, &self.url).await?;
        let entries = parse_feed( &xml)?;
        Ok( find_matching_link( &entries, &self.keyword) )
    }

    /// link of the first matching feed entry, or [`NO_LINK_FOUND`]
    pub async fn find_link (&self)->String {
        match self.try_find_link().await {
            Ok(Some(link)) => {
                info!("news for '{}': {}", self.keyword, link);
                link
            }
            Ok(None) => {
                warn!("keyword '{}' not found in news feed titles", self.keyword);
                NO_LINK_FOUND.to_string()
            }
            Err(e) => {
                error!("failed to get news feed {}: {}", self.url, e);
                NO_LINK_FOUND.to_string()
            }
        }
    }
}

#[async_trait]
impl NewsLookup for NewsMatcher {
    async fn find_link (&self)->String {
        NewsMatcher::find_link( self).await
    }
}
