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

use std::{fmt, io::Read, path::Path};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use reqwest::Client;
use tracing::{debug, info};
use odin_common::{fs::{filepath_contents, replace_file_contents}, net::download_url};

use crate::{ViirsConfig, errors::{Result, parse_error}};

/// the rectangular region of interest. Bounds are inclusive
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct GeoWindow {
    pub lat_max: f64,
    pub lat_min: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl GeoWindow {
    pub fn contains (&self, lat: f64, lon: f64)->bool {
        self.lat_min <= lat && lat <= self.lat_max && self.lon_min <= lon && lon <= self.lon_max
    }
}

#[derive(Debug,Clone,Copy,PartialEq)]
pub struct HotspotRecord {
    pub latitude: f64,
    pub longitude: f64,
}

/// the columns we need from a VIIRS active fire CSV row. All others are ignored
#[derive(Deserialize,Debug)]
struct RawRow {
    latitude: f64,
    longitude: f64,
}

/// snapshot entry. Coordinates are stored as decimal strings, entries that are read back
/// might lack them
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct StoredHotspot {
    #[serde(default, serialize_with="serialize_opt_num_str", deserialize_with="deserialize_opt_num")]
    pub latitude: Option<f64>,

    #[serde(default, serialize_with="serialize_opt_num_str", deserialize_with="deserialize_opt_num")]
    pub longitude: Option<f64>,
}

impl StoredHotspot {
    pub fn hotspot (&self)->Option<HotspotRecord> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some( HotspotRecord{ latitude, longitude }),
            _ => None
        }
    }
}

impl From<&HotspotRecord> for StoredHotspot {
    fn from (r: &HotspotRecord)->Self {
        StoredHotspot { latitude: Some(r.latitude), longitude: Some(r.longitude) }
    }
}

fn serialize_opt_num_str<S: Serializer> (v: &Option<f64>, s: S)->std::result::Result<S::Ok,S::Error> {
    match v {
        Some(v) => s.serialize_str( &v.to_string()),
        None => s.serialize_none()
    }
}

// accepts "34.5", 34.5 or null
fn deserialize_opt_num<'a,D> (deserializer: D)->std::result::Result<Option<f64>,D::Error> where D: Deserializer<'a> {
    struct NumVisitor;

    impl<'de> de::Visitor<'de> for NumVisitor {
        type Value = Option<f64>;

        fn expecting (&self, f: &mut fmt::Formatter)->fmt::Result {
            f.write_str("a number or a numeric string")
        }

        fn visit_f64<E: de::Error> (self, v: f64)->std::result::Result<Self::Value,E> { Ok(Some(v)) }
        fn visit_i64<E: de::Error> (self, v: i64)->std::result::Result<Self::Value,E> { Ok(Some(v as f64)) }
        fn visit_u64<E: de::Error> (self, v: u64)->std::result::Result<Self::Value,E> { Ok(Some(v as f64)) }

        fn visit_str<E: de::Error> (self, v: &str)->std::result::Result<Self::Value,E> {
            v.trim().parse::<f64>().map(Some).map_err(|_| E::custom(format!("not a number: {v:?}")))
        }

        fn visit_unit<E: de::Error> (self)->std::result::Result<Self::Value,E> { Ok(None) }
        fn visit_none<E: de::Error> (self)->std::result::Result<Self::Value,E> { Ok(None) }

        fn visit_some<D: Deserializer<'de>> (self, d: D)->std::result::Result<Self::Value,D::Error> {
            d.deserialize_any(NumVisitor)
        }
    }

    deserializer.deserialize_any(NumVisitor)
}

/// parse the latitude/longitude columns of a CSV with header row. Any row with a missing or
/// non-numeric coordinate fails the whole parse
pub fn parse_rows<R: Read> (input: R)->Result<Vec<(f64,f64)>> {
    let mut rdr = csv::Reader::from_reader(input);
    let mut rows = Vec::new();
    for (i,result) in rdr.deserialize::<RawRow>().enumerate() {
        let row = result.map_err(|e| parse_error!("malformed VIIRS row {}: {}", i+1, e))?;
        rows.push( (row.latitude, row.longitude));
    }
    Ok(rows)
}

pub fn filter_rows (rows: &[(f64,f64)], window: &GeoWindow)->Vec<HotspotRecord> {
    rows.iter()
        .filter( |(lat,lon)| window.contains( *lat, *lon))
        .map( |(latitude,longitude)| HotspotRecord{ latitude: *latitude, longitude: *longitude })
        .collect()
}

/// atomically replace the snapshot file with the given records
pub fn persist_snapshot (path: impl AsRef<Path>, records: &[HotspotRecord])->Result<()> {
    let entries: Vec<StoredHotspot> = records.iter().map( StoredHotspot::from).collect();
    let json = serde_json::to_vec_pretty( &entries)?;
    replace_file_contents( path, &json)?;
    Ok(())
}

pub fn load_snapshot (path: impl AsRef<Path>)->Result<Vec<StoredHotspot>> {
    let path = path.as_ref();
    let data = filepath_contents( &path)?;
    Ok( serde_json::from_slice( &data)? )
}

/// downloads the VIIRS CSV, filters it to the configured window and keeps the result as the
/// current snapshot
pub struct DatasetFilter {
    config: ViirsConfig,
    window: GeoWindow,
    client: Client,
}

impl DatasetFilter {
    pub fn new (config: ViirsConfig)->Result<Self> {
        let client = Client::builder().timeout( config.timeout).build()?;
        let window = config.window();
        Ok( DatasetFilter { config, window, client } )
    }

    pub fn window (&self)->&GeoWindow { &self.window }

    pub fn snapshot_path (&self)->&Path { &self.config.snapshot }

    pub async fn fetch (&self)->Result<u64> {
        let len = download_url( &self.client, &self.config.url, &None, &self.config.filepath).await?;
        info!("downloaded {} bytes of VIIRS data to {:?}", len, self.config.filepath);
        Ok(len)
    }

    pub fn parse (&self)->Result<Vec<(f64,f64)>> {
        let file = std::fs::File::open( &self.config.filepath)?;
        parse_rows( file)
    }

    /// fetch, parse, filter and persist. Errors abort the cycle. The previous snapshot is only replaced
    /// once we have a complete new record set
    pub async fn refresh (&self)->Result<Vec<HotspotRecord>> {
        self.fetch().await?;
        let rows = self.parse()?;
        let records = filter_rows( &rows, &self.window);
        debug!("{} of {} VIIRS rows within {:?}", records.len(), rows.len(), self.window);

        persist_snapshot( &self.config.snapshot, &records)?;
        info!("stored {} hotspots in {:?}", records.len(), self.config.snapshot);
        Ok(records)
    }

    pub fn load_snapshot (&self)->Result<Vec<StoredHotspot>> {
        load_snapshot( &self.config.snapshot)
    }
}
