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

//! filesystem helpers. Files we publish (downloads, snapshots) are written to a temp file in the same
//! directory and then renamed, so readers never see them in a partially written state

use std::fs::{self,File};
use std::io::{self,Read,Write};
use std::path::{Path,PathBuf};
use tempfile::NamedTempFile;

use crate::io_error;

type Result<T> = std::result::Result<T,std::io::Error>;

pub fn ensure_dir (path: impl AsRef<Path>)->io::Result<()> {
    let path = path.as_ref();
    if !path.is_dir() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// get the directory that contains `path`, creating it if it does not exist yet.
/// A bare filename resolves to the current working dir
pub fn ensure_parent_dir (path: impl AsRef<Path>)->io::Result<PathBuf> {
    let path = path.as_ref();
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            ensure_dir(dir)?;
            Ok(dir.to_path_buf())
        }
        _ => Ok(PathBuf::from("."))
    }
}

/// create a temp file next to `path`. Use [`persist_temp_file`] to make it visible under `path`
pub fn temp_file_for (path: impl AsRef<Path>)->Result<NamedTempFile> {
    let dir = ensure_parent_dir( path.as_ref())?;
    NamedTempFile::new_in( dir)
}

/// atomically replace whatever is at `path` with the contents of the temp file
pub fn persist_temp_file (temp: NamedTempFile, path: impl AsRef<Path>)->Result<()> {
    temp.persist( path.as_ref()).map_err( |e| e.error)?;
    Ok(())
}

/// atomically replace the contents of file `path`. Readers either see the old or the new contents, never a mix
pub fn replace_file_contents (path: impl AsRef<Path>, new_contents: &[u8])->Result<()> {
    let path = path.as_ref();
    let mut temp = temp_file_for( path)?;
    temp.write_all( new_contents)?;
    temp.flush()?;
    persist_temp_file( temp, path)
}

pub fn filepath_contents <P: AsRef<Path>> (path: &P) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    if len > 0 {
        let mut contents: Vec<u8> = Vec::with_capacity(len as usize);
        file.read_to_end(&mut contents)?;
        Ok(contents)

    } else { Err(io_error!(UnexpectedEof, "file empty: {:?}", path.as_ref())) }
}
