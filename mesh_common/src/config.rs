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

//! RON based config file lookup and loading

use std::{env, fs, path::{Path,PathBuf}};
use serde::de::DeserializeOwned;
use crate::errors::{MeshCommonError,Result};

/// env var that can point to a directory with config files
pub const CONFIG_DIR_ENV: &'static str = "MESH_CONFIGS";

/// default config directory (relative to the current working dir)
pub const CONFIGS: &'static str = "configs";

/// look up a config file. The lookup order is
///   1. `filename` as given (absolute or relative to the working dir)
///   2. `$MESH_CONFIGS/❬filename❭`
///   3. `./configs/❬filename❭`
pub fn find_config_file (filename: &str)->Option<PathBuf> {
    let path = Path::new(filename);
    if path.is_file() {
        return Some( path.to_path_buf())
    }

    if let Ok(dir) = env::var( CONFIG_DIR_ENV) {
        let path = Path::new( &dir).join( filename);
        if path.is_file() { return Some(path) }
    }

    let path = Path::new( CONFIGS).join( filename);
    if path.is_file() { Some(path) } else { None }
}

/// load and deserialize a RON config, failing if it cannot be found
pub fn load_config<C> (filename: &str)->Result<C> where C: DeserializeOwned {
    match find_config_file( filename) {
        Some(path) => load_config_from_path( &path),
        None => Err( MeshCommonError::ConfigNotFound( filename.to_string()))
    }
}

/// load and deserialize a RON config if it exists. Note that a config that does exist but
/// cannot be parsed is still an error
pub fn load_optional_config<C> (filename: &str)->Result<Option<C>> where C: DeserializeOwned {
    match find_config_file( filename) {
        Some(path) => Ok( Some( load_config_from_path( &path)?)),
        None => Ok(None)
    }
}

pub fn load_config_from_path<C> (path: &Path)->Result<C> where C: DeserializeOwned {
    let data = fs::read_to_string( path)?;
    config_from_ron_str( &data)
}

pub fn config_from_ron_str<C> (s: &str)->Result<C> where C: DeserializeOwned {
    Ok( ron::from_str( s)? )
}
