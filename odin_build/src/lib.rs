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

//! runtime support for ODIN binaries: the bin context and config file lookup

use std::{path::Path, sync::OnceLock};

mod utils;
pub use utils::*;

mod configs;
pub use configs::*;

mod errors;
pub use errors::*;

pub type OdinBuildResult<T> = errors::Result<T>;

/* #region bin globals *******************************************************************/

#[derive(Debug)]
pub struct BinContext {
    pub bin_name: String,
    pub bin_crate: String,
    pub bin_suffix: Option<String>, // optionally set via ODIN_BIN_SUFFIX at runtime (useful if we run simultaneous instances of this bin)
    pub proc_id: Option<u32>,
}

impl BinContext {
    /// set the global context. Returns false if it was already set
    pub fn set (bin_name: &str, bin_crate: &str, bin_suffix: Option<String>, proc_id: Option<u32>)->bool {
        BIN_CONTEXT.set( Self{
            bin_name: bin_name.to_string(),
            bin_crate: bin_crate.to_string(),
            bin_suffix,
            proc_id
        }).is_ok()
    }
}

pub static BIN_CONTEXT: OnceLock<BinContext> = OnceLock::new();

/// this has to be called (once) from the bin source
#[macro_export]
macro_rules! set_bin_context {
    () => {
        {
            // Note that env! looks up the value at compile time, while env::var
            // looks it up at runtime.
            odin_build::BinContext::set(env!("CARGO_BIN_NAME"),
                 env!("CARGO_PKG_NAME"),
                 std::env::var("ODIN_BIN_SUFFIX").ok(),
                 Some(std::process::id()));
        }
    }
}

pub fn get_bin_context()->Option<&'static BinContext> {
    BIN_CONTEXT.get()
}

/// this is mostly for tests and tools that read configs from explicit paths
pub fn load_config_path<C,P> (path: P) -> Result<C> where C: for <'a> serde::Deserialize<'a>, P: AsRef<Path> {
    let data = file_contents_as_bytes(path.as_ref())?;
    Ok( ron::de::from_bytes( data.as_slice())? )
}

/* #endregion bin globals */
