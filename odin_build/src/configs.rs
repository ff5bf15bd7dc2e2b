/*
 * Copyright (c) 2024, United States Government, as represented by the
 * Administrator of the National Aeronautics and Space Administration.
 * All rights reserved.
 *
 * The ODIN - Open Data Integration Framework is licensed under the
 * Apache License, Version 2.0 (the "License"); you may not use this file
 * except in compliance with the License. You may obtain a copy of the
 * License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use std::{env,path::{Path,PathBuf}};
use crate::*;
use crate::errors::*;

pub const CONFIGS: &'static str = "configs";

/// locate a config file for the given crate and return its PathBuf.
///
/// If `filename` is itself a path to an existing file (e.g. from a command line argument) it is used as is.
/// Otherwise lookup is in the following order:
///
/// 1. `$ODIN_HOME/configs/[<bin-crate>/<bin-name>/]<resource-crate>/<filename>`
/// 2. `<workspace-parent>/configs/...` (the first dir outside the source repo)
/// 3. `~/.odin/configs/...`
/// 4. `<workspace>/<resource-crate>/configs/<filename>` (the defaults that come with the repo)
pub fn find_config_file (ctx: &Option<&BinContext>, resource_crate: &str, filename: &str) -> Option<PathBuf> {
    let explicit = Path::new(filename);
    if explicit.components().count() > 1 && explicit.is_file() {
        return Some(explicit.to_path_buf())
    }

    if let Ok(odin_home) = env::var("ODIN_HOME") {
        let mut path = PathBuf::from(odin_home);
        if find_external_config( &mut path, ctx, resource_crate, filename) { return Some(path) }
    }

    if let Some(mut path) = get_workspace_parent() {
        if find_external_config( &mut path, ctx, resource_crate, filename) { return Some(path) }
    }

    if let Ok(mut path) = default_odin_root() {
        if find_external_config( &mut path, ctx, resource_crate, filename) { return Some(path) }
    }

    if let Some(mut path) = get_workspace_dir() {
        if path_cond!( is_file, &mut path, resource_crate, CONFIGS, filename) { return Some(path) }
    }

    None
}

fn find_external_config (path: &mut PathBuf, bin_ctx: &Option<&BinContext>, resource_crate: &str, filename: &str)->bool {
    // bin specific override first
    if let Some(ctx) = bin_ctx {
        let bin_crate = ctx.bin_crate.as_str();
        let bin_name = ctx.bin_name.as_str();
        if path_cond!( is_file, path, CONFIGS, bin_crate, bin_name, resource_crate, filename) { return true }
    }

    path_cond!( is_file, path, CONFIGS, resource_crate, filename)
}

/// runtime part of config management.
/// This macro needs to be expanded at the top of crates (lib.rs) that define configs. Config users
/// call the generated `load_config(..)` function to instantiate config structs
#[macro_export]
macro_rules! define_load_config {
    () => {
        mod configs {
            /// load config using the odin_build lookup mechanism
            pub fn load_config<C> (filename: &str) -> odin_build::Result<C> where C: for <'a> serde::Deserialize<'a> {
                let bin_ctx = odin_build::BIN_CONTEXT.get();
                let resource_crate = env!("CARGO_PKG_NAME");

                match odin_build::find_config_file( &bin_ctx, resource_crate, filename) {
                    Some(path) => odin_build::load_config_path( &path),
                    None => Err( odin_build::OdinBuildError::ConfigNotFoundError(filename.to_string()) )
                }
            }
        }
        pub use configs::*; // make load_config() visible at the crate level
    }
}
