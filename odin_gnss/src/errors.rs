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

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OdinGnssError>;

#[derive(Error,Debug)]
pub enum OdinGnssError {
    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("config error {0}")]
    ConfigError( #[from] odin_build::OdinBuildError),

    #[error("glob error {0}")]
    GlobError( #[from] globset::Error),

    #[error("archive {0} has no entry for {1}")]
    UnknownCategory(String,String),

    #[error("no filename template: {0}")]
    NoTemplate(String),

    #[error("site list error {0}")]
    SiteListError(String),

    #[error("invalid epoch {0}")]
    EpochError(String),

    #[error("failed to execute {0}")]
    ExecError(String),
}

pub fn no_template (msg: impl ToString)->OdinGnssError {
    OdinGnssError::NoTemplate(msg.to_string())
}
