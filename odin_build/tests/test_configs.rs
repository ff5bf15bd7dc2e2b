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

use std::fs;
use serde::Deserialize;
use tempfile::tempdir;
use odin_build::{find_config_file,load_config_path,OdinBuildError};

#[derive(Deserialize,Debug,PartialEq)]
struct TestConfig {
    name: String,
    retries: u32,
    #[serde(default)]
    hours: Vec<u32>,
}

#[test]
fn test_load_config_path() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("test.ron");
    fs::write( &path, r#"
        // comments are allowed
        TestConfig( name: "cddis", retries: 2 )
    "#).unwrap();

    let conf: TestConfig = load_config_path( &path).unwrap();
    assert_eq!( conf, TestConfig { name: "cddis".to_string(), retries: 2, hours: vec![] });

    fs::write( &path, "TestConfig( name: 42 )").unwrap();
    let res: Result<TestConfig,OdinBuildError> = load_config_path( &path);
    assert!( matches!( res, Err(OdinBuildError::RonSerdeError(_))));

    let res: Result<TestConfig,OdinBuildError> = load_config_path( tmp.path().join("missing.ron"));
    assert!( matches!( res, Err(OdinBuildError::IOError(_))));
}

#[test]
fn test_explicit_config_path() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("explicit.ron");
    fs::write( &path, "TestConfig( name: \"x\", retries: 0 )").unwrap();

    let found = find_config_file( &None, "odin_build", path.to_str().unwrap());
    assert_eq!( found, Some(path));

    assert!( find_config_file( &None, "odin_build", "no_such_config_file.ron").is_none());
}
