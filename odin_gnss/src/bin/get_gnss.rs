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

use anyhow::{anyhow,Result};
use chrono::NaiveDate;
use tracing::{info,warn};
use tracing_subscriber::EnvFilter;

use odin_build;
use odin_common::define_cli;
use odin_gnss::{
    load_config, GnssConfig,
    archive::Archive,
    batch::{plan_batch,run_batch},
    retrieve::Retriever,
};

define_cli! { ARGS [version, about="GNSS product download tool"] =
    config: String [help="filename of config file", short, long, default_value="gnss.ron"],
    date: Option<NaiveDate> [help="first day to retrieve (YYYY-MM-DD)", short, long],
    days: Option<u32> [help="number of consecutive days to retrieve", short='n', long],
    archive: Option<Archive> [help="archive to retrieve from (cddis, ign, whu)", short, long],
    max_concurrent: Option<usize> [help="max number of concurrent retrievals", short='j', long],
    day_window: bool [help="also retrieve orbit/clock products of the previous and next day", short='w', long],
    strict: bool [help="exit with an error if any file could not be retrieved", long]
}

#[tokio::main]
async fn main ()->Result<()> {
    odin_build::set_bin_context!();

    tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::try_from_default_env().unwrap_or_else( |_| EnvFilter::new("info")))
        .init();

    let mut config: GnssConfig = load_config( &ARGS.config)?;
    if let Some(date) = ARGS.date { config.start_date = date }
    if let Some(days) = ARGS.days { config.days = days }
    if let Some(archive) = ARGS.archive { config.archive = archive }
    if let Some(n) = ARGS.max_concurrent { config.max_concurrent = n }
    if ARGS.day_window { config.day_window = true }

    let bin_name = odin_build::get_bin_context().map( |ctx| ctx.bin_name.as_str()).unwrap_or("get_gnss");
    info!("{bin_name} retrieving {} day(s) starting {} from {}", config.days, config.start_date, config.archive);

    let plan = plan_batch( &config);
    for issue in &plan.issues { warn!("{issue}") }

    let retriever = Retriever::from_config( &config);
    let summary = run_batch( &retriever, &plan.units, config.max_concurrent).await;
    summary.log_summary();

    if ARGS.strict && (summary.has_failures() || !plan.issues.is_empty()) {
        Err( anyhow!("{} failed retrievals, {} configuration issues", summary.failed, plan.issues.len()))
    } else {
        Ok(())
    }
}
