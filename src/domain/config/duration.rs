// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use crate::shared::error::{DeployerError, Result};
use std::time::Duration;

/// Parse a human-friendly duration such as `30m`, `1h`, `90s` or `250ms`.
/// A bare number is taken as seconds.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    let invalid = || {
        DeployerError::config_error(format!(
            "invalid duration '{}', expected e.g. 1h, 30m, 90s, 500ms",
            s
        ))
    };
    let number = |digits: &str| digits.trim().parse::<u64>().map_err(|_| invalid());

    if let Some(millis) = s.strip_suffix("ms") {
        Ok(Duration::from_millis(number(millis)?))
    } else if let Some(hours) = s.strip_suffix('h') {
        let secs = number(hours)?.checked_mul(3600).ok_or_else(invalid)?;
        Ok(Duration::from_secs(secs))
    } else if let Some(minutes) = s.strip_suffix('m') {
        let secs = number(minutes)?.checked_mul(60).ok_or_else(invalid)?;
        Ok(Duration::from_secs(secs))
    } else if let Some(secs) = s.strip_suffix('s') {
        Ok(Duration::from_secs(number(secs)?))
    } else {
        Ok(Duration::from_secs(number(s)?))
    }
}
