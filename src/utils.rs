/*
 * Copyright 2018 Alistair Francis <alistair@alistair23.me>
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *    http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use crate::guide::error::LocationError;
use crate::guide::position::Position;
use crate::guide::tracker::TrackerOptions;
use chrono::{DateTime, Utc};
use gpsd_proto::{get_data, GpsdError, Mode, ResponseData};
use std::io;
use std::time::Duration;

#[macro_export]
macro_rules! upgrade_weak {
    ($x:expr, $r:expr) => {{
        match $x.upgrade() {
            Some(o) => o,
            None => return $r,
        }
    }};
    ($x:expr) => {
        upgrade_weak!($x, ())
    };
}

/// Pull the next usable fix off the gpsd stream. `Ok(None)` means a
/// message arrived but the fix was filtered out by the subscription
/// options.
pub fn next_position(
    reader: &mut dyn io::BufRead,
    options: &TrackerOptions,
) -> Result<Option<Position>, LocationError> {
    let message = get_data(reader).map_err(classify_gpsd_error)?;

    match message {
        ResponseData::Tpv(tpv) => {
            if options.high_accuracy && !matches!(tpv.mode, Mode::Fix3d) {
                return Ok(None);
            }

            match (tpv.lat, tpv.lon) {
                (Some(lat), Some(lon)) => {
                    if fix_is_stale(tpv.time.as_deref(), options.max_cache_age) {
                        return Ok(None);
                    }
                    Ok(Some(Position::new(lat, lon)))
                }
                // Mode reports a fix but the coordinates are missing
                _ => Ok(None),
            }
        }
        _ => Ok(None),
    }
}

fn classify_gpsd_error(error: GpsdError) -> LocationError {
    match error {
        GpsdError::IoError(err)
            if err.kind() == io::ErrorKind::WouldBlock || err.kind() == io::ErrorKind::TimedOut =>
        {
            LocationError::Timeout
        }
        _ => LocationError::Unavailable,
    }
}

/// A fix older than `max_age` counts as cached and gets dropped. Zero max
/// age disables the check; a fix without a timestamp is taken as live.
fn fix_is_stale(time: Option<&str>, max_age: Duration) -> bool {
    if max_age == Duration::from_secs(0) {
        return false;
    }

    let stamp = match time.and_then(|t| DateTime::parse_from_rfc3339(t).ok()) {
        Some(stamp) => stamp,
        None => return false,
    };

    let age = Utc::now().signed_duration_since(stamp);
    match chrono::Duration::from_std(max_age) {
        Ok(max_age) => age > max_age,
        Err(_) => false,
    }
}
