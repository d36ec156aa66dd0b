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

use thiserror::Error;

/// Classified failures from the position feed. All of them are transient;
/// the subscription keeps running after reporting one.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationError {
    #[error("position feed refused access")]
    PermissionDenied,
    #[error("position unavailable")]
    Unavailable,
    #[error("position request timed out")]
    Timeout,
}

/// Errors surfaced to the user. None of them take the map down; the
/// controller stays interactive after every one.
#[derive(Error, Debug)]
pub enum GuideError {
    #[error("location unavailable: {0}")]
    LocationUnavailable(#[from] LocationError),
    #[error("cannot start a route: {0}")]
    RoutePrecondition(&'static str),
    #[error("route computation failed: {0}")]
    RouteComputationFailed(String),
}
