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

use crate::guide::position::Position;
use serde::{Deserialize, Serialize};

/// Colour and size of a point marker. Image assets are the map widget's
/// concern; the registry only carries the descriptor.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct MarkerIcon {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
    pub size: f64,
}

/// Marker used for the user's own location.
pub const USER_ICON: MarkerIcon = MarkerIcon {
    red: 100,
    green: 200,
    blue: 255,
    alpha: 255,
    size: 12.0,
};

/// A fixed, named destination.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PointOfInterest {
    pub name: String,
    pub position: Position,
    pub icon: MarkerIcon,
}

/// The destination set. Fixed at startup, same ordered list on every call.
pub fn registry() -> Vec<PointOfInterest> {
    serde_json::from_str(include_str!("pois.json")).expect("pois.json is malformed")
}
