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

use crate::guide::poi::MarkerIcon;
use crate::guide::position::Position;

/// Handle to a marker owned by the map surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerId(pub usize);

/// Handle to a route layer owned by the map surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerId(pub usize);

/// The rendering surface the guide draws on. Only the controller writes
/// through this; no other component touches map state.
pub trait MapSurface {
    fn add_marker(&mut self, position: Position, icon: MarkerIcon) -> MarkerId;
    fn set_marker_position(&mut self, marker: MarkerId, position: Position);
    /// Refit the viewport so every given position is on screen.
    fn fit_bounds(&mut self, positions: &[Position]);
    fn add_route_layer(&mut self) -> LayerId;
    fn set_layer_colour(&mut self, layer: LayerId, icon: MarkerIcon);
    fn append_route_node(&mut self, layer: LayerId, position: Position);
    fn remove_layer(&mut self, layer: LayerId);
}
