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

pub mod dialog;

use crate::guide::poi::MarkerIcon;
use crate::guide::position::Position;
use crate::guide::surface::{LayerId, MapSurface, MarkerId};

/// Map surface drawn with libchamplain. Markers are coloured point
/// actors on a single marker layer; every route session gets its own
/// path layer.
pub struct ChamplainSurface {
    view: *mut champlain::view::ChamplainView,
    marker_layer: *mut champlain::marker_layer::ChamplainMarkerLayer,
    markers: Vec<*mut champlain::clutter::ClutterActor>,
    layers: Vec<Option<*mut champlain::path_layer::ChamplainPathLayer>>,
}

impl ChamplainSurface {
    pub fn new(view: *mut champlain::view::ChamplainView) -> ChamplainSurface {
        let marker_layer = champlain::marker_layer::new();
        champlain::clutter_actor::show(champlain::layer::to_clutter_actor(
            champlain::marker_layer::to_layer(marker_layer),
        ));
        champlain::view::add_layer(view, champlain::marker_layer::to_layer(marker_layer));

        ChamplainSurface {
            view,
            marker_layer,
            markers: Vec::new(),
            layers: Vec::new(),
        }
    }

    fn colour(icon: MarkerIcon) -> *mut champlain::clutter_colour::ClutterColor {
        champlain::clutter_colour::new(icon.red, icon.green, icon.blue, icon.alpha)
    }
}

impl MapSurface for ChamplainSurface {
    fn add_marker(&mut self, position: Position, icon: MarkerIcon) -> MarkerId {
        let point = champlain::point::new_full(icon.size, Self::colour(icon));
        champlain::marker_layer::add_marker(
            self.marker_layer,
            champlain::clutter_actor::to_champlain_marker(point),
        );
        champlain::location::set_location(
            champlain::clutter_actor::to_location(point),
            position.lat,
            position.lon,
        );
        champlain::marker_layer::show_all_markers(self.marker_layer);

        self.markers.push(point);
        MarkerId(self.markers.len() - 1)
    }

    fn set_marker_position(&mut self, marker: MarkerId, position: Position) {
        champlain::location::set_location(
            champlain::clutter_actor::to_location(self.markers[marker.0]),
            position.lat,
            position.lon,
        );
    }

    fn fit_bounds(&mut self, positions: &[Position]) {
        let centre = match bounds_centre(positions) {
            Some(centre) => centre,
            None => return,
        };
        champlain::view::center_on(self.view, centre.lat, centre.lon);
        champlain::view::set_zoom_level(self.view, zoom_for_span(bounds_span(positions)));
    }

    fn add_route_layer(&mut self) -> LayerId {
        let path_layer = champlain::path_layer::new();
        champlain::view::add_layer(self.view, champlain::path_layer::to_layer(path_layer));
        champlain::path_layer::set_visible(path_layer, true);

        self.layers.push(Some(path_layer));
        LayerId(self.layers.len() - 1)
    }

    fn set_layer_colour(&mut self, layer: LayerId, icon: MarkerIcon) {
        if let Some(Some(path_layer)) = self.layers.get(layer.0) {
            champlain::path_layer::set_stroke_colour(*path_layer, Self::colour(icon));
        }
    }

    fn append_route_node(&mut self, layer: LayerId, position: Position) {
        if let Some(Some(path_layer)) = self.layers.get(layer.0) {
            let coord = champlain::coordinate::new_full(position.lon, position.lat);
            champlain::path_layer::add_node(*path_layer, champlain::coordinate::to_location(coord));
        }
    }

    fn remove_layer(&mut self, layer: LayerId) {
        if let Some(slot) = self.layers.get_mut(layer.0) {
            if let Some(path_layer) = slot.take() {
                champlain::path_layer::remove_all(path_layer);
                champlain::path_layer::set_visible(path_layer, false);
            }
        }
    }
}

fn bounds_centre(positions: &[Position]) -> Option<Position> {
    let first = positions.first()?;
    let mut min = *first;
    let mut max = *first;

    for position in positions {
        min.lat = min.lat.min(position.lat);
        min.lon = min.lon.min(position.lon);
        max.lat = max.lat.max(position.lat);
        max.lon = max.lon.max(position.lon);
    }

    Some(Position::new(
        (min.lat + max.lat) / 2.0,
        (min.lon + max.lon) / 2.0,
    ))
}

fn bounds_span(positions: &[Position]) -> f64 {
    let mut span = 0.0f64;
    for a in positions {
        for b in positions {
            span = span.max((a.lat - b.lat).abs()).max((a.lon - b.lon).abs());
        }
    }
    span
}

/// Rough degrees-per-viewport ladder; the view clamps levels it cannot
/// reach.
fn zoom_for_span(span: f64) -> u32 {
    if span < 0.003 {
        17
    } else if span < 0.01 {
        15
    } else if span < 0.05 {
        13
    } else if span < 0.2 {
        11
    } else if span < 1.0 {
        9
    } else {
        5
    }
}
