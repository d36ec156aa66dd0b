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

use crate::guide::error::GuideError;
use crate::guide::poi::MarkerIcon;
use crate::guide::position::Position;
use crate::guide::surface::{LayerId, MapSurface};

/// One streamed step of a route computation.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteEvent {
    Started,
    SegmentAppended(Position),
    Completed,
    Failed(String),
}

/// Issues route computations to the routing collaborator. Results stream
/// back through the shell as `RouteEvent`s. Disposing cancels whatever
/// computation is in flight.
pub trait RoutePlanner {
    fn compute(&mut self, from: Position, to: Position) -> Result<(), GuideError>;
    fn dispose(&mut self);
}

/// One active, renderable computed path between two positions. At most
/// one exists at a time; the controller tears the old one down before it
/// begins another.
pub struct RouteSession {
    layer: LayerId,
    waypoints: [Position; 2],
    active: bool,
}

impl RouteSession {
    /// Ask the planner for a path and allocate the layer it renders into.
    /// The waypoints may coincide; degenerate input is the planner's
    /// problem to refuse.
    pub fn begin(
        map: &mut dyn MapSurface,
        planner: &mut dyn RoutePlanner,
        from: Position,
        to: Position,
        destination_icon: MarkerIcon,
    ) -> Result<RouteSession, GuideError> {
        planner.compute(from, to)?;

        let layer = map.add_route_layer();
        map.set_layer_colour(layer, destination_icon);

        Ok(RouteSession {
            layer,
            waypoints: [from, to],
            active: true,
        })
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn waypoints(&self) -> [Position; 2] {
        self.waypoints
    }

    /// Apply one planner event to the rendered artifact. `Failed` clears
    /// whatever was drawn so far and deactivates the session.
    pub fn on_event(
        &mut self,
        map: &mut dyn MapSurface,
        event: RouteEvent,
    ) -> Result<(), GuideError> {
        match event {
            RouteEvent::Started => Ok(()),
            RouteEvent::SegmentAppended(position) => {
                map.append_route_node(self.layer, position);
                Ok(())
            }
            RouteEvent::Completed => Ok(()),
            RouteEvent::Failed(reason) => {
                map.remove_layer(self.layer);
                self.active = false;
                Err(GuideError::RouteComputationFailed(reason))
            }
        }
    }

    /// Release the rendered path and the planner subscription. Returns
    /// whether a session was actually active and removed.
    pub fn teardown(&mut self, map: &mut dyn MapSurface, planner: &mut dyn RoutePlanner) -> bool {
        if !self.active {
            return false;
        }
        planner.dispose();
        map.remove_layer(self.layer);
        self.active = false;
        true
    }
}
