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

use crate::guide::error::{GuideError, LocationError};
use crate::guide::gate::{ConfirmPrompt, ConfirmationGate, PromptOutcome, PromptRequest, SelectionContext};
use crate::guide::poi::{PointOfInterest, USER_ICON};
use crate::guide::position::{Position, UNKNOWN_POSITION};
use crate::guide::route::{RouteEvent, RoutePlanner, RouteSession};
use crate::guide::surface::{MapSurface, MarkerId};
use crate::guide::tracker::TrackerHandle;
use tracing::{debug, info, warn};

/// Wires the position feed, the destination markers, the confirmation
/// gate and the route session together. All map state is mutated here and
/// nowhere else, one event at a time, in arrival order.
pub struct MapController {
    map: Box<dyn MapSurface>,
    planner: Box<dyn RoutePlanner>,
    gate: ConfirmationGate,
    tracker: TrackerHandle,
    pois: Vec<PointOfInterest>,
    user_marker: MarkerId,
    user_position: Option<Position>,
    session: Option<RouteSession>,
}

impl MapController {
    /// Render every destination marker plus the user placeholder and fit
    /// the viewport around the destinations.
    pub fn new(
        mut map: Box<dyn MapSurface>,
        planner: Box<dyn RoutePlanner>,
        prompt: Box<dyn ConfirmPrompt>,
        pois: Vec<PointOfInterest>,
        tracker: TrackerHandle,
    ) -> MapController {
        for poi in &pois {
            map.add_marker(poi.position, poi.icon);
        }
        let user_marker = map.add_marker(UNKNOWN_POSITION, USER_ICON);

        let bounds: Vec<Position> = pois.iter().map(|poi| poi.position).collect();
        map.fit_bounds(&bounds);

        MapController {
            map,
            planner,
            gate: ConfirmationGate::new(prompt),
            tracker,
            pois,
            user_marker,
            user_position: None,
            session: None,
        }
    }

    /// A fresh sample from the feed. Latest sample wins; the refit covers
    /// every destination plus the user now that the user is known.
    pub fn on_position(&mut self, position: Position) {
        self.user_position = Some(position);
        self.map.set_marker_position(self.user_marker, position);

        let mut bounds: Vec<Position> = self.pois.iter().map(|poi| poi.position).collect();
        bounds.push(position);
        self.map.fit_bounds(&bounds);
    }

    /// Feed errors are transient; report and keep going.
    pub fn on_position_error(&mut self, error: LocationError) {
        warn!("position feed: {}", error);
    }

    /// A destination marker was clicked. The click is ignored while a
    /// confirmation is already on screen; the selection snapshot is frozen
    /// here, before the user answers.
    pub fn on_poi_selected(&mut self, index: usize) -> Result<(), GuideError> {
        if self.gate.is_open() {
            debug!("destination click ignored, confirmation already open");
            return Ok(());
        }

        let destination = match self.pois.get(index) {
            Some(poi) => poi.clone(),
            None => return Err(GuideError::RoutePrecondition("unknown destination")),
        };
        let user_position = match self.user_position {
            Some(position) => position,
            None => return Err(GuideError::RoutePrecondition("your location is not known yet")),
        };

        self.gate.open(PromptRequest::StartRoute(SelectionContext {
            destination,
            user_position,
        }));
        Ok(())
    }

    /// The prompt was answered. An accepted route start tears down the
    /// prior session, if any, before the new one begins.
    pub fn on_gate_resolved(&mut self, outcome: PromptOutcome) -> Result<(), GuideError> {
        match self.gate.resolve(outcome) {
            None => Ok(()),
            Some(PromptRequest::StartRoute(context)) => {
                self.remove_route();

                let session = RouteSession::begin(
                    self.map.as_mut(),
                    self.planner.as_mut(),
                    context.user_position,
                    context.destination.position,
                    context.destination.icon,
                )?;
                info!("route started to {}", context.destination.name);
                self.session = Some(session);
                Ok(())
            }
            Some(PromptRequest::CancelRoute) => {
                if self.remove_route() {
                    info!("route cancelled");
                }
                Ok(())
            }
        }
    }

    /// One streamed step from the planner. Events for a session that is
    /// already gone are stale and dropped.
    pub fn on_route_event(&mut self, event: RouteEvent) -> Result<(), GuideError> {
        let session = match self.session.as_mut() {
            Some(session) => session,
            None => return Ok(()),
        };

        let result = session.on_event(self.map.as_mut(), event);
        if !session.is_active() {
            self.session = None;
        }
        result
    }

    /// Ask the user to confirm cancellation. Returns `false` without
    /// prompting when there is no active route; the route itself only goes
    /// away once the user says yes.
    pub fn request_cancel(&mut self) -> bool {
        if self.session.is_none() {
            return false;
        }
        self.gate.open(PromptRequest::CancelRoute)
    }

    /// Whether the cancel affordance belongs on screen.
    pub fn cancel_visible(&self) -> bool {
        self.session.is_some()
    }

    /// Unconditional cleanup: stop the feed and drop any active route
    /// without asking.
    pub fn shutdown(&mut self) {
        self.tracker.stop();
        self.remove_route();
    }

    fn remove_route(&mut self) -> bool {
        match self.session.take() {
            Some(mut session) => session.teardown(self.map.as_mut(), self.planner.as_mut()),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guide::poi::MarkerIcon;
    use crate::guide::surface::LayerId;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum MapOp {
        AddMarker(Position),
        MoveMarker(MarkerId, Position),
        FitBounds(Vec<Position>),
        AddLayer(LayerId),
        Colour(LayerId),
        Node(LayerId, Position),
        RemoveLayer(LayerId),
    }

    #[derive(Default)]
    struct MockMap {
        ops: Rc<RefCell<Vec<MapOp>>>,
        markers: usize,
        layers: usize,
    }

    impl MapSurface for MockMap {
        fn add_marker(&mut self, position: Position, _icon: MarkerIcon) -> MarkerId {
            let marker = MarkerId(self.markers);
            self.markers += 1;
            self.ops.borrow_mut().push(MapOp::AddMarker(position));
            marker
        }

        fn set_marker_position(&mut self, marker: MarkerId, position: Position) {
            self.ops.borrow_mut().push(MapOp::MoveMarker(marker, position));
        }

        fn fit_bounds(&mut self, positions: &[Position]) {
            self.ops.borrow_mut().push(MapOp::FitBounds(positions.to_vec()));
        }

        fn add_route_layer(&mut self) -> LayerId {
            let layer = LayerId(self.layers);
            self.layers += 1;
            self.ops.borrow_mut().push(MapOp::AddLayer(layer));
            layer
        }

        fn set_layer_colour(&mut self, layer: LayerId, _icon: MarkerIcon) {
            self.ops.borrow_mut().push(MapOp::Colour(layer));
        }

        fn append_route_node(&mut self, layer: LayerId, position: Position) {
            self.ops.borrow_mut().push(MapOp::Node(layer, position));
        }

        fn remove_layer(&mut self, layer: LayerId) {
            self.ops.borrow_mut().push(MapOp::RemoveLayer(layer));
        }
    }

    #[derive(Default)]
    struct MockPlanner {
        computed: Rc<RefCell<Vec<(Position, Position)>>>,
        disposed: Rc<RefCell<usize>>,
    }

    impl RoutePlanner for MockPlanner {
        fn compute(&mut self, from: Position, to: Position) -> Result<(), GuideError> {
            self.computed.borrow_mut().push((from, to));
            Ok(())
        }

        fn dispose(&mut self) {
            *self.disposed.borrow_mut() += 1;
        }
    }

    struct MockPrompt {
        presented: Rc<RefCell<Vec<PromptRequest>>>,
    }

    impl ConfirmPrompt for MockPrompt {
        fn present(&mut self, request: &PromptRequest) {
            self.presented.borrow_mut().push(request.clone());
        }
    }

    struct Harness {
        controller: MapController,
        ops: Rc<RefCell<Vec<MapOp>>>,
        computed: Rc<RefCell<Vec<(Position, Position)>>>,
        disposed: Rc<RefCell<usize>>,
        presented: Rc<RefCell<Vec<PromptRequest>>>,
    }

    fn poi(name: &str, lat: f64, lon: f64) -> PointOfInterest {
        PointOfInterest {
            name: name.to_string(),
            position: Position::new(lat, lon),
            icon: MarkerIcon {
                red: 193,
                green: 125,
                blue: 17,
                alpha: 255,
                size: 12.0,
            },
        }
    }

    fn pois() -> Vec<PointOfInterest> {
        vec![
            poi("Aroma Café Sabaneta", 6.15150999618405, -75.61369180892304),
            poi("Viejo Baul", 6.149950147326389, -75.61758096298057),
            poi("Leal Coffee", 6.150555615946403, -75.61797956390538),
        ]
    }

    fn harness() -> Harness {
        let map = MockMap::default();
        let planner = MockPlanner::default();
        let ops = map.ops.clone();
        let computed = planner.computed.clone();
        let disposed = planner.disposed.clone();
        let presented = Rc::new(RefCell::new(Vec::new()));
        let prompt = MockPrompt {
            presented: presented.clone(),
        };

        let controller = MapController::new(
            Box::new(map),
            Box::new(planner),
            Box::new(prompt),
            pois(),
            TrackerHandle::unstarted(),
        );

        Harness {
            controller,
            ops,
            computed,
            disposed,
            presented,
        }
    }

    fn user() -> Position {
        Position::new(6.1502, -75.6191)
    }

    /// Drive a route to the first destination all the way to active.
    fn start_route(h: &mut Harness) {
        h.controller.on_position(user());
        h.controller.on_poi_selected(0).unwrap();
        h.controller.on_gate_resolved(PromptOutcome::Accepted).unwrap();
    }

    #[test]
    fn test_init_renders_all_markers_and_fits() {
        let h = harness();
        let ops = h.ops.borrow();

        let markers: Vec<&MapOp> = ops
            .iter()
            .filter(|op| matches!(op, MapOp::AddMarker(_)))
            .collect();
        // Three destinations plus the user placeholder
        assert_eq!(markers.len(), 4);
        assert_eq!(markers[3], &MapOp::AddMarker(UNKNOWN_POSITION));

        match ops.last().unwrap() {
            MapOp::FitBounds(bounds) => assert_eq!(bounds.len(), 3),
            op => panic!("expected a viewport fit, got {:?}", op),
        }
        assert!(!h.controller.cancel_visible());
    }

    #[test]
    fn test_latest_position_wins() {
        let mut h = harness();
        let first = Position::new(6.0, -75.0);
        let second = user();

        h.controller.on_position(first);
        h.controller.on_position(second);

        let ops = h.ops.borrow();
        let moves: Vec<&MapOp> = ops
            .iter()
            .filter(|op| matches!(op, MapOp::MoveMarker(_, _)))
            .collect();
        assert_eq!(moves.last().unwrap(), &&MapOp::MoveMarker(MarkerId(3), second));

        // The refit covers the three destinations plus the user marker
        match ops.last().unwrap() {
            MapOp::FitBounds(bounds) => {
                assert_eq!(bounds.len(), 4);
                assert_eq!(bounds[3], second);
            }
            op => panic!("expected a viewport fit, got {:?}", op),
        }
    }

    #[test]
    fn test_selection_before_first_fix_is_refused() {
        let mut h = harness();

        let err = h.controller.on_poi_selected(0).unwrap_err();

        assert!(matches!(err, GuideError::RoutePrecondition(_)));
        assert!(h.presented.borrow().is_empty());
        assert!(h.computed.borrow().is_empty());
    }

    #[test]
    fn test_accept_starts_route_with_frozen_snapshot() {
        // Feed reports the user, the user picks the first café, confirms
        let mut h = harness();
        h.controller.on_position(user());
        h.controller.on_poi_selected(0).unwrap();

        match h.presented.borrow().last().unwrap() {
            PromptRequest::StartRoute(context) => {
                assert_eq!(context.destination.name, "Aroma Café Sabaneta");
                assert_eq!(context.user_position, user());
            }
            request => panic!("expected a start-route prompt, got {:?}", request),
        }

        // A sample arriving while the dialog is open must not move the
        // already-frozen snapshot
        let drifted = Position::new(6.2, -75.7);
        h.controller.on_position(drifted);

        h.controller.on_gate_resolved(PromptOutcome::Accepted).unwrap();

        assert_eq!(
            h.computed.borrow().as_slice(),
            &[(user(), Position::new(6.15150999618405, -75.61369180892304))]
        );
        assert!(h.controller.cancel_visible());
    }

    #[test]
    fn test_reject_leaves_no_trace() {
        let mut h = harness();
        h.controller.on_position(user());
        h.controller.on_poi_selected(0).unwrap();

        h.controller.on_gate_resolved(PromptOutcome::Rejected).unwrap();

        assert!(h.computed.borrow().is_empty());
        assert!(!h.controller.cancel_visible());
        let ops = h.ops.borrow();
        assert!(!ops.iter().any(|op| matches!(op, MapOp::AddLayer(_))));
    }

    #[test]
    fn test_second_click_while_open_is_ignored() {
        let mut h = harness();
        h.controller.on_position(user());
        h.controller.on_poi_selected(0).unwrap();
        h.controller.on_poi_selected(1).unwrap();

        assert_eq!(h.presented.borrow().len(), 1);
    }

    #[test]
    fn test_new_route_tears_down_the_old_one_first() {
        let mut h = harness();
        start_route(&mut h);

        h.controller.on_poi_selected(1).unwrap();
        h.controller.on_gate_resolved(PromptOutcome::Accepted).unwrap();

        let ops = h.ops.borrow();
        let removed = ops
            .iter()
            .position(|op| *op == MapOp::RemoveLayer(LayerId(0)))
            .expect("old layer was never removed");
        let added = ops
            .iter()
            .position(|op| *op == MapOp::AddLayer(LayerId(1)))
            .expect("new layer was never added");
        assert!(removed < added);

        // Never two rendered routes at once
        let mut live = 0;
        for op in ops.iter() {
            match op {
                MapOp::AddLayer(_) => live += 1,
                MapOp::RemoveLayer(_) => live -= 1,
                _ => {}
            }
            assert!(live <= 1);
        }

        assert_eq!(*h.disposed.borrow(), 1);
        assert!(h.controller.cancel_visible());
    }

    #[test]
    fn test_cancel_declined_keeps_the_route() {
        let mut h = harness();
        start_route(&mut h);

        assert!(h.controller.request_cancel());
        assert_eq!(h.presented.borrow().last(), Some(&PromptRequest::CancelRoute));

        h.controller.on_gate_resolved(PromptOutcome::Rejected).unwrap();

        assert!(h.controller.cancel_visible());
        let ops = h.ops.borrow();
        assert!(!ops.iter().any(|op| matches!(op, MapOp::RemoveLayer(_))));
    }

    #[test]
    fn test_cancel_accepted_removes_the_route() {
        let mut h = harness();
        start_route(&mut h);

        assert!(h.controller.request_cancel());
        h.controller.on_gate_resolved(PromptOutcome::Accepted).unwrap();

        assert!(!h.controller.cancel_visible());
        assert_eq!(*h.ops.borrow().last().unwrap(), MapOp::RemoveLayer(LayerId(0)));
    }

    #[test]
    fn test_cancel_without_route_does_not_prompt() {
        let mut h = harness();

        assert!(!h.controller.request_cancel());
        assert!(h.presented.borrow().is_empty());
    }

    #[test]
    fn test_feed_error_then_fix_resumes_tracking() {
        let mut h = harness();

        h.controller.on_position_error(LocationError::Unavailable);
        h.controller.on_position(user());

        let ops = h.ops.borrow();
        assert_eq!(*ops.last().unwrap(), MapOp::FitBounds(vec![
            Position::new(6.15150999618405, -75.61369180892304),
            Position::new(6.149950147326389, -75.61758096298057),
            Position::new(6.150555615946403, -75.61797956390538),
            user(),
        ]));
    }

    #[test]
    fn test_route_events_render_progressively() {
        let mut h = harness();
        start_route(&mut h);

        h.controller.on_route_event(RouteEvent::Started).unwrap();
        h.controller
            .on_route_event(RouteEvent::SegmentAppended(user()))
            .unwrap();
        h.controller.on_route_event(RouteEvent::Completed).unwrap();

        let ops = h.ops.borrow();
        assert!(ops.iter().any(|op| *op == MapOp::Node(LayerId(0), user())));
        assert!(h.controller.cancel_visible());
    }

    #[test]
    fn test_failed_route_clears_and_surfaces() {
        let mut h = harness();
        start_route(&mut h);

        let err = h
            .controller
            .on_route_event(RouteEvent::Failed("service unreachable".to_string()))
            .unwrap_err();

        assert!(matches!(err, GuideError::RouteComputationFailed(_)));
        assert!(!h.controller.cancel_visible());

        // Stale events after the failure are dropped
        h.controller
            .on_route_event(RouteEvent::SegmentAppended(user()))
            .unwrap();
        let ops = h.ops.borrow();
        assert!(!ops.iter().any(|op| matches!(op, MapOp::Node(_, _))));
    }

    #[test]
    fn test_shutdown_stops_feed_and_route_without_prompting() {
        let mut h = harness();
        start_route(&mut h);
        let prompts_before = h.presented.borrow().len();

        h.controller.shutdown();

        assert!(!h.controller.cancel_visible());
        assert_eq!(h.presented.borrow().len(), prompts_before);
        assert_eq!(*h.ops.borrow().last().unwrap(), MapOp::RemoveLayer(LayerId(0)));
    }
}
