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
use crate::guide::position::Position;
use crate::guide::route::{RouteEvent, RoutePlanner};
use serde::Deserialize;
use std::cell::Cell;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use tracing::{debug, warn};
use url::Url;

const OSRM_ENDPOINT: &str = "https://router.project-osrm.org/";
const PROFILE: &str = "foot";

#[derive(Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
}

#[derive(Deserialize)]
struct OsrmGeometry {
    /// GeoJSON order, `[lon, lat]` pairs.
    coordinates: Vec<[f64; 2]>,
}

/// Walking-route planner speaking the OSRM HTTP protocol. Each
/// computation runs on its own worker thread and streams `RouteEvent`s
/// over the channel given at construction; starting or disposing a
/// computation cancels the previous one.
pub struct OsrmPlanner {
    endpoint: Url,
    events_tx: mpsc::Sender<RouteEvent>,
    cancelled: Arc<Mutex<Cell<bool>>>,
}

impl OsrmPlanner {
    pub fn new(events_tx: mpsc::Sender<RouteEvent>) -> OsrmPlanner {
        let endpoint = Url::parse(OSRM_ENDPOINT).expect("routing endpoint is malformed");
        OsrmPlanner {
            endpoint,
            events_tx,
            cancelled: Arc::new(Mutex::new(Cell::new(false))),
        }
    }

    fn route_url(&self, from: Position, to: Position) -> Result<Url, GuideError> {
        let path = format!(
            "route/v1/{}/{},{};{},{}",
            PROFILE, from.lon, from.lat, to.lon, to.lat
        );
        let mut url = self
            .endpoint
            .join(&path)
            .map_err(|err| GuideError::RouteComputationFailed(err.to_string()))?;
        url.query_pairs_mut()
            .append_pair("overview", "full")
            .append_pair("geometries", "geojson");
        Ok(url)
    }
}

impl RoutePlanner for OsrmPlanner {
    fn compute(&mut self, from: Position, to: Position) -> Result<(), GuideError> {
        // Only one computation in flight at a time
        self.dispose();
        let cancelled = Arc::new(Mutex::new(Cell::new(false)));
        self.cancelled = cancelled.clone();

        let url = self.route_url(from, to)?;
        let events_tx = self.events_tx.clone();

        thread::spawn(move || {
            route_thread(url, events_tx, cancelled);
        });
        Ok(())
    }

    fn dispose(&mut self) {
        self.cancelled.lock().unwrap().set(true);
    }
}

fn route_thread(
    url: Url,
    events_tx: mpsc::Sender<RouteEvent>,
    cancelled: Arc<Mutex<Cell<bool>>>,
) {
    let outcome = fetch_route(&url);

    if cancelled.lock().unwrap().get() {
        debug!("route computation disposed, dropping result");
        return;
    }

    match outcome {
        Ok(coordinates) => {
            if events_tx.send(RouteEvent::Started).is_err() {
                return;
            }
            for [lon, lat] in coordinates {
                if cancelled.lock().unwrap().get() {
                    debug!("route computation disposed mid-stream");
                    return;
                }
                if events_tx
                    .send(RouteEvent::SegmentAppended(Position::new(lat, lon)))
                    .is_err()
                {
                    return;
                }
            }
            let _ = events_tx.send(RouteEvent::Completed);
        }
        Err(reason) => {
            warn!("route computation failed: {}", reason);
            let _ = events_tx.send(RouteEvent::Failed(reason));
        }
    }
}

fn fetch_route(url: &Url) -> Result<Vec<[f64; 2]>, String> {
    let response = reqwest::blocking::get(url.clone()).map_err(|err| err.to_string())?;
    let body: OsrmResponse = response.json().map_err(|err| err.to_string())?;

    if body.code != "Ok" {
        return Err(format!("routing service answered {}", body.code));
    }
    match body.routes.into_iter().next() {
        Some(route) => Ok(route.geometry.coordinates),
        None => Err("routing service returned no route".to_string()),
    }
}
