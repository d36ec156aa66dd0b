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
use gpsd_proto::handshake;
use std::cell::Cell;
use std::io;
use std::net::TcpStream;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

const GPSD_ADDR: &str = "127.0.0.1:2947";
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Options for the position subscription.
#[derive(Debug, Clone, Copy)]
pub struct TrackerOptions {
    /// Only accept full 3D fixes.
    pub high_accuracy: bool,
    /// Discard fixes older than this. Zero means any live fix is fine.
    pub max_cache_age: Duration,
    /// Socket read timeout; an expiry is reported as a transient error.
    pub timeout: Duration,
}

impl Default for TrackerOptions {
    fn default() -> TrackerOptions {
        TrackerOptions {
            high_accuracy: true,
            max_cache_age: Duration::from_secs(0),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Owner side of a running subscription. The worker checks the close flag
/// between reads, so the subscription never outlives a `stop`ped handle by
/// more than one read cycle.
pub struct TrackerHandle {
    close: Arc<Mutex<Cell<bool>>>,
}

impl TrackerHandle {
    /// A handle bound to no subscription. `stop` on it is a no-op.
    pub fn unstarted() -> TrackerHandle {
        TrackerHandle {
            close: Arc::new(Mutex::new(Cell::new(true))),
        }
    }

    /// Idempotent: stopping twice, or stopping a handle that never had a
    /// subscription, does nothing further.
    pub fn stop(&self) {
        self.close.lock().unwrap().set(true);
    }

    pub fn stopped(&self) -> bool {
        self.close.lock().unwrap().get()
    }
}

/// Start the continuous position subscription. Samples and transient
/// errors both arrive on the returned channel; the worker keeps reading
/// after an error. The subscription runs until the handle is `stop`ped.
pub fn start(
    options: TrackerOptions,
) -> (TrackerHandle, mpsc::Receiver<Result<Position, LocationError>>) {
    let (update_tx, update_rx) = mpsc::channel();
    let close = Arc::new(Mutex::new(Cell::new(false)));

    let thread_close = close.clone();
    thread::spawn(move || {
        feed_thread(options, update_tx, thread_close);
    });

    (TrackerHandle { close }, update_rx)
}

fn feed_thread(
    options: TrackerOptions,
    update_tx: mpsc::Sender<Result<Position, LocationError>>,
    close: Arc<Mutex<Cell<bool>>>,
) {
    while !close.lock().unwrap().get() {
        let stream = match TcpStream::connect(GPSD_ADDR) {
            Ok(stream) => stream,
            Err(err) => {
                warn!("failed to connect to gpsd: {}", err);
                if update_tx.send(Err(LocationError::Unavailable)).is_err() {
                    return;
                }
                thread::sleep(RECONNECT_DELAY);
                continue;
            }
        };

        if let Err(err) = stream.set_read_timeout(Some(options.timeout)) {
            warn!("unable to set gpsd read timeout: {}", err);
        }

        let mut reader = io::BufReader::new(&stream);
        let mut writer = io::BufWriter::new(&stream);

        if let Err(err) = handshake(&mut reader, &mut writer) {
            warn!("gpsd handshake refused: {:?}", err);
            if update_tx.send(Err(LocationError::PermissionDenied)).is_err() {
                return;
            }
            thread::sleep(RECONNECT_DELAY);
            continue;
        }

        while !close.lock().unwrap().get() {
            match crate::utils::next_position(&mut reader, &options) {
                Ok(Some(position)) => {
                    if update_tx.send(Ok(position)).is_err() {
                        return;
                    }
                }
                // Fix filtered out by the options, keep reading
                Ok(None) => {}
                Err(error) => {
                    if update_tx.send(Err(error)).is_err() {
                        return;
                    }
                    if error == LocationError::Unavailable {
                        // Stream is broken, go back to the connect loop
                        thread::sleep(Duration::from_millis(10));
                        break;
                    }
                }
            }
        }
    }

    debug!("position feed stopped");
}
