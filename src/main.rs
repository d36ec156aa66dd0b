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

extern crate gtk;
extern crate gio;

#[macro_use]
mod utils;
mod display;
mod guide;
mod map;
mod routing;

use gio::prelude::*;
use gtk::prelude::*;

use std::env;

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let uiapp = gtk::Application::new(
        Some("org.alistair23.RouteSight"),
        Default::default(),
        ).expect("Application::new failed");

    uiapp.connect_activate(|app| {
        display::Display::on_startup(app);
    });

    uiapp.run(&env::args().collect::<Vec<_>>());
}
