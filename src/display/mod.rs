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

use crate::guide::controller::MapController;
use crate::guide::error::GuideError;
use crate::guide::poi;
use crate::guide::tracker::{self, TrackerOptions};
use crate::map::dialog::GtkConfirmPrompt;
use crate::map::ChamplainSurface;
use crate::routing::OsrmPlanner;
use gtk::prelude::*;
use std::cell::RefCell;
use std::process;
use std::rc::Rc;
use std::sync::mpsc;
use std::time::Duration;
use tracing::{error, warn};

pub type ControllerRef = Rc<RefCell<MapController>>;

/// How often the shell drains the feed, prompt and route channels into
/// the controller. Everything the controller does happens here, on the
/// main thread, in arrival order.
const PUMP_INTERVAL_MS: u32 = 10;

pub struct Display {
    main_window: gtk::ApplicationWindow,
    pub builder: gtk::Builder,
}

impl Display {
    pub fn new(gtk_app: &gtk::Application) -> Display {
        let builder = gtk::Builder::new();

        let glade_src = include_str!("RouteSight.glade");
        builder
            .add_from_string(glade_src)
            .expect("Couldn't add from string");

        let window: gtk::ApplicationWindow = builder
            .get_object("MainPage")
            .expect("Couldn't find MainPage in ui file.");
        window.set_application(Some(gtk_app));

        let clutter_init_error = champlain::gtk_clutter::init();
        if clutter_init_error != champlain::gtk_clutter::Error::CLUTTER_INIT_SUCCESS {
            error!("Unable to init clutter");
            process::exit(0);
        }

        let champlain_widget = champlain::gtk_embed::new();
        let champlain_view = champlain::gtk_embed::get_view(champlain_widget.clone())
            .expect("Unable to get ChamplainView");

        champlain::view::set_kinetic_mode(champlain_view, true);
        champlain::view::set_zoom_on_double_click(champlain_view, true);

        let map_frame = builder
            .get_object::<gtk::Frame>("MapFrame")
            .expect("Can't find MapFrame in ui file.");
        map_frame.add(&champlain_widget);

        let (outcome_tx, outcome_rx) = mpsc::channel();
        let (route_tx, route_rx) = mpsc::channel();

        let surface = ChamplainSurface::new(champlain_view);
        let prompt = GtkConfirmPrompt::new(window.clone(), outcome_tx);
        let planner = OsrmPlanner::new(route_tx);
        let pois = poi::registry();

        let (tracker_handle, position_rx) = tracker::start(TrackerOptions::default());

        let controller = ControllerRef::new(RefCell::new(MapController::new(
            Box::new(surface),
            Box::new(planner),
            Box::new(prompt),
            pois.clone(),
            tracker_handle,
        )));

        let destination_box = builder
            .get_object::<gtk::Box>("DestinationBox")
            .expect("Can't find DestinationBox in ui file.");

        for (index, poi) in pois.iter().enumerate() {
            let button = gtk::Button::new_with_label(&poi.name);

            let controller_weak = ControllerRef::downgrade(&controller);
            let builder = builder.clone();
            button.connect_clicked(move |_| {
                let controller = upgrade_weak!(controller_weak);
                if let Err(err) = controller.borrow_mut().on_poi_selected(index) {
                    warn!("{}", err);
                    show_status(&builder, &err.to_string());
                }
            });

            destination_box.pack_start(&button, false, false, 0);
        }

        let cancel_button = builder
            .get_object::<gtk::Button>("CancelRoute")
            .expect("Can't find CancelRoute in ui file.");

        let controller_weak = ControllerRef::downgrade(&controller);
        cancel_button.connect_clicked(move |_| {
            let controller = upgrade_weak!(controller_weak);
            controller.borrow_mut().request_cancel();
        });

        let controller_weak = ControllerRef::downgrade(&controller);
        let position_builder = builder.clone();
        gtk::timeout_add(PUMP_INTERVAL_MS, move || {
            let controller = upgrade_weak!(controller_weak, glib::source::Continue(false));

            let timeout = Duration::new(0, 100);
            match position_rx.recv_timeout(timeout) {
                Ok(Ok(position)) => controller.borrow_mut().on_position(position),
                Ok(Err(error)) => {
                    controller.borrow_mut().on_position_error(error);
                    show_status(&position_builder, &GuideError::from(error).to_string());
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    return glib::source::Continue(false);
                }
            }
            glib::source::Continue(true)
        });

        let controller_weak = ControllerRef::downgrade(&controller);
        let outcome_builder = builder.clone();
        gtk::timeout_add(PUMP_INTERVAL_MS, move || {
            let controller = upgrade_weak!(controller_weak, glib::source::Continue(false));

            let timeout = Duration::new(0, 100);
            match outcome_rx.recv_timeout(timeout) {
                Ok(outcome) => {
                    if let Err(err) = controller.borrow_mut().on_gate_resolved(outcome) {
                        warn!("{}", err);
                        show_status(&outcome_builder, &err.to_string());
                    }
                    glib::source::Continue(true)
                }
                Err(mpsc::RecvTimeoutError::Timeout) => glib::source::Continue(true),
                _ => glib::source::Continue(false),
            }
        });

        let controller_weak = ControllerRef::downgrade(&controller);
        let route_builder = builder.clone();
        gtk::timeout_add(PUMP_INTERVAL_MS, move || {
            let controller = upgrade_weak!(controller_weak, glib::source::Continue(false));

            let timeout = Duration::new(0, 100);
            match route_rx.recv_timeout(timeout) {
                Ok(event) => {
                    if let Err(err) = controller.borrow_mut().on_route_event(event) {
                        warn!("{}", err);
                        show_status(&route_builder, &err.to_string());
                    }
                    glib::source::Continue(true)
                }
                Err(mpsc::RecvTimeoutError::Timeout) => glib::source::Continue(true),
                _ => glib::source::Continue(false),
            }
        });

        // We use a strong reference here to make sure that the controller
        // isn't dropped while the window is up
        let controller_clone = controller.clone();
        gtk::timeout_add(PUMP_INTERVAL_MS, move || {
            let controller = ControllerRef::downgrade(&controller_clone)
                .upgrade()
                .unwrap();

            cancel_button.set_visible(controller.borrow().cancel_visible());

            glib::source::Continue(true)
        });

        let controller_weak = ControllerRef::downgrade(&controller);
        window.connect_delete_event(move |_, _| {
            let controller = upgrade_weak!(controller_weak, gtk::Inhibit(false));
            controller.borrow_mut().shutdown();
            gtk::Inhibit(false)
        });

        window.show_all();

        Display {
            main_window: window,
            builder,
        }
    }

    pub fn on_startup(gtk_app: &gtk::Application) {
        let _display = Display::new(gtk_app);
    }
}

fn show_status(builder: &gtk::Builder, message: &str) {
    let label = builder
        .get_object::<gtk::Label>("StatusLabel")
        .expect("Can't find StatusLabel in ui file.");
    label.set_text(message);
}
