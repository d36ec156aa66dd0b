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

use crate::guide::gate::{ConfirmPrompt, PromptOutcome, PromptRequest};
use gtk::prelude::*;
use std::sync::mpsc;
use tracing::debug;

/// How long an accepted dialog stays on screen before closing itself.
/// Purely cosmetic; the answer is already delivered by then.
const ACCEPT_CLOSE_DELAY_MS: u32 = 1500;

/// Modal yes/no prompt over a GTK message dialog. The answer travels back
/// to the controller as a `PromptOutcome` on the channel given here.
pub struct GtkConfirmPrompt {
    window: gtk::ApplicationWindow,
    outcome_tx: mpsc::Sender<PromptOutcome>,
}

impl GtkConfirmPrompt {
    pub fn new(
        window: gtk::ApplicationWindow,
        outcome_tx: mpsc::Sender<PromptOutcome>,
    ) -> GtkConfirmPrompt {
        GtkConfirmPrompt { window, outcome_tx }
    }

    fn message(request: &PromptRequest) -> String {
        match request {
            PromptRequest::StartRoute(context) => {
                format!("Start a route to {}?", context.destination.name)
            }
            PromptRequest::CancelRoute => {
                "Are you sure you want to cancel the route?".to_string()
            }
        }
    }
}

impl ConfirmPrompt for GtkConfirmPrompt {
    fn present(&mut self, request: &PromptRequest) {
        let dialog = gtk::MessageDialog::new(
            Some(&self.window),
            gtk::DialogFlags::MODAL,
            gtk::MessageType::Question,
            gtk::ButtonsType::YesNo,
            &Self::message(request),
        );

        let outcome_tx = self.outcome_tx.clone();
        dialog.connect_response(move |dialog, response| {
            // The modal resolves only through its own controls; every exit
            // path other than Yes counts as a rejection
            let outcome = match response {
                gtk::ResponseType::Yes => PromptOutcome::Accepted,
                _ => PromptOutcome::Rejected,
            };
            if outcome_tx.send(outcome).is_err() {
                debug!("confirmation outcome dropped, receiver gone");
            }

            match outcome {
                PromptOutcome::Accepted => {
                    // Leave the accepting feedback visible for a moment;
                    // the answer is already on its way
                    let dialog = dialog.clone();
                    gtk::timeout_add(ACCEPT_CLOSE_DELAY_MS, move || {
                        dialog.close();
                        glib::source::Continue(false)
                    });
                }
                PromptOutcome::Rejected => dialog.close(),
            }
        });

        dialog.show_all();
    }
}
