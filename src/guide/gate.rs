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

use crate::guide::poi::PointOfInterest;
use crate::guide::position::Position;

/// Snapshot taken when a destination is chosen. The user position is
/// frozen at selection time; later feed samples do not touch it.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionContext {
    pub destination: PointOfInterest,
    pub user_position: Position,
}

/// What the gate is asking the user to confirm.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptRequest {
    StartRoute(SelectionContext),
    CancelRoute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptOutcome {
    Accepted,
    Rejected,
}

/// Presents a modal yes/no prompt. The widget reports the user's answer
/// back through the shell as a `PromptOutcome` event.
pub trait ConfirmPrompt {
    fn present(&mut self, request: &PromptRequest);
}

enum GateState {
    Closed,
    Open(PromptRequest),
}

/// Single-slot modal interaction: at most one confirmation is on screen
/// at any time.
pub struct ConfirmationGate {
    state: GateState,
    prompt: Box<dyn ConfirmPrompt>,
}

impl ConfirmationGate {
    pub fn new(prompt: Box<dyn ConfirmPrompt>) -> ConfirmationGate {
        ConfirmationGate {
            state: GateState::Closed,
            prompt,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, GateState::Open(_))
    }

    /// Open the gate for `request`. Returns `false` without presenting a
    /// second dialog if one is already open.
    pub fn open(&mut self, request: PromptRequest) -> bool {
        if self.is_open() {
            return false;
        }
        self.prompt.present(&request);
        self.state = GateState::Open(request);
        true
    }

    /// Resolve the open interaction. `Accepted` hands the pending request
    /// back to the caller; `Rejected` discards it. Either way the gate is
    /// `Closed` again before this returns; a lingering dialog close
    /// animation is the widget's own business. Resolving a closed gate is
    /// a no-op.
    pub fn resolve(&mut self, outcome: PromptOutcome) -> Option<PromptRequest> {
        match std::mem::replace(&mut self.state, GateState::Closed) {
            GateState::Closed => None,
            GateState::Open(request) => match outcome {
                PromptOutcome::Accepted => Some(request),
                PromptOutcome::Rejected => None,
            },
        }
    }
}
