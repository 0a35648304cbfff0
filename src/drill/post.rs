// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::Form;
use axum::extract::State;
use axum::response::Redirect;
use serde::Deserialize;

use crate::drill::state::ServerState;
use crate::error::Fallible;
use crate::import::fetch_text;
use crate::settings::SessionMode;
use crate::study::Command;
use crate::study::Direction;
use crate::types::card_id::CardId;

#[derive(Debug, Deserialize, PartialEq)]
enum Action {
    Flip,
    Next,
    Previous,
    Draw,
    Harder,
    Easier,
    NewSession,
    ResetSettings,
    SelectAll,
    Cooler,
    Warmer,
    Shorter,
    Longer,
    Slower,
    Faster,
}

#[derive(Deserialize)]
pub struct ActionForm {
    action: Action,
}

#[derive(Deserialize)]
pub struct SettingsForm {
    temperature: f64,
    session_size: usize,
    speech_rate: f64,
    mode: SessionMode,
}

#[derive(Deserialize)]
pub struct SearchForm {
    query: String,
}

#[derive(Deserialize)]
pub struct ImportForm {
    #[serde(default)]
    text: String,
    #[serde(default)]
    url: String,
}

pub async fn post_handler(
    State(state): State<ServerState>,
    Form(form): Form<ActionForm>,
) -> Redirect {
    let command = {
        let mutable = state.mutable.lock().unwrap();
        let current = mutable.collection.state.current_card().map(|card| card.id());
        action_command(form.action, current)
    };
    if let Some(command) = command {
        report(&state, apply(&state, vec![command]));
    }
    Redirect::to("/")
}

pub async fn settings_handler(
    State(state): State<ServerState>,
    Form(form): Form<SettingsForm>,
) -> Redirect {
    let commands = vec![
        Command::SetMode(form.mode),
        Command::SetSpeechRate(form.speech_rate),
        Command::SetSessionSize(form.session_size),
        Command::SetTemperature(form.temperature),
    ];
    report(&state, apply(&state, commands));
    Redirect::to("/")
}

/// The category form is a list of repeated `category` fields.
pub async fn categories_handler(
    State(state): State<ServerState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Redirect {
    let categories: Vec<String> = fields
        .into_iter()
        .filter(|(name, _)| name == "category")
        .map(|(_, value)| value)
        .collect();
    report(&state, apply(&state, vec![Command::SetCategories(categories)]));
    Redirect::to("/")
}

pub async fn search_handler(
    State(state): State<ServerState>,
    Form(form): Form<SearchForm>,
) -> Redirect {
    report(&state, apply(&state, vec![Command::Search(form.query)]));
    Redirect::to("/")
}

pub async fn import_handler(
    State(state): State<ServerState>,
    Form(form): Form<ImportForm>,
) -> Redirect {
    let ticket = state.begin_import();
    let url = form.url.trim();
    let text = if url.is_empty() {
        Ok(form.text)
    } else {
        fetch_text(url).await
    };
    if !state.is_latest_import(ticket) {
        log::warn!("Discarding import {ticket}: a newer import has started.");
        return Redirect::to("/");
    }
    let result = text.and_then(|text| apply(&state, vec![Command::Import(text)]));
    report(&state, result);
    Redirect::to("/")
}

fn action_command(action: Action, current: Option<CardId>) -> Option<Command> {
    let command = match action {
        Action::Flip => Command::Flip,
        Action::Next => Command::Next,
        Action::Previous => Command::Previous,
        Action::Draw => Command::Draw,
        Action::NewSession => Command::NewSession,
        Action::ResetSettings => Command::ResetSettings,
        Action::SelectAll => Command::SelectAllCategories,
        Action::Cooler => Command::StepTemperature(-1),
        Action::Warmer => Command::StepTemperature(1),
        Action::Shorter => Command::StepSessionSize(-1),
        Action::Longer => Command::StepSessionSize(1),
        Action::Slower => Command::StepSpeechRate(-1),
        Action::Faster => Command::StepSpeechRate(1),
        Action::Harder | Action::Easier => {
            let direction = if action == Action::Harder {
                Direction::Harder
            } else {
                Direction::Easier
            };
            Command::AdjustFrequency {
                id: current?,
                direction,
            }
        }
    };
    Some(command)
}

/// Apply commands in order and persist what they changed.
fn apply(state: &ServerState, commands: Vec<Command>) -> Fallible<()> {
    let mut mutable = state.mutable.lock().unwrap();
    let mut rng = rand::rng();
    for command in commands {
        let changes = mutable.collection.state.apply(command, &mut rng)?;
        mutable.collection.persist(changes)?;
    }
    Ok(())
}

fn report(state: &ServerState, result: Fallible<()>) {
    if let Err(e) = result {
        log::error!("{e}");
        let mut mutable = state.mutable.lock().unwrap();
        mutable.message = Some(e.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::card_id::IdHasher;

    #[test]
    fn test_action_command() {
        let id = IdHasher::new().update(b"card").finalize();
        assert_eq!(action_command(Action::Next, None), Some(Command::Next));
        assert_eq!(
            action_command(Action::SelectAll, None),
            Some(Command::SelectAllCategories)
        );
        assert_eq!(
            action_command(Action::Harder, Some(id)),
            Some(Command::AdjustFrequency {
                id,
                direction: Direction::Harder
            })
        );
        assert_eq!(
            action_command(Action::Easier, Some(id)),
            Some(Command::AdjustFrequency {
                id,
                direction: Direction::Easier
            })
        );
        assert_eq!(
            action_command(Action::Cooler, None),
            Some(Command::StepTemperature(-1))
        );
        assert_eq!(
            action_command(Action::Faster, None),
            Some(Command::StepSpeechRate(1))
        );
        assert_eq!(action_command(Action::Harder, None), None);
    }
}
