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

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use maud::Markup;
use maud::html;

use crate::drill::state::ServerState;
use crate::drill::template::page_template;
use crate::settings::SessionMode;
use crate::study::Snapshot;

const DEFAULT_TITLE: &str = "flashdeck";

pub async fn get_handler(State(state): State<ServerState>) -> (StatusCode, Html<String>) {
    let (snapshot, message) = {
        let mut mutable = state.mutable.lock().unwrap();
        let snapshot = mutable.collection.state.snapshot();
        (snapshot, mutable.message.take())
    };
    let title = snapshot.title.clone().unwrap_or(DEFAULT_TITLE.to_string());
    let body = html! {
        div.root {
            @if let Some(message) = message {
                div.message { (message) }
            }
            @if let Some(notice) = &snapshot.notice {
                div.message { (notice) }
            }
            (render_card(&snapshot))
            (render_search(&snapshot))
            (render_categories(&snapshot))
            (render_settings(&snapshot))
            (render_import())
        }
    };
    let html = page_template(&title, body);
    (StatusCode::OK, Html(html.into_string()))
}

fn render_card(snapshot: &Snapshot) -> Markup {
    let Some(card) = &snapshot.card else {
        return html! {
            div.card.empty {
                p { "No cards. Import a deck to start studying." }
            }
        };
    };
    let streaming = snapshot.settings.mode() == SessionMode::Streaming;
    let progress = format!("{} / {}", snapshot.position, snapshot.total);
    html! {
        div.card {
            div.header {
                @if let Some(title) = &snapshot.title {
                    h1 { (title) }
                }
                div.progress { (progress) }
                div.factor title="Frequency factor" { (format!("{:+}", card.frequency_factor)) }
            }
            div.face.front {
                div.label { (card.front_label) }
                div.text { (card.front_text) }
            }
            @if snapshot.flipped {
                div.face.back {
                    div.label { (card.back_label) }
                    div.text { (card.back_text) }
                }
            } @else {
                div.face.back.hidden {}
            }
            div.controls {
                form action="/" method="post" {
                    @if streaming {
                        input id="previous" type="submit" name="action" value="Previous" disabled;
                    } @else {
                        input id="previous" type="submit" name="action" value="Previous" title="Previous card. Shortcut: left arrow.";
                    }
                    input id="easier" type="submit" name="action" value="Easier" title="Show this card less often. Shortcut: down arrow.";
                    input id="flip" type="submit" name="action" value="Flip" title="Flip the card. Shortcut: space.";
                    input id="harder" type="submit" name="action" value="Harder" title="Show this card more often. Shortcut: up arrow.";
                    input id="next" type="submit" name="action" value="Next" title="Next card. Shortcut: right arrow.";
                }
            }
        }
    }
}

fn render_search(snapshot: &Snapshot) -> Markup {
    let query = snapshot.search.clone().unwrap_or_default();
    html! {
        form.search action="/search" method="post" {
            input type="search" name="query" placeholder="Search cards" value=(query);
            input type="submit" value="Search";
        }
    }
}

fn render_categories(snapshot: &Snapshot) -> Markup {
    html! {
        details.categories {
            summary { "Categories" }
            form action="/categories" method="post" {
                @for category in &snapshot.categories {
                    label {
                        @if category.active {
                            input type="checkbox" name="category" value=(category.name) checked;
                        } @else {
                            input type="checkbox" name="category" value=(category.name);
                        }
                        (format!("{} ({})", category.name, category.card_count))
                    }
                }
                input type="submit" value="Apply";
            }
            form action="/" method="post" {
                input type="submit" name="action" value="SelectAll";
            }
        }
    }
}

fn render_settings(snapshot: &Snapshot) -> Markup {
    let settings = &snapshot.settings;
    let streaming = settings.mode() == SessionMode::Streaming;
    html! {
        details.settings {
            summary { "Settings" }
            form action="/settings" method="post" {
                label {
                    "Temperature "
                    input type="number" name="temperature" step="0.1" value=(format!("{:.1}", settings.temperature()));
                }
                label {
                    "Session size (0 = all) "
                    input type="number" name="session_size" min="0" value=(settings.session_size());
                }
                label {
                    "Speech rate "
                    input type="number" name="speech_rate" step="0.1" value=(format!("{:.1}", settings.speech_rate()));
                }
                label {
                    "Mode "
                    select name="mode" {
                        @if streaming {
                            option value="batch" { "Batch" }
                            option value="streaming" selected { "Streaming" }
                        } @else {
                            option value="batch" selected { "Batch" }
                            option value="streaming" { "Streaming" }
                        }
                    }
                }
                input type="submit" value="Save";
            }
            form.steps action="/" method="post" {
                input type="submit" name="action" value="Cooler" title="Lower the temperature.";
                input type="submit" name="action" value="Warmer" title="Raise the temperature.";
                input type="submit" name="action" value="Shorter" title="One card fewer per session.";
                input type="submit" name="action" value="Longer" title="One card more per session.";
                input type="submit" name="action" value="Slower" title="Slower speech.";
                input type="submit" name="action" value="Faster" title="Faster speech.";
            }
            form action="/" method="post" {
                input type="submit" name="action" value="NewSession";
                input type="submit" name="action" value="ResetSettings";
            }
        }
    }
}

fn render_import() -> Markup {
    html! {
        details.import {
            summary { "Import" }
            form action="/import" method="post" {
                textarea name="text" rows="6" placeholder="*Spanish|English\nhola|hello" {}
                input type="url" name="url" placeholder="https://example.com/spanish.deck";
                input type="submit" value="Replace deck";
            }
        }
    }
}
