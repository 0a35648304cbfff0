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

//! The study state: master deck, category filter, settings and the current
//! session. Every user action is a [`Command`] applied through
//! [`StudyState::apply`]; the presentation layer reads a [`Snapshot`].

use std::collections::HashSet;

use rand::Rng;
use serde::Serialize;

use crate::config::Config;
use crate::error::Fallible;
use crate::parser::parse_deck;
use crate::sampler::Weighted;
use crate::sampler::build_session;
use crate::sampler::draw_one;
use crate::settings::SessionMode;
use crate::settings::Settings;
use crate::types::card::Card;
use crate::types::card_id::CardId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Easier,
    Harder,
}

impl Direction {
    fn sign(self) -> f64 {
        match self {
            Direction::Easier => -1.0,
            Direction::Harder => 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Parse deck text and replace the master deck with it.
    Import(String),
    SetCategories(Vec<String>),
    SelectAllCategories,
    AdjustFrequency { id: CardId, direction: Direction },
    SetTemperature(f64),
    StepTemperature(i32),
    SetSessionSize(usize),
    StepSessionSize(i32),
    SetSpeechRate(f64),
    StepSpeechRate(i32),
    SetMode(SessionMode),
    ResetSettings,
    NewSession,
    Search(String),
    Draw,
    Next,
    Previous,
    Flip,
}

/// What a command changed, so the caller knows what to persist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Changes {
    pub deck: bool,
    pub settings: bool,
    pub categories: bool,
    pub title: bool,
}

pub struct StudyState {
    config: Config,
    deck: Vec<Card>,
    title: Option<String>,
    active: HashSet<String>,
    settings: Settings,
    /// Indices into `deck`.
    session: Vec<usize>,
    /// Index into `session`. `Some` iff the session is non-empty.
    current: Option<usize>,
    flipped: bool,
    search: Option<String>,
    notice: Option<String>,
}

impl StudyState {
    pub fn new(config: Config) -> Self {
        let settings = Settings::new(&config);
        Self {
            config,
            deck: Vec::new(),
            title: None,
            active: HashSet::new(),
            settings,
            session: Vec::new(),
            current: None,
            flipped: false,
            search: None,
            notice: None,
        }
    }

    /// Rebuild a state from persisted parts. Invalid cards are dropped and
    /// settings are re-clamped to the current configuration.
    pub fn restore<R: Rng>(
        config: Config,
        deck: Vec<Card>,
        settings: Option<Settings>,
        categories: Option<Vec<String>>,
        title: Option<String>,
        rng: &mut R,
    ) -> Self {
        let mut state = Self::new(config);
        if let Some(settings) = settings {
            state.settings = settings.sanitize(&state.config);
        }
        let total = deck.len();
        let bounds = state.config.frequency;
        state.deck = deck
            .into_iter()
            .filter(Card::is_valid)
            .map(|mut card| {
                card.clamp_frequency(&bounds);
                card
            })
            .collect();
        if state.deck.len() < total {
            log::warn!("Dropped {} invalid stored cards.", total - state.deck.len());
        }
        state.title = title;
        state.set_active(categories.unwrap_or_default());
        state.rebuild(rng);
        state
    }

    pub fn apply<R: Rng>(&mut self, command: Command, rng: &mut R) -> Fallible<Changes> {
        self.notice = None;
        let mut changes = Changes::default();
        match command {
            Command::Import(text) => {
                let mut parsed = parse_deck(&text)?;
                log::info!("Imported {} cards.", parsed.cards.len());
                for card in &mut parsed.cards {
                    card.reset_frequency(&self.config.frequency);
                }
                self.deck = parsed.cards;
                self.title = parsed.title;
                self.set_active(Vec::new());
                self.rebuild(rng);
                changes.deck = true;
                changes.title = true;
                changes.categories = true;
            }
            Command::SetCategories(categories) => {
                self.set_active(categories);
                self.rebuild(rng);
                changes.categories = true;
            }
            Command::SelectAllCategories => {
                self.set_active(Vec::new());
                self.rebuild(rng);
                changes.categories = true;
            }
            Command::AdjustFrequency { id, direction } => {
                let delta = self.config.frequency.delta * direction.sign();
                match self.deck.iter_mut().find(|card| card.id() == id) {
                    Some(card) => {
                        let value = card.adjust_frequency(delta, &self.config.frequency);
                        log::debug!("Card {} frequency factor is now {value}.", id.short());
                        changes.deck = true;
                    }
                    None => {
                        log::warn!("No card with id {}.", id.short());
                    }
                }
            }
            Command::SetTemperature(value) => {
                self.settings.set_temperature(value, &self.config);
                self.rebuild(rng);
                changes.settings = true;
            }
            Command::StepTemperature(direction) => {
                self.settings.step_temperature(direction, &self.config);
                self.rebuild(rng);
                changes.settings = true;
            }
            Command::SetSessionSize(value) => {
                self.settings.set_session_size(value, &self.config);
                self.rebuild(rng);
                changes.settings = true;
            }
            Command::StepSessionSize(direction) => {
                self.settings.step_session_size(direction, &self.config);
                self.rebuild(rng);
                changes.settings = true;
            }
            Command::SetSpeechRate(value) => {
                self.settings.set_speech_rate(value, &self.config);
                changes.settings = true;
            }
            Command::StepSpeechRate(direction) => {
                self.settings.step_speech_rate(direction, &self.config);
                changes.settings = true;
            }
            Command::SetMode(mode) => {
                self.settings.set_mode(mode);
                self.rebuild(rng);
                changes.settings = true;
            }
            Command::ResetSettings => {
                self.settings = Settings::new(&self.config);
                self.rebuild(rng);
                changes.settings = true;
            }
            Command::NewSession => {
                self.rebuild(rng);
            }
            Command::Search(query) => {
                self.search_for(query.trim(), rng);
            }
            Command::Draw => {
                self.draw(rng);
            }
            Command::Next => match self.settings.mode() {
                SessionMode::Batch => self.navigate(1),
                SessionMode::Streaming => self.draw(rng),
            },
            Command::Previous => match self.settings.mode() {
                SessionMode::Batch => self.navigate(-1),
                SessionMode::Streaming => {
                    log::debug!("Previous is not available in streaming mode.");
                }
            },
            Command::Flip => {
                if self.current.is_some() {
                    self.flipped = !self.flipped;
                }
            }
        }
        Ok(changes)
    }

    /// Distinct front labels, in deck order.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.deck
            .iter()
            .map(|card| card.front_label())
            .filter(|label| seen.insert(*label))
            .map(str::to_string)
            .collect()
    }

    /// The active categories, sorted.
    pub fn active_categories(&self) -> Vec<String> {
        let mut active: Vec<String> = self.active.iter().cloned().collect();
        active.sort();
        active
    }

    pub fn deck(&self) -> &[Card] {
        &self.deck
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn current_card(&self) -> Option<&Card> {
        self.current.map(|i| &self.deck[self.session[i]])
    }

    pub fn session_cards(&self) -> Vec<&Card> {
        self.session.iter().map(|&i| &self.deck[i]).collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        let counts = |label: &str| {
            self.deck
                .iter()
                .filter(|card| card.front_label() == label)
                .count()
        };
        Snapshot {
            title: self.title.clone(),
            card: self.current_card().map(CardView::from),
            position: self.current.map_or(0, |i| i + 1),
            total: self.session.len(),
            flipped: self.flipped,
            deck_size: self.deck.len(),
            categories: self
                .categories()
                .into_iter()
                .map(|name| CategoryView {
                    active: self.active.contains(&name),
                    card_count: counts(&name),
                    name,
                })
                .collect(),
            settings: self.settings.clone(),
            search: self.search.clone(),
            notice: self.notice.clone(),
        }
    }

    /// An empty selection means every category.
    fn set_active(&mut self, categories: Vec<String>) {
        self.active = if categories.is_empty() {
            self.categories().into_iter().collect()
        } else {
            categories.into_iter().collect()
        };
    }

    /// Cards whose front label is active. Falls back to the whole deck when
    /// nothing matches.
    fn filtered_pool(&self) -> Vec<usize> {
        let filtered: Vec<usize> = (0..self.deck.len())
            .filter(|&i| self.active.contains(self.deck[i].front_label()))
            .collect();
        if filtered.is_empty() {
            (0..self.deck.len()).collect()
        } else {
            filtered
        }
    }

    fn rebuild<R: Rng>(&mut self, rng: &mut R) {
        self.search = None;
        self.flipped = false;
        let pool: Vec<Slot> = self
            .filtered_pool()
            .into_iter()
            .map(|index| Slot {
                index,
                card: &self.deck[index],
            })
            .collect();
        let sampled = build_session(
            &pool,
            self.settings.session_size(),
            self.settings.temperature(),
            rng,
        );
        self.session = sampled.into_iter().map(|slot| slot.index).collect();
        self.current = if self.session.is_empty() {
            None
        } else {
            Some(0)
        };
    }

    fn navigate(&mut self, direction: isize) {
        self.flipped = false;
        let len = self.session.len() as isize;
        if let Some(current) = self.current {
            let next = (current as isize + direction + len) % len;
            self.current = Some(next as usize);
        }
    }

    fn draw<R: Rng>(&mut self, rng: &mut R) {
        self.flipped = false;
        // Weights are recomputed on every draw, so frequency adjustments
        // apply to the next one.
        self.current = draw_one(&self.session_cards(), self.settings.temperature(), rng);
    }

    fn search_for<R: Rng>(&mut self, query: &str, rng: &mut R) {
        if query.is_empty() {
            self.rebuild(rng);
            return;
        }
        let results: Vec<usize> = (0..self.deck.len())
            .filter(|&i| self.deck[i].matches(query))
            .collect();
        if results.is_empty() {
            log::debug!("Search: no matches for {query:?}, keeping the session.");
            self.notice = Some(format!("No matches found for: {query}"));
        } else {
            self.session = results;
            self.current = Some(0);
            self.flipped = false;
            self.search = Some(query.to_string());
        }
    }
}

/// A deck position paired with its card, so sampled cards can be traced back
/// to the deck.
#[derive(Clone)]
struct Slot<'a> {
    index: usize,
    card: &'a Card,
}

impl Weighted for Slot<'_> {
    fn frequency_factor(&self) -> f64 {
        self.card.frequency_factor()
    }
}

/// A read-only view of the state for rendering.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub title: Option<String>,
    pub card: Option<CardView>,
    /// One-based position of the current card, zero if there is none.
    pub position: usize,
    pub total: usize,
    pub flipped: bool,
    pub deck_size: usize,
    pub categories: Vec<CategoryView>,
    pub settings: Settings,
    pub search: Option<String>,
    pub notice: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub id: CardId,
    pub front_label: String,
    pub back_label: String,
    pub front_text: String,
    pub back_text: String,
    pub frequency_factor: f64,
}

impl From<&Card> for CardView {
    fn from(card: &Card) -> Self {
        Self {
            id: card.id(),
            front_label: card.front_label().to_string(),
            back_label: card.back_label().to_string(),
            front_text: card.front_text().to_string(),
            back_text: card.back_text().to_string(),
            frequency_factor: card.frequency_factor(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub name: String,
    pub active: bool,
    pub card_count: usize,
}
