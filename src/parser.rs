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

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

use crate::types::card::Card;
use crate::types::card::DEFAULT_BACK_LABEL;
use crate::types::card::DEFAULT_FRONT_LABEL;
use crate::types::card_id::IdHasher;
use crate::types::timestamp::Timestamp;

const TITLE_MARKER: &str = "**";
const CATEGORY_MARKER: &str = "*";
const TITLE_SEPARATOR: char = ':';
const FIELD_SEPARATOR: char = '|';

/// The parser found no valid card in the input.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct EmptyDeck;

impl Display for EmptyDeck {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "deck contains no valid cards.")
    }
}

impl Error for EmptyDeck {}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDeck {
    /// The title from the last `**` line that had one.
    pub title: Option<String>,
    pub cards: Vec<Card>,
}

/// Parse deck text into cards. Fails with [`EmptyDeck`] if no line yields a
/// valid card.
pub fn parse_deck(text: &str) -> Result<ParsedDeck, EmptyDeck> {
    parse_deck_at(text, Timestamp::now())
}

/// Like [`parse_deck`], with the import time used to derive card ids given
/// explicitly.
pub fn parse_deck_at(text: &str, imported_at: Timestamp) -> Result<ParsedDeck, EmptyDeck> {
    let imported_at = imported_at.into_rfc3339();
    let mut title = None;
    let mut cards = Vec::new();
    let mut front_label = DEFAULT_FRONT_LABEL.to_string();
    let mut back_label = DEFAULT_BACK_LABEL.to_string();

    for (line_number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix(TITLE_MARKER) {
            if let Some(t) = parse_title(rest) {
                title = Some(t);
            }
        } else if let Some(rest) = line.strip_prefix(CATEGORY_MARKER) {
            (front_label, back_label) = parse_labels(rest);
        } else if let Some((front, back)) = parse_card_line(line) {
            let id = IdHasher::new()
                .update(imported_at.as_bytes())
                .update(&line_number.to_le_bytes())
                .update(front.as_bytes())
                .update(back.as_bytes())
                .finalize();
            cards.push(Card::new(id, &front_label, &back_label, front, back));
        } else {
            log::debug!("Skipping line {}: not a card.", line_number + 1);
        }
    }

    if cards.is_empty() {
        return Err(EmptyDeck);
    }
    Ok(ParsedDeck { title, cards })
}

fn parse_title(rest: &str) -> Option<String> {
    let (_, title) = rest.split_once(TITLE_SEPARATOR)?;
    let title = title.trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

fn parse_labels(rest: &str) -> (String, String) {
    let mut parts = rest.split(FIELD_SEPARATOR).map(str::trim);
    let front = parts.next().filter(|s| !s.is_empty());
    let back = parts.next().filter(|s| !s.is_empty());
    match (front, back) {
        (None, None) => (DEFAULT_FRONT_LABEL.to_string(), DEFAULT_BACK_LABEL.to_string()),
        (Some(label), None) => (label.to_string(), label.to_string()),
        (None, Some(back)) => (DEFAULT_FRONT_LABEL.to_string(), back.to_string()),
        (Some(front), Some(back)) => (front.to_string(), back.to_string()),
    }
}

/// Split a card line into its two faces. Extra fields are ignored.
fn parse_card_line(line: &str) -> Option<(&str, &str)> {
    let mut parts = line.split(FIELD_SEPARATOR).map(str::trim);
    let front = parts.next()?;
    let back = parts.next()?;
    if front.is_empty() || back.is_empty() {
        return None;
    }
    Some((front, back))
}
