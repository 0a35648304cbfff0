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

use crate::error::Fallible;
use crate::import::Source;
use crate::parser::ParsedDeck;
use crate::parser::parse_deck;

/// Read and parse a deck without touching any stored state.
pub async fn check_deck(source: &str) -> Fallible<()> {
    let deck = load_deck(source).await?;
    match &deck.title {
        Some(title) => println!("ok: {} cards in {title:?}", deck.cards.len()),
        None => println!("ok: {} cards", deck.cards.len()),
    }
    Ok(())
}

pub async fn load_deck(source: &str) -> Fallible<ParsedDeck> {
    let text = Source::parse(source)?.read().await?;
    Ok(parse_deck(&text)?)
}
