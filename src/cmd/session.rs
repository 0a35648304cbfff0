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

use crate::collection::Collection;
use crate::error::Fallible;
use crate::study::Command;
use crate::types::card::Card;

/// Build a session from the stored deck and print it. The overrides apply to
/// this session only and are not saved.
pub fn print_session(
    directory: Option<String>,
    size: Option<usize>,
    temperature: Option<f64>,
) -> Fallible<()> {
    let mut coll = Collection::open(directory)?;
    if coll.state.deck().is_empty() {
        println!("The deck is empty.");
        return Ok(());
    }
    let mut rng = rand::rng();
    if let Some(size) = size {
        coll.state.apply(Command::SetSessionSize(size), &mut rng)?;
    }
    if let Some(temperature) = temperature {
        coll.state.apply(Command::SetTemperature(temperature), &mut rng)?;
    }
    print!("{}", render_session(&coll.state.session_cards()));
    Ok(())
}

fn render_session(cards: &[&Card]) -> String {
    let mut out = String::new();
    for (i, card) in cards.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}. [{}] {}: {} | {}: {} ({:+})\n",
            i + 1,
            card.id().short(),
            card.front_label(),
            card.front_text(),
            card.back_label(),
            card.back_text(),
            card.frequency_factor()
        ));
    }
    out
}
