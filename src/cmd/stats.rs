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

use std::fmt::Display;
use std::fmt::Formatter;

use clap::ValueEnum;
use serde::Serialize;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::settings::Settings;
use crate::store::keys;
use crate::study::CategoryView;
use crate::types::timestamp::Timestamp;

#[derive(ValueEnum, Clone, Copy)]
pub enum StatsFormat {
    /// Plain text output.
    Text,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

pub fn print_deck_stats(directory: Option<String>, format: StatsFormat) -> Fallible<()> {
    let coll = Collection::open(directory)?;
    let stats = Stats::new(&coll)?;
    match format {
        StatsFormat::Text => print!("{}", stats.to_text()),
        StatsFormat::Json => {
            let stats_json = serde_json::to_string_pretty(&stats)?;
            println!("{}", stats_json);
        }
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    title: Option<String>,
    card_count: usize,
    session_count: usize,
    categories: Vec<CategoryView>,
    settings: Settings,
    imported_at: Option<Timestamp>,
}

impl Stats {
    fn new(coll: &Collection) -> Fallible<Self> {
        let snapshot = coll.state.snapshot();
        Ok(Self {
            title: snapshot.title,
            card_count: snapshot.deck_size,
            session_count: snapshot.total,
            categories: snapshot.categories,
            settings: snapshot.settings,
            imported_at: coll.store.saved_at(keys::DECK)?,
        })
    }

    fn to_text(&self) -> String {
        let mut out = String::new();
        if let Some(title) = &self.title {
            out.push_str(&format!("{title}\n"));
        }
        out.push_str(&format!("cards: {}\n", self.card_count));
        if let Some(imported_at) = &self.imported_at {
            out.push_str(&format!("imported: {imported_at}\n"));
        }
        for category in &self.categories {
            let marker = if category.active { '*' } else { ' ' };
            out.push_str(&format!(
                "{marker} {} ({})\n",
                category.name, category.card_count
            ));
        }
        out
    }
}
