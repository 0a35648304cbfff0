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

use std::env::current_dir;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::Config;
use crate::error::Fallible;
use crate::error::fail;
use crate::settings::Settings;
use crate::store::Store;
use crate::store::keys;
use crate::study::Changes;
use crate::study::StudyState;
use crate::types::card::Card;

/// A data directory: its configuration, its store, and the study state
/// restored from that store.
pub struct Collection {
    pub directory: PathBuf,
    pub store: Store,
    pub state: StudyState,
}

impl Collection {
    pub fn open(directory: Option<String>) -> Fallible<Self> {
        let directory: PathBuf = match directory {
            Some(dir) => PathBuf::from(dir),
            None => current_dir()?,
        };
        let directory = if directory.exists() {
            directory.canonicalize()?
        } else {
            return fail("directory does not exist.");
        };

        let config = Config::load(&directory)?;
        let store = Store::open(&directory)?;

        let state = {
            log::debug!("Loading deck...");
            let start = Instant::now();
            let deck: Vec<Card> = store.load(keys::DECK)?.unwrap_or_default();
            let settings: Option<Settings> = store.load(keys::SETTINGS)?;
            let categories: Option<Vec<String>> = store.load(keys::CATEGORIES)?;
            let title: Option<String> = store.load(keys::TITLE)?;
            let state = StudyState::restore(
                config,
                deck,
                settings,
                categories,
                title,
                &mut rand::rng(),
            );
            let duration = start.elapsed().as_millis();
            log::debug!("Deck of {} cards loaded in {duration}ms.", state.deck().len());
            state
        };

        Ok(Self {
            directory,
            store,
            state,
        })
    }

    /// Write the parts of the state named by `changes` to the store.
    pub fn persist(&self, changes: Changes) -> Fallible<()> {
        if changes.deck {
            self.store.save(keys::DECK, self.state.deck())?;
        }
        if changes.settings {
            self.store.save(keys::SETTINGS, self.state.settings())?;
        }
        if changes.categories {
            self.store
                .save(keys::CATEGORIES, &self.state.active_categories())?;
        }
        if changes.title {
            match self.state.title() {
                Some(title) => self.store.save(keys::TITLE, title)?,
                None => self.store.remove(keys::TITLE)?,
            }
        }
        Ok(())
    }
}
