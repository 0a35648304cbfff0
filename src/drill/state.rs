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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use crate::collection::Collection;

#[derive(Clone)]
pub struct ServerState {
    pub mutable: Arc<Mutex<MutableState>>,
    /// The number of the most recently started import.
    pub latest_import: Arc<AtomicU64>,
}

pub struct MutableState {
    pub collection: Collection,
    /// A one-shot message shown on the next page render.
    pub message: Option<String>,
}

impl ServerState {
    pub fn new(collection: Collection) -> Self {
        Self {
            mutable: Arc::new(Mutex::new(MutableState {
                collection,
                message: None,
            })),
            latest_import: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start an import and return its ticket.
    pub fn begin_import(&self) -> u64 {
        self.latest_import.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether no import has started since the one holding `ticket`.
    pub fn is_latest_import(&self, ticket: u64) -> bool {
        self.latest_import.load(Ordering::SeqCst) == ticket
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::error::Fallible;

    #[test]
    fn test_newer_import_supersedes_older() -> Fallible<()> {
        let dir = tempdir()?;
        let collection = Collection::open(Some(dir.path().display().to_string()))?;
        let state = ServerState::new(collection);
        let first = state.begin_import();
        assert!(state.is_latest_import(first));
        let second = state.clone().begin_import();
        assert!(second > first);
        assert!(!state.is_latest_import(first));
        assert!(state.is_latest_import(second));
        Ok(())
    }
}
