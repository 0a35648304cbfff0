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
use crate::import::Source;
use crate::study::Command;

/// Replace the stored deck with the deck read from `source`.
pub async fn import_deck(directory: Option<String>, source: &str) -> Fallible<()> {
    let mut coll = Collection::open(directory)?;
    let text = Source::parse(source)?.read().await?;
    let changes = coll.state.apply(Command::Import(text), &mut rand::rng())?;
    coll.persist(changes)?;
    let snapshot = coll.state.snapshot();
    println!(
        "Imported {} cards in {} categories.",
        snapshot.deck_size,
        snapshot.categories.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;

    #[tokio::test]
    async fn test_import_is_persisted() -> Fallible<()> {
        let data = tempdir()?;
        let decks = tempdir()?;
        let path = decks.path().join("spanish.deck");
        write(&path, "**Deck: Spanish\n*Spanish|English\nhola|hello\nadios|bye\n")?;
        let directory = Some(data.path().display().to_string());
        import_deck(directory.clone(), &path.display().to_string()).await?;
        let coll = Collection::open(directory)?;
        assert_eq!(coll.state.deck().len(), 2);
        assert_eq!(coll.state.title(), Some("Spanish"));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_import_keeps_deck() -> Fallible<()> {
        let data = tempdir()?;
        let decks = tempdir()?;
        let good = decks.path().join("good.deck");
        let bad = decks.path().join("bad.deck");
        write(&good, "uno|one\n")?;
        write(&bad, "no cards\n")?;
        let directory = Some(data.path().display().to_string());
        import_deck(directory.clone(), &good.display().to_string()).await?;
        assert!(
            import_deck(directory.clone(), &bad.display().to_string())
                .await
                .is_err()
        );
        let coll = Collection::open(directory)?;
        assert_eq!(coll.state.deck().len(), 1);
        Ok(())
    }
}
