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

use std::fs::read_to_string;
use std::path::Path;
use std::path::PathBuf;

use tokio::fs;
use tokio::task::spawn_blocking;
use walkdir::WalkDir;

use crate::error::Fallible;
use crate::error::fail;

const DECK_EXTENSION: &str = "deck";

/// Where deck text comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// A single deck file.
    File(PathBuf),
    /// Every `.deck` file under a directory, in path order.
    Directory(PathBuf),
    /// An `http://` or `https://` URL.
    Url(String),
}

impl Source {
    pub fn parse(source: &str) -> Fallible<Self> {
        if source.starts_with("http://") || source.starts_with("https://") {
            return Ok(Source::Url(source.to_string()));
        }
        let path = PathBuf::from(source);
        if path.is_dir() {
            Ok(Source::Directory(path))
        } else if path.is_file() {
            Ok(Source::File(path))
        } else {
            fail(format!("no such file or directory: {source}"))
        }
    }

    /// Read the raw deck text. The directory walk runs on the blocking pool.
    pub async fn read(&self) -> Fallible<String> {
        match self {
            Source::File(path) => Ok(fs::read_to_string(path).await?),
            Source::Directory(path) => {
                let path = path.clone();
                spawn_blocking(move || read_directory(&path)).await?
            }
            Source::Url(url) => fetch_text(url).await,
        }
    }
}

fn read_directory(directory: &Path) -> Fallible<String> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(directory) {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == DECK_EXTENSION) {
            paths.push(path.to_path_buf());
        }
    }
    if paths.is_empty() {
        return fail(format!("no .deck files in {}.", directory.display()));
    }
    paths.sort();
    let mut text = String::new();
    for path in paths {
        log::debug!("Reading {}.", path.display());
        // A bare category marker resets the labels between files.
        text.push_str("*\n");
        text.push_str(&read_to_string(&path)?);
        text.push('\n');
    }
    Ok(text)
}

pub async fn fetch_text(url: &str) -> Fallible<String> {
    log::debug!("Fetching {url}.");
    let response = reqwest::get(url).await?.error_for_status()?;
    Ok(response.text().await?)
}

#[cfg(test)]
mod tests {
    use std::fs::create_dir_all;
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;
    use crate::parser::parse_deck;

    #[test]
    fn test_parse_source() -> Fallible<()> {
        let dir = tempdir()?;
        let file = dir.path().join("a.deck");
        write(&file, "a|b")?;
        assert_eq!(
            Source::parse("https://example.com/x.deck")?,
            Source::Url("https://example.com/x.deck".to_string())
        );
        assert_eq!(
            Source::parse(dir.path().to_str().unwrap())?,
            Source::Directory(dir.path().to_path_buf())
        );
        assert_eq!(Source::parse(file.to_str().unwrap())?, Source::File(file));
        assert!(Source::parse("./derpherp.deck").is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_read_file() -> Fallible<()> {
        let dir = tempdir()?;
        let file = dir.path().join("spanish.deck");
        write(&file, "*Spanish|English\nhola|hello\n")?;
        let text = Source::File(file).read().await?;
        let deck = parse_deck(&text)?;
        assert_eq!(deck.cards.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_read_directory() -> Fallible<()> {
        let dir = tempdir()?;
        create_dir_all(dir.path().join("nested"))?;
        write(dir.path().join("b.deck"), "*German|English\ndanke|thanks")?;
        write(dir.path().join("a.deck"), "*Spanish|English\nhola|hello")?;
        write(dir.path().join("nested/c.deck"), "uno|one")?;
        write(dir.path().join("notes.txt"), "ignored|file")?;
        let text = Source::Directory(dir.path().to_path_buf()).read().await?;
        let deck = parse_deck(&text)?;
        let fronts: Vec<&str> = deck.cards.iter().map(|c| c.front_text()).collect();
        assert_eq!(fronts, vec!["hola", "danke", "uno"]);
        assert_eq!(deck.cards[1].front_label(), "German");
        assert_eq!(deck.cards[2].front_label(), "Front");
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_directory() -> Fallible<()> {
        let dir = tempdir()?;
        let result = Source::Directory(dir.path().to_path_buf()).read().await;
        assert!(result.is_err());
        Ok(())
    }
}
