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

use std::path::Path;

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::types::timestamp::Timestamp;

pub const DATABASE_FILE_NAME: &str = "flashdeck.db";

/// Well-known keys.
pub mod keys {
    pub const DECK: &str = "masterDeck";
    pub const SETTINGS: &str = "flashcardSettings";
    pub const CATEGORIES: &str = "activeCategories";
    pub const TITLE: &str = "deckTitle";
}

/// A key-value store of JSON documents, backed by SQLite.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(directory: &Path) -> Fallible<Self> {
        let path = directory.join(DATABASE_FILE_NAME);
        let path = path
            .to_str()
            .ok_or_else(|| ErrorReport::new("invalid path"))?;
        Self::init(Connection::open(path)?)
    }

    #[cfg(test)]
    pub fn in_memory() -> Fallible<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(mut conn: Connection) -> Fallible<Self> {
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        Ok(Self { conn })
    }

    /// Serialize `value` and store it under `key`, replacing any prior value.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Fallible<()> {
        let json = serde_json::to_string(value)?;
        let sql = "insert into entries (key, value, saved_at) values (?, ?, ?) on conflict (key) do update set value = excluded.value, saved_at = excluded.saved_at;";
        self.conn
            .execute(sql, (key, &json, Timestamp::now().into_rfc3339()))?;
        log::debug!("Saved {key} ({} bytes).", json.len());
        Ok(())
    }

    /// Load the value stored under `key`. A key that was never saved, or
    /// whose value no longer decodes, yields `None`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Fallible<Option<T>> {
        let sql = "select value from entries where key = ?;";
        let json: Option<String> = self
            .conn
            .query_row(sql, [key], |row| row.get(0))
            .optional()?;
        let Some(json) = json else {
            return Ok(None);
        };
        match serde_json::from_str(&json) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                log::warn!("Ignoring undecodable value for {key}: {e}");
                Ok(None)
            }
        }
    }

    pub fn remove(&self, key: &str) -> Fallible<()> {
        self.conn
            .execute("delete from entries where key = ?;", [key])?;
        Ok(())
    }

    /// When the value under `key` was last saved.
    pub fn saved_at(&self, key: &str) -> Fallible<Option<Timestamp>> {
        let sql = "select saved_at from entries where key = ?;";
        let saved_at: Option<String> = self
            .conn
            .query_row(sql, [key], |row| row.get(0))
            .optional()?;
        Ok(saved_at.and_then(|s| Timestamp::from_rfc3339(&s)))
    }
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["entries"], |row| row.get(0))?;
    Ok(count > 0)
}
