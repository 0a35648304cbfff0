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

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::de::IgnoredAny;

use crate::config::Bounds;
use crate::sampler::Weighted;
use crate::types::card_id::CardId;

pub const DEFAULT_FRONT_LABEL: &str = "Front";
pub const DEFAULT_BACK_LABEL: &str = "Back";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    id: CardId,
    /// The category shown on the front face, e.g. "Spanish".
    front_label: String,
    /// The category shown on the back face, e.g. "English".
    back_label: String,
    front_text: String,
    back_text: String,
    /// Signed sampling bias. Higher means the card is drawn more often.
    #[serde(default, deserialize_with = "lenient_factor")]
    frequency_factor: f64,
}

impl Card {
    pub fn new(
        id: CardId,
        front_label: impl Into<String>,
        back_label: impl Into<String>,
        front_text: impl Into<String>,
        back_text: impl Into<String>,
    ) -> Self {
        Self {
            id,
            front_label: front_label.into(),
            back_label: back_label.into(),
            front_text: front_text.into().trim().to_string(),
            back_text: back_text.into().trim().to_string(),
            frequency_factor: 0.0,
        }
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn front_label(&self) -> &str {
        &self.front_label
    }

    pub fn back_label(&self) -> &str {
        &self.back_label
    }

    pub fn front_text(&self) -> &str {
        &self.front_text
    }

    pub fn back_text(&self) -> &str {
        &self.back_text
    }

    pub fn frequency_factor(&self) -> f64 {
        self.frequency_factor
    }

    /// A card is valid iff both faces have text.
    pub fn is_valid(&self) -> bool {
        !self.front_text.trim().is_empty() && !self.back_text.trim().is_empty()
    }

    /// Add `delta` to the frequency factor, clamped to `bounds`. Returns the
    /// new value.
    pub fn adjust_frequency(&mut self, delta: f64, bounds: &Bounds) -> f64 {
        let current = if self.frequency_factor.is_finite() {
            self.frequency_factor
        } else {
            bounds.default
        };
        self.frequency_factor = bounds.clamp(current + delta);
        self.frequency_factor
    }

    /// Reset the frequency factor to the configured default.
    pub fn reset_frequency(&mut self, bounds: &Bounds) {
        self.frequency_factor = bounds.default;
    }

    /// Pull the frequency factor back into `bounds`, e.g. after the bounds
    /// were narrowed.
    pub fn clamp_frequency(&mut self, bounds: &Bounds) {
        self.frequency_factor = bounds.clamp(self.frequency_factor);
    }

    /// Case-insensitive substring match over both faces and both labels.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [
            &self.front_text,
            &self.back_text,
            &self.front_label,
            &self.back_label,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

impl Weighted for Card {
    fn frequency_factor(&self) -> f64 {
        self.frequency_factor
    }
}

/// Accept any JSON value for the frequency factor: numbers are kept, anything
/// else becomes zero.
fn lenient_factor<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Number(f64),
        Other(IgnoredAny),
    }
    Ok(match Lenient::deserialize(deserializer)? {
        Lenient::Number(n) if n.is_finite() => n,
        _ => 0.0,
    })
}
