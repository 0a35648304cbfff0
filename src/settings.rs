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
use serde::Deserialize;
use serde::Serialize;

use crate::config::Config;

/// How the next card of a session is chosen.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionMode {
    /// A fixed list sampled without replacement, walked with next/previous.
    #[default]
    Batch,
    /// Every "next" is a fresh weighted draw from the session pool.
    Streaming,
}

impl Display for SessionMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionMode::Batch => write!(f, "batch"),
            SessionMode::Streaming => write!(f, "streaming"),
        }
    }
}

/// User-tunable study settings. Every setter clamps to the configured bounds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    temperature: f64,
    /// Zero means "the whole filtered pool".
    session_size: usize,
    speech_rate: f64,
    #[serde(default)]
    mode: SessionMode,
}

impl Settings {
    pub fn new(config: &Config) -> Self {
        Self {
            temperature: config.temperature.default,
            session_size: config.session_size.default.round() as usize,
            speech_rate: config.speech_rate.default,
            mode: SessionMode::default(),
        }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn session_size(&self) -> usize {
        self.session_size
    }

    pub fn speech_rate(&self) -> f64 {
        self.speech_rate
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn set_temperature(&mut self, value: f64, config: &Config) {
        self.temperature = clamped("temperature", value, config.temperature.clamp(value));
    }

    pub fn set_session_size(&mut self, value: usize, config: &Config) {
        let clamped_value = config.session_size.clamp(value as f64).round() as usize;
        self.session_size = clamped("session size", value, clamped_value);
    }

    pub fn set_speech_rate(&mut self, value: f64, config: &Config) {
        self.speech_rate = clamped("speech rate", value, config.speech_rate.clamp(value));
    }

    pub fn set_mode(&mut self, mode: SessionMode) {
        self.mode = mode;
    }

    pub fn step_temperature(&mut self, direction: i32, config: &Config) {
        self.temperature = config.temperature.step(self.temperature, direction);
    }

    pub fn step_session_size(&mut self, direction: i32, config: &Config) {
        let next = config
            .session_size
            .step(self.session_size as f64, direction)
            .round();
        self.session_size = next as usize;
    }

    pub fn step_speech_rate(&mut self, direction: i32, config: &Config) {
        self.speech_rate = config.speech_rate.step(self.speech_rate, direction);
    }

    /// Re-clamp every value, e.g. after loading settings saved under
    /// different bounds.
    pub fn sanitize(mut self, config: &Config) -> Self {
        self.temperature = config.temperature.clamp(self.temperature);
        self.session_size = config.session_size.clamp(self.session_size as f64).round() as usize;
        self.speech_rate = config.speech_rate.clamp(self.speech_rate);
        self
    }
}

fn clamped<T: PartialEq + Display + Copy>(name: &str, requested: T, actual: T) -> T {
    if requested != actual {
        log::info!("Clamped {name} from {requested} to {actual}.");
    }
    actual
}
