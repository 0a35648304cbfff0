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

use serde::Deserialize;
use serde::Serialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::sampler::MIN_TEMPERATURE;

pub const CONFIG_FILE_NAME: &str = "flashdeck.toml";

/// A bounded numeric parameter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
    /// The step used by +/- adjustments.
    pub delta: f64,
    pub default: f64,
}

impl Bounds {
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.default;
        }
        value.clamp(self.min, self.max)
    }

    /// Move `direction` steps from `value`, then clamp.
    pub fn step(&self, value: f64, direction: i32) -> f64 {
        self.clamp(value + f64::from(direction) * self.delta)
    }

    fn validate(&self, name: &str) -> Fallible<()> {
        if !(self.delta > 0.0) {
            return fail(format!("{name}: delta must be > 0."));
        }
        if !(self.max - self.min > self.delta) {
            return fail(format!("{name}: max - min must be greater than delta."));
        }
        if !(self.min <= self.default && self.default <= self.max) {
            return fail(format!("{name}: default must lie between min and max."));
        }
        Ok(())
    }
}

/// Bounds for every tunable parameter. Loaded from `flashdeck.toml` in the
/// data directory; missing tables fall back to the built-in defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub frequency: Bounds,
    pub temperature: Bounds,
    pub session_size: Bounds,
    pub speech_rate: Bounds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frequency: Bounds {
                min: -9.0,
                max: 9.0,
                delta: 1.0,
                default: 0.0,
            },
            temperature: Bounds {
                min: 0.1,
                max: 10.0,
                delta: 0.1,
                default: 1.0,
            },
            session_size: Bounds {
                min: 0.0,
                max: 1000.0,
                delta: 1.0,
                default: 0.0,
            },
            speech_rate: Bounds {
                min: 0.5,
                max: 2.0,
                delta: 0.1,
                default: 1.0,
            },
        }
    }
}

impl Config {
    pub fn from_toml(source: &str) -> Fallible<Self> {
        let config: Config = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read `flashdeck.toml` from `directory`, or use the defaults if there
    /// is none.
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join(CONFIG_FILE_NAME);
        if path.exists() {
            log::debug!("Loading configuration from {}.", path.display());
            let content = read_to_string(&path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Fallible<()> {
        self.frequency.validate("frequency")?;
        self.temperature.validate("temperature")?;
        self.session_size.validate("session_size")?;
        self.speech_rate.validate("speech_rate")?;
        if self.temperature.min < MIN_TEMPERATURE {
            return fail(format!(
                "temperature: min must be at least {MIN_TEMPERATURE}."
            ));
        }
        if self.session_size.min < 0.0 {
            return fail("session_size: min must not be negative.");
        }
        Ok(())
    }
}
