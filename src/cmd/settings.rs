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
use crate::settings::SessionMode;
use crate::settings::Settings;
use crate::study::Command;

/// Requested edits. `None` leaves a setting as it is.
#[derive(Default)]
pub struct SettingsEdit {
    pub temperature: Option<f64>,
    pub session_size: Option<usize>,
    pub speech_rate: Option<f64>,
    pub mode: Option<SessionMode>,
    pub reset: bool,
}

impl SettingsEdit {
    /// Reset first, then the individual edits.
    fn commands(self) -> Vec<Command> {
        let mut commands = Vec::new();
        if self.reset {
            commands.push(Command::ResetSettings);
        }
        if let Some(temperature) = self.temperature {
            commands.push(Command::SetTemperature(temperature));
        }
        if let Some(size) = self.session_size {
            commands.push(Command::SetSessionSize(size));
        }
        if let Some(rate) = self.speech_rate {
            commands.push(Command::SetSpeechRate(rate));
        }
        if let Some(mode) = self.mode {
            commands.push(Command::SetMode(mode));
        }
        commands
    }
}

/// Apply the edits, save them, and print the resulting settings.
pub fn edit_settings(directory: Option<String>, edit: SettingsEdit) -> Fallible<()> {
    let mut coll = Collection::open(directory)?;
    let mut rng = rand::rng();
    for command in edit.commands() {
        let changes = coll.state.apply(command, &mut rng)?;
        coll.persist(changes)?;
    }
    print!("{}", render_settings(coll.state.settings()));
    Ok(())
}

fn render_settings(settings: &Settings) -> String {
    let size = match settings.session_size() {
        0 => "all".to_string(),
        n => n.to_string(),
    };
    format!(
        "temperature:  {:.2}\nsession size: {size}\nspeech rate:  {:.1}\nmode:         {}\n",
        settings.temperature(),
        settings.speech_rate(),
        settings.mode()
    )
}
