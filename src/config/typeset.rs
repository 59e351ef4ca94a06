// Copyright (c) 2025 Qatex Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Qatex contributors

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_DEBOUNCE_MS: u64 = 100;

#[derive(Deserialize, Debug, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Typeset {
    pub debounce_ms: u64,
    pub retries: u8,

    /// External program invoked as the typeset call. Typesetting is
    /// left to the page itself when empty.
    pub command: Vec<String>,

    /// Render cache of the external program, cleared after a failed run.
    pub cache_dir: Option<String>,
}

impl Typeset {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for Typeset {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            retries: 1,
            command: vec![],
            cache_dir: None,
        }
    }
}
