//! The three upstream providers.

use std::fmt;

use serde::Serialize;

/// One of the independent transit data sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Rail,
    Bus,
    Bike,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Rail, Source::Bus, Source::Bike];

    pub fn name(self) -> &'static str {
        match self {
            Source::Rail => "rail",
            Source::Bus => "bus",
            Source::Bike => "bike",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
