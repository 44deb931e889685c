//! Province identifiers and metadata.
//!
//! Provinces are numbered densely in the order they were declared when the
//! board was built, so a `ProvinceId` doubles as an index into every
//! per-province table held by a `Game`.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::unit::UnitType;

/// Dense index of a province on its board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProvinceId(pub u16);

impl ProvinceId {
    /// Returns the id as a table index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Dense index of a participating nation on its board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NationId(pub u8);

impl NationId {
    /// Returns the id as a table index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Classifies a province by which unit types may stand on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Inland,
    Coastal,
    Water,
}

impl Terrain {
    /// Returns true if a unit of the given type may occupy this terrain.
    pub const fn supports(self, unit: UnitType) -> bool {
        !matches!(
            (self, unit),
            (Terrain::Water, UnitType::Army) | (Terrain::Inland, UnitType::Fleet)
        )
    }
}

/// A named coastline on a province with more than one coast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Coast {
    #[serde(rename = "NC")]
    North,
    #[serde(rename = "SC")]
    South,
    #[serde(rename = "EC")]
    East,
    #[serde(rename = "WC")]
    West,
}

impl Coast {
    /// Returns the 2-letter abbreviation.
    pub const fn abbr(self) -> &'static str {
        match self {
            Coast::North => "nc",
            Coast::South => "sc",
            Coast::East => "ec",
            Coast::West => "wc",
        }
    }

    /// Parses a coast from its abbreviation or compass name, ignoring case
    /// and punctuation ("NC", "n.c.", "north", "North Coast").
    pub fn parse(s: &str) -> Option<Coast> {
        let s = simplify(s);
        let s = s.strip_suffix("coast").unwrap_or(&s);
        match s {
            "nc" | "n" | "north" => Some(Coast::North),
            "sc" | "s" | "south" => Some(Coast::South),
            "ec" | "e" | "east" => Some(Coast::East),
            "wc" | "w" | "west" => Some(Coast::West),
            _ => None,
        }
    }
}

impl fmt::Display for Coast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbr())
    }
}

/// Static metadata for one province. Immutable once the board is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Province {
    pub(crate) name: String,
    pub(crate) abbreviations: Vec<String>,
    pub(crate) terrain: Terrain,
    pub(crate) coasts: Vec<Coast>,
    pub(crate) center: bool,
    pub(crate) home: Option<NationId>,
}

impl Province {
    /// Full display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Abbreviations, unique across the board ignoring case.
    pub fn abbreviations(&self) -> &[String] {
        &self.abbreviations
    }

    /// The first abbreviation, or the name when none were declared.
    pub fn abbr(&self) -> &str {
        self.abbreviations.first().map_or(&self.name, String::as_str)
    }

    pub fn terrain(&self) -> Terrain {
        self.terrain
    }

    /// Named coasts. Either empty (one continuous coast) or at least two.
    pub fn coasts(&self) -> &[Coast] {
        &self.coasts
    }

    pub fn has_coasts(&self) -> bool {
        !self.coasts.is_empty()
    }

    pub fn is_center(&self) -> bool {
        self.center
    }

    /// The nation this province is a home center of, if any.
    pub fn home(&self) -> Option<NationId> {
        self.home
    }

    pub(crate) fn has_abbreviation(&self, s: &str) -> bool {
        self.abbreviations.iter().any(|a| a.eq_ignore_ascii_case(s))
    }
}

/// Lowercases and drops everything except ASCII letters.
pub(crate) fn simplify(s: &str) -> String {
    s.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
