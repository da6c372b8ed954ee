//! The three kinds of upstream entity mirrored into the local store.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::Error;

/// An entity kind. Each kind has its own upstream collection, its own table
/// and its own natural-key space.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
  Launch,
  Rocket,
  Launchpad,
}

impl EntityKind {
  /// Every kind, in the order a full sync visits them: launches reference
  /// rockets and launchpads, so those go first.
  pub const ALL: [EntityKind; 3] =
    [EntityKind::Rocket, EntityKind::Launchpad, EntityKind::Launch];

  /// Plural collection name, used both in upstream paths and API routes.
  pub fn collection(self) -> &'static str {
    match self {
      Self::Launch => "launches",
      Self::Rocket => "rockets",
      Self::Launchpad => "launchpads",
    }
  }

  /// Parse a plural collection name (`"launches"`, ...).
  pub fn from_collection(s: &str) -> Result<Self, Error> {
    Self::ALL
      .into_iter()
      .find(|k| k.collection() == s)
      .ok_or_else(|| Error::UnknownEntityKind(s.to_owned()))
  }

  /// Major version of the upstream API serving this collection.
  pub fn api_version(self) -> u8 {
    match self {
      Self::Launch => 5,
      Self::Rocket | Self::Launchpad => 4,
    }
  }
}
