/* src/server/engine/rust/src/region.rs */

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Content node identifier, as assigned by the CMS export.
pub type PageId = u64;

/// Value written into every completion flag cookie.
pub const COMPLETION_FLAG_VALUE: &str = "si";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
  #[error("unsupported language \"{0}\" (expected \"es\" or \"eu\")")]
  UnknownLanguage(String),
  #[error("invalid region key \"{0}\"")]
  InvalidRegionKey(String),
}

fn region_key_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9_-]*$").unwrap())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
  Es,
  Eu,
}

impl Language {
  pub const ALL: [Language; 2] = [Language::Es, Language::Eu];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Es => "es",
      Self::Eu => "eu",
    }
  }

  /// URL prefix that scopes a page tree to this language. Spanish is the site default.
  pub fn path_prefix(self) -> &'static str {
    match self {
      Self::Es => "",
      Self::Eu => "/eu",
    }
  }

  /// Root under which every region parent page of this language lives.
  pub fn virus_root(self) -> String {
    format!("{}/virus/", self.path_prefix())
  }
}

impl fmt::Display for Language {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Language {
  type Err = ParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim() {
      "es" => Ok(Self::Es),
      "eu" => Ok(Self::Eu),
      other => Err(ParseError::UnknownLanguage(other.to_string())),
    }
  }
}

/// A named zone with its own page hierarchy per language.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Region {
  pub key: String,
  pub language: Language,
}

impl Region {
  pub fn new(key: &str, language: Language) -> Result<Self, ParseError> {
    let key = key.trim();
    if !region_key_re().is_match(key) {
      return Err(ParseError::InvalidRegionKey(key.to_string()));
    }
    Ok(Self { key: key.to_string(), language })
  }

  pub fn parse(key: &str, language: &str) -> Result<Self, ParseError> {
    Self::new(key, language.parse()?)
  }

  /// Path of the region's parent page, e.g. `/virus/arga/` or `/eu/virus/arga/`.
  pub fn root_path(&self) -> String {
    format!("{}{}/", self.language.virus_root(), self.key)
  }

  /// Name of the cookie flagging this region as completed.
  pub fn completion_cookie(&self) -> String {
    match self.language {
      Language::Es => format!("{}_completado", self.key),
      Language::Eu => format!("{}_eu_completado", self.key),
    }
  }

  /// Inverse of [`Region::completion_cookie`].
  pub fn from_completion_cookie(name: &str) -> Option<Self> {
    let stem = name.strip_suffix("_completado")?;
    match stem.strip_suffix("_eu") {
      Some(key) => Self::new(key, Language::Eu).ok(),
      None => Self::new(stem, Language::Es).ok(),
    }
  }
}

impl fmt::Display for Region {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.key, self.language)
  }
}
