//! Type tags and type sets.
//!
//! Apps declare what they accept and what they produce as sets of type tags.
//! Compatibility between two apps is a plain set intersection, with two
//! wildcard tags ([`SERIALISABLE`] and [`IDENTIFIER`]) that any downstream app
//! is assumed to be able to consume.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Tag for serialised payloads, accepted by any downstream app.
pub const SERIALISABLE: &str = "SerialisableType";

/// Tag for identifier-carrying payloads (paths, data store members),
/// accepted by any downstream app.
pub const IDENTIFIER: &str = "IdentifierType";

/// A single type identifier, e.g. `"SequenceCollection"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeTag(String);

impl TypeTag {
  pub fn new(tag: impl Into<String>) -> Self {
    Self(tag.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Whether this tag is one of the wildcard tags.
  pub fn is_wildcard(&self) -> bool {
    self.0 == SERIALISABLE || self.0 == IDENTIFIER
  }
}

impl fmt::Display for TypeTag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for TypeTag {
  fn from(tag: &str) -> Self {
    Self::new(tag)
  }
}

impl From<String> for TypeTag {
  fn from(tag: String) -> Self {
    Self(tag)
  }
}

/// An unordered collection of type tags. Duplicates collapse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeSet(BTreeSet<TypeTag>);

impl TypeSet {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, tag: impl Into<TypeTag>) -> bool {
    self.0.insert(tag.into())
  }

  pub fn contains(&self, tag: &str) -> bool {
    self.0.iter().any(|t| t.as_str() == tag)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = &TypeTag> {
    self.0.iter()
  }

  pub fn intersects(&self, other: &TypeSet) -> bool {
    !self.0.is_disjoint(&other.0)
  }

  pub fn intersection(&self, other: &TypeSet) -> TypeSet {
    TypeSet(self.0.intersection(&other.0).cloned().collect())
  }

  pub fn union(&self, other: &TypeSet) -> TypeSet {
    TypeSet(self.0.union(&other.0).cloned().collect())
  }

  /// Whether any tag in the set is a wildcard.
  pub fn has_wildcard(&self) -> bool {
    self.0.iter().any(TypeTag::is_wildcard)
  }

  /// Whether data produced with these tags can be fed to an app accepting
  /// `accepted`.
  pub fn feeds(&self, accepted: &TypeSet) -> bool {
    self.intersects(accepted) || self.has_wildcard()
  }
}

impl<T: Into<TypeTag>> FromIterator<T> for TypeSet {
  fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
    Self(iter.into_iter().map(Into::into).collect())
  }
}

impl fmt::Display for TypeSet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let names: Vec<&str> = self.0.iter().map(TypeTag::as_str).collect();
    f.write_str(&names.join(", "))
  }
}

/// Canonicalises type declarations into [`TypeSet`]s.
///
/// A declaration is a string such as `"SequenceCollection | Alignment"`,
/// `"Optional[Tree]"` or an alias like `"SeqsCollectionType"`. Aliases are
/// expanded into their member tags.
#[derive(Debug, Clone)]
pub struct TypeTags {
  aliases: HashMap<String, Vec<String>>,
}

impl Default for TypeTags {
  fn default() -> Self {
    let mut tags = Self::empty();
    tags.alias("SeqsCollectionType", ["SequenceCollection", "Alignment"]);
    tags.alias("AlignedSeqsType", ["Alignment"]);
    tags
  }
}

impl TypeTags {
  /// A tag registry with no aliases.
  pub fn empty() -> Self {
    Self {
      aliases: HashMap::new(),
    }
  }

  /// Register `name` as shorthand for `members`. Members may themselves be
  /// aliases.
  pub fn alias<I, S>(&mut self, name: &str, members: I) -> &mut Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self
      .aliases
      .insert(name.to_string(), members.into_iter().map(Into::into).collect());
    self
  }

  /// Parse and expand a declaration into its canonical set.
  pub fn canonical(&self, declaration: &str) -> TypeSet {
    let mut set = TypeSet::new();
    for part in split_union(declaration) {
      self.expand(part, &mut set, 0);
    }
    set
  }

  /// Canonicalise several declarations into a single set.
  pub fn canonical_all<'a>(&self, declarations: impl IntoIterator<Item = &'a str>) -> TypeSet {
    declarations
      .into_iter()
      .fold(TypeSet::new(), |acc, d| acc.union(&self.canonical(d)))
  }

  fn expand(&self, name: &str, set: &mut TypeSet, depth: usize) {
    // Alias chains are short; the bound only stops self-referencing aliases.
    match self.aliases.get(name) {
      Some(members) if depth < 8 => {
        for member in members {
          self.expand(member, set, depth + 1);
        }
      }
      _ => {
        set.insert(name);
      }
    }
  }
}

/// Split a declaration on top-level `|` and strip `Optional[..]` /
/// `Union[..]` wrappers. `None` members are dropped. Other bracketed types
/// such as `Dict[str, int]` are kept whole.
fn split_union(declaration: &str) -> Vec<&str> {
  let mut parts = Vec::new();
  let mut pending = vec![declaration.trim()];

  while let Some(decl) = pending.pop() {
    let members = split_top_level(decl, &['|']);
    if members.len() > 1 {
      pending.extend(members);
      continue;
    }
    if let Some(inner) = strip_wrapper(decl, "Optional").or_else(|| strip_wrapper(decl, "Union")) {
      pending.extend(split_top_level(inner, &[',', '|']));
      continue;
    }
    if !decl.is_empty() && decl != "None" {
      parts.push(decl);
    }
  }

  parts
}

/// Split on any of `separators` outside square brackets.
fn split_top_level<'a>(decl: &'a str, separators: &[char]) -> Vec<&'a str> {
  let mut parts = Vec::new();
  let mut depth = 0usize;
  let mut start = 0;

  for (i, c) in decl.char_indices() {
    match c {
      '[' => depth += 1,
      ']' => depth = depth.saturating_sub(1),
      c if depth == 0 && separators.contains(&c) => {
        parts.push(decl[start..i].trim());
        start = i + c.len_utf8();
      }
      _ => {}
    }
  }
  parts.push(decl[start..].trim());
  parts
}

fn strip_wrapper<'a>(decl: &'a str, wrapper: &str) -> Option<&'a str> {
  decl
    .strip_prefix(wrapper)?
    .trim_start()
    .strip_prefix('[')?
    .strip_suffix(']')
    .map(str::trim)
}

/// Rust types that carry a type tag, used by typed app declarations.
pub trait Tagged {
  fn type_tags() -> TypeSet;
}

macro_rules! tagged {
  ($tag:literal => $($ty:ty),+) => {
    $(
      impl Tagged for $ty {
        fn type_tags() -> TypeSet {
          [$tag].into_iter().collect()
        }
      }
    )+
  };
}

tagged!("int" => i8, i16, i32, i64, u8, u16, u32, u64, usize);
tagged!("float" => f32, f64);
tagged!("bool" => bool);
tagged!("str" => String);
tagged!("SerialisableType" => serde_json::Value);

impl<T> Tagged for Vec<T> {
  fn type_tags() -> TypeSet {
    ["list"].into_iter().collect()
  }
}
