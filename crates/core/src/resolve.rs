//! Key resolution strategies.
//!
//! Region keys arrive in several shapes: group ids (`istanbul`), display
//! names (`İstanbul`), lowercased names and ASCII spellings (`Sanliurfa` for
//! `Şanlıurfa`). A [`Resolver`] tries an ordered list of strategies and stops
//! at the first match.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::region::Region;
use crate::registry::RegionRegistry;

/// One way of matching a key against a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveStrategy {
    /// Key equals the region id byte for byte.
    ExactId,
    /// Trimmed, lowercased key equals the region id.
    NormalizedId,
    /// Key equals the display name, ignoring case.
    DisplayName,
    /// Key equals the lowercased display name.
    LowercaseName,
    /// Keys match once diacritics, case and punctuation are folded away.
    DiacriticFold,
}

/// Ordered strategy list; first match wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolver {
    strategies: Vec<ResolveStrategy>,
}

impl Resolver {
    pub fn new(strategies: Vec<ResolveStrategy>) -> Self {
        Self { strategies }
    }

    /// Chain used when an external key must find its region (painting).
    pub fn paint() -> Self {
        Self::new(vec![
            ResolveStrategy::NormalizedId,
            ResolveStrategy::DisplayName,
            ResolveStrategy::DiacriticFold,
        ])
    }

    /// Chain used when a region must find its value in an attribute map
    /// (counts, colors, radii).
    pub fn attribute() -> Self {
        Self::new(vec![
            ResolveStrategy::ExactId,
            ResolveStrategy::DisplayName,
            ResolveStrategy::LowercaseName,
            ResolveStrategy::DiacriticFold,
        ])
    }

    pub fn strategies(&self) -> &[ResolveStrategy] {
        &self.strategies
    }

    /// Find the region named by `key`.
    pub fn resolve<'r>(&self, registry: &'r RegionRegistry, key: &str) -> Option<&'r Region> {
        self.resolve_with(registry, key).map(|(r, _)| r)
    }

    /// Like [`Resolver::resolve`], also reporting which strategy matched.
    pub fn resolve_with<'r>(
        &self,
        registry: &'r RegionRegistry,
        key: &str,
    ) -> Option<(&'r Region, ResolveStrategy)> {
        self.strategies.iter().find_map(|&s| {
            let found = match s {
                ResolveStrategy::ExactId => registry.get(key),
                ResolveStrategy::NormalizedId => registry.get(&normalize_id(key)),
                ResolveStrategy::DisplayName => {
                    let wanted = key.trim().to_lowercase();
                    registry.iter().find(|r| r.display_name.to_lowercase() == wanted)
                }
                ResolveStrategy::LowercaseName => {
                    registry.iter().find(|r| r.display_name.to_lowercase() == key)
                }
                ResolveStrategy::DiacriticFold => {
                    let wanted = fold_key(key);
                    registry
                        .iter()
                        .find(|r| fold_key(&r.id) == wanted || fold_key(&r.display_name) == wanted)
                }
            };
            found.map(|r| (r, s))
        })
    }

    /// Find the value stored for a region in a map keyed by external names.
    pub fn lookup<'m, V>(&self, map: &'m HashMap<String, V>, id: &str, display_name: &str) -> Option<&'m V> {
        self.strategies.iter().find_map(|&s| match s {
            ResolveStrategy::ExactId => map.get(id),
            ResolveStrategy::NormalizedId => map
                .iter()
                .find(|(k, _)| normalize_id(k) == id)
                .map(|(_, v)| v),
            ResolveStrategy::DisplayName => map.get(display_name),
            ResolveStrategy::LowercaseName => map.get(&display_name.to_lowercase()),
            ResolveStrategy::DiacriticFold => {
                let by_name = fold_key(display_name);
                let by_id = fold_key(id);
                map.iter()
                    .find(|(k, _)| {
                        let k = fold_key(k);
                        k == by_name || k == by_id
                    })
                    .map(|(_, v)| v)
            }
        })
    }

    /// [`Resolver::lookup`] for a region.
    pub fn lookup_region<'m, V>(&self, map: &'m HashMap<String, V>, region: &Region) -> Option<&'m V> {
        self.lookup(map, &region.id, &region.display_name)
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::paint()
    }
}

/// Normalized region identifier: trimmed and lowercased.
pub fn normalize_id(key: &str) -> String {
    key.trim().to_lowercase()
}

/// Lowercase `s` and strip diacritics, folding Turkish letters to ASCII.
///
/// `fold_diacritics("Şanlıurfa") == "sanliurfa"`
pub fn fold_diacritics(s: &str) -> String {
    s.trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            'ı' => 'i',
            other => other,
        })
        .flat_map(char::to_lowercase)
        .collect()
}

/// Folded comparison key: [`fold_diacritics`] keeping only alphanumerics, so
/// `İstanbul - AVR` and `istanbul-avr` compare equal.
pub fn fold_key(s: &str) -> String {
    fold_diacritics(s).chars().filter(|c| c.is_alphanumeric()).collect()
}
