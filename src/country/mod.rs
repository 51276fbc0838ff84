// src/country/mod.rs

pub mod vocab;

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, warn};

/// Canonical names plus a normalized-key lookup covering names and aliases.
struct Vocabulary {
    canonical: HashSet<&'static str>,
    aliases: HashSet<String>,
    lookup: HashMap<String, &'static str>,
}

static VOCABULARY: Lazy<Vocabulary> = Lazy::new(|| {
    let canonical: HashSet<&'static str> = vocab::CANONICAL_NAMES.iter().copied().collect();
    let mut lookup: HashMap<String, &'static str> = canonical
        .iter()
        .map(|name| (normalize(name), *name))
        .collect();
    let mut aliases = HashSet::new();
    for (alias, target) in vocab::ALIASES {
        let key = normalize(alias);
        aliases.insert(key.clone());
        lookup.entry(key).or_insert(*target);
    }
    Vocabulary {
        canonical,
        aliases,
        lookup,
    }
});

/// Case-fold, unify apostrophes and collapse internal whitespace.
fn normalize(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('\u{2019}', "'")
        .to_lowercase()
}

/// A record whose country field goes through resolution.
pub trait HasCountry {
    fn raw_country(&self) -> Option<&str>;
    fn set_country(&mut self, canonical: &str);
}

/// Maps raw country strings onto the canonical vocabulary.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountryResolver {
    accept_aliases: bool,
}

impl CountryResolver {
    pub fn new(accept_aliases: bool) -> Self {
        Self { accept_aliases }
    }

    /// Resolve one raw value. `None` means the row must be discarded.
    pub fn resolve(&self, raw: Option<&str>) -> Option<&'static str> {
        let trimmed = raw?.trim();
        if trimmed.is_empty() {
            return None;
        }

        let vocab = &*VOCABULARY;
        let key = normalize(trimmed);
        let admitted = vocab.canonical.contains(trimmed)
            || (self.accept_aliases && vocab.aliases.contains(&key));
        if !admitted {
            return None;
        }

        vocab.lookup.get(&key).copied()
    }

    pub fn is_canonical(name: &str) -> bool {
        VOCABULARY.canonical.contains(name)
    }

    /// Keep only rows whose country resolves, rewriting them to the canonical name.
    pub fn filter<R: HasCountry>(&self, source: &str, rows: Vec<R>) -> (Vec<R>, ResolutionReport) {
        let mut report = ResolutionReport::new(source);
        let mut kept = Vec::with_capacity(rows.len());

        for mut row in rows {
            match self.resolve(row.raw_country()) {
                Some(name) => {
                    row.set_country(name);
                    report.resolved += 1;
                    kept.push(row);
                }
                None => {
                    let raw = row.raw_country().map(str::trim).unwrap_or("").to_string();
                    *report.unresolved.entry(raw).or_default() += 1;
                    report.dropped += 1;
                }
            }
        }

        report.log();
        (kept, report)
    }
}

/// Audit of one source's resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolutionReport {
    pub source: String,
    pub resolved: usize,
    pub dropped: usize,
    /// Distinct unresolved raw names and how often each occurred.
    pub unresolved: BTreeMap<String, usize>,
}

impl ResolutionReport {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            ..Default::default()
        }
    }

    fn log(&self) {
        if self.dropped == 0 {
            info!(source = %self.source, resolved = self.resolved, "all country names resolved");
            return;
        }
        warn!(
            source = %self.source,
            resolved = self.resolved,
            dropped = self.dropped,
            distinct = self.unresolved.len(),
            "dropped rows with unresolvable country names"
        );
        for (name, count) in &self.unresolved {
            debug!(source = %self.source, name = %name, count, "unresolved country");
        }
    }
}
