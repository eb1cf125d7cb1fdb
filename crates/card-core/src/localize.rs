//! Message catalogs and locale handling.
//!
//! Language packs are nested JSON objects addressed by dotted keys
//! (`validation.ssid.missing`). Lookups fall back from the requested locale to
//! its base language, then to English, then to the key itself.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde_json::Value;
use tracing::warn;

use crate::error::Translatable;

/// Locale used when nothing else is configured.
pub const DEFAULT_LOCALE: &str = "en";

const BUILTIN_PACKS: &[(&str, &str)] = &[
    ("en", include_str!("../languages/en.json")),
    ("de", include_str!("../languages/de.json")),
];

static BUILTIN: LazyLock<Catalog> = LazyLock::new(Catalog::builtin);

/// Turns message keys into display text.
pub trait Translator: Send + Sync {
    /// Look up `key` for `locale` and substitute `{name}` placeholders.
    fn translate(&self, key: &str, args: &[(String, String)], locale: Option<&str>) -> String;

    fn localize(&self, message: &Translatable, locale: Option<&str>) -> String {
        self.translate(&message.key, &message.args, locale)
    }
}

/// JSON-backed message catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    packs: HashMap<String, Value>,
    fallback: String,
}

impl Catalog {
    /// An empty catalog; every lookup yields the key.
    pub fn empty() -> Self {
        Self {
            packs: HashMap::new(),
            fallback: DEFAULT_LOCALE.to_string(),
        }
    }

    /// Catalog with the language packs shipped in this crate.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for (locale, json) in BUILTIN_PACKS {
            if let Err(e) = catalog.add_pack(locale, json) {
                warn!(locale, error = %e, "Skipping malformed language pack");
            }
        }
        catalog
    }

    /// Shared instance of [`Catalog::builtin`].
    pub fn shared() -> &'static Catalog {
        &BUILTIN
    }

    /// Add or replace the pack for `locale`.
    pub fn add_pack(&mut self, locale: &str, json: &str) -> Result<(), serde_json::Error> {
        let pack: Value = serde_json::from_str(json)?;
        let locale = normalize_locale(locale).unwrap_or_else(|| locale.to_string());
        self.packs.insert(locale, pack);
        Ok(())
    }

    pub fn has_locale(&self, locale: &str) -> bool {
        self.packs.contains_key(locale)
    }

    fn lookup(&self, locale: &str, key: &str) -> Option<&str> {
        let mut node = self.packs.get(locale)?;
        for part in key.split('.') {
            node = node.get(part)?;
        }
        node.as_str()
    }

    /// Candidate locales in lookup order, without duplicates.
    fn chain(&self, locale: Option<&str>) -> Vec<String> {
        let mut chain: Vec<String> = Vec::with_capacity(3);
        if let Some(locale) = locale.and_then(normalize_locale) {
            let base = locale.split_once('-').map(|(base, _)| base.to_string());
            chain.push(locale);
            chain.extend(base);
        }
        if !chain.contains(&self.fallback) {
            chain.push(self.fallback.clone());
        }
        chain
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Translator for Catalog {
    fn translate(&self, key: &str, args: &[(String, String)], locale: Option<&str>) -> String {
        let template = self
            .chain(locale)
            .iter()
            .find_map(|candidate| self.lookup(candidate, key))
            .unwrap_or(key);
        interpolate(template, args)
    }
}

/// Substitute `{name}` placeholders in one left-to-right pass. Substituted
/// values are never scanned again; unknown placeholders are kept verbatim.
fn interpolate(template: &str, args: &[(String, String)]) -> String {
    let mut text = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        text.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            args.iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| (value, close))
        });
        match value {
            Some((value, close)) => {
                text.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                text.push('{');
                rest = after;
            }
        }
    }
    text.push_str(rest);
    text
}

/// Pick the locale for a card: its own `language`, then the host's, then the
/// default.
pub fn resolve_locale(config_language: Option<&str>, host_locale: Option<&str>) -> String {
    config_language
        .and_then(normalize_locale)
        .or_else(|| host_locale.and_then(normalize_locale))
        .unwrap_or_else(|| DEFAULT_LOCALE.to_string())
}

/// Normalize a locale tag: `de_DE.UTF-8` becomes `de-DE`, `C`/`POSIX` become
/// `en`. Returns `None` for blank input.
pub fn normalize_locale(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let raw = raw.split('@').next().unwrap_or(raw);
    let raw = raw.split('.').next().unwrap_or(raw).trim();
    if raw.is_empty() {
        return None;
    }
    if raw.eq_ignore_ascii_case("c") || raw.eq_ignore_ascii_case("posix") {
        return Some(DEFAULT_LOCALE.to_string());
    }
    Some(raw.replace('_', "-"))
}
