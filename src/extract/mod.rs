pub mod rules;
pub mod target;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;

use crate::error::{Error, Result};

pub use rules::{PatternRule, RuleTable, RULES};
pub use target::{extract_target_info, TargetInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierCategory {
    Email,
    Twitter,
    Instagram,
    Facebook,
    Tiktok,
    Discord,
    Telegram,
    Website,
    Phone,
    Linkedin,
    Youtube,
    Reddit,
    Twitch,
    Snapchat,
    Pinterest,
    Github,
}

const ALL_CATEGORIES: [IdentifierCategory; 16] = [
    IdentifierCategory::Email,
    IdentifierCategory::Twitter,
    IdentifierCategory::Instagram,
    IdentifierCategory::Facebook,
    IdentifierCategory::Tiktok,
    IdentifierCategory::Discord,
    IdentifierCategory::Telegram,
    IdentifierCategory::Website,
    IdentifierCategory::Phone,
    IdentifierCategory::Linkedin,
    IdentifierCategory::Youtube,
    IdentifierCategory::Reddit,
    IdentifierCategory::Twitch,
    IdentifierCategory::Snapchat,
    IdentifierCategory::Pinterest,
    IdentifierCategory::Github,
];

impl IdentifierCategory {
    pub fn all() -> &'static [IdentifierCategory] {
        &ALL_CATEGORIES
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IdentifierCategory::Email => "email",
            IdentifierCategory::Twitter => "twitter",
            IdentifierCategory::Instagram => "instagram",
            IdentifierCategory::Facebook => "facebook",
            IdentifierCategory::Tiktok => "tiktok",
            IdentifierCategory::Discord => "discord",
            IdentifierCategory::Telegram => "telegram",
            IdentifierCategory::Website => "website",
            IdentifierCategory::Phone => "phone",
            IdentifierCategory::Linkedin => "linkedin",
            IdentifierCategory::Youtube => "youtube",
            IdentifierCategory::Reddit => "reddit",
            IdentifierCategory::Twitch => "twitch",
            IdentifierCategory::Snapchat => "snapchat",
            IdentifierCategory::Pinterest => "pinterest",
            IdentifierCategory::Github => "github",
        }
    }

    /// Case-insensitive lookup by category name.
    pub fn from_name(value: &str) -> Option<Self> {
        let lowered = value.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|category| category.as_str() == lowered)
    }
}

impl FromStr for IdentifierCategory {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        Self::from_name(value)
            .ok_or_else(|| Error::InvalidInput(format!("unknown category: {}", value.trim())))
    }
}

/// Category to matches, always holding all sixteen categories. Matches are
/// trimmed, non-empty and unique within a category, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<IdentifierCategory, Vec<String>>",
    into = "BTreeMap<IdentifierCategory, Vec<String>>"
)]
pub struct IdentifierSet {
    entries: BTreeMap<IdentifierCategory, Vec<String>>,
}

impl Default for IdentifierSet {
    fn default() -> Self {
        let entries = IdentifierCategory::all()
            .iter()
            .map(|category| (*category, Vec::new()))
            .collect();
        Self { entries }
    }
}

impl From<BTreeMap<IdentifierCategory, Vec<String>>> for IdentifierSet {
    fn from(map: BTreeMap<IdentifierCategory, Vec<String>>) -> Self {
        let mut set = IdentifierSet::default();
        for (category, values) in map {
            set.insert_all(category, values.iter().map(String::as_str));
        }
        set
    }
}

impl From<IdentifierSet> for BTreeMap<IdentifierCategory, Vec<String>> {
    fn from(set: IdentifierSet) -> Self {
        set.entries
    }
}

impl IdentifierSet {
    pub fn get(&self, category: IdentifierCategory) -> &[String] {
        self.entries
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn first(&self, category: IdentifierCategory) -> Option<&str> {
        self.get(category).first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (IdentifierCategory, &[String])> {
        self.entries
            .iter()
            .map(|(category, values)| (*category, values.as_slice()))
    }

    pub fn total(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    fn insert_all<'a>(&mut self, category: IdentifierCategory, candidates: impl IntoIterator<Item = &'a str>) {
        let values = self.entries.entry(category).or_default();
        let mut seen: HashSet<String> = values.iter().cloned().collect();
        for candidate in candidates {
            let trimmed = candidate.trim();
            if trimmed.is_empty() || seen.contains(trimmed) {
                continue;
            }
            seen.insert(trimmed.to_string());
            values.push(trimmed.to_string());
        }
    }
}

/// Pulls contact handles and profile references out of free text.
///
/// Never fails: text without matches yields an empty list for every category.
/// Comparison is case-sensitive and `@handle` is never merged with the URL
/// form of the same profile. The `website` category deliberately overlaps
/// with the platform-specific ones.
pub fn extract(text: &str) -> IdentifierSet {
    let mut set = IdentifierSet::default();
    if text.is_empty() {
        return set;
    }
    for (category, rules) in RULES.iter() {
        for rule in rules {
            set.insert_all(category, rule.candidates(text));
        }
    }
    set
}

/// Extracts a single category, running only that category's rules.
pub fn extract_category(text: &str, category: IdentifierCategory) -> Vec<String> {
    let mut set = IdentifierSet::default();
    for rule in RULES.rules_for(category) {
        set.insert_all(category, rule.candidates(text));
    }
    set.get(category).to_vec()
}
