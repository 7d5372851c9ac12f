//! Main-group classification of categories
//!
//! Classification is total: a category that matches nothing is filed under
//! the default group instead of being rejected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::normalize::{category_id, normalize_url};
use super::seeds::seeds_for;

/// Top-level product grouping of the knowledge base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MainGroup {
    /// Back-office ERP manuals, interfaces and system requirements
    Backoffice,
    /// Point-of-sale manuals
    Pos,
    /// Webshop documentation
    Webshop,
}

impl MainGroup {
    /// Every main group, in persistence order
    pub const ALL: [MainGroup; 3] = [MainGroup::Backoffice, MainGroup::Pos, MainGroup::Webshop];

    /// Group used when nothing else matches
    pub const DEFAULT: MainGroup = MainGroup::Backoffice;

    /// Slug used in persisted records and directory names
    pub fn as_str(&self) -> &'static str {
        match self {
            MainGroup::Backoffice => "backoffice",
            MainGroup::Pos => "pos",
            MainGroup::Webshop => "webshop",
        }
    }
}

impl fmt::Display for MainGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MainGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MainGroup::ALL
            .into_iter()
            .find(|group| group.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown main group: {}", s))
    }
}

/// Category identifier → main group
///
/// 42, 43 and 44 are the per-product release-note categories.
pub const CATEGORY_ID_GROUPS: &[(u32, MainGroup)] = &[
    (42, MainGroup::Backoffice),
    (43, MainGroup::Pos),
    (44, MainGroup::Webshop),
    (37, MainGroup::Pos),
    (49, MainGroup::Pos),
    (15, MainGroup::Webshop),
    (17, MainGroup::Webshop),
    (21, MainGroup::Backoffice),
    (23, MainGroup::Backoffice),
    (24, MainGroup::Backoffice),
    (25, MainGroup::Backoffice),
    (26, MainGroup::Backoffice),
    (27, MainGroup::Backoffice),
    (28, MainGroup::Backoffice),
    (29, MainGroup::Backoffice),
    (30, MainGroup::Backoffice),
    (31, MainGroup::Backoffice),
    (32, MainGroup::Backoffice),
    (33, MainGroup::Backoffice),
    (34, MainGroup::Backoffice),
    (35, MainGroup::Backoffice),
    (46, MainGroup::Backoffice),
    (47, MainGroup::Backoffice),
    (48, MainGroup::Backoffice),
    (50, MainGroup::Backoffice),
    (52, MainGroup::Backoffice),
    (53, MainGroup::Backoffice),
];

/// Order in which the seed lists are compared against a URL
const SEED_MATCH_ORDER: [MainGroup; 3] = [MainGroup::Pos, MainGroup::Webshop, MainGroup::Backoffice];

/// Maps category URLs to their main group
///
/// Lookups run from most to least specific: the numeric category id, then an
/// exact match against each group's seed URLs, then the default group.
#[derive(Debug, Clone)]
pub struct Classifier {
    id_groups: Vec<(u32, MainGroup)>,
    seed_groups: Vec<(MainGroup, Vec<String>)>,
}

impl Default for Classifier {
    fn default() -> Self {
        let seed_groups = SEED_MATCH_ORDER
            .into_iter()
            .map(|group| {
                let urls = seeds_for(group).iter().map(|url| url.to_string()).collect();
                (group, urls)
            })
            .collect();
        Self::new(CATEGORY_ID_GROUPS.to_vec(), seed_groups)
    }
}

impl Classifier {
    /// Create a classifier from explicit lookup tables
    ///
    /// Seed URLs are normalized here so lookups compare canonical forms.
    pub fn new(id_groups: Vec<(u32, MainGroup)>, seed_groups: Vec<(MainGroup, Vec<String>)>) -> Self {
        let seed_groups = seed_groups
            .into_iter()
            .map(|(group, urls)| (group, urls.iter().map(|url| normalize_url(url)).collect()))
            .collect();
        Self {
            id_groups,
            seed_groups,
        }
    }

    /// Resolve the main group of a category or article URL
    pub fn classify(&self, url: &str) -> MainGroup {
        let normalized = normalize_url(url);

        if let Some(id) = category_id(&normalized) {
            if let Some((_, group)) = self.id_groups.iter().find(|(known, _)| *known == id) {
                return *group;
            }
        }

        self.seed_groups
            .iter()
            .find(|(_, urls)| urls.iter().any(|seed| *seed == normalized))
            .map(|(group, _)| *group)
            .unwrap_or(MainGroup::DEFAULT)
    }
}
