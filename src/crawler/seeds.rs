//! Seed categories of the knowledge base, partitioned by main group
//!
//! Adding a main group means adding its seed list here and its category
//! identifiers to `classify::CATEGORY_ID_GROUPS`.

use super::classify::MainGroup;

/// Seed category URLs belonging to one main group
#[derive(Debug, Clone, Copy)]
pub struct SeedGroup {
    /// Group the categories are filed under
    pub group: MainGroup,

    /// Category listing URLs, in crawl order
    pub urls: &'static [&'static str],

    /// Release-note category of the group, crawled after every manual
    pub release_notes: &'static str,
}

const BACKOFFICE_SEEDS: &[&str] = &[
    // Basiswissen
    "https://knowledge.cowis.net/category/21/basiswissen.html",
    // Handbuch
    "https://knowledge.cowis.net/category/23/1&period-einf&uumlhrung.html",
    "https://knowledge.cowis.net/category/24/2&period-adressen.html",
    "https://knowledge.cowis.net/category/25/3&period-artikel.html",
    "https://knowledge.cowis.net/category/26/4&period-wareneingang.html",
    "https://knowledge.cowis.net/category/27/5&period-retoure.html",
    "https://knowledge.cowis.net/category/28/6&period-order.html",
    "https://knowledge.cowis.net/category/29/7&period-auftragsbearbeitung.html",
    "https://knowledge.cowis.net/category/30/8&period-zahlungen.html",
    "https://knowledge.cowis.net/category/31/9&period-auswertungen.html",
    "https://knowledge.cowis.net/category/32/10&period-inventur.html",
    "https://knowledge.cowis.net/category/33/11&period-edi.html",
    "https://knowledge.cowis.net/category/34/12&period-kassenabschl&uumlsse.html",
    "https://knowledge.cowis.net/category/35/13&period-etikettendruck.html",
    "https://knowledge.cowis.net/category/47/14&period-einstellungen.html",
    // Schnittstellen
    "https://knowledge.cowis.net/category/46/e_commerce.html",
    "https://knowledge.cowis.net/category/50/edi.html",
    "https://knowledge.cowis.net/category/52/fibu.html",
    "https://knowledge.cowis.net/category/53/stammdatenimport_export.html",
    "https://knowledge.cowis.net/category/48/systemvoraussetzungen.html",
];

const POS_SEEDS: &[&str] = &[
    "https://knowledge.cowis.net/category/37/handbuch.html",
    "https://knowledge.cowis.net/category/49/systemvoraussetzungen.html",
];

const WEBSHOP_SEEDS: &[&str] = &[
    "https://knowledge.cowis.net/category/17/gutscheinverwaltung.html",
];

/// All seed groups in crawl order
pub const SEED_GROUPS: &[SeedGroup] = &[
    SeedGroup {
        group: MainGroup::Backoffice,
        urls: BACKOFFICE_SEEDS,
        release_notes: "https://knowledge.cowis.net/category/42/ddd-cowis-backoffice.html",
    },
    SeedGroup {
        group: MainGroup::Pos,
        urls: POS_SEEDS,
        release_notes: "https://knowledge.cowis.net/category/43/ddd-cowis-pos.html",
    },
    SeedGroup {
        group: MainGroup::Webshop,
        urls: WEBSHOP_SEEDS,
        release_notes: "https://knowledge.cowis.net/category/44/ddd-cowis-webshop.html",
    },
];

/// Seed URLs of one main group, release notes included
pub fn seeds_for(group: MainGroup) -> Vec<&'static str> {
    SEED_GROUPS
        .iter()
        .filter(|seeds| seeds.group == group)
        .flat_map(|seeds| seeds.urls.iter().copied().chain([seeds.release_notes]))
        .collect()
}

/// Every seed URL in crawl order
///
/// Manuals group by group first, then the release-note categories. An
/// article linked from both is therefore filed under its manual.
pub fn all_seed_urls() -> Vec<String> {
    let manuals = SEED_GROUPS.iter().flat_map(|seeds| seeds.urls.iter().copied());
    let release_notes = SEED_GROUPS.iter().map(|seeds| seeds.release_notes);
    manuals.chain(release_notes).map(str::to_string).collect()
}
