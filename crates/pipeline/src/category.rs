//! The closed set of blog categories and best-effort matching of model output
//! onto it.

use serde::{Deserialize, Serialize};

/// One of the six blog categories, or the [`Category::Uncategorized`] fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    KCulturePalaces,
    StreetFoodNightMarkets,
    MountainsRiceTerraces,
    BeachesBaysIslands,
    CityVibesNightlife,
    BudgetHacksTransport,
    /// The classifier output matched nothing. A valid terminal category.
    Uncategorized,
}

impl Category {
    /// The six assignable categories, in matching priority order.
    pub const ASSIGNABLE: [Category; 6] = [
        Category::KCulturePalaces,
        Category::StreetFoodNightMarkets,
        Category::MountainsRiceTerraces,
        Category::BeachesBaysIslands,
        Category::CityVibesNightlife,
        Category::BudgetHacksTransport,
    ];

    /// Display label, exactly as written to frontmatter.
    pub fn label(self) -> &'static str {
        match self {
            Self::KCulturePalaces => "K-Culture & Palaces",
            Self::StreetFoodNightMarkets => "Street Food & Night Markets",
            Self::MountainsRiceTerraces => "Mountains & Rice Terraces",
            Self::BeachesBaysIslands => "Beaches, Bays & Islands",
            Self::CityVibesNightlife => "City Vibes & Night-life",
            Self::BudgetHacksTransport => "Budget Hacks & Transport",
            Self::Uncategorized => "Uncategorized",
        }
    }

    /// Maps free-form classifier output onto a category.
    ///
    /// Tries an exact label match first, then looks for the first word of each
    /// label inside the output, then gives up with [`Category::Uncategorized`].
    pub fn from_model_output(output: &str) -> Self {
        let cleaned = output
            .trim()
            .trim_end_matches('.')
            .trim_matches(|c| c == '"' || c == '\'' || c == '`')
            .trim_end_matches('.')
            .trim();

        if let Some(exact) = Self::ASSIGNABLE.into_iter().find(|c| c.label() == cleaned) {
            return exact;
        }

        let lowered = cleaned.to_lowercase();
        Self::ASSIGNABLE
            .into_iter()
            .find(|c| lowered.contains(&c.lead_word()))
            .unwrap_or(Self::Uncategorized)
    }

    fn lead_word(self) -> String {
        self.label()
            .split(' ')
            .next()
            .unwrap_or_default()
            .trim_end_matches(|c: char| c.is_ascii_punctuation())
            .to_lowercase()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
