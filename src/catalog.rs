//! Static education catalog: levels, years, subjects, subscription plans.
//!
//! The catalog is built once at startup, shared behind an `Arc`, and never
//! mutated. Every collection is an ordered `Vec` — insertion order drives
//! menu presentation order, so nothing here may be sorted or hashed.

/// A school year within an education level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Year {
    /// Stable key used in callback tokens ("1".."5")
    pub key: &'static str,
    /// Display label shown in menus
    pub name: &'static str,
}

/// An education level (primary / middle / high) with its ordered years.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    pub key: &'static str,
    pub name: &'static str,
    pub years: Vec<Year>,
}

impl Level {
    /// Looks up a year by its key, preserving no assumptions about numbering.
    pub fn year(&self, key: &str) -> Option<&Year> {
        self.years.iter().find(|y| y.key == key)
    }
}

/// A teachable subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub key: &'static str,
    pub name: &'static str,
}

/// A subscription plan with its price in DZD (whole dinars).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub key: &'static str,
    pub name: &'static str,
    pub price_da: i64,
    pub features: Vec<&'static str>,
}

/// Read-only reference data for the whole platform.
#[derive(Debug, Clone)]
pub struct Catalog {
    levels: Vec<Level>,
    subjects: Vec<Subject>,
    plans: Vec<Plan>,
}

impl Catalog {
    /// Builds the Algerian school catalog: 5 primary years, 4 middle years
    /// (BEM), 3 high-school years (BAC), six subjects, two plans.
    pub fn algerian() -> Self {
        Self {
            levels: vec![
                Level {
                    key: "primary",
                    name: "📖 Primary school",
                    years: vec![
                        Year { key: "1", name: "Year 1 — Primary" },
                        Year { key: "2", name: "Year 2 — Primary" },
                        Year { key: "3", name: "Year 3 — Primary" },
                        Year { key: "4", name: "Year 4 — Primary" },
                        Year { key: "5", name: "Year 5 — Primary" },
                    ],
                },
                Level {
                    key: "middle",
                    name: "📐 Middle school",
                    years: vec![
                        Year { key: "1", name: "Year 1 — Middle" },
                        Year { key: "2", name: "Year 2 — Middle" },
                        Year { key: "3", name: "Year 3 — Middle" },
                        Year { key: "4", name: "Year 4 — Middle (BEM)" },
                    ],
                },
                Level {
                    key: "high",
                    name: "🎓 High school",
                    years: vec![
                        Year { key: "1", name: "Year 1 — High school" },
                        Year { key: "2", name: "Year 2 — High school" },
                        Year { key: "3", name: "Year 3 — High school (BAC)" },
                    ],
                },
            ],
            subjects: vec![
                Subject { key: "math", name: "🔢 Mathematics" },
                Subject { key: "physics", name: "⚛️ Physics" },
                Subject { key: "arabic", name: "📚 Arabic" },
                Subject { key: "french", name: "🇫🇷 French" },
                Subject { key: "english", name: "🇬🇧 English" },
                Subject { key: "islamic", name: "☪️ Islamic education" },
            ],
            plans: vec![
                Plan {
                    key: "monthly",
                    name: "Monthly",
                    price_da: 990,
                    features: vec!["All video lessons", "All levels and years", "Cancel any time"],
                },
                Plan {
                    key: "yearly",
                    name: "Yearly",
                    price_da: 1990,
                    features: vec!["All video lessons", "All levels and years", "Exam prep packs", "2 months free"],
                },
            ],
        }
    }

    pub fn level(&self, key: &str) -> Option<&Level> {
        self.levels.iter().find(|l| l.key == key)
    }

    /// Resolves a (level, year) pair; `None` if either part is unknown.
    pub fn year(&self, level: &str, year: &str) -> Option<&Year> {
        self.level(level)?.year(year)
    }

    pub fn subject(&self, key: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.key == key)
    }

    pub fn plan(&self, key: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.key == key)
    }

    /// Levels in presentation order.
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Subjects in presentation order.
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    /// Plans in presentation order.
    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn levels_keep_insertion_order() {
        let catalog = Catalog::algerian();
        let keys: Vec<&str> = catalog.levels().iter().map(|l| l.key).collect();
        assert_eq!(keys, vec!["primary", "middle", "high"]);
    }

    #[test]
    fn years_per_level_match_the_algerian_system() {
        let catalog = Catalog::algerian();
        assert_eq!(catalog.level("primary").unwrap().years.len(), 5);
        assert_eq!(catalog.level("middle").unwrap().years.len(), 4);
        assert_eq!(catalog.level("high").unwrap().years.len(), 3);
    }

    #[test]
    fn year_lookup_rejects_out_of_range_years() {
        let catalog = Catalog::algerian();
        assert!(catalog.year("primary", "3").is_some());
        // Primary school has no year 9
        assert!(catalog.year("primary", "9").is_none());
        assert!(catalog.year("nowhere", "1").is_none());
    }

    #[test]
    fn subjects_keep_insertion_order() {
        let catalog = Catalog::algerian();
        let keys: Vec<&str> = catalog.subjects().iter().map(|s| s.key).collect();
        assert_eq!(keys, vec!["math", "physics", "arabic", "french", "english", "islamic"]);
    }

    #[test]
    fn plan_prices_match_the_published_rates() {
        let catalog = Catalog::algerian();
        assert_eq!(catalog.plan("monthly").unwrap().price_da, 990);
        assert_eq!(catalog.plan("yearly").unwrap().price_da, 1990);
        assert!(catalog.plan("lifetime").is_none());
    }
}
