//! X-axis category inference for resolved series.
//!
//! The presentation layer titles the x-axis with a human-readable category
//! name inferred from the series labels. Matching is first-match-wins over
//! a fixed priority order — no scoring:
//!
//! Product → Month → Region → Category → Status, defaulting to Category.
//!
//! Each pattern is evaluated against the lowercased first label and, as a
//! fallback, every other label.

use std::fmt;

use crate::types::Series;

/// Human-readable x-axis category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisCategory {
    /// Product names (laptops, smartphones, ...)
    Product,
    /// Calendar months
    Month,
    /// Geographic regions
    Region,
    /// Generic domain categories (the default)
    Category,
    /// Inventory or workflow status labels
    Status,
}

impl AxisCategory {
    /// Display name used as the x-axis title.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AxisCategory::Product => "Product",
            AxisCategory::Month => "Month",
            AxisCategory::Region => "Region",
            AxisCategory::Category => "Category",
            AxisCategory::Status => "Status",
        }
    }
}

impl fmt::Display for AxisCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Substrings identifying product labels.
const PRODUCT_PATTERNS: &[&str] = &[
    "product",
    "laptop",
    "smartphone",
    "phone",
    "headphone",
    "smartwatch",
    "tablet",
];

/// Month names and three-letter abbreviations, matched as whole tokens so
/// that e.g. "margin" does not match "mar".
const MONTH_TOKENS: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    "january", "february", "march", "april", "june", "july", "august", "september", "october",
    "november", "december",
];

/// Substrings identifying geographic region labels.
const REGION_PATTERNS: &[&str] = &["north", "south", "east", "west", "region"];

/// Substrings identifying generic category labels.
const CATEGORY_PATTERNS: &[&str] = &[
    "category",
    "electronics",
    "clothing",
    "groceries",
    "goods",
    "quality",
    "support",
    "delivery",
    "pricing",
];

/// Substrings identifying status labels ("Optimal", "Low-stock", ...).
const STATUS_PATTERNS: &[&str] = &["optimal", "stock", "status", "active", "inactive"];

/// Infer the x-axis category for a series from its labels.
///
/// Returns [`AxisCategory::Category`] when no pattern matches.
#[must_use]
pub fn classify(series: &Series) -> AxisCategory {
    let labels: Vec<String> = series
        .points
        .iter()
        .map(|p| p.label.to_lowercase())
        .collect();

    let candidates = [
        AxisCategory::Product,
        AxisCategory::Month,
        AxisCategory::Region,
        AxisCategory::Category,
        AxisCategory::Status,
    ];

    for category in candidates {
        // First point's label is authoritative; any other label is a fallback.
        if labels.iter().any(|label| matches(category, label)) {
            return category;
        }
    }
    AxisCategory::Category
}

fn matches(category: AxisCategory, label: &str) -> bool {
    match category {
        AxisCategory::Product => contains_any(label, PRODUCT_PATTERNS),
        AxisCategory::Month => label
            .split(|c: char| !c.is_alphanumeric())
            .any(|token| MONTH_TOKENS.contains(&token)),
        AxisCategory::Region => contains_any(label, REGION_PATTERNS),
        AxisCategory::Category => contains_any(label, CATEGORY_PATTERNS),
        AxisCategory::Status => contains_any(label, STATUS_PATTERNS),
    }
}

fn contains_any(label: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| label.contains(p))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::DataPoint;

    fn series_of(labels: &[&str]) -> Series {
        Series::new(
            labels
                .iter()
                .map(|l| DataPoint::new(*l, 1.0).unwrap())
                .collect(),
            "value",
        )
    }

    #[test]
    fn test_months() {
        assert_eq!(classify(&series_of(&["Jan", "Feb", "Mar"])), AxisCategory::Month);
        assert_eq!(classify(&series_of(&["January", "February"])), AxisCategory::Month);
    }

    #[test]
    fn test_month_token_does_not_match_inside_words() {
        // "Margin" contains "mar" but is not a month
        assert_eq!(classify(&series_of(&["Margin A", "Margin B"])), AxisCategory::Category);
    }

    #[test]
    fn test_regions() {
        assert_eq!(classify(&series_of(&["North", "South"])), AxisCategory::Region);
        assert_eq!(classify(&series_of(&["Region 1", "Region 2"])), AxisCategory::Region);
    }

    #[test]
    fn test_products() {
        assert_eq!(
            classify(&series_of(&["Laptop", "Smartphone", "Tablet"])),
            AxisCategory::Product
        );
    }

    #[test]
    fn test_status() {
        assert_eq!(
            classify(&series_of(&["Optimal", "Low-stock", "Overstocked"])),
            AxisCategory::Status
        );
    }

    #[test]
    fn test_category_domain_nouns() {
        assert_eq!(
            classify(&series_of(&["Electronics", "Clothing", "Groceries"])),
            AxisCategory::Category
        );
    }

    #[test]
    fn test_default_is_category() {
        assert_eq!(classify(&series_of(&["Widget X"])), AxisCategory::Category);
    }

    #[test]
    fn test_product_beats_month_in_priority_order() {
        // Both patterns present: Product is checked first
        assert_eq!(
            classify(&series_of(&["Laptop", "Jan"])),
            AxisCategory::Product
        );
    }

    #[test]
    fn test_fallback_to_any_label() {
        // First label carries no signal; the second does
        assert_eq!(
            classify(&series_of(&["Zone A", "North Zone"])),
            AxisCategory::Region
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(AxisCategory::Month.to_string(), "Month");
        assert_eq!(AxisCategory::Category.as_str(), "Category");
    }
}
