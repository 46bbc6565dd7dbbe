//! Canned analyses and query suggestions.
//!
//! A small set of common business questions resolve instantly from this
//! static table instead of going to the generation service. Lookup is
//! exact-match on the lowercased, trimmed query text — no fuzzy matching.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::types::{AnalysisResult, DataPoint, Series};

/// Suggested questions surfaced to the user for autocompletion.
pub const SUGGESTIONS: &[&str] = &[
    "Revenue by product category last quarter",
    "Customer acquisition cost over the last 4 months",
    "Sales performance comparison across regions",
    "Top 5 products with highest profit margins",
    "Inventory analysis: Overstocked vs. low-stock products",
    "Customer satisfaction breakdown by category",
    "Which region needs the most sales improvement?",
    "Which product category generated the most revenue?",
];

/// Filter the suggestion list by a case-insensitive substring.
///
/// An empty filter returns every suggestion.
#[must_use]
pub fn suggestions(filter: &str) -> Vec<&'static str> {
    let needle = filter.to_lowercase();
    SUGGESTIONS
        .iter()
        .filter(|s| s.to_lowercase().contains(&needle))
        .copied()
        .collect()
}

/// Look up a canned analysis by exact (case/whitespace-insensitive) match.
#[must_use]
pub fn lookup(query: &str) -> Option<AnalysisResult> {
    MOCK_ANALYSES.get(query.trim().to_lowercase().as_str()).cloned()
}

#[allow(clippy::expect_used)]
fn graph(
    points: &[(&str, f64)],
    data_type: &str,
    insights: &[&str],
) -> AnalysisResult {
    let series = Series::new(
        points
            .iter()
            .map(|(label, value)| {
                DataPoint::new(*label, *value).expect("mock data point is valid")
            })
            .collect(),
        data_type,
    );
    AnalysisResult::graph(series, insights.iter().map(|s| (*s).to_string()).collect())
        .expect("mock analysis is valid")
}

static MOCK_ANALYSES: LazyLock<HashMap<&'static str, AnalysisResult>> = LazyLock::new(|| {
    HashMap::from([
        (
            "revenue by product category last quarter",
            graph(
                &[
                    ("Electronics", 12000.0),
                    ("Clothing", 8000.0),
                    ("Home Goods", 5000.0),
                    ("Groceries", 7000.0),
                ],
                "revenue",
                &[
                    "Electronics generated the highest revenue at $12,000",
                    "Clothing performed well with $8,000 in revenue",
                    "Home Goods had the lowest revenue at $5,000",
                    "Groceries showed steady demand with $7,000 in sales",
                ],
            ),
        ),
        (
            "customer acquisition cost over the last 4 months",
            graph(
                &[
                    ("Jan", 200.0),
                    ("Feb", 180.0),
                    ("Mar", 190.0),
                    ("Apr", 210.0),
                ],
                "cac",
                &[
                    "February had the lowest CAC at $180",
                    "April saw the highest CAC at $210",
                    "Overall CAC trend fluctuates but remains within a $30 range",
                ],
            ),
        ),
        (
            "sales performance comparison across regions",
            graph(
                &[
                    ("North", 15000.0),
                    ("South", 10000.0),
                    ("East", 12000.0),
                    ("West", 13000.0),
                ],
                "sales",
                &[
                    "North region leads in sales with $15,000",
                    "South region needs improvement at $10,000",
                    "West and East regions are performing moderately well",
                ],
            ),
        ),
        (
            "top 5 products with highest profit margins",
            graph(
                &[
                    ("Laptop", 40.0),
                    ("Smartphone", 35.0),
                    ("Headphones", 30.0),
                    ("Smartwatch", 28.0),
                    ("Tablet", 25.0),
                ],
                "margin",
                &[
                    "Laptops have the highest margin at 40%",
                    "Smartphones follow with a 35% margin",
                    "Headphones, Smartwatches, and Tablets contribute solid margins between 25-30%",
                ],
            ),
        ),
        (
            // Stored lowercase so the normalized lookup can reach it
            "inventory analysis: overstocked vs. low-stock products",
            graph(
                &[
                    ("Optimal", 78.0),
                    ("Low-stock", 8.0),
                    ("Overstocked", 15.0),
                ],
                "count",
                &[
                    "Inventory levels are optimal for 78% of products",
                    "8 products are below safety stock levels",
                    "15 products are overstocked by more than 25%",
                ],
            ),
        ),
        (
            "customer satisfaction breakdown by category",
            graph(
                &[
                    ("Product Quality", 4.5),
                    ("Customer Support", 4.6),
                    ("Delivery Speed", 3.9),
                    ("Pricing", 4.2),
                ],
                "score",
                &[
                    "Customer Support received the highest rating at 4.6/5",
                    "Delivery Speed scored the lowest at 3.9/5",
                    "Overall satisfaction remains high across categories",
                ],
            ),
        ),
    ])
});

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::AnalysisKind;

    #[test]
    fn test_lookup_is_case_and_whitespace_insensitive() {
        let canonical = lookup("revenue by product category last quarter").unwrap();
        let variant = lookup("  Revenue By Product Category Last Quarter  ").unwrap();
        assert_eq!(canonical, variant);
    }

    #[test]
    fn test_lookup_is_exact_match_only() {
        assert!(lookup("revenue by product category").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn test_lookup_is_idempotent() {
        let first = lookup("sales performance comparison across regions").unwrap();
        let second = lookup("sales performance comparison across regions").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_every_canned_analysis_is_well_formed() {
        for (key, result) in MOCK_ANALYSES.iter() {
            assert!(result.is_well_formed(), "malformed mock analysis: {key}");
            assert_eq!(result.kind, AnalysisKind::Graph);
            assert!(!result.insights.is_empty(), "no insights for: {key}");
            // Keys must be reachable after query normalization
            assert_eq!(*key, key.trim().to_lowercase().as_str());
        }
    }

    #[test]
    fn test_mock_data_types() {
        let margins = lookup("top 5 products with highest profit margins").unwrap();
        assert_eq!(margins.series.unwrap().data_type, "margin");

        let inventory = lookup("inventory analysis: Overstocked vs. low-stock products").unwrap();
        assert_eq!(inventory.series.unwrap().data_type, "count");
    }

    #[test]
    fn test_suggestions_filter_case_insensitive() {
        let hits = suggestions("REVENUE");
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|s| s.to_lowercase().contains("revenue")));
    }

    #[test]
    fn test_suggestions_empty_filter_returns_all() {
        assert_eq!(suggestions("").len(), SUGGESTIONS.len());
    }

    #[test]
    fn test_suggestions_no_match() {
        assert!(suggestions("quarterly widget demand").is_empty());
    }
}
