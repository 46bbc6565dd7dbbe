//! Display-unit formatting for metric values.
//!
//! Maps a series' free-form `data_type` tag (case-insensitive) to a y-axis
//! title and a value renderer:
//!
//! - `revenue` / `sales` / `profit` → currency with thousands separators
//! - `margin` → percent suffix
//! - everything else → plain grouped number, capitalized tag as the title
//!
//! Missing values render as an explicit `"N/A"` marker — never `"0"` or an
//! empty string — while an actual zero renders as a correct zero.

/// Marker rendered for absent values.
const NOT_AVAILABLE: &str = "N/A";

/// Display unit for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Currency,
    Percent,
    Plain,
}

/// Resolved display formatting for a data-type tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricFormat {
    tag: String,
    unit: Unit,
}

impl MetricFormat {
    /// Resolve the formatting for a data-type tag (case-insensitive).
    #[must_use]
    pub fn for_data_type(tag: &str) -> Self {
        let normalized = tag.trim().to_lowercase();
        let unit = match normalized.as_str() {
            "revenue" | "sales" | "profit" => Unit::Currency,
            "margin" => Unit::Percent,
            _ => Unit::Plain,
        };
        Self {
            tag: normalized,
            unit,
        }
    }

    /// Y-axis title: the capitalized tag, with a unit suffix where one
    /// applies (`"Revenue ($)"`, `"Margin (%)"`, `"Score"`).
    #[must_use]
    pub fn axis_title(&self) -> String {
        let capitalized = capitalize(&self.tag);
        match self.unit {
            Unit::Currency => format!("{capitalized} ($)"),
            Unit::Percent => format!("{capitalized} (%)"),
            Unit::Plain => capitalized,
        }
    }

    /// Render a value for display. `None` renders as `"N/A"`.
    #[must_use]
    pub fn format(&self, value: Option<f64>) -> String {
        let Some(value) = value else {
            return NOT_AVAILABLE.to_string();
        };
        match self.unit {
            Unit::Currency => format!("${}", group_thousands(value)),
            Unit::Percent => format!("{}%", group_thousands(value)),
            Unit::Plain => group_thousands(value),
        }
    }
}

/// Capitalize the first character of a tag (`"revenue"` → `"Revenue"`).
fn capitalize(tag: &str) -> String {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Render a number with comma thousands separators, keeping up to two
/// fractional digits and trimming trailing zeros (`1200` → `"1,200"`,
/// `4.5` → `"4.5"`).
fn group_thousands(value: f64) -> String {
    let negative = value < 0.0;
    let rounded = (value.abs() * 100.0).round() / 100.0;

    // Past 2^53 an f64 carries no fractional part and a u64 cast would
    // saturate, so take the digits from the formatted value instead.
    let (digits, fraction) = if rounded >= (1u64 << 53) as f64 {
        (format!("{rounded:.0}"), 0)
    } else {
        let integer = rounded.trunc() as u64;
        let fraction = ((rounded - rounded.trunc()) * 100.0).round() as u64;
        (integer.to_string(), fraction)
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let mut out = String::new();
    if negative && (fraction > 0 || digits.bytes().any(|b| b != b'0')) {
        out.push('-');
    }
    out.push_str(&grouped);
    if fraction > 0 {
        if fraction % 10 == 0 {
            out.push_str(&format!(".{}", fraction / 10));
        } else {
            out.push_str(&format!(".{fraction:02}"));
        }
    }
    out
}
