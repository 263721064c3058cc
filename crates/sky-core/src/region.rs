use serde::{Deserialize, Serialize};

/// Per-region record count, used only to populate selection controls.
///
/// Not authoritative: it goes stale as soon as a new record fetch lands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSummary {
    #[serde(alias = "state")]
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "sighting_count")]
    pub count: u64,
}

impl RegionSummary {
    /// Display name, falling back to the code.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.code)
    }

    /// Selector label: `"New Mexico (1,204)"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ({})", self.display_name(), group_thousands(self.count))
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
