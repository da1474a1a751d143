//! License data and SPDX expression handling.
//!
//! Uses the `spdx` crate in lax mode so common non-standard spellings
//! ("Apache2", "MIT/X11") still count as recognized expressions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A license attached to a package: SPDX expression or free text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct License {
    /// The raw license identifier or expression
    pub identifier: String,
    /// Whether the identifier parsed as a recognized SPDX expression
    pub is_valid_spdx: bool,
    /// Human-readable name, when the source format provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// URL of the license text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl License {
    /// Create a license and classify it against the SPDX grammar.
    pub fn new(identifier: impl Into<String>) -> Self {
        let identifier = identifier.into().trim().to_string();
        let is_valid_spdx = Self::validate_spdx(&identifier);
        Self {
            identifier,
            is_valid_spdx,
            name: None,
            url: None,
        }
    }

    /// Attach a human-readable name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach a license text URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Returns true for the SPDX placeholders that mean "no information".
    #[must_use]
    pub fn is_placeholder(value: &str) -> bool {
        let value = value.trim();
        value.is_empty()
            || value.eq_ignore_ascii_case("NOASSERTION")
            || value.eq_ignore_ascii_case("NONE")
    }

    /// Check whether any term of the expression is a copyleft license.
    #[must_use]
    pub fn is_copyleft(&self) -> bool {
        spdx::Expression::parse_mode(&self.identifier, spdx::ParseMode::LAX).map_or_else(
            |_| {
                let lower = self.identifier.to_lowercase();
                lower.contains("gpl") || lower.contains("mpl") || lower.contains("eupl")
            },
            |expr| {
                expr.requirements().any(|req| {
                    if let spdx::LicenseItem::Spdx { id, .. } = req.req.license {
                        id.is_copyleft()
                    } else {
                        false
                    }
                })
            },
        )
    }

    fn validate_spdx(expr: &str) -> bool {
        if expr.contains("NOASSERTION") || expr.contains("NONE") || Self::is_placeholder(expr) {
            return false;
        }
        spdx::Expression::parse_mode(expr, spdx::ParseMode::LAX).is_ok()
    }
}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier)
    }
}
