//! Fixed catalog of suspicious content patterns.
//!
//! Operator-supplied free text (platform descriptions, announcement
//! banners, template configs) is matched against four categories of
//! scam phrasing. Matching is case-insensitive substring search; each
//! catalog entry counts at most once per scan regardless of how many of
//! its needles occur.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of a suspicious pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternCategory {
    /// "Guaranteed returns" style promises.
    GuaranteedReturns,
    /// Credential / seed-phrase phishing phrasing.
    Phishing,
    /// Known link-shortener domains hiding destinations.
    LinkShortener,
    /// Pyramid / ponzi recruitment phrasing.
    PyramidScheme,
}

impl fmt::Display for PatternCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GuaranteedReturns => write!(f, "GUARANTEED_RETURNS"),
            Self::Phishing => write!(f, "PHISHING"),
            Self::LinkShortener => write!(f, "LINK_SHORTENER"),
            Self::PyramidScheme => write!(f, "PYRAMID_SCHEME"),
        }
    }
}

/// One catalog entry: a stable id, a category, and lowercase needles.
#[derive(Debug, Clone, Copy)]
pub struct SuspiciousPattern {
    pub id: &'static str,
    pub category: PatternCategory,
    pub needles: &'static [&'static str],
}

/// The fixed pattern catalog. Needles must be lowercase — scanning
/// lowercases the content once and does substring search.
pub const PATTERN_CATALOG: &[SuspiciousPattern] = &[
    SuspiciousPattern {
        id: "guaranteed-returns",
        category: PatternCategory::GuaranteedReturns,
        needles: &[
            "guaranteed returns",
            "guaranteed profit",
            "risk-free returns",
            "cannot lose",
            "100% returns",
        ],
    },
    SuspiciousPattern {
        id: "phishing-credentials",
        category: PatternCategory::Phishing,
        needles: &[
            "verify your seed phrase",
            "confirm your private key",
            "enter your recovery phrase",
            "wallet validation required",
        ],
    },
    SuspiciousPattern {
        id: "link-shortener",
        category: PatternCategory::LinkShortener,
        needles: &["bit.ly/", "tinyurl.com/", "t.co/", "goo.gl/", "cutt.ly/"],
    },
    SuspiciousPattern {
        id: "pyramid-recruitment",
        category: PatternCategory::PyramidScheme,
        needles: &[
            "ponzi",
            "pyramid",
            "recruit new members",
            "grow your downline",
            "referral levels",
        ],
    },
];

/// Scan free text against the catalog. Returns the ids of matched
/// patterns, each at most once, in catalog order.
#[must_use]
pub fn scan(content: &str) -> Vec<&'static str> {
    let haystack = content.to_lowercase();
    PATTERN_CATALOG
        .iter()
        .filter(|pattern| pattern.needles.iter().any(|n| haystack.contains(n)))
        .map(|pattern| pattern.id)
        .collect()
}
