//! Shader keyword groups
//!
//! Shadow features are toggled through mutually exclusive keyword groups.
//! Selecting an entry enables that keyword and disables the rest of the
//! group; selecting nothing disables the whole group.

use serde::{Serialize, Deserialize};

/// A set of mutually exclusive shader keywords
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeywordGroup {
    /// Group identifier for logging
    pub name: &'static str,
    /// Keywords in selection order
    pub keywords: &'static [&'static str],
}

/// PCF kernel for directional shadows (3x3, 5x5, 7x7)
pub const DIRECTIONAL_FILTER: KeywordGroup = KeywordGroup {
    name: "directional_filter",
    keywords: &["_DIRECTIONAL_PCF3", "_DIRECTIONAL_PCF5", "_DIRECTIONAL_PCF7"],
};

/// PCF kernel for spot and point shadows
pub const OTHER_FILTER: KeywordGroup = KeywordGroup {
    name: "other_filter",
    keywords: &["_OTHER_PCF3", "_OTHER_PCF5", "_OTHER_PCF7"],
};

/// Cascade transition style
pub const CASCADE_BLEND: KeywordGroup = KeywordGroup {
    name: "cascade_blend",
    keywords: &["_CASCADE_BLEND_SOFT", "_CASCADE_BLEND_DITHER"],
};

/// Baked shadow mask mode
pub const SHADOW_MASK: KeywordGroup = KeywordGroup {
    name: "shadow_mask",
    keywords: &["_SHADOW_MASK_ALWAYS", "_SHADOW_MASK_DISTANCE"],
};

impl KeywordGroup {
    /// Keyword states with only `enabled` switched on
    ///
    /// An out of range index behaves like `None`.
    pub fn select(&self, enabled: Option<usize>) -> Vec<KeywordState> {
        if let Some(index) = enabled {
            if index >= self.keywords.len() {
                log::warn!(
                    "Keyword index {} out of range for group '{}'",
                    index, self.name
                );
            }
        }

        self.keywords
            .iter()
            .enumerate()
            .map(|(i, keyword)| KeywordState {
                keyword: (*keyword).to_string(),
                enabled: enabled == Some(i),
            })
            .collect()
    }

    /// Check whether a keyword belongs to this group
    pub fn contains(&self, keyword: &str) -> bool {
        self.keywords.contains(&keyword)
    }
}

/// Enable or disable one global shader keyword
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeywordState {
    /// Keyword name
    pub keyword: String,
    /// Whether it is enabled
    pub enabled: bool,
}

impl KeywordState {
    /// Enabled keyword
    pub fn enable(keyword: impl Into<String>) -> Self {
        Self { keyword: keyword.into(), enabled: true }
    }

    /// Disabled keyword
    pub fn disable(keyword: impl Into<String>) -> Self {
        Self { keyword: keyword.into(), enabled: false }
    }

    /// Preprocessor line for shader variant generation
    pub fn to_directive(&self) -> Option<String> {
        self.enabled.then(|| format!("#define {}", self.keyword))
    }
}
