//! Value types shared by several models

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Bilingual text (English + Amharic)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct LocalizedText {
    #[validate(length(min = 1, max = 200, message = "English name is required"))]
    pub en: String,
    #[validate(length(min = 1, max = 200, message = "Amharic name is required"))]
    pub am: String,
}

impl LocalizedText {
    pub fn new(en: impl Into<String>, am: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            am: am.into(),
        }
    }
}

/// Preparation station
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrepStation {
    /// 厨房
    #[default]
    Kitchen,
    /// 果汁吧
    Juicebar,
    /// 无需制作（饮料、成品）
    None,
}

impl PrepStation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kitchen => "kitchen",
            Self::Juicebar => "juicebar",
            Self::None => "none",
        }
    }
}

impl fmt::Display for PrepStation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
