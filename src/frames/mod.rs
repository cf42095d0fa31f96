//! Frame labels and the precomputed frame keyword resource.

pub mod extract;

use std::{collections::BTreeMap, fmt, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::data::glossary::GlossaryVariant;

/// Dominant rhetorical frame assigned to an article by human annotators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FrameLabel {
    #[serde(rename = "ECON")]
    Econ,
    #[serde(rename = "DEVELOP")]
    Develop,
    #[serde(rename = "NATIONAL/INTERNATIONAL SECURITY")]
    Security,
    #[serde(rename = "ETHICAL/MORAL")]
    Ethical,
    #[serde(rename = "TECH")]
    Tech,
    #[serde(rename = "GOVERNANCE/INSTITUTIONAL")]
    Governance,
    #[serde(rename = "SCIENTIFIC")]
    Scientific,
    #[serde(rename = "COMMUNICATION")]
    Communication,
}

impl FrameLabel {
    pub const ALL: [FrameLabel; 8] = [
        Self::Econ,
        Self::Develop,
        Self::Security,
        Self::Ethical,
        Self::Tech,
        Self::Governance,
        Self::Scientific,
        Self::Communication,
    ];

    /// Map a master-table column code (`A_dominant_frame` .. `H_dominant_frame`).
    pub fn from_code(code: &str) -> Option<Self> {
        let label = match code.trim() {
            "A_dominant_frame" => Self::Econ,
            "B_dominant_frame" => Self::Develop,
            "C_dominant_frame" => Self::Security,
            "D_dominant_frame" => Self::Ethical,
            "E_dominant_frame" => Self::Tech,
            "F_dominant_frame" => Self::Governance,
            "G_dominant_frame" => Self::Scientific,
            "H_dominant_frame" => Self::Communication,
            _ => return None,
        };
        Some(label)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Econ => "ECON",
            Self::Develop => "DEVELOP",
            Self::Security => "NATIONAL/INTERNATIONAL SECURITY",
            Self::Ethical => "ETHICAL/MORAL",
            Self::Tech => "TECH",
            Self::Governance => "GOVERNANCE/INSTITUTIONAL",
            Self::Scientific => "SCIENTIFIC",
            Self::Communication => "COMMUNICATION",
        }
    }
}

impl fmt::Display for FrameLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of human-assigned frame labels. A miss is a normal outcome.
pub trait LabelSource: Send + Sync {
    fn label_for(&self, article_id: &str) -> Option<FrameLabel>;
}

impl LabelSource for std::collections::HashMap<String, FrameLabel> {
    fn label_for(&self, article_id: &str) -> Option<FrameLabel> {
        self.get(article_id).copied()
    }
}

/// Representative keywords of one frame and, optionally, their mean embedding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameKeywords {
    pub keywords: Vec<String>,
    /// Mean vector over keywords plus glossary; only used by the cosine criterion.
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

/// Offline-built keyword resource, read-only at ranking time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameKeywordSet {
    /// Glossary the stored embeddings were averaged with.
    #[serde(default)]
    pub glossary: Option<GlossaryVariant>,
    pub frames: BTreeMap<FrameLabel, FrameKeywords>,
}

impl FrameKeywordSet {
    pub fn get(&self, label: FrameLabel) -> Option<&FrameKeywords> {
        self.frames.get(&label)
    }

    /// Drop stored embeddings unless they were built with `variant`.
    ///
    /// Frames without an embedding are rebuilt from their keywords plus the
    /// run's glossary. Returns how many embeddings were dropped.
    pub fn retain_embeddings_for(&mut self, variant: GlossaryVariant) -> usize {
        if self.glossary == Some(variant) {
            return 0;
        }
        let dropped = self
            .frames
            .values_mut()
            .filter_map(|entry| entry.embedding.take())
            .count();
        if dropped > 0 {
            warn!(
                built_with = self.glossary.map_or("unknown", GlossaryVariant::as_str),
                run = variant.as_str(),
                dropped,
                "frame embeddings were built with another glossary; rebuilding from keywords"
            );
        }
        dropped
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read frame keywords {}", path.display()))?;
        let set: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parse frame keywords {}", path.display()))?;
        info!(path = %path.display(), frames = set.frames.len(), "loaded frame keywords");
        Ok(set)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
        info!(path = %path.display(), frames = self.frames.len(), "wrote frame keywords");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_labels() {
        assert_eq!(FrameLabel::from_code("A_dominant_frame"), Some(FrameLabel::Econ));
        assert_eq!(
            FrameLabel::from_code("F_dominant_frame"),
            Some(FrameLabel::Governance)
        );
        assert_eq!(FrameLabel::from_code("Z_dominant_frame"), None);
        assert_eq!(FrameLabel::from_code(""), None);
    }

    #[test]
    fn labels_serialize_as_display_names() {
        for label in FrameLabel::ALL {
            let json = serde_json::to_string(&label).unwrap();
            assert_eq!(json, format!("\"{label}\""));
        }
    }

    #[test]
    fn keyword_set_survives_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resources/frame_keywords.json");
        let mut set = FrameKeywordSet::default();
        set.frames.insert(
            FrameLabel::Scientific,
            FrameKeywords {
                keywords: vec!["ice".into(), "ocean".into()],
                embedding: None,
            },
        );
        set.save(&path).unwrap();
        let loaded = FrameKeywordSet::load(&path).unwrap();
        assert_eq!(loaded, set);
        assert!(loaded.get(FrameLabel::Econ).is_none());
    }

    fn embedded_set(glossary: Option<GlossaryVariant>) -> FrameKeywordSet {
        let mut set = FrameKeywordSet {
            glossary,
            ..FrameKeywordSet::default()
        };
        set.frames.insert(
            FrameLabel::Econ,
            FrameKeywords {
                keywords: vec!["market".into()],
                embedding: Some(vec![1.0, 0.0]),
            },
        );
        set.frames.insert(
            FrameLabel::Tech,
            FrameKeywords {
                keywords: vec!["solar".into()],
                embedding: None,
            },
        );
        set
    }

    #[test]
    fn embeddings_from_another_glossary_are_dropped() {
        let mut set = embedded_set(Some(GlossaryVariant::Enriched));
        assert_eq!(set.retain_embeddings_for(GlossaryVariant::Normal), 1);
        assert!(set.frames.values().all(|entry| entry.embedding.is_none()));
        assert_eq!(set.get(FrameLabel::Econ).unwrap().keywords, vec!["market"]);

        let mut unknown = embedded_set(None);
        assert_eq!(unknown.retain_embeddings_for(GlossaryVariant::Normal), 1);
    }

    #[test]
    fn embeddings_from_the_same_glossary_are_kept() {
        let mut set = embedded_set(Some(GlossaryVariant::Normal));
        assert_eq!(set.retain_embeddings_for(GlossaryVariant::Normal), 0);
        assert_eq!(
            set.get(FrameLabel::Econ).unwrap().embedding,
            Some(vec![1.0, 0.0])
        );
    }

    #[test]
    fn glossary_tag_is_optional_on_disk() {
        let raw = r#"{"frames":{"ECON":{"keywords":["market"]}}}"#;
        let set: FrameKeywordSet = serde_json::from_str(raw).unwrap();
        assert_eq!(set.glossary, None);

        let tagged = FrameKeywordSet {
            glossary: Some(GlossaryVariant::Enriched),
            ..set
        };
        let json = serde_json::to_string(&tagged).unwrap();
        assert!(json.contains(r#""glossary":"enriched""#));
    }
}
