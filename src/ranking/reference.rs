//! Global and frame-specific reference representations.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    config::ConfigError,
    data::glossary::Glossary,
    frames::{FrameKeywordSet, FrameLabel},
    ranking::scorer::Scorer,
};

/// Where the reference used for an article came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceOrigin {
    /// Frame mode is off.
    Global,
    Frame(FrameLabel),
    /// Frame mode is on but the article had no usable frame reference.
    Fallback,
}

/// One reference per frame plus the glossary-wide default.
#[derive(Debug, Clone)]
pub struct ReferenceSet<R> {
    global: R,
    frames: BTreeMap<FrameLabel, R>,
}

impl<R: Clone> ReferenceSet<R> {
    /// Build the glossary reference and, when given, one reference per frame.
    ///
    /// Frame keywords are supplemented with the full glossary. A frame whose
    /// reference cannot be built is left out and resolves to the global one.
    pub fn build<S>(
        scorer: &S,
        glossary: &Glossary,
        frames: Option<&FrameKeywordSet>,
    ) -> Result<Self, ConfigError>
    where
        S: Scorer<Reference = R>,
    {
        let global = scorer
            .reference(glossary.words())
            .ok_or(ConfigError::EmptyGlossary(scorer.name()))?;

        let mut by_frame = BTreeMap::new();
        for (label, entry) in frames.map(|set| &set.frames).into_iter().flatten() {
            let reference = scorer.precomputed(entry).or_else(|| {
                let words: Vec<String> = entry
                    .keywords
                    .iter()
                    .chain(glossary.words())
                    .cloned()
                    .collect();
                scorer.reference(&words)
            });
            match reference {
                Some(reference) => {
                    by_frame.insert(*label, reference);
                }
                None => warn!(%label, "no usable words for frame reference; using glossary"),
            }
        }
        debug!(frames = by_frame.len(), criterion = scorer.name(), "built references");

        Ok(Self {
            global,
            frames: by_frame,
        })
    }

    pub fn global(&self) -> &R {
        &self.global
    }

    pub fn frame(&self, label: FrameLabel) -> Option<&R> {
        self.frames.get(&label)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Pick the reference for an article.
    ///
    /// `frame_mode` is `None` when frame-specific ranking is off, otherwise the
    /// looked-up label (which may itself be missing).
    pub fn resolve(&self, frame_mode: Option<Option<FrameLabel>>) -> (&R, ReferenceOrigin) {
        match frame_mode {
            None => (&self.global, ReferenceOrigin::Global),
            Some(label) => match label.and_then(|l| self.frames.get(&l).map(|r| (l, r))) {
                Some((label, reference)) => (reference, ReferenceOrigin::Frame(label)),
                None => (&self.global, ReferenceOrigin::Fallback),
            },
        }
    }
}
