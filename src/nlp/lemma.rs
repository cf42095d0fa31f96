//! Noun lemmatization by morphological detachment rules.
//!
//! Candidates are produced by stripping plural suffixes. When a vocabulary is
//! available only known candidates survive and the shortest wins, so
//! `"gases"` becomes `"gas"` rather than `"gase"`.

const DETACHMENT_RULES: &[(&str, &str)] = &[
    ("s", ""),
    ("ses", "s"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men", "man"),
    ("ies", "y"),
];

const IRREGULAR: &[(&str, &str)] = &[
    ("children", "child"),
    ("feet", "foot"),
    ("geese", "goose"),
    ("mice", "mouse"),
    ("people", "person"),
    ("teeth", "tooth"),
    ("analyses", "analysis"),
    ("crises", "crisis"),
    ("hypotheses", "hypothesis"),
    ("phenomena", "phenomenon"),
    ("criteria", "criterion"),
];

/// Singular suffixes that look plural but must not lose their final `s`.
const SINGULAR_ENDINGS: &[&str] = &["ss", "us", "is"];

/// Reduce a lowercase word to its noun lemma.
///
/// `known` reports whether a word exists in the reference lexicon; pass `None`
/// to fall back to the first applicable rule.
pub fn lemmatize(word: &str, known: Option<&dyn Fn(&str) -> bool>) -> String {
    if let Some((_, lemma)) = IRREGULAR.iter().find(|(plural, _)| *plural == word) {
        return (*lemma).to_string();
    }

    let candidates: Vec<String> = DETACHMENT_RULES
        .iter()
        .filter_map(|(suffix, replacement)| {
            let stem = word.strip_suffix(suffix)?;
            (!stem.is_empty()).then(|| format!("{stem}{replacement}"))
        })
        .collect();

    match known {
        Some(known) => std::iter::once(word.to_string())
            .chain(candidates)
            .filter(|candidate| known(candidate.as_str()))
            .min_by_key(|candidate| candidate.len())
            .unwrap_or_else(|| word.to_string()),
        None => {
            if SINGULAR_ENDINGS.iter().any(|ending| word.ends_with(ending)) {
                return word.to_string();
            }
            // Longer suffixes are more specific than the bare `s` rule.
            candidates
                .into_iter()
                .rev()
                .find(|candidate| candidate != word)
                .unwrap_or_else(|| word.to_string())
        }
    }
}
