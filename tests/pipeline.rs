use std::{fs, path::Path};

use climate_reducer::{
    cli::{Criterion, Method},
    config::{ConfigError, KeepFraction, Settings},
    data::glossary::GlossaryVariant,
    frames::{
        extract::{self, ExtractOptions},
        FrameKeywordSet, FrameLabel,
    },
    ranking::{
        self,
        random::{self, RandomConfig},
        RunConfig, MANIFEST_FILE,
    },
};
use tempfile::TempDir;

const VECTORS: &str = "\
climate 1 0 0
warming 0.9 0.1 0
emission 0.95 0 0.05
levels 0.3 0.5 0.2
concern 0.6 0.3 0.1
scientists 0.7 0.1 0.2
stocks 0 1 0
rose 0.1 0.9 0
today 0 0.2 0.9
";

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn workspace() -> (TempDir, Settings) {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::rooted(dir.path());
    write(
        &settings.join_data("ScienceOCR/a1.ocr"),
        "Climate feature\nA. Author\nInstitute\nThe climate is warming.\nStocks rose today. Emission levels concern scientists.\n",
    );
    write(
        &settings.join_data("NatureOCR/n1.ocr"),
        "News\nB. Writer\nWarming melts ice. Markets were calm.\n",
    );
    write(
        &settings.join_resource("CCglossaryWiki.txt"),
        "Climate\nemission\nwarming\n\n",
    );
    write(&settings.embeddings_path, VECTORS);
    write(
        &settings.join_resource("master_table.tsv"),
        "txt\tLabels_dominant\na1\tA_dominant_frame\nn1\tG_dominant_frame\n",
    );
    (dir, settings)
}

fn config(frame: bool) -> RunConfig {
    RunConfig::new(
        GlossaryVariant::Normal,
        0.67,
        Method::Glove,
        Criterion::Cosine,
        frame,
        2,
    )
    .unwrap()
}

#[tokio::test]
async fn reduce_writes_ranked_articles_and_manifest() {
    let (_dir, settings) = workspace();
    let manifest = ranking::run(config(false), &settings).await.unwrap();

    let out = settings.join_results("glove-top-67-percent-cosine-normal");
    assert_eq!(manifest.output_dir, out);
    assert_eq!(
        fs::read_to_string(out.join("ScienceOCR/a1.ocr")).unwrap(),
        "The climate is warming. Emission levels concern scientists. "
    );
    assert_eq!(
        fs::read_to_string(out.join("NatureOCR/n1.ocr")).unwrap(),
        "Warming melts ice. "
    );

    let recorded: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join(MANIFEST_FILE)).unwrap()).unwrap();
    assert_eq!(recorded["config"]["criterion"], "cosine");
    assert_eq!(recorded["corpora"][0]["corpus"], "ScienceOCR");
    assert_eq!(recorded["corpora"][0]["kept"], 2);
}

#[tokio::test]
async fn tfidf_method_ranks_against_the_fitted_glossary_vector() {
    let (_dir, settings) = workspace();
    let config = RunConfig::new(
        GlossaryVariant::Normal,
        0.67,
        Method::Tfidf,
        Criterion::Cosine,
        false,
        1,
    )
    .unwrap();
    let manifest = ranking::run(config, &settings).await.unwrap();

    let out = settings.join_results("tfidf-top-67-percent-cosine-normal");
    assert_eq!(manifest.output_dir, out);
    assert_eq!(
        fs::read_to_string(out.join("ScienceOCR/a1.ocr")).unwrap(),
        "The climate is warming. Emission levels concern scientists. "
    );
    assert_eq!(
        fs::read_to_string(out.join("NatureOCR/n1.ocr")).unwrap(),
        "Warming melts ice. "
    );

    let recorded: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join(MANIFEST_FILE)).unwrap()).unwrap();
    assert_eq!(recorded["config"]["method"], "tfidf");
}

#[tokio::test]
async fn rerunning_overwrites_instead_of_appending() {
    let (_dir, settings) = workspace();
    ranking::run(config(false), &settings).await.unwrap();
    ranking::run(config(false), &settings).await.unwrap();
    let out = settings.join_results("glove-top-67-percent-cosine-normal/ScienceOCR/a1.ocr");
    assert_eq!(
        fs::read_to_string(out).unwrap(),
        "The climate is warming. Emission levels concern scientists. "
    );
}

#[tokio::test]
async fn frame_mode_requires_precomputed_keywords() {
    let (_dir, settings) = workspace();
    let err = ranking::run(config(true), &settings).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::MissingResource { .. })
    ));
}

#[tokio::test]
async fn extracted_keywords_drive_frame_mode() {
    let (_dir, settings) = workspace();
    let set = extract::run(
        &settings,
        GlossaryVariant::Normal,
        true,
        ExtractOptions::default(),
    )
    .await
    .unwrap();

    let econ = set.get(FrameLabel::Econ).unwrap();
    assert!(!econ.keywords.is_empty() && econ.keywords.len() <= 40);
    assert_eq!(econ.embedding.as_ref().map(Vec::len), Some(3));
    assert!(set.get(FrameLabel::Scientific).is_some());
    assert_eq!(set.glossary, Some(GlossaryVariant::Normal));
    assert_eq!(FrameKeywordSet::load(&settings.frame_keywords_path).unwrap(), set);

    let manifest = ranking::run(config(true), &settings).await.unwrap();
    assert!(manifest
        .output_dir
        .ends_with("glove-top-67-percent-cosine-normal-with-frame-embeddings"));
    assert_eq!(manifest.corpora.iter().map(|c| c.fallbacks).sum::<usize>(), 0);
    assert_eq!(manifest.corpora.iter().map(|c| c.articles).sum::<usize>(), 2);
}

#[tokio::test]
async fn random_baseline_keeps_floor_of_fraction() {
    let (_dir, settings) = workspace();
    let config = RandomConfig {
        fraction: KeepFraction::new(0.67).unwrap(),
        seed: Some(11),
    };
    let manifest = random::run(config, &settings).await.unwrap();
    let science = &manifest.corpora[0];
    assert_eq!(science.sentences, 3);
    assert_eq!(science.kept, 2);

    let body = fs::read_to_string(settings.join_results("random-top-67-percent/ScienceOCR/a1.ocr")).unwrap();
    assert!(body.ends_with(' '));
    assert_eq!(body.matches(". ").count(), 2);
}
