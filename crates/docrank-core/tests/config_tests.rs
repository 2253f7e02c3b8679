use std::path::Path;

use docrank_core::config::{expand_path, Config, Settings};
use docrank_core::Error;

#[test]
fn defaults_fill_missing_keys() {
    let settings = Config::from_toml_str("[search]\nmax_top_k = 50\n").settings().expect("settings");
    assert_eq!(settings.search.max_top_k, 50);
    assert_eq!(settings.search.default_top_k, 5);
    assert_eq!(settings.search.candidate_multiplier, 3);
    assert_eq!(settings.chunking.meeting_target_tokens, 300);
    assert_eq!(settings.chunking.research_target_tokens, 1000);
    assert_eq!(settings.embedding.dimension, 384);
    assert_eq!(settings.data.raw_txt_dir, "data/txt");
}

#[test]
fn get_reads_nested_keys() {
    let config = Config::from_toml_str("[chunking]\ngeneral_target_tokens = 250\n");
    assert_eq!(config.get::<usize>("chunking.general_target_tokens").unwrap(), 250);
    assert_eq!(config.get::<usize>("chunking.progress_target_tokens").unwrap(), 500);
    assert!(config.get::<usize>("chunking.nope").is_err());
}

#[test]
fn invalid_values_are_rejected() {
    for toml in [
        "[search]\ncandidate_multiplier = 0\n",
        "[search]\ndefault_top_k = 500\n",
        "[search]\ndefault_vector_weight = -1.0\n",
        "[chunking]\nresearch_overlap_percent = 1.5\n",
    ] {
        let err = Config::from_toml_str(toml).settings().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)), "{toml}: {err}");
    }
    assert!(Settings::default().validate().is_ok());
}

#[test]
fn paths_expand_env_vars() {
    std::env::set_var("DOCRANK_TEST_CORPUS", "/srv/corpus");
    assert_eq!(expand_path("${DOCRANK_TEST_CORPUS}/txt"), Path::new("/srv/corpus/txt"));
    assert_eq!(expand_path("relative/txt"), Path::new("relative/txt"));
}
