use docrank_core::config::EmbeddingConfig;
use docrank_embed::{default_embedder, HashEmbedder};

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[test]
fn hashed_embedder_shapes_and_determinism() {
    let embedder = default_embedder(&EmbeddingConfig::default());
    let texts = vec!["gene editing in vivo".to_string(), "gene editing in vivo".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(embedder.dim(), 384);
    assert_eq!(v1.len(), 384, "embedding dim follows config");

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in v1.iter().zip(v2.iter()) {
        assert!((a - b).abs() <= 1e-6);
    }
}

#[test]
fn shared_tokens_mean_higher_similarity() {
    let embedder = HashEmbedder::new(1024);
    let query = embedder.embed_text("liver delivery of capsid");
    let close = embedder.embed_text("capsid delivery to the liver");
    let far = embedder.embed_text("quarterly budget meeting");
    assert!((cosine(&query, &close) - 1.0).abs() < 1e-5, "same tokens, same vector");
    assert!(cosine(&query, &close) > cosine(&query, &far));
}

#[test]
fn stopword_only_text_is_the_zero_vector() {
    let v = HashEmbedder::new(16).embed_text("the and of");
    assert!(v.iter().all(|x| *x == 0.0));
}

#[test]
fn seed_changes_the_projection() {
    let a = HashEmbedder::with_seed(4096, 0).embed_text("crispr cas9 delivery");
    let b = HashEmbedder::with_seed(4096, 7).embed_text("crispr cas9 delivery");
    assert_ne!(a, b);
}
