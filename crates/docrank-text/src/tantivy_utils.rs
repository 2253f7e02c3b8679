use tantivy::schema::{Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING};
use tantivy::tokenizer::{TextAnalyzer, WhitespaceTokenizer};
use tantivy::Index;

/// Analyzer for pre-tokenized text: split on whitespace, nothing else.
pub const TOKEN_ANALYZER: &str = "docrank_tokens";

#[derive(Debug, Clone, Copy)]
pub struct Fields {
    pub id: Field,
    pub seq: Field,
    pub text: Field,
}

pub fn build_schema() -> (Schema, Fields) {
    let mut schema_builder = Schema::builder();
    let id = schema_builder.add_text_field("id", STRING | STORED);
    let seq = schema_builder.add_u64_field("seq", STORED);
    let text_field_indexing = TextFieldIndexing::default()
        .set_tokenizer(TOKEN_ANALYZER)
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
    let text_options = TextOptions::default().set_indexing_options(text_field_indexing);
    let text = schema_builder.add_text_field("text", text_options);
    (schema_builder.build(), Fields { id, seq, text })
}

pub fn register_tokenizer(index: &Index) {
    let tokenizer = TextAnalyzer::builder(WhitespaceTokenizer::default()).build();
    index.tokenizers().register(TOKEN_ANALYZER, tokenizer);
}
