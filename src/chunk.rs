use serde::{Deserialize, Serialize};

fn is_false(b: &bool) -> bool {
    !*b
}

/// Provenance metadata attached to every [`ChunkRecord`].
///
/// Modeled as a typed record with the required fields spelled out plus a
/// generic extension map, per the open-ended-metadata design note: callers
/// can rely on the invariants of the named fields without losing the
/// ability to carry extra, producer-specific keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub chunk_method: String,
    pub tokenizer_type: String,
    pub start_token: usize,
    pub end_token: usize,
    pub char_offset_start: usize,
    pub char_offset_end: usize,
    pub page_number: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentence_count: Option<usize>,
    #[serde(skip_serializing_if = "is_false", default)]
    pub oversized_split: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ChunkMetadata {
    /// Metadata for a chunk assembled by packing whole sentences.
    pub fn normal(
        tokenizer_type: &str,
        start_token: usize,
        token_count: usize,
        char_offset_start: usize,
        char_offset_end: usize,
        page_number: Option<usize>,
        sentence_count: usize,
    ) -> Self {
        Self {
            chunk_method: "token_based".to_string(),
            tokenizer_type: tokenizer_type.to_string(),
            start_token,
            end_token: start_token + token_count,
            char_offset_start,
            char_offset_end,
            page_number,
            sentence_count: Some(sentence_count),
            oversized_split: false,
            extra: serde_json::Map::new(),
        }
    }

    /// Metadata for a chunk born from subdividing a single sentence that
    /// exceeded the token budget. Such chunks carry no `sentence_count`.
    pub fn oversized(
        tokenizer_type: &str,
        start_token: usize,
        token_count: usize,
        char_offset_start: usize,
        char_offset_end: usize,
        page_number: Option<usize>,
    ) -> Self {
        Self {
            chunk_method: "token_based".to_string(),
            tokenizer_type: tokenizer_type.to_string(),
            start_token,
            end_token: start_token + token_count,
            char_offset_start,
            char_offset_end,
            page_number,
            sentence_count: None,
            oversized_split: true,
            extra: serde_json::Map::new(),
        }
    }

    /// Flatten into a single JSON object, named fields and extension keys
    /// side by side, for sinks that persist metadata as an open mapping.
    pub fn to_json_map(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    }
}

/// The only entity the chunker produces: a contiguous piece of a document
/// bounded by a token budget, paired with enough provenance to locate it
/// back in the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub chunk_index: usize,
    pub text: String,
    pub token_count: usize,
    pub metadata: ChunkMetadata,
}
