//! Chunker (spec §4.5).
//!
//! No teacher or pack analog; built directly from the line-boundary/overlap
//! algorithm spec.md describes. Bounds per-invocation memory and match-time
//! cost when blobs exceed `max_chunk_size`, while guaranteeing (via
//! `overlap_lines`) that any secret crossing a cut point is seen whole in at
//! least one chunk.

/// A chunk of a (possibly larger) blob, carrying its offset into the
/// original so emitted spans can be translated back.
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    pub payload: &'a [u8],
    pub start_offset: usize,
    pub index: usize,
}

/// Chunking configuration (spec §4.5 defaults).
#[derive(Debug, Clone, Copy)]
pub struct ChunkConfig {
    pub max_chunk_size: usize,
    pub overlap_lines: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        ChunkConfig { max_chunk_size: 5 * 1024 * 1024, overlap_lines: 10 }
    }
}

/// Half-open `\n`-delimited line ranges covering `content` exactly (the
/// final line need not end in `\n`).
fn line_ranges(content: &[u8]) -> Vec<(usize, usize)> {
    if content.is_empty() {
        return Vec::new();
    }
    let mut ranges = Vec::new();
    let mut start = 0;
    for (i, &b) in content.iter().enumerate() {
        if b == b'\n' {
            ranges.push((start, i + 1));
            start = i + 1;
        }
    }
    if start < content.len() {
        ranges.push((start, content.len()));
    }
    ranges
}

/// Split `content` into chunks per `config` (spec §4.5). Never truncates
/// content: a single line longer than `max_chunk_size` is emitted as its own
/// oversized chunk.
pub fn chunk(content: &[u8], config: &ChunkConfig) -> Vec<Chunk<'_>> {
    if content.len() <= config.max_chunk_size {
        return vec![Chunk { payload: content, start_offset: 0, index: 0 }];
    }

    let lines = line_ranges(content);
    let mut chunks = Vec::new();
    let mut chunk_start_offset = lines.first().map(|&(s, _)| s).unwrap_or(0);
    let mut current_len = 0usize;
    let mut i = 0usize;

    let mut push_chunk = |start: usize, end: usize, chunks: &mut Vec<Chunk<'_>>| {
        if end > start {
            chunks.push(Chunk { payload: &content[start..end], start_offset: start, index: chunks.len() });
        }
    };

    while i < lines.len() {
        let (ls, le) = lines[i];
        let line_len = le - ls;

        if line_len > config.max_chunk_size {
            if current_len > 0 {
                push_chunk(chunk_start_offset, ls, &mut chunks);
                current_len = 0;
            }
            push_chunk(ls, le, &mut chunks);
            i += 1;
            chunk_start_offset = lines.get(i).map(|&(s, _)| s).unwrap_or(content.len());
            continue;
        }

        if current_len > 0 && current_len + line_len > config.max_chunk_size {
            push_chunk(chunk_start_offset, ls, &mut chunks);
            let new_start_line = i.saturating_sub(config.overlap_lines);
            chunk_start_offset = lines[new_start_line].0;
            current_len = le - chunk_start_offset;
            i += 1;
            continue;
        }

        if current_len == 0 {
            chunk_start_offset = ls;
        }
        current_len += line_len;
        i += 1;
    }

    if current_len > 0 {
        push_chunk(chunk_start_offset, content.len(), &mut chunks);
    }

    chunks
}
