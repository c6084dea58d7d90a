//! Context Extractor (spec §4.6).
//!
//! Grounded on noseyparker's before/after snippet slicing in
//! `Match::convert` (`other_examples/baba4b45_..._match_type.rs.rs`), which
//! slices fixed *byte* windows around a match; generalized here to the N-line
//! windows spec §4.6 requires, with independent copies rather than borrowed
//! slices so returned buffers never alias the blob's backing storage.

/// Start offset of the line containing byte index `pos` (the `\n`, if any,
/// strictly before `pos` marks the boundary; `pos` itself is not inspected).
fn line_start(blob: &[u8], pos: usize) -> usize {
    if pos == 0 {
        return 0;
    }
    match blob[..pos].iter().rposition(|&b| b == b'\n') {
        Some(i) => i + 1,
        None => 0,
    }
}

/// Walk `from` backward across `n` complete lines, returning the resulting
/// line-start offset.
fn back_n_line_starts(blob: &[u8], from: usize, n: usize) -> usize {
    let mut pos = from;
    for _ in 0..n {
        if pos == 0 {
            break;
        }
        pos = line_start(blob, pos - 1);
    }
    pos
}

/// Walk `from` forward across up to `n` `\n`-terminated lines, returning the
/// resulting offset (may land at `blob.len()` if fewer than `n` lines
/// remain).
fn forward_n_line_ends(blob: &[u8], from: usize, n: usize) -> usize {
    let mut pos = from;
    let mut count = 0;
    while count < n {
        match blob[pos..].iter().position(|&b| b == b'\n') {
            Some(rel) => {
                pos += rel + 1;
                count += 1;
            }
            None => {
                pos = blob.len();
                break;
            }
        }
    }
    pos
}

fn extract_before(blob: &[u8], span_start: usize, n: usize) -> Vec<u8> {
    let x = line_start(blob, span_start);
    let on_newline = blob.get(span_start) == Some(&b'\n') && x < span_start;

    let (keep_fragment, lines_needed) = if on_newline { (true, n.saturating_sub(1)) } else { (false, n) };

    let s = if lines_needed == 0 { x } else { back_n_line_starts(blob, x, lines_needed) };

    if keep_fragment { blob[s..span_start].to_vec() } else { blob[s..x].to_vec() }
}

fn extract_after(blob: &[u8], span_end: usize, n: usize) -> Vec<u8> {
    let at_boundary = span_end >= blob.len() || blob.get(span_end.saturating_sub(1)) == Some(&b'\n');

    let y = if at_boundary {
        span_end
    } else {
        match blob[span_end..].iter().position(|&b| b == b'\n') {
            Some(rel) => span_end + rel + 1,
            None => blob.len(),
        }
    };

    let end = forward_n_line_ends(blob, y, n);
    blob[y..end].to_vec()
}

/// Extract up to `n` lines of context before and after `span` in `blob`
/// (spec §4.6). Returns independent byte copies; `n <= 0` or an invalid
/// (out-of-range, inverted) span yields empty buffers with no error.
pub fn extract_context(blob: &[u8], span: (usize, usize), n: i64) -> (Vec<u8>, Vec<u8>) {
    let (start, end) = span;
    if n <= 0 || start > end || end > blob.len() {
        return (Vec::new(), Vec::new());
    }
    let n = n as usize;
    (extract_before(blob, start, n), extract_after(blob, end, n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_before_and_after() {
        let blob = b"line0\nline1 MATCH line1b\nline2\n";
        let start = blob.iter().position(|&b| b == b'M').unwrap();
        let end = start + 5;
        let (before, after) = extract_context(blob, (start, end), 1);
        assert_eq!(before, b"line0\nline1 ".to_vec());
        assert_eq!(after, b" line1b\n".to_vec());
    }

    #[test]
    fn fewer_lines_at_start_of_blob() {
        let blob = b"MATCH here\nmore\n";
        let (before, after) = extract_context(blob, (0, 5), 5);
        assert!(before.is_empty());
        assert_eq!(after, b" here\nmore\n".to_vec());
    }

    #[test]
    fn fewer_lines_at_end_of_blob() {
        let blob = b"before\nMATCH";
        let start = blob.iter().position(|&b| b == b'M').unwrap();
        let (before, after) = extract_context(blob, (start, blob.len()), 5);
        assert_eq!(before, b"before\n".to_vec());
        assert!(after.is_empty());
    }

    #[test]
    fn zero_or_negative_n_yields_empty() {
        let blob = b"line0\nMATCH\nline2\n";
        let start = blob.iter().position(|&b| b == b'M').unwrap();
        let (before, after) = extract_context(blob, (start, start + 5), 0);
        assert!(before.is_empty() && after.is_empty());
        let (before, after) = extract_context(blob, (start, start + 5), -3);
        assert!(before.is_empty() && after.is_empty());
    }

    #[test]
    fn inverted_or_out_of_range_span_yields_empty() {
        let blob = b"short";
        let (before, after) = extract_context(blob, (4, 2), 2);
        assert!(before.is_empty() && after.is_empty());
        let (before, after) = extract_context(blob, (0, 100), 2);
        assert!(before.is_empty() && after.is_empty());
    }

    #[test]
    fn returned_buffers_are_independent_copies() {
        let mut blob = b"line0\nMATCH\nline2\n".to_vec();
        let start = blob.iter().position(|&b| b == b'M').unwrap();
        let (before, after) = extract_context(&blob, (start, start + 5), 1);
        for b in blob.iter_mut() {
            *b = 0;
        }
        assert_eq!(before, b"line0\n".to_vec());
        assert_eq!(after, b"\nline2\n".to_vec());
    }
}
