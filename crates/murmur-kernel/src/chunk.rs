//! Punctuation-aware chunk segmentation for paced delivery.

/// Split reply text into sentence-sized chunks.
///
/// `?` and `!` close a chunk and stay in it; `.`, em-dash, and newline close a
/// chunk and are dropped; everything else accumulates. A trailing remainder
/// without a terminator is flushed as a final chunk. Empty and whitespace-only
/// chunks are discarded.
pub fn split_chunks(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut buf = String::new();

    for ch in text.chars() {
        match ch {
            '?' | '!' => {
                buf.push(ch);
                let chunk = buf.trim();
                if !chunk.is_empty() {
                    parts.push(chunk.to_string());
                }
                buf.clear();
            }
            '.' | '—' | '\n' => {
                let chunk = buf.trim();
                if !chunk.is_empty() {
                    parts.push(chunk.to_string());
                }
                buf.clear();
            }
            _ => buf.push(ch),
        }
    }

    let chunk = buf.trim();
    if !chunk.is_empty() {
        parts.push(chunk.to_string());
    }
    parts
}
