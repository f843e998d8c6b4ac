//! Article text to segments.
//!
//! Paragraphs are separated by one or more blank lines. Line breaks inside a
//! paragraph are folded into single spaces, which is how the paragraph reads
//! once rendered.

/// Split `article` into paragraphs.
pub fn split_paragraphs(article: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in article.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }

    paragraphs
}

/// Character count of each paragraph.
pub fn segment_lengths<S: AsRef<str>>(paragraphs: &[S]) -> Vec<usize> {
    paragraphs
        .iter()
        .map(|p| p.as_ref().chars().count())
        .collect()
}
