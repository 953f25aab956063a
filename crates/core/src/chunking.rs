use crate::{format::format_timestamp, types::Subtitle};

/// A contiguous, time-bounded slice of a transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleChunk {
    pub start: f64,
    pub end: f64,
    pub texts: Vec<String>,
}

impl SubtitleChunk {
    fn open(sub: &Subtitle) -> Self {
        Self {
            start: sub.start,
            end: sub.end,
            texts: vec![sub.text.clone()],
        }
    }

    /// `MM:SS-MM:SS`
    pub fn time_range(&self) -> String {
        format!("{}-{}", format_timestamp(self.start), format_timestamp(self.end))
    }

    pub fn content(&self) -> String {
        self.texts.join("\n")
    }

    /// Requested length of the article section written for this chunk.
    pub fn target_length(&self) -> usize {
        self.texts.len() * 2
    }
}

/// Split subtitles into windows of at most `chunk_duration` seconds, measured
/// from each window's first subtitle start.
pub fn chunk_subtitles(subtitles: &[Subtitle], chunk_duration: f64) -> Vec<SubtitleChunk> {
    let mut chunks = Vec::new();
    let Some(first) = subtitles.first() else {
        return chunks;
    };

    let mut current = SubtitleChunk::open(first);
    for sub in &subtitles[1..] {
        if sub.start - current.start > chunk_duration {
            let finished = std::mem::replace(&mut current, SubtitleChunk::open(sub));
            chunks.push(finished);
        } else {
            current.texts.push(sub.text.clone());
            current.end = sub.end;
        }
    }
    chunks.push(current);
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subs(starts: &[f64]) -> Vec<Subtitle> {
        starts
            .iter()
            .enumerate()
            .map(|(i, &s)| Subtitle::new(i, s, s + 2.0, format!("line {i}")))
            .collect()
    }

    #[test]
    fn empty_input_has_no_chunks() {
        assert!(chunk_subtitles(&[], 300.0).is_empty());
    }

    #[test]
    fn windows_open_when_start_exceeds_duration() {
        let input = subs(&[0.0, 100.0, 300.0, 301.0, 500.0, 600.0]);
        let chunks = chunk_subtitles(&input, 300.0);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].texts, vec!["line 0", "line 1", "line 2"]);
        assert_eq!(chunks[0].time_range(), "00:00-05:02");
        assert_eq!(chunks[1].start, 301.0);
        assert_eq!(chunks[1].texts.len(), 3);
        assert_eq!(chunks[1].time_range(), "05:01-10:02");
        assert_eq!(chunks[1].target_length(), 6);
    }

    #[test]
    fn chunks_cover_every_subtitle_in_order() {
        let starts: Vec<f64> = (0..200).map(|i| i as f64 * 7.5).collect();
        let input = subs(&starts);
        let chunks = chunk_subtitles(&input, 60.0);

        let flattened: Vec<String> = chunks.iter().flat_map(|c| c.texts.clone()).collect();
        let expected: Vec<String> = input.iter().map(|s| s.text.clone()).collect();
        assert_eq!(flattened, expected);

        for pair in chunks.windows(2) {
            assert!(pair[0].end <= pair[1].start + 2.0);
            assert!(pair[0].start < pair[1].start);
        }
    }
}
