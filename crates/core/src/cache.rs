use std::{
    hash::{DefaultHasher, Hash, Hasher},
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{error::Result, gateway::transcript::Transcript};

/// Get the cache directory for a given URL
pub fn get_cache_dir(url: &str) -> PathBuf {
    let mut hasher = DefaultHasher::new();
    url.hash(&mut hasher);
    let url_hash = hasher.finish();

    get_root_cache_dir().join(url_hash.to_string())
}

pub fn get_root_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("videosum")
}

pub fn get_transcript_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join("transcript.json")
}

pub fn get_journal_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join("events.jsonl")
}

/// A previously fetched transcript, if one is cached and still parses.
pub async fn load_transcript(cache_dir: &Path) -> Option<Transcript> {
    let path = get_transcript_path(cache_dir);
    let content = tokio::fs::read_to_string(&path).await.ok()?;
    match serde_json::from_str::<Transcript>(&content) {
        Ok(t) if t.validate().is_ok() => Some(t),
        Ok(_) => None,
        Err(e) => {
            debug!("Ignoring unreadable cached transcript {}: {e}", path.display());
            None
        }
    }
}

pub async fn save_transcript(cache_dir: &Path, transcript: &Transcript) -> Result<()> {
    tokio::fs::create_dir_all(cache_dir).await?;
    let json = serde_json::to_string_pretty(transcript)?;
    tokio::fs::write(get_transcript_path(cache_dir), json).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Subtitle;

    #[test]
    fn cache_dir_is_stable_per_url() {
        let a = get_cache_dir("https://youtu.be/abc");
        let b = get_cache_dir("https://youtu.be/abc");
        let c = get_cache_dir("https://youtu.be/xyz");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with(get_root_cache_dir()));
    }

    #[tokio::test]
    async fn transcript_survives_a_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_transcript(dir.path()).await.is_none());

        let transcript = Transcript {
            id: Some("abc".into()),
            title: None,
            cover: None,
            subtitles: vec![Subtitle::new(0, 0.0, 1.0, "hello")],
        };
        save_transcript(dir.path(), &transcript).await.unwrap();
        assert_eq!(load_transcript(dir.path()).await, Some(transcript));
    }
}
