pub mod cli_completion_sink;
pub mod events;
pub mod fetch_transcript;
pub mod generate_artifact;
pub mod journal;
pub mod progress_sink;
pub mod resolve_media;
pub mod save_session;
