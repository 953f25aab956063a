pub mod artifact_generated;
pub mod generation_progressed;
pub mod media_resolved;
pub mod session_saved;
pub mod submission_requested;
pub mod transcript_fetched;

pub use artifact_generated::*;
pub use generation_progressed::*;
pub use media_resolved::*;
pub use session_saved::*;
pub use submission_requested::*;
pub use transcript_fetched::*;
