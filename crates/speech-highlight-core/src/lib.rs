//! Word and paragraph highlighting for live narration.
//!
//! Text is indexed once into word start offsets and paragraph word ranges
//! (`offsets`). A [`SpeechHighlighter`] then turns the boundary offsets a
//! narration engine reports into the word and paragraph currently spoken,
//! keeping a [`PlaybackState`] that UI listeners subscribe to.

pub mod config;
pub mod engine;
pub mod error;
pub mod offsets;
pub mod playback;
pub mod session;
pub mod store;

pub use engine::{BoundaryKind, EngineEvent, NarrationEngine, UtteranceEvent, UtteranceRequest};
pub use error::SpeechError;
pub use offsets::{OffsetUnit, ParagraphDescriptor, TextIndex, WordOffsetTable};
pub use playback::PlaybackState;
pub use session::{EventOutcome, IgnoreReason, SpeechHighlighter, SpeechSession, ToggleOutcome};
pub use store::SubscriptionId;

use std::fs;
use std::path::Path;
use ts_rs::TS;

fn export_single_type<T: TS + 'static>(out_dir: &Path) -> Result<(), String> {
    T::export_all_to(out_dir).map_err(|err| err.to_string())
}

/// Write TypeScript declarations for every host-facing type into `out_dir`.
pub fn export_ts_bindings(out_dir: &Path) -> Result<(), String> {
    fs::create_dir_all(out_dir)
        .map_err(|err| format!("Failed to create {}: {err}", out_dir.display()))?;

    for entry in fs::read_dir(out_dir)
        .map_err(|err| format!("Failed to list {}: {err}", out_dir.display()))?
    {
        let entry = entry.map_err(|err| format!("Failed to read entry: {err}"))?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("ts") {
            fs::remove_file(&path)
                .map_err(|err| format!("Failed to remove {}: {err}", path.display()))?;
        }
    }

    export_single_type::<PlaybackState>(out_dir)?;
    export_single_type::<ParagraphDescriptor>(out_dir)?;
    export_single_type::<OffsetUnit>(out_dir)?;
    export_single_type::<BoundaryKind>(out_dir)?;
    Ok(())
}
