use std::path::Path;

use crate::types::Episode;

pub(crate) const CSV_HEADER: [&str; 6] = [
    "episode_number",
    "title",
    "url",
    "date",
    "topic",
    "description",
];

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes the full record set to `path`, truncating any existing file.
/// The header row is written even when there are no records.
pub fn write_episodes(path: &Path, episodes: &[Episode]) -> Result<(), WriteError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    writer.write_record(CSV_HEADER)?;
    for episode in episodes {
        writer.serialize(episode)?;
    }
    writer.flush()?;

    Ok(())
}
