//! Release metadata block embedded in commit and tag messages
//!
//! Wire format, owned by this crate and required to round-trip exactly:
//!
//! ```text
//! ---pls-release---
//! version: 1.2.0
//! from: 1.1.0
//! type: minor
//! ---pls-release---
//! ```

use crate::types::ReleaseMetadata;
use crate::version::Version;

/// Delimiter line for the metadata block
pub const METADATA_DELIMITER: &str = "---pls-release---";

/// Render the metadata block for embedding in a commit or tag message
pub fn render_metadata(metadata: &ReleaseMetadata) -> String {
    format!(
        "{METADATA_DELIMITER}\nversion: {}\nfrom: {}\ntype: {}\n{METADATA_DELIMITER}",
        metadata.version, metadata.from, metadata.kind
    )
}

/// Parse the metadata block out of a commit or tag message, if present
pub fn parse_metadata(message: &str) -> Option<ReleaseMetadata> {
    let mut lines = message.lines();
    lines.find(|l| l.trim() == METADATA_DELIMITER)?;

    let mut version = None;
    let mut from = None;
    let mut kind = None;

    for line in lines {
        let line = line.trim();
        if line == METADATA_DELIMITER {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            let value = value.trim();
            match key.trim() {
                "version" => version = Version::parse(value),
                "from" => from = Version::parse(value),
                "type" => kind = value.parse().ok(),
                _ => {}
            }
        }
    }

    Some(ReleaseMetadata {
        version: version?,
        from: from?,
        kind: kind?,
    })
}

/// Whether a message contains the metadata delimiter (managed marker)
pub fn is_managed_message(message: &str) -> bool {
    message.lines().any(|l| l.trim() == METADATA_DELIMITER)
}
