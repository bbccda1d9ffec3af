//! Stable vector ids for indexed chunks

use sha2::{Digest, Sha256};

const SOURCE_KEY_LEN: usize = 16;
const CONTENT_KEY_LEN: usize = 12;

fn hex_digest(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update([0u8]);
        }
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Id prefix shared by every chunk indexed from `source_url`
///
/// Pages without a URL are keyed on their content. Deleting by this prefix
/// removes every earlier version of the page.
pub fn source_prefix(source_url: &str, content: &str) -> String {
    let key = if source_url.is_empty() {
        content
    } else {
        source_url
    };

    format!("{}-", &hex_digest(&[key])[..SOURCE_KEY_LEN])
}

/// Deterministic id for chunk `index` of a document
///
/// Same page and same text give the same id, so re-indexing an unchanged page
/// overwrites its vectors. Two documents sharing a URL get distinct ids.
pub fn chunk_id(source_url: &str, content: &str, index: usize) -> String {
    let content_key = hex_digest(&[source_url, content]);

    format!(
        "{}{}-{}",
        source_prefix(source_url, content),
        &content_key[..CONTENT_KEY_LEN],
        index
    )
}
