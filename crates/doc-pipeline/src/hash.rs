//! Content hashing for document identity.
//!
//! Batch re-runs skip documents by content, not filename, so the identity
//! must be stable and collision-resistant.

use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

fn digest_file(path: &Path) -> std::io::Result<[u8; 32]> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 1024 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().into())
}

/// Full content hash, prefixed with the algorithm.
pub fn file_sha256(path: &Path) -> std::io::Result<String> {
    Ok(format!("sha256:{}", hex::encode(digest_file(path)?)))
}

/// Short dataset identity: `DOC_` plus the first 12 hex chars.
pub fn content_id(path: &Path) -> std::io::Result<String> {
    let hexed = hex::encode(digest_file(path)?);
    Ok(format!("DOC_{}", &hexed[..12]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn hash_depends_on_content_not_name() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.bin");
        let b = dir.path().join("b.bin");
        std::fs::File::create(&a)
            .unwrap()
            .write_all(b"same bytes")
            .unwrap();
        std::fs::File::create(&b)
            .unwrap()
            .write_all(b"same bytes")
            .unwrap();

        assert_eq!(file_sha256(&a).unwrap(), file_sha256(&b).unwrap());
        assert_eq!(content_id(&a).unwrap(), content_id(&b).unwrap());
        assert!(file_sha256(&a).unwrap().starts_with("sha256:"));
        assert_eq!(content_id(&a).unwrap().len(), "DOC_".len() + 12);
    }
}
