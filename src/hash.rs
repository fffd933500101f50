use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};

static INVOCATION_COUNTER: AtomicU64 = AtomicU64::new(0);

const HASH_LEN: usize = 12;

/// Suffix for generated identifiers: resource path plus a process-wide
/// invocation sequence, so re-transforming the same file never reuses a name.
pub fn invocation_hash(resource_path: &str) -> String {
    let sequence = INVOCATION_COUNTER.fetch_add(1, Ordering::SeqCst);
    compute_hash(resource_path, sequence)
}

pub fn compute_hash(resource_path: &str, sequence: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(resource_path.as_bytes());
    hasher.update(sequence.to_le_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..HASH_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_hash_is_deterministic() {
        assert_eq!(compute_hash("/app/page.tsx", 3), compute_hash("/app/page.tsx", 3));
        assert_eq!(compute_hash("/app/page.tsx", 3).len(), HASH_LEN);
    }

    #[test]
    fn test_invocations_never_repeat() {
        let first = invocation_hash("/app/blog/page.tsx");
        let second = invocation_hash("/app/blog/page.tsx");
        assert_ne!(first, second);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
