//! Sidecar text produced by the builder always parses back to its fields

use baseline::snapshot::sidecar;
use proptest::prelude::*;
use std::path::Path;

proptest! {
    #[test]
    fn encoded_sidecar_decodes_cleanly(digest in any::<[u8; 32]>(), size in any::<u64>()) {
        let text = sidecar::encode(&digest, size);
        let (parsed, problems) = sidecar::decode(&text, Path::new("x.hash"));
        prop_assert!(problems.is_empty());
        prop_assert_eq!(parsed.digest, Some(digest));
        prop_assert_eq!(parsed.size, Some(size));
    }

    #[test]
    fn sidecar_without_hash_line_has_no_digest(size in any::<u64>()) {
        let text = format!("SIZE: {}\n", size);
        let (parsed, problems) = sidecar::decode(&text, Path::new("x.hash"));
        prop_assert!(parsed.digest.is_none());
        prop_assert_eq!(parsed.size, Some(size));
        prop_assert!(!problems.is_empty());
    }

    #[test]
    fn arbitrary_text_never_panics(text in ".{0,200}") {
        let _ = sidecar::decode(&text, Path::new("x.hash"));
    }
}
