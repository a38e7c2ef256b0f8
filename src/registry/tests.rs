//! Tests for the file registry
//!
//! Includes unit tests and property-based tests for:
//! - Idempotent registration
//! - Token distinctness
//! - Allow-list lookups

use super::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to create a temp file with content
fn create_temp_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write temp file");
    path
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_token_format() {
        let dir = TempDir::new().unwrap();
        let path = create_temp_file(&dir, "reads.bam", b"BAM\x01");
        let registry = FileRegistry::new();

        let token = registry.register(&path).unwrap();
        assert_eq!(token.as_str().len(), TOKEN_BYTES * 2);
        assert!(token.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(token.to_string(), token.as_str());
    }

    #[test]
    fn test_register_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = create_temp_file(&dir, "reads.bam", b"BAM\x01");
        let registry = FileRegistry::new();

        let first = registry.register(&path).unwrap();
        let second = registry.register(&path).unwrap();
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_dedups_equivalent_spellings() {
        let dir = TempDir::new().unwrap();
        let path = create_temp_file(&dir, "ref.fa", b">chr1\nACGT\n");
        fs::create_dir(dir.path().join("sub")).unwrap();
        let roundabout = dir.path().join("sub").join("..").join("ref.fa");
        let registry = FileRegistry::new();

        let first = registry.register(&path).unwrap();
        let second = registry.register(&roundabout).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_distinct_paths_get_distinct_tokens() {
        let dir = TempDir::new().unwrap();
        let bam = create_temp_file(&dir, "reads.bam", b"a");
        let bai = create_temp_file(&dir, "reads.bam.bai", b"b");
        let registry = FileRegistry::new();

        let t1 = registry.register(&bam).unwrap();
        let t2 = registry.register(&bai).unwrap();
        assert_ne!(t1, t2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_lookup_returns_canonical_path() {
        let dir = TempDir::new().unwrap();
        let path = create_temp_file(&dir, "calls.vcf", b"##fileformat=VCFv4.2\n");
        let registry = FileRegistry::new();

        let token = registry.register(&path).unwrap();
        let resolved = registry.lookup(token.as_str()).unwrap();
        assert_eq!(resolved, fs::canonicalize(&path).unwrap());
        assert!(resolved.is_absolute());
    }

    #[test]
    fn test_lookup_unknown_token() {
        let registry = FileRegistry::new();
        assert!(registry.lookup("00000000000000000000000000000000").is_none());
        assert!(registry.lookup("").is_none());
        assert!(registry.lookup("../../etc/passwd").is_none());
    }

    #[test]
    fn test_register_missing_file() {
        let dir = TempDir::new().unwrap();
        let registry = FileRegistry::new();

        let err = registry.register(dir.path().join("absent.cram")).unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
        assert!(err.to_string().contains("absent.cram"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_directory_rejected() {
        let dir = TempDir::new().unwrap();
        let registry = FileRegistry::new();

        let err = registry.register(dir.path()).unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
    }

    #[test]
    fn test_token_for() {
        let dir = TempDir::new().unwrap();
        let path = create_temp_file(&dir, "genes.gff3", b"##gff-version 3\n");
        let other = create_temp_file(&dir, "other.bed", b"chr1\t0\t10\n");
        let registry = FileRegistry::new();

        let token = registry.register(&path).unwrap();
        assert_eq!(registry.token_for(&path), Some(token));
        assert_eq!(registry.token_for(&other), None);
    }

    #[test]
    fn test_token_survives_file_deletion() {
        let dir = TempDir::new().unwrap();
        let path = create_temp_file(&dir, "tmp.bed", b"chr1\t0\t1\n");
        let registry = FileRegistry::new();

        let token = registry.register(&path).unwrap();
        fs::remove_file(&path).unwrap();
        // The mapping stays; the daemon reports the vanished file per request
        assert!(registry.lookup(token.as_str()).is_some());
    }

    #[test]
    fn test_concurrent_registration_of_same_path() {
        use std::sync::Arc;

        let dir = TempDir::new().unwrap();
        let path = create_temp_file(&dir, "shared.cram", b"CRAM");
        let registry = Arc::new(FileRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let path = path.clone();
                std::thread::spawn(move || registry.register(&path).unwrap())
            })
            .collect();

        let tokens: Vec<Token> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(tokens.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_new_registration_logs_size_once() {
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        struct Sink(Arc<Mutex<Vec<u8>>>);

        impl std::io::Write for Sink {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let sink = Sink::default();
        let writer = sink.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let dir = TempDir::new().unwrap();
        let path = create_temp_file(&dir, "ref.fa", &[b'A'; 2048]);
        let registry = FileRegistry::new();

        tracing::subscriber::with_default(subscriber, || {
            registry.register(&path).unwrap();
            registry.register(&path).unwrap();
        });

        let output = String::from_utf8(sink.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.matches("Registered").count(), 1, "{}", output);
        assert!(output.contains("2.00 KB"), "{}", output);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_registration_idempotent_and_distinct(
            names in prop::collection::hash_set("[a-z]{1,12}\\.(bam|bai|vcf|bed)", 1..8)
        ) {
            let dir = TempDir::new().unwrap();
            let registry = FileRegistry::new();
            let mut seen = std::collections::HashSet::new();

            for name in &names {
                let path = create_temp_file(&dir, name, name.as_bytes());
                let first = registry.register(&path).unwrap();
                let again = registry.register(&path).unwrap();
                prop_assert_eq!(&first, &again);
                prop_assert!(seen.insert(first));
            }

            prop_assert_eq!(registry.len(), names.len());
        }
    }
}
