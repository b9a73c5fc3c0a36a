//! Property tests for file conservation across a run.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use proptest::prelude::*;
use tempfile::TempDir;

use bronze_ingestor::{ConflictPolicy, IngestSettings, Ingestor, LocalFs, Tier};

fn landing_contents() -> impl Strategy<Value = BTreeMap<String, usize>> {
    // Name -> size in bytes; a third of the files are empty on average.
    proptest::collection::btree_map(
        "[a-z][a-z0-9_]{0,11}\\.(csv|json|txt)",
        prop_oneof![Just(0usize), 1usize..64, 1usize..64],
        0..12,
    )
}

fn names_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map(|rd| {
            rd.flatten()
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 48,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: every landed file ends up in exactly one tier, chosen by size.
    #[test]
    fn property_every_file_lands_exactly_once(files in landing_contents()) {
        let work = TempDir::new().unwrap();
        let settings = IngestSettings {
            landing: work.path().join("landing"),
            bronze: work.path().join("bronze"),
            bad_data: work.path().join("bad_data"),
            on_conflict: ConflictPolicy::Rename,
            dry_run: false,
        };
        fs::create_dir_all(&settings.landing).unwrap();
        for (name, size) in &files {
            fs::write(settings.landing.join(name), vec![b'x'; *size]).unwrap();
        }

        let report = Ingestor::new(settings.clone(), LocalFs::new()).run().unwrap();

        prop_assert_eq!(report.found, files.len());
        prop_assert_eq!(report.tally.total(), report.found);
        prop_assert_eq!(report.tally.errors, 0);
        prop_assert!(names_in(&settings.landing).is_empty());

        let bronze = names_in(&settings.bronze);
        let bad = names_in(&settings.bad_data);
        prop_assert_eq!(bronze.len() + bad.len(), files.len());

        for (name, size) in &files {
            let (expected, other) = match Tier::classify(*size as u64) {
                Tier::Bronze => (&bronze, &bad),
                Tier::BadData => (&bad, &bronze),
            };
            prop_assert!(expected.contains(name), "{} missing from its tier", name);
            prop_assert!(!other.contains(name), "{} duplicated into the wrong tier", name);
        }
    }

    /// PROPERTY: with the rename policy, pre-existing tier files are never replaced.
    #[test]
    fn property_rename_never_overwrites(files in landing_contents()) {
        let work = TempDir::new().unwrap();
        let settings = IngestSettings {
            landing: work.path().join("landing"),
            bronze: work.path().join("bronze"),
            bad_data: work.path().join("bad_data"),
            on_conflict: ConflictPolicy::Rename,
            dry_run: false,
        };
        fs::create_dir_all(&settings.landing).unwrap();
        fs::create_dir_all(&settings.bronze).unwrap();
        fs::create_dir_all(&settings.bad_data).unwrap();
        for (name, size) in &files {
            fs::write(settings.landing.join(name), vec![b'x'; *size]).unwrap();
            // Same name already present in both tiers.
            fs::write(settings.bronze.join(name), b"existing").unwrap();
            fs::write(settings.bad_data.join(name), b"existing").unwrap();
        }

        let report = Ingestor::new(settings.clone(), LocalFs::new()).run().unwrap();

        prop_assert_eq!(report.tally.total(), files.len());
        for name in files.keys() {
            prop_assert_eq!(fs::read(settings.bronze.join(name)).unwrap(), b"existing".to_vec());
            prop_assert_eq!(fs::read(settings.bad_data.join(name)).unwrap(), b"existing".to_vec());
        }
        // Each name already sits in both tiers; the incoming copy adds one more.
        prop_assert_eq!(
            names_in(&settings.bronze).len() + names_in(&settings.bad_data).len(),
            3 * files.len()
        );
    }
}
