//! Property-based tests for rotation and retention.
//!
//! Random record counts, per-file caps and retention limits are fed through a
//! real `RotatingLogFile`; the surviving files must be exactly the newest
//! whole files, each holding at most the cap.

use itertools::Itertools;
use proptest::prelude::*;
use rotalog::{LogFileConfig, RotatingLogFile};

#[path = "../test_utils/mod.rs"]
mod test_utils;
use test_utils::read_back;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_retains_newest_whole_files(
        count in 0usize..200,
        cap in 1u32..20,
        max_files in 1u32..6,
        ref body in "[a-z]{0,12}",
    ) {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = LogFileConfig::default()
            .with_max_records(cap)
            .with_max_files(max_files)
            .with_queue_capacity(8);
        let mut log = RotatingLogFile::with_config(dir.path(), "prop", config);
        let records: Vec<String> = (0..count).map(|i| format!("{i} {body}\n")).collect();
        for record in &records {
            log.submit(record.as_bytes()).expect("submit");
        }
        log.close().expect("close");

        let cap = cap as usize;
        let created = count.div_ceil(cap).max(1);
        let kept = created.min(max_files as usize);
        let files = read_back(dir.path(), "prop");
        prop_assert_eq!(files.len(), kept);

        let first_kept = (created - kept) * cap;
        let expected = records[first_kept..]
            .chunks(cap)
            .map(|chunk| chunk.concat())
            .collect_vec();
        if count == 0 {
            prop_assert_eq!(files, vec![String::new()]);
        } else {
            prop_assert_eq!(files, expected);
        }
    }
}
