//! Testing utilities and mock implementations.
//!
//! [`MockToolRunner`] stands in for [`ProcessRunner`](crate::runner::ProcessRunner)
//! so batch behavior can be exercised without chdman installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use chdrunner_core::testing::MockToolRunner;
//!
//! let runner = MockToolRunner::new();
//! runner.fail_input("/games/broken.cue", 1, vec!["Error: bad track".into()]).await;
//!
//! let sequencer = BatchSequencer::new(runner.clone());
//! // run a batch...
//! assert_eq!(runner.run_count().await, 3);
//! ```

mod mock_runner;

pub use mock_runner::{MockToolRunner, RecordedRun};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::Path;

    use crate::batch::Job;

    /// Create pending jobs `<dir>/<name>.<in_ext>` -> `<dir>/<name>.<out_ext>`.
    pub fn jobs(dir: &Path, names: &[&str], in_ext: &str, out_ext: &str) -> Vec<Job> {
        names
            .iter()
            .map(|name| {
                Job::new(
                    dir.join(format!("{}.{}", name, in_ext)),
                    dir.join(format!("{}.{}", name, out_ext)),
                )
            })
            .collect()
    }

    /// Shell script standing in for chdman.
    ///
    /// Reads `-i`/`-o`, fails with exit code 1 when the input name contains
    /// `fail`, otherwise prints progress and creates the output file.
    pub const FAKE_CHDMAN_SCRIPT: &str = r#"#!/bin/sh
in=""
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    -i) in="$2"; shift 2 ;;
    -o) out="$2"; shift 2 ;;
    *) shift ;;
  esac
done
case "$in" in
  *fail*)
    echo "chdman - MAME Compressed Hunks of Data (CHD) manager"
    echo "Error: unable to parse $in" 1>&2
    exit 1
    ;;
esac
printf 'Compressing, 25%% complete...\r'
printf 'Compressing, 100%% complete...\n'
echo "Compression complete"
: > "$out"
exit 0
"#;
}
