use assert_cmd::Command;
use assert_cmd::assert::Assert;
use assert_fs::TempDir;
use assert_fs::prelude::PathCopy;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

fn setup_working_dir(dir_name: &str) -> TempDir {
    let file_path = PathBuf::from(format!(
        "{}/tests/test-cases/{}",
        env!("CARGO_MANIFEST_DIR"),
        dir_name
    ));

    let temp = TempDir::new().unwrap();
    temp.copy_from(file_path, &["*", "**/*"]).unwrap();

    temp
}

pub struct SelfupTestHelper<'a> {
    pub work_dir: TempDir,
    name: &'a str,
    counter: AtomicUsize,
}

impl<'a> SelfupTestHelper<'a> {
    pub fn new(name: &'a str, test_dir: &'a str) -> Self {
        Self {
            work_dir: setup_working_dir(test_dir),
            name,
            counter: AtomicUsize::new(0),
        }
    }

    pub fn run_command(&self, args: &[&str]) -> Assert {
        self.command(args).assert()
    }

    /// The binary set up for this work dir, ready for extra env before running.
    pub fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::cargo_bin("selfup").unwrap();
        cmd.current_dir(self.work_dir.path())
            .env(
                "SELFUP_RUN_ID",
                format!(
                    "{}-{}",
                    self.name,
                    self.counter.fetch_add(1, Ordering::Relaxed)
                ),
            )
            .env("SELFUP_OUTPUT_PROGRESS", "plain")
            .env("NO_COLOR", "1")
            .env_remove("SELFUP_PREFIX")
            .env_remove("SELFUP_SKIP_BY")
            .args(args);
        cmd
    }

    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.work_dir.path().join(path)).unwrap()
    }

    pub fn clean_work_dir(self) {
        self.work_dir.close().unwrap();
    }
}
