use super::error::UpdateError;
use crate::engine::prelude::{EngineOptions, EngineResult, dry_run};
use crate::shared::prelude::ExecutionProvider;
use std::path::Path;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::BufReader;
use tokio::sync::{Semaphore, mpsc};
use tracing::{Instrument, Span, debug, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Rewrite files that have changes.
    Apply,
    /// Report only, never write.
    List,
}

#[derive(Debug)]
pub struct FileOutcome {
    pub path: String,
    pub result: Result<EngineResult, UpdateError>,
}

/// Runs the engine over each file in its own task. At most `jobs` files are
/// processed at once. Outcomes come back in the order of `paths`.
pub async fn process_files(
    paths: &[String],
    options: Arc<EngineOptions>,
    producer: Arc<dyn ExecutionProvider>,
    mode: UpdateMode,
    jobs: usize,
) -> Vec<FileOutcome> {
    let header_span = info_span!("selfup", "indicatif.pb_show" = true);
    header_span.pb_set_length(paths.len() as u64);
    header_span.pb_set_message("selfup");

    fan_out(paths, options, producer, mode, jobs)
        .instrument(header_span)
        .await
}

async fn fan_out(
    paths: &[String],
    options: Arc<EngineOptions>,
    producer: Arc<dyn ExecutionProvider>,
    mode: UpdateMode,
    jobs: usize,
) -> Vec<FileOutcome> {
    let jobs = jobs.max(1);
    let permits = Arc::new(Semaphore::new(jobs));
    let (sender, mut receiver) = mpsc::channel::<(usize, FileOutcome)>(jobs);

    for (index, path) in paths.iter().enumerate() {
        let path = path.clone();
        let options = options.clone();
        let producer = producer.clone();
        let permits = permits.clone();
        let sender = sender.clone();

        tokio::spawn(async move {
            let result = match permits.acquire_owned().await {
                Ok(_permit) => process_file(&path, &options, producer.as_ref(), mode).await,
                Err(e) => Err(UpdateError::Worker {
                    path: path.clone(),
                    reason: e.to_string(),
                }),
            };
            // the receiver only goes away if the caller gave up
            let _ = sender.send((index, FileOutcome { path, result })).await;
        });
    }
    drop(sender);

    let mut outcomes = Vec::with_capacity(paths.len());
    while let Some(outcome) = receiver.recv().await {
        Span::current().pb_inc(1);
        outcomes.push(outcome);
    }

    if outcomes.len() != paths.len() {
        for (index, path) in paths.iter().enumerate() {
            if !outcomes.iter().any(|(i, _)| *i == index) {
                outcomes.push((
                    index,
                    FileOutcome {
                        path: path.clone(),
                        result: Err(UpdateError::Worker {
                            path: path.clone(),
                            reason: "task panicked".to_string(),
                        }),
                    },
                ));
            }
        }
    }

    outcomes.sort_by_key(|(index, _)| *index);
    outcomes.into_iter().map(|(_, outcome)| outcome).collect()
}

/// Processes one file completely, and only then writes it back.
pub async fn process_file(
    path: &str,
    options: &EngineOptions,
    producer: &dyn ExecutionProvider,
    mode: UpdateMode,
) -> Result<EngineResult, UpdateError> {
    let full_path = options.working_dir.join(path);
    let io_error = |source| UpdateError::Io {
        path: path.to_string(),
        source,
    };

    let file = File::open(&full_path).await.map_err(io_error)?;
    let result = dry_run(BufReader::new(file), options, producer)
        .await
        .map_err(|source| UpdateError::Engine {
            path: path.to_string(),
            source,
        })?;

    if mode == UpdateMode::Apply && result.is_dirty() {
        write_back(&full_path, &result).await.map_err(io_error)?;
    }

    Ok(result)
}

async fn write_back(path: &Path, result: &EngineResult) -> std::io::Result<()> {
    debug!("Writing {} changed lines to {}", result.changed_count, path.display());
    tokio::fs::write(path, result.render()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::prelude::{DEFAULT_MARKER, EngineError};
    use crate::shared::prelude::{DefaultExecutionProvider, MockExecutionProvider, OutputCaptureBuilder};
    use assert_fs::TempDir;
    use assert_fs::prelude::*;

    const CHANGING: &str = "v: '0.39.0' # selfup {\"extract\": \"\\\\d[^']+\", \"replacer\": [\"echo\", \"0.76.9\"]}\n";
    const MISSING: &str = "v: '0.39.0' # selfup {\"extract\": \"\\\\d[^']+\", \"replacer\": [\"this_command_does_not_exist\"]}\n";

    fn setup(files: &[(&str, &str)]) -> (TempDir, Arc<EngineOptions>) {
        let temp = TempDir::new().unwrap();
        for (name, content) in files {
            temp.child(name).write_str(content).unwrap();
        }
        let options =
            EngineOptions::new(DEFAULT_MARKER, None, temp.path().to_path_buf()).unwrap();
        (temp, Arc::new(options))
    }

    fn paths(input: &[&str]) -> Vec<String> {
        input.iter().map(|x| x.to_string()).collect()
    }

    #[tokio::test]
    async fn test_apply_writes_changed_files() {
        let (temp, options) = setup(&[("a.yml", CHANGING), ("b.yml", "nothing\n")]);

        let outcomes = process_files(
            &paths(&["a.yml", "b.yml"]),
            options,
            Arc::new(DefaultExecutionProvider::default()),
            UpdateMode::Apply,
            2,
        )
        .await;

        assert_eq!(2, outcomes.len());
        assert_eq!("a.yml", outcomes[0].path);
        assert_eq!(1, outcomes[0].result.as_ref().unwrap().changed_count);
        assert_eq!(0, outcomes[1].result.as_ref().unwrap().total);
        temp.child("a.yml")
            .assert(predicates::str::contains("v: '0.76.9' # selfup"));
        temp.child("b.yml").assert("nothing\n");
    }

    #[tokio::test]
    async fn test_list_never_writes() {
        let (temp, options) = setup(&[("a.yml", CHANGING)]);

        let outcomes = process_files(
            &paths(&["a.yml"]),
            options,
            Arc::new(DefaultExecutionProvider::default()),
            UpdateMode::List,
            1,
        )
        .await;

        assert_eq!(1, outcomes[0].result.as_ref().unwrap().changed_count);
        temp.child("a.yml").assert(CHANGING);
    }

    #[tokio::test]
    async fn test_failing_file_is_untouched_and_siblings_continue() {
        let content = format!("{}{}", CHANGING, MISSING);
        let (temp, options) = setup(&[("broken.yml", content.as_str()), ("ok.yml", CHANGING)]);

        let outcomes = process_files(
            &paths(&["broken.yml", "ok.yml", "missing.yml"]),
            options,
            Arc::new(DefaultExecutionProvider::default()),
            UpdateMode::Apply,
            1,
        )
        .await;

        assert!(matches!(
            &outcomes[0].result,
            Err(UpdateError::Engine {
                source: EngineError::ProducerFailure { line_number: 2, .. },
                ..
            })
        ));
        assert!(outcomes[1].result.is_ok());
        assert!(matches!(&outcomes[2].result, Err(UpdateError::Io { .. })));

        assert_eq!(
            content,
            std::fs::read_to_string(temp.child("broken.yml").path()).unwrap()
        );
        temp.child("ok.yml")
            .assert(predicates::str::contains("0.76.9' # selfup"));
    }

    #[tokio::test]
    async fn test_engine_error_display_carries_path_and_line() {
        let (_temp, options) = setup(&[("broken.yml", MISSING)]);
        let error = process_file(
            "broken.yml",
            &options,
            &DefaultExecutionProvider::default(),
            UpdateMode::Apply,
        )
        .await
        .unwrap_err();

        assert!(
            error
                .to_string()
                .starts_with("broken.yml:1: Executing this_command_does_not_exist has failed.")
        );
    }

    #[tokio::test]
    async fn test_non_utf8_bytes_survive_write_back() {
        let (temp, options) = setup(&[]);
        let mut content = b"caf\xe9\n".to_vec();
        content.extend_from_slice(CHANGING.as_bytes());
        temp.child("latin1.yml").write_binary(&content).unwrap();

        let outcomes = process_files(
            &paths(&["latin1.yml"]),
            options,
            Arc::new(DefaultExecutionProvider::default()),
            UpdateMode::Apply,
            1,
        )
        .await;

        assert_eq!(1, outcomes[0].result.as_ref().unwrap().changed_count);
        let written = std::fs::read(temp.child("latin1.yml").path()).unwrap();
        assert!(written.starts_with(b"caf\xe9\nv: '0.76.9' # selfup"));
    }

    #[test]
    fn test_fan_out_can_move_across_threads() {
        fn assert_send<T: Send>(_: T) {}

        let (_temp, options) = setup(&[]);
        assert_send(process_files(
            &[],
            options,
            Arc::new(DefaultExecutionProvider::default()),
            UpdateMode::List,
            1,
        ));
    }

    #[tokio::test]
    async fn test_shared_producer_across_files() {
        let (_temp, options) = setup(&[("a.yml", CHANGING), ("b.yml", CHANGING)]);
        let mut exec_runner = MockExecutionProvider::new();
        exec_runner.expect_run_command().times(2).returning(|_| {
            Ok(OutputCaptureBuilder::default()
                .stdout("0.39.0\n")
                .exit_code(Some(0))
                .build()
                .unwrap())
        });

        let outcomes = process_files(
            &paths(&["a.yml", "b.yml"]),
            options,
            Arc::new(exec_runner),
            UpdateMode::Apply,
            4,
        )
        .await;

        for outcome in outcomes {
            let result = outcome.result.unwrap();
            assert_eq!(1, result.total);
            assert_eq!(0, result.changed_count);
        }
    }
}
