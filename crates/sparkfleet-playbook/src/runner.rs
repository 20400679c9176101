//! ansible-playbook process wrapper

use crate::classify::{FailureClassifier, PlaybookOutput};
use crate::error::{PlaybookError, Result};
use crate::invocation::PipelineInvocation;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Runs one configuration stage
#[async_trait]
pub trait PlaybookRunner: Send + Sync {
    /// Run the playbook to completion.
    ///
    /// A zero exit is success regardless of what the playbook printed.
    async fn run(&self, invocation: &PipelineInvocation) -> Result<PlaybookOutput>;
}

/// ansible-playbook CLI wrapper
#[derive(Debug, Clone)]
pub struct AnsiblePlaybook {
    program: PathBuf,
    connect_timeout: u32,
    classifier: FailureClassifier,
}

impl AnsiblePlaybook {
    /// Value passed to `--timeout` (connection timeout in seconds)
    pub const DEFAULT_CONNECT_TIMEOUT: u32 = 25;

    pub fn new() -> Self {
        Self {
            program: PathBuf::from("ansible-playbook"),
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            classifier: FailureClassifier::default(),
        }
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_connect_timeout(mut self, seconds: u32) -> Self {
        self.connect_timeout = seconds;
        self
    }

    pub fn with_classifier(mut self, classifier: FailureClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Argument vector for an invocation (program excluded)
    pub fn command_args(&self, invocation: &PipelineInvocation) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![invocation.playbook.clone().into()];

        if let Some(ref inventory) = invocation.inventory {
            args.push("-i".into());
            args.push(inventory.clone().into());
        }

        if !invocation.extra_vars.is_empty() {
            args.push("--extra-vars".into());
            args.push(invocation.extra_vars.to_arg().into());
        }

        args.push("--timeout".into());
        args.push(self.connect_timeout.to_string().into());
        args
    }
}

impl Default for AnsiblePlaybook {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlaybookRunner for AnsiblePlaybook {
    async fn run(&self, invocation: &PipelineInvocation) -> Result<PlaybookOutput> {
        let args = self.command_args(invocation);
        let playbook = invocation.playbook_name();

        let mut cmd = Command::new(&self.program);
        cmd.args(&args);
        if let Some(ref dir) = invocation.working_dir {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        tracing::debug!(
            "Running: {} {}",
            self.program.display(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let output = match invocation.timeout {
            Some(timeout) => tokio::time::timeout(timeout, cmd.output())
                .await
                .map_err(|_| PlaybookError::Timeout {
                    playbook: playbook.clone(),
                    timeout,
                })?,
            None => cmd.output().await,
        };

        let output = match output {
            Ok(output) => PlaybookOutput::from(output),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PlaybookError::ProgramNotFound(
                    self.program.display().to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        if output.success() {
            tracing::debug!("Playbook {} finished", playbook);
            return Ok(output);
        }

        tracing::error!(
            "Playbook {} failed with exit code {:?}",
            playbook,
            output.exit_code
        );
        Err(self.classifier.to_error(playbook, output))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::vars::ExtraVars;
    use std::time::Duration;
    use tempfile::tempdir;

    // The fake playbook is a shell script handed to `sh`, so "$@" holds
    // everything after the playbook path.
    fn fake_playbook(dir: &std::path::Path, body: &str) -> PathBuf {
        let path = dir.join("fake.yml");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        path
    }

    fn runner() -> AnsiblePlaybook {
        AnsiblePlaybook::new().with_program("sh")
    }

    #[test]
    fn test_command_args() {
        let invocation = PipelineInvocation::new("sl_launch.yml")
            .with_inventory("/tmp/spark_inv_demo.ini")
            .with_extra_vars(ExtraVars::new().with("hostname", "demo01").with("cpus", 4u32));

        let args: Vec<String> = AnsiblePlaybook::new()
            .command_args(&invocation)
            .into_iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect();

        assert_eq!(
            args,
            vec![
                "sl_launch.yml",
                "-i",
                "/tmp/spark_inv_demo.ini",
                "--extra-vars",
                "cpus='4' hostname='demo01'",
                "--timeout",
                "25",
            ]
        );
    }

    #[test]
    fn test_command_args_without_vars() {
        let args = AnsiblePlaybook::new().command_args(&PipelineInvocation::new("start.yml"));
        assert_eq!(args.len(), 3);
        assert_eq!(args[1], "--timeout");
    }

    #[tokio::test]
    async fn test_run_passes_argv_verbatim() {
        let dir = tempdir().unwrap();
        let playbook = fake_playbook(dir.path(), r#"for a in "$@"; do echo "$a"; done"#);

        let invocation = PipelineInvocation::new(&playbook)
            .with_inventory("/tmp/inv.ini")
            .with_var("domain", "spark test; echo pwned");

        let output = runner().run(&invocation).await.unwrap();
        let lines: Vec<&str> = output.stdout.lines().collect();
        assert_eq!(
            lines,
            vec![
                "-i",
                "/tmp/inv.ini",
                "--extra-vars",
                "domain='spark test; echo pwned'",
                "--timeout",
                "25",
            ]
        );
    }

    #[tokio::test]
    async fn test_run_in_working_dir() {
        let dir = tempdir().unwrap();
        let workdir = tempdir().unwrap();
        let playbook = fake_playbook(dir.path(), "pwd");

        let invocation = PipelineInvocation::new(&playbook).with_working_dir(workdir.path());
        let output = runner().run(&invocation).await.unwrap();

        assert_eq!(
            std::fs::canonicalize(output.stdout.trim()).unwrap(),
            std::fs::canonicalize(workdir.path()).unwrap()
        );
    }

    #[tokio::test]
    async fn test_zero_exit_with_marker_is_success() {
        let dir = tempdir().unwrap();
        let playbook = fake_playbook(
            dir.path(),
            r#"echo '"msg": "Error in creating instance, retried'; exit 0"#,
        );

        assert!(runner().run(&PipelineInvocation::new(&playbook)).await.is_ok());
    }

    #[tokio::test]
    async fn test_instance_create_failure() {
        let dir = tempdir().unwrap();
        let playbook = fake_playbook(
            dir.path(),
            r#"echo 'fatal: FAILED! => {"msg": "Error in creating instance: out of capacity"}'; exit 2"#,
        );

        let err = runner()
            .run(&PipelineInvocation::new(&playbook))
            .await
            .unwrap_err();
        assert!(err.is_instance_create_failure());
    }

    #[tokio::test]
    async fn test_pipeline_failure_keeps_output() {
        let dir = tempdir().unwrap();
        let playbook = fake_playbook(dir.path(), "echo 'PLAY RECAP'; echo 'boom' >&2; exit 4");

        let err = runner()
            .run(&PipelineInvocation::new(&playbook))
            .await
            .unwrap_err();
        match err {
            PlaybookError::PipelineFailure {
                exit_code,
                stdout,
                stderr,
                ..
            } => {
                assert_eq!(exit_code, Some(4));
                assert_eq!(stdout.trim(), "PLAY RECAP");
                assert_eq!(stderr.trim(), "boom");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invocation_timeout() {
        let dir = tempdir().unwrap();
        let playbook = fake_playbook(dir.path(), "sleep 5");

        let invocation =
            PipelineInvocation::new(&playbook).with_timeout(Duration::from_millis(100));
        let err = runner().run(&invocation).await.unwrap_err();
        assert!(matches!(err, PlaybookError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let err = AnsiblePlaybook::new()
            .with_program("/nonexistent/ansible-playbook")
            .run(&PipelineInvocation::new("site.yml"))
            .await
            .unwrap_err();
        assert!(matches!(err, PlaybookError::ProgramNotFound(_)));
    }
}
