//! Failure classification of finished playbook runs

use crate::error::PlaybookError;
use std::fmt;
use std::sync::Arc;

/// Captured result of a finished playbook process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybookOutput {
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl PlaybookOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

impl From<std::process::Output> for PlaybookOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The provider refused to create an instance
    InstanceCreate,
    /// Anything else
    Pipeline,
}

type ClassifyFn = dyn Fn(&PlaybookOutput) -> FailureKind + Send + Sync;

/// Decides which error a failed playbook run surfaces as
#[derive(Clone)]
pub struct FailureClassifier {
    classify: Arc<ClassifyFn>,
}

impl FailureClassifier {
    /// Marker ansible prints when the cloud module fails to create an instance
    pub const INSTANCE_CREATE_MARKER: &'static str = "\"msg\": \"Error in creating instance";

    /// Classify by searching stdout and stderr for `marker`
    pub fn marker(marker: impl Into<String>) -> Self {
        let marker = marker.into();
        Self::custom(move |output| {
            if output.stdout.contains(&marker) || output.stderr.contains(&marker) {
                FailureKind::InstanceCreate
            } else {
                FailureKind::Pipeline
            }
        })
    }

    pub fn custom<F>(classify: F) -> Self
    where
        F: Fn(&PlaybookOutput) -> FailureKind + Send + Sync + 'static,
    {
        Self {
            classify: Arc::new(classify),
        }
    }

    pub fn classify(&self, output: &PlaybookOutput) -> FailureKind {
        (self.classify)(output)
    }

    /// Turn a failed run into the matching error
    pub fn to_error(&self, playbook: impl Into<String>, output: PlaybookOutput) -> PlaybookError {
        let playbook = playbook.into();
        match self.classify(&output) {
            FailureKind::InstanceCreate => PlaybookError::InstanceCreateFailure {
                playbook,
                exit_code: output.exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
            },
            FailureKind::Pipeline => PlaybookError::PipelineFailure {
                playbook,
                exit_code: output.exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
            },
        }
    }
}

impl Default for FailureClassifier {
    fn default() -> Self {
        Self::marker(Self::INSTANCE_CREATE_MARKER)
    }
}

impl fmt::Debug for FailureClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailureClassifier").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(stdout: &str, stderr: &str) -> PlaybookOutput {
        PlaybookOutput {
            exit_code: Some(2),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn test_default_marker() {
        let classifier = FailureClassifier::default();
        let output = failed(
            r#"fatal: [localhost]: FAILED! => {"changed": false, "msg": "Error in creating instance: SoftLayerAPIError"}"#,
            "",
        );
        assert_eq!(classifier.classify(&output), FailureKind::InstanceCreate);
        assert_eq!(classifier.classify(&failed("syntax error", "")), FailureKind::Pipeline);
    }

    #[test]
    fn test_to_error_carries_output() {
        let error = FailureClassifier::default().to_error("start_spark.yml", failed("out", "err"));
        match error {
            PlaybookError::PipelineFailure {
                playbook,
                exit_code,
                stdout,
                stderr,
            } => {
                assert_eq!(playbook, "start_spark.yml");
                assert_eq!(exit_code, Some(2));
                assert_eq!(stdout, "out");
                assert_eq!(stderr, "err");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_custom_classifier() {
        let classifier = FailureClassifier::custom(|output| {
            if output.stderr.contains("QuotaExceeded") {
                FailureKind::InstanceCreate
            } else {
                FailureKind::Pipeline
            }
        });

        let error = classifier.to_error("launch.yml", failed("", "QuotaExceeded: cores"));
        assert!(error.is_instance_create_failure());
    }
}
