//! SSH readiness polling for freshly created nodes

use crate::error::{ClusterError, Result};
use async_trait::async_trait;
use std::net::IpAddr;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

/// Retry policy for readiness polling
#[derive(Debug, Clone)]
pub struct ReadinessPolicy {
    /// Total connection attempts
    pub max_attempts: u32,

    /// Wait after the first failed attempt. Every further wait is the square
    /// of the previous one in seconds (5s, 25s, ...).
    pub initial_delay: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(5),
        }
    }
}

impl ReadinessPolicy {
    /// Square of `delay` in seconds, saturating at `Duration::MAX`
    ///
    /// Never shorter than `delay`, so sub-second waits do not shrink.
    pub fn next_delay(delay: Duration) -> Duration {
        let secs = delay.as_secs_f64();
        Duration::try_from_secs_f64(secs * secs)
            .unwrap_or(Duration::MAX)
            .max(delay)
    }

    /// Waits between attempts, in order
    pub fn delays(&self) -> Vec<Duration> {
        let mut delays = Vec::new();
        let mut delay = self.initial_delay;
        for _ in 1..self.max_attempts {
            delays.push(delay);
            delay = Self::next_delay(delay);
        }
        delays
    }
}

/// A remote control channel to probe
///
/// `probe` must not leave a session open: a successful connection is closed
/// before returning, and a failed one is cleaned up.
#[async_trait]
pub trait ControlChannel: Send + Sync {
    async fn probe(&self, address: IpAddr, user: &str) -> std::io::Result<()>;
}

/// Probes by running `ssh user@address true`
#[derive(Debug, Clone)]
pub struct SshCommandChannel {
    program: PathBuf,
    connect_timeout: u32,
}

impl SshCommandChannel {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("ssh"),
            connect_timeout: 10,
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

    pub fn command_args(&self, address: IpAddr, user: &str) -> Vec<String> {
        vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout),
            "-o".to_string(),
            "StrictHostKeyChecking=no".to_string(),
            "-o".to_string(),
            "UserKnownHostsFile=/dev/null".to_string(),
            "-l".to_string(),
            user.to_string(),
            address.to_string(),
            "true".to_string(),
        ]
    }
}

impl Default for SshCommandChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ControlChannel for SshCommandChannel {
    async fn probe(&self, address: IpAddr, user: &str) -> std::io::Result<()> {
        let output = Command::new(&self.program)
            .args(self.command_args(address, user))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            stderr.trim().to_string(),
        ))
    }
}

/// Waits until a node accepts control-channel connections
#[derive(Clone)]
pub struct ReadinessProber {
    channel: Arc<dyn ControlChannel>,
    policy: ReadinessPolicy,
}

impl ReadinessProber {
    pub fn new(channel: Arc<dyn ControlChannel>) -> Self {
        Self {
            channel,
            policy: ReadinessPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ReadinessPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &ReadinessPolicy {
        &self.policy
    }

    pub async fn wait_ready(&self, hostname: &str, address: IpAddr, user: &str) -> Result<()> {
        let mut delay = self.policy.initial_delay;

        for attempt in 1..=self.policy.max_attempts {
            match self.channel.probe(address, user).await {
                Ok(()) => {
                    tracing::info!("{} ({}) accepts SSH connections", hostname, address);
                    return Ok(());
                }
                Err(e) if attempt < self.policy.max_attempts => {
                    tracing::warn!(
                        "SSH to {} ({}) failed on attempt {}/{}: {}; retrying in {:?}",
                        hostname,
                        address,
                        attempt,
                        self.policy.max_attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    delay = ReadinessPolicy::next_delay(delay);
                }
                Err(e) => {
                    tracing::error!("SSH to {} ({}) failed: {}", hostname, address, e);
                }
            }
        }

        Err(ClusterError::ReadinessTimeout {
            hostname: hostname.to_string(),
            address,
            attempts: self.policy.max_attempts,
        })
    }
}

impl Default for ReadinessProber {
    fn default() -> Self {
        Self::new(Arc::new(SshCommandChannel::new()))
    }
}

impl std::fmt::Debug for ReadinessProber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadinessProber")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Fails until `succeed_on` (1-based); records when each attempt happened
    struct FlakyChannel {
        succeed_on: Option<usize>,
        attempts: Mutex<Vec<Instant>>,
    }

    impl FlakyChannel {
        fn new(succeed_on: Option<usize>) -> Self {
            Self {
                succeed_on,
                attempts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ControlChannel for FlakyChannel {
        async fn probe(&self, _address: IpAddr, _user: &str) -> std::io::Result<()> {
            let mut attempts = self.attempts.lock().unwrap();
            attempts.push(Instant::now());
            if Some(attempts.len()) == self.succeed_on {
                Ok(())
            } else {
                Err(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "connection refused",
                ))
            }
        }
    }

    fn address() -> IpAddr {
        "10.0.0.1".parse().unwrap()
    }

    #[test]
    fn test_delays_are_squared() {
        assert_eq!(
            ReadinessPolicy::default().delays(),
            vec![Duration::from_secs(5), Duration::from_secs(25)]
        );

        let policy = ReadinessPolicy {
            max_attempts: 4,
            initial_delay: Duration::from_secs(2),
        };
        assert_eq!(
            policy.delays(),
            vec![
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(16)
            ]
        );
    }

    #[test]
    fn test_long_policy_saturates() {
        let policy = ReadinessPolicy {
            max_attempts: 7,
            initial_delay: Duration::from_secs(5),
        };
        let delays = policy.delays();

        assert_eq!(delays.len(), 6);
        assert_eq!(delays[3], Duration::from_secs(390_625));
        assert_eq!(delays[4], Duration::from_secs(152_587_890_625));
        assert_eq!(delays[5], Duration::MAX);
        assert!(delays.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(ReadinessPolicy::next_delay(Duration::MAX), Duration::MAX);
    }

    #[test]
    fn test_sub_second_delay_does_not_shrink() {
        let half = Duration::from_millis(500);
        assert_eq!(ReadinessPolicy::next_delay(half), half);
        assert_eq!(ReadinessPolicy::next_delay(Duration::ZERO), Duration::ZERO);
        assert_eq!(
            ReadinessPolicy::next_delay(Duration::from_secs(1)),
            Duration::from_secs(1)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_three_attempts() {
        let channel = Arc::new(FlakyChannel::new(None));
        let prober = ReadinessProber::new(channel.clone());
        let start = Instant::now();

        let err = prober
            .wait_ready("demo01", address(), "centos")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClusterError::ReadinessTimeout { attempts: 3, .. }
        ));

        let offsets: Vec<Duration> = channel
            .attempts
            .lock()
            .unwrap()
            .iter()
            .map(|t| t.duration_since(start))
            .collect();
        assert_eq!(
            offsets,
            vec![
                Duration::from_secs(0),
                Duration::from_secs(5),
                Duration::from_secs(30)
            ]
        );
        // no wait after the final attempt
        assert_eq!(start.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_second_attempt() {
        let channel = Arc::new(FlakyChannel::new(Some(2)));
        let prober = ReadinessProber::new(channel.clone());
        let start = Instant::now();

        prober.wait_ready("demo01", address(), "centos").await.unwrap();

        assert_eq!(channel.attempts.lock().unwrap().len(), 2);
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_success_does_not_sleep() {
        let channel = Arc::new(FlakyChannel::new(Some(1)));
        let prober = ReadinessProber::new(channel.clone());
        let start = Instant::now();

        prober.wait_ready("demo01", address(), "centos").await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_ssh_args() {
        let args = SshCommandChannel::new().command_args(address(), "centos");
        assert_eq!(&args[args.len() - 4..], &["-l", "centos", "10.0.0.1", "true"]);
        assert!(args.contains(&"BatchMode=yes".to_string()));
    }

    #[tokio::test]
    async fn test_ssh_channel_missing_program() {
        let channel = SshCommandChannel::new().with_program("/nonexistent/ssh");
        assert!(channel.probe(address(), "centos").await.is_err());
    }
}
