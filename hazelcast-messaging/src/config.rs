//! Messaging configuration types and builders.

use std::time::Duration;

use hazelcast_core::protocol::FRAME_HEADER_SIZE;
use hazelcast_core::HazelcastError;

/// Default capacity of a connection's read buffer.
const DEFAULT_READ_BUFFER_CAPACITY: usize = 8192;

/// Configuration error returned when validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for HazelcastError {
    fn from(err: ConfigError) -> Self {
        HazelcastError::Configuration(err.message)
    }
}

/// Settings of a [`MessageConnection`](crate::MessageConnection).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagingConfig {
    read_buffer_capacity: usize,
    max_frame_length: Option<u32>,
    fragment_idle_timeout: Option<Duration>,
}

impl MessagingConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> MessagingConfigBuilder {
        MessagingConfigBuilder::new()
    }

    /// Returns the initial capacity of the read buffer.
    pub fn read_buffer_capacity(&self) -> usize {
        self.read_buffer_capacity
    }

    /// Returns the largest accepted frame length, header included.
    ///
    /// `None` accepts any length the 4-byte field can express.
    pub fn max_frame_length(&self) -> Option<u32> {
        self.max_frame_length
    }

    /// Returns how long an incomplete fragmented message may go without a
    /// new fragment before it is dropped.
    ///
    /// `None` keeps incomplete messages until the connection closes.
    pub fn fragment_idle_timeout(&self) -> Option<Duration> {
        self.fragment_idle_timeout
    }

    /// Loads configuration from environment variables.
    ///
    /// # Supported Environment Variables
    ///
    /// | Variable | Maps to |
    /// |----------|---------|
    /// | `HZ_READ_BUFFER_CAPACITY` | Read buffer capacity in bytes |
    /// | `HZ_MAX_FRAME_LENGTH` | Maximum frame length in bytes |
    /// | `HZ_FRAGMENT_IDLE_TIMEOUT_MS` | Fragment idle timeout in milliseconds |
    ///
    /// Unset variables keep their defaults; unparsable values are rejected.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = MessagingConfigBuilder::new();

        if let Ok(val) = std::env::var("HZ_READ_BUFFER_CAPACITY") {
            builder = builder.read_buffer_capacity(parse_env("HZ_READ_BUFFER_CAPACITY", &val)?);
        }

        if let Ok(val) = std::env::var("HZ_MAX_FRAME_LENGTH") {
            builder = builder.max_frame_length(parse_env("HZ_MAX_FRAME_LENGTH", &val)?);
        }

        if let Ok(val) = std::env::var("HZ_FRAGMENT_IDLE_TIMEOUT_MS") {
            let ms: u64 = parse_env("HZ_FRAGMENT_IDLE_TIMEOUT_MS", &val)?;
            builder = builder.fragment_idle_timeout(Duration::from_millis(ms));
        }

        builder.build()
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::new(format!("{name} has invalid value '{value}'")))
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            read_buffer_capacity: DEFAULT_READ_BUFFER_CAPACITY,
            max_frame_length: None,
            fragment_idle_timeout: None,
        }
    }
}

/// Builder for `MessagingConfig`.
#[derive(Debug, Clone, Default)]
pub struct MessagingConfigBuilder {
    read_buffer_capacity: Option<usize>,
    max_frame_length: Option<u32>,
    fragment_idle_timeout: Option<Duration>,
}

impl MessagingConfigBuilder {
    /// Creates a new messaging configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial capacity of the read buffer.
    pub fn read_buffer_capacity(mut self, capacity: usize) -> Self {
        self.read_buffer_capacity = Some(capacity);
        self
    }

    /// Sets the largest accepted frame length, header included.
    pub fn max_frame_length(mut self, length: u32) -> Self {
        self.max_frame_length = Some(length);
        self
    }

    /// Sets the idle timeout for incomplete fragmented messages.
    pub fn fragment_idle_timeout(mut self, timeout: Duration) -> Self {
        self.fragment_idle_timeout = Some(timeout);
        self
    }

    /// Builds the messaging configuration.
    pub fn build(self) -> Result<MessagingConfig, ConfigError> {
        let read_buffer_capacity = self
            .read_buffer_capacity
            .unwrap_or(DEFAULT_READ_BUFFER_CAPACITY);
        if read_buffer_capacity == 0 {
            return Err(ConfigError::new("read_buffer_capacity must be greater than zero"));
        }

        if let Some(length) = self.max_frame_length {
            if (length as usize) < FRAME_HEADER_SIZE {
                return Err(ConfigError::new(format!(
                    "max_frame_length must be at least {FRAME_HEADER_SIZE}"
                )));
            }
        }

        if self.fragment_idle_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::new("fragment_idle_timeout must be non-zero"));
        }

        Ok(MessagingConfig {
            read_buffer_capacity,
            max_frame_length: self.max_frame_length,
            fragment_idle_timeout: self.fragment_idle_timeout,
        })
    }
}
