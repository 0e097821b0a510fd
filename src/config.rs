//! Configuration for the Aerospike demo
//!
//! Centralized configuration with the defaults the walkthrough expects.

use crate::error::{DemoError, Result};

/// Main configuration for a demo run
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Cluster Configuration
    // -------------------------------------------------------------------------
    /// Seed hosts as `host:port`. Update these for YOUR Aerospike instance.
    pub hosts: Vec<String>,

    /// Optional credentials for security-enabled clusters
    pub user: Option<String>,
    pub password: Option<String>,

    /// Initial connection / cluster tend timeout (milliseconds)
    pub connect_timeout_ms: u64,

    /// Per-write timeout (milliseconds). Adjust for slow demo machines.
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Record Layout
    // -------------------------------------------------------------------------
    pub namespace: String,

    /// Set and key of the record most steps operate on
    pub set: String,
    pub key: String,

    /// Record the increment step writes to
    pub add_set: String,
    pub add_key: String,

    /// Record the expiration step writes to
    pub ttl_set: String,
    pub ttl_key: String,

    // -------------------------------------------------------------------------
    // Step Parameters
    // -------------------------------------------------------------------------
    /// TTL given to the expiring record (seconds)
    pub ttl_seconds: u32,

    /// How long to wait before checking the expiring record again (milliseconds)
    pub ttl_wait_ms: u64,

    /// Number of records written and then batch-read
    pub batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hosts: vec!["192.168.1.11:3000".to_string(), "192.168.1.23:3000".to_string()],
            user: None,
            password: None,
            connect_timeout_ms: 30_000,
            write_timeout_ms: 1000,
            namespace: "test".to_string(),
            set: "myset".to_string(),
            key: "mykey".to_string(),
            add_set: "myAddSet".to_string(),
            add_key: "myAddKey".to_string(),
            ttl_set: "myTtlSet".to_string(),
            ttl_key: "myTtlKey".to_string(),
            ttl_seconds: 2,
            ttl_wait_ms: 4000,
            batch_size: 1024,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Seed hosts in the comma-separated form the client accepts
    pub fn hosts_string(&self) -> String {
        self.hosts.join(",")
    }

    /// Check the config describes a run that can actually show something
    pub fn validate(&self) -> Result<()> {
        if self.hosts.is_empty() {
            return Err(DemoError::Config("at least one seed host is required".to_string()));
        }

        for host in &self.hosts {
            let valid = match host.rsplit_once(':') {
                Some((name, port)) => !name.is_empty() && port.parse::<u16>().is_ok(),
                None => false,
            };
            if !valid {
                return Err(DemoError::Config(format!(
                    "invalid host '{}', expected host:port",
                    host
                )));
            }
        }

        if self.namespace.is_empty() {
            return Err(DemoError::Config("namespace must not be empty".to_string()));
        }

        if self.batch_size == 0 {
            return Err(DemoError::Config("batch size must be at least 1".to_string()));
        }

        if self.ttl_seconds == 0 {
            return Err(DemoError::Config("ttl must be at least 1 second".to_string()));
        }

        // Waiting less than the TTL would show the record still alive
        if self.ttl_wait_ms <= u64::from(self.ttl_seconds) * 1000 {
            return Err(DemoError::Config(format!(
                "ttl wait ({} ms) must exceed ttl ({} s)",
                self.ttl_wait_ms, self.ttl_seconds
            )));
        }

        if self.user.is_some() != self.password.is_some() {
            return Err(DemoError::Config(
                "user and password must be given together".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Replace the seed hosts
    pub fn hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Set credentials for a security-enabled cluster
    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.user = Some(user.into());
        self.config.password = Some(password.into());
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the namespace all demo records live in
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    /// Set the main set and key
    pub fn main_record(mut self, set: impl Into<String>, key: impl Into<String>) -> Self {
        self.config.set = set.into();
        self.config.key = key.into();
        self
    }

    /// Set the TTL of the expiring record (in seconds)
    pub fn ttl_seconds(mut self, secs: u32) -> Self {
        self.config.ttl_seconds = secs;
        self
    }

    /// Set how long the expiration step sleeps (in milliseconds)
    pub fn ttl_wait_ms(mut self, ms: u64) -> Self {
        self.config.ttl_wait_ms = ms;
        self
    }

    /// Set the number of records in the batch steps
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
