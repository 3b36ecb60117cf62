// ABOUTME: Structured logging setup built on tracing and tracing-subscriber
// ABOUTME: Console output for development, JSON output for production deployments
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::config::{GuruFocusConfig, LogFormat};
use anyhow::Result;
use std::env;
use std::io;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Logging configuration for the server process.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level directive (trace, debug, info, warn, error).
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Console,
        }
    }
}

impl LoggingConfig {
    /// Derive logging settings from the resolved client configuration.
    #[must_use]
    pub fn from_config(config: &GuruFocusConfig) -> Self {
        Self {
            level: config.log_level.to_lowercase(),
            format: config.log_format,
        }
    }

    /// Initialize the global tracing subscriber.
    ///
    /// `RUST_LOG` takes precedence over the configured level so operators can
    /// raise verbosity per-module without touching GURUFOCUS_* settings.
    /// Logs go to stderr: stdout carries the MCP protocol stream.
    ///
    /// # Errors
    ///
    /// Returns an error if a subscriber is already installed.
    pub fn init(&self) -> Result<()> {
        let filter = env::var("RUST_LOG")
            .map_or_else(|_| EnvFilter::new(&self.level), EnvFilter::new);

        match self.format {
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(
                        fmt::layer()
                            .json()
                            .with_current_span(true)
                            .with_writer(io::stderr),
                    )
                    .try_init()
                    .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;
            }
            LogFormat::Console => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().with_target(true).with_writer(io::stderr))
                    .try_init()
                    .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;
            }
        }

        Ok(())
    }
}
