// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Broker configuration loaded from environment variables.

/// Connection and topology settings for the AMQP broker. Queue/exchange
/// names are fixed (`gradeforge.jobs`, `gradeforge.results`,
/// `gradeforge.events`) rather than configurable — one canonical naming
/// scheme, not a per-deployment choice.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub amqp_url: String,
    pub jobs_queue: String,
    pub results_queue: String,
    pub events_exchange: String,
    pub prefetch_count: u16,
}

const JOBS_QUEUE: &str = "gradeforge.jobs";
const RESULTS_QUEUE: &str = "gradeforge.results";
const EVENTS_EXCHANGE: &str = "gradeforge.events";

impl BrokerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let amqp_url = std::env::var("GRADEFORGE_AMQP_URL")
            .map_err(|_| ConfigError::MissingEnvVar("GRADEFORGE_AMQP_URL"))?;

        let prefetch_count = std::env::var("GRADEFORGE_AMQP_PREFETCH")
            .ok()
            .map(|v| v.parse().map_err(|_| ConfigError::InvalidPrefetch))
            .transpose()?
            .unwrap_or(1);

        Ok(Self {
            amqp_url,
            jobs_queue: JOBS_QUEUE.to_string(),
            results_queue: RESULTS_QUEUE.to_string(),
            events_exchange: EVENTS_EXCHANGE.to_string(),
            prefetch_count,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("Invalid prefetch count")]
    InvalidPrefetch,
}
