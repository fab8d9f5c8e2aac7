// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! C6: publishing jobs to, and consuming results from, the AMQP broker.
//!
//! Topology mirrors the source's hand-rolled `pika` consumer/publisher pair
//! (`lib/amqp.py`): a durable topic exchange, one durable queue per
//! direction, `basic_qos(prefetch_count=1)`, and acking a delivery once its
//! callback has run regardless of whether the callback found anything to do
//! with it.

use futures_util::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicPublishOptions, BasicQosOptions,
    ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions,
};
use lapin::publisher_confirm::Confirmation;
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};
use tracing::{debug, instrument, warn};

use chrono::Utc;

use crate::config::BrokerConfig;
use crate::error::Result;
use crate::job::Job;
use crate::result::{JobResult, ResultStore};

/// Declares `config.events_exchange` as a durable topic exchange, then
/// declares and binds `queue_name` to it under `routing_key`.
async fn setup_topology(channel: &Channel, config: &BrokerConfig, queue_name: &str, routing_key: &str) -> Result<()> {
    channel
        .exchange_declare(
            &config.events_exchange,
            ExchangeKind::Topic,
            ExchangeDeclareOptions { durable: true, ..Default::default() },
            FieldTable::default(),
        )
        .await?;

    channel
        .queue_declare(
            queue_name,
            QueueDeclareOptions { durable: true, ..Default::default() },
            FieldTable::default(),
        )
        .await?;

    channel
        .queue_bind(
            queue_name,
            &config.events_exchange,
            routing_key,
            QueueBindOptions::default(),
            FieldTable::default(),
        )
        .await?;

    Ok(())
}

/// Publishes `Job`s onto the jobs queue.
pub struct Publisher {
    channel: Channel,
    config: BrokerConfig,
}

impl Publisher {
    #[instrument(skip(config))]
    pub async fn connect(config: BrokerConfig) -> Result<Self> {
        let connection =
            Connection::connect(&config.amqp_url, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;
        channel.confirm_select(Default::default()).await?;
        setup_topology(&channel, &config, &config.jobs_queue, &config.jobs_queue).await?;
        Ok(Publisher { channel, config })
    }

    #[instrument(skip(self, job))]
    pub async fn publish(&self, job: &Job) -> Result<Confirmation> {
        let payload = serde_json::to_vec(job)?;
        let confirm = self
            .channel
            .basic_publish(
                &self.config.events_exchange,
                &self.config.jobs_queue,
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default().with_content_type("application/json".into()),
            )
            .await?
            .await?;
        debug!(job_id = %job.id, ?confirm, "published job");
        Ok(confirm)
    }
}

/// Consumes `JobResult`s off the results queue, handing each to a callback.
/// Every delivery is acked after the callback runs, whether or not the
/// callback found a matching job to reconcile — a malformed or unknown
/// result should not jam the queue.
pub struct Consumer {
    channel: Channel,
    queue_name: String,
    consumer_tag: String,
}

impl Consumer {
    #[instrument(skip(config))]
    pub async fn connect(config: BrokerConfig, consumer_tag: &str) -> Result<Self> {
        let connection =
            Connection::connect(&config.amqp_url, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;
        setup_topology(&channel, &config, &config.results_queue, &config.results_queue).await?;
        channel
            .basic_qos(config.prefetch_count, BasicQosOptions::default())
            .await?;
        Ok(Consumer {
            channel,
            queue_name: config.results_queue.clone(),
            consumer_tag: consumer_tag.to_string(),
        })
    }

    /// Run the consume loop, reconciling every `JobResult` that parses
    /// against `store`. A message is acknowledged after reconciliation
    /// regardless of outcome — a malformed or unreconcilable verdict is not
    /// recoverable by re-delivery, so it must not block the queue.
    #[instrument(skip(self, store))]
    pub async fn run(&self, store: &dyn ResultStore) -> Result<()> {
        let mut consumer = self
            .channel
            .basic_consume(
                &self.queue_name,
                &self.consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;

        while let Some(delivery) = consumer.next().await {
            let delivery = delivery?;
            match serde_json::from_slice::<JobResult>(&delivery.data) {
                Ok(result) => reconcile(store, result),
                Err(err) => {
                    let err = crate::error::DispatchError::MalformedResult(err);
                    warn!(%err, "discarding malformed result message");
                }
            }
            delivery.ack(BasicAckOptions::default()).await?;
        }
        Ok(())
    }
}

/// Looks up the persisted record for `result.id` and applies the verdict if
/// it is still PENDING. An unknown job id or a record already in a terminal
/// state is a `ReconciliationAnomaly`: logged and swallowed, never surfaced.
/// Each `ProgramResult` is also logged against the `Program` id it came
/// back for, not just the job-level id, so a single test case's verdict can
/// be traced without pulling the whole job.
fn reconcile(store: &dyn ResultStore, result: JobResult) {
    let job_id = result.id;
    for program_result in &result.results {
        debug!(%job_id, program_id = program_result.id, status = ?program_result.status, "reconciled program result");
    }
    if !store.record_result(result, Utc::now()) {
        warn!(%job_id, "reconciliation anomaly: unknown or already-terminal job id");
    }
}
