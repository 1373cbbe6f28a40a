use crate::{
    controller::Controller,
    core::CONFIG_DIR,
    output::Output,
    synth::{CancellationToken, SynthesisMetrics},
};
use anyhow::{bail, Result};
use clap::Parser;
use prometheus_client::{encoding::text::encode, registry::Registry};
use std::path::PathBuf;
use tokio::time::Duration;
use tracing::{info_span, Instrument};

#[derive(Debug, Parser)]
#[clap(
    name = "haproxy-config-controller",
    about = "Synthesizes HAProxy configuration for a fleet instance"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "haproxy_config_controller=info,warn",
        env = "HAPROXY_CONFIG_CONTROLLER_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// The name of the Instance to synthesize.
    #[clap(long, env = "HAPROXY_INSTANCE_NAME")]
    instance: String,

    /// The namespace of the Instance and its records.
    #[clap(long, env = "HAPROXY_INSTANCE_NAMESPACE", default_value = "default")]
    namespace: String,

    /// Where the configuration and its side files are written.
    #[clap(long, default_value = CONFIG_DIR)]
    output_dir: PathBuf,

    /// Runs a single pass and prints the document instead of writing files.
    #[clap(long)]
    dry_run: bool,

    /// Leaves record statuses untouched.
    #[clap(long)]
    no_status: bool,

    #[clap(long, default_value = "10")]
    resync_interval_secs: u64,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            log_level,
            log_format,
            client,
            admin,
            instance,
            namespace,
            output_dir,
            dry_run,
            no_status,
            resync_interval_secs,
        } = self;

        let mut prom = <Registry>::default();
        let metrics = SynthesisMetrics::register(prom.sub_registry_with_prefix("synthesis"));

        if dry_run {
            let runtime = kubert::Runtime::builder()
                .with_log(log_level, log_format)
                .with_client(client)
                .build()
                .await?;
            let controller = Controller::new(
                runtime.client(),
                namespace,
                instance,
                no_status,
                Output::Print,
                metrics,
            );
            let result = controller.once(&CancellationToken::new()).await;

            let mut text = String::new();
            encode(&mut text, &prom)?;
            tracing::debug!(metrics = %text, "Synthesis metrics");
            return result;
        }

        let runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .build()
            .await?;

        let controller = Controller::new(
            runtime.client(),
            namespace,
            instance,
            no_status,
            Output::Dir(output_dir),
            metrics,
        );

        let cancel = CancellationToken::new();
        let task = tokio::spawn(
            controller
                .run(Duration::from_secs(resync_interval_secs), cancel.clone())
                .instrument(info_span!("synthesis")),
        );

        // Block on the shutdown signal, then stop any pass in flight.
        let result = runtime.run().await;
        cancel.cancel();
        if let Err(error) = task.await {
            tracing::warn!(%error, "Synthesis task failed");
        }
        if result.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}
