use crate::{
    core::{Phase, RecordRef, StatusReporter},
    k8s::{
        self,
        config::{Backend, Frontend, Listen, Resolver},
        proxy::Instance,
        ResourceExt,
    },
    output::Output,
    status::{KubeStatusReporter, KubeStore},
    synth::{CancellationToken, Records, SynthesisMetrics, Synthesizer},
};
use anyhow::{Context, Result};
use tokio::time::{self, Duration, MissedTickBehavior};

/// Resynthesizes one instance's configuration and writes it out whenever it
/// changes.
pub(crate) struct Controller {
    client: k8s::Client,
    namespace: String,
    instance: String,
    synthesizer: Synthesizer<KubeStore, Reporter>,
    output: Output,
    fingerprint: Option<String>,
}

/// Status writes can be turned off, e.g. while a second controller is
/// observing the same records.
enum Reporter {
    Kube(KubeStatusReporter),
    Disabled,
}

// === impl Controller ===

impl Controller {
    pub(crate) fn new(
        client: k8s::Client,
        namespace: String,
        instance: String,
        no_status: bool,
        output: Output,
        metrics: SynthesisMetrics,
    ) -> Self {
        let reporter = if no_status {
            Reporter::Disabled
        } else {
            Reporter::Kube(KubeStatusReporter::new(client.clone()))
        };
        let synthesizer =
            Synthesizer::new(KubeStore::new(client.clone()), reporter).with_metrics(metrics);

        Self {
            client,
            namespace,
            instance,
            synthesizer,
            output,
            fingerprint: None,
        }
    }

    /// Runs passes on every tick until `cancel` fires.
    pub(crate) async fn run(mut self, interval: Duration, cancel: CancellationToken) {
        let mut ticks = time::interval(interval);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Shutting down");
                    return;
                }
                _ = ticks.tick() => {}
            }

            if let Err(error) = self.reconcile(&cancel).await {
                tracing::warn!(%error, "Failed to synthesize configuration");
            }
        }
    }

    /// Runs a single pass.
    pub(crate) async fn once(mut self, cancel: &CancellationToken) -> Result<()> {
        self.reconcile(cancel).await
    }

    async fn reconcile(&mut self, cancel: &CancellationToken) -> Result<()> {
        let (instance, records) = self.fetch().await?;
        let artifacts = self.synthesizer.synthesize(&instance, &records, cancel).await?;

        // The previous output stays in place until a pass succeeds.
        if self.fingerprint.as_deref() == Some(artifacts.fingerprint.as_str()) {
            tracing::debug!(fingerprint = %artifacts.fingerprint, "Configuration unchanged");
            return Ok(());
        }
        self.output.write(&artifacts).await?;
        tracing::info!(
            fingerprint = %artifacts.fingerprint,
            output = %self.output,
            "Wrote configuration"
        );
        self.fingerprint = Some(artifacts.fingerprint);
        Ok(())
    }

    /// Reads the instance and the records its selector matches.
    async fn fetch(&self) -> Result<(Instance, Records)> {
        let instance = k8s::Api::<Instance>::namespaced(self.client.clone(), &self.namespace)
            .get(&self.instance)
            .await
            .with_context(|| format!("failed to get instance {}/{}", self.namespace, self.instance))?;
        let selector = &instance.spec.configuration.selector;

        let records = Records {
            listens: self.list::<Listen>(selector).await?,
            frontends: self.list::<Frontend>(selector).await?,
            backends: self.list::<Backend>(selector).await?,
            resolvers: self.list::<Resolver>(selector).await?,
        };
        tracing::debug!(
            listens = records.listens.len(),
            frontends = records.frontends.len(),
            backends = records.backends.len(),
            resolvers = records.resolvers.len(),
            "Fetched records"
        );
        Ok((instance, records))
    }

    async fn list<K>(&self, selector: &k8s::Selector) -> Result<Vec<K>>
    where
        K: k8s::Resource<Scope = k8s::NamespaceResourceScope, DynamicType = ()>
            + Clone
            + std::fmt::Debug
            + serde::de::DeserializeOwned,
    {
        let list = k8s::Api::<K>::namespaced(self.client.clone(), &self.namespace)
            .list(&k8s::ListParams::default())
            .await
            .with_context(|| format!("failed to list {}", K::kind(&())))?;
        Ok(list
            .items
            .into_iter()
            .filter(|record| selector.matches(Some(record.labels())))
            .collect())
    }
}

// === impl Reporter ===

#[async_trait::async_trait]
impl StatusReporter for Reporter {
    async fn set_status(&self, record: &RecordRef, phase: Phase, message: &str) -> Result<()> {
        match self {
            Self::Kube(reporter) => reporter.set_status(record, phase, message).await,
            Self::Disabled => {
                tracing::trace!(%record, ?phase, "Status reporting disabled");
                Ok(())
            }
        }
    }
}
