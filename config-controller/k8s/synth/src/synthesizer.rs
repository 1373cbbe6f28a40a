use crate::{
    assemble::{self, Normalized, NormalizedRecords, Registry},
    error::{MappingError, SynthesisError},
    metrics::SynthesisMetrics,
    normalize,
    sidefiles::SideFiles,
    Records,
};
use haproxy_config_controller_core::{
    ConfigArtifactSet, KeyValueStore, Kind, Phase, RecordRef, StatusReporter, ValidationError,
};
use haproxy_config_controller_k8s_api::{proxy::Instance, Resource, ResourceExt};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Runs synthesis passes against a value store and a status sink.
///
/// The synthesizer holds no state between passes: every pass recomputes
/// everything from the records it is given.
pub struct Synthesizer<S, R> {
    store: S,
    status: R,
    metrics: Option<SynthesisMetrics>,
}

// === impl Synthesizer ===

impl<S, R> Synthesizer<S, R>
where
    S: KeyValueStore + Send + Sync,
    R: StatusReporter + Send + Sync,
{
    pub fn new(store: S, status: R) -> Self {
        Self {
            store,
            status,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: SynthesisMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Synthesizes the configuration of `instance` from `records`.
    ///
    /// The token is checked between records and between value lookups; a
    /// cancelled pass returns [`SynthesisError::Cancelled`] without touching
    /// any status.
    pub async fn synthesize(
        &self,
        instance: &Instance,
        records: &Records,
        cancel: &CancellationToken,
    ) -> Result<ConfigArtifactSet, SynthesisError> {
        let started = Instant::now();
        let instance_ref = RecordRef::new(
            Kind::Instance,
            instance.namespace().unwrap_or_default(),
            instance.name_any(),
        );
        tracing::debug!(
            namespace = %instance_ref.namespace,
            name = %instance_ref.name,
            records = records.len(),
            "Synthesizing configuration"
        );

        let result = self.pass(&instance_ref, instance, records, cancel).await;
        match &result {
            Ok((artifacts, used)) => {
                tracing::info!(
                    namespace = %instance_ref.namespace,
                    name = %instance_ref.name,
                    fingerprint = %artifacts.fingerprint,
                    files = artifacts.files.len(),
                    "Synthesized configuration"
                );
                for record in used.iter().chain(Some(&instance_ref)) {
                    self.report(record, Phase::Active, "").await;
                }
                if let Some(metrics) = &self.metrics {
                    metrics.pass("ok", started.elapsed());
                    metrics.set_side_files(artifacts.files.len());
                }
            }
            Err(error) => {
                tracing::warn!(
                    namespace = %instance_ref.namespace,
                    name = %instance_ref.name,
                    %error,
                    "Synthesis failed"
                );
                if !matches!(error, SynthesisError::Cancelled) {
                    let message = error.status_message();
                    if let Some(record) = error.record().filter(|r| **r != instance_ref) {
                        self.report(record, Phase::Error, &message).await;
                    }
                    self.report(&instance_ref, Phase::Error, &message).await;
                }
                if let Some(metrics) = &self.metrics {
                    metrics.pass(error.result_label(), started.elapsed());
                }
            }
        }

        result.map(|(artifacts, _)| artifacts)
    }

    /// Returns the artifacts and the records that went into them.
    async fn pass(
        &self,
        instance_ref: &RecordRef,
        instance: &Instance,
        records: &Records,
        cancel: &CancellationToken,
    ) -> Result<(ConfigArtifactSet, Vec<RecordRef>), SynthesisError> {
        if cancel.is_cancelled() {
            return Err(SynthesisError::Cancelled);
        }

        let namespace = instance_ref.namespace.as_str();
        let model = normalize::instance(namespace, &instance_ref.name, &instance.spec)
            .map_err(mapping(instance_ref))?;

        let mut registry = Registry::new(instance_ref);
        let mut normalized = NormalizedRecords::default();

        // Listens claim their names first, then frontends, backends and
        // resolvers.
        for listen in assemble::sorted(&records.listens) {
            let entry = claim(&mut registry, Kind::Listen, namespace, listen, cancel, |name| {
                normalize::listen(namespace, name, &listen.spec)
            })?;
            normalized.listens.push(entry);
        }
        for frontend in assemble::sorted(&records.frontends) {
            let entry = claim(&mut registry, Kind::Frontend, namespace, frontend, cancel, |name| {
                normalize::frontend(namespace, name, &frontend.spec)
            })?;
            normalized.frontends.push(entry);
        }
        for backend in assemble::sorted(&records.backends) {
            let entry = claim(&mut registry, Kind::Backend, namespace, backend, cancel, |name| {
                normalize::backend(namespace, name, &backend.spec)
            })?;
            normalized.backends.push(entry);
        }
        for resolver in assemble::sorted(&records.resolvers) {
            let entry = claim(&mut registry, Kind::Resolver, namespace, resolver, cancel, |name| {
                normalize::resolver(name, &resolver.spec)
            })?;
            normalized.resolvers.push(entry);
        }

        let document = assemble::document(&model, &normalized);
        let files = SideFiles::new(&self.store, cancel)
            .generate(instance_ref, &model, &normalized)
            .await?;

        let used = normalized
            .listens
            .iter()
            .map(|n| n.record.clone())
            .chain(normalized.frontends.iter().map(|n| n.record.clone()))
            .chain(normalized.backends.iter().map(|n| n.record.clone()))
            .chain(normalized.resolvers.iter().map(|n| n.record.clone()))
            .collect();
        Ok((ConfigArtifactSet::new(document, files), used))
    }

    /// Status updates are best effort: a failed write is logged and does not
    /// change the outcome of the pass.
    async fn report(&self, record: &RecordRef, phase: Phase, message: &str) {
        if let Err(error) = self.status.set_status(record, phase, message).await {
            tracing::warn!(%record, %error, "Failed to update status");
        }
    }
}

/// Registers a record's name and normalizes it.
fn claim<K, T>(
    registry: &mut Registry,
    kind: Kind,
    namespace: &str,
    resource: &K,
    cancel: &CancellationToken,
    normalize: impl FnOnce(&str) -> Result<T, ValidationError>,
) -> Result<Normalized<T>, SynthesisError>
where
    K: Resource,
{
    if cancel.is_cancelled() {
        return Err(SynthesisError::Cancelled);
    }

    let record = assemble::record_ref(kind, namespace, resource);
    registry.claim(&record)?;
    let model = normalize(&record.name).map_err(mapping(&record))?;
    tracing::debug!(%record, "Normalized record");

    Ok(Normalized {
        labels: resource.labels().clone(),
        record,
        model,
    })
}

fn mapping(record: &RecordRef) -> impl Fn(ValidationError) -> SynthesisError + '_ {
    move |source| {
        MappingError {
            record: record.clone(),
            source,
        }
        .into()
    }
}
