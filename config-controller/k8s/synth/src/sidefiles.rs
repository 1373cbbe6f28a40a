//! Derives the files the document refers to.
//!
//! Values held in ConfigMaps and Secrets are read on every pass. Failures
//! are attributed to the record that references the value.

use crate::{
    assemble::{Normalized, NormalizedRecords},
    error::{LookupError, SynthesisError},
};
use haproxy_config_controller_core::{
    model::{
        Acl, Backend, Base, Bind, Certificate, CertificateListElement, EnvValue, ErrorFile,
        Frontend, HttpRequestRule, Instance, Ocsp, ServerParams, ValueSource,
    },
    KeyValueStore, RecordRef, StoreRef, CONFIG_DIR,
};
use std::{collections::BTreeMap, net::IpAddr};
use tokio_util::sync::CancellationToken;

/// Relays the local syslog socket to the container's standard output.
const RSYSLOG_CONF: &str = r#"module(load="imuxsock" SysSock.Use="off")
input(type="imuxsock" Socket="{address}" CreatePath="on")
*.* action(type="omfile" file="/dev/stdout")
"#;

const CERTIFICATE: &str = "SSL certificate";
const STATIC_FILE: &str = "HTTP static file";
const HEADER: &str = "HTTP header";

const ENV_FILE: &str = "env";
const RSYSLOG_FILE: &str = "rsyslog.conf";

pub(crate) struct SideFiles<'a, S> {
    store: &'a S,
    cancel: &'a CancellationToken,
    files: BTreeMap<String, String>,
    env: Vec<String>,
}

// === impl SideFiles ===

impl<'a, S> SideFiles<'a, S>
where
    S: KeyValueStore + Sync,
{
    pub fn new(store: &'a S, cancel: &'a CancellationToken) -> Self {
        Self {
            store,
            cancel,
            files: BTreeMap::new(),
            env: Vec::new(),
        }
    }

    /// Generates all side files by absolute path.
    pub async fn generate(
        mut self,
        instance_ref: &RecordRef,
        instance: &Instance,
        records: &NormalizedRecords,
    ) -> Result<BTreeMap<String, String>, SynthesisError> {
        for cert in &instance.global.additional_certificates {
            self.certificate(instance_ref, cert).await?;
        }
        self.error_files(instance_ref, &instance.defaults.error_files)
            .await?;

        for listen in &records.listens {
            self.checkpoint()?;
            let record = &listen.record;
            let model = &listen.model;
            for bind in &model.binds {
                self.bind(record, bind, model.host_certificate.iter())
                    .await?;
            }
            self.servers(
                record,
                model
                    .servers
                    .iter()
                    .map(|s| &s.params)
                    .chain(model.server_templates.iter().map(|t| &t.params)),
            )
            .await?;
            self.base(record, &model.base).await?;
        }

        for frontend in &records.frontends {
            self.checkpoint()?;
            let record = &frontend.record;
            for bind in &frontend.model.binds {
                let selected = bind
                    .certificate_list
                    .as_ref()
                    .and_then(|list| list.selector.as_ref())
                    .map(|selector| {
                        records
                            .backends
                            .iter()
                            .filter(|b| selector.matches(Some(&b.labels)))
                            .filter_map(|b| b.model.host_certificate.as_ref())
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default();
                self.bind(record, bind, selected.into_iter()).await?;
            }
            self.regex_maps(frontend, &records.backends)?;
            self.base(record, &frontend.model.base).await?;
        }

        for backend in &records.backends {
            self.checkpoint()?;
            let record = &backend.record;
            let model = &backend.model;
            self.servers(
                record,
                model
                    .servers
                    .iter()
                    .map(|s| &s.params)
                    .chain(model.server_templates.iter().map(|t| &t.params)),
            )
            .await?;
            self.base(record, &model.base).await?;
        }

        if !self.env.is_empty() {
            self.files
                .insert(format!("{CONFIG_DIR}/{ENV_FILE}"), self.env.join("\n"));
        }

        // A local socket needs a syslog daemon next to the proxy.
        if let Some(log) = &instance.global.log {
            if log.address.parse::<IpAddr>().is_err() {
                self.files.insert(
                    format!("{CONFIG_DIR}/{RSYSLOG_FILE}"),
                    RSYSLOG_CONF.replace("{address}", &log.address),
                );
            }
        }

        Ok(self.files)
    }

    /// Certificates of a bind and its certificate list. `extra` elements are
    /// merged with the explicit ones before the list is sorted.
    async fn bind<'e>(
        &mut self,
        record: &RecordRef,
        bind: &'e Bind,
        extra: impl Iterator<Item = &'e CertificateListElement>,
    ) -> Result<(), SynthesisError> {
        for cert in bind.certificates() {
            self.certificate(record, cert).await?;
        }

        let Some(list) = &bind.certificate_list else {
            return Ok(());
        };
        let elements = list.elements.iter().chain(extra).collect::<Vec<_>>();
        let mut lines = Vec::with_capacity(elements.len());
        for element in elements {
            self.certificate(record, &element.certificate).await?;
            if let Ocsp::UpdateWithFile(file) = &element.ocsp {
                self.files.insert(file.path(), file.value.clone());
            }
            lines.push(element.line());
        }
        lines.sort();
        self.files.insert(list.path(), lines.concat());
        Ok(())
    }

    async fn servers<'p>(
        &mut self,
        record: &RecordRef,
        params: impl Iterator<Item = &'p ServerParams>,
    ) -> Result<(), SynthesisError> {
        for cert in params.flat_map(|p| p.certificates()) {
            self.certificate(record, cert).await?;
        }
        Ok(())
    }

    /// ACL value files, error bodies and env overlay entries.
    async fn base(&mut self, record: &RecordRef, base: &Base) -> Result<(), SynthesisError> {
        for acl in base.acls.iter().filter(|acl| acl.is_externalized()) {
            self.acl(acl);
        }
        self.error_files(record, &base.error_files).await?;

        for rule in &base.http_request {
            let value = match rule {
                HttpRequestRule::SetHeader { value, .. }
                | HttpRequestRule::AddHeader { value, .. } => value,
                _ => continue,
            };
            let Some(env) = value.env() else {
                continue;
            };
            let value = match &env.value {
                EnvValue::Literal(value) => value.clone(),
                EnvValue::Secret(reference) => self.lookup(record, HEADER, reference).await?,
            };
            self.env.push(format!("{}={}", env.name, value));
        }

        Ok(())
    }

    fn acl(&mut self, acl: &Acl) {
        self.files.insert(acl.file_path(), acl.file_content());
    }

    async fn error_files(
        &mut self,
        record: &RecordRef,
        error_files: &[ErrorFile],
    ) -> Result<(), SynthesisError> {
        for ef in error_files {
            if let Some(source) = &ef.file.source {
                let content = self.resolve(record, STATIC_FILE, source).await?;
                self.files.insert(ef.file.path(), content);
            }
        }
        Ok(())
    }

    /// Writes one line per backend selected by each regex mapping of the
    /// frontend. Lines are sorted in reverse so the output does not depend on
    /// the order backends were listed in.
    fn regex_maps(
        &mut self,
        frontend: &Normalized<Frontend>,
        backends: &[Normalized<Backend>],
    ) -> Result<(), SynthesisError> {
        for mapping in frontend.model.regex_mappings() {
            let mut lines = Vec::new();
            for backend in backends
                .iter()
                .filter(|b| mapping.selector.matches(Some(&b.labels)))
            {
                let Some(regex) = &backend.model.host_regex else {
                    return Err(SynthesisError::SideFile {
                        record: frontend.record.clone(),
                        message: format!(
                            "regex not found in backend: {}/{}",
                            backend.record.namespace, backend.record.name
                        ),
                    });
                };
                let pattern = regex.strip_suffix('$').unwrap_or(regex);
                let pattern = pattern.strip_prefix('^').unwrap_or(pattern);
                lines.push(format!("^{pattern}$ {}", backend.model.name));
            }
            lines.sort_unstable_by(|a, b| b.cmp(a));
            self.files.insert(mapping.path(), lines.join("\n"));
        }
        Ok(())
    }

    async fn certificate(
        &mut self,
        record: &RecordRef,
        cert: &Certificate,
    ) -> Result<(), SynthesisError> {
        let content = self.resolve(record, CERTIFICATE, &cert.source).await?;
        self.files.insert(cert.path(), content);
        Ok(())
    }

    /// Store values are trimmed and joined by newlines.
    async fn resolve(
        &self,
        record: &RecordRef,
        what: &'static str,
        source: &ValueSource,
    ) -> Result<String, SynthesisError> {
        match source {
            ValueSource::Inline(value) => Ok(value.clone()),
            ValueSource::Store(references) => {
                let mut items = Vec::with_capacity(references.len());
                for reference in references {
                    let value = self.lookup(record, what, reference).await?;
                    items.push(value.trim().to_string());
                }
                Ok(items.join("\n"))
            }
        }
    }

    fn checkpoint(&self) -> Result<(), SynthesisError> {
        if self.cancel.is_cancelled() {
            return Err(SynthesisError::Cancelled);
        }
        Ok(())
    }

    async fn lookup(
        &self,
        record: &RecordRef,
        what: &'static str,
        reference: &StoreRef,
    ) -> Result<String, SynthesisError> {
        self.checkpoint()?;

        let error = |source| SynthesisError::Lookup {
            record: record.clone(),
            source,
        };
        let bytes = self
            .store
            .get(reference)
            .await
            .map_err(|source| {
                error(LookupError::Failed {
                    reference: reference.clone(),
                    source,
                })
            })?
            .ok_or_else(|| {
                error(LookupError::Missing {
                    what,
                    reference: reference.clone(),
                })
            })?;
        tracing::trace!(%record, %reference, key = %reference.key, "Read value");
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
