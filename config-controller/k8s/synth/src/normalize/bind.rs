use super::{file_name, non_empty, port};
use haproxy_config_controller_core::{
    model::{
        Bind, BindSsl, Certificate, CertificateList, CertificateListElement, Ocsp, OcspFile,
        ValidationError, ValueSource, Verify,
    },
    StoreRef,
};
use haproxy_config_controller_k8s_api::config::common as api;

pub(super) fn bind(namespace: &str, spec: &api::Bind) -> Result<Bind, ValidationError> {
    let port = port(spec.port)?;
    let port_range_end = spec
        .port_range_end
        .map(|end| {
            u16::try_from(end)
                .ok()
                .filter(|end| *end > port)
                .ok_or(ValidationError::PortRange {
                    port: spec.port,
                    end,
                })
        })
        .transpose()?;

    // TLS settings are ignored unless enabled, and a certificate list is only
    // meaningful on a TLS bind.
    let ssl = spec
        .ssl
        .as_ref()
        .filter(|ssl| ssl.enabled)
        .map(|ssl| bind_ssl(namespace, ssl))
        .transpose()?;
    let certificate_list = match (&ssl, &spec.ssl_certificate_list) {
        (Some(_), Some(list)) => Some(certificate_list(namespace, list)?),
        _ => None,
    };

    Ok(Bind {
        name: spec.name.clone(),
        address: spec.address.clone().unwrap_or_default(),
        port,
        port_range_end,
        transparent: spec.transparent,
        accept_proxy: spec.accept_proxy.unwrap_or(false),
        ssl,
        certificate_list,
    })
}

fn bind_ssl(namespace: &str, ssl: &api::Ssl) -> Result<BindSsl, ValidationError> {
    Ok(BindSsl {
        certificate: ssl
            .certificate
            .as_ref()
            .map(|c| certificate(namespace, c))
            .transpose()?,
        ca_certificate: ssl
            .ca_certificate
            .as_ref()
            .map(|c| certificate(namespace, c))
            .transpose()?,
        verify: verify(ssl.verify.as_deref())?,
        min_version: ssl.min_version.as_deref().and_then(non_empty),
    })
}

fn certificate_list(
    namespace: &str,
    list: &api::CertificateList,
) -> Result<CertificateList, ValidationError> {
    if list.name.is_empty() {
        return Err(ValidationError::Empty("certificate list name"));
    }

    Ok(CertificateList {
        name: file_name("certificate list name", &list.name)?,
        elements: list
            .elements
            .iter()
            .map(|e| element(namespace, e))
            .collect::<Result<_, _>>()?,
        selector: list.selector.clone(),
    })
}

pub(super) fn element(
    namespace: &str,
    element: &api::CertificateListElement,
) -> Result<CertificateListElement, ValidationError> {
    let ocsp = match (element.ocsp, &element.ocsp_file) {
        (false, _) => Ocsp::Off,
        (true, None) => Ocsp::Update,
        (true, Some(file)) => Ocsp::UpdateWithFile(OcspFile {
            name: file_name("ocsp file name", &file.name)?,
            value: file.value.clone(),
        }),
    };

    Ok(CertificateListElement {
        certificate: certificate(namespace, &element.certificate)?,
        sni_filter: element.sni_filter.clone(),
        alpn: element.alpn.clone(),
        ocsp,
    })
}

/// An inline value wins over any references. Otherwise every reference of
/// every `valueFrom` entry is read, in declaration order.
pub(super) fn certificate(
    namespace: &str,
    cert: &api::SslCertificate,
) -> Result<Certificate, ValidationError> {
    if cert.name.is_empty() {
        return Err(ValidationError::Empty("certificate name"));
    }

    let source = match &cert.value {
        Some(value) => ValueSource::Inline(value.clone()),
        None => ValueSource::Store(
            cert.value_from
                .iter()
                .flat_map(|from| {
                    let config_map = from
                        .config_map_key_ref
                        .as_ref()
                        .map(|r| StoreRef::config_map(namespace, &r.name, &r.key));
                    let secret = from
                        .secret_key_ref
                        .as_ref()
                        .map(|r| StoreRef::secret(namespace, &r.name, &r.key));
                    let external = from
                        .secret_key_external_ref
                        .as_ref()
                        .map(|r| StoreRef::secret(&r.namespace, &r.name, &r.key));
                    config_map.into_iter().chain(secret).chain(external)
                })
                .collect(),
        ),
    };

    Ok(Certificate {
        name: file_name("certificate name", &cert.name)?,
        source,
    })
}

pub(super) fn verify(verify: Option<&str>) -> Result<Option<Verify>, ValidationError> {
    match verify {
        None | Some("") => Ok(None),
        Some("none") => Ok(Some(Verify::None)),
        Some("optional") => Ok(Some(Verify::Optional)),
        Some("required") => Ok(Some(Verify::Required)),
        Some(other) => Err(ValidationError::Verify(other.to_string())),
    }
}
