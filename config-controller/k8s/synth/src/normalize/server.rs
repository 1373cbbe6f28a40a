use super::{bind, millis, non_empty, port};
use haproxy_config_controller_core::model::{
    Check, Cookie, CookieMode, HashType, HealthCheck, ProxyProtocol, ProxyV2Option, Server,
    ServerParams, ServerSsl, ServerTemplate, TemplateRange, ValidationError,
};
use haproxy_config_controller_k8s_api::config::common as api;

pub(super) fn servers(namespace: &str, specs: &[api::Server]) -> Result<Vec<Server>, ValidationError> {
    specs
        .iter()
        .map(|s| {
            Ok(Server {
                name: s.name.clone(),
                address: s.address.clone(),
                port: port(s.port)?,
                params: params(namespace, &s.params)?,
            })
        })
        .collect()
}

pub(super) fn templates(
    namespace: &str,
    specs: &[api::ServerTemplate],
) -> Result<Vec<ServerTemplate>, ValidationError> {
    specs
        .iter()
        .map(|t| {
            let range = match t.num_min {
                Some(min) => TemplateRange::Range(min, t.num),
                None => TemplateRange::Count(t.num),
            };
            Ok(ServerTemplate {
                prefix: t.prefix.clone(),
                range,
                fqdn: t.fqdn.clone(),
                port: port(t.port)?,
                params: params(namespace, &t.params)?,
            })
        })
        .collect()
}

fn params(namespace: &str, spec: &api::ServerParams) -> Result<ServerParams, ValidationError> {
    let ssl = match spec.ssl.as_ref().filter(|ssl| ssl.enabled) {
        Some(ssl) => Some(ServerSsl {
            certificate: ssl
                .certificate
                .as_ref()
                .map(|c| bind::certificate(namespace, c))
                .transpose()?,
            ca_certificate: ssl
                .ca_certificate
                .as_ref()
                .map(|c| bind::certificate(namespace, c))
                .transpose()?,
            verify: bind::verify(ssl.verify.as_deref())?,
            min_version: ssl.min_version.as_deref().and_then(non_empty),
            sni: ssl.sni.as_deref().and_then(non_empty),
            alpn: ssl.alpn.clone(),
        }),
        None => None,
    };

    let check = match spec.check.as_ref().filter(|c| c.enabled) {
        Some(check) => Some(Check {
            inter: check
                .inter
                .as_ref()
                .map(|d| millis("check inter", d))
                .transpose()?,
            rise: check.rise,
            fall: check.fall,
        }),
        None => None,
    };

    Ok(ServerParams {
        ssl,
        weight: spec.weight.map(weight).transpose()?,
        check,
        init_addr: spec.init_addr.as_deref().and_then(non_empty),
        resolvers: spec.resolvers.as_ref().map(|r| r.name.clone()),
        proxy_protocol: proxy_protocol(spec)?,
        verify_host: spec.verify_host.as_deref().and_then(non_empty),
        cookie: spec.cookie,
    })
}

fn weight(weight: i64) -> Result<u16, ValidationError> {
    u16::try_from(weight)
        .ok()
        .filter(|w| *w <= 256)
        .ok_or(ValidationError::Weight(weight))
}

/// The legacy `sendProxy` flag and `v1` select the same variant.
fn proxy_protocol(spec: &api::ServerParams) -> Result<Option<ProxyProtocol>, ValidationError> {
    let pp = spec.send_proxy_v2.clone().unwrap_or_default();

    let mut selected = Vec::new();
    if spec.send_proxy.unwrap_or(false) || pp.v1 {
        selected.push(ProxyProtocol::V1);
    }
    if let Some(v2) = pp.v2.as_ref().filter(|v2| v2.enabled) {
        let options = v2.options.clone().unwrap_or_default();
        let options = [
            (options.ssl, ProxyV2Option::Ssl),
            (options.cert_cn, ProxyV2Option::CertCn),
            (options.ssl_cipher, ProxyV2Option::SslCipher),
            (options.cert_sig, ProxyV2Option::CertSig),
            (options.cert_key, ProxyV2Option::CertKey),
            (options.authority, ProxyV2Option::Authority),
            (options.crc32c, ProxyV2Option::Crc32c),
            (options.unique_id, ProxyV2Option::UniqueId),
        ]
        .into_iter()
        .filter_map(|(set, opt)| set.then_some(opt))
        .collect();
        selected.push(ProxyProtocol::V2(options));
    }
    if pp.v2_ssl {
        selected.push(ProxyProtocol::V2Ssl);
    }
    if pp.v2_ssl_cn {
        selected.push(ProxyProtocol::V2SslCn);
    }

    if selected.len() > 1 {
        return Err(ValidationError::ProxyProtocol);
    }
    Ok(selected.pop())
}

pub(super) fn cookie(spec: &api::Cookie) -> Result<Cookie, ValidationError> {
    let modes = [
        (spec.mode.rewrite, CookieMode::Rewrite),
        (spec.mode.insert, CookieMode::Insert),
        (spec.mode.prefix, CookieMode::Prefix),
    ]
    .into_iter()
    .filter_map(|(set, mode)| set.then_some(mode))
    .collect::<Vec<_>>();
    if modes.len() > 1 {
        return Err(ValidationError::CookieMode);
    }

    Ok(Cookie {
        name: spec.name.clone(),
        mode: modes.first().copied(),
        domains: spec.domain.clone(),
        attributes: spec.attribute.clone(),
        http_only: spec.http_only.unwrap_or(false),
        indirect: spec.indirect.unwrap_or(false),
        max_idle: spec.max_idle,
        max_life: spec.max_life,
        no_cache: spec.no_cache.unwrap_or(false),
        post_only: spec.post_only.unwrap_or(false),
        preserve: spec.preserve.unwrap_or(false),
        secure: spec.secure.unwrap_or(false),
        dynamic: spec.dynamic.unwrap_or(false),
    })
}

pub(super) fn balance(balance: Option<&api::Balance>) -> Option<String> {
    balance
        .map(|b| b.algorithm.to_lowercase())
        .filter(|b| !b.is_empty())
}

pub(super) fn hash_type(spec: &api::HashType) -> HashType {
    HashType {
        method: spec.method.as_deref().and_then(non_empty),
        function: spec.function.as_deref().and_then(non_empty),
        modifier: spec.modifier.as_deref().and_then(non_empty),
    }
}

/// An HTTP check takes precedence over a TCP check.
pub(super) fn health_check(http: Option<&api::HttpChk>, tcp: Option<bool>) -> Option<HealthCheck> {
    match http {
        Some(chk) => Some(HealthCheck::Http {
            method: chk.method.clone(),
            uri: chk.uri.clone(),
        }),
        None if tcp.unwrap_or(false) => Some(HealthCheck::Tcp),
        None => None,
    }
}
