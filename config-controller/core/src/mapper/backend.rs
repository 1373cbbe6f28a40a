use super::common;
use crate::{
    fragment::{Fragment, SectionKind},
    hash::md5_hex,
    model::{
        Backend, Cookie, HashType, HealthCheck, ProxyProtocol, Server, ServerParams,
        ServerTemplate, TemplateRange, Verify,
    },
};

pub fn backend(backend: &Backend) -> Fragment {
    let mut fragment = Fragment::named(SectionKind::Backend, &backend.name);
    let base = &backend.base;

    if let Some(mode) = base.mode {
        fragment.push(format!("mode {mode}"));
    }
    if let Some(balance) = &backend.balance {
        fragment.push(format!("balance {balance}"));
    }
    if let Some(hash_type) = &backend.hash_type {
        fragment.push(self::hash_type(hash_type));
    }

    if let Some(ff) = &base.forward_for {
        fragment.push(common::forward_for(ff));
    }
    if base.http_pretend_keepalive {
        fragment.push("option http-pretend-keepalive");
    }
    if backend.redispatch {
        fragment.push("option redispatch");
    }
    match &backend.health_check {
        Some(HealthCheck::Http { method, uri }) => {
            fragment.push(format!("option httpchk {method} {uri}"))
        }
        Some(HealthCheck::Tcp) => fragment.push("option tcp-check"),
        None => {}
    }

    if let Some(cookie) = &backend.cookie {
        fragment.push(self::cookie(cookie));
        if cookie.dynamic {
            fragment.push(format!("dynamic-cookie-key {}", md5_hex(&cookie.name)));
        }
    }

    common::timeouts(&mut fragment, &base.timeouts);
    common::rules(&mut fragment, base);

    fragment.extend(backend.servers.iter().map(server));
    fragment.extend(backend.server_templates.iter().map(server_template));

    fragment
}

fn hash_type(hash_type: &HashType) -> String {
    let mut line = "hash-type".to_string();
    for part in [&hash_type.method, &hash_type.function, &hash_type.modifier]
        .into_iter()
        .flatten()
    {
        line.push(' ');
        line.push_str(part);
    }
    line
}

/// The cookie name is the digest of the declared name.
fn cookie(cookie: &Cookie) -> String {
    let mut line = format!("cookie {}", md5_hex(&cookie.name));
    for domain in &cookie.domains {
        line.push_str(&format!(" domain {domain}"));
    }
    for attr in &cookie.attributes {
        line.push_str(&format!(" attr {attr}"));
    }
    if cookie.http_only {
        line.push_str(" httponly");
    }
    if cookie.indirect {
        line.push_str(" indirect");
    }
    if cookie.max_idle > 0 {
        line.push_str(&format!(" maxidle {}", cookie.max_idle));
    }
    if cookie.max_life > 0 {
        line.push_str(&format!(" maxlife {}", cookie.max_life));
    }
    if cookie.no_cache {
        line.push_str(" nocache");
    }
    if cookie.post_only {
        line.push_str(" postonly");
    }
    if cookie.preserve {
        line.push_str(" preserve");
    }
    if let Some(mode) = cookie.mode {
        line.push(' ');
        line.push_str(mode.as_str());
    }
    if cookie.secure {
        line.push_str(" secure");
    }
    if cookie.dynamic {
        line.push_str(" dynamic");
    }
    line
}

fn server(server: &Server) -> String {
    let cookie = server
        .params
        .cookie
        .then(|| md5_hex(format!("{}:{}", server.address, server.port)));
    // Servers only carry an explicit `required`. Without a CA nothing can be
    // verified.
    let verify = server.params.ssl.as_ref().and_then(|ssl| match ssl.verify {
        Some(Verify::Required) => Some(Verify::Required),
        _ if ssl.ca_certificate.is_none() => Some(Verify::None),
        _ => None,
    });
    let alpn = server
        .params
        .ssl
        .as_ref()
        .filter(|ssl| ssl.verify == Some(Verify::Required) && !ssl.alpn.is_empty())
        .map(|ssl| ssl.alpn.join(","));

    let mut line = format!("server {} {}:{}", server.name, server.address, server.port);
    params(
        &mut line,
        &server.params,
        Emitted {
            alpn: alpn.as_deref(),
            cookie: cookie.as_deref(),
            verify,
        },
    );
    line
}

fn server_template(template: &ServerTemplate) -> String {
    let range = match template.range {
        TemplateRange::Count(num) => num.to_string(),
        TemplateRange::Range(min, max) => format!("{min}-{max}"),
    };
    // Templates keep the configured mode unless there is no CA.
    let verify = template.params.ssl.as_ref().and_then(|ssl| {
        if ssl.ca_certificate.is_none() {
            Some(Verify::None)
        } else {
            ssl.verify
        }
    });

    let mut line = format!(
        "server-template {} {} {}:{}",
        template.prefix, range, template.fqdn, template.port
    );
    params(
        &mut line,
        &template.params,
        Emitted {
            alpn: None,
            cookie: None,
            verify,
        },
    );
    line
}

/// Parameters that depend on the kind of server line.
struct Emitted<'a> {
    alpn: Option<&'a str>,
    cookie: Option<&'a str>,
    verify: Option<Verify>,
}

/// Appends server parameters in the order HAProxy documents them.
fn params(line: &mut String, params: &ServerParams, emitted: Emitted<'_>) {
    let Emitted {
        alpn,
        cookie,
        verify,
    } = emitted;

    if params.check.is_some() {
        line.push_str(" check");
    }
    if let Some(ssl) = &params.ssl {
        line.push_str(" ssl");
        if let Some(alpn) = alpn {
            line.push_str(&format!(" alpn {alpn}"));
        }
        if let Some(ca) = &ssl.ca_certificate {
            line.push_str(&format!(" ca-file {}", ca.path()));
        }
    }
    if let Some(cookie) = cookie {
        line.push_str(&format!(" cookie {cookie}"));
    }
    if let Some(crt) = params.ssl.as_ref().and_then(|ssl| ssl.certificate.as_ref()) {
        line.push_str(&format!(" crt {}", crt.path()));
    }
    if let Some(fall) = params.check.as_ref().and_then(|c| c.fall) {
        line.push_str(&format!(" fall {fall}"));
    }
    if let Some(init_addr) = &params.init_addr {
        line.push_str(&format!(" init-addr {init_addr}"));
    }
    if let Some(inter) = params.check.as_ref().and_then(|c| c.inter) {
        line.push_str(&format!(" inter {inter}"));
    }
    if let Some(resolvers) = &params.resolvers {
        line.push_str(&format!(" resolvers {resolvers}"));
    }
    if let Some(rise) = params.check.as_ref().and_then(|c| c.rise) {
        line.push_str(&format!(" rise {rise}"));
    }
    match &params.proxy_protocol {
        Some(ProxyProtocol::V1) => line.push_str(" send-proxy"),
        Some(ProxyProtocol::V2(options)) => {
            line.push_str(" send-proxy-v2");
            if !options.is_empty() {
                let options = options.iter().map(|o| o.as_str()).collect::<Vec<_>>();
                line.push_str(&format!(" proxy-v2-options {}", options.join(",")));
            }
        }
        Some(ProxyProtocol::V2Ssl) => line.push_str(" send-proxy-v2-ssl"),
        Some(ProxyProtocol::V2SslCn) => line.push_str(" send-proxy-v2-ssl-cn"),
        None => {}
    }
    if let Some(ssl) = &params.ssl {
        if let Some(sni) = &ssl.sni {
            line.push_str(&format!(" sni {sni}"));
        }
        if let Some(version) = &ssl.min_version {
            line.push_str(&format!(" ssl-min-ver {version}"));
        }
    }
    if let Some(verify) = verify {
        line.push_str(&format!(" verify {}", verify.as_str()));
    }
    if let Some(host) = &params.verify_host {
        line.push_str(&format!(" verifyhost {host}"));
    }
    if let Some(weight) = params.weight {
        line.push_str(&format!(" weight {weight}"));
    }
}
