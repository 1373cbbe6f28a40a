use super::*;
use haproxy_config_controller_core::{
    model::{
        CookieMode, EnvValue, HttpRequestRule, Mode, Ocsp, ProxyProtocol, ProxyV2Option,
        RedirectKind, Resolver, ValueSource, Verify,
    },
    StoreRef,
};
use haproxy_config_controller_k8s_api::{config::ResolverSpec, proxy::InstanceSpec};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

fn frontend_spec(spec: serde_json::Value) -> FrontendSpec {
    let mut spec = spec;
    spec.as_object_mut()
        .unwrap()
        .entry("defaultBackend")
        .or_insert(json!({ "name": "default" }));
    serde_json::from_value(spec).expect("frontend spec must parse")
}

fn backend_spec(spec: serde_json::Value) -> BackendSpec {
    serde_json::from_value(spec).expect("backend spec must parse")
}

fn listen_spec(spec: serde_json::Value) -> ListenSpec {
    serde_json::from_value(spec).expect("listen spec must parse")
}

#[rstest]
#[case::frontend_client("frontend", "client", true)]
#[case::frontend_server("frontend", "server", false)]
#[case::backend_server("backend", "server", true)]
#[case::backend_client("backend", "client", false)]
#[case::listen_client("listen", "client", true)]
#[case::listen_server("listen", "server", true)]
#[case::listen_client_fin("listen", "client-fin", false)]
fn timeout_allow_lists(#[case] kind: &str, #[case] key: &str, #[case] allowed: bool) {
    let spec = json!({ "timeouts": { key: "5s" } });
    let timeouts = match kind {
        "frontend" => frontend("default", "web", &frontend_spec(spec)).map(|f| f.base.timeouts),
        "backend" => backend("default", "web", &backend_spec(spec)).map(|b| b.base.timeouts),
        _ => listen("default", "web", &listen_spec(spec)).map(|l| l.base.timeouts),
    };

    match timeouts {
        Ok(timeouts) => {
            assert!(allowed, "{kind} must reject {key}");
            assert_eq!(timeouts.get(key), Some(5000));
        }
        Err(error) => {
            assert!(!allowed, "{kind} must accept {key}: {error}");
            assert_eq!(error, ValidationError::UnknownTimeout(key.to_string()));
            assert_eq!(error.to_string(), format!("timeout {key} unknown"));
        }
    }
}

#[test]
fn check_timeout_is_a_backend_timeout() {
    let backend = backend("default", "web", &backend_spec(json!({ "checkTimeout": "2s" })))
        .expect("backend must normalize");
    assert_eq!(backend.base.timeouts.get("check"), Some(2000));
}

#[test]
fn rejects_negative_durations() {
    let error = backend("default", "web", &backend_spec(json!({ "timeouts": { "server": "-1s" } })))
        .expect_err("negative timeout must be rejected");
    assert_eq!(
        error,
        ValidationError::NegativeDuration("timeout server".to_string())
    );
}

#[test]
fn cookie_modes() {
    let two = backend_spec(json!({
        "cookie": { "name": "test", "mode": { "insert": true, "rewrite": true } }
    }));
    assert_eq!(
        backend("default", "web", &two).unwrap_err().to_string(),
        "you can only select one cookie mode"
    );

    let none = backend_spec(json!({ "cookie": { "name": "test" } }));
    let cookie = backend("default", "web", &none).unwrap().cookie.unwrap();
    assert_eq!(cookie.mode, None);

    let one = backend_spec(json!({
        "cookie": { "name": "test", "mode": { "prefix": true }, "dynamic": true }
    }));
    let cookie = backend("default", "web", &one).unwrap().cookie.unwrap();
    assert_eq!(cookie.mode, Some(CookieMode::Prefix));
    assert!(cookie.dynamic);
}

#[test]
fn redirect_types() {
    let two = backend_spec(json!({
        "httpRequest": {
            "redirect": [{ "type": { "location": true, "prefix": true }, "value": "https://x" }]
        }
    }));
    assert_eq!(
        backend("default", "web", &two).unwrap_err(),
        ValidationError::RedirectType
    );

    let spec = backend_spec(json!({
        "httpRequest": {
            "redirect": [
                { "value": "ignored" },
                {
                    "type": { "prefix": true },
                    "value": "https",
                    "code": 301,
                    "conditionType": "unless",
                    "condition": "{ ssl_fc }"
                }
            ]
        }
    }));
    let rules = backend("default", "web", &spec).unwrap().base.http_request;
    assert_eq!(rules.len(), 1, "a redirect without a type is dropped");
    let HttpRequestRule::Redirect(redirect) = &rules[0] else {
        panic!("expected a redirect, got {:?}", rules[0]);
    };
    assert_eq!(redirect.kind, RedirectKind::Scheme);
    assert_eq!(redirect.code, Some(301));
    assert_eq!(
        redirect.condition.as_ref().unwrap().to_string(),
        "unless { ssl_fc }"
    );
}

#[rstest]
#[case::none(json!({}), Ok(None))]
#[case::legacy(json!({ "sendProxy": true }), Ok(Some(ProxyProtocol::V1)))]
#[case::legacy_and_v1(
    json!({ "sendProxy": true, "SendProxyV2": { "v1": true } }),
    Ok(Some(ProxyProtocol::V1))
)]
#[case::v2_options(
    json!({ "SendProxyV2": { "v2": { "enabled": true, "options": { "uniqueID": true, "ssl": true } } } }),
    Ok(Some(ProxyProtocol::V2(vec![ProxyV2Option::Ssl, ProxyV2Option::UniqueId])))
)]
#[case::v2_disabled(
    json!({ "SendProxyV2": { "v2": { "enabled": false }, "v2SSL": true } }),
    Ok(Some(ProxyProtocol::V2Ssl))
)]
#[case::legacy_and_v2(
    json!({ "sendProxy": true, "SendProxyV2": { "v2": { "enabled": true } } }),
    Err(ValidationError::ProxyProtocol)
)]
#[case::ssl_variants(
    json!({ "SendProxyV2": { "v2SSL": true, "v2SSLCN": true } }),
    Err(ValidationError::ProxyProtocol)
)]
fn proxy_protocols(
    #[case] params: serde_json::Value,
    #[case] expected: Result<Option<ProxyProtocol>, ValidationError>,
) {
    let mut server = json!({ "name": "s1", "address": "10.0.0.1", "port": 80 });
    server
        .as_object_mut()
        .unwrap()
        .extend(params.as_object().unwrap().clone());
    let spec = backend_spec(json!({ "servers": [server] }));

    let result = backend("default", "web", &spec)
        .map(|b| b.servers[0].params.proxy_protocol.clone());
    assert_eq!(result, expected);
}

#[rstest]
#[case(0, Err(ValidationError::Port(0)))]
#[case(1, Ok(1))]
#[case(65535, Ok(65535))]
#[case(65536, Err(ValidationError::Port(65536)))]
#[case(-80, Err(ValidationError::Port(-80)))]
fn server_ports(#[case] port: i64, #[case] expected: Result<u16, ValidationError>) {
    let spec = backend_spec(json!({
        "servers": [{ "name": "s1", "address": "10.0.0.1", "port": port }]
    }));
    assert_eq!(
        backend("default", "web", &spec).map(|b| b.servers[0].port),
        expected
    );
}

#[rstest]
#[case(0, Ok(0))]
#[case(256, Ok(256))]
#[case(257, Err(ValidationError::Weight(257)))]
#[case(-1, Err(ValidationError::Weight(-1)))]
fn server_weights(#[case] weight: i64, #[case] expected: Result<u16, ValidationError>) {
    let spec = backend_spec(json!({
        "servers": [{ "name": "s1", "address": "10.0.0.1", "port": 80, "weight": weight }]
    }));
    assert_eq!(
        backend("default", "web", &spec).map(|b| b.servers[0].params.weight.unwrap()),
        expected
    );
}

#[test]
fn bind_port_ranges() {
    let spec = frontend_spec(json!({ "binds": [{ "port": 9000, "portRangeEnd": 9000 }] }));
    assert_eq!(
        frontend("default", "web", &spec).unwrap_err(),
        ValidationError::PortRange {
            port: 9000,
            end: 9000
        }
    );

    let spec = frontend_spec(json!({ "binds": [{ "port": 9000, "portRangeEnd": 9010 }] }));
    let bind = &frontend("default", "web", &spec).unwrap().binds[0];
    assert_eq!((bind.port, bind.port_range_end), (9000, Some(9010)));
}

#[test]
fn disabled_tls_is_ignored() {
    let spec = frontend_spec(json!({
        "binds": [{
            "port": 443,
            "ssl": { "enabled": false, "verify": "bogus" },
            "sslCertificateList": { "name": "list" }
        }]
    }));
    let bind = &frontend("default", "web", &spec).unwrap().binds[0];
    assert_eq!(bind.ssl, None);
    assert_eq!(bind.certificate_list, None, "a list needs TLS");

    let spec = frontend_spec(json!({
        "binds": [{
            "port": 443,
            "ssl": { "enabled": true, "verify": "required" },
            "sslCertificateList": { "name": "list" }
        }]
    }));
    let bind = &frontend("default", "web", &spec).unwrap().binds[0];
    assert_eq!(bind.ssl.as_ref().unwrap().verify, Some(Verify::Required));
    assert_eq!(bind.certificate_list.as_ref().unwrap().name, "list");

    let spec = frontend_spec(json!({
        "binds": [{ "port": 443, "ssl": { "enabled": true, "verify": "sometimes" } }]
    }));
    assert_eq!(
        frontend("default", "web", &spec).unwrap_err(),
        ValidationError::Verify("sometimes".to_string())
    );
}

#[test]
fn certificate_sources() {
    let spec = frontend_spec(json!({
        "binds": [{
            "port": 443,
            "ssl": {
                "enabled": true,
                "certificate": {
                    "name": "server",
                    "valueFrom": [
                        { "configMapKeyRef": { "name": "chain", "key": "ca.crt" } },
                        {
                            "secretKeyRef": { "name": "tls", "key": "tls.key" },
                            "secretKeyExternalRef": { "namespace": "certs", "name": "shared", "key": "tls.crt" }
                        }
                    ]
                },
                "caCertificate": { "name": "ca", "value": "inline" }
            }
        }]
    }));
    let ssl = frontend("edge", "web", &spec).unwrap().binds[0].ssl.clone().unwrap();

    assert_eq!(
        ssl.certificate.unwrap().source,
        ValueSource::Store(vec![
            StoreRef::config_map("edge", "chain", "ca.crt"),
            StoreRef::secret("edge", "tls", "tls.key"),
            StoreRef::secret("certs", "shared", "tls.crt"),
        ])
    );
    assert_eq!(
        ssl.ca_certificate.unwrap().source,
        ValueSource::Inline("inline".to_string())
    );
}

#[test]
fn certificate_list_elements() {
    let spec = listen_spec(json!({
        "hostCertificate": {
            "certificate": { "name": "host", "value": "pem" },
            "sniFilter": "*.example.com",
            "alpn": ["h2"],
            "ocsp": true,
            "ocspFile": { "name": "host", "value": "der" }
        }
    }));
    let element = listen("default", "web", &spec).unwrap().host_certificate.unwrap();
    assert_eq!(element.sni_filter, "*.example.com");
    match element.ocsp {
        Ocsp::UpdateWithFile(file) => assert_eq!(file.value, "der"),
        other => panic!("unexpected OCSP setting {other:?}"),
    }
}

#[test]
fn backend_references() {
    let spec = frontend_spec(json!({
        "backendSwitching": [{
            "backend": {
                "name": "static",
                "regexMapping": { "name": "route", "parameter": "req.hdr(host)" }
            }
        }]
    }));
    assert_eq!(
        frontend("default", "web", &spec).unwrap_err(),
        ValidationError::BackendReference
    );

    let spec = frontend_spec(json!({ "backendSwitching": [{ "backend": {} }] }));
    assert_eq!(
        frontend("default", "web", &spec).unwrap_err(),
        ValidationError::BackendReference
    );

    let spec = frontend_spec(json!({
        "backendSwitching": [{
            "backend": { "name": "api" },
            "conditionType": "when",
            "condition": "{ path_beg /api }"
        }]
    }));
    assert_eq!(
        frontend("default", "web", &spec).unwrap_err(),
        ValidationError::ConditionType("when".to_string())
    );
}

#[test]
fn header_values_from_secrets() {
    let spec = backend_spec(json!({
        "httpRequest": {
            "addHeader": [{
                "name": "Authorization",
                "value": {
                    "env": { "name": "TOKEN", "valueFrom": { "secretKeyRef": { "name": "auth", "key": "token" } } },
                    "format": "Bearer %s"
                }
            }],
            "setHeader": [{ "name": "X-Forwarded-Proto", "value": { "str": "https" } }]
        }
    }));
    let rules = backend("edge", "web", &spec).unwrap().base.http_request;

    // Set rules are emitted ahead of add rules.
    let HttpRequestRule::SetHeader { value, .. } = &rules[0] else {
        panic!("expected set-header first, got {:?}", rules[0]);
    };
    assert_eq!(value.to_string(), "https");

    let HttpRequestRule::AddHeader { value, .. } = &rules[1] else {
        panic!("expected add-header second, got {:?}", rules[1]);
    };
    assert_eq!(value.to_string(), "Bearer ${TOKEN}");
    assert_eq!(
        value.env().unwrap().value,
        EnvValue::Secret(StoreRef::secret("edge", "auth", "token"))
    );
}

#[rstest]
#[case(503, true)]
#[case(200, true)]
#[case(418, false)]
#[case(-1, false)]
fn error_file_codes(#[case] code: i64, #[case] valid: bool) {
    let spec = backend_spec(json!({
        "errorFiles": [{ "code": code, "file": { "name": "page", "value": "oops" } }]
    }));
    match backend("default", "web", &spec) {
        Ok(b) => {
            assert!(valid, "{code} must be rejected");
            assert_eq!(i64::from(b.base.error_files[0].code), code);
        }
        Err(error) => {
            assert!(!valid, "{code} must be accepted");
            assert_eq!(error, ValidationError::ErrorFileCode(code));
        }
    }
}

#[test]
fn instance_defaults() {
    let spec: InstanceSpec = serde_json::from_value(json!({
        "configuration": {
            "global": {
                "logging": { "enabled": true, "address": "", "sendHostname": true },
                "additionalParameters": "  tune.idletimer 100\n\n  ssl-server-verify none  ",
                "tune": { "ssl": { "lifetime": "1m29.6s", "defaultDHParam": 2048 } }
            },
            "defaults": { "mode": "tcp", "logging": { "enabled": true, "tcpLog": true } }
        },
        "metrics": { "enabled": true, "port": 9000 }
    }))
    .unwrap();
    let instance = instance("edge", "fleet", &spec).unwrap();

    let log = instance.global.log.as_ref().unwrap();
    assert_eq!(log.address, "/var/lib/rsyslog/rsyslog.sock");
    assert_eq!(log.facility.as_deref(), Some("local0"));
    assert_eq!(instance.global.send_hostname, Some(None));
    assert_eq!(
        instance.global.additional_parameters,
        ["tune.idletimer 100", "ssl-server-verify none"]
    );
    let tune = instance.global.tune.as_ref().unwrap();
    assert_eq!(tune.ssl_lifetime, Some(90));
    assert_eq!(tune.ssl_default_dh_param, Some(2048));
    assert_eq!(tune.ssl_ctx_cache_size, None);

    assert_eq!(instance.defaults.mode, Some(Mode::Tcp));
    assert!(instance.defaults.log_global && instance.defaults.tcp_log);
    assert!(!instance.defaults.http_log);

    let metrics = instance.metrics.unwrap();
    assert_eq!((metrics.address.as_str(), metrics.port), ("0.0.0.0", 9000));
}

#[test]
fn instance_rejects_unknown_default_timeouts() {
    let spec: InstanceSpec = serde_json::from_value(json!({
        "configuration": { "defaults": { "timeouts": { "client": "1s", "idle": "1s" } } }
    }))
    .unwrap();
    assert_eq!(
        instance("edge", "fleet", &spec).unwrap_err(),
        ValidationError::UnknownTimeout("idle".to_string())
    );
}

#[test]
fn resolver_defaults() {
    let spec: ResolverSpec = serde_json::from_value(json!({
        "nameservers": [{ "name": "ns1", "address": "10.0.0.10", "port": 53 }],
        "hold": { "valid": "10s" },
        "timeouts": { "retry": "2s" }
    }))
    .unwrap();
    let resolver = resolver("dns", &spec).unwrap();
    assert_eq!(resolver.hold.valid, Some(10_000));
    assert_eq!(resolver.timeout_resolve, Resolver::DEFAULT_TIMEOUT_MS);
    assert_eq!(resolver.timeout_retry, 2000);
    assert_eq!(resolver.resolve_retries, Resolver::DEFAULT_RESOLVE_RETRIES);

    let spec: ResolverSpec = serde_json::from_value(json!({
        "nameservers": [{ "name": "ns1", "address": "10.0.0.10" }]
    }))
    .unwrap();
    assert_eq!(
        super::resolver("dns", &spec).unwrap_err(),
        ValidationError::Port(0)
    );
}

#[rstest]
#[case("../../../../etc/cron.d/evil")]
#[case("certs/web")]
#[case("..")]
#[case("web\0")]
fn side_file_names_stay_in_the_config_dir(#[case] name: &str) {
    let pem = json!({ "name": "web", "value": "pem" });
    let frontend = |spec| frontend("default", "web", &frontend_spec(spec)).map(drop);
    let failures = [
        (
            "certificate name",
            frontend(json!({
                "binds": [{
                    "port": 443,
                    "ssl": { "enabled": true, "certificate": { "name": name, "value": "pem" } }
                }]
            })),
        ),
        (
            "certificate list name",
            frontend(json!({
                "binds": [{
                    "port": 443,
                    "ssl": { "enabled": true },
                    "sslCertificateList": { "name": name }
                }]
            })),
        ),
        (
            "ocsp file name",
            listen("default", "web", &listen_spec(json!({
                "hostCertificate": {
                    "certificate": pem,
                    "sniFilter": "web",
                    "ocsp": true,
                    "ocspFile": { "name": name, "value": "der" }
                }
            })))
            .map(drop),
        ),
        (
            "regex mapping name",
            frontend(json!({
                "backendSwitching": [{
                    "backend": { "regexMapping": { "name": name, "parameter": "req.hdr(host)", "selector": {} } }
                }]
            })),
        ),
        (
            "acl name",
            frontend(json!({ "acl": [{ "name": name, "criterion": "path_beg", "values": ["/"] }] })),
        ),
        (
            "error file name",
            backend("default", "web", &backend_spec(json!({
                "errorFiles": [{ "code": 503, "file": { "name": name, "value": "down" } }]
            })))
            .map(drop),
        ),
    ];

    for (what, result) in failures {
        assert_eq!(
            result,
            Err(ValidationError::FileName {
                what,
                name: name.to_string()
            }),
            "{what}"
        );
    }
}

#[test]
fn dotted_file_names_are_accepted() {
    let spec = frontend_spec(json!({
        "binds": [{
            "port": 443,
            "ssl": { "enabled": true, "certificate": { "name": "www.example.com", "value": "pem" } }
        }]
    }));
    let frontend = frontend("default", "web", &spec).expect("frontend must normalize");
    let ssl = frontend.binds[0].ssl.as_ref().expect("bind must use TLS");
    assert_eq!(
        ssl.certificate.as_ref().map(|c| c.path()),
        Some("/usr/local/etc/haproxy/www.example.com.crt".to_string())
    );
}
