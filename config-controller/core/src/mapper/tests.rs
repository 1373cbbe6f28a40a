use super::*;
use crate::{
    fragment::render,
    model::{
        Acl, Backend, BackendSwitching, BackendTarget, Base, Bind, BindSsl, Certificate,
        CertificateList, Check, Condition, ConditionKind, Cookie, CookieMode, Defaults, EnvValue,
        EnvVar, ErrorFile, Frontend, Global, GlobalSsl, HashType, HeaderSource, HeaderValue,
        HealthCheck, Hold, HttpRequestRule, Listen, LogTarget, Metrics, Mode, Nameserver,
        ProxyProtocol, ProxyV2Option, Redirect, RedirectCookie, RedirectKind, RegexMapping,
        Resolver, Server, ServerParams, ServerSsl, ServerTemplate, StaticFile, TcpRequestKind,
        TcpRequestRule, TemplateRange, TimeoutScope, Timeouts, Tune, ValueSource, Verify,
    },
};
use haproxy_config_controller_k8s_api::labels::Selector;
use maplit::btreemap;
use pretty_assertions::assert_eq;

fn certificate(name: &str) -> Certificate {
    Certificate {
        name: name.to_string(),
        source: ValueSource::Inline(String::new()),
    }
}

fn when(test: &str) -> Option<Condition> {
    Some(Condition {
        kind: ConditionKind::If,
        test: test.to_string(),
    })
}

fn empty_frontend(name: &str) -> Frontend {
    Frontend {
        name: name.to_string(),
        base: Base::new(TimeoutScope::Frontend),
        binds: Vec::new(),
        backend_switching: Vec::new(),
        default_backend: None,
    }
}

fn empty_backend(name: &str) -> Backend {
    Backend {
        name: name.to_string(),
        base: Base::new(TimeoutScope::Backend),
        servers: Vec::new(),
        server_templates: Vec::new(),
        balance: None,
        hash_type: None,
        redispatch: false,
        cookie: None,
        health_check: None,
        host_regex: None,
        host_certificate: None,
    }
}

fn empty_listen(name: &str) -> Listen {
    Listen {
        name: name.to_string(),
        base: Base::new(TimeoutScope::Listen),
        binds: Vec::new(),
        servers: Vec::new(),
        server_templates: Vec::new(),
        balance: None,
        hash_type: None,
        redispatch: false,
        cookie: None,
        health_check: None,
        host_certificate: None,
    }
}

fn tls_server(verify: Option<Verify>) -> Server {
    Server {
        name: "server".to_string(),
        address: "localhost".to_string(),
        port: 80,
        params: ServerParams {
            ssl: Some(ServerSsl {
                ca_certificate: Some(certificate("test-ca.crt")),
                verify,
                alpn: vec!["h2".to_string(), "http/1.0".to_string()],
                ..ServerSsl::default()
            }),
            weight: Some(256),
            check: Some(Check {
                inter: Some(5000),
                ..Check::default()
            }),
            verify_host: Some("routername.namespace.svc".to_string()),
            ..ServerParams::default()
        },
    }
}

fn unix_bind(certificate_list: Option<CertificateList>) -> Bind {
    Bind {
        name: "https".to_string(),
        address: "unix@/var/lib/haproxy/run/local.sock".to_string(),
        port: 9443,
        port_range_end: None,
        transparent: false,
        accept_proxy: true,
        ssl: Some(BindSsl::default()),
        certificate_list,
    }
}

#[test]
fn server_with_required_verification() {
    let mut backend = empty_backend("foo-back");
    backend.servers.push(tls_server(Some(Verify::Required)));
    assert_eq!(
        backend::backend(&backend).to_string(),
        "backend foo-back\n  server server localhost:80 check ssl alpn h2,http/1.0 \
         ca-file /usr/local/etc/haproxy/test-ca.crt inter 5000 verify required \
         verifyhost routername.namespace.svc weight 256"
    );
}

#[test]
fn server_without_explicit_verification() {
    let mut server = tls_server(Some(Verify::None));
    server.params.verify_host = None;
    server.params.cookie = true;
    if let Some(ssl) = server.params.ssl.as_mut() {
        ssl.certificate = Some(certificate("test.crt"));
        ssl.sni = Some("str(localhost)".to_string());
        ssl.min_version = Some("TLSv1.3".to_string());
    }
    let mut backend = empty_backend("foo");
    backend.servers.push(server);

    let fragment = backend::backend(&backend);
    assert_eq!(
        fragment.statements(),
        ["server server localhost:80 check ssl ca-file /usr/local/etc/haproxy/test-ca.crt \
          cookie 1c3c2192e2912699ccd31119b162666a crt /usr/local/etc/haproxy/test.crt \
          inter 5000 sni str(localhost) ssl-min-ver TLSv1.3 weight 256"]
    );
}

#[test]
fn server_without_ca_skips_verification() {
    let mut server = tls_server(Some(Verify::Optional));
    server.params = ServerParams {
        ssl: Some(ServerSsl {
            verify: Some(Verify::Optional),
            ..ServerSsl::default()
        }),
        ..ServerParams::default()
    };
    let mut backend = empty_backend("foo");
    backend.servers.push(server);
    assert_eq!(
        backend::backend(&backend).statements(),
        ["server server localhost:80 ssl verify none"]
    );
}

#[test]
fn server_templates() {
    let mut backend = empty_backend("foo");
    backend.server_templates.push(ServerTemplate {
        prefix: "test_".to_string(),
        range: TemplateRange::Count(0),
        fqdn: "test.com".to_string(),
        port: 9443,
        params: ServerParams {
            ssl: Some(ServerSsl {
                certificate: Some(certificate("my-cert")),
                ca_certificate: Some(certificate("my-ca")),
                verify: Some(Verify::Required),
                min_version: Some("TLSv1.3".to_string()),
                sni: Some("test.svc.cluster.local".to_string()),
                alpn: vec!["h2".to_string(), "http/1.1".to_string()],
            }),
            ..ServerParams::default()
        },
    });
    backend.server_templates.push(ServerTemplate {
        prefix: "srv".to_string(),
        range: TemplateRange::Range(1, 3),
        fqdn: "google.com".to_string(),
        port: 80,
        params: ServerParams {
            proxy_protocol: Some(ProxyProtocol::V2(vec![
                ProxyV2Option::Ssl,
                ProxyV2Option::CertCn,
                ProxyV2Option::UniqueId,
            ])),
            ..ServerParams::default()
        },
    });

    assert_eq!(
        backend::backend(&backend).statements(),
        [
            "server-template test_ 0 test.com:9443 ssl ca-file /usr/local/etc/haproxy/my-ca.crt \
             crt /usr/local/etc/haproxy/my-cert.crt sni test.svc.cluster.local \
             ssl-min-ver TLSv1.3 verify required",
            "server-template srv 1-3 google.com:80 send-proxy-v2 \
             proxy-v2-options ssl,cert-cn,unique-id",
        ]
    );
}

#[test]
fn proxy_protocols() {
    let line = |protocol| {
        let mut backend = empty_backend("foo");
        backend.servers.push(Server {
            name: "s".to_string(),
            address: "10.0.0.1".to_string(),
            port: 8080,
            params: ServerParams {
                proxy_protocol: Some(protocol),
                ..ServerParams::default()
            },
        });
        backend::backend(&backend).statements()[0].clone()
    };

    assert_eq!(line(ProxyProtocol::V1), "server s 10.0.0.1:8080 send-proxy");
    assert_eq!(
        line(ProxyProtocol::V2(Vec::new())),
        "server s 10.0.0.1:8080 send-proxy-v2"
    );
    assert_eq!(
        line(ProxyProtocol::V2Ssl),
        "server s 10.0.0.1:8080 send-proxy-v2-ssl"
    );
    assert_eq!(
        line(ProxyProtocol::V2SslCn),
        "server s 10.0.0.1:8080 send-proxy-v2-ssl-cn"
    );
}

#[test]
fn cookie_persistence() {
    let mut backend = empty_backend("foo");
    backend.cookie = Some(Cookie {
        name: "test".to_string(),
        mode: Some(CookieMode::Rewrite),
        domains: vec!["domain1".to_string(), ".openshift".to_string()],
        attributes: vec!["SameSite=None".to_string()],
        http_only: true,
        indirect: true,
        max_idle: 120,
        max_life: 45,
        no_cache: true,
        post_only: true,
        preserve: true,
        secure: true,
        dynamic: false,
    });
    assert_eq!(
        backend::backend(&backend).statements(),
        ["cookie 098f6bcd4621d373cade4e832627b4f6 domain domain1 domain .openshift \
          attr SameSite=None httponly indirect maxidle 120 maxlife 45 nocache postonly \
          preserve rewrite secure"]
    );
}

#[test]
fn dynamic_cookie() {
    let mut backend = empty_backend("foo");
    backend.cookie = Some(Cookie {
        name: "cookie_name".to_string(),
        mode: Some(CookieMode::Insert),
        dynamic: true,
        ..Cookie::default()
    });
    assert_eq!(
        backend::backend(&backend).statements(),
        [
            "cookie e3cb9741ffde596f46710a5d7e3ec587 insert dynamic",
            "dynamic-cookie-key e3cb9741ffde596f46710a5d7e3ec587",
        ]
    );
}

#[test]
fn backend_statement_order() {
    let mut backend = empty_backend("web");
    backend.base.mode = Some(Mode::Http);
    backend.base.forward_for = Some(Default::default());
    backend.base.http_pretend_keepalive = true;
    backend.base.timeouts.insert("server", 30000).unwrap();
    backend.base.timeouts.insert("connect", 5000).unwrap();
    backend.balance = Some("roundrobin".to_string());
    backend.hash_type = Some(HashType {
        method: Some("consistent".to_string()),
        function: Some("djb2".to_string()),
        modifier: Some("avalanche".to_string()),
    });
    backend.redispatch = true;
    backend.health_check = Some(HealthCheck::Http {
        method: "GET".to_string(),
        uri: "/healthz".to_string(),
    });
    backend.base.acls.push(Acl {
        name: "internal".to_string(),
        criterion: "src".to_string(),
        values: vec!["10.0.0.0/8".to_string()],
    });
    backend.servers.push(Server {
        name: "a".to_string(),
        address: "10.0.0.1".to_string(),
        port: 8080,
        params: ServerParams::default(),
    });

    assert_eq!(
        backend::backend(&backend).to_string(),
        "backend web\n  \
         mode http\n  \
         balance roundrobin\n  \
         hash-type consistent djb2 avalanche\n  \
         option forwardfor\n  \
         option http-pretend-keepalive\n  \
         option redispatch\n  \
         option httpchk GET /healthz\n  \
         timeout connect 5000\n  \
         timeout server 30000\n  \
         acl internal src 10.0.0.0/8\n  \
         server a 10.0.0.1:8080"
    );
}

#[test]
fn binds() {
    let list = CertificateList {
        name: "cert_list".to_string(),
        elements: Vec::new(),
        selector: None,
    };
    let mut frontend = empty_frontend("fe-https-tls-termination");
    frontend.binds.push(unix_bind(Some(list)));
    frontend.binds.push(Bind {
        name: "bind01".to_string(),
        address: String::new(),
        port: 80,
        port_range_end: None,
        transparent: false,
        accept_proxy: false,
        ssl: None,
        certificate_list: None,
    });
    frontend.binds.push(Bind {
        name: "range".to_string(),
        address: "0.0.0.0".to_string(),
        port: 8000,
        port_range_end: Some(8010),
        transparent: true,
        accept_proxy: false,
        ssl: Some(BindSsl {
            certificate: Some(certificate("test.crt")),
            ca_certificate: Some(certificate("test-ca.crt")),
            verify: Some(Verify::Required),
            min_version: Some("SSLv3".to_string()),
        }),
        certificate_list: None,
    });

    assert_eq!(
        frontend::frontend(&frontend).statements(),
        [
            "bind unix@/var/lib/haproxy/run/local.sock:9443 name https ssl accept-proxy \
             crt-list /usr/local/etc/haproxy/cert_list.map",
            "bind :80 name bind01",
            "bind 0.0.0.0:8000-8010 name range crt /usr/local/etc/haproxy/test.crt \
             ca-file /usr/local/etc/haproxy/test-ca.crt ssl verify required transparent \
             ssl-min-ver SSLv3",
        ]
    );
}

#[test]
fn backend_switching() {
    let mut frontend = empty_frontend("public");
    frontend.base.mode = Some(Mode::Http);
    frontend.base.timeouts.insert("client", 50000).unwrap();
    frontend.backend_switching.push(BackendSwitching {
        target: BackendTarget::Name("api".to_string()),
        condition: when("{ path_beg /api }"),
    });
    frontend.backend_switching.push(BackendSwitching {
        target: BackendTarget::RegexMap(RegexMapping {
            name: "route".to_string(),
            parameter: "req.hdr(host),lower".to_string(),
            selector: Selector::default(),
        }),
        condition: None,
    });
    frontend.backend_switching.push(BackendSwitching {
        target: BackendTarget::RegexMap(RegexMapping {
            name: "api-route".to_string(),
            parameter: "req.hdr(host),lower".to_string(),
            selector: Selector::default(),
        }),
        condition: when("{ path_beg /v2 }"),
    });
    frontend.default_backend = Some("web".to_string());

    assert_eq!(
        frontend::frontend(&frontend).to_string(),
        "frontend public\n  \
         mode http\n  \
         timeout client 50000\n  \
         use_backend api if { path_beg /api }\n  \
         use_backend %[req.hdr(host),lower,map_reg(/usr/local/etc/haproxy/route.map)] \
         if { req.hdr(host),lower,map_reg(/usr/local/etc/haproxy/route.map) -m found }\n  \
         use_backend %[req.hdr(host),lower,map_reg(/usr/local/etc/haproxy/api-route.map)] \
         if { path_beg /v2 }\n  \
         default_backend web"
    );
}

#[test]
fn http_request_rules() {
    let mut frontend = empty_frontend("foo");
    frontend.base.http_request = vec![
        HttpRequestRule::SetHeader {
            name: "X-Forwarded-Proto".to_string(),
            value: HeaderValue::literal("https"),
            condition: when("{ ssl_fc }"),
        },
        HttpRequestRule::AddHeader {
            name: "Authorization".to_string(),
            value: HeaderValue {
                source: HeaderSource::Env(EnvVar {
                    name: "TOKEN".to_string(),
                    value: EnvValue::Literal("secret".to_string()),
                }),
                format: Some("\"Bearer %s\"".to_string()),
            },
            condition: None,
        },
        HttpRequestRule::SetPath {
            format: "/foo%[path]".to_string(),
            condition: None,
        },
        HttpRequestRule::ReplacePath {
            regex: "(.*)".to_string(),
            format: "/foo\\1".to_string(),
            condition: None,
        },
        HttpRequestRule::Redirect(Redirect {
            kind: RedirectKind::Scheme,
            value: "https".to_string(),
            code: None,
            drop_query: true,
            append_slash: true,
            set_cookie: Some(RedirectCookie {
                name: "classic".to_string(),
                value: "=1".to_string(),
            }),
            clear_cookie: Some(RedirectCookie {
                name: "classic".to_string(),
                value: "=".to_string(),
            }),
            condition: None,
        }),
        HttpRequestRule::Deny {
            status: Some(403),
            condition: Some(Condition {
                kind: ConditionKind::Unless,
                test: "internal".to_string(),
            }),
        },
        HttpRequestRule::Return {
            status: Some(200),
            content_type: "text/plain".to_string(),
            format: "string".to_string(),
            content: "ok".to_string(),
        },
    ];

    assert_eq!(
        frontend::frontend(&frontend).statements(),
        [
            "http-request set-header X-Forwarded-Proto https if { ssl_fc }",
            "http-request add-header Authorization \"Bearer ${TOKEN}\"",
            "http-request set-path /foo%[path]",
            "http-request replace-path (.*) /foo\\1",
            "http-request redirect scheme https drop-query append-slash \
             set-cookie CLASSIC=1 clear-cookie CLASSIC=",
            "http-request deny deny_status 403 unless internal",
            "http-request return status 200 content-type text/plain string \"ok\"",
        ]
    );
}

#[test]
fn tcp_requests_acls_and_error_files() {
    let mut frontend = empty_frontend("foo");
    frontend.base.tcp_request = vec![
        TcpRequestRule {
            kind: TcpRequestKind::InspectDelay,
            action: None,
            timeout: Some(5000),
            condition: None,
        },
        TcpRequestRule {
            kind: TcpRequestKind::Content,
            action: Some("accept".to_string()),
            timeout: None,
            condition: when("{ req_ssl_hello_type 1 }"),
        },
    ];
    let values = (0..70).map(|i| format!("10.0.0.{i}")).collect::<Vec<_>>();
    let long = Acl {
        name: "allowed".to_string(),
        criterion: "src".to_string(),
        values,
    };
    let path = long.file_path();
    frontend.base.acls.push(long);
    frontend.base.error_files.push(ErrorFile {
        code: 503,
        file: StaticFile {
            name: "503".to_string(),
            source: None,
        },
    });

    assert_eq!(
        frontend::frontend(&frontend).statements(),
        [
            format!("acl allowed src -f {path}"),
            "tcp-request inspect-delay 5000".to_string(),
            "tcp-request content accept if { req_ssl_hello_type 1 }".to_string(),
            "errorfile 503 /usr/local/etc/haproxy/503.http".to_string(),
        ]
    );
}

#[test]
fn listen_splits_into_frontend_and_backend() {
    let (front, back) = listen(&empty_listen("foo"));
    assert_eq!(
        render([&front, &back]),
        "frontend foo\n  default_backend foo\n\nbackend foo\n"
    );

    let mut listen = empty_listen("db");
    listen.base.mode = Some(Mode::Tcp);
    listen.base.timeouts.insert("client", 1000).unwrap();
    listen.base.timeouts.insert("server", 2000).unwrap();
    listen.base.timeouts.insert("http-request", 3000).unwrap();
    let (front, back) = super::listen(&listen);
    assert_eq!(
        front.statements(),
        [
            "mode tcp",
            "timeout client 1000",
            "timeout http-request 3000",
            "default_backend db",
        ]
    );
    assert_eq!(
        back.statements(),
        ["mode tcp", "timeout http-request 3000", "timeout server 2000"]
    );
}

#[test]
fn resolvers() {
    let simple = Resolver {
        name: "foo".to_string(),
        nameservers: Vec::new(),
        accepted_payload_size: None,
        hold: Hold::default(),
        timeout_resolve: Resolver::DEFAULT_TIMEOUT_MS,
        timeout_retry: Resolver::DEFAULT_TIMEOUT_MS,
        parse_resolv_conf: false,
        resolve_retries: Resolver::DEFAULT_RESOLVE_RETRIES,
    };
    assert_eq!(
        resolver(&simple).to_string(),
        "resolvers foo\n  timeout resolve 1000\n  timeout retry 1000\n  resolve_retries 3"
    );

    let full = Resolver {
        name: "bar-foo-res".to_string(),
        nameservers: vec![Nameserver {
            name: "dns1".to_string(),
            address: "10.0.0.10".to_string(),
            port: 53,
        }],
        accepted_payload_size: Some(8192),
        hold: Hold {
            nx: Some(500),
            valid: Some(1000),
            ..Hold::default()
        },
        parse_resolv_conf: true,
        ..simple
    };
    assert_eq!(
        resolver(&full).statements(),
        [
            "nameserver dns1 10.0.0.10:53",
            "accepted_payload_size 8192",
            "hold nx 500",
            "hold valid 1000",
            "timeout resolve 1000",
            "timeout retry 1000",
            "parse-resolv-conf",
            "resolve_retries 3",
        ]
    );
}

#[test]
fn global_section() {
    let config = Global {
        hard_stop_after: Some(30000),
        log: Some(LogTarget {
            address: "/var/lib/rsyslog/rsyslog.sock".to_string(),
            facility: Some("local0".to_string()),
            ..LogTarget::default()
        }),
        send_hostname: Some(None),
        ..Global::default()
    };
    assert_eq!(
        global(&config).to_string(),
        "global\n  hard-stop-after 30000\n  log /var/lib/rsyslog/rsyslog.sock local0\n  log-send-hostname"
    );
}

#[test]
fn global_tuning() {
    let config = Global {
        maxconn: Some(4000),
        nbthread: Some(4),
        reload: true,
        stats_timeout: Some(60000),
        ssl: Some(GlobalSsl {
            ciphers: vec!["ECDHE-RSA-AES128-GCM-SHA256".to_string(), "AES256-SHA".to_string()],
            ciphersuites: Vec::new(),
            min_version: Some("TLSv1.2".to_string()),
        }),
        tune: Some(Tune {
            bufsize: Some(32768),
            ssl_lifetime: Some(300),
            ssl_force_private_cache: true,
            ..Default::default()
        }),
        additional_parameters: vec!["ssl-server-verify none".to_string()],
        ..Global::default()
    };
    assert_eq!(
        global(&config).statements(),
        [
            "maxconn 4000",
            "nbthread 4",
            "stats socket /var/lib/haproxy/run/haproxy.sock mode 600 level admin expose-fd listeners",
            "stats timeout 60000",
            "ssl-default-bind-ciphers ECDHE-RSA-AES128-GCM-SHA256:AES256-SHA",
            "ssl-default-bind-options ssl-min-ver TLSv1.2",
            "tune.bufsize 32768",
            "tune.ssl.lifetime 300",
            "tune.ssl.force-private-cache",
            "ssl-server-verify none",
        ]
    );
}

#[test]
fn defaults_section() {
    let mut timeouts = Timeouts::new(TimeoutScope::Defaults);
    for (key, millis) in btreemap! { "client" => 50000, "connect" => 5000, "server-fin" => 1000 } {
        timeouts.insert(key, millis).unwrap();
    }
    let config = Defaults {
        mode: Some(Mode::Http),
        log_global: true,
        http_log: true,
        tcp_log: false,
        timeouts,
        error_files: Vec::new(),
        additional_parameters: Vec::new(),
    };
    assert_eq!(
        defaults(&config).to_string(),
        "defaults\n  mode http\n  log global\n  option httplog\n  \
         timeout client 50000\n  timeout connect 5000\n  timeout server-fin 1000"
    );
}

#[test]
fn metrics_frontend() {
    let config = Metrics {
        address: Metrics::DEFAULT_ADDRESS.to_string(),
        port: 9100,
    };
    assert_eq!(
        metrics(&config).to_string(),
        "frontend metrics\n  \
         mode http\n  \
         stats enable\n  \
         stats uri /stats\n  \
         stats refresh 10000\n  \
         bind 0.0.0.0:9100 name metrics\n  \
         http-request use-service prometheus-exporter if { path /metrics }"
    );
}
