use super::common;
use crate::{
    fragment::{Fragment, SectionKind},
    model::{Defaults, Global, LogTarget, Metrics, Tune},
};

/// The admin socket exposed when seamless reloads are enabled.
const STATS_SOCKET: &str =
    "stats socket /var/lib/haproxy/run/haproxy.sock mode 600 level admin expose-fd listeners";

pub fn global(global: &Global) -> Fragment {
    let mut fragment = Fragment::unnamed(SectionKind::Global);

    if let Some(maxconn) = global.maxconn {
        fragment.push(format!("maxconn {maxconn}"));
    }
    if let Some(nbthread) = global.nbthread {
        fragment.push(format!("nbthread {nbthread}"));
    }
    if let Some(millis) = global.hard_stop_after {
        fragment.push(format!("hard-stop-after {millis}"));
    }
    if global.reload {
        fragment.push(STATS_SOCKET);
    }
    if let Some(millis) = global.stats_timeout {
        fragment.push(format!("stats timeout {millis}"));
    }
    if let Some(target) = &global.log {
        fragment.push(log(target));
    }
    match &global.send_hostname {
        Some(Some(hostname)) => fragment.push(format!("log-send-hostname {hostname}")),
        Some(None) => fragment.push("log-send-hostname"),
        None => {}
    }

    if let Some(ssl) = &global.ssl {
        if !ssl.ciphers.is_empty() {
            fragment.push(format!("ssl-default-bind-ciphers {}", ssl.ciphers.join(":")));
        }
        if !ssl.ciphersuites.is_empty() {
            fragment.push(format!(
                "ssl-default-bind-ciphersuites {}",
                ssl.ciphersuites.join(":")
            ));
        }
        if let Some(version) = &ssl.min_version {
            fragment.push(format!("ssl-default-bind-options ssl-min-ver {version}"));
        }
    }
    if let Some(t) = &global.tune {
        tune(&mut fragment, t);
    }

    fragment.extend(global.additional_parameters.iter().cloned());
    fragment
}

fn log(target: &LogTarget) -> String {
    let mut line = format!("log {}", target.address);
    if let Some(format) = &target.format {
        line.push_str(&format!(" format {format}"));
    }
    if let Some(facility) = &target.facility {
        line.push_str(&format!(" {facility}"));
    }
    if let Some(level) = &target.level {
        line.push_str(&format!(" {level}"));
    }
    line
}

fn tune(fragment: &mut Fragment, tune: &Tune) {
    let numbers = [
        ("tune.maxrewrite", tune.maxrewrite),
        ("tune.bufsize", tune.bufsize),
        ("tune.ssl.cachesize", tune.ssl_cachesize),
    ];
    for (name, value) in numbers {
        if let Some(value) = value {
            fragment.push(format!("{name} {value}"));
        }
    }
    if let Some(keylog) = &tune.ssl_keylog {
        fragment.push(format!("tune.ssl.keylog {keylog}"));
    }
    if let Some(secs) = tune.ssl_lifetime {
        fragment.push(format!("tune.ssl.lifetime {secs}"));
    }
    if tune.ssl_force_private_cache {
        fragment.push("tune.ssl.force-private-cache");
    }
    let numbers = [
        ("tune.ssl.maxrecord", tune.ssl_maxrecord),
        ("tune.ssl.default-dh-param", tune.ssl_default_dh_param),
        ("tune.ssl.ssl-ctx-cache-size", tune.ssl_ctx_cache_size),
        ("tune.ssl.capture-buffer-size", tune.ssl_capture_buffer_size),
    ];
    for (name, value) in numbers {
        if let Some(value) = value {
            fragment.push(format!("{name} {value}"));
        }
    }
}

pub fn defaults(defaults: &Defaults) -> Fragment {
    let mut fragment = Fragment::unnamed(SectionKind::Defaults);

    if let Some(mode) = defaults.mode {
        fragment.push(format!("mode {mode}"));
    }
    if defaults.log_global {
        fragment.push("log global");
    }
    if defaults.http_log {
        fragment.push("option httplog");
    }
    if defaults.tcp_log {
        fragment.push("option tcplog");
    }
    common::timeouts(&mut fragment, &defaults.timeouts);
    fragment.extend(defaults.error_files.iter().map(common::error_file));
    fragment.extend(defaults.additional_parameters.iter().cloned());

    fragment
}

pub fn metrics(metrics: &Metrics) -> Fragment {
    let mut fragment = Fragment::named(SectionKind::Frontend, "metrics");
    fragment.push("mode http");
    fragment.push("stats enable");
    fragment.push("stats uri /stats");
    fragment.push("stats refresh 10000");
    fragment.push(format!(
        "bind {}:{} name metrics",
        metrics.address, metrics.port
    ));
    fragment.push("http-request use-service prometheus-exporter if { path /metrics }");
    fragment
}
