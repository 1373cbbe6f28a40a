use super::{base, bind, millis, non_empty, port};
use haproxy_config_controller_core::model::{
    Defaults, Global, GlobalSsl, Hold, Instance, LogTarget, Metrics, Nameserver, Resolver,
    TimeoutScope, Timeouts, Tune, ValidationError,
};
use haproxy_config_controller_k8s_api::{
    config::ResolverSpec,
    proxy::instance::{
        DefaultsConfiguration, GlobalConfiguration, GlobalLoggingConfiguration,
        GlobalTuneOptions, InstanceSpec,
    },
    K8sDuration,
};

const DEFAULT_LOG_ADDRESS: &str = "/var/lib/rsyslog/rsyslog.sock";
const DEFAULT_LOG_FACILITY: &str = "local0";

pub fn instance(namespace: &str, name: &str, spec: &InstanceSpec) -> Result<Instance, ValidationError> {
    let metrics = match spec.metrics.as_ref().filter(|m| m.enabled) {
        Some(m) => Some(Metrics {
            address: m
                .address
                .as_deref()
                .and_then(non_empty)
                .unwrap_or_else(|| Metrics::DEFAULT_ADDRESS.to_string()),
            port: port(m.port)?,
        }),
        None => None,
    };

    Ok(Instance {
        name: name.to_string(),
        namespace: namespace.to_string(),
        global: global(namespace, &spec.configuration.global)?,
        defaults: defaults(namespace, &spec.configuration.defaults)?,
        metrics,
    })
}

fn global(namespace: &str, spec: &GlobalConfiguration) -> Result<Global, ValidationError> {
    let logging = spec.logging.as_ref();

    Ok(Global {
        maxconn: spec.maxconn,
        nbthread: spec.nbthread,
        hard_stop_after: optional_millis("hard-stop-after", spec.hard_stop_after.as_ref())?,
        reload: spec.reload,
        stats_timeout: optional_millis("stats timeout", spec.stats_timeout.as_ref())?,
        log: logging.filter(|l| l.enabled).map(log_target),
        send_hostname: logging
            .filter(|l| l.send_hostname.unwrap_or(false))
            .map(|l| l.hostname.as_deref().and_then(non_empty)),
        ssl: spec.ssl.as_ref().map(|ssl| GlobalSsl {
            ciphers: ssl.default_bind_ciphers.clone(),
            ciphersuites: ssl.default_bind_cipher_suites.clone(),
            min_version: ssl
                .default_bind_options
                .as_ref()
                .and_then(|o| o.min_version.as_deref())
                .and_then(non_empty),
        }),
        tune: spec.tune.as_ref().map(tune).transpose()?,
        additional_parameters: lines(&spec.additional_parameters),
        additional_certificates: spec
            .additional_certificates
            .iter()
            .map(|c| bind::certificate(namespace, c))
            .collect::<Result<_, _>>()?,
    })
}

fn log_target(logging: &GlobalLoggingConfiguration) -> LogTarget {
    LogTarget {
        address: non_empty(&logging.address).unwrap_or_else(|| DEFAULT_LOG_ADDRESS.to_string()),
        facility: Some(
            non_empty(&logging.facility).unwrap_or_else(|| DEFAULT_LOG_FACILITY.to_string()),
        ),
        level: non_empty(&logging.level),
        format: non_empty(&logging.format),
    }
}

fn tune(spec: &GlobalTuneOptions) -> Result<Tune, ValidationError> {
    let mut tune = Tune {
        maxrewrite: spec.maxrewrite,
        bufsize: spec.bufsize,
        ..Tune::default()
    };

    if let Some(ssl) = &spec.ssl {
        tune.ssl_cachesize = ssl.cache_size;
        tune.ssl_keylog = non_empty(&ssl.keylog);
        if let Some(lifetime) = &ssl.lifetime {
            if lifetime.is_negative() {
                return Err(ValidationError::NegativeDuration(
                    "tune.ssl.lifetime".to_string(),
                ));
            }
            tune.ssl_lifetime = Some(lifetime.as_secs_rounded());
        }
        tune.ssl_force_private_cache = ssl.force_private_cache;
        tune.ssl_maxrecord = ssl.max_record;
        tune.ssl_default_dh_param = Some(ssl.default_dh_param).filter(|v| *v != 0);
        tune.ssl_ctx_cache_size = Some(ssl.ctx_cache_size).filter(|v| *v != 0);
        tune.ssl_capture_buffer_size = ssl.capture_buffer_size;
    }

    Ok(tune)
}

fn defaults(namespace: &str, spec: &DefaultsConfiguration) -> Result<Defaults, ValidationError> {
    let mut timeouts = Timeouts::new(TimeoutScope::Defaults);
    for (key, timeout) in &spec.timeouts {
        timeouts.insert(key, millis(&format!("timeout {key}"), timeout)?)?;
    }

    let logging = spec.logging.as_ref();
    Ok(Defaults {
        mode: Some(spec.mode.as_str())
            .filter(|m| !m.is_empty())
            .map(str::parse)
            .transpose()?,
        log_global: logging.map(|l| l.enabled).unwrap_or(false),
        http_log: logging.and_then(|l| l.http_log).unwrap_or(false),
        tcp_log: logging.and_then(|l| l.tcp_log).unwrap_or(false),
        timeouts,
        error_files: base::error_files(namespace, &spec.error_files)?,
        additional_parameters: lines(&spec.additional_parameters),
    })
}

pub fn resolver(name: &str, spec: &ResolverSpec) -> Result<Resolver, ValidationError> {
    let nameservers = spec
        .nameservers
        .iter()
        .map(|ns| {
            Ok(Nameserver {
                name: ns.name.clone(),
                address: ns.address.clone(),
                port: port(ns.port)?,
            })
        })
        .collect::<Result<_, ValidationError>>()?;

    let hold = match &spec.hold {
        Some(h) => Hold {
            nx: optional_millis("hold nx", h.nx.as_ref())?,
            obsolete: optional_millis("hold obsolete", h.obsolete.as_ref())?,
            other: optional_millis("hold other", h.other.as_ref())?,
            refused: optional_millis("hold refused", h.refused.as_ref())?,
            timeout: optional_millis("hold timeout", h.timeout.as_ref())?,
            valid: optional_millis("hold valid", h.valid.as_ref())?,
        },
        None => Hold::default(),
    };

    let timeouts = spec.timeouts.clone().unwrap_or_default();
    Ok(Resolver {
        name: name.to_string(),
        nameservers,
        accepted_payload_size: spec.accepted_payload_size,
        hold,
        timeout_resolve: optional_millis("timeout resolve", timeouts.resolve.as_ref())?
            .unwrap_or(Resolver::DEFAULT_TIMEOUT_MS),
        timeout_retry: optional_millis("timeout retry", timeouts.retry.as_ref())?
            .unwrap_or(Resolver::DEFAULT_TIMEOUT_MS),
        parse_resolv_conf: spec.parse_resolv_conf.unwrap_or(false),
        resolve_retries: spec
            .resolve_retries
            .unwrap_or(Resolver::DEFAULT_RESOLVE_RETRIES),
    })
}

fn optional_millis(field: &str, duration: Option<&K8sDuration>) -> Result<Option<u64>, ValidationError> {
    duration.map(|d| millis(field, d)).transpose()
}

/// Splits free-form parameters into trimmed, non-empty lines.
fn lines(params: &str) -> Vec<String> {
    params
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
