//! Converts records into the normalized model.
//!
//! Every check that can reject a record happens here, so the mapper never
//! sees an invalid value. References to ConfigMaps and Secrets are resolved
//! against the instance's namespace unless the record names one explicitly.

mod base;
mod bind;
mod instance;
mod server;

#[cfg(test)]
mod tests;

pub use self::instance::{instance, resolver};

use haproxy_config_controller_core::model::{
    Backend, BackendSwitching, BackendTarget, Condition, ConditionKind, Frontend, Listen,
    RegexMapping, TimeoutScope, ValidationError,
};
use haproxy_config_controller_k8s_api::{
    config::{common::Rule, frontend::BackendSwitchingRule, BackendSpec, FrontendSpec, ListenSpec},
    K8sDuration,
};

pub fn frontend(
    namespace: &str,
    name: &str,
    spec: &FrontendSpec,
) -> Result<Frontend, ValidationError> {
    let base = base::base(namespace, &spec.base, TimeoutScope::Frontend)?;
    let binds = spec
        .binds
        .iter()
        .map(|b| bind::bind(namespace, b))
        .collect::<Result<_, _>>()?;
    let backend_switching = spec
        .backend_switching
        .iter()
        .map(backend_switching)
        .collect::<Result<_, _>>()?;

    Ok(Frontend {
        name: name.to_string(),
        base,
        binds,
        backend_switching,
        default_backend: non_empty(&spec.default_backend.name),
    })
}

fn backend_switching(rule: &BackendSwitchingRule) -> Result<BackendSwitching, ValidationError> {
    let name = rule.backend.name.as_deref().and_then(non_empty);
    let target = match (name, &rule.backend.regex_mapping) {
        (Some(name), None) => BackendTarget::Name(name),
        (None, Some(mapping)) => BackendTarget::RegexMap(RegexMapping {
            name: file_name("regex mapping name", &mapping.name)?,
            parameter: mapping.parameter.clone(),
            selector: mapping.selector.clone(),
        }),
        _ => return Err(ValidationError::BackendReference),
    };

    Ok(BackendSwitching {
        target,
        condition: condition(&rule.rule)?,
    })
}

pub fn backend(namespace: &str, name: &str, spec: &BackendSpec) -> Result<Backend, ValidationError> {
    let mut base = base::base(namespace, &spec.base, TimeoutScope::Backend)?;
    if let Some(timeout) = &spec.check_timeout {
        base.timeouts.insert("check", millis("timeout check", timeout)?)?;
    }

    Ok(Backend {
        name: name.to_string(),
        base,
        servers: server::servers(namespace, &spec.servers)?,
        server_templates: server::templates(namespace, &spec.server_templates)?,
        balance: server::balance(spec.balance.as_ref()),
        hash_type: spec.hash_type.as_ref().map(server::hash_type),
        redispatch: spec.redispatch.unwrap_or(false),
        cookie: spec.cookie.as_ref().map(server::cookie).transpose()?,
        health_check: server::health_check(spec.http_chk.as_ref(), spec.tcp_check),
        host_regex: non_empty(&spec.host_regex),
        host_certificate: spec
            .host_certificate
            .as_ref()
            .map(|e| bind::element(namespace, e))
            .transpose()?,
    })
}

/// Normalizes a listen once. Its frontend and backend halves are projected
/// from the result, so both see the same validated values.
pub fn listen(namespace: &str, name: &str, spec: &ListenSpec) -> Result<Listen, ValidationError> {
    let mut base = base::base(namespace, &spec.base, TimeoutScope::Listen)?;
    if let Some(timeout) = &spec.check_timeout {
        base.timeouts.insert("check", millis("timeout check", timeout)?)?;
    }

    Ok(Listen {
        name: name.to_string(),
        base,
        binds: spec
            .binds
            .iter()
            .map(|b| bind::bind(namespace, b))
            .collect::<Result<_, _>>()?,
        servers: server::servers(namespace, &spec.servers)?,
        server_templates: server::templates(namespace, &spec.server_templates)?,
        balance: server::balance(spec.balance.as_ref()),
        hash_type: spec.hash_type.as_ref().map(server::hash_type),
        redispatch: spec.redispatch.unwrap_or(false),
        cookie: spec.cookie.as_ref().map(server::cookie).transpose()?,
        health_check: server::health_check(spec.http_check.as_ref(), spec.tcp_check),
        host_certificate: spec
            .host_certificate
            .as_ref()
            .map(|e| bind::element(namespace, e))
            .transpose()?,
    })
}

/// A rule without a condition applies unconditionally.
fn condition(rule: &Rule) -> Result<Option<Condition>, ValidationError> {
    let Some(test) = rule.condition.as_deref().and_then(non_empty) else {
        return Ok(None);
    };
    let kind = match rule.condition_type.as_deref() {
        None | Some("") | Some("if") => ConditionKind::If,
        Some("unless") => ConditionKind::Unless,
        Some(other) => return Err(ValidationError::ConditionType(other.to_string())),
    };
    Ok(Some(Condition { kind, test }))
}

fn millis(field: &str, duration: &K8sDuration) -> Result<u64, ValidationError> {
    if duration.is_negative() {
        return Err(ValidationError::NegativeDuration(field.to_string()));
    }
    Ok(duration.as_millis())
}

fn port(port: i64) -> Result<u16, ValidationError> {
    u16::try_from(port)
        .ok()
        .filter(|p| *p != 0)
        .ok_or(ValidationError::Port(port))
}

fn status_code(code: i64) -> Result<u16, ValidationError> {
    u16::try_from(code)
        .ok()
        .filter(|c| (100..=599).contains(c))
        .ok_or(ValidationError::StatusCode(code))
}

/// Names that become side-file names must stay inside the configuration
/// directory.
fn file_name(what: &'static str, name: &str) -> Result<String, ValidationError> {
    if name.contains(['/', '\0']) || name.contains("..") {
        return Err(ValidationError::FileName {
            what,
            name: name.to_string(),
        });
    }
    Ok(name.to_string())
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
