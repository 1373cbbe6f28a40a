use super::{condition, file_name, millis, non_empty, status_code};
use haproxy_config_controller_core::{
    model::{
        Acl, Base, EnvValue, EnvVar, ErrorFile, ForwardFor, HeaderSource, HeaderValue,
        HttpRequestRule, Redirect, RedirectCookie, RedirectKind, StaticFile, TcpRequestKind,
        TcpRequestRule, TimeoutScope, ValidationError, ValueSource, ERROR_FILE_CODES,
    },
    StoreRef,
};
use haproxy_config_controller_k8s_api::config::common as api;

pub(super) fn base(
    namespace: &str,
    spec: &api::BaseSpec,
    scope: TimeoutScope,
) -> Result<Base, ValidationError> {
    let mut base = Base::new(scope);

    base.mode = spec
        .mode
        .as_deref()
        .filter(|m| !m.is_empty())
        .map(str::parse)
        .transpose()?;
    base.forward_for = spec
        .forward_for
        .as_ref()
        .filter(|ff| ff.enabled)
        .map(|ff| ForwardFor {
            except: ff.except.clone(),
            header: ff.header.clone(),
            if_none: ff.ifnone,
        });
    base.http_pretend_keepalive = spec.http_pretend_keepalive.unwrap_or(false);

    for (key, timeout) in &spec.timeouts {
        let millis = millis(&format!("timeout {key}"), timeout)?;
        base.timeouts.insert(key, millis)?;
    }

    base.acls = spec
        .acl
        .iter()
        .map(|acl| {
            Ok(Acl {
                name: file_name("acl name", &acl.name)?,
                criterion: acl.criterion.clone(),
                values: acl.values.clone(),
            })
        })
        .collect::<Result<_, ValidationError>>()?;
    base.tcp_request = spec
        .tcp_request
        .iter()
        .map(tcp_request)
        .collect::<Result<_, _>>()?;
    if let Some(rules) = &spec.http_request {
        base.http_request = http_request(namespace, rules)?;
    }
    base.error_files = error_files(namespace, &spec.error_files)?;

    Ok(base)
}

pub(super) fn error_files(
    namespace: &str,
    files: &[api::ErrorFile],
) -> Result<Vec<ErrorFile>, ValidationError> {
    files
        .iter()
        .map(|ef| {
            let code = u16::try_from(ef.code)
                .ok()
                .filter(|c| ERROR_FILE_CODES.contains(c))
                .ok_or(ValidationError::ErrorFileCode(ef.code))?;
            Ok(ErrorFile {
                code,
                file: static_file(namespace, &ef.file)?,
            })
        })
        .collect()
}

fn static_file(namespace: &str, file: &api::StaticHttpFile) -> Result<StaticFile, ValidationError> {
    if file.name.is_empty() {
        return Err(ValidationError::Empty("error file name"));
    }

    let source = match (&file.value, &file.value_from.config_map_key_ref) {
        (Some(value), _) => Some(ValueSource::Inline(value.clone())),
        (None, Some(r)) => Some(ValueSource::Store(vec![StoreRef::config_map(
            namespace, &r.name, &r.key,
        )])),
        (None, None) => None,
    };

    Ok(StaticFile {
        name: file_name("error file name", &file.name)?,
        source,
    })
}

fn tcp_request(rule: &api::TcpRequestRule) -> Result<TcpRequestRule, ValidationError> {
    let kind = match rule.type_.as_str() {
        "connection" => TcpRequestKind::Connection,
        "content" => TcpRequestKind::Content,
        "inspect-delay" => TcpRequestKind::InspectDelay,
        "session" => TcpRequestKind::Session,
        other => return Err(ValidationError::TcpRequestType(other.to_string())),
    };

    Ok(TcpRequestRule {
        kind,
        action: rule.action.as_deref().and_then(non_empty),
        timeout: rule
            .timeout
            .as_ref()
            .map(|t| millis("tcp-request timeout", t))
            .transpose()?,
        condition: condition(&rule.rule)?,
    })
}

/// Flattens the rule groups into emission order: set-header, set-path,
/// add-header, replace-path, deny, redirect, return.
fn http_request(
    namespace: &str,
    rules: &api::HttpRequestRules,
) -> Result<Vec<HttpRequestRule>, ValidationError> {
    let mut out = Vec::new();

    for rule in &rules.set_header {
        out.push(HttpRequestRule::SetHeader {
            name: rule.name.clone(),
            value: header_value(namespace, &rule.value)?,
            condition: condition(&rule.rule)?,
        });
    }
    for rule in &rules.set_path {
        out.push(HttpRequestRule::SetPath {
            format: rule.value.clone(),
            condition: condition(&rule.rule)?,
        });
    }
    for rule in &rules.add_header {
        out.push(HttpRequestRule::AddHeader {
            name: rule.name.clone(),
            value: header_value(namespace, &rule.value)?,
            condition: condition(&rule.rule)?,
        });
    }
    for rule in &rules.replace_path {
        out.push(HttpRequestRule::ReplacePath {
            regex: rule.match_regex.clone(),
            format: rule.replace_fmt.clone(),
            condition: condition(&rule.rule)?,
        });
    }
    if let Some(deny) = rules.deny.as_ref().filter(|d| d.enabled) {
        out.push(HttpRequestRule::Deny {
            status: rules.deny_status.map(status_code).transpose()?,
            condition: condition(&deny.rule)?,
        });
    }
    for rule in &rules.redirect {
        if let Some(redirect) = redirect(rule)? {
            out.push(HttpRequestRule::Redirect(redirect));
        }
    }
    if let Some(ret) = &rules.return_ {
        out.push(HttpRequestRule::Return {
            status: ret.status.map(status_code).transpose()?,
            content_type: ret.content.type_.clone(),
            format: ret.content.format.clone(),
            content: ret.content.value.clone(),
        });
    }

    Ok(out)
}

/// A redirect without a type has no effect and is dropped.
fn redirect(rule: &api::Redirect) -> Result<Option<Redirect>, ValidationError> {
    let selected = [
        (rule.type_.location, RedirectKind::Location),
        (rule.type_.prefix, RedirectKind::Prefix),
        (rule.type_.scheme, RedirectKind::Scheme),
    ]
    .into_iter()
    .filter_map(|(set, kind)| set.then_some(kind))
    .collect::<Vec<_>>();
    let kind = match selected[..] {
        [] => return Ok(None),
        [kind] => kind,
        _ => return Err(ValidationError::RedirectType),
    };

    let option = rule.option.clone().unwrap_or_default();
    let cookie = |c: Option<api::RedirectCookie>| {
        c.map(|c| RedirectCookie {
            name: c.name,
            value: c.value,
        })
    };

    Ok(Some(Redirect {
        kind,
        value: rule.value.clone(),
        code: rule.code.map(status_code).transpose()?,
        drop_query: option.drop_query,
        append_slash: option.append_slash,
        set_cookie: cookie(option.set_cookie),
        clear_cookie: cookie(option.clear_cookie),
        condition: condition(&rule.rule)?,
    }))
}

fn header_value(namespace: &str, value: &api::HttpHeaderValue) -> Result<HeaderValue, ValidationError> {
    let source = match &value.env {
        Some(env) => {
            if env.name.is_empty() {
                return Err(ValidationError::Empty("header env name"));
            }
            let secret = env.value_from.as_ref().and_then(|v| v.secret_key_ref.as_ref());
            let value = match secret {
                Some(r) => EnvValue::Secret(StoreRef::secret(namespace, &r.name, &r.key)),
                None => EnvValue::Literal(env.value.clone().unwrap_or_default()),
            };
            HeaderSource::Env(EnvVar {
                name: env.name.clone(),
                value,
            })
        }
        None => HeaderSource::Literal(value.str.clone().unwrap_or_default()),
    };

    Ok(HeaderValue {
        source,
        format: value.format.as_deref().and_then(non_empty),
    })
}
