use super::cond;
use crate::{
    fragment::Fragment,
    model::{Acl, Base, ErrorFile, ForwardFor, HttpRequestRule, Redirect, TcpRequestRule, Timeouts},
};

pub(super) fn forward_for(ff: &ForwardFor) -> String {
    let mut line = "option forwardfor".to_string();
    if let Some(except) = &ff.except {
        line.push_str(" except ");
        line.push_str(except);
    }
    if let Some(header) = &ff.header {
        line.push_str(" header ");
        line.push_str(header);
    }
    if ff.if_none {
        line.push_str(" if-none");
    }
    line
}

pub(super) fn timeouts(fragment: &mut Fragment, timeouts: &Timeouts) {
    fragment.extend(
        timeouts
            .iter()
            .map(|(key, millis)| format!("timeout {key} {millis}")),
    );
}

/// Emits the ACLs and request rules, then the error files.
pub(super) fn rules(fragment: &mut Fragment, base: &Base) {
    fragment.extend(base.acls.iter().map(acl));
    fragment.extend(base.tcp_request.iter().map(tcp_request));
    fragment.extend(base.http_request.iter().map(http_request));
    fragment.extend(base.error_files.iter().map(error_file));
}

pub(super) fn error_file(ef: &ErrorFile) -> String {
    format!("errorfile {} {}", ef.code, ef.file.path())
}

fn acl(acl: &Acl) -> String {
    if acl.is_externalized() {
        return format!("acl {} {} -f {}", acl.name, acl.criterion, acl.file_path());
    }
    let mut line = format!("acl {} {}", acl.name, acl.criterion);
    for value in &acl.values {
        line.push(' ');
        line.push_str(value);
    }
    line
}

fn tcp_request(rule: &TcpRequestRule) -> String {
    let mut line = format!("tcp-request {}", rule.kind.as_str());
    if let Some(action) = &rule.action {
        line.push(' ');
        line.push_str(action);
    }
    if let Some(timeout) = rule.timeout {
        line.push_str(&format!(" {timeout}"));
    }
    line.push_str(&cond(&rule.condition));
    line
}

fn http_request(rule: &HttpRequestRule) -> String {
    match rule {
        HttpRequestRule::SetHeader {
            name,
            value,
            condition,
        } => format!("http-request set-header {name} {value}{}", cond(condition)),
        HttpRequestRule::SetPath { format, condition } => {
            format!("http-request set-path {format}{}", cond(condition))
        }
        HttpRequestRule::AddHeader {
            name,
            value,
            condition,
        } => format!("http-request add-header {name} {value}{}", cond(condition)),
        HttpRequestRule::ReplacePath {
            regex,
            format,
            condition,
        } => format!(
            "http-request replace-path {regex} {format}{}",
            cond(condition)
        ),
        HttpRequestRule::Deny { status, condition } => {
            let status = status
                .map(|s| format!(" deny_status {s}"))
                .unwrap_or_default();
            format!("http-request deny{status}{}", cond(condition))
        }
        HttpRequestRule::Redirect(redirect) => self::redirect(redirect),
        HttpRequestRule::Return {
            status,
            content_type,
            format,
            content,
        } => {
            let mut line = "http-request return".to_string();
            if let Some(status) = status {
                line.push_str(&format!(" status {status}"));
            }
            line.push_str(&format!(" content-type {content_type} {format} "));
            if format.contains("string") {
                line.push_str(&format!("\"{content}\""));
            } else {
                line.push_str(content);
            }
            line
        }
    }
}

fn redirect(redirect: &Redirect) -> String {
    let mut line = format!(
        "http-request redirect {} {}",
        redirect.kind.as_str(),
        redirect.value
    );
    if let Some(code) = redirect.code {
        line.push_str(&format!(" code {code}"));
    }
    if redirect.drop_query {
        line.push_str(" drop-query");
    }
    if redirect.append_slash {
        line.push_str(" append-slash");
    }
    if let Some(cookie) = &redirect.set_cookie {
        line.push_str(&format!(
            " set-cookie {}{}",
            cookie.name.to_uppercase(),
            cookie.value
        ));
    }
    if let Some(cookie) = &redirect.clear_cookie {
        line.push_str(" clear-cookie ");
        line.push_str(&cookie.name.to_uppercase());
        // Only a bare `=` is meaningful after the name here.
        if cookie.value == "=" {
            line.push('=');
        }
    }
    line.push_str(&cond(&redirect.condition));
    line
}
