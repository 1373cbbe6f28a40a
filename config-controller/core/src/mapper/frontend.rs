use super::{common, cond};
use crate::{
    fragment::{Fragment, SectionKind},
    model::{BackendSwitching, BackendTarget, Bind, Frontend},
};

pub fn frontend(frontend: &Frontend) -> Fragment {
    let mut fragment = Fragment::named(SectionKind::Frontend, &frontend.name);
    let base = &frontend.base;

    if let Some(mode) = base.mode {
        fragment.push(format!("mode {mode}"));
    }
    if let Some(ff) = &base.forward_for {
        fragment.push(common::forward_for(ff));
    }
    common::timeouts(&mut fragment, &base.timeouts);
    common::rules(&mut fragment, base);

    fragment.extend(frontend.binds.iter().map(bind));
    fragment.extend(frontend.backend_switching.iter().map(use_backend));
    if let Some(name) = &frontend.default_backend {
        fragment.push(format!("default_backend {name}"));
    }

    fragment
}

fn bind(bind: &Bind) -> String {
    let mut line = format!("bind {}:{}", bind.address, bind.port);
    if let Some(end) = bind.port_range_end {
        line.push_str(&format!("-{end}"));
    }
    if !bind.name.is_empty() {
        line.push_str(&format!(" name {}", bind.name));
    }

    if let Some(ssl) = &bind.ssl {
        if let Some(crt) = &ssl.certificate {
            line.push_str(&format!(" crt {}", crt.path()));
        }
        if let Some(ca) = &ssl.ca_certificate {
            line.push_str(&format!(" ca-file {}", ca.path()));
        }
        line.push_str(" ssl");
        if let Some(verify) = ssl.verify {
            line.push_str(&format!(" verify {}", verify.as_str()));
        }
    }
    if bind.accept_proxy {
        line.push_str(" accept-proxy");
    }
    if bind.transparent {
        line.push_str(" transparent");
    }
    if let Some(ssl) = &bind.ssl {
        if let Some(list) = &bind.certificate_list {
            line.push_str(&format!(" crt-list {}", list.path()));
        }
        if let Some(version) = &ssl.min_version {
            line.push_str(&format!(" ssl-min-ver {version}"));
        }
    }

    line
}

fn use_backend(rule: &BackendSwitching) -> String {
    match &rule.target {
        BackendTarget::Name(name) => format!("use_backend {name}{}", cond(&rule.condition)),
        // Without a declared condition the rule applies when the map has a match.
        BackendTarget::RegexMap(mapping) => {
            let lookup = format!("{},map_reg({})", mapping.parameter, mapping.path());
            match &rule.condition {
                Some(_) => format!("use_backend %[{lookup}]{}", cond(&rule.condition)),
                None => format!("use_backend %[{lookup}] if {{ {lookup} -m found }}"),
            }
        }
    }
}
