use crate::{
    fragment::{Fragment, SectionKind},
    model::Resolver,
};

pub fn resolver(resolver: &Resolver) -> Fragment {
    let mut fragment = Fragment::named(SectionKind::Resolvers, &resolver.name);

    fragment.extend(
        resolver
            .nameservers
            .iter()
            .map(|ns| format!("nameserver {} {}:{}", ns.name, ns.address, ns.port)),
    );
    if let Some(size) = resolver.accepted_payload_size {
        fragment.push(format!("accepted_payload_size {size}"));
    }

    let hold = &resolver.hold;
    for (status, millis) in [
        ("nx", hold.nx),
        ("obsolete", hold.obsolete),
        ("other", hold.other),
        ("refused", hold.refused),
        ("timeout", hold.timeout),
        ("valid", hold.valid),
    ] {
        if let Some(millis) = millis {
            fragment.push(format!("hold {status} {millis}"));
        }
    }

    fragment.push(format!("timeout resolve {}", resolver.timeout_resolve));
    fragment.push(format!("timeout retry {}", resolver.timeout_retry));
    if resolver.parse_resolv_conf {
        fragment.push("parse-resolv-conf");
    }
    fragment.push(format!("resolve_retries {}", resolver.resolve_retries));

    fragment
}
