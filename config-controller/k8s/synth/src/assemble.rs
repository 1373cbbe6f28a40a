//! Orders records, enforces name uniqueness and renders the document.

use crate::{error::SynthesisError, Records};
use haproxy_config_controller_core::{
    fragment::render,
    mapper,
    model::{Backend, Frontend, Instance, Listen, Resolver},
    Kind, RecordRef,
};
use haproxy_config_controller_k8s_api::{labels::Map, Resource, ResourceExt};
use std::collections::{hash_map::Entry, HashMap};

/// A normalized record together with the identity and labels of the record
/// it came from.
#[derive(Clone, Debug)]
pub(crate) struct Normalized<T> {
    pub record: RecordRef,
    pub labels: Map,
    pub model: T,
}

/// The normalized records of one pass, each kind ordered by namespace and
/// name.
#[derive(Debug, Default)]
pub(crate) struct NormalizedRecords {
    pub listens: Vec<Normalized<Listen>>,
    pub frontends: Vec<Normalized<Frontend>>,
    pub backends: Vec<Normalized<Backend>>,
    pub resolvers: Vec<Normalized<Resolver>>,
}

/// Tracks which kind first claimed each section name. Names are shared by
/// all kinds, since every record becomes at least one named section.
pub(crate) struct Registry {
    names: HashMap<String, Kind>,
}

// === impl Registry ===

impl Registry {
    /// The instance's own name is reserved.
    pub fn new(instance: &RecordRef) -> Self {
        let mut names = HashMap::new();
        names.insert(instance.name.clone(), Kind::Instance);
        Self { names }
    }

    pub fn claim(&mut self, record: &RecordRef) -> Result<(), SynthesisError> {
        match self.names.entry(record.name.clone()) {
            Entry::Occupied(entry) => Err(SynthesisError::NameCollision {
                record: record.clone(),
                name: record.name.clone(),
                existing: *entry.get(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(record.kind);
                Ok(())
            }
        }
    }
}

// === impl Records ===

impl Records {
    pub(crate) fn len(&self) -> usize {
        self.listens.len() + self.frontends.len() + self.backends.len() + self.resolvers.len()
    }
}

/// Orders records of one kind by namespace and name, independent of the
/// order they were listed in.
pub(crate) fn sorted<K: Resource>(items: &[K]) -> Vec<&K> {
    let mut items = items.iter().collect::<Vec<_>>();
    items.sort_by_cached_key(|r| (r.namespace(), r.name_any()));
    items
}

/// Identifies a record. Records without a namespace are assumed to live in
/// the instance's.
pub(crate) fn record_ref<K: Resource>(kind: Kind, default_ns: &str, resource: &K) -> RecordRef {
    let namespace = resource
        .namespace()
        .unwrap_or_else(|| default_ns.to_string());
    RecordRef::new(kind, namespace, resource.name_any())
}

/// Renders the document: global, defaults, resolvers, frontends, backends
/// and finally the metrics frontend. A listen contributes its frontend half
/// ahead of all frontends and its backend half ahead of all backends.
pub(crate) fn document(instance: &Instance, records: &NormalizedRecords) -> String {
    let mut frontends = Vec::new();
    let mut backends = Vec::new();
    for listen in &records.listens {
        let (frontend, backend) = mapper::listen(&listen.model);
        frontends.push(frontend);
        backends.push(backend);
    }
    frontends.extend(records.frontends.iter().map(|f| mapper::frontend(&f.model)));
    backends.extend(records.backends.iter().map(|b| mapper::backend(&b.model)));

    let sections = [mapper::global(&instance.global), mapper::defaults(&instance.defaults)]
        .into_iter()
        .chain(records.resolvers.iter().map(|r| mapper::resolver(&r.model)))
        .chain(frontends)
        .chain(backends)
        .chain(instance.metrics.as_ref().map(mapper::metrics))
        .collect::<Vec<_>>();

    render(&sections)
}
