// ── Identity cache ──
//
// Memoizes remote lookups for the lifetime of one `Reconciler`. The cache
// is passive: it never calls out, misses are resolved by the caller. Every
// write path in the reconciler evicts what it may have changed before the
// write is issued.

use std::hash::Hash;
use std::time::{Duration, Instant};

use indexmap::{Equivalent, IndexMap};

use crate::model::{GroupId, HostId, RegisteredHost, TemplateId};

/// Bounds applied to every keyspace of an [`IdentityCache`].
///
/// The default is unbounded with no expiry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CachePolicy {
    /// Maximum entries per keyspace; the oldest entry is evicted first.
    pub capacity: Option<usize>,
    /// Entries older than this are treated as misses.
    pub ttl: Option<Duration>,
}

impl CachePolicy {
    pub fn unbounded() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// One keyspace. Insertion order doubles as age order.
#[derive(Debug, Clone)]
struct Keyspace<K, V> {
    entries: IndexMap<K, Entry<V>>,
}

impl<K: Hash + Eq, V> Keyspace<K, V> {
    fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    fn get<Q>(&mut self, key: &Q, policy: &CachePolicy) -> Option<&V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        let expired = match (self.entries.get(key), policy.ttl) {
            (Some(entry), Some(ttl)) => entry.stored_at.elapsed() >= ttl,
            (Some(_), None) => false,
            (None, _) => return None,
        };
        if expired {
            self.entries.shift_remove(key);
            return None;
        }
        self.entries.get(key).map(|entry| &entry.value)
    }

    fn insert(&mut self, key: K, value: V, policy: &CachePolicy) {
        // Re-inserting refreshes the entry's age.
        self.entries.shift_remove(&key);
        if let Some(cap) = policy.capacity {
            if cap == 0 {
                return;
            }
            while self.entries.len() >= cap {
                self.entries.shift_remove_index(0);
            }
        }
        self.entries.insert(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.entries.shift_remove(key).map(|entry| entry.value)
    }
}

/// Instance identity → host id → host record, plus group and template
/// name → id.
#[derive(Debug, Clone)]
pub struct IdentityCache {
    policy: CachePolicy,
    host_ids: Keyspace<String, HostId>,
    hosts: Keyspace<HostId, RegisteredHost>,
    group_ids: Keyspace<String, GroupId>,
    template_ids: Keyspace<String, TemplateId>,
}

impl Default for IdentityCache {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}

impl IdentityCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            host_ids: Keyspace::new(),
            hosts: Keyspace::new(),
            group_ids: Keyspace::new(),
            template_ids: Keyspace::new(),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    // ── Hosts ────────────────────────────────────────────────────────

    pub fn lookup_host_id(&mut self, identity: &str) -> Option<HostId> {
        self.host_ids.get(identity, &self.policy).cloned()
    }

    /// Full record for `identity`, if both the id mapping and the record
    /// are cached.
    pub fn lookup_host(&mut self, identity: &str) -> Option<RegisteredHost> {
        let hostid = self.lookup_host_id(identity)?;
        self.hosts.get(&hostid, &self.policy).cloned()
    }

    pub fn store_host_id(&mut self, identity: impl Into<String>, hostid: HostId) {
        self.host_ids.insert(identity.into(), hostid, &self.policy);
    }

    /// Cache a full record and the identity mapping that leads to it.
    pub fn store_host(&mut self, host: RegisteredHost) {
        self.host_ids
            .insert(host.host.host.clone(), host.hostid.clone(), &self.policy);
        self.hosts.insert(host.hostid.clone(), host, &self.policy);
    }

    /// Drop the cached record for `hostid`. The identity mapping survives.
    pub fn invalidate_host(&mut self, hostid: &HostId) {
        self.hosts.remove(hostid);
    }

    /// Drop both the identity mapping and the record behind it.
    pub fn forget_host(&mut self, identity: &str) {
        if let Some(hostid) = self.host_ids.remove(identity) {
            self.hosts.remove(&hostid);
        }
    }

    // ── Groups & templates ───────────────────────────────────────────

    pub fn lookup_group(&mut self, name: &str) -> Option<GroupId> {
        self.group_ids.get(name, &self.policy).cloned()
    }

    pub fn store_group(&mut self, name: impl Into<String>, id: GroupId) {
        self.group_ids.insert(name.into(), id, &self.policy);
    }

    pub fn lookup_template(&mut self, name: &str) -> Option<TemplateId> {
        self.template_ids.get(name, &self.policy).cloned()
    }

    pub fn store_template(&mut self, name: impl Into<String>, id: TemplateId) {
        self.template_ids.insert(name.into(), id, &self.policy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HostStatus, TargetHost};
    use std::collections::BTreeMap;

    fn record(identity: &str, hostid: &str) -> RegisteredHost {
        RegisteredHost {
            hostid: HostId::from(hostid),
            host: TargetHost {
                host: identity.into(),
                name: identity.into(),
                status: HostStatus::Enabled,
                description: None,
                interfaces: Vec::new(),
                inventory: BTreeMap::new(),
                groups: Vec::new(),
                templates: Vec::new(),
                macros: IndexMap::new(),
            },
        }
    }

    #[test]
    fn store_and_lookup_host() {
        let mut cache = IdentityCache::default();
        cache.store_host(record("i-1", "10"));
        assert_eq!(cache.lookup_host_id("i-1"), Some(HostId::from("10")));
        assert_eq!(
            cache.lookup_host("i-1").map(|h| h.hostid),
            Some(HostId::from("10"))
        );
        assert_eq!(cache.lookup_host("i-2"), None);
    }

    #[test]
    fn invalidate_keeps_identity_mapping() {
        let mut cache = IdentityCache::default();
        cache.store_host(record("i-1", "10"));
        cache.invalidate_host(&HostId::from("10"));
        assert_eq!(cache.lookup_host("i-1"), None);
        assert_eq!(cache.lookup_host_id("i-1"), Some(HostId::from("10")));
    }

    #[test]
    fn forget_drops_everything_for_identity() {
        let mut cache = IdentityCache::default();
        cache.store_host(record("i-1", "10"));
        cache.forget_host("i-1");
        assert_eq!(cache.lookup_host_id("i-1"), None);
        assert_eq!(cache.lookup_host("i-1"), None);
    }

    #[test]
    fn capacity_evicts_oldest_first() {
        let mut cache = IdentityCache::new(CachePolicy {
            capacity: Some(2),
            ttl: None,
        });
        cache.store_group("a", GroupId::from("1"));
        cache.store_group("b", GroupId::from("2"));
        cache.store_group("c", GroupId::from("3"));
        assert_eq!(cache.lookup_group("a"), None);
        assert_eq!(cache.lookup_group("b"), Some(GroupId::from("2")));
        assert_eq!(cache.lookup_group("c"), Some(GroupId::from("3")));
    }

    #[test]
    fn zero_ttl_expires_immediately() {
        let mut cache = IdentityCache::new(CachePolicy {
            capacity: None,
            ttl: Some(Duration::ZERO),
        });
        cache.store_template("Linux", TemplateId::from("100"));
        assert_eq!(cache.lookup_template("Linux"), None);
    }

    #[test]
    fn default_policy_is_unbounded() {
        let mut cache = IdentityCache::default();
        for i in 0..1000 {
            cache.store_group(format!("g{i}"), GroupId::from(i.to_string()));
        }
        assert_eq!(cache.lookup_group("g0"), Some(GroupId::from("0")));
        assert_eq!(cache.policy(), CachePolicy::unbounded());
    }
}
