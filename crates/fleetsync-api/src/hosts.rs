// Host endpoints
//
// `host.get`, `host.create`, `host.update`, `host.delete`. Hosts are
// looked up by technical name (`host`), which fleetsync sets to the
// instance identity.

use serde_json::json;
use tracing::debug;

use crate::client::RpcClient;
use crate::error::Error;
use crate::models::{HostCreate, HostIdRef, HostIds, HostUpdate, RawHost};

impl RpcClient {
    /// Fetch full host records whose technical name equals `host`.
    ///
    /// `host.get` with groups, linked templates, interfaces, inventory and
    /// macros selected.
    pub async fn get_hosts(&self, host: &str) -> Result<Vec<RawHost>, Error> {
        debug!(host, "looking up host");
        self.call(
            "host.get",
            &json!({
                "filter": { "host": [host] },
                "output": "extend",
                "selectGroups": "extend",
                "selectParentTemplates": ["templateid"],
                "selectInterfaces": "extend",
                "selectInventory": "extend",
                "selectMacros": "extend",
            }),
        )
        .await
    }

    /// Fetch only the ids of hosts whose technical name equals `host`.
    pub async fn get_host_ids(&self, host: &str) -> Result<Vec<HostIdRef>, Error> {
        debug!(host, "looking up host id");
        self.call(
            "host.get",
            &json!({
                "filter": { "host": [host] },
                "output": ["hostid"],
            }),
        )
        .await
    }

    /// `host.create`, returning the new host id.
    pub async fn create_host(&self, host: &HostCreate) -> Result<String, Error> {
        debug!(host = %host.host, "creating host");
        let ids: HostIds = self.call("host.create", host).await?;
        first_id("host.create", ids.hostids)
    }

    /// `host.update`, returning the host id named in the response.
    pub async fn update_host(&self, update: &HostUpdate) -> Result<String, Error> {
        debug!(hostid = %update.hostid, "updating host");
        let ids: HostIds = self.call("host.update", update).await?;
        first_id("host.update", ids.hostids)
    }

    /// `host.delete` for a single host, returning the deleted id.
    pub async fn delete_host(&self, hostid: &str) -> Result<String, Error> {
        debug!(hostid, "deleting host");
        let ids: HostIds = self.call("host.delete", &[hostid]).await?;
        first_id("host.delete", ids.hostids)
    }
}

pub(crate) fn first_id(method: &str, ids: Vec<String>) -> Result<String, Error> {
    ids.into_iter().next().ok_or_else(|| Error::EmptyResult {
        method: method.to_owned(),
    })
}
