// Host group endpoints

use serde_json::json;
use tracing::debug;

use crate::client::RpcClient;
use crate::error::Error;
use crate::hosts::first_id;
use crate::models::{GroupIds, RawGroup};

impl RpcClient {
    /// `hostgroup.get` filtered by exact name.
    pub async fn get_groups(&self, name: &str) -> Result<Vec<RawGroup>, Error> {
        debug!(name, "looking up host group");
        self.call(
            "hostgroup.get",
            &json!({
                "filter": { "name": [name] },
                "output": ["groupid", "name"],
            }),
        )
        .await
    }

    /// `hostgroup.create`, returning the new group id.
    pub async fn create_group(&self, name: &str) -> Result<String, Error> {
        debug!(name, "creating host group");
        let ids: GroupIds = self.call("hostgroup.create", &json!({ "name": name })).await?;
        first_id("hostgroup.create", ids.groupids)
    }
}
