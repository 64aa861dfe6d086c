// Host user macro endpoints

use tracing::debug;

use crate::client::RpcClient;
use crate::error::Error;
use crate::hosts::first_id;
use crate::models::{HostMacroIds, UserMacroCreate};

impl RpcClient {
    /// `usermacro.create` on a host, returning the new host macro id.
    pub async fn create_user_macro(&self, user_macro: &UserMacroCreate) -> Result<String, Error> {
        debug!(hostid = %user_macro.hostid, name = %user_macro.name, "creating user macro");
        let ids: HostMacroIds = self.call("usermacro.create", user_macro).await?;
        first_id("usermacro.create", ids.hostmacroids)
    }
}
