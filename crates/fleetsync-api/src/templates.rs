// Template endpoints

use serde_json::json;
use tracing::debug;

use crate::client::RpcClient;
use crate::error::Error;
use crate::hosts::first_id;
use crate::models::{RawTemplate, TemplateCreate, TemplateIds};

impl RpcClient {
    /// `template.get` filtered by exact technical name.
    pub async fn get_templates(&self, host: &str) -> Result<Vec<RawTemplate>, Error> {
        debug!(template = host, "looking up template");
        self.call(
            "template.get",
            &json!({
                "filter": { "host": [host] },
                "output": ["templateid", "host"],
            }),
        )
        .await
    }

    /// `template.create`, returning the new template id.
    pub async fn create_template(&self, template: &TemplateCreate) -> Result<String, Error> {
        debug!(template = %template.host, "creating template");
        let ids: TemplateIds = self.call("template.create", template).await?;
        first_id("template.create", ids.templateids)
    }
}
