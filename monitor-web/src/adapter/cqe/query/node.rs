use crate::common::PageQuery;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeListQuery {
    #[serde(default)]
    pub page_query: PageQuery,
    pub name: Option<String>,
    pub location: Option<String>,
}
