//! Common API utilities and shared types

use serde::Deserialize;

use crate::config::PaginationConfig;
use crate::models::ListParams;
use crate::services::AllowList;

/// Caller-selected response fields, e.g. `?fields=id,title`
#[derive(Debug, Default, Deserialize)]
pub struct FieldsQuery {
    #[serde(default)]
    pub fields: Option<String>,
}

impl FieldsQuery {
    pub fn allow_list(&self) -> AllowList {
        self.fields
            .as_deref()
            .map(AllowList::parse)
            .unwrap_or_else(AllowList::all)
    }
}

/// Pagination and field selection for post listings
#[derive(Debug, Default, Deserialize)]
pub struct ListPostsQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub fields: Option<String>,
}

impl ListPostsQuery {
    /// Page parameters with config defaults and bounds applied
    pub fn list_params(&self, config: &PaginationConfig) -> ListParams {
        ListParams::bounded(
            self.page.unwrap_or(1),
            self.page_size.unwrap_or(config.default_page_size),
            config.max_page_size,
        )
    }

    pub fn allow_list(&self) -> AllowList {
        FieldsQuery {
            fields: self.fields.clone(),
        }
        .allow_list()
    }
}
