use serde::Deserialize;

use crate::config::{self, ApiConfig};
use crate::database::Page;

/// `?limit=&offset=` on list endpoints
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> Page {
        self.page_with(&config::config().api)
    }

    /// Default and clamp the limit against the API settings
    fn page_with(&self, api: &ApiConfig) -> Page {
        let limit = self.limit.unwrap_or(api.default_page_size).clamp(1, api.max_page_size);
        Page::new(limit, self.offset.unwrap_or(0))
    }
}
