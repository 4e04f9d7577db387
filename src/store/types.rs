//! List call options and results

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Entity column a list call can sort on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderField {
    #[default]
    CreateTime,
    LastUpdateTime,
    Name,
    Id,
}

impl OrderField {
    pub(crate) fn column(&self) -> &'static str {
        match self {
            OrderField::CreateTime => "create_time_since_epoch",
            OrderField::LastUpdateTime => "last_update_time_since_epoch",
            OrderField::Name => "name",
            OrderField::Id => "id",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub(crate) fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Options for a paged list call. All filters are ANDed together.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Case-insensitive substring match on the entity name.
    pub query: Option<String>,
    /// Exact match on the external id.
    pub external_id: Option<String>,
    /// Restrict to entities whose `source_id` property is in this set.
    pub source_ids: Option<Vec<String>>,
    /// Filter-DSL expression, parsed per the store's configured mode.
    pub filter_query: Option<String>,
    pub order_by: OrderField,
    pub sort_order: SortOrder,
    /// Requested page size, clamped to the store's configured maximum.
    pub page_size: Option<u32>,
    /// Token returned by the previous page, or `None` for the first page.
    pub page_token: Option<String>,
    /// Kind-specific filters, interpreted by the kind's list hook.
    pub extras: BTreeMap<String, String>,
}

impl ListOptions {
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            filter_query: Some(filter.into()),
            ..Self::default()
        }
    }
}

/// One page of list results.
#[derive(Debug, Clone)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    /// Present when more results exist past this page.
    pub next_page_token: Option<String>,
}
