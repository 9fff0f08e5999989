//! Response envelopes shared by every JSON endpoint.

use phimdex_core::search::AssembledPage;
use phimdex_model::MovieRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieListData {
    pub items: Vec<MovieRecord>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub total_items: usize,
    pub total_items_per_page: usize,
    pub current_page: usize,
    pub total_pages: usize,
}

impl From<&AssembledPage> for PaginationInfo {
    fn from(page: &AssembledPage) -> Self {
        Self {
            total_items: page.total_items,
            total_items_per_page: page.per_page,
            current_page: page.current_page,
            total_pages: page.total_pages,
        }
    }
}

impl From<&AssembledPage> for MovieListData {
    fn from(page: &AssembledPage) -> Self {
        Self {
            items: page.items.clone(),
            pagination: PaginationInfo::from(page),
        }
    }
}
