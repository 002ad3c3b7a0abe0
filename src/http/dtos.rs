use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize, ToSchema)]
pub struct CountResponse {
    pub count: i64,
}

/// Target of a remediation request: which URL to remove from which record.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RemoveLinkRequest {
    pub content_id: i64,
    pub url: String,
}

#[derive(Serialize, ToSchema)]
pub struct RemoveLinkResponse {
    pub removed: bool,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuditRunResponse {
    pub broken_links: u64,
    pub urls_checked: u64,
    pub records_scanned: u64,
}
