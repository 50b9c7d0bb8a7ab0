//! Bearer-protected admin dashboard endpoints.

use crate::api::client::ApiRequest;

pub fn dashboard_stats() -> ApiRequest {
    ApiRequest::get(&["admin", "dashboard-stats"])
}

pub fn recent_activities() -> ApiRequest {
    ApiRequest::get(&["admin", "recent-activities"])
}
