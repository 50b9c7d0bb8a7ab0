use crate::api::client::ApiRequest;

pub fn list() -> ApiRequest {
    ApiRequest::get(&["categories"])
}
