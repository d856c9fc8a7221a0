//! Typed calls for each API endpoint

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    error::ApiResult,
    gateway::{ApiGateway, ApiRequest, UploadFile},
    models::{
        ContactSubmission, DashboardStats, LoginRequest, TokenResponse, UploadFolder,
        UploadResponse,
    },
    repositories::{Creatable, Resource},
};

pub const LOGIN_PATH: &str = "/admin/login";
pub const STATS_PATH: &str = "/admin/stats";
pub const CONTACT_PATH: &str = "/contact";
pub const UPLOAD_PATH: &str = "/admin/upload";

fn decode<T: DeserializeOwned>(value: Value) -> ApiResult<T> {
    Ok(serde_json::from_value(value)?)
}

fn encode<T: Serialize>(value: &T) -> ApiResult<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Exchange credentials for an access token
pub async fn admin_login(gateway: &dyn ApiGateway, credentials: &LoginRequest) -> ApiResult<TokenResponse> {
    decode(gateway.send(ApiRequest::post(LOGIN_PATH, encode(credentials)?)).await?)
}

pub async fn fetch_stats(gateway: &dyn ApiGateway) -> ApiResult<DashboardStats> {
    decode(gateway.send(ApiRequest::get(STATS_PATH)).await?)
}

/// Submit the public contact form; returns the server acknowledgement
pub async fn submit_contact(gateway: &dyn ApiGateway, submission: &ContactSubmission) -> ApiResult<Value> {
    gateway.send(ApiRequest::post(CONTACT_PATH, encode(submission)?)).await
}

pub async fn upload_image(gateway: &dyn ApiGateway, file: UploadFile, folder: UploadFolder) -> ApiResult<UploadResponse> {
    decode(
        gateway
            .send(ApiRequest::upload(UPLOAD_PATH, file, folder.as_str()))
            .await?,
    )
}

pub async fn list<T: Resource>(gateway: &dyn ApiGateway) -> ApiResult<Vec<T>> {
    decode(gateway.send(ApiRequest::get(T::KIND.list_path)).await?)
}

pub async fn create<T: Creatable>(gateway: &dyn ApiGateway, payload: &T::Create) -> ApiResult<T> {
    decode(
        gateway
            .send(ApiRequest::post(T::KIND.admin_path, encode(payload)?))
            .await?,
    )
}

pub async fn update<T: Resource>(gateway: &dyn ApiGateway, id: &str, payload: &T::Update) -> ApiResult<T> {
    decode(
        gateway
            .send(ApiRequest::put(T::KIND.item_path(id), encode(payload)?))
            .await?,
    )
}

pub async fn delete<T: Resource>(gateway: &dyn ApiGateway, id: &str) -> ApiResult<()> {
    gateway.send(ApiRequest::delete(T::KIND.item_path(id))).await?;
    Ok(())
}
