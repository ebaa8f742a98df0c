//! src/gateway/supabase.rs
//!
//! Gateway backed by a hosted Supabase project: tables through the PostgREST
//! endpoint (`/rest/v1`) and files through the Storage API (`/storage/v1`).
//! Every call authenticates with the project key in both the `apikey` and
//! `Authorization` headers.

use super::{Gateway, GatewayError, GatewayResult};
use crate::models::{
    publication::{NewPublication, Publication},
    upload::UploadedFile,
    user::{NewUser, UserSummary},
};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, header};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use tracing::debug;
use url::Url;

const USERS_TABLE: &str = "users";
const PUBLICATIONS_TABLE: &str = "publications";
const OBJECT_CACHE_CONTROL: &str = "max-age=3600";
/// PostgREST SQLSTATE for unique violations.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct SupabaseGateway {
    http: Client,
    base_url: Url,
    api_key: String,
    bucket: String,
}

impl fmt::Debug for SupabaseGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseGateway")
            .field("base_url", &self.base_url.as_str())
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

impl SupabaseGateway {
    /// Build a client for the project at `base_url`, storing files in `bucket`.
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> GatewayResult<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|err| GatewayError::InvalidUrl(format!("{}: {}", base_url, err)))?;
        if parsed.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            http: Client::new(),
            base_url: parsed,
            api_key: api_key.into(),
            bucket: bucket.into(),
        })
    }

    /// Append percent-encoded path segments to the project URL.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> GatewayResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn table_url(&self, table: &str) -> GatewayResult<Url> {
        self.endpoint(["rest", "v1", table])
    }

    /// `object/{bucket}/{path}` or, with `public`, `object/public/{bucket}/{path}`.
    /// Slashes in `path` stay separators; everything else is encoded.
    fn object_url(&self, path: &str, public: bool) -> GatewayResult<Url> {
        let prefix: &[&str] = if public {
            &["storage", "v1", "object", "public"]
        } else {
            &["storage", "v1", "object"]
        };
        self.endpoint(
            prefix
                .iter()
                .copied()
                .chain(std::iter::once(self.bucket.as_str()))
                .chain(path.split('/')),
        )
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("gateway {} {}", method, url.path());
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

#[async_trait]
impl Gateway for SupabaseGateway {
    async fn insert_user(&self, user: &NewUser) -> GatewayResult<()> {
        let resp = self
            .request(Method::POST, self.table_url(USERS_TABLE)?)
            .header("Prefer", "return=minimal")
            .json(&[user])
            .send()
            .await?;
        ensure_success(resp).await?;
        Ok(())
    }

    async fn find_users(
        &self,
        username: &str,
        password: &str,
    ) -> GatewayResult<Vec<UserSummary>> {
        let username_filter = format!("eq.{}", username);
        let password_filter = format!("eq.{}", password);
        let resp = self
            .request(Method::GET, self.table_url(USERS_TABLE)?)
            .query(&[
                ("select", "id,username"),
                ("username", username_filter.as_str()),
                ("password", password_filter.as_str()),
            ])
            .send()
            .await?;
        decode(ensure_success(resp).await?).await
    }

    async fn upload_object(&self, path: &str, file: &UploadedFile) -> GatewayResult<()> {
        let resp = self
            .request(Method::POST, self.object_url(path, false)?)
            .header(header::CONTENT_TYPE, file.content_type_or_default())
            .header(header::CACHE_CONTROL, OBJECT_CACHE_CONTROL)
            .header("x-upsert", "false")
            .body(file.content.clone())
            .send()
            .await?;
        ensure_success(resp).await?;
        Ok(())
    }

    fn public_url(&self, path: &str) -> GatewayResult<String> {
        Ok(self.object_url(path, true)?.into())
    }

    async fn remove_object(&self, path: &str) -> GatewayResult<()> {
        let resp = self
            .request(Method::DELETE, self.object_url(path, false)?)
            .send()
            .await?;
        ensure_success(resp).await?;
        Ok(())
    }

    async fn insert_publication(
        &self,
        publication: &NewPublication,
    ) -> GatewayResult<Vec<Publication>> {
        let resp = self
            .request(Method::POST, self.table_url(PUBLICATIONS_TABLE)?)
            .header("Prefer", "return=representation")
            .json(&[publication])
            .send()
            .await?;
        let committed = ensure_success(resp).await?;
        decode(committed)
            .await
            .map_err(|err| GatewayError::UnreadableAnswer(err.to_string()))
    }

    async fn list_publications(&self) -> GatewayResult<Vec<Publication>> {
        let resp = self
            .request(Method::GET, self.table_url(PUBLICATIONS_TABLE)?)
            .query(&[("select", "*,users(username)"), ("order", "created_at.desc")])
            .send()
            .await?;
        decode(ensure_success(resp).await?).await
    }

    async fn ping(&self) -> GatewayResult<()> {
        let resp = self
            .request(Method::GET, self.table_url(PUBLICATIONS_TABLE)?)
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await?;
        ensure_success(resp).await?;
        Ok(())
    }
}

/// Error payload shared by PostgREST (`code`, `message`) and the Storage API
/// (`statusCode`, `error`, `message`).
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
    code: Option<String>,
    #[serde(rename = "statusCode")]
    status_code: Option<Value>,
}

async fn ensure_success(resp: Response) -> GatewayResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await?;
    Err(error_from_body(status.as_u16(), &body))
}

async fn decode<T: serde::de::DeserializeOwned>(resp: Response) -> GatewayResult<T> {
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Map a non-success response onto [`GatewayError`], keeping the gateway's
/// own message text.
fn error_from_body(status: u16, body: &str) -> GatewayError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    // the Storage API reports its own status in the body, as a string
    let body_status = parsed.status_code.as_ref().and_then(|value| match value {
        Value::String(s) => s.parse::<u16>().ok(),
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        _ => None,
    });

    let message = parsed.message.or(parsed.error).unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            format!("gateway responded with status {}", status)
        } else {
            trimmed.to_string()
        }
    });

    if status == 409 || body_status == Some(409) || parsed.code.as_deref() == Some(UNIQUE_VIOLATION)
    {
        GatewayError::Conflict(message)
    } else {
        GatewayError::Api { status, message }
    }
}
