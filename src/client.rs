use std::future::Future;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::api::{ApiErrorBody, Page};
use crate::config::Config;
use crate::error::{AppError, Result};

/// Shown when the server gives us a non-2xx without a usable `error` field.
pub const GENERIC_API_ERROR: &str = "Erro ao comunicar com o servidor. Tente novamente.";

/// Typed client for the CT Supera REST API.
///
/// Thin on purpose: each endpoint module (`users`, `turmas`, `financeiro`,
/// ...) builds its own paths and bodies and funnels them through the helpers
/// here, which own auth-header injection and error mapping.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

/// Some list endpoints answer a DRF page envelope, others a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListOrPage<T> {
    Page(Page<T>),
    List(Vec<T>),
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    pub async fn set_token(&self, token: String) {
        *self.token.write().await = Some(token);
    }

    pub async fn clear_token(&self) {
        *self.token.write().await = None;
    }

    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Builds `?a=1&b=2`, percent-encoding values. Empty pairs are skipped so
    /// callers can pass optional filters directly.
    pub fn query(pairs: &[(&str, &str)]) -> String {
        let encoded: Vec<String> = pairs
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect();
        if encoded.is_empty() {
            String::new()
        } else {
            format!("?{}", encoded.join("&"))
        }
    }

    async fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.token.read().await.as_deref() {
            Some(token) => builder.header("Authorization", format!("Token {}", token)),
            None => builder,
        }
    }

    async fn read_json<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json::<T>().await?)
        } else {
            Err(self.api_error(status, response).await)
        }
    }

    async fn api_error(&self, status: StatusCode, response: Response) -> AppError {
        let message = match response.json::<ApiErrorBody>().await {
            Ok(ApiErrorBody { error: Some(msg) }) if !msg.trim().is_empty() => msg,
            _ => GENERIC_API_ERROR.to_string(),
        };
        tracing::warn!("API returned {}: {}", status, message);
        AppError::Api { status: status.as_u16(), message }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_json_abs(&self.url(path)).await
    }

    /// GET an absolute URL. Needed for DRF `next` cursors, which come back
    /// absolute.
    pub async fn get_json_abs<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let builder = self.authorize(self.client.get(url)).await;
        let response = builder.send().await?;
        self.read_json(response).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let builder = self.authorize(self.client.post(self.url(path)).json(body)).await;
        let response = builder.send().await?;
        self.read_json(response).await
    }

    /// POST with no body (e.g. `dar-baixa`, `reenviar-convite`).
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let builder = self.authorize(self.client.post(self.url(path))).await;
        let response = builder.send().await?;
        self.read_json(response).await
    }

    pub async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let builder = self.authorize(self.client.put(self.url(path)).json(body)).await;
        let response = builder.send().await?;
        self.read_json(response).await
    }

    pub async fn patch_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let builder = self.authorize(self.client.patch(self.url(path)).json(body)).await;
        let response = builder.send().await?;
        self.read_json(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let builder = self.authorize(self.client.delete(self.url(path))).await;
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.api_error(status, response).await)
        }
    }

    /// GET a list endpoint that may answer either a page envelope or a bare
    /// array. Only the first page is returned; use [`ApiClient::get_all_pages`]
    /// when the whole collection is needed.
    pub async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        match self.get_json::<ListOrPage<T>>(path).await? {
            ListOrPage::Page(page) => Ok(page.results),
            ListOrPage::List(items) => Ok(items),
        }
    }

    /// GET a paginated endpoint and follow `next` cursors until exhausted.
    pub async fn get_all_pages<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let first = self.get_json::<Page<T>>(path).await?;
        follow_pages(first, |next| async move {
            self.get_json_abs::<Page<T>>(&next).await
        })
        .await
    }
}

/// Concatenates `results` across pages, following `next` until it is null.
async fn follow_pages<T, F, Fut>(first: Page<T>, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut results = first.results;
    let mut next = first.next;
    while let Some(url) = next.take() {
        let page = fetch(url).await?;
        results.extend(page.results);
        next = page.next;
    }
    Ok(results)
}


#[cfg(test)]
mod tests {
    use super::*;

    fn page(results: Vec<i64>, next: Option<&str>) -> Page<i64> {
        Page {
            count: None,
            next: next.map(String::from),
            previous: None,
            results,
        }
    }

    #[tokio::test]
    async fn follow_pages_concatenates_in_order_and_stops() {
        let first = page(vec![1, 2], Some("http://api/x/?page=2"));
        let fetched = std::cell::RefCell::new(Vec::new());
        let all = follow_pages(first, |url| {
            fetched.borrow_mut().push(url.clone());
            let out = if url.ends_with("page=2") {
                page(vec![3], Some("http://api/x/?page=3"))
            } else {
                page(vec![4, 5], None)
            };
            async move { Ok(out) }
        })
        .await
        .unwrap();
        assert_eq!(all, vec![1, 2, 3, 4, 5]);
        assert_eq!(fetched.borrow().len(), 2);
    }

    #[tokio::test]
    async fn follow_pages_single_page() {
        let called = std::cell::Cell::new(false);
        let all = follow_pages(page(vec![9], None), |_| {
            called.set(true);
            async { Ok(page(vec![], None)) }
        })
        .await
        .unwrap();
        assert_eq!(all, vec![9]);
        assert!(!called.get(), "no cursor to follow on a single page");
    }

    #[test]
    fn query_encodes_and_skips_empty() {
        assert_eq!(ApiClient::query(&[]), "");
        assert_eq!(ApiClient::query(&[("tipo", "aluno")]), "?tipo=aluno");
        assert_eq!(
            ApiClient::query(&[("nome", "João Silva"), ("ct", "")]),
            "?nome=Jo%C3%A3o%20Silva"
        );
    }

    #[test]
    fn url_joins_without_duplicate_slash() {
        let client = ApiClient::new(&Config::with_base_url("http://api.local/")).unwrap();
        assert_eq!(client.url("usuarios/precadastros/"), "http://api.local/usuarios/precadastros/");
        assert_eq!(client.url("/turmas/"), "http://api.local/turmas/");
    }

    #[test]
    fn list_or_page_accepts_both_shapes() {
        let bare: ListOrPage<i64> = serde_json::from_str("[1,2]").unwrap();
        assert!(matches!(bare, ListOrPage::List(ref v) if v == &vec![1, 2]));
        let paged: ListOrPage<i64> =
            serde_json::from_str(r#"{"count":2,"next":null,"previous":null,"results":[1,2]}"#)
                .unwrap();
        assert!(matches!(paged, ListOrPage::Page(ref p) if p.results == vec![1, 2]));
    }
}
