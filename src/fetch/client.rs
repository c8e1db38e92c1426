use async_trait::async_trait;
use reqwest::{Request, Response};

/// Seam between the worksheet sources and the HTTP stack, so auth can be
/// layered as decorators and tests can substitute canned responses.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
