/// Security headers for every response
///
/// The API only serves JSON, so the content policy forbids everything and
/// no page may frame it. HSTS is sent only when running in production.
///
/// | Header | Value |
/// |--------|-------|
/// | `X-Content-Type-Options` | `nosniff` |
/// | `X-Frame-Options` | `DENY` |
/// | `Referrer-Policy` | `no-referrer` |
/// | `Permissions-Policy` | every listed feature disabled |
/// | `Content-Security-Policy` | `default-src 'none'; frame-ancestors 'none'` |
/// | `Strict-Transport-Security` | production only |
///
/// # Example
///
/// ```no_run
/// use axum::Router;
/// use askboard_api::middleware::security::SecurityHeadersLayer;
///
/// let app: Router = Router::new().layer(SecurityHeadersLayer::new(true));
/// ```

use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderName, HeaderValue},
    response::Response,
};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use tower::{Layer, Service};

const CONTENT_SECURITY_POLICY: &str = "default-src 'none'; frame-ancestors 'none'";
const PERMISSIONS_POLICY: &str = "camera=(), geolocation=(), microphone=(), payment=(), usb=()";
const HSTS: &str = "max-age=31536000; includeSubDomains";

/// Layer adding security headers to responses
#[derive(Debug, Clone, Copy)]
pub struct SecurityHeadersLayer {
    enable_hsts: bool,
}

impl SecurityHeadersLayer {
    /// `enable_hsts` should only be set behind HTTPS
    pub fn new(enable_hsts: bool) -> Self {
        Self { enable_hsts }
    }
}

impl<S> Layer<S> for SecurityHeadersLayer {
    type Service = SecurityHeaders<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SecurityHeaders {
            inner,
            enable_hsts: self.enable_hsts,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SecurityHeaders<S> {
    inner: S,
    enable_hsts: bool,
}

fn apply(headers: &mut HeaderMap, enable_hsts: bool) {
    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(header::REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(PERMISSIONS_POLICY),
    );
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CONTENT_SECURITY_POLICY),
    );

    if enable_hsts {
        headers.insert(header::STRICT_TRANSPORT_SECURITY, HeaderValue::from_static(HSTS));
    }
}

impl<S> Service<Request> for SecurityHeaders<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let future = self.inner.call(request);
        let enable_hsts = self.enable_hsts;

        Box::pin(async move {
            let mut response = future.await?;
            apply(response.headers_mut(), enable_hsts);
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http, http::StatusCode, routing::get, Router};
    use tower::ServiceExt;

    async fn fetch(enable_hsts: bool, uri: &str) -> Response {
        Router::new()
            .route("/ok", get(|| async { "ok" }))
            .layer(SecurityHeadersLayer::new(enable_hsts))
            .oneshot(http::Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_headers_applied() {
        let response = fetch(false, "/ok").await;
        let headers = response.headers();

        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["x-frame-options"], "DENY");
        assert_eq!(headers["referrer-policy"], "no-referrer");
        assert_eq!(headers["permissions-policy"], PERMISSIONS_POLICY);
        assert_eq!(headers["content-security-policy"], CONTENT_SECURITY_POLICY);
        assert!(headers.get("strict-transport-security").is_none());
    }

    #[tokio::test]
    async fn test_hsts_in_production() {
        let response = fetch(true, "/ok").await;
        assert_eq!(response.headers()["strict-transport-security"], HSTS);
    }

    #[tokio::test]
    async fn test_headers_on_fallback_404() {
        let response = fetch(false, "/missing").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["x-frame-options"], "DENY");
    }
}
