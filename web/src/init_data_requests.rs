
use std::sync::Arc;

use anyhow::Result;
use cores::VerificationVerdict;
use lambda_http::Error;
use lambda_http::{Body, Request, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::runtime_context::RuntimeContext;

// https://core.telegram.org/bots/webapps#initializing-mini-apps
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct VerifyRequestBody {
    #[serde(default)]
    init_data: Option<String>,
}

// Authorization: tma <initData>
const AUTHORIZATION_SCHEME: &str = "tma ";

pub struct InitDataRequestHandler {
    runtime_context: Arc<RuntimeContext>,
}

impl InitDataRequestHandler {
    pub fn new(runtime_context: &Arc<RuntimeContext>) -> Arc<Self> {
        let runtime_context = Arc::clone(runtime_context);
        let handler = Self {
            runtime_context,
        };
        Arc::new(handler)
    }

    pub async fn handle_verify_request(&self, event: Request) -> Result<Response<Body>, Error> {
        let verification_result = self.verify_request(&event);
        match verification_result {
            Ok(verdict) => {
                if verdict.valid {
                    info!("/api/telegram/verify verified by {:?}", verdict.method);
                } else {
                    info!("/api/telegram/verify rejected {:?}", verdict.error);
                }
                self.verdict_response(&verdict)
            },
            Err(error) => {
                tracing::info!("/api/telegram/verify error {:?}", error);
                self.internal_server_error_response()
            }
        }
    }

    fn verify_request(&self, event: &Request) -> Result<VerificationVerdict> {
        let init_data = self.extract_init_data(event)?;
        let verdict = self.runtime_context.verifier().verify_now(&init_data);
        Ok(verdict)
    }

    // JSON body first, the Authorization header only when the body is empty
    fn extract_init_data(&self, event: &Request) -> Result<String> {
        let body_text = match event.body() {
            Body::Empty => "",
            Body::Text(text) => text.as_str(),
            Body::Binary(bytes) => std::str::from_utf8(bytes)?,
        };
        let body_text = body_text.trim();
        if !body_text.is_empty() {
            let body: VerifyRequestBody = serde_json::from_str(body_text)?;
            return Ok(body.init_data.unwrap_or_default());
        }
        let init_data = event.headers()
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix(AUTHORIZATION_SCHEME))
            .unwrap_or_default();
        Ok(init_data.to_string())
    }

    fn verdict_response(&self, verdict: &VerificationVerdict) -> Result<Response<Body>, Error> {
        let status = if verdict.valid { 200 } else { 401 };
        let body = serde_json::to_string(verdict)?;
        let response = Response::builder()
            .status(status)
            .header("content-type", "application/json")
            .body(body.into())
            .map_err(Box::new)?;
        Ok(response)
    }

    fn internal_server_error_response(&self) -> Result<Response<Body>, Error> {
        let body = json!({
            "valid": false,
            "error": "internal server error",
        });
        let response = Response::builder()
            .status(500)
            .header("content-type", "application/json")
            .body(body.to_string().into())
            .map_err(Box::new)?;
        Ok(response)
    }
}
