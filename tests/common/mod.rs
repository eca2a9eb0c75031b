#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use znap::client::ClientError;
use znap::http::{ApiRequest, ApiResponse, Transport};
use znap::{ClientOptions, ZnapClient, ZnapTools};

#[derive(Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<Vec<ApiResponse>>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl MockTransport {
    pub fn new(responses: Vec<ApiResponse>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(vec![ApiResponse::new(StatusCode::OK, body.to_string())])
    }

    pub fn status(status: StatusCode, body: &str) -> Self {
        Self::new(vec![ApiResponse::new(status, body)])
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> ApiRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        self.requests.lock().unwrap().push(request);
        let mut responses = self.responses.lock().unwrap();
        if !responses.is_empty() {
            Ok(responses.remove(0))
        } else {
            Err(ClientError::Config("No more mock responses".to_string()))
        }
    }
}

pub fn authed() -> ClientOptions {
    ClientOptions::new().with_api_key("test-key")
}

pub fn anonymous() -> ClientOptions {
    ClientOptions::new()
}

pub fn client(options: ClientOptions, transport: &MockTransport) -> ZnapClient<MockTransport> {
    ZnapClient::with_transport(options, transport.clone())
}

pub fn tools(options: ClientOptions, transport: &MockTransport) -> ZnapTools<MockTransport> {
    ZnapTools::new(client(options, transport))
}
