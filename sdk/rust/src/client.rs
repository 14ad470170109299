use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The relay answered with a non-success status and an `{error}` body.
    #[error("Relay returned {status}: {message}")]
    Api { status: StatusCode, message: String },
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSummary {
    pub number: String,
    pub hash: String,
    pub parent_hash: String,
    pub nonce: String,
    pub gas_used: String,
    pub timestamp: String,
    pub transactions: Vec<TransactionSummary>,
    pub accounts: Vec<AccountBalance>,
    pub total_blocks: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub hash: String,
    pub from: String,
    pub to: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub address: String,
    pub balance: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from: String,
    pub to: String,
    pub amount: String,
    pub currency: String,
}

#[derive(Deserialize)]
struct OtpBody {
    otp: String,
}

#[derive(Deserialize)]
struct MessageBody {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TotalBlocksBody {
    total_blocks: u64,
}

pub struct RelayClient {
    client: Client,
    base_url: String,
    session_id: Option<String>,
}

impl RelayClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session_id: None,
        }
    }

    /// Session sent as `x-session-id` on workflow calls, set by [`login`](Self::login).
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Generate a fresh OTP.
    pub async fn generate_otp(&self) -> Result<String, ClientError> {
        let resp = self.get("/otp").send().await?;
        Ok(decode::<OtpBody>(resp).await?.otp)
    }

    /// Validate `otp`. A wrong OTP is `Ok(false)`; faults are errors.
    pub async fn validate_otp(&self, otp: &str) -> Result<bool, ClientError> {
        let resp = self
            .post("/validate-otp")
            .json(&json!({ "otp": otp }))
            .send()
            .await?;
        match decode::<MessageBody>(resp).await {
            Ok(_) => Ok(true),
            Err(ClientError::Api { status, .. }) if status == StatusCode::BAD_REQUEST => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn latest_block(&self) -> Result<BlockSummary, ClientError> {
        decode(self.get("/latest-block").send().await?).await
    }

    pub async fn total_blocks(&self) -> Result<u64, ClientError> {
        let resp = self.get("/total-blocks").send().await?;
        Ok(decode::<TotalBlocksBody>(resp).await?.total_blocks)
    }

    /// Block details view-model, untyped.
    pub async fn block_details(&self) -> Result<Value, ClientError> {
        decode(self.get("/block-details").send().await?).await
    }

    /// Log in and keep the returned session for later calls.
    pub async fn login(&mut self, login_id: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let resp = self
            .post("/login")
            .json(&json!({ "loginId": login_id, "password": password }))
            .send()
            .await?;
        let login: LoginResponse = decode(resp).await?;
        self.session_id = Some(login.session_id.clone());
        Ok(login)
    }

    /// Announce a transfer; returns the relay's confirmation message.
    pub async fn transfer(&self, request: &TransferRequest) -> Result<String, ClientError> {
        let resp = self.post("/transfer").json(request).send().await?;
        Ok(decode::<MessageBody>(resp).await?.message)
    }

    pub async fn logout(&mut self) -> Result<(), ClientError> {
        let resp = self.post("/logout").send().await?;
        self.session_id = None;
        resp.error_for_status()?;
        Ok(())
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.with_headers(self.client.get(format!("{}{}", self.base_url, path)))
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.with_headers(self.client.post(format!("{}{}", self.base_url, path)))
    }

    fn with_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.session_id {
            Some(id) => builder.header("x-session-id", id),
            None => builder,
        }
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }

    let text = resp.text().await?;
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(text);
    Err(ClientError::Api { status, message })
}
