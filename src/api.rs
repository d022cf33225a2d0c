// API gateway module: contains a small blocking HTTP client that talks to
// the wallet service. It is intentionally small and synchronous: one
// network round trip per call, no retries, no timeout tuning beyond the
// reqwest defaults.
//
// Every response body is expected to be the service's standard envelope
// `{"success": bool, "message": ..., "data": ...}`. The envelope is
// decoded once here, into a typed struct per endpoint, so the session
// layer never touches raw JSON maps.

use crate::error::Error;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Base URL used when `DOMPET_API_URL` is not set in the environment.
pub const DEFAULT_BASE_URL: &str = "https://api.dana.id";

/// Fixed client identifier sent as the User-Agent on every request.
const CLIENT_IDENT: &str = "Dompet/1.0.0";

/// Blocking HTTP client holding the base URL of the wallet service.
/// Bearer tokens are passed per call rather than stored here; the
/// session controller owns the credentials.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

/// The service's uniform response envelope. Extra fields the server may
/// add are ignored.
#[derive(Deserialize, Debug)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

#[derive(Serialize, Debug)]
struct OtpRequest<'a> {
    phone: &'a str,
}

#[derive(Serialize, Debug)]
struct VerifyOtpRequest<'a> {
    otp: &'a str,
    otp_token: &'a str,
}

/// Payload of a successful OTP request: the transient token used to
/// correlate the verification call with this challenge.
#[derive(Deserialize, Debug)]
pub struct OtpChallenge {
    pub otp_token: String,
}

/// Payload of a successful OTP verification. The service is supposed to
/// always send both tokens; both are defaulted so a missing field
/// degrades to an empty string instead of a decode error.
#[derive(Deserialize, Debug)]
pub struct IssuedTokens {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

/// Payload of the balance endpoint. `balance` stays optional: a
/// `success: true` body without the field is reported as a failure by
/// the caller, never as a crash.
#[derive(Deserialize, Debug)]
pub struct BalanceSheet {
    #[serde(default)]
    pub balance: Option<i64>,
}

/// A single voucher as listed by the service. Missing fields default to
/// empty strings.
#[derive(Deserialize, Debug, Clone)]
pub struct Voucher {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub expiry_date: String,
}

#[derive(Deserialize, Debug)]
pub struct VoucherList {
    #[serde(default)]
    pub vouchers: Vec<Voucher>,
}

impl ApiClient {
    /// Create an ApiClient configured from the environment variable
    /// `DOMPET_API_URL`, falling back to the production base URL.
    pub fn from_env() -> Result<Self, Error> {
        let base_url =
            std::env::var("DOMPET_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        Self::with_base_url(base_url)
    }

    /// Create an ApiClient against an explicit base URL (used by tests
    /// to point at a mock server).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, Error> {
        let client = Client::builder().build()?;
        Ok(ApiClient {
            client,
            base_url: base_url.into(),
        })
    }

    /// Ask the service to send an OTP to the given (already normalized)
    /// phone number.
    pub fn request_otp(&self, phone: &str) -> Result<OtpChallenge, Error> {
        self.post("/v1/login", &OtpRequest { phone }, None)
    }

    /// Exchange an OTP code plus its challenge token for session tokens.
    pub fn verify_otp(&self, otp: &str, otp_token: &str) -> Result<IssuedTokens, Error> {
        self.post("/v1/verify-otp", &VerifyOtpRequest { otp, otp_token }, None)
    }

    /// Fetch the account balance. Requires a bearer token.
    pub fn balance(&self, token: &str) -> Result<BalanceSheet, Error> {
        self.get("/v1/check-balance", Some(token))
    }

    /// Fetch the voucher list. Requires a bearer token.
    pub fn vouchers(&self, token: &str) -> Result<VoucherList, Error> {
        self.get("/v1/vouchers", Some(token))
    }

    /// Headers sent with every request: a JSON Accept header, the fixed
    /// client identifier, and a bearer Authorization header when a
    /// token is supplied.
    fn headers(token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_IDENT));
        if let Some(t) = token {
            let val = format!("Bearer {}", t);
            if let Ok(v) = HeaderValue::from_str(&val) {
                headers.insert(AUTHORIZATION, v);
            }
        }
        headers
    }

    fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T, Error> {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .client
            .post(&url)
            .headers(Self::headers(token))
            .json(body)
            .send()?;
        Self::decode(res)
    }

    fn get<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> Result<T, Error> {
        let url = format!("{}{}", self.base_url, path);
        let res = self.client.get(&url).headers(Self::headers(token)).send()?;
        Self::decode(res)
    }

    /// Decode the response envelope. A body that is not valid JSON and a
    /// `success: false` envelope both become `Error::Api` with the best
    /// message available; `success: true` without a data payload is
    /// treated the same way.
    fn decode<T: DeserializeOwned>(res: reqwest::blocking::Response) -> Result<T, Error> {
        let body = res.text()?;
        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| Error::Api(format!("invalid response: {}", e)))?;
        if !envelope.success {
            return Err(Error::Api(
                envelope.message.unwrap_or_else(|| "request failed".into()),
            ));
        }
        envelope
            .data
            .ok_or_else(|| Error::Api("response carried no data".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_false_surfaces_server_message() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("POST", "/v1/login")
            .with_status(200)
            .with_body(r#"{"success":false,"message":"phone not registered"}"#)
            .create();

        let api = ApiClient::with_base_url(server.url()).unwrap();
        let err = api.request_otp("+6281234567890").unwrap_err();
        match err {
            Error::Api(msg) => assert_eq!(msg, "phone not registered"),
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn non_json_body_is_an_api_error() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/v1/check-balance")
            .with_status(502)
            .with_body("Bad Gateway")
            .create();

        let api = ApiClient::with_base_url(server.url()).unwrap();
        assert!(matches!(api.balance("tok").unwrap_err(), Error::Api(_)));
    }

    #[test]
    fn bearer_token_is_attached() {
        let mut server = mockito::Server::new();
        let m = server
            .mock("GET", "/v1/vouchers")
            .match_header("authorization", "Bearer sekrit")
            .match_header("accept", "application/json")
            .with_status(200)
            .with_body(r#"{"success":true,"data":{"vouchers":[]}}"#)
            .create();

        let api = ApiClient::with_base_url(server.url()).unwrap();
        let list = api.vouchers("sekrit").unwrap();
        assert!(list.vouchers.is_empty());
        m.assert();
    }

    #[test]
    fn unknown_extra_fields_are_tolerated() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/v1/check-balance")
            .with_status(200)
            .with_body(
                r#"{"success":true,"data":{"balance":42,"currency":"IDR"},"trace_id":"abc"}"#,
            )
            .create();

        let api = ApiClient::with_base_url(server.url()).unwrap();
        assert_eq!(api.balance("tok").unwrap().balance, Some(42));
    }
}
