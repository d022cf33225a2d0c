// Session controller: drives the OTP login handshake and the two
// authenticated read operations. All session state lives in the
// `Session` value owned by the controller; nothing here is global.
//
// State machine:
//   Unauthenticated --login()--> OtpRequested --verify_otp()--> Authenticated
//
// Failures during login or verification fall back to Unauthenticated.
// There is no logout and no token-expiry handling; the only way back to
// Unauthenticated from Authenticated is a process restart.

use crate::api::{ApiClient, Voucher};
use crate::error::Error;
use crate::store::{StoredTokens, TokenStore};

/// Country-code prefix a local number (leading `0`) is rewritten to.
const COUNTRY_PREFIX: &str = "+62";

/// Where the login handshake currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Unauthenticated,
    OtpRequested,
    Authenticated,
}

/// In-memory session populated as the login handshake progresses.
/// `access_token` is the only field the read operations need.
#[derive(Debug, Default, Clone)]
pub struct Session {
    pub phone_number: Option<String>,
    pub otp_token: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// Owns the session, the API client and the credential store, and
/// exposes the four user-facing operations.
pub struct SessionController {
    api: ApiClient,
    store: TokenStore,
    session: Session,
    state: LoginState,
}

/// Normalize a phone number to the accepted international format:
/// a leading `0` becomes the country prefix, an existing prefix is
/// passed through, anything else is a validation failure.
pub fn normalize_phone(raw: &str) -> Result<String, Error> {
    let raw = raw.trim();
    if let Some(rest) = raw.strip_prefix('0') {
        Ok(format!("{}{}", COUNTRY_PREFIX, rest))
    } else if raw.starts_with(COUNTRY_PREFIX) {
        Ok(raw.to_string())
    } else {
        Err(Error::validation(format!(
            "phone number must start with '0' or '{}'",
            COUNTRY_PREFIX
        )))
    }
}

/// Format an amount with thousands separators, e.g. 15000 -> "15,000".
pub fn format_amount(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    let first = digits.len() % 3;
    let mut rest = digits.as_str();
    if first > 0 {
        out.push_str(&rest[..first]);
        rest = &rest[first..];
        if !rest.is_empty() {
            out.push(',');
        }
    }
    let mut iter = (0..rest.len()).step_by(3).peekable();
    while let Some(i) = iter.next() {
        out.push_str(&rest[i..i + 3]);
        if iter.peek().is_some() {
            out.push(',');
        }
    }
    out
}

impl SessionController {
    /// Create a controller with an empty session. When the credential
    /// store already holds a token pair from a previous run, the session
    /// starts out Authenticated with those tokens.
    pub fn new(api: ApiClient, store: TokenStore) -> Self {
        let mut controller = SessionController {
            api,
            store,
            session: Session::default(),
            state: LoginState::Unauthenticated,
        };
        if let Ok(Some(tokens)) = controller.store.load() {
            controller.session.access_token = Some(tokens.access_token);
            controller.session.refresh_token = Some(tokens.refresh_token);
            controller.state = LoginState::Authenticated;
        }
        controller
    }

    pub fn state(&self) -> LoginState {
        self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Start the login handshake: validate and normalize the phone
    /// number, then ask the service to send an OTP. On success the
    /// state moves to OtpRequested; on any failure it stays where it
    /// was and the error is surfaced to the caller.
    pub fn login(&mut self, raw_phone: &str) -> Result<(), Error> {
        let phone = normalize_phone(raw_phone)?;
        let challenge = self.api.request_otp(&phone)?;
        self.session.phone_number = Some(phone);
        self.session.otp_token = Some(challenge.otp_token);
        self.state = LoginState::OtpRequested;
        Ok(())
    }

    /// Complete the login handshake with the OTP code the user received.
    /// Only legal after a successful `login`. The state becomes
    /// Authenticated only when the service hands back a non-empty access
    /// token; every other outcome reverts to Unauthenticated.
    pub fn verify_otp(&mut self, code: &str) -> Result<(), Error> {
        let otp_token = match (&self.state, &self.session.otp_token) {
            (LoginState::OtpRequested, Some(t)) => t.clone(),
            _ => return Err(Error::validation("request an OTP before verifying one")),
        };

        let tokens = match self.api.verify_otp(code, &otp_token) {
            Ok(t) => t,
            Err(e) => {
                self.reset();
                return Err(e);
            }
        };
        if tokens.access_token.is_empty() {
            self.reset();
            return Err(Error::Api("verification response carried no token".into()));
        }

        let saved = self.store.save(&StoredTokens {
            refresh_token: tokens.refresh_token.clone(),
            access_token: tokens.access_token.clone(),
        });
        if let Err(e) = saved {
            self.reset();
            return Err(e);
        }
        self.session.otp_token = None;
        self.session.access_token = Some(tokens.access_token);
        self.session.refresh_token = Some(tokens.refresh_token);
        self.state = LoginState::Authenticated;
        Ok(())
    }

    /// Fetch and format the account balance. Fails with AuthRequired,
    /// before any network call, when no access token is held.
    pub fn check_balance(&self) -> Result<String, Error> {
        let token = self.access_token()?;
        let sheet = self.api.balance(token)?;
        let balance = sheet
            .balance
            .ok_or_else(|| Error::Api("balance missing from response".into()))?;
        Ok(format_amount(balance))
    }

    /// Fetch the voucher list. An empty list is a success; the caller
    /// decides how to present it.
    pub fn check_vouchers(&self) -> Result<Vec<Voucher>, Error> {
        let token = self.access_token()?;
        let list = self.api.vouchers(token)?;
        Ok(list.vouchers)
    }

    fn access_token(&self) -> Result<&str, Error> {
        match (&self.state, &self.session.access_token) {
            (LoginState::Authenticated, Some(t)) => Ok(t),
            _ => Err(Error::AuthRequired),
        }
    }

    fn reset(&mut self) {
        self.session = Session::default();
        self.state = LoginState::Unauthenticated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn leading_zero_is_rewritten_to_country_prefix() {
        assert_eq!(normalize_phone("081234567890").unwrap(), "+6281234567890");
    }

    #[test]
    fn existing_prefix_passes_through() {
        assert_eq!(normalize_phone("+6281234567890").unwrap(), "+6281234567890");
    }

    #[test]
    fn other_prefixes_fail_validation() {
        for bad in ["81234567890", "+14155550100", "", "abc"] {
            assert!(matches!(normalize_phone(bad), Err(Error::Validation(_))));
        }
    }

    #[test]
    fn amounts_get_thousands_separators() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(999), "999");
        assert_eq!(format_amount(1000), "1,000");
        assert_eq!(format_amount(15000), "15,000");
        assert_eq!(format_amount(1234567), "1,234,567");
        assert_eq!(format_amount(-25000), "-25,000");
    }

    #[test]
    fn reads_require_login_and_make_no_network_call() {
        // Base URL that would refuse connections if anything tried it.
        let api = ApiClient::with_base_url("http://127.0.0.1:1").unwrap();
        let dir = tempdir().unwrap();
        let controller = SessionController::new(api, TokenStore::at(dir.path().join("t")));

        assert_eq!(controller.state(), LoginState::Unauthenticated);
        assert!(matches!(
            controller.check_balance(),
            Err(Error::AuthRequired)
        ));
        assert!(matches!(
            controller.check_vouchers(),
            Err(Error::AuthRequired)
        ));
    }

    #[test]
    fn verify_without_prior_login_is_a_validation_error() {
        let api = ApiClient::with_base_url("http://127.0.0.1:1").unwrap();
        let dir = tempdir().unwrap();
        let mut controller = SessionController::new(api, TokenStore::at(dir.path().join("t")));
        assert!(matches!(
            controller.verify_otp("000000"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn stored_tokens_resume_an_authenticated_session() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t");
        TokenStore::at(&path)
            .save(&StoredTokens {
                refresh_token: "R".into(),
                access_token: "A".into(),
            })
            .unwrap();

        let api = ApiClient::with_base_url("http://127.0.0.1:1").unwrap();
        let controller = SessionController::new(api, TokenStore::at(&path));
        assert_eq!(controller.state(), LoginState::Authenticated);
        assert_eq!(controller.session().access_token.as_deref(), Some("A"));
    }
}
