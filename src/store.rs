// Credential store: two plaintext lines in the user's home directory,
// written whole and read whole on each access. No locking and no atomic
// rename; the client is single-user and single-process.
//
// File format:
//   REFRESH_TOKEN=<value>
//   ACCESS_TOKEN=<value>
//
// Token values containing newlines or `=` are not escaped. This is a
// known fragility inherited from the file format itself.

use crate::error::Error;
use std::path::PathBuf;

/// Default credential file name under the home directory.
const TOKEN_FILE: &str = ".dompet_tokens";

/// Token pair as read from or written to the credential file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTokens {
    pub refresh_token: String,
    pub access_token: String,
}

/// Reads and writes the credential file. A missing file means "not
/// logged in" and is not an error; a present but malformed file is.
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Store backed by `~/.dompet_tokens` (falling back to the current
    /// directory when no home directory is available).
    pub fn in_home_dir() -> Self {
        let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        TokenStore {
            path: dir.join(TOKEN_FILE),
        }
    }

    /// Store backed by an explicit path (used by tests).
    pub fn at(path: impl Into<PathBuf>) -> Self {
        TokenStore { path: path.into() }
    }

    /// Write both tokens, replacing any previous file.
    pub fn save(&self, tokens: &StoredTokens) -> Result<(), Error> {
        let contents = format!(
            "REFRESH_TOKEN={}\nACCESS_TOKEN={}",
            tokens.refresh_token, tokens.access_token
        );
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    /// Read the stored tokens. Returns `Ok(None)` when the file does not
    /// exist, `Err(Error::Store)` when it exists but either line is
    /// missing or malformed.
    pub fn load(&self) -> Result<Option<StoredTokens>, Error> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut lines = contents.lines();
        let refresh_token = Self::value(lines.next(), "REFRESH_TOKEN")?;
        let access_token = Self::value(lines.next(), "ACCESS_TOKEN")?;
        Ok(Some(StoredTokens {
            refresh_token,
            access_token,
        }))
    }

    /// Parse one `KEY=VALUE` line, checking the key.
    fn value(line: Option<&str>, key: &str) -> Result<String, Error> {
        let line = line.ok_or_else(|| Error::Store(format!("missing {} line", key)))?;
        match line.split_once('=') {
            Some((k, v)) if k == key => Ok(v.trim().to_string()),
            _ => Err(Error::Store(format!("malformed {} line", key))),
        }
    }
}
