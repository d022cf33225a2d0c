// Library root
// -----------
// This crate exposes a small library surface for the CLI. The binary
// (`main.rs`) uses these modules to implement the interactive client.
//
// Module responsibilities:
// - `api`: Encapsulates HTTP interactions with the wallet service
//   (OTP request/verify, balance, vouchers) behind typed responses.
// - `session`: The login state machine and the operations it gates.
// - `store`: The two-line credential file on disk.
// - `error`: The shared error taxonomy.
// - `ui`: Implements the terminal-based menu loop and delegates to
//   `session`.
//
// Keeping this separation makes it easier to test the session logic
// against a mock HTTP server or replace the UI in the future.
pub mod api;
pub mod error;
pub mod session;
pub mod store;
pub mod ui;
