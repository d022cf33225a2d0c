// Entrypoint for the CLI application.
// - Keeps `main` small: wire up the API client, the credential store and
//   the session controller, then hand control to the UI loop.
// - Returns `anyhow::Result` to simplify error handling at the boundary.

use dompet_cli::{api::ApiClient, session::SessionController, store::TokenStore, ui::main_menu};

fn main() -> anyhow::Result<()> {
    // API client configured by the `DOMPET_API_URL` environment variable,
    // falling back to the production base URL.
    let api = ApiClient::from_env()?;
    let controller = SessionController::new(api, TokenStore::in_home_dir());

    // Start the interactive menu. This call blocks until the user exits.
    main_menu(controller)?;
    Ok(())
}
