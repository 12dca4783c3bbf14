//! Login and logout

use super::client;
use crate::{output, Format};
use anyhow::{bail, Result};
use cookbook_api_client::endpoints::auth::LoginRequest;
use cookbook_api_client::store::CredentialStore;
use tracing::info;

/// Sign in; the pipeline persists the token for privileged accounts
pub async fn login(backend: Option<&str>, email: &str, password: &str, format: Format) -> Result<()> {
    let client = client(backend)?;
    let response = client.auth().login(&LoginRequest::new(email, password)).await?;

    let role = response
        .data()
        .and_then(|data| data.get("role"))
        .and_then(|role| role.as_str())
        .unwrap_or("unknown")
        .to_string();
    info!(%role, "Signed in");

    if client.credentials().get().is_none() {
        bail!("signed in as {role}, but only ADMIN sessions are kept on this machine");
    }

    output::success(&format!("Signed in as {email} ({role})"), format);
    Ok(())
}

/// Sign out on the backend, then wipe local credentials regardless of the outcome
pub async fn logout(backend: Option<&str>, format: Format) -> Result<()> {
    let client = client(backend)?;
    let result = client.auth().logout().await;
    client.credentials().clear();

    result?;
    output::success("Signed out", format);
    Ok(())
}
