use std::io::Write;

use crate::api::AnyRunClient;
use crate::error::Result;
use crate::output::Output;

/// Print the account's analysis history
pub async fn history<W: Write>(client: &AnyRunClient, output: &mut Output<W>) -> Result<()> {
    let json = client.get_history().await?;
    output.json(&json)
}

/// Print the available sandbox environments
pub async fn environments<W: Write>(client: &AnyRunClient, output: &mut Output<W>) -> Result<()> {
    let json = client.get_environment().await?;
    output.json(&json)
}

/// Print user details and API limits
pub async fn user_limits<W: Write>(client: &AnyRunClient, output: &mut Output<W>) -> Result<()> {
    let json = client.get_user().await?;
    output.json(&json)
}
