use crate::cli::commands::{Cli, Commands};
use anyhow::{Context, Result, bail};
use skillproof::{Attestor, Config, Verifier};
use tracing::info;

async fn run_verify(
    config: &Config,
    url: &str,
    skill: &str,
    recipient: Option<&str>,
    attest: bool,
) -> Result<()> {
    let verifier = Verifier::new(config)?;
    let result = verifier
        .verify(url, skill)
        .await
        .context("verification pipeline failed")?;

    let output = if attest {
        let attestor = Attestor::new(&config.attestation);
        match attestor.attest(&result, skill, recipient)? {
            Some(attestation) => serde_json::json!({
                "result": result,
                "attestation": attestation,
            }),
            None => {
                info!("Result was not issued; skipping attestation");
                serde_json::json!({ "result": result, "attestation": null })
            }
        }
    } else {
        serde_json::to_value(&result)?
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn check_attestation(config: &Config, payload: &str, signature: &str) -> Result<()> {
    let attestor = Attestor::new(&config.attestation);
    if !attestor.verify(payload, signature) {
        bail!(
            "attestation signature does not match key '{}'",
            attestor.key_id()
        );
    }
    println!("valid (key '{}')", attestor.key_id());
    Ok(())
}

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Verify {
            url,
            skill,
            recipient,
            attest,
        } => run_verify(&config, &url, &skill, recipient.as_deref(), attest).await,
        Commands::CheckAttestation { payload, signature } => {
            check_attestation(&config, &payload, &signature)
        }
    }
}
