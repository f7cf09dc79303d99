use voice_assistant::app_composite;
use voice_assistant::config;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize rustls crypto provider, for secure connections
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install the rustls crypto provider"))?;

    let config = config::from_env()?;

    let app_composite = app_composite::AppComposite::new(&config)?;
    let assistant = app_composite.run().await?;
    assistant.into_speaker().finish().await;
    Ok(())
}
