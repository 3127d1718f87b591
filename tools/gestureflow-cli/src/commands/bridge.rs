//! Run the dispatcher bridge.

use gestureflow_common::config::AppConfig;

pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    eprintln!("Listening on {} (Ctrl+C to stop)", config.transport.address);

    let stats = gestureflow_dispatcher::serve(config, async {
        tokio::signal::ctrl_c().await.ok();
    })
    .await?;

    eprintln!();
    eprintln!("Received:        {}", stats.received);
    eprintln!("  ignored:       {}", stats.ignored);
    eprintln!("  completed:     {}", stats.completed);
    eprintln!("  host not ready: {}", stats.host_conditions);
    eprintln!("  failed:        {}", stats.failures);
    Ok(())
}
