//! The simulated frames.

use crate::config::Config;
use framelink_frames::{
    Endpoint, FrameRole, Message, PortFinder, PortProvider, ProviderEvent, ProviderHandle, Window,
};
use serde_json::{Value, json};

/// Wire up every frame and run each supported discovery once.
pub async fn run(config: Config, guests: usize) -> anyhow::Result<()> {
    let host = Window::new(config.host_origin.as_str());
    let provider = PortProvider::host(host.clone(), &config.provider).listen();
    tokio::spawn(host_frame(provider));

    // Sidebar first: brokered channels reach it over its link to the host.
    let sidebar = Window::new(config.provider.apps_origin.as_str());
    let sidebar_finder = PortFinder::new(sidebar, FrameRole::Sidebar, vec![host.clone()], config.finder);
    let mut sidebar_host = sidebar_finder.discover(FrameRole::Host).await?;
    let reply = round_trip(&mut sidebar_host, json!({ "from": "sidebar" })).await?;
    tracing::info!(%reply, "sidebar linked to host");
    tokio::spawn(sidebar_frame(sidebar_host));

    for n in 0..guests {
        let label = format!("guest-{n}");
        let guest = Window::new(config.guest_origin.as_str());
        let finder = PortFinder::new(guest, FrameRole::Guest, vec![host.clone()], config.finder);

        let mut to_host = finder.discover(FrameRole::Host).await?;
        let reply = round_trip(&mut to_host, json!({ "from": label })).await?;
        tracing::info!(%label, %reply, "guest linked to host");

        let mut to_sidebar = finder.discover(FrameRole::Sidebar).await?;
        let reply = round_trip(&mut to_sidebar, json!({ "from": label })).await?;
        tracing::info!(%label, %reply, "guest linked to sidebar");
    }

    let notebook = Window::new(config.provider.apps_origin.as_str());
    let finder = PortFinder::new(notebook, FrameRole::Notebook, vec![host], config.finder);
    let mut to_sidebar = finder.discover(FrameRole::Sidebar).await?;
    let reply = round_trip(&mut to_sidebar, json!({ "from": "notebook" })).await?;
    tracing::info!(%reply, "notebook linked to sidebar");

    tracing::info!("all frames connected");
    Ok(())
}

async fn host_frame(mut provider: ProviderHandle) {
    while let Some(event) = provider.next_event().await {
        match event {
            ProviderEvent::FrameConnected { frame, port } => {
                tracing::info!(%frame, "host accepted channel");
                tokio::spawn(echo(format!("host<->{frame}"), port));
            }
            ProviderEvent::Rejected(err) => tracing::warn!(error = %err, "host rejected request"),
        }
    }
}

/// Picks up channels the host brokers for the sidebar.
async fn sidebar_frame(mut host: Endpoint) {
    while let Some(msg) = host.recv().await {
        let Some(offer) = Message::parse(&msg.data).filter(Message::is_offer) else {
            continue;
        };
        for port in msg.ports {
            tracing::info!(frame = %offer.frame1, "sidebar accepted channel");
            tokio::spawn(echo(format!("sidebar<->{}", offer.frame1), port));
        }
    }
}

async fn echo(name: String, mut port: Endpoint) {
    while let Some(msg) = port.recv().await {
        tracing::debug!(%name, data = %msg.data, "received");
        if port.post_message(json!({ "ack": msg.data, "by": name }), Vec::new()).is_err() {
            break;
        }
    }
}

async fn round_trip(port: &mut Endpoint, data: Value) -> anyhow::Result<Value> {
    port.post_message(data, Vec::new())?;
    let reply = port
        .recv()
        .await
        .ok_or_else(|| anyhow::anyhow!("channel closed before reply"))?;
    Ok(reply.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use framelink_frames::{DiscoveryError, FinderConfig};

    fn quick() -> Config {
        Config {
            finder: FinderConfig {
                polling_interval_ms: 5,
                max_wait_ms: 2_000,
            },
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn every_frame_connects() {
        run(quick(), 2).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn sidebar_from_wrong_origin_is_refused() {
        let config = quick();
        let host = Window::new(config.host_origin.as_str());
        let _provider = PortProvider::host(host.clone(), &config.provider).listen();

        let impostor = Window::new("https://impostor.example");
        let finder = PortFinder::new(impostor, FrameRole::Sidebar, vec![host], config.finder);
        let err = finder.discover(FrameRole::Host).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Timeout { .. }));
    }
}
