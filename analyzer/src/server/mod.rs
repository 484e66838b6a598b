pub mod model;
pub mod routes;

use crate::workflow::runner::Runner;
use anyhow::Context;
use log::info;
use retinacore::storage::KeyValueStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

/// Serves the prediction and history endpoints until Ctrl+C.
pub async fn serve<S>(runner: Arc<Runner<S>>, bind: SocketAddr) -> anyhow::Result<()>
where
    S: KeyValueStore + Send + 'static,
{
    let (addr, server) = warp::serve(routes::routes(runner))
        .try_bind_with_graceful_shutdown(bind, async {
            let _ = signal::ctrl_c().await;
        })
        .with_context(|| format!("binding http service to {bind}"))?;
    info!("retina analyzer listening on http://{}", addr);
    println!("Serving on http://{addr} (Ctrl+C to stop)...");
    server.await;
    Ok(())
}
