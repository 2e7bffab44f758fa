use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use hello_demo::{router, HelloGreeter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("greeting service listening on {addr}");

    axum::serve(listener, router(Arc::new(HelloGreeter))).await?;
    Ok(())
}
