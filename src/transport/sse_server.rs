use crate::tools::GitGuardTools;
use anyhow::Result;
use rmcp::transport::sse_server::SseServer;
use std::net::SocketAddr;

pub struct SseServerApp {
    bind_addr: SocketAddr,
    tools: GitGuardTools,
}

impl SseServerApp {
    pub fn new(bind_addr: SocketAddr, tools: GitGuardTools) -> Self {
        Self { bind_addr, tools }
    }

    pub async fn serve(self) -> Result<()> {
        let sse_server = SseServer::serve(self.bind_addr).await?;

        // Every SSE session shares the same gate, so a token minted on one
        // connection is accepted on another
        let tools = self.tools;
        let cancellation_token = sse_server.with_service(move || tools.clone());

        // Wait for Ctrl+C signal to gracefully shutdown
        tokio::signal::ctrl_c().await?;

        cancellation_token.cancel();

        Ok(())
    }
}
