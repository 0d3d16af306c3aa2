use crate::tools::GitGuardTools;
use anyhow::Result;
use rmcp::ServiceExt;
use rmcp::transport::stdio;

pub async fn run_stdio_server(tools: GitGuardTools) -> Result<()> {
    let server = tools.serve(stdio()).await?;

    server.waiting().await?;
    Ok(())
}
