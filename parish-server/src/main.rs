use anyhow::Context;
use parish_server::{Config, Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 日志)
    setup_environment().context("Failed to set up environment")?;

    print_banner();

    // 2. 加载配置
    let config = Config::from_env();
    tracing::info!(
        parish = %config.parish_name,
        members_file = %config.members_file,
        photo_dir = %config.photo_dir,
        "⛪ Parish server starting..."
    );

    // 3. 初始化服务器状态
    let state = ServerState::initialize(&config).context("Failed to initialize server state")?;

    // 4. 启动 HTTP 服务器
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
