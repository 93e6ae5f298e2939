use sync_server::{Config, Server, ServerState, print_banner, setup_environment};
use validator::Validate;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 日志)
    setup_environment().map_err(|e| anyhow::anyhow!("{e}"))?;

    // 打印横幅
    print_banner();

    tracing::info!("🔁 Sync Server starting...");

    // 2. 加载并校验配置
    let config = Config::from_env();
    config.validate()?;

    // 3. 初始化服务器状态 (映射加载失败在此处终止进程)
    let state = ServerState::initialize(&config).await?;

    // 4. 启动 HTTP 服务器 (Server::run 会自动启动后台任务)
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
