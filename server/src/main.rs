use log::info;
use tokio::net::TcpListener;
use todo_server::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("listening on {addr}");
    todo_server::run(listener).await?;
    Ok(())
}
