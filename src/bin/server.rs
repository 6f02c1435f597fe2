use clap::Parser;
use redis_demo::config::Config;
use redis_demo::{server, Error};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::parse();

    server::run(config).await
}
