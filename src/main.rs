use core::{convert::Infallible, time::Duration};
use hyper::{server::conn::http1, service::service_fn};
use hyper_util::rt::TokioIo;
use std::{
    env,
    net::{Ipv4Addr, SocketAddr},
};
use tokio::{net::TcpListener, runtime::Runtime};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Parse environment variables
    let port = env::var("PORT")?.parse()?;
    let user = env::var("PG_USERNAME")?;
    let pass = env::var("PG_PASSWORD")?;
    let host = env::var("PG_HOSTNAME")?;
    let data = env::var("PG_DATABASE")?;
    let pg_port = match env::var("PG_PORT") {
        Ok(pg_port) => pg_port.parse()?,
        _ => 5432,
    };
    let timeout = match env::var("GATEWAY_TIMEOUT") {
        Ok(secs) => Duration::from_secs(secs.parse()?),
        _ => Duration::from_secs(10),
    };

    let runtime = Runtime::new()?;
    runtime.block_on(async {
        let (client, conn) = db::Config::new()
            .user(&user)
            .password(&pass)
            .host(&host)
            .dbname(&data)
            .port(pg_port)
            .connect(db::NoTls)
            .await?;
        let postgres = tokio::spawn(async move {
            if let Err(err) = conn.await {
                log::error!("database connection closed: {err}");
            }
        });

        let fetcher = api::preload::HttpFetcher::new()?;
        let game = api::Game::new(db::Database::from(client), fetcher, timeout);
        game.init_game().await;

        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        let listener = TcpListener::bind(addr).await?;
        log::info!("listening on {addr}");

        loop {
            let stream = tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => break,
                conn = listener.accept() => match conn {
                    Ok((stream, peer)) => {
                        log::debug!("accepted connection from {peer}");
                        stream
                    }
                    Err(err) => {
                        log::error!("failed to accept connection: {err}");
                        continue;
                    }
                },
            };

            let game = game.clone();
            let service = service_fn(move |req| {
                let game = game.clone();
                async move { Ok::<_, Infallible>(api::respond(req, &game).await) }
            });
            tokio::spawn(async move {
                if let Err(err) = http1::Builder::new().serve_connection(TokioIo::new(stream), service).await {
                    log::error!("connection failed: {err}");
                }
            });
        }

        log::info!("shutting down");
        drop(game);
        postgres.abort();
        anyhow::Ok(())
    })
}
