use argparse::{ArgumentParser, Store};

use crate::config::Config;
use crate::kafka::{AvroProducer, SchemaRegistry};
use crate::metrics::StatisticsServer;
use crate::server::TriggerServer;

use std::{net::SocketAddr, sync::Arc};

use futures::channel::oneshot;
use tokio::runtime::Runtime;
use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinHandle;

pub struct System;

impl System {
    pub fn start(name: &str, config: &Config) {
        let mut port = config.server.port;

        {
            let mut ap = ArgumentParser::new();
            ap.set_description(name);
            ap.refer(&mut port).add_option(
                &["-p", "--port"],
                Store,
                "Port for the trigger endpoint, (default: from config)",
            );
            ap.parse_args_or_exit();
        }

        info!("{} starting up!", name);

        let runtime = Runtime::new().expect("Runtime creation error");

        runtime.block_on(async {
            let registry = SchemaRegistry::new(&config.schema_registry);
            let producer = AvroProducer::new(&config.kafka, &registry)
                .await
                .expect("Producer creation error");

            let addr: SocketAddr = format!("{}:{}", config.server.host, port)
                .parse()
                .expect("Invalid trigger server address");

            let (server_tx, server_rx) = oneshot::channel();
            let (statistics_tx, statistics_rx) = oneshot::channel();

            let mut handles: Vec<JoinHandle<_>> = Vec::new();

            handles.push({
                let server = TriggerServer::new(Arc::new(producer));

                tokio::spawn(async move {
                    debug!("Starting trigger server...");

                    if let Err(error) = server.run(addr, server_rx).await {
                        error!("Error in trigger server: {:?}", error);
                    }

                    debug!("Exiting trigger server...");
                })
            });

            handles.push({
                tokio::spawn(async move {
                    debug!("Starting statistics server...");
                    StatisticsServer::handle(statistics_rx).await;
                    debug!("Exiting statistics server...");
                })
            });

            let mut sigint = signal(SignalKind::interrupt()).expect("Signal handler error");
            let mut sigterm = signal(SignalKind::terminate()).expect("Signal handler error");

            tokio::select! {
                _ = sigint.recv() => info!("Received signal: INT"),
                _ = sigterm.recv() => info!("Received signal: TERM"),
            }

            server_tx.send(()).unwrap();
            statistics_tx.send(()).unwrap();

            for handle in handles {
                let _ = handle.await;
            }
        });
    }
}
