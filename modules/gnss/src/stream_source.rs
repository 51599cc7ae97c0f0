use crate::config::StreamConfig;
use crate::connection::StreamConnection;
use module_core::{EventKind, Module, ModuleCtx};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Module publishing the samples of an NMEA or gpsd position stream.
///
/// The connection runs in its own task and reconnects on its own. The module
/// waits for the quit event and then stops that task. Should the task ever
/// end by itself it is logged and started again.
pub struct NmeaStreamModule {
    ctx: ModuleCtx,
    config: Arc<StreamConfig>,
}

impl NmeaStreamModule {
    pub fn new(ctx: ModuleCtx, config: StreamConfig) -> Self {
        NmeaStreamModule {
            ctx,
            config: Arc::new(config),
        }
    }

    /// Runs the connection tasks created by `spawn` until the quit event.
    pub(crate) async fn supervise<F>(&mut self, mut spawn: F) -> Result<(), ()>
    where
        F: FnMut() -> JoinHandle<()> + Send,
    {
        let mut connection_handle = spawn();
        let mut run = true;
        while run {
            tokio::select! {
                result = &mut connection_handle => {
                    match result {
                        Err(e) if e.is_panic() => {
                            error!("Connection task to {} panicked, restarting it", self.config);
                        }
                        _ => error!("Connection task to {} ended, restarting it", self.config),
                    }
                    connection_handle = spawn();
                }
                event = self.ctx.receiver.recv() => {
                    match event {
                        Ok(event) => {
                            if let EventKind::QuitEvent = event.kind {
                                connection_handle.abort();
                                run = false;
                            }
                        }
                        Err(e) => error!("Failed to receive event in module NmeaStream. Error: {e}"),
                    }
                }
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Module for NmeaStreamModule {
    async fn run(&mut self) -> Result<(), ()> {
        info!("Starting position stream from {}", self.config);
        let config = self.config.clone();
        let sender = self.ctx.sender.clone();
        self.supervise(move || {
            let connection = StreamConnection::new(config.clone(), sender.clone());
            tokio::spawn(connection.run())
        })
        .await
    }
}
