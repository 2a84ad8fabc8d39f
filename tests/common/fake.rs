//! Runs the fake pet service on a background thread for blocking clients.
#![allow(dead_code)]

use super::fixtures::{EMAIL, PASSWORD};
use petfriends_harness::server::http::{FakePetService, serve_listener};
use std::net::TcpListener;
use tokio::sync::oneshot;

/// A fake service listening on an ephemeral local port; stops on drop.
pub struct FakeServer {
    pub base_url: String,
    pub service: FakePetService,
    shutdown: Option<oneshot::Sender<()>>,
}

impl FakeServer {
    /// Start with the default test account registered.
    pub fn start() -> Self {
        Self::start_with(FakePetService::new().with_account(EMAIL, PASSWORD))
    }

    pub fn start_with(service: FakePetService) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake service");
        listener
            .set_nonblocking(true)
            .expect("make listener non-blocking");
        let addr = listener.local_addr().expect("listener address");
        let (tx, rx) = oneshot::channel::<()>();

        let state = service.clone();
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("build runtime");
            runtime.block_on(async move {
                let listener =
                    tokio::net::TcpListener::from_std(listener).expect("adopt listener");
                let shutdown = async {
                    let _ = rx.await;
                };
                serve_listener(state, listener, shutdown)
                    .await
                    .expect("fake service");
            });
        });

        Self {
            base_url: format!("http://{addr}"),
            service,
            shutdown: Some(tx),
        }
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}
