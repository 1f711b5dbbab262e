use crate::admin;
use crate::config::Settings;
use crate::history::HistoryStore;
use crate::proxy::ProxyService;
use crate::Result;
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

/// Main application struct that coordinates all components
///
/// Owns the single history store shared by the proxy and admin services.
pub struct Application {
    settings: Settings,
    history: Arc<HistoryStore>,
    proxy: ProxyService,
}

impl Application {
    #[instrument(skip_all)]
    pub fn new(settings: Settings) -> Self {
        let history = Arc::new(HistoryStore::new(settings.history.capacity));
        let proxy = ProxyService::new(settings.to_proxy_config(), Arc::clone(&history));

        info!(
            capacity = *settings.history.capacity.as_ref(),
            "History store created"
        );

        Self {
            settings,
            history,
            proxy,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn history(&self) -> Arc<HistoryStore> {
        Arc::clone(&self.history)
    }

    pub fn proxy_router(&self) -> Router {
        self.proxy.clone().into_router()
    }

    /// Admin router, or `None` when the admin surface is disabled
    pub fn admin_router(&self) -> Option<Router> {
        self.settings
            .admin_address()
            .map(|_| admin::router(Arc::clone(&self.history)))
    }

    /// Bind the configured listeners and serve until Ctrl-C.
    #[instrument(skip(self))]
    pub async fn run(self) -> Result<()> {
        let proxy_address = self.settings.proxy_address();
        let proxy_listener = TcpListener::bind(&proxy_address).await?;
        info!(address = %proxy_address, "Proxy listening");

        let admin_listener = match self.settings.admin_address() {
            Some(address) => {
                let listener = TcpListener::bind(&address).await?;
                info!(address = %address, "Admin API listening");
                Some(listener)
            }
            None => {
                info!("Admin API disabled");
                None
            }
        };

        self.serve(proxy_listener, admin_listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for shutdown signal");
            }
        })
        .await
    }

    /// Serve on already-bound listeners until `shutdown` resolves.
    pub async fn serve<F>(
        self,
        proxy_listener: TcpListener,
        admin_listener: Option<TcpListener>,
        shutdown: F,
    ) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (stop_tx, stop_rx) = watch::channel(false);
        tokio::spawn(async move {
            shutdown.await;
            info!("Shutting down");
            let _ = stop_tx.send(true);
        });

        let proxy_router = self.proxy_router();
        let proxy_stop = stop_rx.clone();
        let proxy_server = async move {
            axum::serve(proxy_listener, proxy_router)
                .with_graceful_shutdown(stopped(proxy_stop))
                .await
        };

        let admin_router = self.admin_router();
        let admin_server = async move {
            match (admin_listener, admin_router) {
                (Some(listener), Some(router)) => {
                    axum::serve(listener, router)
                        .with_graceful_shutdown(stopped(stop_rx))
                        .await
                }
                _ => Ok(()),
            }
        };

        tokio::try_join!(proxy_server, admin_server)?;
        info!("Servers stopped");
        Ok(())
    }
}

async fn stopped(mut stop: watch::Receiver<bool>) {
    let _ = stop.wait_for(|stopped| *stopped).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(toml: &str) -> Settings {
        Settings::from_toml(toml).unwrap()
    }

    #[test]
    fn test_admin_disabled_by_default() {
        let app = Application::new(settings(""));
        assert!(app.admin_router().is_none());
        assert_eq!(*app.history().capacity().as_ref(), 1000);
    }

    #[test]
    fn test_history_capacity_from_settings() {
        let app = Application::new(settings(
            r#"
            [history]
            capacity = 5

            [admin]
            port = 9001
            "#,
        ));
        assert!(app.admin_router().is_some());
        assert_eq!(*app.history().capacity().as_ref(), 5);
    }

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        let app = Application::new(settings("[admin]\nport = 9001"));
        let proxy_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let admin_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let server = tokio::spawn(app.serve(proxy_listener, Some(admin_listener), async move {
            let _ = rx.await;
        }));

        tx.send(()).unwrap();
        let result = tokio::time::timeout(std::time::Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
