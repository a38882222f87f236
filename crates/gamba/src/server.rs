//! `GambaServer` builder and accept loop.
//!
//! The extension listens and the host bridge dials in. Every accepted link
//! gets its own handler task and its own [`Engine`](gamba_engine::Engine),
//! so two game clients never share dice or trades.

use std::sync::Arc;
use std::time::Duration;

use gamba_engine::{EngineConfig, TemplateSource};
use gamba_protocol::{Codec, JsonCodec};
use gamba_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::settings::{ExtensionConfig, TemplateStore};
use crate::GambaError;

/// State shared by every handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) config: ExtensionConfig,
    pub(crate) templates: Arc<dyn TemplateSource>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting the extension.
///
/// # Example
///
/// ```rust,ignore
/// use gamba::prelude::*;
///
/// let server = GambaServer::builder()
///     .bind("127.0.0.1:9092")
///     .strict_commands(true)
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct GambaServerBuilder {
    config: ExtensionConfig,
    templates: Option<Arc<dyn TemplateSource>>,
}

impl GambaServerBuilder {
    pub fn new() -> Self {
        Self {
            config: ExtensionConfig::default(),
            templates: None,
        }
    }

    /// Sets the address the host bridge connects to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind = addr.to_string();
        self
    }

    /// Matches command keywords exactly instead of by suffix.
    pub fn strict_commands(mut self, strict: bool) -> Self {
        self.config.engine.strict_commands = strict;
        self
    }

    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config.handshake_timeout = timeout;
        self
    }

    pub fn engine_config(mut self, config: EngineConfig) -> Self {
        self.config.engine = config;
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ExtensionConfig) -> Self {
        self.config = config;
        self
    }

    /// Where hand descriptions come from.
    ///
    /// Defaults to the template file at `config.template_path`, or in the
    /// per-user config directory.
    pub fn templates(mut self, templates: Arc<dyn TemplateSource>) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Binds the listener. Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<GambaServer<JsonCodec>, GambaError> {
        let templates = match self.templates {
            Some(templates) => templates,
            None => {
                let store = match &self.config.template_path {
                    Some(path) => TemplateStore::new(path),
                    None => TemplateStore::default_location()?,
                };
                tracing::info!(path = %store.path().display(), "using template file");
                Arc::new(store)
            }
        };

        let transport = WebSocketTransport::bind(&self.config.bind).await?;

        let state = Arc::new(ServerState {
            config: self.config,
            templates,
            codec: JsonCodec,
        });

        Ok(GambaServer { transport, state })
    }
}

impl Default for GambaServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The extension, bound and ready for host links.
///
/// Call [`run()`](Self::run) to start accepting.
pub struct GambaServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl GambaServer<JsonCodec> {
    pub fn builder() -> GambaServerBuilder {
        GambaServerBuilder::new()
    }
}

impl<C: Codec> GambaServer<C> {
    /// Returns the local address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(mut self) -> Result<(), GambaError> {
        tracing::info!(bind = %self.state.config.bind, "gamba extension running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::warn!(error = %e, "host link ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
