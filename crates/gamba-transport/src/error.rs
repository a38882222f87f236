/// Errors raised while moving bytes between the extension and its host.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The host side went away.
    #[error("host link closed: {0}")]
    ConnectionClosed(String),

    /// Writing a frame to the host failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Reading a frame from the host failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding the listener or upgrading an accepted socket failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),
}
