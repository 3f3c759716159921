use tokio::sync::mpsc;
use tracing::warn;
use quickcourt_core::Navigator;

/// Forwards route changes to the command loop
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, path: &str) {
        if self.tx.send(path.to_string()).is_err() {
            warn!("Navigation to {} dropped, nobody is listening", path);
        }
    }
}
