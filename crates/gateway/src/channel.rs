//! Closeable live-update channels.
//!
//! A [`Channel`] carries invalidation signals only: "something matching
//! your filter changed, re-read it". Signals coalesce; if one is already
//! pending, further changes are folded into it because the consumer's
//! response is always a full re-fetch.
//!
//! The adapter keeps the [`ChannelFeed`] half and stops producing once the
//! consumer closes or drops the [`Channel`].

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Consumer half of a live-update subscription.
pub struct Channel {
    signals: mpsc::Receiver<()>,
    cancel: CancellationToken,
    closed: bool,
}

/// Producer half, held by the gateway adapter.
#[derive(Clone)]
pub struct ChannelFeed {
    signals: mpsc::Sender<()>,
    cancel: CancellationToken,
}

impl Channel {
    /// Create a connected feed/channel pair.
    pub fn pair() -> (ChannelFeed, Channel) {
        let (tx, rx) = mpsc::channel(1);
        let cancel = CancellationToken::new();
        let feed = ChannelFeed {
            signals: tx,
            cancel: cancel.clone(),
        };
        let channel = Channel {
            signals: rx,
            cancel,
            closed: false,
        };
        (feed, channel)
    }

    /// Wait for the next invalidation.
    ///
    /// Returns `false` once the channel is closed from either side; no
    /// signal is ever reported after [`close`](Self::close).
    pub async fn invalidated(&mut self) -> bool {
        if self.closed {
            return false;
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            signal = self.signals.recv() => signal.is_some(),
        }
    }

    /// Close the channel. Idempotent.
    ///
    /// Returns `true` only for the call that actually closed it.
    pub fn close(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.closed = true;
        self.cancel.cancel();
        self.signals.close();
        true
    }

    pub fn is_closed(&self) -> bool {
        self.closed || self.cancel.is_cancelled()
    }

    /// Token that fires when this channel is closed.
    pub fn close_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        self.close();
    }
}

impl ChannelFeed {
    /// Push an invalidation. Returns `false` if the consumer is gone.
    ///
    /// A full buffer means a signal is already pending, which is enough.
    pub fn signal(&self) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        match self.signals.try_send(()) {
            Ok(()) | Err(mpsc::error::TrySendError::Full(())) => true,
            Err(mpsc::error::TrySendError::Closed(())) => false,
        }
    }

    /// Resolves once the consumer closes or drops the channel.
    pub async fn closed(&self) {
        self.cancel.cancelled().await
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Close from the producer side (e.g. the adapter is shutting down).
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}
