//! Cancellation token source
//!
//! Every suggestion attempt runs under its own token. Tokens are children of a
//! binding token, so tearing down the binding cancels all of them at once.

use tokio_util::sync::CancellationToken;

/// Issues one cancellation token per suggestion attempt
#[derive(Debug)]
pub struct CancellationSource {
    /// Cancelled when the engine detaches from its host
    binding: CancellationToken,
    /// Token of the latest attempt, if any
    current: Option<CancellationToken>,
}

impl CancellationSource {
    pub fn new() -> Self {
        Self {
            binding: CancellationToken::new(),
            current: None,
        }
    }

    /// Cancel the previous attempt's token and issue a fresh one
    pub fn issue(&mut self) -> CancellationToken {
        self.cancel_current();
        let token = self.binding.child_token();
        self.current = Some(token.clone());
        token
    }

    /// Cancel the current attempt's token, if any
    ///
    /// Returns true if a live token was cancelled.
    pub fn cancel_current(&mut self) -> bool {
        match self.current.take() {
            Some(token) if !token.is_cancelled() => {
                token.cancel();
                true
            }
            _ => false,
        }
    }

    /// Token that is cancelled when the binding is torn down
    pub fn binding_token(&self) -> CancellationToken {
        self.binding.clone()
    }

    /// Cancel the binding and every token issued from it
    pub fn shutdown(&mut self) {
        self.current = None;
        self.binding.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.binding.is_cancelled()
    }
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}
