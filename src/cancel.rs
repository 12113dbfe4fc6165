use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{GenerationError, GenerationResult};

// Polled between batches of the long running generation loops
pub trait Cancellation {
    fn is_cancelled(&self) -> bool;

    fn check(&self) -> GenerationResult<()> {
        if self.is_cancelled() {
            Err(GenerationError::Cancelled)
        } else {
            Ok(())
        }
    }
}

// Never cancels
impl Cancellation for () {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl Cancellation for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<C: Cancellation + ?Sized> Cancellation for Arc<C> {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

impl<C: Cancellation + ?Sized> Cancellation for &C {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}
