//! Per-call bridge state between the engine's chunk pushes and the handler.
//!
//! One [`ChunkBridge`] exists for exactly one in-flight
//! [`speak`](crate::TtsEngine::speak) call. It forwards each chunk to the
//! handler under a re-acquired host lock, latches the handler's stop
//! decision, and quarantines handler panics so they never unwind into the
//! engine.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::audio::{AudioChunk, Decision};
use crate::host::Handoff;

pub(crate) struct ChunkBridge<'h> {
    handler: &'h mut dyn FnMut(AudioChunk<'_>) -> Decision,

    /// Latched once the handler decides to stop (or panics). The handler is
    /// never invoked again for this call, no matter how many more chunks the
    /// engine pushes before it ceases.
    stopped: bool,

    /// Whether a final-flagged chunk was seen.
    saw_final: bool,

    /// A panic captured from the handler, to be resumed once the engine call
    /// has returned and the lock is held again.
    panic_payload: Option<Box<dyn Any + Send>>,
}

impl<'h> ChunkBridge<'h> {
    pub(crate) fn new(handler: &'h mut dyn FnMut(AudioChunk<'_>) -> Decision) -> Self {
        Self {
            handler,
            stopped: false,
            saw_final: false,
            panic_payload: None,
        }
    }

    /// Forward one chunk to the handler and answer the engine.
    ///
    /// Runs the handler under [`Handoff::reenter`], so host-level logic holds
    /// the lock for exactly this invocation. A panicking handler is treated
    /// as a stop decision; the payload is stashed for the return path.
    pub(crate) fn deliver(&mut self, handoff: &Handoff<'_>, chunk: AudioChunk<'_>) -> Decision {
        if self.stopped {
            return Decision::Stop;
        }
        if chunk.is_final {
            self.saw_final = true;
        }

        let verdict = handoff.reenter(|| {
            catch_unwind(AssertUnwindSafe(|| (self.handler)(chunk)))
        });

        match verdict {
            Ok(Decision::Continue) => Decision::Continue,
            Ok(Decision::Stop) => {
                self.stopped = true;
                Decision::Stop
            }
            Err(payload) => {
                tracing::error!("chunk handler panicked; requesting engine stop");
                self.panic_payload = Some(payload);
                self.stopped = true;
                Decision::Stop
            }
        }
    }

    /// Whether the handler requested a stop (or panicked).
    pub(crate) fn stop_requested(&self) -> bool {
        self.stopped
    }

    /// Whether a final chunk was delivered.
    pub(crate) fn saw_final(&self) -> bool {
        self.saw_final
    }

    /// Take the captured handler panic, if any.
    pub(crate) fn take_panic(&mut self) -> Option<Box<dyn Any + Send>> {
        self.panic_payload.take()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::host::HostLock;

    fn chunk(is_final: bool) -> AudioChunk<'static> {
        AudioChunk {
            sample_rate: 16_000,
            format: 1,
            channels: 1,
            data: &[0u8; 4],
            is_final,
        }
    }

    #[test]
    fn handler_is_not_called_again_after_stop() {
        let lock = HostLock::new();
        let mut guard = lock.acquire();

        let calls = Cell::new(0);
        let mut handler = |_c: AudioChunk<'_>| {
            calls.set(calls.get() + 1);
            Decision::Stop
        };
        let mut bridge = ChunkBridge::new(&mut handler);

        guard.suspended(|handoff| {
            assert_eq!(bridge.deliver(handoff, chunk(false)), Decision::Stop);
            assert_eq!(bridge.deliver(handoff, chunk(false)), Decision::Stop);
            assert_eq!(bridge.deliver(handoff, chunk(true)), Decision::Stop);
        });

        assert_eq!(calls.get(), 1);
        assert!(bridge.stop_requested());
        assert!(bridge.take_panic().is_none());
    }

    #[test]
    fn final_flag_is_tracked() {
        let lock = HostLock::new();
        let mut guard = lock.acquire();

        let mut handler = |_c: AudioChunk<'_>| Decision::Continue;
        let mut bridge = ChunkBridge::new(&mut handler);

        guard.suspended(|handoff| {
            assert_eq!(bridge.deliver(handoff, chunk(false)), Decision::Continue);
            assert!(!bridge.saw_final());
            assert_eq!(bridge.deliver(handoff, chunk(true)), Decision::Continue);
        });

        assert!(bridge.saw_final());
        assert!(!bridge.stop_requested());
    }

    #[test]
    fn handler_panic_is_quarantined() {
        let lock = HostLock::new();
        let mut guard = lock.acquire();

        let calls = Cell::new(0);
        let mut handler = |_c: AudioChunk<'_>| -> Decision {
            calls.set(calls.get() + 1);
            panic!("handler exploded");
        };
        let mut bridge = ChunkBridge::new(&mut handler);

        guard.suspended(|handoff| {
            // The panic must not unwind into the (simulated) engine.
            assert_eq!(bridge.deliver(handoff, chunk(false)), Decision::Stop);
            assert_eq!(bridge.deliver(handoff, chunk(false)), Decision::Stop);
        });

        assert_eq!(calls.get(), 1);
        assert!(bridge.take_panic().is_some());
        // The lock survived the panic.
        assert!(lock.is_locked());
    }
}
