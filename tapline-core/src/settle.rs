//! Drive a future to completion and hand its output to a continuation,
//! without an executor.
//!
//! The callback convention has no executor to lean on: a future-returning tap
//! is polled right away on the calling thread and re-polled on whichever
//! thread wakes it. Wakes that arrive while a poll is in progress (including
//! wakes from inside the poll) are folded into one more poll by the thread
//! already polling.

use futures::{
    future::BoxFuture,
    task::{ArcWake, waker_ref},
};
use std::{
    future::Future,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU8, Ordering},
    },
    task::{Context, Poll},
};

const IDLE: u8 = 0;
const POLLING: u8 = 1;
const NOTIFIED: u8 = 2;
const DONE: u8 = 3;

type Then<T> = Box<dyn FnOnce(T) + Send + 'static>;

struct Pending<T> {
    future: BoxFuture<'static, T>,
    then: Then<T>,
}

struct Settle<T> {
    state: AtomicU8,
    pending: Mutex<Option<Pending<T>>>,
}

/// Poll `future` until it is ready, then call `then` with its output.
///
/// `then` runs on the thread that completes the final poll: the caller's
/// thread if the future is ready immediately, otherwise the waking thread.
pub fn settle<F, K>(future: F, then: K)
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
    K: FnOnce(F::Output) + Send + 'static,
{
    let task = Arc::new(Settle {
        state: AtomicU8::new(POLLING),
        pending: Mutex::new(Some(Pending {
            future: Box::pin(future),
            then: Box::new(then),
        })),
    });
    task.run();
}

impl<T: Send + 'static> Settle<T> {
    /// Poll until ready or until no wake is outstanding. Entered in `POLLING`.
    fn run(self: &Arc<Self>) {
        loop {
            let ready = {
                let mut slot = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
                let Some(pending) = slot.as_mut() else {
                    return;
                };
                let waker = waker_ref(self);
                let mut cx = Context::from_waker(&waker);
                let poll = pending.future.as_mut().poll(&mut cx);
                match poll {
                    Poll::Ready(output) => slot.take().map(|p| (output, p.then)),
                    Poll::Pending => None,
                }
            };

            if let Some((output, then)) = ready {
                self.state.store(DONE, Ordering::Release);
                then(output);
                return;
            }

            match self
                .state
                .compare_exchange(POLLING, IDLE, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return,
                // Woken mid-poll: go around again.
                Err(_) => self.state.store(POLLING, Ordering::Release),
            }
        }
    }
}

impl<T: Send + 'static> ArcWake for Settle<T> {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        let mut state = arc_self.state.load(Ordering::Acquire);
        loop {
            let next = match state {
                IDLE => POLLING,
                POLLING => NOTIFIED,
                _ => return,
            };
            match arc_self
                .state
                .compare_exchange(state, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) if next == POLLING => {
                    arc_self.run();
                    return;
                }
                Ok(_) => return,
                Err(actual) => state = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::oneshot;
    use std::{sync::mpsc, thread, time::Duration};

    #[test]
    fn ready_future_settles_inline() {
        let (tx, rx) = mpsc::channel();
        settle(async { 7 }, move |v| tx.send(v).unwrap());
        assert_eq!(rx.try_recv(), Ok(7));
    }

    #[test]
    fn pending_future_settles_on_the_waking_thread() {
        let (gate_tx, gate_rx) = oneshot::channel::<u32>();
        let (tx, rx) = mpsc::channel();

        settle(async move { gate_rx.await.unwrap_or(0) + 1 }, move |v| {
            tx.send(v).unwrap()
        });
        assert!(rx.try_recv().is_err());

        thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            gate_tx.send(41).unwrap();
        });
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(42));
    }

    #[test]
    fn self_wake_during_poll_is_repolled() {
        let mut yielded = false;
        let future = futures::future::poll_fn(move |cx| {
            if yielded {
                Poll::Ready("done")
            } else {
                yielded = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        });

        let (tx, rx) = mpsc::channel();
        settle(future, move |v| tx.send(v).unwrap());
        assert_eq!(rx.try_recv(), Ok("done"));
    }
}
