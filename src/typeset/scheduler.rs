// Copyright (c) 2025 Qatex Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Qatex contributors

use std::{cell::RefCell, rc::Rc, time::Duration};

use tracing::{debug, info, warn};

use crate::config::Typeset;

use super::{
    engine::TypesetEngine,
    machine::{Completion, Delay, Elapsed, Phase, TypesetMachine},
};

struct Inner<E> {
    machine: RefCell<TypesetMachine>,
    delay: Duration,
    engine: E,
}

/// Drives a [`TypesetMachine`] with tokio timers and a real engine.
///
/// One scheduler belongs to one display surface. All tasks are spawned with
/// [`tokio::task::spawn_local`], so triggers must come from inside a
/// [`tokio::task::LocalSet`].
pub struct TypesetScheduler<E> {
    inner: Rc<Inner<E>>,
}

impl<E> Clone for TypesetScheduler<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E: TypesetEngine + 'static> TypesetScheduler<E> {
    pub fn new(engine: E, delay: Duration, retries: u8) -> Self {
        Self {
            inner: Rc::new(Inner {
                machine: RefCell::new(TypesetMachine::new(retries)),
                delay,
                engine,
            }),
        }
    }

    pub fn from_config(engine: E, typeset: &Typeset) -> Self {
        Self::new(engine, typeset.debounce(), typeset.retries)
    }

    pub fn engine(&self) -> &E {
        &self.inner.engine
    }

    pub fn phase(&self) -> Phase {
        self.inner.machine.borrow().phase()
    }

    pub fn is_idle(&self) -> bool {
        self.phase() == Phase::Idle
    }

    pub fn trigger(&self) {
        let delay = self.inner.machine.borrow_mut().trigger();
        self.arm(delay);
    }

    /// Resolves once no delay is armed and no engine call is in flight.
    pub async fn settle(&self) {
        let poll = self.inner.delay.max(Duration::from_millis(1));
        while !self.is_idle() {
            tokio::time::sleep(poll).await;
        }
    }

    fn arm(&self, delay: Delay) {
        let this = self.clone();
        tokio::task::spawn_local(async move {
            tokio::time::sleep(this.inner.delay).await;
            this.fire(delay).await;
        });
    }

    async fn fire(&self, delay: Delay) {
        let ready = self.inner.engine.is_ready();
        let elapsed = self.inner.machine.borrow_mut().elapse(delay, ready);
        let Elapsed::Invoke(handle) = elapsed else {
            return;
        };

        let result = self.inner.engine.typeset().await;
        if let Err(err) = &result {
            warn!("typeset failed: {}", err);
            self.inner.engine.clear_cache();
        }

        let completion = self.inner.machine.borrow_mut().complete(handle, result.is_ok());
        match completion {
            Completion::Settled => debug!("typeset finished"),
            Completion::Recovered => info!("typeset succeeded on retry"),
            Completion::Retry(delay) => {
                debug!("retrying typeset with a cleared cache");
                self.arm(delay);
            }
            Completion::GaveUp => warn!("typeset failed after retrying, waiting for the next update"),
        }
    }
}
