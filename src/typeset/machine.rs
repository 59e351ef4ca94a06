// Copyright (c) 2025 Qatex Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Qatex contributors

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Debouncing,
    InFlight,
}

/// Ticket for one armed debounce delay. Only the newest ticket may fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delay {
    generation: u64,
}

/// Identifies the single engine call currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elapsed {
    /// A later trigger re-armed the delay.
    Superseded,
    /// An operation is already in flight and covers the latest content.
    Covered,
    /// The engine cannot take calls yet.
    EngineNotReady,
    Invoke(OperationHandle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Settled,
    /// Succeeded after at least one failed attempt in this chain.
    Recovered,
    /// Failed with retries left; the delay is already re-armed.
    Retry(Delay),
    GaveUp,
}

/// Single-flight typeset protocol without timers or an engine attached.
///
/// The driver calls [`trigger`](Self::trigger) on every mount/update signal,
/// [`elapse`](Self::elapse) when a delay fires and
/// [`complete`](Self::complete) when the engine call settles.
#[derive(Debug)]
pub struct TypesetMachine {
    generation: u64,
    armed: Option<u64>,
    handle: Option<OperationHandle>,
    next_handle: u64,
    retries: u8,
    retries_left: u8,
}

impl TypesetMachine {
    pub fn new(retries: u8) -> Self {
        Self {
            generation: 0,
            armed: None,
            handle: None,
            next_handle: 0,
            retries,
            retries_left: retries,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.handle.is_some() {
            Phase::InFlight
        } else if self.armed.is_some() {
            Phase::Debouncing
        } else {
            Phase::Idle
        }
    }

    pub fn handle(&self) -> Option<OperationHandle> {
        self.handle
    }

    /// A mount/update signal. Unless a call is in flight, this starts a new
    /// chain with the full retry budget.
    pub fn trigger(&mut self) -> Delay {
        if self.handle.is_none() {
            self.retries_left = self.retries;
        }
        self.arm()
    }

    fn arm(&mut self) -> Delay {
        self.generation += 1;
        self.armed = Some(self.generation);
        debug!(generation = self.generation, phase = ?self.phase(), "typeset triggered");
        Delay {
            generation: self.generation,
        }
    }

    pub fn elapse(&mut self, delay: Delay, engine_ready: bool) -> Elapsed {
        if self.armed != Some(delay.generation) {
            return Elapsed::Superseded;
        }
        self.armed = None;

        if self.handle.is_some() {
            debug!("typeset already in flight");
            return Elapsed::Covered;
        }
        if !engine_ready {
            debug!("typeset engine not ready, leaving first typeset to the page");
            self.retries_left = self.retries;
            return Elapsed::EngineNotReady;
        }

        self.next_handle += 1;
        let handle = OperationHandle(self.next_handle);
        self.handle = Some(handle);
        Elapsed::Invoke(handle)
    }

    /// Settles `handle`. A completion for a handle that is not the stored
    /// one is ignored.
    pub fn complete(&mut self, handle: OperationHandle, succeeded: bool) -> Completion {
        if self.handle != Some(handle) {
            return Completion::Settled;
        }
        self.handle = None;

        if succeeded {
            let recovered = self.retries_left < self.retries;
            self.retries_left = self.retries;
            return if recovered {
                Completion::Recovered
            } else {
                Completion::Settled
            };
        }
        if self.retries_left == 0 {
            self.retries_left = self.retries;
            return Completion::GaveUp;
        }
        self.retries_left -= 1;
        Completion::Retry(self.arm())
    }
}

impl Default for TypesetMachine {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoke(machine: &mut TypesetMachine, delay: Delay) -> OperationHandle {
        match machine.elapse(delay, true) {
            Elapsed::Invoke(handle) => handle,
            other => panic!("expected an engine call, got {other:?}"),
        }
    }

    #[test]
    fn test_triggers_collapse() {
        let mut machine = TypesetMachine::default();
        let delays: Vec<Delay> = (0..5).map(|_| machine.trigger()).collect();
        assert_eq!(machine.phase(), Phase::Debouncing);

        let fired: Vec<Elapsed> = delays.iter().map(|d| machine.elapse(*d, true)).collect();
        let invoked = fired
            .iter()
            .filter(|e| matches!(e, Elapsed::Invoke(_)))
            .count();
        assert_eq!(invoked, 1);
        assert_eq!(machine.phase(), Phase::InFlight);
    }

    #[test]
    fn test_trigger_while_in_flight_is_covered() {
        let mut machine = TypesetMachine::default();
        let first = machine.trigger();
        let handle = invoke(&mut machine, first);

        let second = machine.trigger();
        assert_eq!(machine.phase(), Phase::InFlight);
        assert_eq!(machine.elapse(second, true), Elapsed::Covered);

        assert_eq!(machine.complete(handle, true), Completion::Settled);
        assert_eq!(machine.phase(), Phase::Idle);
    }

    #[test]
    fn test_delay_armed_during_flight_fires_after() {
        let mut machine = TypesetMachine::default();
        let first = machine.trigger();
        let handle = invoke(&mut machine, first);
        let second = machine.trigger();

        machine.complete(handle, true);
        assert_eq!(machine.phase(), Phase::Debouncing);
        invoke(&mut machine, second);
    }

    #[test]
    fn test_engine_not_ready() {
        let mut machine = TypesetMachine::default();
        let delay = machine.trigger();
        assert_eq!(machine.elapse(delay, false), Elapsed::EngineNotReady);
        assert_eq!(machine.phase(), Phase::Idle);
        assert_eq!(machine.handle(), None);
    }

    #[test]
    fn test_single_retry_then_idle() {
        let mut machine = TypesetMachine::new(1);
        let delay = machine.trigger();
        let handle = invoke(&mut machine, delay);

        let Completion::Retry(retry) = machine.complete(handle, false) else {
            panic!("expected a retry");
        };
        assert_eq!(machine.handle(), None);
        assert_eq!(machine.phase(), Phase::Debouncing);

        let handle = invoke(&mut machine, retry);
        assert_eq!(machine.complete(handle, false), Completion::GaveUp);
        assert_eq!(machine.phase(), Phase::Idle);

        // A fresh chain gets its retry back.
        let delay = machine.trigger();
        let handle = invoke(&mut machine, delay);
        assert!(matches!(machine.complete(handle, false), Completion::Retry(_)));
    }

    #[test]
    fn test_retry_budget_restored_when_engine_not_ready() {
        let mut machine = TypesetMachine::new(1);
        let delay = machine.trigger();
        let handle = invoke(&mut machine, delay);
        let Completion::Retry(retry) = machine.complete(handle, false) else {
            panic!("expected a retry");
        };
        assert_eq!(machine.elapse(retry, false), Elapsed::EngineNotReady);
        assert_eq!(machine.phase(), Phase::Idle);

        let delay = machine.trigger();
        let handle = invoke(&mut machine, delay);
        assert!(matches!(machine.complete(handle, false), Completion::Retry(_)));
    }

    #[test]
    fn test_new_trigger_replacing_retry_gets_full_budget() {
        let mut machine = TypesetMachine::new(1);
        let delay = machine.trigger();
        let handle = invoke(&mut machine, delay);
        let Completion::Retry(retry) = machine.complete(handle, false) else {
            panic!("expected a retry");
        };

        let delay = machine.trigger();
        assert_eq!(machine.elapse(retry, true), Elapsed::Superseded);
        let handle = invoke(&mut machine, delay);
        assert!(matches!(machine.complete(handle, false), Completion::Retry(_)));
    }

    #[test]
    fn test_retry_success_converges_to_idle() {
        let mut machine = TypesetMachine::new(1);
        let delay = machine.trigger();
        let handle = invoke(&mut machine, delay);
        let Completion::Retry(retry) = machine.complete(handle, false) else {
            panic!("expected a retry");
        };
        let handle = invoke(&mut machine, retry);
        assert_eq!(machine.complete(handle, true), Completion::Recovered);
        assert_eq!(machine.phase(), Phase::Idle);
        assert_eq!(machine.handle(), None);
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut machine = TypesetMachine::default();
        let delay = machine.trigger();
        let handle = invoke(&mut machine, delay);
        assert_eq!(
            machine.complete(OperationHandle(99), false),
            Completion::Settled
        );
        assert_eq!(machine.handle(), Some(handle));
    }
}
