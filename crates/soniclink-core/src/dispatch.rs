//! Command dispatch for the remotely invokable operations.
//!
//! Every operation that touches Sonic Pi runs the same preamble: probe
//! the process, check the binding, then run the backend call inside a
//! failure boundary that folds any fault into a plain-text result. The
//! result channel is string-typed end to end; callers never see
//! structured errors, and no failure here is fatal to the process.
//!
//! Playback ordering under concurrent calls is owned by Sonic Pi: the
//! dispatcher imposes no lock, and concurrent `run`/`stop` land in
//! whatever order the UDP datagrams arrive. Known limitation.

use rosc::OscType;
use std::sync::Arc;
use thiserror::Error;

use crate::backend::{Backend, Binding};
use crate::catalog;
use crate::probe::LivenessProbe;

/// Fixed cue announcing that freshly submitted code is live.
///
/// Loops can wait on it with `sync "/osc*/trigger/prophet"`.
pub const RUN_CUE_ADDRESS: &str = "/trigger/prophet";
/// Arguments carried by the run cue (note, cutoff, sustain).
pub const RUN_CUE_ARGS: [i32; 3] = [70, 100, 8];

/// Result when the liveness probe says Sonic Pi is down.
pub const MSG_NOT_RUNNING: &str =
    "Error: Sonic Pi does not appear to be running. Please start Sonic Pi first.";
/// Result when the control link never came up.
pub const MSG_LINK_UNAVAILABLE: &str =
    "Error: the Sonic Pi control link is not initialized. Check Sonic Pi status.";
/// Success confirmation for `run`.
pub const MSG_CODE_RUNNING: &str =
    "Code is now running. If you don't hear anything, check Sonic Pi for errors.";
/// Success confirmation for `stop`.
pub const MSG_STOPPED: &str = "Music stopped";

/// Why a dispatch operation could not produce a success confirmation.
///
/// Rendered via `Display` into the exact text returned to callers;
/// nothing structured crosses the dispatch boundary.
#[derive(Debug, Error)]
enum DispatchError {
    #[error("{}", MSG_NOT_RUNNING)]
    EngineUnreachable,
    #[error("{}", MSG_LINK_UNAVAILABLE)]
    LinkUnavailable,
    #[error("Error {operation}: {source}")]
    BackendCall {
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

/// The dispatch surface exposed to the transport layer.
///
/// Holds the process-wide binding and probe as injected dependencies so
/// tests can substitute stubs without process-wide side effects.
pub struct Dispatcher {
    binding: Binding,
    probe: Arc<dyn LivenessProbe>,
    host: String,
}

impl Dispatcher {
    /// Create a dispatcher over the given binding and probe.
    ///
    /// `host` is where the handshake points the control channel
    /// (normally "127.0.0.1").
    pub fn new(binding: Binding, probe: Arc<dyn LivenessProbe>, host: impl Into<String>) -> Self {
        Self {
            binding,
            probe,
            host: host.into(),
        }
    }

    /// Gate shared by every backend-touching operation: liveness first,
    /// then binding. Neither failure attempts any backend call.
    fn backend(&self) -> Result<&Arc<dyn Backend>, DispatchError> {
        if !self.probe.is_running() {
            log::warn!("Sonic Pi does not appear to be running");
            return Err(DispatchError::EngineUnreachable);
        }
        match &self.binding {
            Binding::Bound(backend) => Ok(backend),
            Binding::Unbound(reason) => {
                log::error!("Sonic Pi control link unavailable: {}", reason);
                Err(DispatchError::LinkUnavailable)
            }
        }
    }

    fn render(result: Result<String, DispatchError>) -> String {
        match result {
            Ok(text) => text,
            Err(e) => {
                if let DispatchError::BackendCall { .. } = e {
                    log::error!("{}", e);
                }
                e.to_string()
            }
        }
    }

    /// `initialize`: run the handshake, then return the briefing text
    /// that primes the caller with chord and rhythm vocabulary.
    pub fn initialize(&self) -> String {
        Self::render(self.try_initialize())
    }

    fn try_initialize(&self) -> Result<String, DispatchError> {
        let backend = self.backend()?;
        backend
            .configure(&self.host)
            .map_err(|source| DispatchError::BackendCall {
                operation: "initializing server",
                source,
            })?;
        Ok(catalog::BRIEFING.to_string())
    }

    /// `run`: stop whatever is playing, submit `code`, emit the run cue.
    ///
    /// Strictly ordered; each step completes or fails before the next
    /// begins, and a failure anywhere (the cue included) fails the whole
    /// call. Musical validity of `code` is Sonic Pi's concern: success
    /// here means the submission was delivered, nothing more.
    pub fn run(&self, code: &str) -> String {
        Self::render(self.try_run(code))
    }

    fn try_run(&self, code: &str) -> Result<String, DispatchError> {
        let backend = self.backend()?;
        let submit = || -> anyhow::Result<()> {
            backend.stop_all()?;
            backend.run_code(code)?;
            let args = RUN_CUE_ARGS.iter().copied().map(OscType::Int).collect();
            backend.cue(RUN_CUE_ADDRESS, args)?;
            Ok(())
        };
        submit().map_err(|source| DispatchError::BackendCall {
            operation: "running code",
            source,
        })?;
        Ok(MSG_CODE_RUNNING.to_string())
    }

    /// `stop`: stop everything currently playing.
    ///
    /// Idempotent: stopping silence is not an error.
    pub fn stop(&self) -> String {
        Self::render(self.try_stop())
    }

    fn try_stop(&self) -> Result<String, DispatchError> {
        let backend = self.backend()?;
        backend
            .stop_all()
            .map_err(|source| DispatchError::BackendCall {
                operation: "stopping music",
                source,
            })?;
        Ok(MSG_STOPPED.to_string())
    }

    /// `get_beat_pattern`: pure catalog lookup.
    ///
    /// Bypasses the liveness and binding gates entirely; must succeed
    /// even when Sonic Pi is unreachable.
    pub fn get_beat_pattern(&self, style: &str) -> String {
        catalog::get_pattern(style)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("binding", &self.binding)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Configure(String),
        StopAll,
        Run(String),
        Cue(String, Vec<OscType>),
    }

    /// Backend stub that records every invocation, with per-operation
    /// failure switches.
    #[derive(Default)]
    struct RecordingBackend {
        calls: Mutex<Vec<Call>>,
        fail_configure: bool,
        fail_run: bool,
        fail_cue: bool,
    }

    impl RecordingBackend {
        fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().expect("not poisoned").clone()
        }

        fn record(&self, call: Call) {
            self.calls.lock().expect("not poisoned").push(call);
        }
    }

    impl Backend for RecordingBackend {
        fn configure(&self, host: &str) -> anyhow::Result<()> {
            self.record(Call::Configure(host.to_string()));
            if self.fail_configure {
                bail!("log file missing");
            }
            Ok(())
        }

        fn run_code(&self, code: &str) -> anyhow::Result<()> {
            self.record(Call::Run(code.to_string()));
            if self.fail_run {
                bail!("socket closed");
            }
            Ok(())
        }

        fn stop_all(&self) -> anyhow::Result<()> {
            self.record(Call::StopAll);
            Ok(())
        }

        fn cue(&self, address: &str, args: Vec<OscType>) -> anyhow::Result<()> {
            self.record(Call::Cue(address.to_string(), args));
            if self.fail_cue {
                bail!("cue port unreachable");
            }
            Ok(())
        }
    }

    struct FixedProbe(bool);

    impl LivenessProbe for FixedProbe {
        fn is_running(&self) -> bool {
            self.0
        }
    }

    fn dispatcher(backend: Arc<RecordingBackend>, running: bool) -> Dispatcher {
        Dispatcher::new(
            Binding::Bound(backend),
            Arc::new(FixedProbe(running)),
            "127.0.0.1",
        )
    }

    #[test]
    fn test_not_running_blocks_every_gated_operation() {
        let backend = RecordingBackend::new();
        let d = dispatcher(backend.clone(), false);

        assert_eq!(d.initialize(), MSG_NOT_RUNNING);
        assert_eq!(d.run("play 60"), MSG_NOT_RUNNING);
        assert_eq!(d.stop(), MSG_NOT_RUNNING);
        // The gate rejected the calls before any backend invocation.
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_unbound_link_reported_distinctly() {
        let d = Dispatcher::new(
            Binding::Unbound("socket bind failed".to_string()),
            Arc::new(FixedProbe(true)),
            "127.0.0.1",
        );

        assert_eq!(d.initialize(), MSG_LINK_UNAVAILABLE);
        assert_eq!(d.run("play 60"), MSG_LINK_UNAVAILABLE);
        assert_eq!(d.stop(), MSG_LINK_UNAVAILABLE);
        assert_ne!(MSG_LINK_UNAVAILABLE, MSG_NOT_RUNNING);
    }

    #[test]
    fn test_get_beat_pattern_ignores_probe_and_binding() {
        let d = Dispatcher::new(
            Binding::Unbound("never came up".to_string()),
            Arc::new(FixedProbe(false)),
            "127.0.0.1",
        );

        let pattern = d.get_beat_pattern("blues");
        assert!(pattern.contains("live_loop"));
    }

    #[test]
    fn test_get_beat_pattern_case_insensitive() {
        let backend = RecordingBackend::new();
        let d = dispatcher(backend, true);

        let lower = d.get_beat_pattern("blues");
        assert_eq!(d.get_beat_pattern("BLUES"), lower);
        assert_eq!(d.get_beat_pattern("Blues"), lower);
    }

    #[test]
    fn test_get_beat_pattern_miss_lists_styles() {
        let backend = RecordingBackend::new();
        let d = dispatcher(backend, true);

        let msg = d.get_beat_pattern("waltz");
        assert!(msg.contains("waltz"));
        for name in catalog::style_names() {
            assert!(msg.contains(name));
        }
    }

    #[test]
    fn test_run_orders_stop_submit_cue() {
        let backend = RecordingBackend::new();
        let d = dispatcher(backend.clone(), true);

        assert_eq!(d.run("play 60"), MSG_CODE_RUNNING);
        assert_eq!(
            backend.calls(),
            vec![
                Call::StopAll,
                Call::Run("play 60".to_string()),
                Call::Cue(
                    RUN_CUE_ADDRESS.to_string(),
                    vec![OscType::Int(70), OscType::Int(100), OscType::Int(8)],
                ),
            ]
        );
    }

    #[test]
    fn test_stop_is_idempotent() {
        let backend = RecordingBackend::new();
        let d = dispatcher(backend.clone(), true);

        assert_eq!(d.stop(), MSG_STOPPED);
        assert_eq!(d.stop(), MSG_STOPPED);
        assert_eq!(backend.calls(), vec![Call::StopAll, Call::StopAll]);
    }

    #[test]
    fn test_failing_submission_is_reported_not_propagated() {
        let backend = Arc::new(RecordingBackend {
            fail_run: true,
            ..Default::default()
        });
        let d = dispatcher(backend, true);

        let result = d.run("play 60");
        assert!(result.contains("Error"));
        assert!(result.contains("socket closed"));
    }

    #[test]
    fn test_failing_cue_fails_the_whole_run() {
        let backend = Arc::new(RecordingBackend {
            fail_cue: true,
            ..Default::default()
        });
        let d = dispatcher(backend.clone(), true);

        let result = d.run("play 60");
        assert!(result.contains("Error running code"));
        assert!(result.contains("cue port unreachable"));
        // The stop and submission still happened, in order.
        assert_eq!(backend.calls()[0], Call::StopAll);
        assert_eq!(backend.calls()[1], Call::Run("play 60".to_string()));
    }

    #[test]
    fn test_initialize_handshakes_then_briefs() {
        let backend = RecordingBackend::new();
        let d = dispatcher(backend.clone(), true);

        let result = d.initialize();
        assert_eq!(result, catalog::BRIEFING);
        assert_eq!(
            backend.calls(),
            vec![Call::Configure("127.0.0.1".to_string())]
        );
    }

    #[test]
    fn test_failed_handshake_reported_per_call() {
        let backend = Arc::new(RecordingBackend {
            fail_configure: true,
            ..Default::default()
        });
        let d = dispatcher(backend.clone(), true);

        let result = d.initialize();
        assert!(result.contains("Error initializing server"));
        assert!(result.contains("log file missing"));

        // The binding itself is untouched: later calls still reach the
        // backend instead of reporting an unavailable link.
        assert_eq!(d.stop(), MSG_STOPPED);
    }
}
