//! Mode transitions: render, persist, restart, then advertise.
//!
//! ## Transition order
//!
//! 1. Requested mode equals the advertised mode: return `Unchanged`, touch nothing.
//! 2. Render the document for the requested mode.
//! 3. Back up and replace the config file ([`ConfigStore::write`]).
//! 4. Restart the service, up to `restart_attempts` times.
//! 5. Only now flip the advertised mode.
//!
//! A failure at any step leaves the advertised mode as it was. After a restart
//! failure the file is either kept or rolled back according to
//! [`OnRestartFailure`].
//!
//! Transitions are serialized by an internal gate held across steps 1-5, so two
//! concurrent requests never interleave their write/restart pairs. Reading the
//! advertised mode never waits on the gate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use nightcam_core::{Mode, OnRestartFailure, Settings};
use nightcam_renderer::ConfigRenderer;

use crate::drift::{self, DriftSignal};
use crate::error::{ConfigAfterFailure, RestartError, SwitchError, TransitionError};
use crate::service::ServiceController;
use crate::writer::{ConfigStore, WriteReport};

/// Result of a successful [`Orchestrator::set_mode`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Already in the requested mode; nothing was written or restarted.
    Unchanged { mode: Mode },
    /// Config written, service restarted, mode advertised.
    Switched { from: Mode, to: Mode },
}

impl Transition {
    /// The advertised mode after the call.
    pub fn mode(&self) -> Mode {
        match self {
            Transition::Unchanged { mode } => *mode,
            Transition::Switched { to, .. } => *to,
        }
    }

    pub fn changed(&self) -> bool {
        matches!(self, Transition::Switched { .. })
    }
}

/// Owns the advertised mode and performs transitions.
pub struct Orchestrator {
    renderer: ConfigRenderer,
    store: ConfigStore,
    controller: Arc<dyn ServiceController>,
    service: String,
    policy: OnRestartFailure,
    restart_attempts: u32,
    night: AtomicBool,
    gate: Mutex<()>,
}

impl Orchestrator {
    /// Build from settings. The advertised mode starts at [`Mode::Day`] regardless
    /// of what the config file holds.
    pub fn from_settings(
        settings: &Settings,
        controller: Arc<dyn ServiceController>,
    ) -> Result<Self, SwitchError> {
        let renderer = ConfigRenderer::new(settings.media_path.as_str())?;
        let store = ConfigStore::new(&settings.config_path, &settings.backup_suffix);
        Ok(Self {
            renderer,
            store,
            controller,
            service: settings.service.clone(),
            policy: settings.on_restart_failure,
            restart_attempts: settings.restart_attempts.max(1),
            night: AtomicBool::new(false),
            gate: Mutex::new(()),
        })
    }

    /// Currently advertised mode.
    pub fn mode(&self) -> Mode {
        Mode::from_night_enabled(self.night.load(Ordering::Acquire))
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn renderer(&self) -> &ConfigRenderer {
        &self.renderer
    }

    /// `true` selects night, `false` selects day.
    pub fn set_night_mode(&self, enabled: bool) -> Result<Transition, TransitionError> {
        self.set_mode(Mode::from_night_enabled(enabled))
    }

    /// Transition to `target`. See the module docs for ordering and failure rules.
    pub fn set_mode(&self, target: Mode) -> Result<Transition, TransitionError> {
        // The guarded value is `()`, so a poisoned gate carries no broken state.
        let _gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);

        let current = self.mode();
        if current == target {
            tracing::debug!(mode = %target, "already in requested mode");
            return Ok(Transition::Unchanged { mode: target });
        }

        let document = self
            .renderer
            .render_mode(target)
            .map_err(|source| TransitionError::Render {
                mode: target,
                source,
            })?;

        let report = self.store.write(&document).map_err(|err| {
            tracing::error!(error = %err, mode = %target, "config write failed");
            err
        })?;

        if let Err(source) = self.restart_with_retries() {
            let config = self.apply_failure_policy(&report);
            tracing::error!(
                error = %source,
                service = %self.service,
                %config,
                advertised = %current,
                "restart failed, mode unchanged",
            );
            return Err(TransitionError::Restart {
                service: self.service.clone(),
                source,
                config,
            });
        }

        self.night.store(target.is_night(), Ordering::Release);
        tracing::info!(from = %current, to = %target, "mode switched");
        Ok(Transition::Switched {
            from: current,
            to: target,
        })
    }

    /// Compare the config file with the document for the advertised mode.
    pub fn drift(&self) -> Result<DriftSignal, SwitchError> {
        drift::check(&self.renderer, self.mode(), self.store.path())
    }

    fn restart_with_retries(&self) -> Result<(), RestartError> {
        let mut attempt = 1;
        loop {
            match self.controller.restart(&self.service) {
                Ok(()) => return Ok(()),
                Err(err) if attempt < self.restart_attempts => {
                    tracing::warn!(
                        error = %err,
                        attempt,
                        of = self.restart_attempts,
                        "restart attempt failed, retrying",
                    );
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn apply_failure_policy(&self, report: &WriteReport) -> ConfigAfterFailure {
        match self.policy {
            OnRestartFailure::Keep => ConfigAfterFailure::Kept,
            OnRestartFailure::Rollback => match self.store.roll_back(report) {
                Ok(()) => ConfigAfterFailure::RolledBack,
                Err(err) => ConfigAfterFailure::RollbackFailed(err.to_string()),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Barrier;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Records every restart; fails the first `fail_first` calls.
    #[derive(Default)]
    struct FakeController {
        calls: AtomicUsize,
        fail_first: usize,
    }

    impl FakeController {
        fn failing(n: usize) -> Self {
            Self {
                fail_first: n,
                ..Self::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ServiceController for FakeController {
        fn restart(&self, unit: &str) -> Result<(), RestartError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first {
                return Err(RestartError::Failed {
                    command: format!("systemctl restart {unit}"),
                    status: "exit status: 1".to_string(),
                    output: "simulated".to_string(),
                });
            }
            Ok(())
        }
    }

    fn settings(tmp: &TempDir) -> Settings {
        Settings {
            config_path: tmp.path().join("mediamtx.yml"),
            ..Settings::default()
        }
    }

    fn orchestrator(settings: &Settings, ctl: Arc<FakeController>) -> Orchestrator {
        Orchestrator::from_settings(settings, ctl).unwrap()
    }

    fn rendered(settings: &Settings, mode: Mode) -> String {
        ConfigRenderer::new(settings.media_path.as_str())
            .unwrap()
            .render_mode(mode)
            .unwrap()
            .into_string()
    }

    #[test]
    fn starts_in_day_mode() {
        let tmp = TempDir::new().unwrap();
        let orch = orchestrator(&settings(&tmp), Arc::new(FakeController::default()));
        assert_eq!(orch.mode(), Mode::Day);
    }

    #[test]
    fn switch_writes_restarts_and_advertises() {
        let tmp = TempDir::new().unwrap();
        let s = settings(&tmp);
        let ctl = Arc::new(FakeController::default());
        let orch = orchestrator(&s, ctl.clone());

        let t = orch.set_night_mode(true).unwrap();
        assert_eq!(
            t,
            Transition::Switched {
                from: Mode::Day,
                to: Mode::Night
            }
        );
        assert_eq!(orch.mode(), Mode::Night);
        assert_eq!(ctl.calls(), 1);
        assert_eq!(
            std::fs::read_to_string(&s.config_path).unwrap(),
            rendered(&s, Mode::Night)
        );
        assert!(orch.drift().unwrap().is_current());
    }

    #[test]
    fn same_mode_is_a_no_op() {
        let tmp = TempDir::new().unwrap();
        let s = settings(&tmp);
        let ctl = Arc::new(FakeController::default());
        let orch = orchestrator(&s, ctl.clone());

        let t = orch.set_mode(Mode::Day).unwrap();
        assert!(!t.changed());
        assert_eq!(t.mode(), Mode::Day);
        assert_eq!(ctl.calls(), 0);
        assert!(!s.config_path.exists(), "no write for an unchanged mode");

        orch.set_mode(Mode::Night).unwrap();
        let before = std::fs::metadata(&s.config_path).unwrap().modified().unwrap();
        let t = orch.set_mode(Mode::Night).unwrap();
        assert_eq!(t, Transition::Unchanged { mode: Mode::Night });
        assert_eq!(ctl.calls(), 1);
        let after = std::fs::metadata(&s.config_path).unwrap().modified().unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn second_switch_backs_up_first_document() {
        let tmp = TempDir::new().unwrap();
        let s = settings(&tmp);
        let orch = orchestrator(&s, Arc::new(FakeController::default()));

        orch.set_mode(Mode::Night).unwrap();
        orch.set_mode(Mode::Day).unwrap();
        assert_eq!(
            std::fs::read_to_string(s.backup_path()).unwrap(),
            rendered(&s, Mode::Night)
        );
        assert_eq!(
            std::fs::read_to_string(&s.config_path).unwrap(),
            rendered(&s, Mode::Day)
        );
    }

    #[test]
    fn restart_failure_keeps_mode_and_new_file() {
        let tmp = TempDir::new().unwrap();
        let s = settings(&tmp);
        let ctl = Arc::new(FakeController::failing(usize::MAX));
        let orch = orchestrator(&s, ctl.clone());

        let err = orch.set_night_mode(true).unwrap_err();
        match &err {
            TransitionError::Restart { service, config, .. } => {
                assert_eq!(service, "baby-monitor");
                assert_eq!(*config, ConfigAfterFailure::Kept);
            }
            other => panic!("expected Restart, got {other}"),
        }
        assert_eq!(orch.mode(), Mode::Day);
        // The document on disk is ahead of the advertised mode.
        assert_eq!(
            std::fs::read_to_string(&s.config_path).unwrap(),
            rendered(&s, Mode::Night)
        );
        assert!(!orch.drift().unwrap().is_current());
    }

    #[test]
    fn restart_failure_with_rollback_restores_previous() {
        let tmp = TempDir::new().unwrap();
        let s = Settings {
            on_restart_failure: OnRestartFailure::Rollback,
            ..settings(&tmp)
        };
        std::fs::write(&s.config_path, rendered(&s, Mode::Day)).unwrap();
        let orch = orchestrator(&s, Arc::new(FakeController::failing(usize::MAX)));

        let err = orch.set_mode(Mode::Night).unwrap_err();
        assert!(matches!(
            err,
            TransitionError::Restart {
                config: ConfigAfterFailure::RolledBack,
                ..
            }
        ));
        assert_eq!(orch.mode(), Mode::Day);
        assert_eq!(
            std::fs::read_to_string(&s.config_path).unwrap(),
            rendered(&s, Mode::Day)
        );
        assert!(orch.drift().unwrap().is_current());
    }

    #[test]
    fn retries_until_an_attempt_succeeds() {
        let tmp = TempDir::new().unwrap();
        let s = Settings {
            restart_attempts: 3,
            ..settings(&tmp)
        };
        let ctl = Arc::new(FakeController::failing(2));
        let orch = orchestrator(&s, ctl.clone());

        orch.set_mode(Mode::Night).unwrap();
        assert_eq!(ctl.calls(), 3);
        assert_eq!(orch.mode(), Mode::Night);
    }

    #[test]
    fn retries_are_bounded() {
        let tmp = TempDir::new().unwrap();
        let s = Settings {
            restart_attempts: 2,
            ..settings(&tmp)
        };
        let ctl = Arc::new(FakeController::failing(usize::MAX));
        let orch = orchestrator(&s, ctl.clone());

        assert!(orch.set_mode(Mode::Night).is_err());
        assert_eq!(ctl.calls(), 2);
    }

    #[test]
    fn failed_restart_can_be_retried_by_caller() {
        let tmp = TempDir::new().unwrap();
        let s = settings(&tmp);
        let ctl = Arc::new(FakeController::failing(1));
        let orch = orchestrator(&s, ctl.clone());

        assert!(orch.set_mode(Mode::Night).is_err());
        assert_eq!(orch.mode(), Mode::Day);
        orch.set_mode(Mode::Night).unwrap();
        assert_eq!(orch.mode(), Mode::Night);
        assert_eq!(ctl.calls(), 2);
    }

    #[test]
    #[cfg(unix)]
    fn write_failure_skips_restart() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("locked");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o555)).unwrap();

        let s = Settings {
            config_path: dir.join("mediamtx.yml"),
            ..Settings::default()
        };
        let ctl = Arc::new(FakeController::default());
        let orch = orchestrator(&s, ctl.clone());
        let result = orch.set_mode(Mode::Night);

        std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o755)).unwrap();

        // Root ignores directory permissions; only assert when the write was refused.
        if let Err(err) = result {
            assert!(matches!(err, TransitionError::Persist(_)), "got: {err}");
            assert_eq!(ctl.calls(), 0);
            assert_eq!(orch.mode(), Mode::Day);
        }
    }

    /// Reads the config file at restart time and checks no two restarts overlap.
    struct ObservingController {
        path: std::path::PathBuf,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    impl ServiceController for ObservingController {
        fn restart(&self, _unit: &str) -> Result<(), RestartError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            let content = std::fs::read_to_string(&self.path).unwrap_or_default();
            self.seen.lock().unwrap().push(content);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn concurrent_transitions_are_serialized() {
        let tmp = TempDir::new().unwrap();
        let s = settings(&tmp);
        let ctl = Arc::new(ObservingController {
            path: s.config_path.clone(),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        });
        let orch = Arc::new(Orchestrator::from_settings(&s, ctl.clone()).unwrap());

        let barrier = Arc::new(Barrier::new(4));
        let handles: Vec<_> = [true, false, true, false]
            .into_iter()
            .map(|night| {
                let orch = Arc::clone(&orch);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    orch.set_night_mode(night)
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap().unwrap();
        }

        assert_eq!(ctl.max_in_flight.load(Ordering::SeqCst), 1);

        // Each restart observed a complete document, and the last one observed
        // the document for the mode that ended up advertised.
        let seen = ctl.seen.lock().unwrap();
        let day = rendered(&s, Mode::Day);
        let night = rendered(&s, Mode::Night);
        for content in seen.iter() {
            assert!(*content == day || *content == night);
        }
        let last = seen.last().expect("at least one restart");
        assert_eq!(*last, rendered(&s, orch.mode()));
        assert_eq!(std::fs::read_to_string(&s.config_path).unwrap(), *last);
    }
}
