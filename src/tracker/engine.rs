use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};
use crate::i18n::{get_messages, Messages};
use crate::tracker::events::TrackerEvent;
use crate::tracker::model::*;
use crate::tracker::steps::{RandomSteps, StepSource};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, watch, Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

/// Owns one advancement timer; dropping it cancels the timer task.
struct TimerHandle(JoinHandle<()>);

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.0.abort();
    }
}

struct TrackerState {
    uploads: Vec<TrackedUpload>,
    timers: HashMap<UploadId, TimerHandle>,
    steps: Box<dyn StepSource>,
}

/// Tracks simulated uploads from intake to completion.
///
/// Clones share the same uploads. Every intake spawns one periodic timer that
/// calls [`Tracker::advance`] until the upload is terminal. Timers hold their
/// own clone, so dropping the handles does not stop them: the owning view
/// calls [`Tracker::shutdown`] or keeps a [`TrackerGuard`] alive.
#[derive(Clone)]
pub struct Tracker {
    config: Arc<TrackerConfig>,
    messages: &'static Messages,
    event_tx: broadcast::Sender<TrackerEvent>,
    state: Arc<Mutex<TrackerState>>,
    closed: Arc<watch::Sender<bool>>,
    idle: Arc<Notify>,
}

/// Closes the tracker when dropped.
pub struct TrackerGuard {
    tracker: Tracker,
}

impl Drop for TrackerGuard {
    fn drop(&mut self) {
        if self.tracker.closed.send_replace(true) {
            return;
        }
        // timers also watch the flag, so a busy lock only delays their exit
        if let Ok(mut state) = self.tracker.state.try_lock() {
            state.timers.clear();
        }
        debug!("tracker guard dropped");
        self.tracker.idle.notify_waiters();
    }
}

impl Tracker {
    pub fn new(config: TrackerConfig) -> Self {
        let steps: Box<dyn StepSource> = match config.seed {
            Some(seed) => Box::new(RandomSteps::seeded(seed)),
            None => Box::new(RandomSteps::from_entropy()),
        };
        Self::with_steps(config, steps)
    }

    pub fn with_steps(config: TrackerConfig, steps: Box<dyn StepSource>) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_capacity.max(1));
        let (closed, _) = watch::channel(false);
        Self {
            messages: get_messages(config.locale),
            config: Arc::new(config),
            event_tx,
            state: Arc::new(Mutex::new(TrackerState {
                uploads: vec![],
                timers: HashMap::new(),
                steps,
            })),
            closed: Arc::new(closed),
            idle: Arc::new(Notify::new()),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
        self.event_tx.subscribe()
    }

    /// Ties the tracker's lifetime to the returned guard.
    pub fn guard(&self) -> TrackerGuard {
        TrackerGuard { tracker: self.clone() }
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    pub async fn intake(&self, file: FileDescriptor) -> Result<UploadId> {
        let ids = self.intake_all(vec![file]).await?;
        Ok(ids[0])
    }

    /// Appends one upload per file, in order, and starts their timers.
    pub async fn intake_all(&self, files: Vec<FileDescriptor>) -> Result<Vec<UploadId>> {
        let mut state = self.state.lock().await;
        if self.is_closed() {
            return Err(TrackerError::Closed);
        }

        let mut ids = Vec::with_capacity(files.len());
        for file in &files {
            let upload = TrackedUpload::from_descriptor(file);
            let upload_id = upload.id;
            debug!(%upload_id, name = %upload.name, size = file.size, mime = %upload.mime_type, "intake");

            let _ = self.event_tx.send(TrackerEvent::UploadAdded {
                upload_id,
                name: upload.name.clone(),
                size_label: upload.size_label.clone(),
                mime_type: upload.mime_type.clone(),
            });
            state.uploads.push(upload);

            if self.config.auto_advance {
                let tracker = self.clone();
                let handle = tokio::spawn(async move {
                    tracker.run_timer(upload_id).await;
                });
                state.timers.insert(upload_id, TimerHandle(handle));
            }
            ids.push(upload_id);
        }

        Ok(ids)
    }

    /// One advancement step for `upload_id`. Nothing moves once the tracker is closed.
    pub async fn advance(&self, upload_id: UploadId) -> Result<AdvanceOutcome> {
        let mut state = self.state.lock().await;
        if self.is_closed() {
            return Err(TrackerError::Closed);
        }
        let TrackerState { uploads, timers, steps } = &mut *state;

        let upload = uploads
            .iter_mut()
            .find(|u| u.id == upload_id)
            .ok_or(TrackerError::UnknownUpload(upload_id))?;

        if upload.status.is_terminal() {
            return Ok(AdvanceOutcome::Settled(upload.status));
        }

        let step = steps.next_step(self.config.max_step);
        let step = if step.is_finite() { step.max(0.0) } else { 0.0 };
        let next = (upload.progress + step).min(100.0);

        if next < 100.0 {
            upload.progress = next;
            trace!(%upload_id, progress = next, "advanced");
            let _ = self.event_tx.send(TrackerEvent::Progress { upload_id, progress: next });
            return Ok(AdvanceOutcome::Progressed(next));
        }

        upload.progress = 100.0;
        upload.status = UploadStatus::Completed;
        upload.extracted_summary = Some(self.messages.extracted_placeholder.to_string());
        info!(%upload_id, name = %upload.name, "upload completed");

        let notification = Notification {
            upload_id,
            title: self.messages.toast_title.to_string(),
            description: self.messages.toast_description_for(&upload.name),
        };

        let _ = self.event_tx.send(TrackerEvent::Progress { upload_id, progress: 100.0 });
        let _ = self.event_tx.send(TrackerEvent::StatusChanged { upload_id, status: UploadStatus::Completed });
        let _ = self.event_tx.send(TrackerEvent::Notification(notification));

        // may be the calling task's own handle; it exits right after this returns
        timers.remove(&upload_id);

        if uploads.iter().all(|u| u.status.is_terminal()) {
            let _ = self.event_tx.send(TrackerEvent::AllSettled);
        }
        if timers.is_empty() {
            self.idle.notify_waiters();
        }

        Ok(AdvanceOutcome::Completed)
    }

    async fn run_timer(&self, upload_id: UploadId) {
        let period = self.config.tick.max(Duration::from_millis(1));
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut closed = self.closed.subscribe();

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = closed.wait_for(|c| *c) => break,
            }
            match self.advance(upload_id).await {
                Ok(AdvanceOutcome::Progressed(_)) => {}
                Ok(AdvanceOutcome::Completed | AdvanceOutcome::Settled(_)) => break,
                Err(TrackerError::Closed) => break,
                Err(e) => {
                    warn!(%upload_id, "advancement timer stopped: {}", e);
                    break;
                }
            }
        }
    }

    /// Snapshot of all uploads in intake order.
    pub async fn uploads(&self) -> Vec<TrackedUpload> {
        self.state.lock().await.uploads.clone()
    }

    #[cfg(test)]
    pub async fn upload(&self, upload_id: UploadId) -> Option<TrackedUpload> {
        let state = self.state.lock().await;
        state.uploads.iter().find(|u| u.id == upload_id).cloned()
    }

    pub async fn active_timers(&self) -> usize {
        self.state.lock().await.timers.len()
    }

    /// Resolves once no advancement timer is running or the tracker is closed.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            if self.is_closed() || self.active_timers().await == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Tears the tracker down: cancels every running timer and rejects further
    /// intake and advancement. Uploads keep their last state. Returns the number
    /// of cancelled timers.
    pub async fn shutdown(&self) -> usize {
        let mut state = self.state.lock().await;
        if self.closed.send_replace(true) {
            return 0;
        }

        let cancelled = state.timers.len();
        state.timers.clear();
        info!(cancelled, "tracker shut down");

        let _ = self.event_tx.send(TrackerEvent::TornDown { cancelled });
        self.idle.notify_waiters();
        cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::steps::{FixedStep, ScriptedSteps};
    use tokio::sync::broadcast::error::TryRecvError;

    fn notes() -> FileDescriptor {
        FileDescriptor::new("notes.pdf", 2_000_000, "application/pdf")
    }

    fn drain(rx: &mut broadcast::Receiver<TrackerEvent>) -> Vec<TrackerEvent> {
        let mut out = vec![];
        loop {
            match rx.try_recv() {
                Ok(e) => out.push(e),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                Err(TryRecvError::Lagged(n)) => panic!("lagged by {n}"),
            }
        }
        out
    }

    fn notifications(events: &[TrackerEvent]) -> Vec<Notification> {
        events
            .iter()
            .filter_map(|e| match e {
                TrackerEvent::Notification(n) => Some(n.clone()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn intake_starts_processing_at_zero() {
        let tracker = Tracker::with_steps(TrackerConfig::manual(), Box::new(FixedStep(10.0)));
        let id = tracker.intake(notes()).await.unwrap();

        let uploads = tracker.uploads().await;
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].id, id);
        assert_eq!(uploads[0].status, UploadStatus::Processing);
        assert_eq!(uploads[0].progress, 0.0);
        assert_eq!(uploads[0].size_label, "1.91 MB");
        assert_eq!(tracker.active_timers().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_drives_upload_to_completion_with_one_notification() {
        let tracker = Tracker::with_steps(TrackerConfig::default(), Box::new(FixedStep(20.0)));
        let mut rx = tracker.subscribe();
        let started = Instant::now();

        let id = tracker.intake(notes()).await.unwrap();
        let first = tracker.upload(id).await.unwrap();
        assert_eq!(first.status, UploadStatus::Processing);
        assert_eq!(first.progress, 0.0);
        assert_eq!(tracker.active_timers().await, 1);

        tracker.wait_idle().await;

        // 0 -> 20 -> 40 -> 60 -> 80 -> 100, one step per 500ms
        assert!(started.elapsed() >= Duration::from_millis(2500));
        let done = tracker.upload(id).await.unwrap();
        assert_eq!(done.status, UploadStatus::Completed);
        assert_eq!(done.progress, 100.0);
        assert_eq!(
            done.extracted_summary.as_deref(),
            Some("Sample extracted text from the document...")
        );
        assert_eq!(tracker.active_timers().await, 0);

        let events = drain(&mut rx);
        let toasts = notifications(&events);
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].upload_id, id);
        assert_eq!(toasts[0].title, "Document processed successfully");
        assert!(toasts[0].description.contains("notes.pdf"));
        assert!(matches!(events.last(), Some(TrackerEvent::AllSettled)));
    }

    #[tokio::test]
    async fn progress_never_decreases_and_stays_in_range() {
        let config = TrackerConfig { seed: Some(99), ..TrackerConfig::manual() };
        let tracker = Tracker::new(config);
        let id = tracker.intake(notes()).await.unwrap();

        let mut last = 0.0;
        for _ in 0..10_000 {
            let outcome = tracker.advance(id).await.unwrap();
            let p = tracker.upload(id).await.unwrap().progress;
            assert!(p >= last, "progress went from {last} to {p}");
            assert!(p <= 100.0);
            last = p;
            if outcome == AdvanceOutcome::Completed {
                break;
            }
        }
        assert_eq!(last, 100.0);
    }

    #[tokio::test]
    async fn negative_steps_do_not_move_progress_back() {
        let tracker = Tracker::with_steps(
            TrackerConfig::manual(),
            Box::new(ScriptedSteps::new([10.0, -5.0, f64::NAN], 1.0)),
        );
        let id = tracker.intake(notes()).await.unwrap();

        assert_eq!(tracker.advance(id).await.unwrap(), AdvanceOutcome::Progressed(10.0));
        assert_eq!(tracker.advance(id).await.unwrap(), AdvanceOutcome::Progressed(10.0));
        assert_eq!(tracker.advance(id).await.unwrap(), AdvanceOutcome::Progressed(10.0));
        assert_eq!(tracker.advance(id).await.unwrap(), AdvanceOutcome::Progressed(11.0));
    }

    #[tokio::test]
    async fn overshooting_step_clamps_to_exactly_100() {
        let tracker = Tracker::with_steps(
            TrackerConfig::manual(),
            Box::new(ScriptedSteps::new([95.0, 15.0], 0.0)),
        );
        let id = tracker.intake(notes()).await.unwrap();

        assert_eq!(tracker.advance(id).await.unwrap(), AdvanceOutcome::Progressed(95.0));
        assert_eq!(tracker.advance(id).await.unwrap(), AdvanceOutcome::Completed);

        let u = tracker.upload(id).await.unwrap();
        assert_eq!(u.progress, 100.0);
        assert_eq!(u.status, UploadStatus::Completed);
    }

    #[tokio::test]
    async fn completed_upload_is_not_mutated_again() {
        let tracker = Tracker::with_steps(TrackerConfig::manual(), Box::new(FixedStep(60.0)));
        let mut rx = tracker.subscribe();
        let id = tracker.intake(notes()).await.unwrap();

        tracker.advance(id).await.unwrap();
        assert_eq!(tracker.advance(id).await.unwrap(), AdvanceOutcome::Completed);
        let settled = tracker.upload(id).await.unwrap();
        assert_eq!(notifications(&drain(&mut rx)).len(), 1);

        for _ in 0..5 {
            assert_eq!(
                tracker.advance(id).await.unwrap(),
                AdvanceOutcome::Settled(UploadStatus::Completed)
            );
        }
        assert_eq!(tracker.upload(id).await.unwrap(), settled);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn concurrent_uploads_advance_independently() {
        let tracker = Tracker::with_steps(TrackerConfig::manual(), Box::new(FixedStep(30.0)));
        let ids = tracker
            .intake_all(vec![notes(), FileDescriptor::new("slides.docx", 512_000, "application/msword")])
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);

        tracker.advance(ids[0]).await.unwrap();
        tracker.advance(ids[0]).await.unwrap();

        let uploads = tracker.uploads().await;
        assert_eq!(uploads[0].name, "notes.pdf");
        assert_eq!(uploads[0].progress, 60.0);
        assert_eq!(uploads[1].name, "slides.docx");
        assert_eq!(uploads[1].progress, 0.0);
        assert_eq!(uploads[1].status, UploadStatus::Processing);
    }

    #[tokio::test]
    async fn advancing_unknown_upload_is_an_error() {
        let tracker = Tracker::new(TrackerConfig::manual());
        let id = uuid::Uuid::new_v4();
        assert_eq!(tracker.advance(id).await, Err(TrackerError::UnknownUpload(id)));
    }

    #[tokio::test(start_paused = true)]
    async fn one_timer_per_upload_retired_on_completion() {
        let tracker = Tracker::with_steps(TrackerConfig::default(), Box::new(FixedStep(50.0)));
        tracker
            .intake_all(vec![notes(), notes(), notes()])
            .await
            .unwrap();
        assert_eq!(tracker.active_timers().await, 3);

        tracker.wait_idle().await;
        assert_eq!(tracker.active_timers().await, 0);
        assert!(tracker
            .uploads()
            .await
            .iter()
            .all(|u| u.status == UploadStatus::Completed));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_timers_and_rejects_intake() {
        let tracker = Tracker::with_steps(TrackerConfig::default(), Box::new(FixedStep(1.0)));
        let mut rx = tracker.subscribe();
        let ids = tracker.intake_all(vec![notes(), notes()]).await.unwrap();

        tokio::time::sleep(Duration::from_millis(1600)).await;
        let before = tracker.uploads().await;
        assert!(before.iter().all(|u| u.progress > 0.0));

        assert_eq!(tracker.shutdown().await, 2);
        assert_eq!(tracker.active_timers().await, 0);
        assert!(tracker.is_closed());
        assert_eq!(tracker.shutdown().await, 0);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(tracker.uploads().await, before);
        assert_eq!(tracker.upload(ids[0]).await.unwrap().status, UploadStatus::Processing);

        assert_eq!(tracker.intake(notes()).await, Err(TrackerError::Closed));
        let events = drain(&mut rx);
        assert!(events
            .iter()
            .any(|e| matches!(e, TrackerEvent::TornDown { cancelled: 2 })));
        assert!(notifications(&events).is_empty());
    }

    #[tokio::test]
    async fn advance_after_shutdown_leaves_upload_untouched() {
        let tracker = Tracker::with_steps(TrackerConfig::manual(), Box::new(FixedStep(100.0)));
        let mut rx = tracker.subscribe();
        let id = tracker.intake(notes()).await.unwrap();

        tracker.shutdown().await;
        assert_eq!(tracker.advance(id).await, Err(TrackerError::Closed));

        let u = tracker.upload(id).await.unwrap();
        assert_eq!(u.status, UploadStatus::Processing);
        assert_eq!(u.progress, 0.0);
        assert!(u.extracted_summary.is_none());
        assert!(notifications(&drain(&mut rx)).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_guard_stops_timers() {
        let tracker = Tracker::with_steps(TrackerConfig::default(), Box::new(FixedStep(1.0)));
        let guard = tracker.guard();
        let ids = tracker.intake_all(vec![notes(), notes()]).await.unwrap();

        tokio::time::sleep(Duration::from_millis(1200)).await;
        let before = tracker.uploads().await;
        assert!(before.iter().all(|u| u.progress == 2.0));

        drop(guard);
        assert!(tracker.is_closed());
        tracker.wait_idle().await;

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(tracker.uploads().await, before);
        assert_eq!(tracker.advance(ids[0]).await, Err(TrackerError::Closed));
        assert_eq!(tracker.intake(notes()).await, Err(TrackerError::Closed));
        // timer tasks released their clones
        assert_eq!(Arc::strong_count(&tracker.state), 1);
    }

    #[tokio::test]
    async fn guard_after_shutdown_is_a_no_op() {
        let tracker = Tracker::new(TrackerConfig::manual());
        let guard = tracker.guard();
        assert_eq!(tracker.shutdown().await, 0);
        drop(guard);
        assert!(tracker.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_steps_stall_until_shutdown() {
        let tracker = Tracker::with_steps(TrackerConfig::default(), Box::new(FixedStep(0.0)));
        let id = tracker.intake(notes()).await.unwrap();

        tokio::time::sleep(Duration::from_secs(60)).await;
        let u = tracker.upload(id).await.unwrap();
        assert_eq!(u.status, UploadStatus::Processing);
        assert_eq!(u.progress, 0.0);
        assert_eq!(tracker.active_timers().await, 1);

        let waiter = {
            let t = tracker.clone();
            tokio::spawn(async move { t.wait_idle().await })
        };
        tracker.shutdown().await;
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn wait_idle_returns_without_uploads() {
        let tracker = Tracker::new(TrackerConfig::default());
        tracker.wait_idle().await;
        assert!(tracker.uploads().await.is_empty());
    }

    #[tokio::test]
    async fn chinese_locale_localizes_notification() {
        let config = TrackerConfig { locale: crate::i18n::Locale::Zh, ..TrackerConfig::manual() };
        let tracker = Tracker::with_steps(config, Box::new(FixedStep(100.0)));
        let mut rx = tracker.subscribe();
        let id = tracker.intake(notes()).await.unwrap();
        tracker.advance(id).await.unwrap();

        let toasts = notifications(&drain(&mut rx));
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].title, "文档处理成功");
        assert!(toasts[0].description.starts_with("notes.pdf"));
    }
}
