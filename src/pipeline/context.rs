use super::presence_pipeline::PresencePipeline;
use crate::archive::FaceArchiver;
use crate::config::Config;
use crate::errors::AppResult;
use crate::eventlog::EventLog;
use crate::store::AttendanceStore;
use crate::tracker::PresenceTracker;
use crate::utils::time::secs_to_duration;
use std::sync::Arc;

/// Everything the ingestion side needs, built once and passed down.
/// The store is shared so a query surface can read while frames are written.
pub struct AppContext {
    pub config: Config,
    pub store: Arc<AttendanceStore>,
}

impl AppContext {
    pub fn open(config: Config) -> AppResult<Self> {
        config.check()?;
        let store = AttendanceStore::open(&config.database)?.with_default_role(&config.person_role);
        Ok(Self {
            config,
            store: Arc::new(store),
        })
    }

    pub fn with_store(config: Config, store: Arc<AttendanceStore>) -> AppResult<Self> {
        config.check()?;
        Ok(Self { config, store })
    }

    pub fn event_log(&self) -> EventLog {
        EventLog::new(&self.config.logs_path())
    }

    /// A fresh pipeline: tracker state starts over, the image counter does not.
    pub fn pipeline(&self) -> AppResult<PresencePipeline> {
        let archiver = FaceArchiver::new(&self.config.faces_path(), &self.config.image_ext)?;
        log::debug!(
            "faces archived in {} starting at #{}",
            archiver.dir().display(),
            archiver.next_index()
        );
        log::debug!(
            "absence_threshold={}s save_interval={}s (save_interval is not used for capture gating)",
            self.config.absence_threshold,
            self.config.save_interval
        );
        Ok(PresencePipeline::new(
            &self.config.person_name,
            PresenceTracker::new(secs_to_duration(self.config.absence_threshold)?),
            Arc::clone(&self.store),
            archiver,
            self.event_log(),
            self.config.store_retries,
        ))
    }
}
