use crate::message::MessageType;

/// Completion tracking for one query.
///
/// The service runs a query as one or more jobs. Every job reports a start
/// (`INIT` for the first, `START` for spawned ones) and a `STOP`; `SPAWN`
/// announces an extra job. A query is finished once every announced job has
/// started and stopped, or as soon as an abort type (`ERROR`, `UNAUTH`,
/// `CANCEL`, `DISCONNECT`) arrives. Finished is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    jobs_spawned: u32,
    jobs_started: u32,
    jobs_completed: u32,
    finished: bool,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// A progress value that is already finished.
    pub fn finished() -> Self {
        Self {
            finished: true,
            ..Self::default()
        }
    }

    /// Account for one received message.
    pub fn observe(&mut self, message_type: MessageType) {
        if self.finished {
            return;
        }
        match message_type {
            MessageType::Spawn => self.jobs_spawned += 1,
            MessageType::Init | MessageType::Start => self.jobs_started += 1,
            MessageType::Stop => self.jobs_completed += 1,
            _ => {}
        }

        self.finished = message_type.is_abort()
            || (self.jobs_started > 0
                && self.jobs_started == self.jobs_completed
                && self.jobs_spawned + 1 == self.jobs_started);
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn jobs_spawned(&self) -> u32 {
        self.jobs_spawned
    }

    pub fn jobs_started(&self) -> u32 {
        self.jobs_started
    }

    pub fn jobs_completed(&self) -> u32 {
        self.jobs_completed
    }
}
