use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::engine::{SettlementReport, Settler, SimulationReport, Simulator};

/// The two periodic passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Job {
    Simulation,
    Settlement,
}

impl Job {
    pub const ALL: [Job; 2] = [Job::Simulation, Job::Settlement];

    pub fn name(self) -> &'static str {
        match self {
            Job::Simulation => "simulation",
            Job::Settlement => "settlement",
        }
    }
}

/// One non-reentrant lock per job. A pass that finds its lock held is
/// skipped rather than queued; the two jobs never block each other.
pub struct JobLocks {
    locks: HashMap<Job, Arc<Mutex<()>>>,
}

impl JobLocks {
    pub fn new() -> Self {
        JobLocks {
            locks: Job::ALL
                .into_iter()
                .map(|job| (job, Arc::new(Mutex::new(()))))
                .collect(),
        }
    }

    /// Take the job's lock if nobody holds it. Released on drop.
    pub fn try_acquire(&self, job: Job) -> Option<OwnedMutexGuard<()>> {
        self.locks.get(&job)?.clone().try_lock_owned().ok()
    }

    pub fn is_running(&self, job: Job) -> bool {
        self.locks
            .get(&job)
            .map(|lock| lock.try_lock().is_err())
            .unwrap_or(false)
    }
}

impl Default for JobLocks {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "job", rename_all = "snake_case")]
pub enum JobReport {
    Simulation(SimulationReport),
    Settlement(SettlementReport),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(JobReport),
    /// Another run of the same job held the lock
    AlreadyRunning,
}

/// Runs the simulation and settlement passes, either on a timer or on demand.
#[derive(Clone)]
pub struct Scheduler {
    simulator: Arc<Simulator>,
    settler: Arc<Settler>,
    locks: Arc<JobLocks>,
}

impl Scheduler {
    pub fn new(simulator: Simulator, settler: Settler) -> Self {
        Scheduler {
            simulator: Arc::new(simulator),
            settler: Arc::new(settler),
            locks: Arc::new(JobLocks::new()),
        }
    }

    pub fn locks(&self) -> &JobLocks {
        &self.locks
    }

    /// Run one pass of `job` now, unless a run of it is already in flight.
    pub async fn run(&self, job: Job) -> Result<RunOutcome> {
        let Some(_guard) = self.locks.try_acquire(job) else {
            info!("{} pass already running; skipping", job.name());
            return Ok(RunOutcome::AlreadyRunning);
        };

        let started = Instant::now();
        let report = match job {
            Job::Simulation => JobReport::Simulation(self.simulator.run(Utc::now()).await?),
            Job::Settlement => JobReport::Settlement(self.settler.run().await?),
        };
        info!("{} pass finished in {:?}", job.name(), started.elapsed());
        Ok(RunOutcome::Completed(report))
    }

    /// Fire `job` every `period`, starting immediately. Ticks that land while
    /// a run is still going are dropped.
    pub fn spawn_periodic(&self, job: Job, period: Duration) -> JoinHandle<()> {
        let scheduler = self.clone();
        tokio::spawn(async move {
            info!("{} job scheduled every {:?}", job.name(), period);
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                if let Err(e) = scheduler.run(job).await {
                    error!("{} pass failed: {:#}", job.name(), e);
                }
            }
        })
    }
}
