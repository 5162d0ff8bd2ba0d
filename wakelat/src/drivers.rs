use log::{debug, info};
use serde::Serialize;
use std::time::{Duration, Instant};
use wakelat_common::{BenchConfig, Result, Scenario, SchedulingHint, WakeError};

use crate::channel::{self, WakeEndpoint, WakeLink};
use crate::pool::WorkerPool;
use crate::stats::CostVector;

/// How each wake round is turned into samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundMode {
    /// One sample per round: the mean latency across all workers.
    Averaged,
    /// Sleep `period` before each round, then one sample per worker.
    Periodic { period: Duration },
}

/// Outcome of one scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub scenario: Scenario,
    pub arrival_rate_us: u64,
    pub thread_count: usize,
    pub sample_count: usize,
    /// Time spent in the measurement loop, excluding spawn and teardown.
    pub wall_time: Duration,
    pub costs: CostVector,
}

/// Validate `config` and run `scenario` against it.
pub fn run(scenario: Scenario, config: &BenchConfig) -> Result<ScenarioReport> {
    config.validate()?;
    match scenario {
        Scenario::WakeupSingle => measure_single(config),
        Scenario::WakeupPeriodic => measure_periodic(config),
    }
}

/// Repeatedly wake one worker with no contention,
/// `loop_count * thread_count` times.
pub fn measure_single(config: &BenchConfig) -> Result<ScenarioReport> {
    let rounds = config.loop_count * config.thread_count as u64;
    let (mut samples, wall_time) =
        sample_wakeups(1, rounds, config.scheduling, RoundMode::Averaged)?;
    summarize(Scenario::WakeupSingle, config, &mut samples, wall_time)
}

/// Every `arrival_rate_us`, wake all `thread_count` workers together,
/// `loop_count` times.
pub fn measure_periodic(config: &BenchConfig) -> Result<ScenarioReport> {
    let mode = RoundMode::Periodic { period: Duration::from_micros(config.arrival_rate_us) };
    let (mut samples, wall_time) =
        sample_wakeups(config.thread_count, config.loop_count, config.scheduling, mode)?;
    summarize(Scenario::WakeupPeriodic, config, &mut samples, wall_time)
}

/// Spawn `threads` workers, run `rounds` wake rounds, cancel and join the
/// workers, and return the samples (µs, recording order) with the time spent
/// in the measurement loop.
///
/// Workers are always torn down, even when a round fails.
pub fn sample_wakeups(
    threads: usize,
    rounds: u64,
    hint: SchedulingHint,
    mode: RoundMode,
) -> Result<(Vec<u64>, Duration)> {
    if threads == 0 {
        return Err(WakeError::InvalidThreadCount);
    }
    let mut pool = WorkerPool::spawn(
        threads,
        &(),
        hint,
        |_, _| Ok(channel::wake_channel()),
        WakeEndpoint::serve,
    )?;

    let per_round = match mode {
        RoundMode::Averaged => 1,
        RoundMode::Periodic { .. } => threads,
    };
    let mut samples = Vec::with_capacity(rounds as usize * per_round);

    info!("measuring {rounds} rounds across {threads} workers");
    let start = Instant::now();
    let measured = (0..rounds).try_for_each(|_| match mode {
        RoundMode::Averaged => {
            let mut total = Duration::ZERO;
            wake_round(&pool, |_, elapsed| total += elapsed)?;
            samples.push(micros(total / threads as u32));
            Ok(())
        }
        RoundMode::Periodic { period } => {
            std::thread::sleep(period);
            wake_round(&pool, |_, elapsed| samples.push(micros(elapsed)))
        }
    });
    let wall_time = start.elapsed();

    pool.cancel_all();
    let joined = pool.teardown(|index, link| {
        debug!("released channel for worker {index}");
        drop(link);
    });

    measured?;
    joined?;
    Ok((samples, wall_time))
}

/// Wake every worker near-simultaneously and collect each one's latency.
///
/// All timestamps are written and all `start` signals sent before any ack is
/// awaited. `record` is called in spawn order as each ack is received.
pub fn wake_round<F>(pool: &WorkerPool<WakeLink>, mut record: F) -> Result<()>
where
    F: FnMut(usize, Duration),
{
    for link in pool.links() {
        link.signal()?;
    }
    for (index, link) in pool.links().enumerate() {
        let elapsed = link.await_ack()?;
        record(index, elapsed);
    }
    Ok(())
}

fn summarize(
    scenario: Scenario,
    config: &BenchConfig,
    samples: &mut [u64],
    wall_time: Duration,
) -> Result<ScenarioReport> {
    let sample_count = samples.len();
    let costs = CostVector::from_samples(samples)?;
    info!("{} finished: {sample_count} samples in {wall_time:?}", scenario.as_name());
    Ok(ScenarioReport {
        scenario,
        arrival_rate_us: config.arrival_rate_us,
        thread_count: config.thread_count,
        sample_count,
        wall_time,
        costs,
    })
}

fn micros(d: Duration) -> u64 {
    d.as_micros() as u64
}
