use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::info;

/// Accumulated time spent in one pipeline stage across all items
#[derive(Debug, Clone, PartialEq)]
pub struct StageTiming {
    pub name: String,
    pub total: Duration,
    pub count: u32,
}

impl StageTiming {
    pub fn average(&self) -> Duration {
        if self.count == 0 {
            Duration::ZERO
        } else {
            self.total / self.count
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PipelineTimings {
    stages: Vec<StageTiming>,
    stage_map: HashMap<String, usize>,
}

impl PipelineTimings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_step(&mut self, name: impl Into<String>, duration: Duration) {
        let name = name.into();
        match self.stage_map.get(&name) {
            Some(&i) => {
                self.stages[i].total += duration;
                self.stages[i].count += 1;
            }
            None => {
                self.stage_map.insert(name.clone(), self.stages.len());
                self.stages.push(StageTiming {
                    name,
                    total: duration,
                    count: 1,
                });
            }
        }
    }

    pub fn total_duration(&self) -> Duration {
        self.stages.iter().map(|s| s.total).sum()
    }

    pub fn get_step(&self, name: &str) -> Option<&StageTiming> {
        self.stage_map.get(name).map(|&i| &self.stages[i])
    }

    /// Stages in the order they first ran
    pub fn stages(&self) -> &[StageTiming] {
        &self.stages
    }

    pub fn log_summary(&self) {
        let total = self.total_duration().as_secs_f64();
        for stage in &self.stages {
            let percentage = if total > 0.0 {
                stage.total.as_secs_f64() / total * 100.0
            } else {
                0.0
            };
            info!(
                "{:<12} {:>10.3}ms total {:>8.3}ms avg ({:>5.1}%)",
                stage.name,
                stage.total.as_secs_f64() * 1000.0,
                stage.average().as_secs_f64() * 1000.0,
                percentage
            );
        }
    }
}

pub struct Timer {
    start: Instant,
    name: &'static str,
}

impl Timer {
    pub fn start(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    pub fn stop(self) -> (&'static str, Duration) {
        (self.name, self.start.elapsed())
    }
}
