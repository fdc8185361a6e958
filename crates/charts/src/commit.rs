//! Atomic boundary commits for one (network, resolution) pair.
//!
//! A commit first stages a journal holding every point and the new
//! checkpoint, then appends the points, saves the checkpoint and drops
//! the journal. Opening the pair replays a journal left behind by an
//! interrupted commit, so each point lands exactly once.

use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    chart::{Chart, append_point, load_chart, write_file_atomic},
    checkpoint::{Checkpoint, CheckpointFiles},
    errors::ChartsError,
    metrics::{CyclePoint, Metric},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct StagedCommit {
    pub height: u64,
    pub blockchain_size: u64,
    pub timestamp: u64,
    pub points: Vec<StagedPoint>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct StagedPoint {
    pub metric: Metric,
    /// chart length before the append
    pub base_len: usize,
    pub value: u64,
}

pub struct ChartSet {
    dir: PathBuf,
    suffix: String,
    checkpoint_files: CheckpointFiles,
    checkpoint: Checkpoint,
    charts: Option<BTreeMap<Metric, Chart>>,
}

impl ChartSet {
    /// opens the pair's state, finishing any interrupted commit first
    pub fn open(dir: &Path, suffix: &str) -> Result<Self, ChartsError> {
        let mut set = ChartSet {
            dir: dir.to_path_buf(),
            suffix: suffix.to_string(),
            checkpoint_files: CheckpointFiles::new(dir, suffix),
            checkpoint: Checkpoint::default(),
            charts: None,
        };
        set.replay()?;
        set.checkpoint = set.checkpoint_files.load()?;
        Ok(set)
    }

    pub fn checkpoint(&self) -> Checkpoint {
        self.checkpoint
    }

    pub fn chart_path(&self, metric: Metric) -> PathBuf {
        self.dir.join(metric.file_name(&self.suffix))
    }

    pub fn journal_path(&self) -> PathBuf {
        self.dir.join(format!("commit_{}.json", self.suffix))
    }

    /// loads every chart of the pair, malformed files abort
    pub fn load_charts(&mut self) -> Result<&BTreeMap<Metric, Chart>, ChartsError> {
        if self.charts.is_none() {
            let mut charts = BTreeMap::new();
            for metric in Metric::all() {
                charts.insert(metric, load_chart(&self.chart_path(metric))?);
            }
            self.charts = Some(charts);
        }
        Ok(self.charts.get_or_insert_with(BTreeMap::new))
    }

    /// timestamp of the last committed point, `None` while every chart is empty
    pub fn last_timestamp(&mut self) -> Result<Option<u64>, ChartsError> {
        Ok(last_timestamp(self.load_charts()?))
    }

    /// appends `point` to every chart and advances the checkpoint to the point's height
    pub fn commit(&mut self, point: &CyclePoint) -> Result<Checkpoint, ChartsError> {
        self.load_charts()?;
        let mut charts = self.charts.take().unwrap_or_default();
        let staged = self.stage(point, &charts)?;
        self.apply(&staged, &mut charts)?;
        self.charts = Some(charts);
        Ok(self.checkpoint)
    }

    pub(crate) fn stage(
        &self,
        point: &CyclePoint,
        charts: &BTreeMap<Metric, Chart>,
    ) -> Result<StagedCommit, ChartsError> {
        // charts never go back in time, a regressed closing block reuses the last timestamp
        let floor = last_timestamp(charts).unwrap_or(0);
        let staged = StagedCommit {
            height: point.height,
            blockchain_size: point.blockchain_size,
            timestamp: point.timestamp.max(floor),
            points: Metric::all()
                .into_iter()
                .map(|metric| StagedPoint {
                    metric,
                    base_len: charts.get(&metric).map_or(0, Vec::len),
                    value: point.value(metric),
                })
                .collect(),
        };
        let path = self.journal_path();
        let bytes = serde_json::to_vec(&staged).map_err(|err| ChartsError::Journal {
            path: path.clone(),
            reason: err.to_string(),
        })?;
        write_file_atomic(&path, &bytes)?;
        Ok(staged)
    }

    fn apply(
        &mut self,
        staged: &StagedCommit,
        charts: &mut BTreeMap<Metric, Chart>,
    ) -> Result<(), ChartsError> {
        for staged_point in &staged.points {
            let path = self.chart_path(staged_point.metric);
            let chart = charts.remove(&staged_point.metric).unwrap_or_default();
            let expected = [staged.timestamp, staged_point.value];
            let chart = if chart.len() == staged_point.base_len {
                append_point(chart, staged.timestamp, staged_point.value, &path)?
            } else if chart.len() == staged_point.base_len + 1 && chart.last() == Some(&expected)
            {
                chart
            } else {
                return Err(ChartsError::Journal {
                    path: self.journal_path(),
                    reason: format!(
                        "{} has {} points, commit was staged against {}",
                        path.display(),
                        chart.len(),
                        staged_point.base_len
                    ),
                });
            };
            charts.insert(staged_point.metric, chart);
        }
        let checkpoint = Checkpoint {
            height: staged.height,
            blockchain_size: staged.blockchain_size,
        };
        self.checkpoint_files.save(&checkpoint)?;
        self.checkpoint = checkpoint;
        let journal = self.journal_path();
        match fs::remove_file(&journal) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ChartsError::io(&journal, err)),
        }
    }

    fn replay(&mut self) -> Result<(), ChartsError> {
        let path = self.journal_path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(ChartsError::io(&path, err)),
        };
        let staged: StagedCommit =
            serde_json::from_slice(&bytes).map_err(|err| ChartsError::Journal {
                path: path.clone(),
                reason: err.to_string(),
            })?;
        warn!(
            journal = %path.display(),
            height = staged.height,
            "finishing interrupted commit"
        );
        self.load_charts()?;
        let mut charts = self.charts.take().unwrap_or_default();
        self.apply(&staged, &mut charts)?;
        self.charts = Some(charts);
        info!(height = staged.height, "interrupted commit recovered");
        Ok(())
    }
}

fn last_timestamp(charts: &BTreeMap<Metric, Chart>) -> Option<u64> {
    charts
        .values()
        .filter_map(|chart| chart.last())
        .map(|last| last[0])
        .max()
}
