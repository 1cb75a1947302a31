//! Experiment ledger that writes to the log.

use mitosis_core::ExperimentRecorder;
use tracing::info;

/// Records finished experiments as structured log lines.
#[derive(Debug, Default)]
pub struct LoggingRecorder {
    /// Experiments recorded.
    experiments: u32,
    /// Runs scored for Mendelian ratios.
    mendelian_ratios: u32,
}

impl LoggingRecorder {
    /// Experiments recorded so far.
    pub const fn experiments(&self) -> u32 {
        self.experiments
    }

    /// Mendelian-ratio scorings so far.
    pub const fn mendelian_ratios(&self) -> u32 {
        self.mendelian_ratios
    }
}

impl ExperimentRecorder for LoggingRecorder {
    fn record_experiment(&mut self, offspring_count: u64, had_crossover: bool) {
        self.experiments = self.experiments.saturating_add(1);
        info!(offspring_count, had_crossover, "experiment recorded");
    }

    fn record_mendelian_ratio(&mut self) {
        self.mendelian_ratios = self.mendelian_ratios.saturating_add(1);
        info!("mendelian ratio recorded");
    }
}

#[cfg(test)]
mod tests {
    use mitosis_core::report_experiment;
    use mitosis_types::SimulationMode;

    use super::*;

    #[test]
    fn meiosis_run_scores_a_ratio() {
        let mut recorder = LoggingRecorder::default();
        report_experiment(&mut recorder, SimulationMode::Meiosis, 6);
        report_experiment(&mut recorder, SimulationMode::DetailedMitosis, 6);
        assert_eq!(recorder.experiments(), 2);
        assert_eq!(recorder.mendelian_ratios(), 1);
    }
}
