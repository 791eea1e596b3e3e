//! Session controller: form state and the submit pipeline.
//!
//! One session per process. It owns the editable input and at most one
//! stored result; the report is built from that stored result only.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use super::classifier::RiskClassifier;
use super::report::ReportBuilder;
use crate::domain::{
    classify, encode, render_gauge, FormDefaults, PatientInput, ReportDocument, RiskResult,
};
use crate::ports::{ChartRasterizer, ReportWriter, RiskModel};
use crate::{AeroLungError, Result};

pub struct Session<M>
where
    M: RiskModel,
{
    classifier: RiskClassifier<M>,
    defaults: FormDefaults,
    input: PatientInput,
    result: Option<RiskResult>,
}

impl<M> Session<M>
where
    M: RiskModel,
{
    pub fn new(classifier: RiskClassifier<M>, defaults: FormDefaults) -> Self {
        Self {
            classifier,
            defaults,
            input: PatientInput::from_defaults(&defaults),
            result: None,
        }
    }

    #[must_use]
    pub fn input(&self) -> &PatientInput {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut PatientInput {
        &mut self.input
    }

    /// Restore the form to its configured defaults. The stored result stays.
    pub fn reset_form(&mut self) {
        self.input = PatientInput::from_defaults(&self.defaults);
    }

    /// False when the model failed to load.
    #[must_use]
    pub fn accepts_submissions(&self) -> bool {
        self.classifier.is_ready()
    }

    #[must_use]
    pub fn unavailable_reason(&self) -> Option<&str> {
        self.classifier.unavailable_reason()
    }

    /// Run encode, predict, classify and gauge on the current input.
    ///
    /// On success the result replaces any earlier one. On failure nothing
    /// is stored and the earlier result is left as it was.
    ///
    /// # Errors
    /// - `Validation` for out-of-domain input
    /// - `ModelUnavailable` if the model was not loaded
    /// - `Inference` if the model call failed
    pub fn submit(&mut self) -> Result<&RiskResult> {
        let input = self.input;
        let features = encode(&input)?;
        let probability = self.classifier.predict(&features)?;
        let verdict = classify(probability);

        tracing::info!("Risk assessed: {}", verdict.level);
        tracing::debug!("Predicted probability {}", probability);

        let result = RiskResult {
            probability,
            verdict,
            chart: render_gauge(probability, verdict.level),
            input,
            assessed_at: Local::now(),
        };
        Ok(&*self.result.insert(result))
    }

    #[must_use]
    pub fn last_result(&self) -> Option<&RiskResult> {
        self.result.as_ref()
    }

    /// Whether the download affordance should be offered.
    #[must_use]
    pub fn report_available(&self) -> bool {
        self.result.is_some()
    }

    /// Build the report for the stored result.
    ///
    /// # Errors
    /// Returns `ReportUnavailable` if nothing has been submitted yet.
    pub fn build_report<R, W>(
        &self,
        builder: &ReportBuilder<R, W>,
        now: DateTime<Local>,
    ) -> Result<ReportDocument>
    where
        R: ChartRasterizer,
        W: ReportWriter,
    {
        let result = self.result.as_ref().ok_or(AeroLungError::ReportUnavailable)?;
        Ok(builder.render_report(result, now))
    }

    /// Build, serialize and save the report into `dir`.
    ///
    /// # Errors
    /// `ReportUnavailable` without a stored result, `ReportRender` if the
    /// writer fails, `Io` if the file cannot be written.
    pub fn export_report<R, W>(
        &self,
        builder: &ReportBuilder<R, W>,
        dir: &Path,
        now: DateTime<Local>,
    ) -> Result<PathBuf>
    where
        R: ChartRasterizer,
        W: ReportWriter,
    {
        let document = self.build_report(builder, now)?;
        let (file_name, bytes) = builder.export(&document)?;

        fs::create_dir_all(dir)?;
        let path = dir.join(file_name);
        fs::write(&path, &bytes)?;

        tracing::info!("Report saved to {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}
