//! Synthetic Benchmark Module
//!
//! Produces benchmark reports for uploaded model files without loading or
//! running them. Every number is derived from the [`SpecTable`]:
//!
//! - **Memory usage**: spec memory scaled by file size
//! - **Inference time**: spec latency with random jitter, averaged over
//!   simulated warm-up passes
//! - **Shapes**: copied from the spec

pub mod jitter;
pub mod specs;

use serde::{Deserialize, Serialize};

use crate::utils::{bytes_to_mb, Result};

pub use jitter::{FixedJitter, JitterSource, RandomJitter, SeededJitter, JITTER_RANGE};
pub use specs::{FormatSpecs, ModelSpec, SpecTable, DEFAULT_FAMILY};

/// Number of simulated inference passes
pub const WARMUP_PASSES: usize = 3;

/// Speedup applied to every pass after the first (warm cache)
pub const WARM_PASS_FACTOR: f64 = 0.9;

/// Format and family derived from an uploaded filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFile {
    /// Lower-cased text after the last `.`
    pub format: String,
    /// Lower-cased text before the first `.`
    pub family: String,
}

impl ModelFile {
    /// Split a filename into container format and model family.
    ///
    /// `ResNet18.v2.PT` gives format `pt` and family `resnet18`. A name
    /// without a dot uses the whole name for both.
    pub fn from_filename(filename: &str) -> Self {
        let format = filename.rsplit('.').next().unwrap_or(filename);
        let family = filename.split('.').next().unwrap_or(filename);

        Self {
            format: format.to_lowercase(),
            family: family.to_lowercase(),
        }
    }
}

/// Benchmark report returned to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Uploaded filename as sent by the client
    pub model_name: String,
    /// Container format
    pub model_type: String,
    /// Average inference time (seconds)
    pub inference_time: f64,
    /// Estimated memory usage (MB)
    pub memory_usage: f64,
    /// Uploaded file size (MB)
    pub file_size: f64,
    pub input_shape: Vec<usize>,
    pub output_shape: Vec<usize>,
}

impl BenchmarkResult {
    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "{} ({}): {:.2}ms inference, {:.2}MB memory, {:.2}MB file",
            self.model_name,
            self.model_type,
            self.inference_time * 1000.0,
            self.memory_usage,
            self.file_size
        )
    }
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Model:          {}", self.model_name)?;
        writeln!(f, "Type:           {}", self.model_type)?;
        writeln!(f, "Inference time: {:.4} s", self.inference_time)?;
        writeln!(f, "Memory usage:   {:.2} MB", self.memory_usage)?;
        writeln!(f, "File size:      {:.2} MB", self.file_size)?;
        writeln!(f, "Input shape:    {:?}", self.input_shape)?;
        write!(f, "Output shape:   {:?}", self.output_shape)
    }
}

/// Memory estimate: grows 1% per MB of file
pub fn scaled_memory(base_memory_mb: f64, file_size_mb: f64) -> f64 {
    base_memory_mb * (1.0 + file_size_mb / 100.0)
}

/// Average latency (ms) over the simulated passes.
///
/// The first pass runs at the jittered latency, later passes at
/// [`WARM_PASS_FACTOR`] of it.
pub fn simulated_inference_ms(base_inference_ms: f64, variance: f64) -> f64 {
    let jittered = base_inference_ms * (1.0 + variance);

    let total: f64 = (0..WARMUP_PASSES)
        .map(|pass| if pass > 0 { jittered * WARM_PASS_FACTOR } else { jittered })
        .sum();

    total / WARMUP_PASSES as f64
}

/// Build a report for an uploaded file of `size_bytes` bytes
pub fn synthesize(
    table: &SpecTable,
    filename: &str,
    size_bytes: u64,
    jitter: &dyn JitterSource,
) -> Result<BenchmarkResult> {
    let model = ModelFile::from_filename(filename);
    let spec = table.lookup(&model.format, &model.family)?;

    let file_size = bytes_to_mb(size_bytes);
    let memory_usage = scaled_memory(spec.memory, file_size);
    let inference_ms = simulated_inference_ms(spec.base_inference, jitter.variance());

    Ok(BenchmarkResult {
        model_name: filename.to_string(),
        model_type: model.format,
        inference_time: inference_ms / 1000.0,
        memory_usage,
        file_size,
        input_shape: spec.input_shape.clone(),
        output_shape: spec.output_shape.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    #[test]
    fn test_filename_parsing() {
        let m = ModelFile::from_filename("resnet18.pt");
        assert_eq!(m.format, "pt");
        assert_eq!(m.family, "resnet18");

        let m = ModelFile::from_filename("ResNet101.Final.ONNX");
        assert_eq!(m.format, "onnx");
        assert_eq!(m.family, "resnet101");

        let m = ModelFile::from_filename("weights");
        assert_eq!(m.format, "weights");
        assert_eq!(m.family, "weights");

        let m = ModelFile::from_filename(".pt");
        assert_eq!(m.format, "pt");
        assert_eq!(m.family, "");
    }

    #[test]
    fn test_resnet18_scenario() {
        let table = SpecTable::builtin();
        let result = synthesize(&table, "resnet18.pt", 10 * MB, &FixedJitter::none()).unwrap();

        assert_eq!(result.model_name, "resnet18.pt");
        assert_eq!(result.model_type, "pt");
        assert_eq!(result.file_size, 10.0);
        assert!((result.memory_usage - 49.17).abs() < 1e-9);
        assert_eq!(result.input_shape, vec![1, 3, 224, 224]);
        assert_eq!(result.output_shape, vec![1, 1000]);

        // 45ms * (1 + 0.9 + 0.9) / 3 = 42ms
        assert!((result.inference_time - 0.042).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_family_falls_back() {
        let table = SpecTable::builtin();
        let result = synthesize(&table, "mystery.onnx", 0, &FixedJitter::none()).unwrap();
        assert_eq!(result.memory_usage, 60.0);
        assert!((result.inference_time - 25.0 * 2.8 / 3.0 / 1000.0).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let table = SpecTable::builtin();
        let err = synthesize(&table, "model.xyz", 10, &FixedJitter::none()).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported model type: xyz");
    }

    #[test]
    fn test_memory_monotonic_in_size() {
        let mut previous = 0.0;
        for mb in [0.0, 0.5, 1.0, 10.0, 100.0, 1000.0] {
            let memory = scaled_memory(40.0, mb);
            assert!(memory >= previous);
            previous = memory;
        }
    }

    #[test]
    fn test_inference_bounds_over_jitter() {
        let base = 45.0;
        let lower = 0.9 * 0.9 * base;
        let upper = 1.1 * base;
        for v in [-JITTER_RANGE, -0.05, 0.0, 0.05, JITTER_RANGE] {
            let ms = simulated_inference_ms(base, v);
            assert!(ms > 0.0);
            assert!(ms >= lower && ms <= upper, "{} out of [{}, {}]", ms, lower, upper);
        }
    }

    #[test]
    fn test_random_jitter_within_bounds() {
        let table = SpecTable::builtin();
        let base_s = 40.0 / 1000.0;
        for _ in 0..200 {
            let r = synthesize(&table, "anything.pt", 1, &RandomJitter).unwrap();
            assert!(r.inference_time >= 0.81 * base_s && r.inference_time <= 1.1 * base_s);
        }
    }

    #[test]
    fn test_result_json_fields() {
        let table = SpecTable::builtin();
        let result = synthesize(&table, "net.h5", 0, &FixedJitter::none()).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        let obj = json.as_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "file_size",
                "inference_time",
                "input_shape",
                "memory_usage",
                "model_name",
                "model_type",
                "output_shape"
            ]
        );
        assert!(result.summary().contains("net.h5 (h5)"));
    }
}
