//! Static model specification table
//!
//! Maps a container format (file extension) and model family (file stem) to
//! the assumed memory footprint, latency and tensor shapes used when
//! synthesizing a benchmark report.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utils::error::{BenchError, Result};

/// Key of the per-format fallback entry
pub const DEFAULT_FAMILY: &str = "default";

/// Assumed characteristics of one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Memory footprint (MB)
    pub memory: f64,
    /// Base inference latency (ms)
    pub base_inference: f64,
    pub input_shape: Vec<usize>,
    pub output_shape: Vec<usize>,
}

impl ModelSpec {
    fn new(memory: f64, base_inference: f64, input_shape: &[usize], output_shape: &[usize]) -> Self {
        Self {
            memory,
            base_inference,
            input_shape: input_shape.to_vec(),
            output_shape: output_shape.to_vec(),
        }
    }

    fn validate(&self, format: &str, family: &str) -> Result<()> {
        let at = || format!("{}/{}", format, family);

        if !(self.memory.is_finite() && self.memory > 0.0) {
            return Err(BenchError::Config(format!("{}: memory must be positive", at())));
        }
        if !(self.base_inference.is_finite() && self.base_inference > 0.0) {
            return Err(BenchError::Config(format!(
                "{}: base_inference must be positive",
                at()
            )));
        }
        for (name, shape) in [("input_shape", &self.input_shape), ("output_shape", &self.output_shape)] {
            if shape.is_empty() || shape.contains(&0) {
                return Err(BenchError::Config(format!(
                    "{}: {} must be a non-empty list of positive integers",
                    at(),
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Specs for one container format
#[derive(Debug, Clone, PartialEq)]
pub struct FormatSpecs {
    default: ModelSpec,
    families: BTreeMap<String, ModelSpec>,
}

impl FormatSpecs {
    /// Spec for a family, or the format's default when the family is unknown
    pub fn lookup(&self, family: &str) -> &ModelSpec {
        self.families.get(family).unwrap_or(&self.default)
    }

    pub fn default_spec(&self) -> &ModelSpec {
        &self.default
    }

    /// Named families, excluding the default entry
    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.families.keys().map(String::as_str)
    }
}

/// Container format -> model family -> spec.
///
/// Every format carries a `default` entry, so a lookup never fails once the
/// format is known.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecTable {
    formats: BTreeMap<String, FormatSpecs>,
}

impl SpecTable {
    /// The built-in table shipped with the service
    pub fn builtin() -> Self {
        let imagenet_chw = [1, 3, 224, 224];
        let imagenet_hwc = [1, 224, 224, 3];
        let classes = [1, 1000];

        let mut formats = BTreeMap::new();

        // PyTorch
        formats.insert(
            "pt".to_string(),
            FormatSpecs {
                default: ModelSpec::new(40.0, 40.0, &imagenet_chw, &classes),
                families: BTreeMap::from([(
                    "resnet18".to_string(),
                    ModelSpec::new(44.7, 45.0, &imagenet_chw, &classes),
                )]),
            },
        );

        // TensorFlow / Keras
        formats.insert(
            "h5".to_string(),
            FormatSpecs {
                default: ModelSpec::new(35.0, 35.0, &imagenet_hwc, &classes),
                families: BTreeMap::new(),
            },
        );

        // ONNX
        formats.insert(
            "onnx".to_string(),
            FormatSpecs {
                default: ModelSpec::new(60.0, 25.0, &imagenet_chw, &classes),
                families: BTreeMap::from([(
                    "resnet101".to_string(),
                    ModelSpec::new(80.0, 30.0, &imagenet_chw, &classes),
                )]),
            },
        );

        Self { formats }
    }

    /// Build a table from the nested `format -> family -> spec` layout.
    ///
    /// Keys are lower-cased. Fails if any format lacks a `default` entry or
    /// any spec has non-positive numbers or empty shapes.
    pub fn from_nested(raw: BTreeMap<String, BTreeMap<String, ModelSpec>>) -> Result<Self> {
        if raw.is_empty() {
            return Err(BenchError::Config("spec table defines no formats".to_string()));
        }

        let mut formats = BTreeMap::new();
        for (format, entries) in raw {
            let format = format.to_lowercase();
            let mut families = BTreeMap::new();
            for (family, spec) in entries {
                let family = family.to_lowercase();
                spec.validate(&format, &family)?;
                if families.insert(family.clone(), spec).is_some() {
                    return Err(BenchError::Config(format!(
                        "{}/{} is defined more than once",
                        format, family
                    )));
                }
            }

            let default = families.remove(DEFAULT_FAMILY).ok_or_else(|| {
                BenchError::Config(format!("format '{}' has no '{}' entry", format, DEFAULT_FAMILY))
            })?;

            if formats.insert(format.clone(), FormatSpecs { default, families }).is_some() {
                return Err(BenchError::Config(format!(
                    "format '{}' is defined more than once",
                    format
                )));
            }
        }

        Ok(Self { formats })
    }

    /// Parse a JSON table
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, BTreeMap<String, ModelSpec>> = serde_json::from_str(json)
            .map_err(|e| BenchError::Config(format!("invalid spec table: {}", e)))?;
        Self::from_nested(raw)
    }

    /// Load a JSON table from disk
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| BenchError::SpecTableLoad(path.to_path_buf(), e.to_string()))?;
        Self::from_json_str(&json)
    }

    /// Resolve a spec, failing only when the format itself is unknown
    pub fn lookup(&self, format: &str, family: &str) -> Result<&ModelSpec> {
        self.formats
            .get(format)
            .map(|specs| specs.lookup(family))
            .ok_or_else(|| BenchError::UnsupportedFormat(format.to_string()))
    }

    pub fn format(&self, format: &str) -> Option<&FormatSpecs> {
        self.formats.get(format)
    }

    /// Supported container formats, sorted
    pub fn formats(&self) -> impl Iterator<Item = &str> {
        self.formats.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_formats() {
        let table = SpecTable::builtin();
        let formats: Vec<&str> = table.formats().collect();
        assert_eq!(formats, vec!["h5", "onnx", "pt"]);
    }

    #[test]
    fn test_known_family() {
        let table = SpecTable::builtin();
        let spec = table.lookup("pt", "resnet18").unwrap();
        assert_eq!(spec.memory, 44.7);
        assert_eq!(spec.base_inference, 45.0);
        assert_eq!(spec.input_shape, vec![1, 3, 224, 224]);
        assert_eq!(spec.output_shape, vec![1, 1000]);
    }

    #[test]
    fn test_every_builtin_row() {
        let chw = vec![1, 3, 224, 224];
        let hwc = vec![1, 224, 224, 3];
        let classes = vec![1, 1000];

        // (format, family, memory, base_inference, input_shape)
        let rows = [
            ("pt", "resnet18", 44.7, 45.0, &chw),
            ("pt", "default", 40.0, 40.0, &chw),
            ("h5", "default", 35.0, 35.0, &hwc),
            ("onnx", "resnet101", 80.0, 30.0, &chw),
            ("onnx", "default", 60.0, 25.0, &chw),
        ];

        let table = SpecTable::builtin();
        for (format, family, memory, base_inference, input_shape) in rows {
            let spec = table.lookup(format, family).unwrap();
            assert_eq!(spec.memory, memory, "{}/{}", format, family);
            assert_eq!(spec.base_inference, base_inference, "{}/{}", format, family);
            assert_eq!(&spec.input_shape, input_shape, "{}/{}", format, family);
            assert_eq!(spec.output_shape, classes, "{}/{}", format, family);
        }

        let named: usize = table
            .formats()
            .map(|f| table.format(f).unwrap().families().count() + 1)
            .sum();
        assert_eq!(named, rows.len());
    }

    #[test]
    fn test_unknown_family_uses_default() {
        let table = SpecTable::builtin();
        let spec = table.lookup("onnx", "mystery").unwrap();
        assert_eq!(spec.memory, 60.0);
        assert_eq!(spec.base_inference, 25.0);

        let h5 = table.lookup("h5", "resnet18").unwrap();
        assert_eq!(h5.input_shape, vec![1, 224, 224, 3]);
    }

    #[test]
    fn test_unknown_format() {
        let table = SpecTable::builtin();
        let err = table.lookup("xyz", "model").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported model type: xyz");
    }

    #[test]
    fn test_every_builtin_format_has_default() {
        let table = SpecTable::builtin();
        for format in table.formats() {
            let specs = table.format(format).unwrap();
            assert!(specs.families().all(|f| f != DEFAULT_FAMILY));
            assert!(specs.default_spec().memory > 0.0);
        }
    }

    #[test]
    fn test_from_json_lowercases_keys() {
        let json = r#"{
            "TFLite": {
                "default": {"memory": 12.0, "base_inference": 8.0,
                            "input_shape": [1, 224, 224, 3], "output_shape": [1, 1001]},
                "MobileNet": {"memory": 14.0, "base_inference": 6.5,
                              "input_shape": [1, 224, 224, 3], "output_shape": [1, 1001]}
            }
        }"#;
        let table = SpecTable::from_json_str(json).unwrap();
        assert_eq!(table.lookup("tflite", "mobilenet").unwrap().memory, 14.0);
        assert_eq!(table.lookup("tflite", "other").unwrap().memory, 12.0);
    }

    #[test]
    fn test_from_json_requires_default() {
        let json = r#"{"pt": {"resnet18": {"memory": 44.7, "base_inference": 45.0,
            "input_shape": [1, 3, 224, 224], "output_shape": [1, 1000]}}}"#;
        let err = SpecTable::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("no 'default' entry"));
    }

    #[test]
    fn test_from_json_rejects_bad_shapes() {
        let json = r#"{"pt": {"default": {"memory": 40.0, "base_inference": 40.0,
            "input_shape": [], "output_shape": [1, 1000]}}}"#;
        assert!(SpecTable::from_json_str(json).is_err());

        let json = r#"{"pt": {"default": {"memory": -1.0, "base_inference": 40.0,
            "input_shape": [1], "output_shape": [1]}}}"#;
        assert!(SpecTable::from_json_str(json).is_err());
    }

    #[test]
    fn test_from_json_rejects_duplicate_after_lowercase() {
        let spec = r#"{"default": {"memory": 1.0, "base_inference": 1.0,
            "input_shape": [1], "output_shape": [1]}}"#;
        let json = format!(r#"{{"pt": {spec}, "PT": {spec}}}"#);
        assert!(SpecTable::from_json_str(&json).is_err());
    }
}
