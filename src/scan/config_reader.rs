use crate::args::Args;
use crate::scan::chat::ChatSettings;
use crate::scan::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputSettings {
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    pub column: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SamplingSettings {
    #[serde(rename = "sampleSize")]
    pub sample_size: Option<usize>,
    pub seed: Option<u64>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    pub label: String,
    pub keywords: Vec<String>,
    pub color: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    pub label: String,
    pub color: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct LabelsConfig {
    pub rules: Vec<RuleConfig>,
    pub fallback: Option<FallbackConfig>,
}

impl LabelsConfig {
    pub fn to_rules(&self) -> LabelRules {
        let default_fallback = LabelRules::default_rules().fallback;
        LabelRules {
            rules: self
                .rules
                .iter()
                .map(|r| LabelRule {
                    label: r.label.clone(),
                    keywords: r.keywords.clone(),
                    color: r.color.clone().unwrap_or_else(|| "gray".to_string()),
                })
                .collect(),
            fallback: match &self.fallback {
                Some(f) => FallbackLabel {
                    label: f.label.clone(),
                    color: f.color.clone().unwrap_or_else(|| "gray".to_string()),
                },
                None => default_fallback,
            },
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    #[serde(rename = "apiKeyEnv")]
    pub api_key_env: Option<String>,
    pub language: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "chartPath")]
    pub chart_path: Option<String>,
    #[serde(rename = "summaryPath")]
    pub summary_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default)]
    pub input: InputSettings,
    #[serde(default)]
    pub sampling: SamplingSettings,
    pub labels: Option<LabelsConfig>,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub output: OutputSettings,
}

pub fn read_config(path: &str) -> ScanResult<ScanConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: ScanConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InputType {
    Xlsx,
    Csv,
}

impl InputType {
    pub fn parse(s: &str) -> ScanResult<InputType> {
        match s.to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(InputType::Xlsx),
            "csv" => Ok(InputType::Csv),
            _ => UnknownInputTypeSnafu { input_type: s }.fail(),
        }
    }

    /// Csv for files ending in `.csv`, Excel otherwise.
    pub fn from_path(path: &str) -> InputType {
        match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => InputType::Csv,
            _ => InputType::Xlsx,
        }
    }
}

/// Everything needed to run a scan, once the flags and the configuration file are merged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ScanSettings {
    pub input_path: String,
    pub input_type: InputType,
    pub column: String,
    pub worksheet: Option<String>,
    pub sample_size: Option<usize>,
    pub seed: u64,
    pub rules: LabelRules,
    pub chat: ChatSettings,
    pub chart_path: Option<String>,
    pub out: Option<String>,
    pub reference: Option<String>,
    pub questions: Vec<String>,
    pub interactive: bool,
}

pub const DEFAULT_COLUMN: &str = "text";

// Paths in a configuration file are relative to the file itself.
fn resolve_path(base_dir: Option<&Path>, path: &str) -> String {
    match base_dir {
        Some(dir) if Path::new(path).is_relative() => dir.join(path).display().to_string(),
        _ => path.to_string(),
    }
}

/// Merges the command line flags with the configuration file, if any.
/// The flags take precedence.
pub fn resolve_settings(args: &Args) -> ScanResult<ScanSettings> {
    let (config, base_dir): (ScanConfig, Option<PathBuf>) = match args.config.as_deref() {
        Some(config_path) => {
            info!("Reading configuration {:?}", config_path);
            let config = read_config(config_path)?;
            let base_dir = Path::new(config_path).parent().map(|p| p.to_path_buf());
            (config, base_dir)
        }
        None => (ScanConfig::default(), None),
    };
    let base_dir = base_dir.as_deref();

    let input_path = match args.input.clone() {
        Some(p) => p,
        None => config
            .input
            .file_path
            .as_deref()
            .map(|p| resolve_path(base_dir, p))
            .context(MissingInputSnafu {})?,
    };

    let input_type = match args.input_type.as_deref().or(config.input.provider.as_deref()) {
        Some(s) => InputType::parse(s)?,
        None => InputType::from_path(&input_path),
    };

    let rules = config
        .labels
        .as_ref()
        .map(|l| l.to_rules())
        .unwrap_or_else(LabelRules::default_rules);

    let default_chat = ChatSettings::default();
    let chat = ChatSettings {
        endpoint: config.chat.endpoint.clone().unwrap_or(default_chat.endpoint),
        model: args
            .model
            .clone()
            .or_else(|| config.chat.model.clone())
            .unwrap_or(default_chat.model),
        api_key_env: config
            .chat
            .api_key_env
            .clone()
            .unwrap_or(default_chat.api_key_env),
        language: config.chat.language.clone().unwrap_or(default_chat.language),
    };

    Ok(ScanSettings {
        input_path,
        input_type,
        column: args
            .column
            .clone()
            .or_else(|| config.input.column.clone())
            .unwrap_or_else(|| DEFAULT_COLUMN.to_string()),
        worksheet: args
            .excel_worksheet_name
            .clone()
            .or_else(|| config.input.excel_worksheet_name.clone()),
        sample_size: args.sample_size.or(config.sampling.sample_size),
        seed: args.seed.or(config.sampling.seed).unwrap_or(DEFAULT_SEED),
        rules,
        chat,
        chart_path: args.chart.clone().or_else(|| {
            config
                .output
                .chart_path
                .as_deref()
                .map(|p| resolve_path(base_dir, p))
        }),
        out: args.out.clone().or_else(|| {
            config
                .output
                .summary_path
                .as_deref()
                .map(|p| resolve_path(base_dir, p))
        }),
        reference: args.reference.clone(),
        questions: args.question.clone(),
        interactive: args.interactive,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    const FULL_CONFIG: &str = r#"{
        "input": { "provider": "csv", "filePath": "data/votes.csv", "column": "comentario" },
        "sampling": { "sampleSize": 1500, "seed": 7 },
        "labels": {
            "rules": [
                { "label": "Yes", "keywords": ["yes", "sí"], "color": "green" },
                { "label": "No", "keywords": ["no"] }
            ],
            "fallback": { "label": "Blank" }
        },
        "chat": { "model": "some-model", "language": "English" },
        "output": { "chartPath": "/tmp/chart.svg", "summaryPath": "summary.json" }
    }"#;

    fn write_config(dir: &Path, contents: &str) -> String {
        let p = dir.join("config.json");
        fs::write(&p, contents).unwrap();
        p.display().to_string()
    }

    #[test]
    fn parse_empty_config() {
        let config: ScanConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ScanConfig::default());
    }

    #[test]
    fn parse_full_config() {
        let config: ScanConfig = serde_json::from_str(FULL_CONFIG).unwrap();
        assert_eq!(config.input.provider.as_deref(), Some("csv"));
        assert_eq!(config.sampling.sample_size, Some(1500));
        let rules = config.labels.unwrap().to_rules();
        assert_eq!(rules.labels(), vec!["Yes", "No", "Blank"]);
        assert_eq!(rules.color_of("No"), Some("gray"));
        assert_eq!(rules.color_of("Yes"), Some("green"));
    }

    #[test]
    fn settings_from_flags_only() {
        let args = Args::parse_from(["votescan", "-i", "votes.xlsx", "-q", "Who won?"]);
        let s = resolve_settings(&args).unwrap();
        assert_eq!(s.input_path, "votes.xlsx");
        assert_eq!(s.input_type, InputType::Xlsx);
        assert_eq!(s.column, "text");
        assert_eq!(s.sample_size, None);
        assert_eq!(s.seed, DEFAULT_SEED);
        assert_eq!(s.rules, LabelRules::default_rules());
        assert_eq!(s.chat, ChatSettings::default());
        assert_eq!(s.questions, vec!["Who won?".to_string()]);
        assert!(!s.interactive);
    }

    #[test]
    fn settings_without_input() {
        let args = Args::parse_from(["votescan"]);
        assert!(matches!(
            resolve_settings(&args),
            Err(ScanError::MissingInput {})
        ));
    }

    #[test]
    fn settings_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path(), FULL_CONFIG);
        let args = Args::parse_from(["votescan", "--config", config_path.as_str()]);
        let s = resolve_settings(&args).unwrap();
        assert_eq!(
            s.input_path,
            dir.path().join("data/votes.csv").display().to_string()
        );
        assert_eq!(s.input_type, InputType::Csv);
        assert_eq!(s.column, "comentario");
        assert_eq!(s.sample_size, Some(1500));
        assert_eq!(s.seed, 7);
        assert_eq!(s.chat.model, "some-model");
        assert_eq!(s.chat.language, "English");
        assert_eq!(s.chat.api_key_env, "GROQ_API_KEY");
        assert_eq!(s.chart_path.as_deref(), Some("/tmp/chart.svg"));
        assert_eq!(
            s.out,
            Some(dir.path().join("summary.json").display().to_string())
        );
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path(), FULL_CONFIG);
        let args = Args::parse_from([
            "votescan",
            "--config",
            config_path.as_str(),
            "-i",
            "other.xlsx",
            "--input-type",
            "xlsx",
            "--sample-size",
            "500",
            "--seed",
            "1",
            "--model",
            "flag-model",
        ]);
        let s = resolve_settings(&args).unwrap();
        assert_eq!(s.input_path, "other.xlsx");
        assert_eq!(s.input_type, InputType::Xlsx);
        assert_eq!(s.sample_size, Some(500));
        assert_eq!(s.seed, 1);
        assert_eq!(s.chat.model, "flag-model");
    }

    #[test]
    fn input_types() {
        assert_eq!(InputType::from_path("a/b.CSV"), InputType::Csv);
        assert_eq!(InputType::from_path("a/b.xlsx"), InputType::Xlsx);
        assert_eq!(InputType::from_path("noext"), InputType::Xlsx);
        assert_eq!(InputType::parse("Excel").unwrap(), InputType::Xlsx);
        assert!(InputType::parse("ods").is_err());
    }

    #[test]
    fn bad_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path(), "{ not json");
        assert!(matches!(
            read_config(&config_path),
            Err(ScanError::ParsingJson { .. })
        ));
        assert!(matches!(
            read_config("/does/not/exist.json"),
            Err(ScanError::OpeningJson { .. })
        ));
    }
}
