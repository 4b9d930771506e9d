// file: src/cli/commands.rs
// version: 1.0.0
// guid: 83f542ba-f6a7-48df-b1b6-22e2885ff6ed

//! Command implementations for the CLI

use crate::{
    config::DeployConfig,
    error::DeployError,
    util::{SafeCharset, ShellQuoter, SshRunner},
    writeexts::{AllOf, DigitsOnly, MatchesPattern, NoNewline, NonEmpty, OwnershipPolicy, RecordWriter},
    Result,
};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

/// Validator selection for the `write` command
#[derive(Debug, Clone, Default)]
pub struct ValidationFlags {
    pub digits: bool,
    pub non_empty: bool,
    pub single_line: bool,
    pub pattern: Option<String>,
}

impl ValidationFlags {
    pub fn build(&self) -> Result<AllOf> {
        let mut validators = AllOf::new();
        if self.non_empty {
            validators = validators.with(NonEmpty);
        }
        if self.single_line {
            validators = validators.with(NoNewline);
        }
        if self.digits {
            validators = validators.with(DigitsOnly);
        }
        if let Some(ref pattern) = self.pattern {
            let matcher = MatchesPattern::new(pattern)
                .map_err(|e| DeployError::script(format!("Invalid pattern {}: {}", pattern, e)))?;
            validators = validators.with(matcher);
        }
        Ok(validators)
    }
}

/// Print every argument quoted, space separated, on one line
pub fn quote_command(config: &DeployConfig, args: &[String]) -> Result<()> {
    let quoter = ShellQuoter::new(SafeCharset::new(&config.quoting.safe_punctuation)?);
    let quoted: Vec<String> = args.iter().map(|arg| quoter.quote(arg)).collect();
    println!("{}", quoted.join(" "));
    Ok(())
}

/// Run a remote command and copy its stdout to ours
pub fn ssh_command(config: &DeployConfig, host: &str, command: &[String]) -> Result<()> {
    let runner = SshRunner::from_config(config)?;
    let output = runner.run(host, command)?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(&output)
        .and_then(|_| stdout.flush())
        .map_err(|e| DeployError::script(format!("Failed to write output: {}", e)))?;
    Ok(())
}

/// Append records gathered from `--from` and `--set` to `file`
pub fn write_command(
    config: &DeployConfig,
    file: &Path,
    from: Option<&str>,
    set: &[(String, String)],
    flags: &ValidationFlags,
) -> Result<()> {
    let mut records = match from {
        Some("-") => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .map_err(|e| DeployError::script(format!("Failed to read stdin: {}", e)))?;
            parse_records(&content, None)?
        }
        Some(path) => {
            let path = Path::new(path);
            let content =
                std::fs::read_to_string(path).map_err(|e| DeployError::from_fs(path, e))?;
            parse_records(&content, path.extension().and_then(|e| e.to_str()))?
        }
        None => BTreeMap::new(),
    };

    for (key, value) in set {
        records.insert(key.clone(), value.clone());
    }

    let validators = flags.build()?;
    let writer = RecordWriter::new(OwnershipPolicy::from(&config.records));
    writer.write(file, &records, &validators)?;

    info!("Wrote {} records to {}", records.len(), file.display());
    Ok(())
}

/// Parse a flat JSON or YAML object of scalar values.
///
/// `.json` files go through the JSON parser; anything else, including
/// stdin, is read as YAML, which also accepts JSON objects.
pub fn parse_records(content: &str, extension: Option<&str>) -> Result<BTreeMap<String, String>> {
    if extension == Some("json") {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(content)
            .map_err(|e| DeployError::script(format!("Invalid JSON records: {}", e)))?;
        raw.into_iter()
            .map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Number(n) => n.to_string(),
                    serde_json::Value::Bool(b) => b.to_string(),
                    _ => return Err(non_scalar(&key)),
                };
                Ok((key, value))
            })
            .collect()
    } else {
        let raw: BTreeMap<String, serde_yaml::Value> = serde_yaml::from_str(content)
            .map_err(|e| DeployError::script(format!("Invalid YAML records: {}", e)))?;
        raw.into_iter()
            .map(|(key, value)| {
                let value = match value {
                    serde_yaml::Value::String(s) => s,
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    _ => return Err(non_scalar(&key)),
                };
                Ok((key, value))
            })
            .collect()
    }
}

fn non_scalar(key: &str) -> DeployError {
    DeployError::script(format!("Record {} must be a string, number or boolean", key))
}
