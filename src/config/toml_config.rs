use crate::core::ConfigProvider;
use crate::domain::model::{Capabilities, CardVariant};
use crate::utils::error::{CardError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    pub render: Option<RenderConfig>,
    pub export: ExportConfig,
    pub monitoring: Option<MonitoringConfig>,
    pub environment: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub endpoint: String,
    pub proxy_endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub merchant: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// "grid" 或 "social"
    pub variant: Option<String>,
    pub owner_mode: Option<bool>,
    pub preview: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub output_path: String,
    pub archive: Option<bool>,
    pub concurrent_requests: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CardError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CardError::InvalidConfigValueError {
            field: "toml_parsing".to_string(),
            value: String::new(),
            reason: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        // 匹配 ${VAR_NAME} 格式，未設定的變數保留原樣
        let re = Regex::new(r"\$\{([^}]+)\}").expect("static regex");

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        crate::utils::validation::validate_url("source.endpoint", &self.source.endpoint)?;
        if let Some(proxy) = &self.source.proxy_endpoint {
            crate::utils::validation::validate_url("source.proxy_endpoint", proxy)?;
        }
        crate::utils::validation::validate_path("export.output_path", &self.export.output_path)?;

        if let Some(concurrent) = self.export.concurrent_requests {
            crate::utils::validation::validate_positive_number(
                "export.concurrent_requests",
                concurrent,
                1,
            )?;
        }
        if let Some(page_size) = self.source.page_size {
            crate::utils::validation::validate_range("source.page_size", page_size, 1, 100)?;
        }

        if let Some(render) = &self.render {
            if let Some(variant) = &render.variant {
                CardVariant::from_str(variant).map_err(|reason| {
                    CardError::InvalidConfigValueError {
                        field: "render.variant".to_string(),
                        value: variant.clone(),
                        reason,
                    }
                })?;
            }
        }

        Ok(())
    }

    fn owner_mode(&self) -> bool {
        self.render
            .as_ref()
            .and_then(|r| r.owner_mode)
            .unwrap_or(false)
    }

    /// 取得監控設定
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.source.endpoint
    }

    fn proxy_endpoint(&self) -> Option<&str> {
        self.source.proxy_endpoint.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.export.output_path
    }

    fn merchant(&self) -> Option<&str> {
        self.source.merchant.as_deref()
    }

    fn search(&self) -> Option<&str> {
        self.source.search.as_deref()
    }

    fn page(&self) -> u32 {
        self.source.page.unwrap_or(1)
    }

    fn page_size(&self) -> u32 {
        self.source.page_size.unwrap_or(12)
    }

    fn variant(&self) -> CardVariant {
        self.render
            .as_ref()
            .and_then(|r| r.variant.as_deref())
            .and_then(|v| CardVariant::from_str(v).ok())
            .unwrap_or(CardVariant::Social)
    }

    fn capabilities(&self) -> Capabilities {
        if self.owner_mode() {
            Capabilities::owner()
        } else {
            match self.variant() {
                CardVariant::Grid => Capabilities::grid(),
                CardVariant::Social => Capabilities::social(),
            }
        }
    }

    fn concurrent_requests(&self) -> usize {
        self.export.concurrent_requests.unwrap_or(5)
    }

    fn timeout_seconds(&self) -> u64 {
        self.source.timeout_seconds.unwrap_or(30)
    }

    fn archive(&self) -> bool {
        self.export.archive.unwrap_or(false)
    }

    fn preview(&self) -> bool {
        self.render
            .as_ref()
            .and_then(|r| r.preview)
            .unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC_CONFIG: &str = r#"
[pipeline]
name = "deal-cards"
description = "Export deal cards"
version = "1.0.0"

[source]
endpoint = "http://localhost:8000/api/deals"
proxy_endpoint = "http://localhost:8000/api/image-proxy"
merchant = "Lazada"
page_size = 24

[render]
variant = "grid"
preview = true

[export]
output_path = "./cards"
archive = true
concurrent_requests = 8
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = TomlConfig::from_toml_str(BASIC_CONFIG).unwrap();
        assert_eq!(config.pipeline.name, "deal-cards");
        assert_eq!(config.api_endpoint(), "http://localhost:8000/api/deals");
        assert_eq!(config.merchant(), Some("Lazada"));
        assert_eq!(config.page_size(), 24);
        assert_eq!(config.variant(), CardVariant::Grid);
        assert!(config.preview());
        assert!(config.archive());
        assert_eq!(config.concurrent_requests(), 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_for_optional_sections() {
        let config = TomlConfig::from_toml_str(
            r#"
[pipeline]
name = "minimal"
description = "minimal"
version = "0.1"

[source]
endpoint = "http://localhost:8000/api/deals"

[export]
output_path = "./output"
"#,
        )
        .unwrap();
        assert_eq!(config.variant(), CardVariant::Social);
        assert_eq!(config.page(), 1);
        assert_eq!(config.page_size(), 12);
        assert_eq!(config.timeout_seconds(), 30);
        assert!(!config.archive());
        assert!(!config.preview());
        assert!(!config.monitoring_enabled());
        assert!(config.capabilities().can_download);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("DEAL_CARDS_TEST_ENDPOINT", "http://envhost:8000/api/deals");
        let config = TomlConfig::from_toml_str(
            r#"
[pipeline]
name = "env"
description = "env"
version = "0.1"

[source]
endpoint = "${DEAL_CARDS_TEST_ENDPOINT}"

[export]
output_path = "./output"
"#,
        )
        .unwrap();
        assert_eq!(config.api_endpoint(), "http://envhost:8000/api/deals");
        std::env::remove_var("DEAL_CARDS_TEST_ENDPOINT");
    }

    #[test]
    fn test_invalid_variant_fails_validation() {
        let config = TomlConfig::from_toml_str(
            r#"
[pipeline]
name = "bad"
description = "bad"
version = "0.1"

[source]
endpoint = "http://localhost:8000/api/deals"

[render]
variant = "polaroid"

[export]
output_path = "./output"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_round_trip() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(BASIC_CONFIG.as_bytes()).unwrap();
        let config = TomlConfig::from_file(file.path()).unwrap();
        assert_eq!(config.pipeline.name, "deal-cards");
    }

    #[test]
    fn test_owner_mode_overrides_variant_capabilities() {
        let config = TomlConfig::from_toml_str(
            r#"
[pipeline]
name = "owner"
description = "owner"
version = "0.1"

[source]
endpoint = "http://localhost:8000/api/deals"

[render]
variant = "grid"
owner_mode = true

[export]
output_path = "./output"
"#,
        )
        .unwrap();
        let caps = config.capabilities();
        assert!(caps.can_edit);
        assert!(caps.can_delete);
        assert!(!caps.can_copy);
    }
}
