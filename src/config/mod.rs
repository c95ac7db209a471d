pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::model::{Capabilities, CardVariant};
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{
    validate_path, validate_positive_number, validate_range, validate_url, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "prodeal-cards")]
#[command(about = "Render scraped e-commerce deals into shareable product card PNGs")]
pub struct CliConfig {
    #[arg(long, default_value = "http://localhost:8000/api/deals")]
    pub api_endpoint: String,

    /// 圖片代理端點，不給就直接抓原始圖片網址
    #[arg(long)]
    pub proxy_endpoint: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// 商店篩選；"All" 等同不篩選
    #[arg(long)]
    pub merchant: Option<String>,

    #[arg(long)]
    pub search: Option<String>,

    #[arg(long, default_value = "1")]
    pub page: u32,

    #[arg(long, default_value = "12")]
    pub page_size: u32,

    /// 卡片版型：grid 或 social
    #[arg(long, default_value = "social")]
    pub variant: CardVariant,

    /// Owner 管理模式（預覽圖多出編輯與刪除按鈕）
    #[arg(long)]
    pub owner: bool,

    /// 把整頁輸出打包成 product-cards.zip
    #[arg(long)]
    pub archive: bool,

    /// 額外輸出帶操作按鈕的預覽圖
    #[arg(long)]
    pub preview: bool,

    #[arg(long, default_value = "5")]
    pub concurrent_requests: usize,

    #[arg(long, default_value = "30")]
    pub timeout_seconds: u64,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Enable system monitoring")]
    pub monitor: bool,

    /// 改用 TOML 配置檔（其餘旗標忽略）
    #[arg(long)]
    pub config: Option<String>,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn proxy_endpoint(&self) -> Option<&str> {
        self.proxy_endpoint.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn merchant(&self) -> Option<&str> {
        self.merchant.as_deref()
    }

    fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    fn page(&self) -> u32 {
        self.page
    }

    fn page_size(&self) -> u32 {
        self.page_size
    }

    fn variant(&self) -> CardVariant {
        self.variant
    }

    fn capabilities(&self) -> Capabilities {
        if self.owner {
            Capabilities::owner()
        } else {
            match self.variant {
                CardVariant::Grid => Capabilities::grid(),
                CardVariant::Social => Capabilities::social(),
            }
        }
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn archive(&self) -> bool {
        self.archive
    }

    fn preview(&self) -> bool {
        self.preview
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api_endpoint", &self.api_endpoint)?;
        if let Some(proxy) = &self.proxy_endpoint {
            validate_url("proxy_endpoint", proxy)?;
        }
        validate_path("output_path", &self.output_path)?;
        validate_positive_number("concurrent_requests", self.concurrent_requests, 1)?;
        validate_range("page", self.page, 1, 10_000)?;
        validate_range("page_size", self.page_size, 1, 100)?;
        validate_range("timeout_seconds", self.timeout_seconds, 1, 600)?;
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    fn base_args() -> Vec<&'static str> {
        vec!["prodeal-cards"]
    }

    #[test]
    fn test_defaults() {
        let config = CliConfig::parse_from(base_args());
        assert_eq!(config.api_endpoint, "http://localhost:8000/api/deals");
        assert_eq!(config.page, 1);
        assert_eq!(config.page_size, 12);
        assert_eq!(config.variant, CardVariant::Social);
        assert!(!config.owner);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_variant_parses_facebook_alias() {
        let config = CliConfig::parse_from(["prodeal-cards", "--variant", "facebook"]);
        assert_eq!(config.variant, CardVariant::Social);
    }

    #[test]
    fn test_capabilities_follow_variant_and_owner() {
        let grid = CliConfig::parse_from(["prodeal-cards", "--variant", "grid"]);
        assert!(grid.capabilities().can_copy);
        assert!(!grid.capabilities().can_edit);

        let social = CliConfig::parse_from(base_args());
        assert!(social.capabilities().can_download);
        assert!(!social.capabilities().can_copy);

        let owner = CliConfig::parse_from(["prodeal-cards", "--owner"]);
        assert!(owner.capabilities().can_edit);
        assert!(owner.capabilities().can_delete);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = CliConfig::parse_from(base_args());
        config.page_size = 0;
        assert!(config.validate().is_err());

        let mut config = CliConfig::parse_from(base_args());
        config.api_endpoint = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = CliConfig::parse_from(base_args());
        config.proxy_endpoint = Some("not a url".to_string());
        assert!(config.validate().is_err());
    }
}
