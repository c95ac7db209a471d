//! 對外抓取：商品列表 API 與圖片代理。

use crate::domain::model::{CardVariant, DealListing, ImageData};
use crate::domain::ports::ImageSource;
use crate::render::fonts::FontStore;
use crate::render::primitives::placeholder_image;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// `/api/deals` 的客戶端
pub struct DealsClient {
    client: reqwest::Client,
    endpoint: String,
}

impl DealsClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    /// 抓一頁商品列表。商店篩選 "All" 等同不篩選，不送參數。
    pub async fn fetch_page(
        &self,
        merchant: Option<&str>,
        search: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> Result<DealListing> {
        let query = query_pairs(merchant, search, page, page_size);
        let response = self.client.get(&self.endpoint).query(&query).send().await?;

        // 非 2xx 跟連線失敗同樣視為 API 錯誤，不造假資料
        let listing: DealListing = response.error_for_status()?.json().await?;
        Ok(listing)
    }
}

fn query_pairs(
    merchant: Option<&str>,
    search: Option<&str>,
    page: u32,
    page_size: u32,
) -> Vec<(&'static str, String)> {
    let mut pairs = vec![
        ("page", page.to_string()),
        ("page_size", page_size.to_string()),
    ];
    if let Some(merchant) = merchant {
        if !merchant.eq_ignore_ascii_case("all") {
            pairs.push(("merchant", merchant.to_string()));
        }
    }
    if let Some(search) = search {
        if !search.trim().is_empty() {
            pairs.push(("search", search.to_string()));
        }
    }
    pairs
}

/// 經代理抓商品圖。永不失敗：逾時、HTTP 錯誤、解碼失敗
/// 一律退回佔位圖並留下警告。
pub struct ProxyImageSource {
    client: reqwest::Client,
    /// 例如 `http://localhost:8000/api/image-proxy`；None 表示直抓
    proxy_endpoint: Option<String>,
    /// 解析相對圖片路徑用的基底
    base: url::Url,
    timeout: Duration,
    fonts: Arc<FontStore>,
}

impl ProxyImageSource {
    pub fn new(
        api_endpoint: &str,
        proxy_endpoint: Option<&str>,
        timeout: Duration,
        fonts: Arc<FontStore>,
    ) -> Result<Self> {
        let base = url::Url::parse(api_endpoint).map_err(|e| {
            crate::utils::error::CardError::ConfigError {
                message: format!("invalid API endpoint '{}': {}", api_endpoint, e),
            }
        })?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            proxy_endpoint: proxy_endpoint.map(|s| s.to_string()),
            base,
            timeout,
            fonts,
        })
    }

    /// 產生實際請求網址：走代理時把原網址百分比編碼塞進
    /// `?url=`；相對路徑先用 API 基底解析成絕對網址。
    fn request_url(&self, image_url: &str) -> Option<String> {
        let absolute = self.base.join(image_url).ok()?;
        match &self.proxy_endpoint {
            Some(proxy) => {
                let encoded: String =
                    url::form_urlencoded::byte_serialize(absolute.as_str().as_bytes()).collect();
                Some(format!("{}?url={}", proxy, encoded))
            }
            None => Some(absolute.into()),
        }
    }

    async fn try_fetch(&self, image_url: &str) -> Option<ImageData> {
        let target = self.request_url(image_url)?;
        let response = tokio::time::timeout(self.timeout, self.client.get(&target).send())
            .await
            .ok()?
            .ok()?;
        if !response.status().is_success() {
            tracing::warn!("⚠️ 圖片代理回應 {}：{}", response.status(), target);
            return None;
        }
        let bytes = response.bytes().await.ok()?;
        let decoded = image::load_from_memory(&bytes).ok()?;
        let rgba = decoded.into_rgba8();
        let (w, h) = rgba.dimensions();
        Some(ImageData::new(w, h, rgba.into_raw()))
    }
}

#[async_trait]
impl ImageSource for ProxyImageSource {
    async fn fetch(&self, url: &str, variant: CardVariant) -> ImageData {
        if url.trim().is_empty() {
            return placeholder_image(variant, &self.fonts);
        }
        match self.try_fetch(url).await {
            Some(image) => image,
            None => {
                tracing::warn!("⚠️ 圖片抓取失敗，改用佔位圖：{}", url);
                placeholder_image(variant, &self.fonts)
            }
        }
    }
}
