use crate::core::{CardSpec, ComposeResult, ConfigProvider, DealRecord, Pipeline, Storage};
use crate::derive::{derive_savings, resolve_merchant_color, resolve_rating_stars, show_savings, ThaiGrouping};
use crate::domain::model::ImageData;
use crate::domain::ports::ImageSource;
use crate::export::{batch_filename, export_card_png, EXPORT_FILENAME};
use crate::fetch::{DealsClient, ProxyImageSource};
use crate::render::fonts::FontStore;
use crate::render::primitives::placeholder_image;
use crate::render::render_preview;
use crate::theme::CardTheme;
use crate::utils::error::{CardError, Result};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use zip::write::{FileOptions, ZipWriter};

/// 整條匯出管線：抓列表 → 推導呈現值與抓圖 → 畫卡輸出。
pub struct CardPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: DealsClient,
    images: Arc<ProxyImageSource>,
    fonts: Arc<FontStore>,
    theme: Arc<CardTheme>,
    /// extract 抓到的列表中繼資料，transform 組結果時要用
    listing_meta: Mutex<Option<(Option<String>, u64)>>,
}

impl<S: Storage, C: ConfigProvider> CardPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        Self::with_theme(storage, config, CardTheme::default())
    }

    pub fn with_theme(storage: S, config: C, theme: CardTheme) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds());
        let fonts = Arc::new(FontStore::new()?);
        let client = DealsClient::new(config.api_endpoint(), timeout)?;
        let images = Arc::new(ProxyImageSource::new(
            config.api_endpoint(),
            config.proxy_endpoint(),
            timeout,
            fonts.clone(),
        )?);
        Ok(Self {
            storage,
            config,
            client,
            images,
            fonts,
            theme: Arc::new(theme),
            listing_meta: Mutex::new(None),
        })
    }

    /// 有限併發抓圖，結果按原順序放回
    async fn fetch_images(&self, deals: &[DealRecord]) -> Vec<ImageData> {
        let variant = self.config.variant();
        let semaphore = Arc::new(Semaphore::new(self.config.concurrent_requests().max(1)));
        let mut set = JoinSet::new();

        for (index, deal) in deals.iter().enumerate() {
            let semaphore = semaphore.clone();
            let images = self.images.clone();
            let url = deal.image_url.clone();
            set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                (index, images.fetch(&url, variant).await)
            });
        }

        let mut slots: Vec<Option<ImageData>> = vec![None; deals.len()];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, image)) => slots[index] = Some(image),
                Err(e) => tracing::warn!("⚠️ image fetch task failed: {}", e),
            }
        }

        slots
            .into_iter()
            .map(|slot| slot.unwrap_or_else(|| placeholder_image(variant, &self.fonts)))
            .collect()
    }

    /// 把一筆卡片的 PNG 與附屬檔寫進儲存層
    async fn export_one(&self, spec: CardSpec, stem: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let variant = self.config.variant();
        let caps = self.config.capabilities();
        let mut written = Vec::new();

        let png_name = format!("{}.png", stem);
        let png = export_card_png(
            spec.clone(),
            variant,
            self.theme.clone(),
            self.fonts.clone(),
        )
        .await?;
        self.storage.write_file(&png_name, &png).await?;
        written.push((png_name, png));

        // 複製標題的附屬檔，失敗不擋匯出
        if caps.can_copy {
            let title_name = format!("{}.title.txt", stem);
            match self
                .storage
                .write_file(&title_name, spec.record.title.as_bytes())
                .await
            {
                Ok(()) => written.push((title_name, spec.record.title.clone().into_bytes())),
                Err(e) => tracing::warn!("⚠️ failed to write title sidecar: {}", e),
            }
        }

        if self.config.preview() {
            let theme = self.theme.clone();
            let fonts = self.fonts.clone();
            let preview_spec = spec.clone();
            let preview = tokio::task::spawn_blocking(move || {
                let pixmap = render_preview(&preview_spec, variant, &theme, &fonts, &caps)?;
                pixmap.encode_png().map_err(|e| CardError::ExportError {
                    message: format!("PNG encoding failed: {}", e),
                })
            })
            .await
            .map_err(|e| CardError::ExportError {
                message: format!("preview task failed: {}", e),
            })??;
            let preview_name = format!("{}.preview.png", stem);
            self.storage.write_file(&preview_name, &preview).await?;
            written.push((preview_name, preview));
        }

        Ok(written)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for CardPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<DealRecord>> {
        tracing::debug!("Fetching deals from: {}", self.config.api_endpoint());
        let listing = self
            .client
            .fetch_page(
                self.config.merchant(),
                self.config.search(),
                self.config.page(),
                self.config.page_size(),
            )
            .await?;

        *self.listing_meta.lock().await =
            Some((listing.timestamp.clone(), listing.total_products));

        if listing.products.is_empty() {
            // 空頁照實回傳，load 階段會以「無卡可匯出」收尾
            tracing::warn!("No deals matched the current filters");
        }

        Ok(listing.products)
    }

    async fn transform(&self, deals: Vec<DealRecord>) -> Result<ComposeResult> {
        let fmt = ThaiGrouping;
        let images = self.fetch_images(&deals).await;

        let cards: Vec<CardSpec> = deals
            .into_iter()
            .zip(images)
            .map(|(record, image)| CardSpec {
                savings: derive_savings(&record.original_price, &record.price, &fmt),
                show_savings: show_savings(&record.original_price, &record.price),
                merchant_color: resolve_merchant_color(&record.merchant),
                rating: resolve_rating_stars(
                    record.rating.as_deref(),
                    record.reviews_count.as_deref(),
                ),
                image,
                record,
            })
            .collect();

        let meta = self.listing_meta.lock().await.clone();
        let (timestamp, total_products) = match meta {
            Some((timestamp, total)) => (timestamp, total),
            None => (None, cards.len() as u64),
        };

        if let Some(ts) = timestamp.as_deref() {
            // 後端的 timestamp 是本地時間、無時區
            if let Ok(scraped) = chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S") {
                tracing::info!("📅 Listing scraped at {}", scraped.format("%Y-%m-%d %H:%M"));
            }
        }

        Ok(ComposeResult {
            total_products,
            timestamp,
            cards,
        })
    }

    async fn load(&self, result: ComposeResult) -> Result<String> {
        if result.cards.is_empty() {
            return Err(CardError::ExportError {
                message: "no cards to export".to_string(),
            });
        }

        let single = result.cards.len() == 1;
        let mut archive_entries: Vec<(String, Vec<u8>)> = Vec::new();
        let mut exported = 0usize;

        for (index, card) in result.cards.into_iter().enumerate() {
            let stem = if single {
                EXPORT_FILENAME.trim_end_matches(".png").to_string()
            } else {
                batch_filename(index + 1).trim_end_matches(".png").to_string()
            };

            match self.export_one(card, &stem).await {
                Ok(written) => {
                    exported += 1;
                    archive_entries.extend(written);
                }
                Err(e) => {
                    // 單張失敗不中斷整批
                    tracing::error!("❌ failed to export card {}: {}", index + 1, e);
                    eprintln!("{}", e.user_friendly_message());
                }
            }
        }

        if exported == 0 {
            return Err(CardError::ExportError {
                message: "all card exports failed".to_string(),
            });
        }

        let output_path = self.config.output_path().trim_end_matches('/').to_string();

        if self.config.archive() {
            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                for (name, data) in &archive_entries {
                    zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
                    zip.write_all(data)?;
                }
                let cursor = zip.finish()?;
                cursor.into_inner()
            };
            tracing::debug!("Writing ZIP archive ({} bytes) to storage", zip_data.len());
            self.storage.write_file("product-cards.zip", &zip_data).await?;
            return Ok(format!("{}/product-cards.zip", output_path));
        }

        if single {
            Ok(format!("{}/{}", output_path, EXPORT_FILENAME))
        } else {
            tracing::info!("✅ exported {} cards", exported);
            Ok(output_path)
        }
    }
}
