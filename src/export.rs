//! PNG 匯出。渲染倍率固定 2x，背景透明（圓角外的像素
//! 疊到任何頁面上都不會出現白角）。

use crate::domain::model::{CardSpec, CardVariant};
use crate::render::fonts::FontStore;
use crate::render::render_card;
use crate::theme::CardTheme;
use crate::utils::error::{CardError, Result};
use std::sync::Arc;

/// 匯出固定用 2x，跟裝置與預覽倍率無關
pub const EXPORT_SCALE: f32 = 2.0;

/// 單張匯出的固定檔名
pub const EXPORT_FILENAME: &str = "product-card.png";

/// 同步路徑：渲染 + PNG 編碼。CPU 密集，非同步環境請走
/// [`export_card_png`]，它會把這段丟進 blocking pool。
pub fn encode_card_png(
    spec: &CardSpec,
    variant: CardVariant,
    theme: &CardTheme,
    fonts: &FontStore,
) -> Result<Vec<u8>> {
    let pixmap = render_card(spec, variant, theme, fonts, EXPORT_SCALE)?;
    pixmap.encode_png().map_err(|e| CardError::ExportError {
        message: format!("PNG encoding failed: {}", e),
    })
}

/// 非同步匯出：整段點陣化丟進 tokio 的 blocking pool，
/// 不會卡住 runtime 的工作執行緒。
pub async fn export_card_png(
    spec: CardSpec,
    variant: CardVariant,
    theme: Arc<CardTheme>,
    fonts: Arc<FontStore>,
) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || encode_card_png(&spec, variant, &theme, &fonts))
        .await
        .map_err(|e| CardError::ExportError {
            message: format!("rasterization task failed: {}", e),
        })?
}

/// 批次匯出時第 n 張（1 起算）的檔名
pub fn batch_filename(index: usize) -> String {
    format!("product-card-{}.png", index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::{derive_savings, resolve_merchant_color, resolve_rating_stars, show_savings, ThaiGrouping};
    use crate::domain::model::DealRecord;
    use crate::render::primitives::placeholder_image;

    fn sample_spec(fonts: &FontStore, variant: CardVariant) -> CardSpec {
        let record = DealRecord {
            title: "Wireless Earbuds Pro".to_string(),
            price: "1,290".to_string(),
            original_price: "2,590".to_string(),
            discount: "-50%".to_string(),
            image_url: String::new(),
            product_url: String::new(),
            merchant: "Shopee".to_string(),
            merchant_image: String::new(),
            rating: Some("4.8/5".to_string()),
            reviews_count: Some("2341".to_string()),
            id: None,
        };
        let fmt = ThaiGrouping;
        CardSpec {
            savings: derive_savings(&record.original_price, &record.price, &fmt),
            show_savings: show_savings(&record.original_price, &record.price),
            merchant_color: resolve_merchant_color(&record.merchant),
            rating: resolve_rating_stars(record.rating.as_deref(), record.reviews_count.as_deref()),
            image: placeholder_image(variant, fonts),
            record,
        }
    }

    #[test]
    fn test_encode_produces_png_signature() {
        let fonts = FontStore::new().unwrap();
        let theme = CardTheme::default();
        let spec = sample_spec(&fonts, CardVariant::Social);
        let bytes = encode_card_png(&spec, CardVariant::Social, &theme, &fonts).unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }

    #[test]
    fn test_encoded_png_has_physical_dimensions() {
        let fonts = FontStore::new().unwrap();
        let theme = CardTheme::default();
        let spec = sample_spec(&fonts, CardVariant::Social);
        let bytes = encode_card_png(&spec, CardVariant::Social, &theme, &fonts).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 2400);
        assert_eq!(decoded.height(), 1260);
    }

    #[test]
    fn test_encode_is_idempotent() {
        let fonts = FontStore::new().unwrap();
        let theme = CardTheme::default();
        let spec = sample_spec(&fonts, CardVariant::Grid);
        let a = encode_card_png(&spec, CardVariant::Grid, &theme, &fonts).unwrap();
        let b = encode_card_png(&spec, CardVariant::Grid, &theme, &fonts).unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_async_export_matches_sync() {
        let fonts = Arc::new(FontStore::new().unwrap());
        let theme = Arc::new(CardTheme::default());
        let spec = sample_spec(&fonts, CardVariant::Grid);
        let sync_bytes = encode_card_png(&spec, CardVariant::Grid, &theme, &fonts).unwrap();
        let async_bytes = export_card_png(spec, CardVariant::Grid, theme, fonts)
            .await
            .unwrap();
        assert_eq!(sync_bytes, async_bytes);
    }

    #[test]
    fn test_batch_filenames() {
        assert_eq!(batch_filename(1), "product-card-1.png");
        assert_eq!(batch_filename(12), "product-card-12.png");
    }
}
