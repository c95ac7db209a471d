use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// 後端 `/api/deals` 回傳的單筆商品資料
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealRecord {
    pub title: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub original_price: String,
    #[serde(default)]
    pub discount: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub product_url: String,
    #[serde(default)]
    pub merchant: String,
    #[serde(default)]
    pub merchant_image: String,
    // 後端有時送字串、有時送數字
    #[serde(default, deserialize_with = "string_or_number")]
    pub rating: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub reviews_count: Option<String>,
    /// 只有 owner 管理的商品才有 id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

/// `/api/deals` 的回應格式
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealListing {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub total_products: u64,
    #[serde(default)]
    pub products: Vec<DealRecord>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => {
            if s.is_empty() {
                None
            } else {
                Some(s)
            }
        }
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// 卡片版型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardVariant {
    /// 多欄列表用的緊湊卡片
    Grid,
    /// 固定 1200x630 的分享卡片
    Social,
}

impl CardVariant {
    /// 邏輯像素尺寸（匯出時再乘上固定倍率）
    pub fn logical_size(self) -> (u32, u32) {
        match self {
            CardVariant::Grid => (300, 420),
            CardVariant::Social => (1200, 630),
        }
    }

    /// 圖片載入失敗時佔位圖的尺寸，依圖片槽位而定
    pub fn placeholder_size(self) -> (u32, u32) {
        match self {
            CardVariant::Grid => (300, 300),
            CardVariant::Social => (600, 630),
        }
    }
}

impl FromStr for CardVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "grid" => Ok(CardVariant::Grid),
            "social" | "facebook" => Ok(CardVariant::Social),
            other => Err(format!("unknown card variant: {}", other)),
        }
    }
}

impl fmt::Display for CardVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardVariant::Grid => write!(f, "grid"),
            CardVariant::Social => write!(f, "social"),
        }
    }
}

/// 一張卡片可掛的操作按鈕。按鈕永遠疊在可匯出範圍之外，
/// 匯出的圖片不會包含任何按鈕。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub can_copy: bool,
    pub can_download: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_open_link: bool,
}

impl Capabilities {
    /// Grid 列表卡片：複製標題 + 下載 + 點擊開連結
    pub fn grid() -> Self {
        Self {
            can_copy: true,
            can_download: true,
            can_open_link: true,
            ..Self::default()
        }
    }

    /// 分享卡片：只有下載
    pub fn social() -> Self {
        Self {
            can_download: true,
            ..Self::default()
        }
    }

    /// Owner 管理模式：下載 + 編輯 + 刪除
    pub fn owner() -> Self {
        Self {
            can_download: true,
            can_edit: true,
            can_delete: true,
            ..Self::default()
        }
    }

    pub fn any(&self) -> bool {
        self.can_copy || self.can_download || self.can_edit || self.can_delete || self.can_open_link
    }
}

/// sRGB 顏色，領域層不依賴繪圖函式庫
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// 星級評分的呈現值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingStars {
    /// 實心星數，0..=5
    pub filled: u8,
    /// 例如 "4.2/5 (10)"，沒有評論數就不帶括號
    pub label: String,
}

/// 已解碼的點陣圖，straight-alpha RGBA
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl ImageData {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        debug_assert_eq!(rgba.len(), (width * height * 4) as usize);
        Self { width, height, rgba }
    }
}

/// transform 階段的產物：一筆商品加上所有推導出的呈現值，
/// 渲染卡片所需的輸入到此已全部齊備。
#[derive(Debug, Clone)]
pub struct CardSpec {
    pub record: DealRecord,
    /// 已依地區格式化的省下金額
    pub savings: String,
    /// 是否顯示省下金額與劃線原價（original > price 且 original != 0）
    pub show_savings: bool,
    pub merchant_color: Rgb,
    pub rating: Option<RatingStars>,
    /// 代理抓回的商品圖，失敗時為佔位圖
    pub image: ImageData,
}

/// transform 階段的整體結果
#[derive(Debug, Clone)]
pub struct ComposeResult {
    pub cards: Vec<CardSpec>,
    pub total_products: u64,
    pub timestamp: Option<String>,
}
