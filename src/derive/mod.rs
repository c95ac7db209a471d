//! 呈現值推導：把原始欄位（千分位價格字串、商店代碼、評分字串）
//! 變成卡片要畫的值。全部是純函式，輸入再髒都不會失敗，
//! 只會退回安全預設值。

use crate::domain::model::{RatingStars, Rgb};
use crate::domain::ports::NumberFormat;

/// 未知商店一律用這個預設色（antd 藍）
pub const DEFAULT_MERCHANT_COLOR: Rgb = Rgb::new(0x18, 0x90, 0xff);

const MERCHANT_COLORS: &[(&str, Rgb)] = &[
    ("lazada", Rgb::new(0xf5, 0x72, 0x24)),
    ("shopee", Rgb::new(0xee, 0x4d, 0x2d)),
    ("jd central", Rgb::new(0xe1, 0x25, 0x1b)),
    ("advice", Rgb::new(0x00, 0xa4, 0xe4)),
    ("power buy", Rgb::new(0xf5, 0x82, 0x20)),
    ("bigc", Rgb::new(0x81, 0xbf, 0x00)),
    ("homepro", Rgb::new(0x00, 0x6a, 0xb5)),
];

/// 千分位字串轉浮點數。只去掉逗號，其他交給 parse。
fn parse_price(text: &str) -> Option<f64> {
    let cleaned = text.replace(',', "");
    cleaned.trim().parse::<f64>().ok()
}

/// 省下金額 = 原價 - 現價，任一邊解析失敗就是 0，不會報錯。
/// 格式化交給注入的 formatter（正式環境是泰文千分位）。
pub fn derive_savings(original_price: &str, price: &str, fmt: &dyn NumberFormat) -> String {
    match (parse_price(original_price), parse_price(price)) {
        (Some(original), Some(current)) => fmt.format(original - current),
        _ => fmt.format(0.0),
    }
}

/// 省下金額徽章與劃線原價的顯示條件。
/// 採用較嚴的規則：原價要真的比現價高，且原價不為 0。
pub fn show_savings(original_price: &str, price: &str) -> bool {
    match (parse_price(original_price), parse_price(price)) {
        (Some(original), Some(current)) => original > current && original != 0.0,
        _ => false,
    }
}

/// 商店代碼對應強調色。全函式：任何輸入（含空字串）都有顏色。
pub fn resolve_merchant_color(merchant_code: &str) -> Rgb {
    let needle = merchant_code.trim().to_lowercase();
    MERCHANT_COLORS
        .iter()
        .find(|(code, _)| *code == needle)
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_MERCHANT_COLOR)
}

/// 評分字串（"4.2/5"）轉星級。斜線前的數字不是正數就整塊不顯示。
/// 實心星數取整數部分，例如 3.5 → 3 顆、4.2 → 4 顆。
pub fn resolve_rating_stars(
    rating: Option<&str>,
    reviews_count: Option<&str>,
) -> Option<RatingStars> {
    let rating = rating?;
    let value = rating.split('/').next()?.trim().parse::<f32>().ok()?;
    if !(value > 0.0) {
        return None;
    }

    let filled = value.clamp(0.0, 5.0).floor() as u8;
    let label = match reviews_count {
        Some(count) => format!("{} ({})", rating, count),
        None => rating.to_string(),
    };

    Some(RatingStars { filled, label })
}

/// 泰文地區數字格式：三位一撇，小數最多三位（尾零截掉）。
#[derive(Debug, Clone, Copy, Default)]
pub struct ThaiGrouping;

impl NumberFormat for ThaiGrouping {
    fn format(&self, value: f64) -> String {
        let negative = value < 0.0;
        // 以千分之一為最小單位，避免浮點尾差
        let milli = (value.abs() * 1000.0).round() as u64;
        let integer = milli / 1000;
        let fraction = milli % 1000;

        let mut grouped = String::new();
        let digits = integer.to_string();
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        if fraction > 0 {
            let frac = format!("{:03}", fraction);
            grouped.push('.');
            grouped.push_str(frac.trim_end_matches('0'));
        }

        if negative && milli > 0 {
            format!("-{}", grouped)
        } else {
            grouped
        }
    }
}
