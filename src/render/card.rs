use crate::domain::model::{CardSpec, CardVariant};
use crate::render::fonts::{FontStore, FontWeight};
use crate::render::primitives::{to_color, Canvas};
use crate::render::text::{clamp_lines, measure_text, TextStyle};
use crate::theme::CardTheme;
use crate::utils::error::Result;
use tiny_skia::Pixmap;

/// 把一筆商品畫成一張卡片。純函式：同輸入同輸出。
/// `scale` 是渲染倍率（匯出固定 2x）；操作按鈕不在這裡，
/// 它們只存在於預覽合成層（見 overlay 模組）。
pub fn render_card(
    spec: &CardSpec,
    variant: CardVariant,
    theme: &CardTheme,
    fonts: &FontStore,
    scale: f32,
) -> Result<Pixmap> {
    match variant {
        CardVariant::Grid => render_grid(spec, theme, fonts, scale),
        CardVariant::Social => render_social(spec, theme, fonts, scale),
    }
}

/// 徽章 = 膠囊底 + 置中文字，回傳實際寬度
fn draw_badge(
    canvas: &mut Canvas,
    fonts: &FontStore,
    x: f32,
    y: f32,
    text: &str,
    style: &TextStyle,
    bg: tiny_skia::Color,
    pad_x: f32,
    pad_y: f32,
) -> f32 {
    let text_w = measure_text(fonts, text, style);
    let text_h = fonts.text_height(style.weight, style.size);
    let w = text_w + pad_x * 2.0;
    let h = text_h + pad_y * 2.0;
    canvas.fill_pill(x, y, w, h, bg);
    canvas.draw_text(fonts, x + pad_x, y + pad_y, text, style);
    w
}

fn draw_rating_row(
    canvas: &mut Canvas,
    fonts: &FontStore,
    spec: &CardSpec,
    theme: &CardTheme,
    x: f32,
    y: f32,
    star_size: f32,
    gap: f32,
    label_size: f32,
) {
    let Some(rating) = &spec.rating else {
        return;
    };

    let outer = star_size / 2.0;
    let cy = y + outer;
    for i in 0..5u8 {
        let color = if i < rating.filled {
            theme.star_filled
        } else {
            theme.star_empty
        };
        let cx = x + i as f32 * (star_size + gap) + outer;
        canvas.draw_star(cx, cy, outer, color);
    }

    let label_style = TextStyle::new(label_size, FontWeight::Regular, theme.rating_label_color);
    let label_x = x + 5.0 * (star_size + gap) + gap;
    let label_y = cy - fonts.text_height(FontWeight::Regular, label_size) / 2.0;
    canvas.draw_text(fonts, label_x, label_y, &rating.label, &label_style);
}

/// 固定 1200x630 的分享卡片：左半圖片、右半資訊、底部行動呼籲帶
fn render_social(
    spec: &CardSpec,
    theme: &CardTheme,
    fonts: &FontStore,
    scale: f32,
) -> Result<Pixmap> {
    let (w, h) = CardVariant::Social.logical_size();
    let (wf, hf) = (w as f32, h as f32);
    let mut canvas = Canvas::new(w, h, scale)?;
    canvas.set_rounded_clip(wf, hf, theme.social_radius)?;
    canvas.fill_rect(0.0, 0.0, wf, hf, theme.card_bg);

    // 左半：圖片槽
    let image_w = wf / 2.0;
    canvas.fill_rect(0.0, 0.0, image_w, hf, theme.image_bg);
    canvas.draw_image_cover(&spec.image, 0.0, 0.0, image_w, hf);

    // 圖片上的兩個徽章
    let badge_style = TextStyle::new(16.0, FontWeight::Bold, theme.discount_fg);
    if !spec.record.merchant.is_empty() {
        draw_badge(
            &mut canvas,
            fonts,
            24.0,
            24.0,
            &spec.record.merchant,
            &badge_style,
            to_color(spec.merchant_color),
            16.0,
            8.0,
        );
    }
    if !spec.record.discount.is_empty() {
        let discount_w =
            measure_text(fonts, &spec.record.discount, &badge_style) + 32.0;
        draw_badge(
            &mut canvas,
            fonts,
            image_w - 24.0 - discount_w,
            24.0,
            &spec.record.discount,
            &badge_style,
            theme.discount_bg,
            16.0,
            8.0,
        );
    }

    // 右半：資訊欄
    let col_x = image_w + 32.0;
    let col_w = image_w - 64.0;

    let title_style = TextStyle::new(30.0, FontWeight::Bold, theme.title_color);
    let lines = clamp_lines(fonts, &spec.record.title, &title_style, col_w, 3);
    let line_step = 30.0 * 1.3;
    for (i, line) in lines.iter().enumerate() {
        canvas.draw_text(fonts, col_x, 32.0 + i as f32 * line_step, line, &title_style);
    }

    draw_rating_row(
        &mut canvas,
        fonts,
        spec,
        theme,
        col_x,
        32.0 + 3.0 * line_step + 16.0,
        20.0,
        8.0,
        18.0,
    );

    // 價格區塊固定錨在下方，不隨標題行數移動
    let price_style = TextStyle::new(44.0, FontWeight::Bold, theme.price_color);
    let price_text = format!("{}{}", theme.currency_prefix, spec.record.price);
    canvas.draw_text(fonts, col_x, 380.0, &price_text, &price_style);

    if spec.show_savings {
        let strike_style =
            TextStyle::new(24.0, FontWeight::Regular, theme.strike_color).strikethrough();
        let original_text = format!("{}{}", theme.currency_prefix, spec.record.original_price);
        let strike_w = canvas.draw_text(fonts, col_x, 448.0, &original_text, &strike_style);

        let savings_style = TextStyle::new(18.0, FontWeight::Bold, theme.savings_fg);
        let savings_text = format!("{}{}", theme.savings_prefix, spec.savings);
        let savings_w = measure_text(fonts, &savings_text, &savings_style) + 24.0;
        let savings_h = fonts.text_height(FontWeight::Bold, 18.0) + 16.0;
        let badge_x = col_x + strike_w + 16.0;
        canvas.fill_rounded_rect(badge_x, 448.0, savings_w, savings_h, 8.0, theme.savings_bg);
        canvas.draw_text(fonts, badge_x + 12.0, 456.0, &savings_text, &savings_style);
    }

    // 行動呼籲帶：佔滿右半欄底部
    let band_h = 72.0;
    let (from, to) = theme.social_footer_gradient;
    canvas.fill_gradient_rect(image_w, hf - band_h, image_w, band_h, 0.0, from, to);
    let footer_style = TextStyle::new(20.0, FontWeight::Bold, theme.footer_fg);
    let footer_h = fonts.text_height(FontWeight::Bold, 20.0);
    canvas.draw_text_centered(
        fonts,
        image_w + image_w / 2.0,
        hf - band_h + (band_h - footer_h) / 2.0,
        &theme.footer_label,
        &footer_style,
    );

    Ok(canvas.finish())
}

/// 緊湊的列表卡片：上圖下文
fn render_grid(
    spec: &CardSpec,
    theme: &CardTheme,
    fonts: &FontStore,
    scale: f32,
) -> Result<Pixmap> {
    let (w, h) = CardVariant::Grid.logical_size();
    let (wf, hf) = (w as f32, h as f32);
    let mut canvas = Canvas::new(w, h, scale)?;
    canvas.set_rounded_clip(wf, hf, theme.grid_radius)?;
    canvas.fill_rect(0.0, 0.0, wf, hf, theme.card_bg);

    // 圖片槽
    let image_h = 180.0;
    canvas.fill_rect(0.0, 0.0, wf, image_h, theme.image_bg);
    canvas.draw_image_cover(&spec.image, 0.0, 0.0, wf, image_h);

    let badge_style = TextStyle::new(10.0, FontWeight::Bold, theme.discount_fg);
    if !spec.record.merchant.is_empty() {
        draw_badge(
            &mut canvas,
            fonts,
            12.0,
            12.0,
            &spec.record.merchant,
            &badge_style,
            to_color(spec.merchant_color),
            8.0,
            4.0,
        );
    }
    if !spec.record.discount.is_empty() {
        let discount_w = measure_text(fonts, &spec.record.discount, &badge_style) + 16.0;
        draw_badge(
            &mut canvas,
            fonts,
            wf - 12.0 - discount_w,
            12.0,
            &spec.record.discount,
            &badge_style,
            theme.discount_bg,
            8.0,
            4.0,
        );
    }

    // 內文區
    let pad = 16.0;
    let body_w = wf - pad * 2.0;

    let title_style = TextStyle::new(12.0, FontWeight::Bold, theme.title_color);
    let lines = clamp_lines(fonts, &spec.record.title, &title_style, body_w, 3);
    let line_step = 12.0 * 1.4;
    for (i, line) in lines.iter().enumerate() {
        canvas.draw_text(fonts, pad, 196.0 + i as f32 * line_step, line, &title_style);
    }

    draw_rating_row(
        &mut canvas,
        fonts,
        spec,
        theme,
        pad,
        196.0 + 3.0 * line_step + 8.0,
        14.0,
        4.0,
        12.0,
    );

    // 價格列
    let price_y = 300.0;
    let price_style = TextStyle::new(16.0, FontWeight::Bold, theme.price_color);
    let price_text = format!("{}{}", theme.currency_prefix, spec.record.price);
    let price_w = canvas.draw_text(fonts, pad, price_y, &price_text, &price_style);

    if spec.show_savings {
        let savings_style = TextStyle::new(10.0, FontWeight::Bold, theme.savings_fg);
        let savings_text = format!("{}{}", theme.savings_prefix, spec.savings);
        let savings_w = measure_text(fonts, &savings_text, &savings_style) + 12.0;
        let savings_h = fonts.text_height(FontWeight::Bold, 10.0) + 8.0;
        canvas.fill_rounded_rect(pad + price_w + 8.0, price_y, savings_w, savings_h, 4.0, theme.savings_bg);
        canvas.draw_text(fonts, pad + price_w + 14.0, price_y + 4.0, &savings_text, &savings_style);

        let strike_style =
            TextStyle::new(12.0, FontWeight::Regular, theme.strike_color).strikethrough();
        let original_text = format!("{}{}", theme.currency_prefix, spec.record.original_price);
        canvas.draw_text(fonts, pad, price_y + 26.0, &original_text, &strike_style);
    }

    // 行動呼籲帶
    let band_h = 32.0;
    let band_y = hf - pad - band_h;
    let (from, to) = theme.grid_footer_gradient;
    canvas.fill_gradient_rect(pad, band_y, body_w, band_h, 8.0, from, to);
    let footer_style = TextStyle::new(12.0, FontWeight::Regular, theme.footer_fg);
    let footer_h = fonts.text_height(FontWeight::Regular, 12.0);
    canvas.draw_text_centered(
        fonts,
        wf / 2.0,
        band_y + (band_h - footer_h) / 2.0,
        &theme.footer_label,
        &footer_style,
    );

    // 外框最後畫，壓在裁切邊上
    canvas.stroke_rounded_rect(1.0, 1.0, wf - 2.0, hf - 2.0, theme.grid_radius, 2.0, theme.card_border);

    Ok(canvas.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::{derive_savings, resolve_merchant_color, resolve_rating_stars, show_savings, ThaiGrouping};
    use crate::domain::model::DealRecord;
    use crate::render::primitives::placeholder_image;

    fn widget_record() -> DealRecord {
        DealRecord {
            title: "Widget".to_string(),
            price: "250".to_string(),
            original_price: "500".to_string(),
            discount: "-50%".to_string(),
            image_url: String::new(),
            product_url: String::new(),
            merchant: "SHOPEE".to_string(),
            merchant_image: String::new(),
            rating: Some("4.2/5".to_string()),
            reviews_count: Some("10".to_string()),
            id: None,
        }
    }

    fn spec_for(record: DealRecord, fonts: &FontStore, variant: CardVariant) -> CardSpec {
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
    fn test_social_export_dimensions_at_2x() {
        let fonts = FontStore::new().unwrap();
        let spec = spec_for(widget_record(), &fonts, CardVariant::Social);
        let theme = CardTheme::default();
        let pixmap = render_card(&spec, CardVariant::Social, &theme, &fonts, 2.0).unwrap();
        assert_eq!(pixmap.width(), 2400);
        assert_eq!(pixmap.height(), 1260);
    }

    #[test]
    fn test_social_corners_are_transparent() {
        let fonts = FontStore::new().unwrap();
        let spec = spec_for(widget_record(), &fonts, CardVariant::Social);
        let theme = CardTheme::default();
        let pixmap = render_card(&spec, CardVariant::Social, &theme, &fonts, 2.0).unwrap();
        assert_eq!(pixmap.pixel(0, 0).unwrap().alpha(), 0);
        assert_eq!(pixmap.pixel(2399, 0).unwrap().alpha(), 0);
        assert_eq!(pixmap.pixel(0, 1259).unwrap().alpha(), 0);
        assert_eq!(pixmap.pixel(2399, 1259).unwrap().alpha(), 0);
        // 卡片中心是不透明的白底
        assert_eq!(pixmap.pixel(1200, 630).unwrap().alpha(), 255);
    }

    #[test]
    fn test_render_is_deterministic() {
        let fonts = FontStore::new().unwrap();
        let spec = spec_for(widget_record(), &fonts, CardVariant::Social);
        let theme = CardTheme::default();
        let a = render_card(&spec, CardVariant::Social, &theme, &fonts, 2.0).unwrap();
        let b = render_card(&spec, CardVariant::Social, &theme, &fonts, 2.0).unwrap();
        assert_eq!(a.data(), b.data());
    }

    #[test]
    fn test_grid_dimensions() {
        let fonts = FontStore::new().unwrap();
        let spec = spec_for(widget_record(), &fonts, CardVariant::Grid);
        let theme = CardTheme::default();
        let pixmap = render_card(&spec, CardVariant::Grid, &theme, &fonts, 2.0).unwrap();
        assert_eq!(pixmap.width(), 600);
        assert_eq!(pixmap.height(), 840);
        assert_eq!(pixmap.pixel(0, 0).unwrap().alpha(), 0);
    }

    #[test]
    fn test_no_savings_badge_for_equal_prices() {
        let fonts = FontStore::new().unwrap();
        let mut record = widget_record();
        record.price = "500".to_string();
        record.original_price = "500".to_string();
        let with_discount = spec_for(widget_record(), &fonts, CardVariant::Social);
        let without = spec_for(record, &fonts, CardVariant::Social);
        assert!(!without.show_savings);

        let theme = CardTheme::default();
        let a = render_card(&with_discount, CardVariant::Social, &theme, &fonts, 1.0).unwrap();
        let b = render_card(&without, CardVariant::Social, &theme, &fonts, 1.0).unwrap();
        // 省下金額列（y≈448）在無折扣時必須是素的白底
        let badge_px = b.pixel(700, 460).unwrap();
        assert_eq!(
            (badge_px.red(), badge_px.green(), badge_px.blue()),
            (255, 255, 255)
        );
        assert_ne!(a.data(), b.data());
    }

    #[test]
    fn test_empty_merchant_and_discount_still_render() {
        let fonts = FontStore::new().unwrap();
        let mut record = widget_record();
        record.merchant = String::new();
        record.discount = String::new();
        record.rating = None;
        let spec = spec_for(record, &fonts, CardVariant::Grid);
        let theme = CardTheme::default();
        assert!(render_card(&spec, CardVariant::Grid, &theme, &fonts, 1.0).is_ok());
    }
}
