use crate::domain::model::{Capabilities, CardSpec, CardVariant};
use crate::render::card::render_card;
use crate::render::fonts::{FontStore, FontWeight};
use crate::render::primitives::Canvas;
use crate::render::text::TextStyle;
use crate::theme::CardTheme;
use crate::utils::error::Result;
use tiny_skia::{Color, Pixmap};

const CONTROL_RADIUS: f32 = 16.0;
const CONTROL_GAP: f32 = 8.0;
const CONTROL_INSET: f32 = 12.0;

/// 預覽合成：先畫出跟匯出一模一樣的場景，再疊上操作按鈕。
/// 按鈕只存在於這份副本，匯出路徑根本不經過這裡，
/// 所以不需要任何「先藏再復原」的動作。
pub fn render_preview(
    spec: &CardSpec,
    variant: CardVariant,
    theme: &CardTheme,
    fonts: &FontStore,
    caps: &Capabilities,
) -> Result<Pixmap> {
    let scene = render_card(spec, variant, theme, fonts, 1.0)?;
    if !caps.any() {
        return Ok(scene);
    }

    let mut canvas = Canvas::from_pixmap(scene, 1.0);
    let (w, _) = variant.logical_size();
    let x = w as f32 - CONTROL_INSET - CONTROL_RADIUS * 2.0;
    let mut y = CONTROL_INSET;

    for glyph in control_glyphs(caps) {
        draw_control(&mut canvas, fonts, x, y, glyph);
        y += CONTROL_RADIUS * 2.0 + CONTROL_GAP;
    }

    Ok(canvas.finish())
}

/// 啟用的操作對應的按鈕圖樣，固定順序
fn control_glyphs(caps: &Capabilities) -> Vec<char> {
    let mut glyphs = Vec::new();
    if caps.can_copy {
        glyphs.push('C');
    }
    if caps.can_download {
        glyphs.push('\u{2193}'); // ↓
    }
    if caps.can_edit {
        glyphs.push('E');
    }
    if caps.can_delete {
        glyphs.push('\u{00D7}'); // ×
    }
    if caps.can_open_link {
        glyphs.push('L');
    }
    glyphs
}

fn draw_control(canvas: &mut Canvas, fonts: &FontStore, x: f32, y: f32, glyph: char) {
    let d = CONTROL_RADIUS * 2.0;
    canvas.fill_pill(x, y, d, d, Color::WHITE);
    canvas.stroke_rounded_rect(
        x,
        y,
        d,
        d,
        CONTROL_RADIUS,
        1.0,
        Color::from_rgba8(0xd9, 0xd9, 0xd9, 255),
    );

    let style = TextStyle::new(16.0, FontWeight::Regular, Color::from_rgba8(0x26, 0x26, 0x26, 255));
    let text_h = fonts.text_height(FontWeight::Regular, 16.0);
    canvas.draw_text_centered(
        fonts,
        x + CONTROL_RADIUS,
        y + (d - text_h) / 2.0,
        &glyph.to_string(),
        &style,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::{derive_savings, resolve_merchant_color, resolve_rating_stars, show_savings, ThaiGrouping};
    use crate::domain::model::DealRecord;
    use crate::render::primitives::placeholder_image;

    fn sample_spec(fonts: &FontStore) -> CardSpec {
        let record = DealRecord {
            title: "Widget".to_string(),
            price: "250".to_string(),
            original_price: "500".to_string(),
            discount: "-50%".to_string(),
            image_url: String::new(),
            product_url: String::new(),
            merchant: "Lazada".to_string(),
            merchant_image: String::new(),
            rating: Some("4.2/5".to_string()),
            reviews_count: None,
            id: None,
        };
        let fmt = ThaiGrouping;
        CardSpec {
            savings: derive_savings(&record.original_price, &record.price, &fmt),
            show_savings: show_savings(&record.original_price, &record.price),
            merchant_color: resolve_merchant_color(&record.merchant),
            rating: resolve_rating_stars(record.rating.as_deref(), None),
            image: placeholder_image(CardVariant::Social, fonts),
            record,
        }
    }

    #[test]
    fn test_preview_matches_logical_size() {
        let fonts = FontStore::new().unwrap();
        let spec = sample_spec(&fonts);
        let theme = CardTheme::default();
        let preview = render_preview(
            &spec,
            CardVariant::Social,
            &theme,
            &fonts,
            &Capabilities::social(),
        )
        .unwrap();
        assert_eq!(preview.width(), 1200);
        assert_eq!(preview.height(), 630);
    }

    #[test]
    fn test_controls_change_pixels_scene_does_not() {
        let fonts = FontStore::new().unwrap();
        let spec = sample_spec(&fonts);
        let theme = CardTheme::default();

        let scene = render_card(&spec, CardVariant::Social, &theme, &fonts, 1.0).unwrap();
        let bare = render_preview(
            &spec,
            CardVariant::Social,
            &theme,
            &fonts,
            &Capabilities::default(),
        )
        .unwrap();
        let with_controls = render_preview(
            &spec,
            CardVariant::Social,
            &theme,
            &fonts,
            &Capabilities::social(),
        )
        .unwrap();

        // 沒有任何操作權限時，預覽就是場景本身
        assert_eq!(scene.data(), bare.data());
        assert_ne!(scene.data(), with_controls.data());
    }

    #[test]
    fn test_owner_mode_stacks_more_controls() {
        let fonts = FontStore::new().unwrap();
        let spec = sample_spec(&fonts);
        let theme = CardTheme::default();
        let few = render_preview(&spec, CardVariant::Social, &theme, &fonts, &Capabilities::social())
            .unwrap();
        let all = render_preview(&spec, CardVariant::Social, &theme, &fonts, &Capabilities::owner())
            .unwrap();
        assert_ne!(few.data(), all.data());
    }

    #[test]
    fn test_glyph_order_is_stable() {
        assert_eq!(
            control_glyphs(&Capabilities::owner()),
            vec!['C', '\u{2193}', 'E', '\u{00D7}', 'L']
        );
        assert_eq!(control_glyphs(&Capabilities::default()), Vec::<char>::new());
    }
}
