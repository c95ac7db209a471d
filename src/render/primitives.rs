use crate::domain::model::{CardVariant, ImageData, Rgb};
use crate::render::fonts::{FontStore, FontWeight};
use crate::render::text::{build_line_path, measure_text, TextStyle};
use crate::utils::error::{CardError, Result};
use image::imageops::FilterType;
use tiny_skia::{
    Color, FillRule, GradientStop, IntSize, LinearGradient, Mask, Paint, Path, PathBuilder,
    Pixmap, Point, Rect, SpreadMode, Stroke, Transform,
};

// 三次貝茲逼近四分之一圓
const KAPPA: f32 = 0.5523;

pub fn to_color(rgb: Rgb) -> Color {
    Color::from_rgba8(rgb.r, rgb.g, rgb.b, 255)
}

fn render_error(message: &str) -> CardError {
    CardError::RenderError {
        message: message.to_string(),
    }
}

/// 圓角矩形路徑（邏輯座標）
pub fn rounded_rect_path(x: f32, y: f32, w: f32, h: f32, radius: f32) -> Option<Path> {
    let r = radius.min(w / 2.0).min(h / 2.0).max(0.0);
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    if r <= 0.0 {
        return Rect::from_xywh(x, y, w, h).map(PathBuilder::from_rect);
    }

    let k = r * KAPPA;
    let (x1, y1) = (x + w, y + h);
    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(x1 - r, y);
    pb.cubic_to(x1 - r + k, y, x1, y + r - k, x1, y + r);
    pb.line_to(x1, y1 - r);
    pb.cubic_to(x1, y1 - r + k, x1 - r + k, y1, x1 - r, y1);
    pb.line_to(x + r, y1);
    pb.cubic_to(x + r - k, y1, x, y1 - r + k, x, y1 - r);
    pb.line_to(x, y + r);
    pb.cubic_to(x, y + r - k, x + r - k, y, x + r, y);
    pb.close();
    pb.finish()
}

fn star_path(cx: f32, cy: f32, outer: f32) -> Option<Path> {
    let inner = outer * 0.45;
    let mut pb = PathBuilder::new();
    for i in 0..10 {
        let radius = if i % 2 == 0 { outer } else { inner };
        let angle = std::f32::consts::PI * (i as f32 / 5.0) - std::f32::consts::FRAC_PI_2;
        let px = cx + radius * angle.cos();
        let py = cy + radius * angle.sin();
        if i == 0 {
            pb.move_to(px, py);
        } else {
            pb.line_to(px, py);
        }
    }
    pb.close();
    pb.finish()
}

/// 邏輯座標畫布。所有座標以邏輯像素給，建構時的倍率
/// 決定實際點陣大小（匯出固定 2x，預覽 1x）。
pub struct Canvas {
    pixmap: Pixmap,
    scale: f32,
    clip: Option<Mask>,
}

impl Canvas {
    pub fn new(logical_w: u32, logical_h: u32, scale: f32) -> Result<Self> {
        let pw = (logical_w as f32 * scale).round() as u32;
        let ph = (logical_h as f32 * scale).round() as u32;
        let pixmap = Pixmap::new(pw, ph).ok_or_else(|| render_error("zero-sized canvas"))?;
        Ok(Self {
            pixmap,
            scale,
            clip: None,
        })
    }

    /// 在既有點陣圖上續畫（預覽合成用）
    pub fn from_pixmap(pixmap: Pixmap, scale: f32) -> Self {
        Self {
            pixmap,
            scale,
            clip: None,
        }
    }

    fn transform(&self) -> Transform {
        Transform::from_scale(self.scale, self.scale)
    }

    /// 之後的繪圖全部裁切在這個圓角矩形內，
    /// 圓角外的像素保持透明。
    pub fn set_rounded_clip(&mut self, w: f32, h: f32, radius: f32) -> Result<()> {
        let mut mask = Mask::new(self.pixmap.width(), self.pixmap.height())
            .ok_or_else(|| render_error("zero-sized clip mask"))?;
        let path =
            rounded_rect_path(0.0, 0.0, w, h, radius).ok_or_else(|| render_error("bad clip"))?;
        mask.fill_path(&path, FillRule::Winding, true, self.transform());
        self.clip = Some(mask);
        Ok(())
    }

    fn fill(&mut self, path: &Path, color: Color) {
        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;
        self.pixmap
            .fill_path(path, &paint, FillRule::Winding, self.transform(), self.clip.as_ref());
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        if let Some(rect) = Rect::from_xywh(x, y, w, h) {
            self.fill(&PathBuilder::from_rect(rect), color);
        }
    }

    pub fn fill_rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, r: f32, color: Color) {
        if let Some(path) = rounded_rect_path(x, y, w, h, r) {
            self.fill(&path, color);
        }
    }

    /// 膠囊形徽章底
    pub fn fill_pill(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.fill_rounded_rect(x, y, w, h, h / 2.0, color);
    }

    pub fn stroke_rounded_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        r: f32,
        width: f32,
        color: Color,
    ) {
        if let Some(path) = rounded_rect_path(x, y, w, h, r) {
            let mut paint = Paint::default();
            paint.set_color(color);
            paint.anti_alias = true;
            let stroke = Stroke {
                width,
                ..Stroke::default()
            };
            self.pixmap
                .stroke_path(&path, &paint, &stroke, self.transform(), self.clip.as_ref());
        }
    }

    /// 水平線性漸層的圓角矩形（頁尾帶）
    pub fn fill_gradient_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        r: f32,
        from: Color,
        to: Color,
    ) {
        let Some(path) = rounded_rect_path(x, y, w, h, r) else {
            return;
        };
        let Some(shader) = LinearGradient::new(
            Point::from_xy(x, y),
            Point::from_xy(x + w, y),
            vec![GradientStop::new(0.0, from), GradientStop::new(1.0, to)],
            SpreadMode::Pad,
            self.transform(),
        ) else {
            return;
        };
        let paint = Paint {
            shader,
            anti_alias: true,
            ..Paint::default()
        };
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, self.transform(), self.clip.as_ref());
    }

    pub fn draw_star(&mut self, cx: f32, cy: f32, outer: f32, color: Color) {
        if let Some(path) = star_path(cx, cy, outer) {
            self.fill(&path, color);
        }
    }

    /// 以 cover 方式把圖鋪滿槽位：等比縮放到蓋滿後置中裁切
    pub fn draw_image_cover(&mut self, img: &ImageData, x: f32, y: f32, w: f32, h: f32) {
        let pw = (w * self.scale).round() as u32;
        let ph = (h * self.scale).round() as u32;
        if pw == 0 || ph == 0 || img.width == 0 || img.height == 0 {
            return;
        }

        let Some(buffer) =
            image::RgbaImage::from_raw(img.width, img.height, img.rgba.clone())
        else {
            return;
        };
        let resized = image::DynamicImage::ImageRgba8(buffer)
            .resize_to_fill(pw, ph, FilterType::Triangle)
            .into_rgba8();

        // tiny-skia 的 Pixmap 是 premultiplied alpha
        let mut data = resized.into_raw();
        for px in data.chunks_exact_mut(4) {
            let a = px[3] as u16;
            px[0] = (px[0] as u16 * a / 255) as u8;
            px[1] = (px[1] as u16 * a / 255) as u8;
            px[2] = (px[2] as u16 * a / 255) as u8;
        }
        let Some(size) = IntSize::from_wh(pw, ph) else {
            return;
        };
        let Some(tile) = Pixmap::from_vec(data, size) else {
            return;
        };

        self.pixmap.draw_pixmap(
            (x * self.scale).round() as i32,
            (y * self.scale).round() as i32,
            tile.as_ref(),
            &tiny_skia::PixmapPaint::default(),
            Transform::identity(),
            self.clip.as_ref(),
        );
    }

    /// 畫一行文字，回傳邏輯寬度。y 是文字框頂端。
    pub fn draw_text(
        &mut self,
        fonts: &FontStore,
        x: f32,
        y: f32,
        text: &str,
        style: &TextStyle,
    ) -> f32 {
        let baseline = y + fonts.ascent(style.weight, style.size);
        let (path, advance) = build_line_path(fonts, text, style, x, baseline);
        if let Some(path) = path {
            self.fill(&path, style.color);
        }
        advance
    }

    /// 水平置中的一行文字
    pub fn draw_text_centered(
        &mut self,
        fonts: &FontStore,
        cx: f32,
        y: f32,
        text: &str,
        style: &TextStyle,
    ) {
        let width = measure_text(fonts, text, style);
        self.draw_text(fonts, cx - width / 2.0, y, text, style);
    }

    pub fn finish(self) -> Pixmap {
        self.pixmap
    }
}

/// 圖片載入失敗時的佔位圖，依槽位尺寸決定大小。
/// 純函式：同一版型永遠產生同一張圖。
pub fn placeholder_image(variant: CardVariant, fonts: &FontStore) -> ImageData {
    let (w, h) = variant.placeholder_size();
    let field = Color::from_rgba8(0xe5, 0xe7, 0xeb, 255);
    let label_color = Color::from_rgba8(0x6b, 0x72, 0x80, 255);
    let size = match variant {
        CardVariant::Grid => 24.0,
        CardVariant::Social => 32.0,
    };

    let mut canvas = match Canvas::new(w, h, 1.0) {
        Ok(canvas) => canvas,
        // 槽位尺寸是編譯期常數，不會是 0
        Err(_) => return ImageData::new(0, 0, Vec::new()),
    };
    canvas.fill_rect(0.0, 0.0, w as f32, h as f32, field);
    let style = TextStyle::new(size, FontWeight::Regular, label_color);
    let text_h = fonts.text_height(FontWeight::Regular, size);
    canvas.draw_text_centered(
        fonts,
        w as f32 / 2.0,
        (h as f32 - text_h) / 2.0,
        "No Image",
        &style,
    );

    pixmap_to_image_data(&canvas.finish())
}

/// premultiplied Pixmap 轉回 straight-alpha RGBA
pub fn pixmap_to_image_data(pixmap: &Pixmap) -> ImageData {
    let mut rgba = pixmap.data().to_vec();
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a > 0 && a < 255 {
            px[0] = ((px[0] as u16 * 255) / a).min(255) as u8;
            px[1] = ((px[1] as u16 * 255) / a).min(255) as u8;
            px[2] = ((px[2] as u16 * 255) / a).min(255) as u8;
        }
    }
    ImageData::new(pixmap.width(), pixmap.height(), rgba)
}
