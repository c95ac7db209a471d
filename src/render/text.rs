use crate::render::fonts::{FontStore, FontWeight, TOFU_ADVANCE, TOFU_WIDTH};
use tiny_skia::{Color, Path, PathBuilder};

const ELLIPSIS: char = '…';

#[derive(Debug, Clone)]
pub struct TextStyle {
    pub size: f32,
    pub weight: FontWeight,
    pub color: Color,
    /// 劃線（原價用）
    pub strike: bool,
}

impl TextStyle {
    pub fn new(size: f32, weight: FontWeight, color: Color) -> Self {
        Self {
            size,
            weight,
            color,
            strike: false,
        }
    }

    pub fn strikethrough(mut self) -> Self {
        self.strike = true;
        self
    }
}

/// 把 ttf-parser 的字形輪廓寫進 tiny-skia 的 PathBuilder。
/// 字形座標 y 向上，畫布 y 向下，這裡一併翻轉並套上字級縮放。
struct GlyphSink<'a> {
    builder: &'a mut PathBuilder,
    scale: f32,
    x: f32,
    baseline: f32,
}

impl ttf_parser::OutlineBuilder for GlyphSink<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder
            .move_to(self.x + x * self.scale, self.baseline - y * self.scale);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder
            .line_to(self.x + x * self.scale, self.baseline - y * self.scale);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(
            self.x + x1 * self.scale,
            self.baseline - y1 * self.scale,
            self.x + x * self.scale,
            self.baseline - y * self.scale,
        );
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(
            self.x + x1 * self.scale,
            self.baseline - y1 * self.scale,
            self.x + x2 * self.scale,
            self.baseline - y2 * self.scale,
            self.x + x * self.scale,
            self.baseline - y * self.scale,
        );
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

fn push_rect(builder: &mut PathBuilder, x: f32, y: f32, w: f32, h: f32) {
    if let Some(rect) = tiny_skia::Rect::from_xywh(x, y, w, h) {
        builder.push_rect(rect);
    }
}

/// 缺字畫成空心字框：四條細邊
fn push_tofu(builder: &mut PathBuilder, x: f32, baseline: f32, size: f32) {
    let w = TOFU_WIDTH * size;
    let h = 0.7 * size;
    let top = baseline - h;
    let bar = (0.05 * size).max(0.5);
    push_rect(builder, x, top, w, bar);
    push_rect(builder, x, baseline - bar, w, bar);
    push_rect(builder, x, top, bar, h);
    push_rect(builder, x + w - bar, top, bar, h);
}

/// 單行文字寬度（邏輯像素）
pub fn measure_text(fonts: &FontStore, text: &str, style: &TextStyle) -> f32 {
    text.chars()
        .map(|c| fonts.char_advance(style.weight, style.size, c))
        .sum()
}

/// 把一行文字轉成填色路徑。回傳 (路徑, 前進量)；
/// 全部是空白或缺輪廓字元時路徑為 None。
pub fn build_line_path(
    fonts: &FontStore,
    text: &str,
    style: &TextStyle,
    x: f32,
    baseline: f32,
) -> (Option<Path>, f32) {
    let face = fonts.face(style.weight);
    let unit_scale = fonts.unit_scale(style.weight, style.size);
    let mut builder = PathBuilder::new();
    let mut pen_x = x;

    for c in text.chars() {
        match face.glyph_index(c) {
            Some(glyph) => {
                let mut sink = GlyphSink {
                    builder: &mut builder,
                    scale: unit_scale,
                    x: pen_x,
                    baseline,
                };
                // 空白字元沒有輪廓，只推進
                face.outline_glyph(glyph, &mut sink);
                pen_x += face.glyph_hor_advance(glyph).unwrap_or(0) as f32 * unit_scale;
            }
            None => {
                push_tofu(&mut builder, pen_x, baseline, style.size);
                pen_x += TOFU_ADVANCE * style.size;
            }
        }
    }

    if style.strike {
        let y = baseline - 0.3 * style.size;
        let thickness = (0.07 * style.size).max(1.0);
        push_rect(&mut builder, x, y, pen_x - x, thickness);
    }

    (builder.finish(), pen_x - x)
}

/// 超寬就截斷補刪節號
pub fn truncate_ellipsis(fonts: &FontStore, text: &str, style: &TextStyle, max_width: f32) -> String {
    if measure_text(fonts, text, style) <= max_width {
        return text.to_string();
    }

    let ellipsis_width = fonts.char_advance(style.weight, style.size, ELLIPSIS);
    let mut out = String::new();
    let mut width = 0.0;
    for c in text.chars() {
        let advance = fonts.char_advance(style.weight, style.size, c);
        if width + advance + ellipsis_width > max_width {
            break;
        }
        out.push(c);
        width += advance;
    }
    let trimmed = out.trim_end();
    format!("{}{}", trimmed, ELLIPSIS)
}

/// 標題的行箝制排版：貪婪斷行，最後一行截斷補刪節號。
/// 對應原版的 -webkit-line-clamp 行為（資料不截斷，只有版面截斷）。
pub fn clamp_lines(
    fonts: &FontStore,
    text: &str,
    style: &TextStyle,
    max_width: f32,
    max_lines: usize,
) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if max_lines == 0 || words.is_empty() {
        return Vec::new();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut line_start = 0;
    let mut overflowed = false;

    for (idx, word) in words.iter().enumerate() {
        let candidate = if current.is_empty() {
            (*word).to_string()
        } else {
            format!("{} {}", current, word)
        };
        if current.is_empty() || measure_text(fonts, &candidate, style) <= max_width {
            current = candidate;
            continue;
        }

        if lines.len() + 1 == max_lines {
            // 行數用完：最後一行改放剩餘全文再截斷
            let rest = words[line_start..].join(" ");
            lines.push(truncate_ellipsis(fonts, &rest, style, max_width));
            overflowed = true;
            break;
        }

        lines.push(std::mem::take(&mut current));
        current = (*word).to_string();
        line_start = idx;
    }

    if !overflowed && !current.is_empty() {
        lines.push(current);
    }

    // 單字比整行寬：直接硬截
    for line in &mut lines {
        if measure_text(fonts, line, style) > max_width {
            *line = truncate_ellipsis(fonts, line, style, max_width);
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::Color;

    fn style(size: f32) -> TextStyle {
        TextStyle::new(size, FontWeight::Regular, Color::BLACK)
    }

    #[test]
    fn test_measure_is_monotonic() {
        let fonts = FontStore::new().unwrap();
        let s = style(16.0);
        let short = measure_text(&fonts, "abc", &s);
        let long = measure_text(&fonts, "abcdef", &s);
        assert!(long > short);
        assert_eq!(measure_text(&fonts, "", &s), 0.0);
    }

    #[test]
    fn test_build_line_path_advances() {
        let fonts = FontStore::new().unwrap();
        let s = style(20.0);
        let (path, advance) = build_line_path(&fonts, "Widget", &s, 0.0, 20.0);
        assert!(path.is_some());
        assert!((advance - measure_text(&fonts, "Widget", &s)).abs() < 0.01);
    }

    #[test]
    fn test_whitespace_only_line_has_no_path() {
        let fonts = FontStore::new().unwrap();
        let s = style(20.0);
        let (path, advance) = build_line_path(&fonts, "   ", &s, 0.0, 20.0);
        assert!(path.is_none());
        assert!(advance > 0.0);
    }

    #[test]
    fn test_truncate_ellipsis_fits() {
        let fonts = FontStore::new().unwrap();
        let s = style(16.0);
        let text = "A very long product title that cannot possibly fit";
        let truncated = truncate_ellipsis(&fonts, text, &s, 120.0);
        assert!(truncated.ends_with('…'));
        assert!(measure_text(&fonts, &truncated, &s) <= 120.0);

        assert_eq!(truncate_ellipsis(&fonts, "ok", &s, 120.0), "ok");
    }

    #[test]
    fn test_clamp_lines_respects_limit() {
        let fonts = FontStore::new().unwrap();
        let s = style(16.0);
        let text = "one two three four five six seven eight nine ten eleven twelve";
        let lines = clamp_lines(&fonts, text, &s, 80.0, 3);
        assert!(lines.len() <= 3);
        assert!(lines.last().unwrap().ends_with('…'));
        for line in &lines {
            assert!(measure_text(&fonts, line, &s) <= 80.0 + 0.01);
        }
    }

    #[test]
    fn test_clamp_lines_short_text_untouched() {
        let fonts = FontStore::new().unwrap();
        let s = style(16.0);
        let lines = clamp_lines(&fonts, "Widget", &s, 200.0, 3);
        assert_eq!(lines, vec!["Widget".to_string()]);
    }
}
