use crate::utils::error::{CardError, Result};
use ttf_parser::Face;

// 內建字型，匯出結果不受系統字型影響
static REGULAR_TTF: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
static BOLD_TTF: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

/// 缺字字框（tofu）的寬度與步進，相對於字級
pub(crate) const TOFU_WIDTH: f32 = 0.52;
pub(crate) const TOFU_ADVANCE: f32 = 0.62;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

pub struct FontStore {
    regular: Face<'static>,
    bold: Face<'static>,
}

impl FontStore {
    pub fn new() -> Result<Self> {
        let regular = Face::parse(REGULAR_TTF, 0).map_err(|e| CardError::RenderError {
            message: format!("bundled regular font is invalid: {}", e),
        })?;
        let bold = Face::parse(BOLD_TTF, 0).map_err(|e| CardError::RenderError {
            message: format!("bundled bold font is invalid: {}", e),
        })?;
        Ok(Self { regular, bold })
    }

    pub fn face(&self, weight: FontWeight) -> &Face<'static> {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }

    /// 每字型單位對應的像素數
    pub fn unit_scale(&self, weight: FontWeight, size: f32) -> f32 {
        size / self.face(weight).units_per_em() as f32
    }

    pub fn ascent(&self, weight: FontWeight, size: f32) -> f32 {
        self.face(weight).ascender() as f32 * self.unit_scale(weight, size)
    }

    pub fn descent(&self, weight: FontWeight, size: f32) -> f32 {
        // descender 是負值
        self.face(weight).descender() as f32 * self.unit_scale(weight, size)
    }

    /// 單行文字的視覺高度
    pub fn text_height(&self, weight: FontWeight, size: f32) -> f32 {
        self.ascent(weight, size) - self.descent(weight, size)
    }

    /// 單一字元的前進量；缺字用固定寬度的 tofu 字框
    pub fn char_advance(&self, weight: FontWeight, size: f32, c: char) -> f32 {
        let face = self.face(weight);
        match face.glyph_index(c) {
            Some(glyph) => {
                let units = face.glyph_hor_advance(glyph).unwrap_or(0) as f32;
                units * self.unit_scale(weight, size)
            }
            None => TOFU_ADVANCE * size,
        }
    }
}
