use tiny_skia::Color;

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::from_rgba8(r, g, b, 255)
}

/// 卡片的外觀 token。原本的實作把主題散在全域，
/// 這裡改成明確傳入，渲染器就是純函式。
#[derive(Debug, Clone)]
pub struct CardTheme {
    pub card_bg: Color,
    pub card_border: Color,
    /// 圖片槽位底色（圖片未鋪滿時露出）
    pub image_bg: Color,
    pub title_color: Color,
    pub price_color: Color,
    pub discount_bg: Color,
    pub discount_fg: Color,
    pub savings_bg: Color,
    pub savings_fg: Color,
    pub strike_color: Color,
    pub star_filled: Color,
    pub star_empty: Color,
    pub rating_label_color: Color,
    pub footer_fg: Color,
    /// Grid 版型頁尾漸層（左 → 右）
    pub grid_footer_gradient: (Color, Color),
    /// Social 版型頁尾漸層（左 → 右）
    pub social_footer_gradient: (Color, Color),
    pub grid_radius: f32,
    pub social_radius: f32,
    /// 價格前綴，預設泰銖符號
    pub currency_prefix: String,
    /// 省下金額徽章的前綴文字
    pub savings_prefix: String,
    /// 頁尾行動呼籲文字
    pub footer_label: String,
}

impl Default for CardTheme {
    fn default() -> Self {
        Self {
            card_bg: rgb(0xff, 0xff, 0xff),
            card_border: rgb(0xf0, 0xf0, 0xf0),
            image_bg: rgb(0xfa, 0xfa, 0xfa),
            title_color: rgb(0x26, 0x26, 0x26),
            price_color: rgb(0xf5, 0x22, 0x2d),
            discount_bg: rgb(0xf5, 0x22, 0x2d),
            discount_fg: rgb(0xff, 0xff, 0xff),
            savings_bg: rgb(0xff, 0xf1, 0xf0),
            savings_fg: rgb(0xf5, 0x22, 0x2d),
            strike_color: rgb(0x8c, 0x8c, 0x8c),
            star_filled: rgb(0xff, 0xd7, 0x00),
            star_empty: rgb(0xe0, 0xe0, 0xe0),
            rating_label_color: rgb(0x55, 0x55, 0x55),
            footer_fg: rgb(0xff, 0xff, 0xff),
            grid_footer_gradient: (rgb(0x4a, 0x90, 0xe2), rgb(0x90, 0x13, 0xfe)),
            social_footer_gradient: (rgb(0x18, 0x90, 0xff), rgb(0x90, 0x13, 0xfe)),
            grid_radius: 16.0,
            social_radius: 24.0,
            currency_prefix: "฿".to_string(),
            // 內建字型沒有泰文字形，預設用拉丁文案；
            // 部署時可換成泰文（原站文案是 "ประหยัด ฿" / "โปรดีบอกต่อ Prod"）
            savings_prefix: "Save ฿".to_string(),
            footer_label: "Prod Hot Deals".to_string(),
        }
    }
}
