//! 卡片渲染：tiny-skia 畫布 + ttf-parser 字形轉路徑。
//! 渲染器是純函式：同樣的輸入（商品、推導值、主題、版型、倍率）
//! 永遠產生相同的點陣圖。

pub mod card;
pub mod fonts;
pub mod overlay;
pub mod primitives;
pub mod text;

pub use card::render_card;
pub use fonts::{FontStore, FontWeight};
pub use overlay::render_preview;
pub use primitives::{placeholder_image, Canvas};
pub use text::TextStyle;
