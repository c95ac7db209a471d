use crate::domain::model::{
    Capabilities, CardVariant, ComposeResult, DealRecord, ImageData,
};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    /// 圖片代理端點；None 表示直接抓原始圖片網址
    fn proxy_endpoint(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    fn merchant(&self) -> Option<&str>;
    fn search(&self) -> Option<&str>;
    fn page(&self) -> u32;
    fn page_size(&self) -> u32;
    fn variant(&self) -> CardVariant;
    fn capabilities(&self) -> Capabilities;
    fn concurrent_requests(&self) -> usize;
    fn timeout_seconds(&self) -> u64;
    /// 把整頁匯出結果打包成一個 ZIP
    fn archive(&self) -> bool;
    /// 另外輸出帶操作按鈕的預覽圖（按鈕永遠不在匯出圖裡）
    fn preview(&self) -> bool;
}

/// 數字格式化是注入的依賴，測試時可換成固定格式
pub trait NumberFormat: Send + Sync {
    fn format(&self, value: f64) -> String;
}

/// 商品圖來源。永不失敗：任何抓取或解碼問題都退回佔位圖。
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, url: &str, variant: CardVariant) -> ImageData;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<DealRecord>>;
    async fn transform(&self, deals: Vec<DealRecord>) -> Result<ComposeResult>;
    async fn load(&self, result: ComposeResult) -> Result<String>;
}
