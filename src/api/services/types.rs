//! API 请求/响应类型

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::error_code::ErrorCode;
use crate::services::icons::{IconCategory, IconInfo};
use crate::storage::models::TS_EXPORT_PATH;

/// 错误响应体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IconQuery {
    pub q: Option<String>,
}

/// 批量重排：按数组顺序赋值 order = 下标
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct ReorderRequest {
    pub ids: Vec<String>,
}

/// 图标接口：无查询时返回分类，有查询时返回扁平结果
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum IconsResponse {
    Categories(&'static [IconCategory]),
    Matches(Vec<&'static IconInfo>),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct UploadUrlResponse {
    #[serde(rename = "uploadURL")]
    pub upload_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct FinalizeImageRequest {
    #[serde(rename = "imageURL")]
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPathResponse {
    pub object_path: String,
}
