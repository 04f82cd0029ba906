use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct GenerateImageRequest {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageResponse {
    pub success: bool,
    pub credit_balance: i64,
    pub result_image: String, // data:image/png;base64,...
}
