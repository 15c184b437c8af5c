use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Column-detection configuration. The candidate lists are data, not code:
/// the built-in defaults cover the headers seen in the field, and a TOML
/// file can replace or extend them per deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub candidates: CandidateLists,
    /// Sheet-name substrings that mark a master/lookup sheet.
    #[serde(default = "default_master_keywords")]
    pub master_keywords: Vec<String>,
}

/// Ordered alias lists, one per canonical field. First match wins.
#[derive(Debug, Clone, Deserialize)]
pub struct CandidateLists {
    #[serde(default = "default_key_candidates")]
    pub key: Vec<String>,
    #[serde(default = "default_product_candidates")]
    pub product_name: Vec<String>,
    #[serde(default = "default_quantity_candidates")]
    pub quantity: Vec<String>,
    #[serde(default = "default_location_candidates")]
    pub location: Vec<String>,
}

fn default_name() -> String {
    "stockdiff".into()
}

fn default_key_candidates() -> Vec<String> {
    ["JANコード", "JAN", "janコード", "jan_code", "barcode", "バーコード", "商品コード"]
        .map(String::from)
        .to_vec()
}

fn default_product_candidates() -> Vec<String> {
    ["商品名", "品名", "製品名", "品番", "商品", "アイテム名", "item", "product"]
        .map(String::from)
        .to_vec()
}

fn default_quantity_candidates() -> Vec<String> {
    ["個数", "数量", "在庫数", "在庫", "stock", "quantity", "qty"]
        .map(String::from)
        .to_vec()
}

fn default_location_candidates() -> Vec<String> {
    ["棚番", "棚", "shelf", "ロケーション", "location", "配置", "売り場"]
        .map(String::from)
        .to_vec()
}

fn default_master_keywords() -> Vec<String> {
    ["マスター", "マスタ", "master"].map(String::from).to_vec()
}

impl Default for CandidateLists {
    fn default() -> Self {
        Self {
            key: default_key_candidates(),
            product_name: default_product_candidates(),
            quantity: default_quantity_candidates(),
            location: default_location_candidates(),
        }
    }
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            candidates: CandidateLists::default(),
            master_keywords: default_master_keywords(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let lists = [
            ("candidates.key", &self.candidates.key),
            ("candidates.product_name", &self.candidates.product_name),
            ("candidates.quantity", &self.candidates.quantity),
            ("candidates.location", &self.candidates.location),
            ("master_keywords", &self.master_keywords),
        ];
        for (field, list) in lists {
            if list.is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "{field} must not be empty"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
