//! 料件主檔模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 料件主檔記錄（一張圖號可能存在多個版次）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartRecord {
    /// 圖號
    pub drawing_id: String,

    /// 供應商代碼
    pub supplier_code: i64,

    /// 供應商名稱
    pub supplier_name: String,

    /// 料件描述
    pub description: String,

    /// 容器類型代碼（MDR）
    pub container_type: Option<String>,

    /// 每容器收容數（QME）
    pub units_per_container: Option<Decimal>,

    /// 單件重量（kg）
    pub unit_weight: Option<Decimal>,

    /// 圖面更新日期（版次判定用）
    pub updated_on: Option<NaiveDate>,
}

impl PartRecord {
    pub fn new(drawing_id: String, supplier_code: i64, supplier_name: String) -> Self {
        Self {
            drawing_id,
            supplier_code,
            supplier_name,
            description: String::new(),
            container_type: None,
            units_per_container: None,
            unit_weight: None,
            updated_on: None,
        }
    }

    /// 建構器模式：設置描述
    pub fn with_description(mut self, description: String) -> Self {
        self.description = description;
        self
    }

    /// 建構器模式：設置容器類型
    pub fn with_container(mut self, container_type: String) -> Self {
        self.container_type = Some(container_type);
        self
    }

    /// 建構器模式：設置收容數
    pub fn with_units_per_container(mut self, qty: Decimal) -> Self {
        self.units_per_container = Some(qty);
        self
    }

    /// 建構器模式：設置單件重量
    pub fn with_unit_weight(mut self, weight: Decimal) -> Self {
        self.unit_weight = Some(weight);
        self
    }

    /// 建構器模式：設置更新日期
    pub fn with_updated_on(mut self, date: NaiveDate) -> Self {
        self.updated_on = Some(date);
        self
    }

    /// 複合鍵：圖號 + 容器類型
    pub fn composite_key(&self) -> Option<(String, String)> {
        self.container_type
            .as_ref()
            .map(|mdr| (self.drawing_id.clone(), mdr.clone()))
    }
}

/// 料件主檔目錄
///
/// 建構時執行明確的去重：版次以更新日期由新到舊排序，保留第一筆。
/// 同時建立兩種查找鍵：
/// - 圖號單獨（複合鍵的引導查找，解析該圖號最新版次的容器類型）
/// - 圖號 + 容器類型複合鍵（描述、收容數、重量的正式查找）
#[derive(Debug, Clone, Default)]
pub struct PartCatalog {
    /// 圖號 → 最新版次的容器類型
    by_drawing: HashMap<String, PartRecord>,

    /// (圖號, 容器類型) → 最新版次記錄
    by_key: HashMap<(String, String), PartRecord>,

    /// 供應商代碼 → 供應商名稱
    supplier_names: HashMap<i64, String>,
}

impl PartCatalog {
    /// 從記錄列表建立目錄（去重規則：更新日期降冪，首筆保留）
    pub fn from_records(mut records: Vec<PartRecord>) -> Self {
        // None 日期視為最舊版次
        records.sort_by(|a, b| b.updated_on.cmp(&a.updated_on));

        let mut by_drawing: HashMap<String, PartRecord> = HashMap::new();
        let mut by_key: HashMap<(String, String), PartRecord> = HashMap::new();
        let mut supplier_names: HashMap<i64, String> = HashMap::new();

        for record in records {
            supplier_names
                .entry(record.supplier_code)
                .or_insert_with(|| record.supplier_name.clone());

            if let Some(key) = record.composite_key() {
                by_key.entry(key).or_insert_with(|| record.clone());
            }

            by_drawing
                .entry(record.drawing_id.clone())
                .or_insert(record);
        }

        Self {
            by_drawing,
            by_key,
            supplier_names,
        }
    }

    /// 引導查找：該圖號最新版次的容器類型
    pub fn container_for_drawing(&self, drawing_id: &str) -> Option<&str> {
        self.by_drawing
            .get(drawing_id)
            .and_then(|r| r.container_type.as_deref())
    }

    /// 複合鍵查找：圖號 + 容器類型
    pub fn record(&self, drawing_id: &str, container_type: &str) -> Option<&PartRecord> {
        self.by_key
            .get(&(drawing_id.to_string(), container_type.to_string()))
    }

    /// 供應商顯示名稱
    pub fn supplier_name(&self, supplier_code: i64) -> Option<&str> {
        self.supplier_names.get(&supplier_code).map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.by_drawing.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_drawing.len()
    }
}
