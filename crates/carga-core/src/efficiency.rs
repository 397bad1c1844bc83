//! 長度效率（車廂縱向損失）修正係數模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 長度效率記錄：某供應商的某容器類型在各車輛上的修正係數（≤ 1）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LengthEfficiencyRecord {
    /// 供應商代碼
    pub supplier_code: i64,

    /// 容器類型代碼
    pub container_type: String,

    /// 車輛代碼 → 修正係數
    pub factor_by_vehicle: HashMap<u32, Decimal>,
}

impl LengthEfficiencyRecord {
    pub fn new(supplier_code: i64, container_type: String) -> Self {
        Self {
            supplier_code,
            container_type,
            factor_by_vehicle: HashMap::new(),
        }
    }

    /// 建構器模式：設置某車輛的係數
    pub fn with_factor(mut self, vehicle_code: u32, factor: Decimal) -> Self {
        self.factor_by_vehicle.insert(vehicle_code, factor);
        self
    }
}

/// 長度效率目錄
#[derive(Debug, Clone, Default)]
pub struct LengthEfficiencyCatalog {
    records: HashMap<(i64, String), LengthEfficiencyRecord>,
}

impl LengthEfficiencyCatalog {
    pub fn from_records(records: Vec<LengthEfficiencyRecord>) -> Self {
        let mut map = HashMap::new();
        for record in records {
            map.entry((record.supplier_code, record.container_type.to_uppercase()))
                .or_insert(record);
        }
        Self { records: map }
    }

    /// (供應商, 容器, 車輛) 係數查找；未登錄時預設 1
    pub fn factor(&self, supplier_code: i64, container_type: &str, vehicle_code: u32) -> Decimal {
        self.records
            .get(&(supplier_code, container_type.to_uppercase()))
            .and_then(|r| r.factor_by_vehicle.get(&vehicle_code))
            .copied()
            .unwrap_or(Decimal::ONE)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
