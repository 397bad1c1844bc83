//! 車輛主檔模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 降階鏈：車輛代碼 → 次一級（較小）車輛代碼
///
/// 封閉的業務政策表，獨立於演算法維護
const DOWNGRADE_CHAIN: &[(u32, u32)] = &[
    (1, 10),
    (2, 1),
    (3, 1),
    (4, 3),
    (5, 3),
    (6, 3),
    (7, 3),
    (8, 3),
    (9, 3),
    (10, 11),
    (11, 11),
    (12, 1),
    (13, 1),
    (14, 3),
    (15, 1),
    (16, 1),
    (17, 1),
    (18, 1),
];

/// 車輛主檔記錄
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleRecord {
    /// 車輛代碼
    pub vehicle_code: u32,

    /// 車輛名稱（路線表以名稱引用車輛）
    pub name: String,

    /// 最大載重（kg）
    pub max_weight: Option<Decimal>,

    /// 最大容積（m³）
    pub max_volume: Option<Decimal>,

    /// 容器主檔中對應的容量欄位名稱
    pub capacity_column: Option<String>,

    /// 降階車輛代碼（未登錄時採用預設降階鏈）
    pub predecessor: Option<u32>,
}

impl VehicleRecord {
    pub fn new(vehicle_code: u32, name: String) -> Self {
        Self {
            vehicle_code,
            name,
            max_weight: None,
            max_volume: None,
            capacity_column: None,
            predecessor: None,
        }
    }

    /// 建構器模式：設置最大載重
    pub fn with_max_weight(mut self, weight: Decimal) -> Self {
        self.max_weight = Some(weight);
        self
    }

    /// 建構器模式：設置最大容積
    pub fn with_max_volume(mut self, volume: Decimal) -> Self {
        self.max_volume = Some(volume);
        self
    }

    /// 建構器模式：設置容量欄位名稱
    pub fn with_capacity_column(mut self, column: String) -> Self {
        self.capacity_column = Some(column);
        self
    }

    /// 建構器模式：設置降階車輛
    pub fn with_predecessor(mut self, predecessor: u32) -> Self {
        self.predecessor = Some(predecessor);
        self
    }
}

/// 車輛主檔目錄
#[derive(Debug, Clone, Default)]
pub struct VehicleCatalog {
    records: HashMap<u32, VehicleRecord>,

    /// 車輛名稱（大寫）→ 代碼
    codes_by_name: HashMap<String, u32>,
}

impl VehicleCatalog {
    pub fn from_records(records: Vec<VehicleRecord>) -> Self {
        let mut map = HashMap::new();
        let mut codes_by_name = HashMap::new();
        for record in records {
            let name = record.name.trim().to_uppercase();
            if !name.is_empty() {
                codes_by_name.entry(name).or_insert(record.vehicle_code);
            }
            map.entry(record.vehicle_code).or_insert(record);
        }
        Self {
            records: map,
            codes_by_name,
        }
    }

    pub fn record(&self, vehicle_code: u32) -> Option<&VehicleRecord> {
        self.records.get(&vehicle_code)
    }

    /// 以名稱查找車輛代碼（不分大小寫）
    pub fn code_by_name(&self, name: &str) -> Option<u32> {
        self.codes_by_name.get(&name.trim().to_uppercase()).copied()
    }

    pub fn max_weight(&self, vehicle_code: u32) -> Option<Decimal> {
        self.record(vehicle_code).and_then(|r| r.max_weight)
    }

    pub fn max_volume(&self, vehicle_code: u32) -> Option<Decimal> {
        self.record(vehicle_code).and_then(|r| r.max_volume)
    }

    /// 降階車輛代碼：記錄明示者優先，否則查預設降階鏈
    pub fn predecessor(&self, vehicle_code: u32) -> Option<u32> {
        if let Some(code) = self.record(vehicle_code).and_then(|r| r.predecessor) {
            return Some(code);
        }
        DOWNGRADE_CHAIN
            .iter()
            .find(|(code, _)| *code == vehicle_code)
            .map(|(_, prev)| *prev)
    }

    /// 容量欄位名稱 → 車輛代碼（容器/效率主檔載入時解析欄位用）
    pub fn capacity_columns(&self) -> impl Iterator<Item = (&str, u32)> {
        self.records.values().filter_map(|r| {
            r.capacity_column
                .as_deref()
                .map(|column| (column, r.vehicle_code))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
