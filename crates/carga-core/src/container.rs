//! 容器（MDR）主檔模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 容器類型記錄
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerRecord {
    /// 容器類型代碼（MDR）
    pub container_type: String,

    /// 容器描述
    pub description: String,

    /// 單容器體積（m³）
    pub volume: Option<Decimal>,

    /// 容器自重（kg）
    pub weight: Option<Decimal>,

    /// 是否可棧板化（塑膠箱）
    pub is_palletizable: bool,

    /// 每棧板容器數
    pub containers_per_pallet: Option<Decimal>,

    /// 車輛代碼 → 可裝載容量（棧板位數）
    pub capacity_by_vehicle: HashMap<u32, Decimal>,
}

impl ContainerRecord {
    pub fn new(container_type: String) -> Self {
        Self {
            container_type,
            description: String::new(),
            volume: None,
            weight: None,
            is_palletizable: false,
            containers_per_pallet: None,
            capacity_by_vehicle: HashMap::new(),
        }
    }

    /// 建構器模式：設置描述
    pub fn with_description(mut self, description: String) -> Self {
        self.description = description;
        self
    }

    /// 建構器模式：設置體積
    pub fn with_volume(mut self, volume: Decimal) -> Self {
        self.volume = Some(volume);
        self
    }

    /// 建構器模式：設置容器自重
    pub fn with_weight(mut self, weight: Decimal) -> Self {
        self.weight = Some(weight);
        self
    }

    /// 建構器模式：設置棧板化屬性
    pub fn with_palletization(mut self, palletizable: bool, per_pallet: Option<Decimal>) -> Self {
        self.is_palletizable = palletizable;
        self.containers_per_pallet = per_pallet;
        self
    }

    /// 建構器模式：設置某車輛的容量
    pub fn with_capacity(mut self, vehicle_code: u32, capacity: Decimal) -> Self {
        self.capacity_by_vehicle.insert(vehicle_code, capacity);
        self
    }

    /// 每棧板容器數（非棧板化或未登錄時為 1）
    pub fn effective_containers_per_pallet(&self) -> Decimal {
        if !self.is_palletizable {
            return Decimal::ONE;
        }
        match self.containers_per_pallet {
            Some(qty) if qty > Decimal::ZERO => qty,
            _ => Decimal::ONE,
        }
    }
}

/// 容器主檔目錄（容器類型代碼為鍵，大小寫不敏感）
#[derive(Debug, Clone, Default)]
pub struct ContainerCatalog {
    records: HashMap<String, ContainerRecord>,
}

impl ContainerCatalog {
    pub fn from_records(records: Vec<ContainerRecord>) -> Self {
        let mut map = HashMap::new();
        for record in records {
            map.entry(record.container_type.to_uppercase())
                .or_insert(record);
        }
        Self { records: map }
    }

    pub fn record(&self, container_type: &str) -> Option<&ContainerRecord> {
        self.records.get(&container_type.to_uppercase())
    }

    /// (車輛, 容器) 容量查找；組合不存在時軟性回傳 None
    pub fn capacity(&self, container_type: &str, vehicle_code: u32) -> Option<Decimal> {
        self.record(container_type)
            .and_then(|r| r.capacity_by_vehicle.get(&vehicle_code))
            .copied()
    }

    pub fn volume(&self, container_type: &str) -> Option<Decimal> {
        self.record(container_type).and_then(|r| r.volume)
    }

    pub fn weight(&self, container_type: &str) -> Option<Decimal> {
        self.record(container_type).and_then(|r| r.weight)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
