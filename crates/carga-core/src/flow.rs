//! 路線（流向）主檔模型

use crate::demand::SaturationBasis;
use serde::{Deserialize, Serialize};

/// 正規化斜線分隔的代碼清單（分割、去空白、去空項）
pub fn normalize_codes(field: &str) -> Vec<String> {
    field
        .split('/')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// 路線記錄：目的地 × 供應商集合 × 車輛 × 承運商的預定組合
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowRecord {
    /// 流向代碼
    pub flow_id: String,

    /// 目的地代碼清單（主檔以斜線分隔，載入時正規化）
    pub destination_codes: Vec<String>,

    /// 目的地名稱
    pub destination_name: String,

    /// 供應商代碼清單
    pub supplier_codes: Vec<String>,

    /// 主要車輛名稱
    pub vehicle_name: String,

    /// 飽和度計算基準
    pub saturation_basis: SaturationBasis,

    /// 承運商
    pub carrier: String,

    /// 技術欄位
    pub technology: String,

    /// 運輸方式（MOT）
    pub transport_mode: String,

    /// IMS 供應商代碼
    pub ims_code: Option<String>,
}

impl FlowRecord {
    pub fn new(flow_id: String, destination_codes: Vec<String>, supplier_codes: Vec<String>) -> Self {
        Self {
            flow_id,
            destination_codes,
            destination_name: String::new(),
            supplier_codes,
            vehicle_name: String::new(),
            saturation_basis: SaturationBasis::Volume,
            carrier: String::new(),
            technology: String::new(),
            transport_mode: String::new(),
            ims_code: None,
        }
    }

    /// 建構器模式：設置目的地名稱
    pub fn with_destination_name(mut self, name: String) -> Self {
        self.destination_name = name;
        self
    }

    /// 建構器模式：設置車輛名稱
    pub fn with_vehicle_name(mut self, name: String) -> Self {
        self.vehicle_name = name;
        self
    }

    /// 建構器模式：設置飽和度基準
    pub fn with_basis(mut self, basis: SaturationBasis) -> Self {
        self.saturation_basis = basis;
        self
    }

    /// 建構器模式：設置承運商
    pub fn with_carrier(mut self, carrier: String) -> Self {
        self.carrier = carrier;
        self
    }

    /// 建構器模式：設置技術欄位
    pub fn with_technology(mut self, technology: String) -> Self {
        self.technology = technology;
        self
    }

    /// 建構器模式：設置運輸方式
    pub fn with_transport_mode(mut self, mode: String) -> Self {
        self.transport_mode = mode;
        self
    }

    /// 建構器模式：設置 IMS 代碼
    pub fn with_ims_code(mut self, ims_code: String) -> Self {
        self.ims_code = Some(ims_code);
        self
    }

    /// 該路線是否服務此目的地
    pub fn serves_destination(&self, destination_code: &str) -> bool {
        self.destination_codes
            .iter()
            .any(|code| code == destination_code.trim())
    }

    /// 該路線是否包含此供應商
    pub fn includes_supplier(&self, supplier_code: &str) -> bool {
        self.supplier_codes
            .iter()
            .any(|code| code == supplier_code.trim())
    }
}

/// 路線主檔目錄
#[derive(Debug, Clone, Default)]
pub struct FlowCatalog {
    records: Vec<FlowRecord>,
}

impl FlowCatalog {
    pub fn from_records(records: Vec<FlowRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[FlowRecord] {
        &self.records
    }

    /// 服務某目的地的所有路線
    pub fn for_destination<'a>(
        &'a self,
        destination_code: &'a str,
    ) -> impl Iterator<Item = &'a FlowRecord> {
        self.records
            .iter()
            .filter(move |record| record.serves_destination(destination_code))
    }

    /// 第一條同時匹配（供應商, 目的地）的路線
    pub fn match_demand(&self, supplier_code: i64, destination_code: &str) -> Option<&FlowRecord> {
        let supplier = supplier_code.to_string();
        self.records.iter().find(|record| {
            record.includes_supplier(&supplier) && record.serves_destination(destination_code)
        })
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
