//! 需求模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 飽和度計算基準
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaturationBasis {
    /// 以體積計算
    Volume,
    /// 以重量計算
    Weight,
}

impl SaturationBasis {
    /// 從路線表的文字欄位解析（不分大小寫）
    ///
    /// 非 "VOLUME" 的值一律視為重量基準
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("volume") {
            SaturationBasis::Volume
        } else {
            SaturationBasis::Weight
        }
    }

    pub fn is_volume(&self) -> bool {
        matches!(self, SaturationBasis::Volume)
    }
}

/// 需求行（由需求檔案擷取的單筆出貨請求）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandLine {
    /// 需求ID
    pub id: Uuid,

    /// 供應商代碼
    pub supplier_code: i64,

    /// 目的地代碼
    pub destination_code: String,

    /// 圖號
    pub drawing_id: String,

    /// 需求數量
    pub quantity: Decimal,
}

impl DemandLine {
    /// 創建新的需求行
    pub fn new(
        supplier_code: i64,
        destination_code: String,
        drawing_id: String,
        quantity: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            supplier_code,
            destination_code,
            drawing_id,
            quantity,
        }
    }

    /// 檢查數量是否有效（過濾後的需求必須為正數）
    pub fn has_valid_quantity(&self) -> bool {
        self.quantity > Decimal::ZERO
    }
}

/// 已配流的需求行（需求行 + 路線解析結果）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutedDemand {
    /// 原始需求行
    pub demand: DemandLine,

    /// 路線指定的車輛代碼（無匹配路線時為 None）
    pub vehicle_code: Option<u32>,

    /// 飽和度計算基準
    pub saturation_basis: Option<SaturationBasis>,

    /// 路線的 IMS 供應商代碼（供應商名稱解析用）
    pub ims_code: Option<String>,
}

impl RoutedDemand {
    /// 創建未配流的需求（找不到匹配路線時使用）
    pub fn unrouted(demand: DemandLine) -> Self {
        Self {
            demand,
            vehicle_code: None,
            saturation_basis: None,
            ims_code: None,
        }
    }

    /// 建構器模式：設置車輛代碼
    pub fn with_vehicle(mut self, vehicle_code: u32) -> Self {
        self.vehicle_code = Some(vehicle_code);
        self
    }

    /// 建構器模式：設置飽和度基準
    pub fn with_basis(mut self, basis: SaturationBasis) -> Self {
        self.saturation_basis = Some(basis);
        self
    }

    /// 建構器模式：設置 IMS 代碼
    pub fn with_ims_code(mut self, ims_code: String) -> Self {
        self.ims_code = Some(ims_code);
        self
    }

    /// 檢查是否已成功配流
    pub fn is_routed(&self) -> bool {
        self.vehicle_code.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_demand_line() {
        let line = DemandLine::new(
            770001234,
            "1080".to_string(),
            "12345678901".to_string(),
            Decimal::from(250),
        );

        assert_eq!(line.supplier_code, 770001234);
        assert_eq!(line.destination_code, "1080");
        assert!(line.has_valid_quantity());
    }

    #[test]
    fn test_routed_demand_builder() {
        let line = DemandLine::new(1, "1080".to_string(), "D-1".to_string(), Decimal::ONE);
        let routed = RoutedDemand::unrouted(line)
            .with_vehicle(4)
            .with_basis(SaturationBasis::Volume)
            .with_ims_code("123/456".to_string());

        assert!(routed.is_routed());
        assert_eq!(routed.vehicle_code, Some(4));
        assert_eq!(routed.saturation_basis, Some(SaturationBasis::Volume));
        assert_eq!(routed.ims_code, Some("123/456".to_string()));
    }

    #[test]
    fn test_basis_parse_case_insensitive() {
        assert_eq!(SaturationBasis::parse("VOLUME"), SaturationBasis::Volume);
        assert_eq!(SaturationBasis::parse("volume "), SaturationBasis::Volume);
        assert_eq!(SaturationBasis::parse("PESO"), SaturationBasis::Weight);
        // 未知值一律視為重量基準
        assert_eq!(SaturationBasis::parse("???"), SaturationBasis::Weight);
    }
}
