//! 濃縮需求行模型（管線計算結果）

use crate::demand::{RoutedDemand, SaturationBasis};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 濃縮需求行：需求行加上主檔連接與物理量推導
///
/// 推導欄位皆為 Option：單一主檔缺漏只劣化該行（排除於飽和度運算之外），
/// 不會中斷整批計算。飽和度百分比欄位由整合階段在第二趟填入，
/// 填入時整行重建而非就地修改。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedLine {
    /// 需求ID（沿用原始需求行）
    pub id: Uuid,

    /// 供應商代碼
    pub supplier_code: i64,

    /// 供應商顯示名稱
    pub supplier_name: Option<String>,

    /// 目的地代碼
    pub destination_code: String,

    /// 圖號
    pub drawing_id: String,

    /// 需求數量
    pub quantity: Decimal,

    /// 料件描述
    pub material_description: Option<String>,

    /// 容器類型（None = 圖號未登錄，行列入未登錄料件表）
    pub container_type: Option<String>,

    /// 容器描述
    pub container_description: Option<String>,

    /// 每容器收容數（QME）
    pub units_per_container: Option<Decimal>,

    /// 容器數 = ceil(數量 / 收容數)
    pub package_count: Option<Decimal>,

    /// 體積（m³，1 位小數）
    pub volume_m3: Option<Decimal>,

    /// 物料重量（kg，1 位小數）
    pub material_weight: Option<Decimal>,

    /// 容器重量（kg，1 位小數）
    pub container_weight: Option<Decimal>,

    /// 總重量（kg）
    pub total_weight: Option<Decimal>,

    /// 路線指定車輛代碼
    pub vehicle_code: Option<u32>,

    /// 飽和度計算基準
    pub saturation_basis: Option<SaturationBasis>,

    /// 車輛最大載重（kg）
    pub vehicle_max_weight: Option<Decimal>,

    /// 體積飽和度（%，2 位小數；整合階段填入）
    pub saturation_volume_pct: Option<Decimal>,

    /// 重量飽和度（%，2 位小數；整合階段填入）
    pub saturation_weight_pct: Option<Decimal>,

    /// 有效佔用（體積與重量飽和度的較大值）
    pub effective_capacity_pct: Option<Decimal>,
}

impl EnrichedLine {
    /// 以配流需求為基底建立（推導欄位留空）
    pub fn from_routed(routed: &RoutedDemand) -> Self {
        Self {
            id: routed.demand.id,
            supplier_code: routed.demand.supplier_code,
            supplier_name: None,
            destination_code: routed.demand.destination_code.clone(),
            drawing_id: routed.demand.drawing_id.clone(),
            quantity: routed.demand.quantity,
            material_description: None,
            container_type: None,
            container_description: None,
            units_per_container: None,
            package_count: None,
            volume_m3: None,
            material_weight: None,
            container_weight: None,
            total_weight: None,
            vehicle_code: routed.vehicle_code,
            saturation_basis: routed.saturation_basis,
            vehicle_max_weight: None,
            saturation_volume_pct: None,
            saturation_weight_pct: None,
            effective_capacity_pct: None,
        }
    }

    /// 圖號是否已登錄（容器類型解析成功）
    pub fn is_registered(&self) -> bool {
        self.container_type.is_some()
    }

    /// 依基準取用的飽和度欄位
    pub fn governing_saturation(&self, basis: SaturationBasis) -> Option<Decimal> {
        match basis {
            SaturationBasis::Volume => self.saturation_volume_pct,
            SaturationBasis::Weight => self.saturation_weight_pct,
        }
    }
}

/// 未登錄料件（容器類型解析失敗的圖號，去重後輸出）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnregisteredPart {
    /// 供應商代碼
    pub supplier_code: i64,

    /// 供應商顯示名稱
    pub supplier_name: Option<String>,

    /// 目的地代碼
    pub destination_code: String,

    /// 圖號
    pub drawing_id: String,
}
