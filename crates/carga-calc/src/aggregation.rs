//! 飽和度聚合（供應商 × 容器類型）

use carga_core::{
    ContainerCatalog, EnrichedLine, LengthEfficiencyCatalog, StackingCatalog, VehicleCatalog,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 飽和度行：一個（供應商, 容器類型）群組佔用單一車輛的比例
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaturationRow {
    /// 供應商代碼
    pub supplier_code: i64,

    /// 供應商顯示名稱
    pub supplier_name: Option<String>,

    /// 容器類型
    pub container_type: String,

    /// 群組車輛代碼
    pub vehicle_code: Option<u32>,

    /// 容器總數
    pub total_packages: Decimal,

    /// 每棧板容器數（非棧板化 = 1）
    pub containers_per_pallet: Decimal,

    /// 棧板當量 = 容器總數 / 每棧板容器數
    pub pallet_equivalent: Decimal,

    /// 車輛 × 容器容量（組合未登錄時為 None，該行不可評估）
    pub capacity: Option<Decimal>,

    /// 降階車輛的容量
    pub predecessor_capacity: Option<Decimal>,

    /// 改用降階車輛的飽和度（%，僅供參考）
    pub smaller_vehicle_saturation_pct: Option<Decimal>,

    /// 是否為任一堆疊規則的底層容器
    pub is_stacking_base: bool,

    /// 是否為任一堆疊規則的上層容器
    pub is_stacking_overlay: bool,

    /// 長度效率修正係數（≤ 1，未登錄 = 1）
    pub length_efficiency: Decimal,

    /// 群組體積（m³）
    pub volume_m3: Option<Decimal>,

    /// 總飽和度（整合階段填入；容量未知時維持 None）
    pub total_saturation: Option<Decimal>,

    /// 單容器飽和度 = 總飽和度 / 容器總數（整合階段填入）
    pub saturation_per_package: Option<Decimal>,
}

impl SaturationRow {
    /// 未堆疊前的基礎飽和度 = 棧板當量 / 容量
    pub fn base_saturation(&self) -> Option<Decimal> {
        match self.capacity {
            Some(capacity) if capacity > Decimal::ZERO => Some(self.pallet_equivalent / capacity),
            _ => None,
        }
    }
}

/// 飽和度聚合計算器
pub struct AggregationCalculator;

impl AggregationCalculator {
    /// 將已登錄的濃縮行按（供應商, 容器類型）分組並計算飽和度行
    ///
    /// `default_vehicle` 為本批次選定的車輛等級，
    /// 群組沒有自己的車輛代碼時以此代替（長度效率查找亦同）
    pub fn aggregate(
        lines: &[EnrichedLine],
        containers: &ContainerCatalog,
        vehicles: &VehicleCatalog,
        stacking: &StackingCatalog,
        efficiency: &LengthEfficiencyCatalog,
        default_vehicle: u32,
    ) -> Vec<SaturationRow> {
        // 分組：未登錄行（容器類型為空）不參與飽和度運算
        let mut grouped: HashMap<(i64, String), Vec<&EnrichedLine>> = HashMap::new();
        for line in lines {
            if let Some(container_type) = &line.container_type {
                grouped
                    .entry((line.supplier_code, container_type.clone()))
                    .or_default()
                    .push(line);
            }
        }

        let mut rows: Vec<SaturationRow> = grouped
            .into_iter()
            .map(|((supplier_code, container_type), members)| {
                Self::build_row(
                    supplier_code,
                    container_type,
                    &members,
                    containers,
                    vehicles,
                    stacking,
                    efficiency,
                    default_vehicle,
                )
            })
            .collect();

        // 輸出順序穩定化
        rows.sort_by(|a, b| {
            (a.supplier_code, &a.container_type).cmp(&(b.supplier_code, &b.container_type))
        });
        rows
    }

    #[allow(clippy::too_many_arguments)]
    fn build_row(
        supplier_code: i64,
        container_type: String,
        members: &[&EnrichedLine],
        containers: &ContainerCatalog,
        vehicles: &VehicleCatalog,
        stacking: &StackingCatalog,
        efficiency: &LengthEfficiencyCatalog,
        default_vehicle: u32,
    ) -> SaturationRow {
        let total_packages: Decimal = members.iter().filter_map(|l| l.package_count).sum();

        let vehicle_code = members.iter().find_map(|l| l.vehicle_code);
        let effective_vehicle = vehicle_code.unwrap_or(default_vehicle);

        let supplier_name = members.iter().find_map(|l| l.supplier_name.clone());

        let containers_per_pallet = containers
            .record(&container_type)
            .map(|r| r.effective_containers_per_pallet())
            .unwrap_or(Decimal::ONE);

        let pallet_equivalent = total_packages / containers_per_pallet;

        let capacity = containers.capacity(&container_type, effective_vehicle);

        let predecessor_capacity = vehicles
            .predecessor(effective_vehicle)
            .and_then(|prev| containers.capacity(&container_type, prev));

        let smaller_vehicle_saturation_pct = predecessor_capacity.and_then(|cap| {
            if cap > Decimal::ZERO {
                Some((pallet_equivalent / cap * Decimal::from(100)).round_dp(2))
            } else {
                None
            }
        });

        let volume_m3 = containers
            .volume(&container_type)
            .map(|v| v * containers_per_pallet * pallet_equivalent);

        SaturationRow {
            supplier_code,
            supplier_name,
            container_type: container_type.clone(),
            vehicle_code,
            total_packages,
            containers_per_pallet,
            pallet_equivalent,
            capacity,
            predecessor_capacity,
            smaller_vehicle_saturation_pct,
            is_stacking_base: stacking.is_base(supplier_code, &container_type),
            is_stacking_overlay: stacking.is_overlay(supplier_code, &container_type),
            length_efficiency: efficiency.factor(supplier_code, &container_type, effective_vehicle),
            volume_m3,
            total_saturation: None,
            saturation_per_package: None,
        }
    }
}
